//! [`Money`]-related definitions.

#[cfg(feature = "postgres")]
use std::error::Error as StdError;
use std::{fmt, iter, ops, str::FromStr};

#[cfg(feature = "postgres")]
use postgres_types::{
    accepts, private::BytesMut, to_sql_checked, FromSql, IsNull, ToSql, Type,
};
use rust_decimal::{Decimal, RoundingStrategy};

/// Amount of money in cents precision.
///
/// The system is single-currency, so no currency is attached to the amount.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Money(Decimal);

impl Money {
    /// Zero [`Money`].
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Number of fractional digits a [`Money`] amount may have.
    pub const SCALE: u32 = 2;

    /// Largest single [`Money`] amount that may be stored.
    ///
    /// Matches the `NUMERIC(16, 2)` columns: `99 999 999 999 999.99`.
    pub const MAX: Self =
        Self(Decimal::from_parts(0x6FC0_FFFF, 0x0023_86F2, 0, false, 2));

    /// Creates a new [`Money`] out of the provided `amount`.
    ///
    /// [`None`] is returned if the `amount` is more precise than a cent.
    #[must_use]
    pub fn new(amount: Decimal) -> Option<Self> {
        (amount.normalize().scale() <= Self::SCALE).then_some(Self(amount))
    }

    /// Creates a new [`Money`] out of the provided number of cents.
    #[must_use]
    pub fn from_cents(cents: i64) -> Self {
        Self(Decimal::new(cents, Self::SCALE))
    }

    /// Returns the amount of this [`Money`].
    #[must_use]
    pub fn amount(self) -> Decimal {
        self.0
    }

    /// Indicates whether this [`Money`] is below zero.
    #[must_use]
    pub fn is_negative(self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    /// Indicates whether the magnitude of this [`Money`] is above
    /// [`Money::MAX`].
    #[must_use]
    pub fn exceeds_max(self) -> bool {
        self.0.abs() > Self::MAX.0
    }

    /// Splits this [`Money`] into the provided number of `parts`.
    ///
    /// Every part is this amount divided by `parts` and truncated to cents,
    /// while the last part absorbs the remainder, so the parts always sum up
    /// exactly to this [`Money`].
    ///
    /// [`None`] is returned if `parts` is zero.
    #[must_use]
    pub fn split(self, parts: u16) -> Option<Vec<Self>> {
        if parts == 0 {
            return None;
        }

        let share = (self.0 / Decimal::from(parts))
            .round_dp_with_strategy(Self::SCALE, RoundingStrategy::ToZero);
        let last = self.0 - share * Decimal::from(parts - 1);

        Some(
            iter::repeat(Self(share))
                .take(usize::from(parts - 1))
                .chain(iter::once(Self(last)))
                .collect(),
        )
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl FromStr for Money {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let amount = Decimal::from_str(s).map_err(|_| "invalid amount")?;
        Self::new(amount).ok_or("more precise than a cent")
    }
}

/// Saturates at the [`Decimal`] bounds instead of panicking.
///
/// Sums of amounts not exceeding [`Money::MAX`] saturate only after
/// `10^14` terms.
impl ops::Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl ops::AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl ops::Sub for Money {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0.saturating_sub(rhs.0))
    }
}

impl iter::Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, ops::Add::add)
    }
}

impl<'a> iter::Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Self>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

#[cfg(feature = "postgres")]
impl FromSql<'_> for Money {
    accepts!(NUMERIC);

    fn from_sql(
        ty: &Type,
        raw: &[u8],
    ) -> Result<Self, Box<dyn StdError + Sync + Send>> {
        Decimal::from_sql(ty, raw).map(Self)
    }
}

#[cfg(feature = "postgres")]
impl ToSql for Money {
    accepts!(NUMERIC);
    to_sql_checked!();

    fn to_sql(
        &self,
        ty: &Type,
        w: &mut BytesMut,
    ) -> Result<IsNull, Box<dyn StdError + Sync + Send>> {
        self.0.to_sql(ty, w)
    }
}

#[cfg(feature = "juniper")]
mod juniper {
    //! Module providing integration with [`juniper`] crate.

    use std::str::FromStr as _;

    use juniper::{graphql_scalar, InputValue, ScalarValue, Value};

    /// Money in `{major}.{minor}` format, where:
    /// - `major` is an integer;
    /// - `minor` is an optional integer of at most two digits.
    #[graphql_scalar(with = Self, parse_token(String))]
    type Money = super::Money;

    impl Money {
        fn to_output<S: ScalarValue>(m: &Money) -> Value<S> {
            Value::scalar(m.to_string())
        }

        fn from_input<S: ScalarValue>(
            input: &InputValue<S>,
        ) -> Result<Self, String> {
            input
                .as_string_value()
                .ok_or_else(|| {
                    format!(
                        "Cannot parse `Money` input scalar from \
                         non-string value: {input}",
                    )
                })
                .and_then(|s| {
                    Self::from_str(s).map_err(|e| {
                        format!("Cannot parse `Money` input scalar: {e}")
                    })
                })
        }
    }
}

#[cfg(test)]
mod spec {
    use std::str::FromStr as _;

    use rust_decimal::Decimal;

    use super::Money;

    fn money(s: &str) -> Money {
        s.parse().unwrap()
    }

    #[test]
    fn from_str() {
        assert_eq!(Money::from_str("123.45").unwrap(), Money::from_cents(12345));
        assert_eq!(Money::from_str("123").unwrap(), Money::from_cents(12300));
        assert_eq!(Money::from_str("123.4").unwrap(), Money::from_cents(12340));
        assert_eq!(Money::from_str("123.450").unwrap(), Money::from_cents(12345));

        assert!(Money::from_str("123.456").is_err());
        assert!(Money::from_str("12a").is_err());
        assert!(Money::from_str("").is_err());
    }

    #[test]
    fn to_string() {
        assert_eq!(Money::from_cents(12345).to_string(), "123.45");
        assert_eq!(Money::from_cents(12300).to_string(), "123.00");
        assert_eq!(Money::from_cents(5).to_string(), "0.05");
    }

    #[test]
    fn splits_with_remainder_in_last_part() {
        assert_eq!(
            money("1000").split(3).unwrap(),
            [money("333.33"), money("333.33"), money("333.34")],
        );
        assert_eq!(
            money("800").split(6).unwrap(),
            [
                money("133.33"),
                money("133.33"),
                money("133.33"),
                money("133.33"),
                money("133.33"),
                money("133.35"),
            ],
        );
    }

    #[test]
    fn splits_evenly() {
        assert_eq!(
            money("60000").split(4).unwrap(),
            [money("15000"); 4],
        );
        assert_eq!(money("60000").split(1).unwrap(), [money("60000")]);
        assert_eq!(money("0").split(2).unwrap(), [Money::ZERO; 2]);
    }

    #[test]
    fn split_parts_sum_up_to_whole() {
        for cents in [1, 99, 100, 12_345, 99_999, 1_000_000] {
            let whole = Money::from_cents(cents);
            for parts in 1..=13 {
                let split = whole.split(parts).unwrap();
                assert_eq!(split.len(), usize::from(parts));
                assert_eq!(split.iter().sum::<Money>(), whole, "{whole}/{parts}");
            }
        }
    }

    #[test]
    fn does_not_split_into_zero_parts() {
        assert!(money("100").split(0).is_none());
    }

    #[test]
    fn detects_negative() {
        assert!(money("-0.01").is_negative());
        assert!(!money("0").is_negative());
        assert!(!money("-0").is_negative());
        assert!(!money("0.01").is_negative());
    }

    #[test]
    fn bounds_max_by_storage_precision() {
        assert_eq!(Money::MAX, money("99999999999999.99"));
        assert!(!Money::MAX.exceeds_max());
        assert!(!money("-99999999999999.99").exceeds_max());
        assert!(money("100000000000000").exceeds_max());
        assert!(money("-100000000000000").exceeds_max());
        assert!(money("50000000000000000000000000000").exceeds_max());
    }

    #[test]
    fn saturates_instead_of_overflowing() {
        let huge = money("50000000000000000000000000000");

        assert_eq!(huge + huge, Money(Decimal::MAX));
        assert_eq!(
            [huge, huge, huge].iter().sum::<Money>(),
            Money(Decimal::MAX),
        );
        assert_eq!(
            money("-50000000000000000000000000000") - huge,
            Money(Decimal::MIN),
        );

        let mut total = huge;
        total += huge;
        assert_eq!(total, Money(Decimal::MAX));
    }
}
