//! Calendar date utilities.

#[cfg(feature = "postgres")]
use std::error::Error as StdError;
use std::{cmp::Ordering, fmt, marker::PhantomData, str::FromStr};

use derive_more::{Debug, Display, Error};
#[cfg(feature = "postgres")]
use postgres_types::{
    accepts, private::BytesMut, to_sql_checked, FromSql, IsNull, ToSql, Type,
};
use time::{
    format_description::BorrowedFormatItem, macros::format_description,
    Month, UtcOffset,
};

/// Untyped calendar date.
pub type Date = DateOf;

/// Format of a [`Date`] in its string representation.
const FORMAT: &[BorrowedFormatItem<'_>] =
    format_description!("[year]-[month]-[day]");

/// Calendar date without a time of day.
#[derive(Debug)]
pub struct DateOf<Of: ?Sized = ()> {
    /// Inner representation of the date.
    inner: time::Date,

    /// Type parameter describing the kind of date.
    #[debug(skip)]
    _of: PhantomData<Of>,
}

impl<Of: ?Sized> DateOf<Of> {
    /// Creates a new [`Date`] out of the provided calendar components.
    ///
    /// [`None`] is returned if the components don't form a valid date.
    #[must_use]
    pub fn from_calendar_date(year: i32, month: u8, day: u8) -> Option<Self> {
        let month = Month::try_from(month).ok()?;
        time::Date::from_calendar_date(year, month, day)
            .ok()
            .map(Self::from)
    }

    /// Returns the current [`Date`] as observed in the provided `offset`.
    #[must_use]
    pub fn today(offset: UtcOffset) -> Self {
        time::OffsetDateTime::now_utc().to_offset(offset).date().into()
    }

    /// Returns the year of this [`Date`].
    #[must_use]
    pub fn year(&self) -> i32 {
        self.inner.year()
    }

    /// Returns the month of this [`Date`] in `1..=12` range.
    #[must_use]
    pub fn month(&self) -> u8 {
        self.inner.month().into()
    }

    /// Returns the day of month of this [`Date`].
    #[must_use]
    pub fn day(&self) -> u8 {
        self.inner.day()
    }

    /// Adds the provided number of calendar `months` to this [`Date`].
    ///
    /// If the resulting month is shorter than the day of this [`Date`], the
    /// day is clamped to the last day of that month (`2024-01-31` plus one
    /// month is `2024-02-29`).
    ///
    /// [`None`] is returned on calendar overflow.
    #[must_use]
    pub fn checked_add_months(self, months: u32) -> Option<Self> {
        let months_since_zero = i64::from(self.year()) * 12
            + i64::from(self.month() - 1)
            + i64::from(months);
        let year = i32::try_from(months_since_zero.div_euclid(12)).ok()?;
        let month = u8::try_from(months_since_zero.rem_euclid(12) + 1).ok()?;

        // Shorter months clamp the day to their last one.
        (1..=self.day())
            .rev()
            .find_map(|day| Self::from_calendar_date(year, month, day))
    }

    /// Adds the provided number of `days` to this [`Date`].
    ///
    /// [`None`] is returned on calendar overflow.
    #[must_use]
    pub fn checked_add_days(self, days: u32) -> Option<Self> {
        self.inner
            .checked_add(time::Duration::days(days.into()))
            .map(Self::from)
    }

    /// Coerces one kind of [`Date`] into another.
    #[must_use]
    pub fn coerce<NewOf: ?Sized>(self) -> DateOf<NewOf> {
        DateOf {
            inner: self.inner,
            _of: PhantomData,
        }
    }
}

/// Error of parsing [`Date`] from a string.
#[derive(Clone, Copy, Debug, Display, Error)]
#[display("invalid `YYYY-MM-DD` date: {_0}")]
pub struct ParseError(time::error::Parse);

impl<Of: ?Sized> FromStr for DateOf<Of> {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        time::Date::parse(s, FORMAT)
            .map(Self::from)
            .map_err(ParseError)
    }
}

impl<Of: ?Sized> fmt::Display for DateOf<Of> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.inner.format(FORMAT).map_err(|_| fmt::Error)?)
    }
}

impl<Of: ?Sized> Copy for DateOf<Of> {}
impl<Of: ?Sized> Clone for DateOf<Of> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<Of: ?Sized> Eq for DateOf<Of> {}
impl<Of: ?Sized> PartialEq for DateOf<Of> {
    fn eq(&self, other: &Self) -> bool {
        self.inner == other.inner
    }
}

impl<Of: ?Sized> Ord for DateOf<Of> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.inner.cmp(&other.inner)
    }
}
impl<Of: ?Sized> PartialOrd for DateOf<Of> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<Of: ?Sized> std::hash::Hash for DateOf<Of> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.inner.hash(state);
    }
}

impl<Of: ?Sized> From<time::Date> for DateOf<Of> {
    fn from(inner: time::Date) -> Self {
        Self {
            inner,
            _of: PhantomData,
        }
    }
}

impl<Of: ?Sized> From<DateOf<Of>> for time::Date {
    fn from(d: DateOf<Of>) -> Self {
        d.inner
    }
}

#[cfg(feature = "postgres")]
impl<Of: ?Sized> FromSql<'_> for DateOf<Of> {
    accepts!(DATE);

    fn from_sql(
        ty: &Type,
        raw: &[u8],
    ) -> Result<Self, Box<dyn StdError + Sync + Send>> {
        time::Date::from_sql(ty, raw).map(Self::from)
    }
}

#[cfg(feature = "postgres")]
impl<Of: ?Sized> ToSql for DateOf<Of> {
    accepts!(DATE);
    to_sql_checked!();

    fn to_sql(
        &self,
        ty: &Type,
        w: &mut BytesMut,
    ) -> Result<IsNull, Box<dyn StdError + Sync + Send>> {
        self.inner.to_sql(ty, w)
    }
}

#[cfg(feature = "juniper")]
mod juniper {
    //! Module providing integration with [`juniper`] crate.

    use juniper::{graphql_scalar, InputValue, ScalarValue, Value};

    /// Calendar date in a `YYYY-MM-DD` format.
    #[graphql_scalar(with = Self, parse_token(String))]
    type Date = crate::Date;

    impl Date {
        fn to_output<S: ScalarValue>(d: &Date) -> Value<S> {
            Value::scalar(d.to_string())
        }

        fn from_input<S: ScalarValue>(
            input: &InputValue<S>,
        ) -> Result<Self, String> {
            input
                .as_string_value()
                .ok_or_else(|| {
                    format!(
                        "Cannot parse `Date` input scalar from \
                         non-string value: {input}",
                    )
                })
                .and_then(|s| {
                    s.parse().map_err(|e| {
                        format!("Cannot parse `Date` input scalar: {e}")
                    })
                })
        }
    }
}

#[cfg(test)]
mod spec {
    use super::Date;

    fn date(s: &str) -> Date {
        s.parse().unwrap()
    }

    #[test]
    fn parses_and_formats() {
        let d = date("2024-01-31");
        assert_eq!((d.year(), d.month(), d.day()), (2024, 1, 31));
        assert_eq!(d.to_string(), "2024-01-31");
        assert_eq!(date("0999-12-01").to_string(), "0999-12-01");

        assert!("2024-02-30".parse::<Date>().is_err());
        assert!("2024-1-3".parse::<Date>().is_err());
        assert!("31.01.2024".parse::<Date>().is_err());
    }

    #[test]
    fn adds_months_clamping_to_month_end() {
        let d = date("2024-01-31");
        assert_eq!(d.checked_add_months(0), Some(d));
        assert_eq!(d.checked_add_months(1), Some(date("2024-02-29")));
        assert_eq!(d.checked_add_months(2), Some(date("2024-03-31")));
        assert_eq!(d.checked_add_months(3), Some(date("2024-04-30")));
        assert_eq!(
            date("2023-01-31").checked_add_months(1),
            Some(date("2023-02-28")),
        );
    }

    #[test]
    fn adds_months_across_years() {
        assert_eq!(
            date("2024-11-15").checked_add_months(2),
            Some(date("2025-01-15")),
        );
        assert_eq!(
            date("2024-01-25").checked_add_months(24),
            Some(date("2026-01-25")),
        );
        assert_eq!(
            date("2023-12-31").checked_add_months(14),
            Some(date("2025-02-28")),
        );
    }

    #[test]
    fn detects_month_overflow() {
        assert_eq!(date("9999-12-01").checked_add_months(1), None);
    }

    #[test]
    fn adds_days() {
        assert_eq!(
            date("2024-02-01").checked_add_days(7),
            Some(date("2024-02-08")),
        );
        assert_eq!(
            date("2024-02-25").checked_add_days(7),
            Some(date("2024-03-03")),
        );
        assert_eq!(
            date("2024-12-28").checked_add_days(7),
            Some(date("2025-01-04")),
        );
        assert_eq!(date("9999-12-31").checked_add_days(1), None);
    }
}
