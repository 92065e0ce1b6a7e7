//! Installment [`Schedule`] of a [`Sale`].

use common::Money;
use derive_more::{Display, Error};

#[cfg(doc)]
use super::Sale;
use super::{
    commission, down_payment, ClosingDate, InstallmentNumber,
    InstallmentsCount,
};

/// Installments of a new [`Sale`].
///
/// Every down payment installment is paired with the commission installment
/// of the same number.
#[derive(Clone, Debug)]
pub struct Schedule {
    /// Number of installments in this [`Schedule`].
    pub installments_count: InstallmentsCount,

    /// Down payment installments numbered from `1`.
    pub down_payment_installments: Vec<down_payment::Installment>,

    /// Commission installments numbered from `1`, none of them due yet.
    pub commission_installments: Vec<commission::Installment>,
}

impl Schedule {
    /// Generates a new [`Schedule`] splitting the provided `down_payment` and
    /// `commission` into `installments_count` equal installments.
    ///
    /// Each part is truncated to cents, and the last one absorbs the
    /// remainder. The `n`-th down payment installment is due `n - 1` months
    /// after `sold_on`, clamped to the end of a shorter month.
    ///
    /// # Errors
    ///
    /// With [`InvalidInput`] if any of the inputs can't be scheduled.
    pub fn generate(
        down_payment: Money,
        installments_count: i32,
        sold_on: ClosingDate,
        commission: Money,
    ) -> Result<Self, InvalidInput> {
        use InvalidInput as E;

        let count = InstallmentsCount::new(installments_count)
            .ok_or(E::InstallmentsCount(installments_count))?;
        for amount in [down_payment, commission] {
            if amount.is_negative() {
                return Err(E::NegativeAmount(amount));
            }
            if amount.exceeds_max() {
                return Err(E::AmountOutOfRange(amount));
            }
        }

        let down_payment_parts = down_payment
            .split(count.get())
            .ok_or(E::InstallmentsCount(installments_count))?;
        let commission_parts = commission
            .split(count.get())
            .ok_or(E::InstallmentsCount(installments_count))?;

        let mut down_payment_installments =
            Vec::with_capacity(usize::from(count.get()));
        let mut commission_installments =
            Vec::with_capacity(usize::from(count.get()));
        for (n, (down_payment_part, commission_part)) in (1..=count.get())
            .zip(down_payment_parts.into_iter().zip(commission_parts))
        {
            let number = InstallmentNumber::from(n);
            let due_on = sold_on
                .checked_add_months(u32::from(n - 1))
                .ok_or(E::DueDateOutOfRange)?;

            let down_payment = down_payment::Installment {
                id: down_payment::Id::new(),
                number,
                amount: down_payment_part,
                due_on: due_on.coerce(),
                paid_on: None,
            };
            commission_installments.push(commission::Installment {
                id: commission::Id::new(),
                number,
                amount: commission_part,
                down_payment_installment_id: down_payment.id,
                due_on: None,
                paid_on: None,
            });
            down_payment_installments.push(down_payment);
        }

        Ok(Self {
            installments_count: count,
            down_payment_installments,
            commission_installments,
        })
    }
}

/// Error of generating a [`Schedule`] out of invalid inputs.
#[derive(Clone, Copy, Debug, Display, Error)]
pub enum InvalidInput {
    /// Installments count is out of `1..=`[`InstallmentsCount::MAX`] range.
    #[display(
        "installments count must be in `1..={}` range, but is {_0}",
        InstallmentsCount::MAX
    )]
    InstallmentsCount(#[error(not(source))] i32),

    /// Amount to be split is negative.
    #[display("amount must not be negative, but is {_0}")]
    NegativeAmount(#[error(not(source))] Money),

    /// Amount to be split is above [`Money::MAX`].
    #[display("amount must not exceed {}, but is {_0}", Money::MAX)]
    AmountOutOfRange(#[error(not(source))] Money),

    /// Installment due date overflows the calendar.
    #[display("installment due date is out of range")]
    DueDateOutOfRange,
}

#[cfg(test)]
mod spec {
    use common::{DateOf, Money};

    use super::{InvalidInput, Schedule};

    fn day<Of: ?Sized>(s: &str) -> DateOf<Of> {
        s.parse().unwrap()
    }

    fn money(s: &str) -> Money {
        s.parse().unwrap()
    }

    #[test]
    fn splits_into_linked_installments() {
        for count in [1, 2, 3, 7, 12, 36, 600] {
            let schedule = Schedule::generate(
                money("60000.01"),
                count,
                day("2024-01-25"),
                money("800"),
            )
            .unwrap();

            let n = usize::try_from(count).unwrap();
            assert_eq!(usize::from(schedule.installments_count.get()), n);
            assert_eq!(schedule.down_payment_installments.len(), n);
            assert_eq!(schedule.commission_installments.len(), n);
            assert_eq!(
                schedule
                    .down_payment_installments
                    .iter()
                    .map(|i| i.amount)
                    .sum::<Money>(),
                money("60000.01"),
            );
            assert_eq!(
                schedule
                    .commission_installments
                    .iter()
                    .map(|i| i.amount)
                    .sum::<Money>(),
                money("800"),
            );

            for (i, (dp, c)) in schedule
                .down_payment_installments
                .iter()
                .zip(&schedule.commission_installments)
                .enumerate()
            {
                let number = u16::try_from(i + 1).unwrap();
                assert_eq!(u16::from(dp.number), number);
                assert_eq!(u16::from(c.number), number);
                assert_eq!(c.down_payment_installment_id, dp.id);
                assert!(c.due_on.is_none());
                assert!(!c.is_paid());
                assert!(!dp.is_paid());
            }
        }
    }

    #[test]
    fn dues_monthly_from_sale_date() {
        let schedule = Schedule::generate(
            money("1000"),
            3,
            day("2024-01-31"),
            money("0"),
        )
        .unwrap();

        assert_eq!(
            schedule
                .down_payment_installments
                .iter()
                .map(|i| i.due_on.to_string())
                .collect::<Vec<_>>(),
            ["2024-01-31", "2024-02-29", "2024-03-31"],
        );
        assert_eq!(
            schedule
                .down_payment_installments
                .iter()
                .map(|i| i.amount)
                .collect::<Vec<_>>(),
            [money("333.33"), money("333.33"), money("333.34")],
        );
    }

    #[test]
    fn schedules_single_installment() {
        let schedule = Schedule::generate(
            money("60000"),
            1,
            day("2024-01-25"),
            money("800"),
        )
        .unwrap();

        let [dp] = schedule.down_payment_installments.as_slice() else {
            panic!("expected single down payment installment");
        };
        assert_eq!(dp.amount, money("60000"));
        assert_eq!(dp.due_on, day("2024-01-25"));
        assert!(!dp.is_paid());

        let [c] = schedule.commission_installments.as_slice() else {
            panic!("expected single commission installment");
        };
        assert_eq!(c.amount, money("800"));
        assert_eq!(c.due_on, None);
        assert!(!c.is_paid());
        assert_eq!(c.down_payment_installment_id, dp.id);
    }

    #[test]
    fn rejects_invalid_installments_count() {
        for count in [0, -1, 601] {
            assert!(matches!(
                Schedule::generate(
                    money("1000"),
                    count,
                    day("2024-01-25"),
                    money("800"),
                ),
                Err(InvalidInput::InstallmentsCount(c)) if c == count,
            ));
        }
    }

    #[test]
    fn rejects_negative_amounts() {
        assert!(matches!(
            Schedule::generate(
                money("-1000"),
                2,
                day("2024-01-25"),
                money("800"),
            ),
            Err(InvalidInput::NegativeAmount(_)),
        ));
        assert!(matches!(
            Schedule::generate(
                money("1000"),
                2,
                day("2024-01-25"),
                money("-0.01"),
            ),
            Err(InvalidInput::NegativeAmount(_)),
        ));
    }

    #[test]
    fn rejects_amounts_above_max() {
        let huge = money("50000000000000000000000000000");

        assert!(matches!(
            Schedule::generate(huge, 2, day("2024-01-25"), money("800")),
            Err(InvalidInput::AmountOutOfRange(a)) if a == huge,
        ));
        assert!(matches!(
            Schedule::generate(
                money("1000"),
                2,
                day("2024-01-25"),
                money("100000000000000"),
            ),
            Err(InvalidInput::AmountOutOfRange(_)),
        ));
        assert!(Schedule::generate(
            Money::MAX,
            2,
            day("2024-01-25"),
            Money::MAX,
        )
        .is_ok());
    }

    #[test]
    fn accepts_zero_amounts() {
        let schedule =
            Schedule::generate(Money::ZERO, 4, day("2024-01-25"), Money::ZERO)
                .unwrap();

        assert!(schedule
            .down_payment_installments
            .iter()
            .all(|i| i.amount == Money::ZERO));
        assert!(schedule
            .commission_installments
            .iter()
            .all(|i| i.amount == Money::ZERO));
    }

    #[test]
    fn rejects_overflowing_due_dates() {
        assert!(matches!(
            Schedule::generate(
                money("1000"),
                3,
                day("9999-11-15"),
                money("800"),
            ),
            Err(InvalidInput::DueDateOutOfRange),
        ));
    }
}
