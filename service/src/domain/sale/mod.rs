//! [`Sale`] definitions.

pub mod commission;
pub mod down_payment;
pub mod schedule;

#[cfg(doc)]
use common::DateTime;
use common::{define_kind, unit, Date, DateOf, DateTimeOf, Money};
use derive_more::{AsRef, Display, Error, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{broker, development};
#[cfg(doc)]
use crate::domain::{Broker, Development};

pub use self::schedule::Schedule;

/// Sale of a real estate unit closed by a [`Broker`].
///
/// Owns its down payment and commission installments: they're created along
/// with the [`Sale`] and removed only together with it.
#[derive(Clone, Debug)]
pub struct Sale {
    /// ID of this [`Sale`].
    pub id: Id,

    /// [`ClientName`] of the client who bought the unit.
    pub client_name: ClientName,

    /// ID of the [`Development`] the sold unit belongs to.
    pub development_id: development::Id,

    /// ID of the [`Broker`] who closed this [`Sale`].
    pub broker_id: broker::Id,

    /// Total down payment of this [`Sale`].
    pub down_payment: Money,

    /// Number of installments the down payment and the commission are split
    /// into.
    pub installments_count: InstallmentsCount,

    /// [`Date`] this [`Sale`] was closed on.
    pub sold_on: ClosingDate,

    /// Total commission of this [`Sale`].
    ///
    /// Snapshot of the [`Development::commission`] at the moment this
    /// [`Sale`] was created.
    pub commission: Money,

    /// [`Lot`] of the sold unit, if any.
    pub lot: Option<Lot>,

    /// [`Block`] of the sold unit, if any.
    pub block: Option<Block>,

    /// Down payment installments of this [`Sale`], ordered by their numbers.
    pub down_payment_installments: Vec<down_payment::Installment>,

    /// Commission installments of this [`Sale`], ordered by their numbers.
    pub commission_installments: Vec<commission::Installment>,

    /// [`DateTime`] when this [`Sale`] was created.
    pub created_at: CreationDateTime,
}

impl Sale {
    /// Returns [`Status`] of this [`Sale`]'s commission as of the provided
    /// `today`.
    ///
    /// The first matching one wins:
    /// 1. [`Status::Paid`] if every commission installment is paid;
    /// 2. [`Status::Overdue`] if any commission installment is overdue;
    /// 3. [`Status::Pending`] if any commission installment is due;
    /// 4. [`Status::Awaiting`] otherwise.
    #[must_use]
    pub fn status(&self, today: Date) -> Status {
        let statuses = self
            .commission_installments
            .iter()
            .map(|i| i.status(today))
            .collect::<Vec<_>>();

        if statuses.iter().all(|s| *s == Status::Paid) {
            Status::Paid
        } else if statuses.contains(&Status::Overdue) {
            Status::Overdue
        } else if statuses.contains(&Status::Pending) {
            Status::Pending
        } else {
            Status::Awaiting
        }
    }

    /// Returns the [`down_payment::Installment`] of this [`Sale`] with the
    /// provided ID, if any.
    #[must_use]
    pub fn down_payment_installment(
        &self,
        id: down_payment::Id,
    ) -> Option<&down_payment::Installment> {
        self.down_payment_installments.iter().find(|i| i.id == id)
    }

    /// Returns the [`commission::Installment`] of this [`Sale`] with the
    /// provided ID, if any.
    #[must_use]
    pub fn commission_installment(
        &self,
        id: commission::Id,
    ) -> Option<&commission::Installment> {
        self.commission_installments.iter().find(|i| i.id == id)
    }

    /// Returns the [`commission::Installment`] linked to the
    /// [`down_payment::Installment`] with the provided ID, if any.
    #[must_use]
    pub fn linked_commission_installment(
        &self,
        down_payment_installment_id: down_payment::Id,
    ) -> Option<&commission::Installment> {
        self.commission_installments.iter().find(|i| {
            i.down_payment_installment_id == down_payment_installment_id
        })
    }

    /// Sum of the paid commission installments.
    #[must_use]
    pub fn commission_paid(&self) -> Money {
        self.commission_installments
            .iter()
            .filter(|i| i.is_paid())
            .map(|i| i.amount)
            .sum()
    }

    /// Sum of the due, but not yet paid commission installments.
    #[must_use]
    pub fn commission_pending(&self) -> Money {
        self.commission_installments
            .iter()
            .filter(|i| i.is_pending())
            .map(|i| i.amount)
            .sum()
    }

    /// Marks the [`down_payment::Installment`] with the provided ID as paid on
    /// the provided [`Date`].
    ///
    /// The linked [`commission::Installment`], unless paid already, becomes
    /// due 7 days after that [`Date`].
    ///
    /// Returns `false` if the [`down_payment::Installment`] is paid already,
    /// leaving this [`Sale`] untouched.
    ///
    /// # Errors
    ///
    /// - [`PaymentError::DownPaymentInstallmentNotExists`] if this [`Sale`]
    ///   has no such [`down_payment::Installment`].
    /// - [`PaymentError::DueDateOutOfRange`] if the commission due date
    ///   overflows the calendar.
    pub fn mark_down_payment_installment_paid(
        &mut self,
        id: down_payment::Id,
        paid_on: down_payment::PaymentDate,
    ) -> Result<bool, PaymentError> {
        let installment = self
            .down_payment_installments
            .iter_mut()
            .find(|i| i.id == id)
            .ok_or(PaymentError::DownPaymentInstallmentNotExists(id))?;
        if installment.is_paid() {
            return Ok(false);
        }

        let due_on = paid_on
            .checked_add_days(COMMISSION_LAG_DAYS)
            .ok_or(PaymentError::DueDateOutOfRange)?;
        installment.paid_on = Some(paid_on);

        if let Some(commission) = self
            .commission_installments
            .iter_mut()
            .find(|i| i.down_payment_installment_id == id)
        {
            if !commission.is_paid() {
                commission.due_on = Some(due_on.coerce());
            }
        }

        Ok(true)
    }

    /// Marks the [`commission::Installment`] with the provided ID as paid on
    /// the provided [`Date`].
    ///
    /// Returns `false` if the [`commission::Installment`] is paid already,
    /// leaving this [`Sale`] untouched.
    ///
    /// # Errors
    ///
    /// - [`PaymentError::CommissionInstallmentNotExists`] if this [`Sale`]
    ///   has no such [`commission::Installment`].
    /// - [`PaymentError::CommissionNotDue`] if the [`commission::Installment`]
    ///   has no due date yet.
    pub fn mark_commission_installment_paid(
        &mut self,
        id: commission::Id,
        paid_on: commission::PaymentDate,
    ) -> Result<bool, PaymentError> {
        let installment = self
            .commission_installments
            .iter_mut()
            .find(|i| i.id == id)
            .ok_or(PaymentError::CommissionInstallmentNotExists(id))?;
        if installment.is_paid() {
            return Ok(false);
        }
        if installment.due_on.is_none() {
            return Err(PaymentError::CommissionNotDue(id));
        }

        installment.paid_on = Some(paid_on);

        Ok(true)
    }
}

/// Number of days a [`commission::Installment`] becomes due in after its
/// linked [`down_payment::Installment`] is paid.
pub const COMMISSION_LAG_DAYS: u32 = 7;

/// Error of marking an installment of a [`Sale`] as paid.
#[derive(Clone, Copy, Debug, Display, Error)]
pub enum PaymentError {
    /// [`commission::Installment`] has no due date yet.
    #[display("`commission::Installment(id: {_0})` is not due yet")]
    CommissionNotDue(#[error(not(source))] commission::Id),

    /// [`commission::Installment`] doesn't exist in the [`Sale`].
    #[display("`commission::Installment(id: {_0})` does not exist")]
    CommissionInstallmentNotExists(#[error(not(source))] commission::Id),

    /// [`down_payment::Installment`] doesn't exist in the [`Sale`].
    #[display("`down_payment::Installment(id: {_0})` does not exist")]
    DownPaymentInstallmentNotExists(#[error(not(source))] down_payment::Id),

    /// Commission due date overflows the calendar.
    #[display("commission due date is out of range")]
    DueDateOutOfRange,
}

define_kind! {
    #[doc = "Commission status of a [`Sale`] or of a single installment."]
    enum Status {
        #[doc = "Everything is paid."]
        Paid = 1,

        #[doc = "Something is due in the past and still unpaid."]
        Overdue = 2,

        #[doc = "Something is due and unpaid."]
        Pending = 3,

        #[doc = "Nothing is due yet."]
        Awaiting = 4,
    }
}

/// ID of a [`Sale`].
#[derive(
    Clone,
    Copy,
    Debug,
    Deserialize,
    Display,
    Eq,
    From,
    FromStr,
    Hash,
    Into,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
)]
#[cfg_attr(feature = "postgres", derive(ToSql, FromSql), postgres(transparent))]
pub struct Id(Uuid);

impl Id {
    /// Creates a new random [`Id`].
    #[expect(
        clippy::new_without_default,
        reason = "random `Id` is not a default one"
    )]
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

/// Name of a [`Sale`] client.
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct ClientName(String);

impl ClientName {
    /// Creates a new [`ClientName`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `name` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Creates a new [`ClientName`] if the given `name` is valid.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Option<Self> {
        let name = name.into();
        Self::check(&name).then_some(Self(name))
    }

    /// Checks whether the given `name` is a valid [`ClientName`].
    fn check(name: impl AsRef<str>) -> bool {
        let name = name.as_ref();
        name.trim() == name && !name.is_empty() && name.len() <= 512
    }
}

impl FromStr for ClientName {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `ClientName`")
    }
}

/// Lot of the unit sold in a [`Sale`].
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Lot(String);

impl Lot {
    /// Creates a new [`Lot`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `lot` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(lot: impl Into<String>) -> Self {
        Self(lot.into())
    }

    /// Creates a new [`Lot`] if the given `lot` is valid.
    #[must_use]
    pub fn new(lot: impl Into<String>) -> Option<Self> {
        let lot = lot.into();
        Self::check(&lot).then_some(Self(lot))
    }

    /// Checks whether the given `lot` is a valid [`Lot`].
    fn check(lot: impl AsRef<str>) -> bool {
        let lot = lot.as_ref();
        lot.trim() == lot && !lot.is_empty() && lot.len() <= 32
    }
}

impl FromStr for Lot {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Lot`")
    }
}

/// Block of the unit sold in a [`Sale`].
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Block(String);

impl Block {
    /// Creates a new [`Block`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `block` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(block: impl Into<String>) -> Self {
        Self(block.into())
    }

    /// Creates a new [`Block`] if the given `block` is valid.
    #[must_use]
    pub fn new(block: impl Into<String>) -> Option<Self> {
        let block = block.into();
        Self::check(&block).then_some(Self(block))
    }

    /// Checks whether the given `block` is a valid [`Block`].
    fn check(block: impl AsRef<str>) -> bool {
        let block = block.as_ref();
        block.trim() == block && !block.is_empty() && block.len() <= 32
    }
}

impl FromStr for Block {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Block`")
    }
}

/// Number of installments of a [`Sale`].
#[derive(
    Clone, Copy, Debug, Display, Eq, Hash, Into, Ord, PartialEq, PartialOrd,
)]
pub struct InstallmentsCount(u16);

impl InstallmentsCount {
    /// Maximum supported [`InstallmentsCount`] (50 years of monthly
    /// installments).
    pub const MAX: u16 = 600;

    /// Creates a new [`InstallmentsCount`] if the provided `count` is in
    /// `1..=`[`InstallmentsCount::MAX`] range.
    #[must_use]
    pub fn new<N: TryInto<u16>>(count: N) -> Option<Self> {
        count
            .try_into()
            .ok()
            .filter(|c| (1..=Self::MAX).contains(c))
            .map(Self)
    }

    /// Returns the number of installments.
    #[must_use]
    pub fn get(self) -> u16 {
        self.0
    }
}

/// Number of an installment within a [`Sale`], starting from `1`.
#[derive(
    Clone,
    Copy,
    Debug,
    Display,
    Eq,
    From,
    Hash,
    Into,
    Ord,
    PartialEq,
    PartialOrd,
)]
pub struct InstallmentNumber(u16);

/// [`Date`] a [`Sale`] was closed on.
pub type ClosingDate = DateOf<(Sale, unit::Closing)>;

/// [`DateTime`] when a [`Sale`] was created.
pub type CreationDateTime = DateTimeOf<(Sale, unit::Creation)>;

#[cfg(test)]
mod spec {
    use common::{DateOf, DateTime, Money};

    use crate::domain::{broker, development};

    use super::{
        commission, down_payment, ClientName, InstallmentsCount,
        PaymentError, Sale, Schedule, Status,
    };

    fn day<Of: ?Sized>(s: &str) -> DateOf<Of> {
        s.parse().unwrap()
    }

    fn money(s: &str) -> Money {
        s.parse().unwrap()
    }

    fn sale(
        down_payment: &str,
        count: i32,
        sold_on: &str,
        commission: &str,
    ) -> Sale {
        let Schedule {
            installments_count,
            down_payment_installments,
            commission_installments,
        } = Schedule::generate(
            money(down_payment),
            count,
            day(sold_on),
            money(commission),
        )
        .unwrap();

        Sale {
            id: super::Id::new(),
            client_name: ClientName::new("Maria Oliveira").unwrap(),
            development_id: development::Id::new(),
            broker_id: broker::Id::new(),
            down_payment: money(down_payment),
            installments_count,
            sold_on: day(sold_on),
            commission: money(commission),
            lot: None,
            block: None,
            down_payment_installments,
            commission_installments,
            created_at: DateTime::now().coerce(),
        }
    }

    #[test]
    fn schedules_linked_commission_on_down_payment() {
        let mut sale = sale("1000", 3, "2024-01-31", "600");
        let first = sale.down_payment_installments[0].id;

        assert!(sale
            .mark_down_payment_installment_paid(first, day("2024-02-01"))
            .unwrap());

        assert_eq!(
            sale.down_payment_installments[0].paid_on,
            Some(day("2024-02-01")),
        );
        assert_eq!(
            sale.commission_installments[0].due_on,
            Some(day("2024-02-08")),
        );
        assert!(sale.commission_installments[1..]
            .iter()
            .all(|i| i.due_on.is_none() && !i.is_paid()));
        assert!(sale.down_payment_installments[1..]
            .iter()
            .all(|i| !i.is_paid()));
    }

    #[test]
    fn does_not_reschedule_on_repeated_payment() {
        let mut sale = sale("1000", 3, "2024-01-31", "600");
        let second = sale.down_payment_installments[1].id;

        assert!(sale
            .mark_down_payment_installment_paid(second, day("2024-03-01"))
            .unwrap());
        assert!(!sale
            .mark_down_payment_installment_paid(second, day("2024-03-20"))
            .unwrap());

        assert_eq!(
            sale.down_payment_installments[1].paid_on,
            Some(day("2024-03-01")),
        );
        assert_eq!(
            sale.commission_installments[1].due_on,
            Some(day("2024-03-08")),
        );
    }

    #[test]
    fn keeps_paid_commission_unscheduled() {
        let mut sale = sale("1000", 1, "2024-01-31", "600");
        let dp = sale.down_payment_installments[0].id;
        let c = sale.commission_installments[0].id;

        sale.commission_installments[0].due_on = Some(day("2024-01-10"));
        assert!(sale
            .mark_commission_installment_paid(c, day("2024-01-11"))
            .unwrap());
        assert!(sale
            .mark_down_payment_installment_paid(dp, day("2024-02-01"))
            .unwrap());

        assert_eq!(
            sale.commission_installments[0].due_on,
            Some(day("2024-01-10")),
        );
    }

    #[test]
    fn rejects_paying_commission_before_due() {
        let mut sale = sale("1000", 2, "2024-01-31", "600");
        let c = sale.commission_installments[0].id;

        assert!(matches!(
            sale.mark_commission_installment_paid(c, day("2024-02-01")),
            Err(PaymentError::CommissionNotDue(id)) if id == c,
        ));
        assert!(!sale.commission_installments[0].is_paid());
    }

    #[test]
    fn pays_due_commission_once() {
        let mut sale = sale("1000", 2, "2024-01-31", "600");
        let dp = sale.down_payment_installments[0].id;
        let c = sale.commission_installments[0].id;

        _ = sale
            .mark_down_payment_installment_paid(dp, day("2024-02-01"))
            .unwrap();
        assert!(sale
            .mark_commission_installment_paid(c, day("2024-02-08"))
            .unwrap());
        assert!(!sale
            .mark_commission_installment_paid(c, day("2024-02-10"))
            .unwrap());

        assert_eq!(
            sale.commission_installments[0].paid_on,
            Some(day("2024-02-08")),
        );
    }

    #[test]
    fn detects_unknown_installments() {
        let mut sale = sale("1000", 2, "2024-01-31", "600");
        let dp = down_payment::Id::new();
        let c = commission::Id::new();

        assert!(matches!(
            sale.mark_down_payment_installment_paid(dp, day("2024-02-01")),
            Err(PaymentError::DownPaymentInstallmentNotExists(id)) if id == dp,
        ));
        assert!(matches!(
            sale.mark_commission_installment_paid(c, day("2024-02-01")),
            Err(PaymentError::CommissionInstallmentNotExists(id)) if id == c,
        ));
    }

    #[test]
    fn detects_commission_due_date_overflow() {
        let mut sale = sale("1000", 1, "2024-01-31", "600");
        let dp = sale.down_payment_installments[0].id;

        assert!(matches!(
            sale.mark_down_payment_installment_paid(dp, day("9999-12-30")),
            Err(PaymentError::DueDateOutOfRange),
        ));
        assert!(!sale.down_payment_installments[0].is_paid());
    }

    #[test]
    fn derives_status_by_priority() {
        let today = day::<()>("2024-03-10");
        let mut sale = sale("900", 3, "2024-01-31", "300");
        assert_eq!(sale.status(today), Status::Awaiting);

        sale.commission_installments[1].due_on = Some(day("2024-03-15"));
        assert_eq!(sale.status(today), Status::Pending);

        sale.commission_installments[0].due_on = Some(day("2024-03-09"));
        assert_eq!(sale.status(today), Status::Overdue);
        assert_eq!(
            sale.commission_installments[2].status(today),
            Status::Awaiting,
        );

        for i in &mut sale.commission_installments {
            i.due_on = Some(day("2024-03-09"));
            i.paid_on = Some(day("2024-03-09"));
        }
        assert_eq!(sale.status(today), Status::Paid);
    }

    #[test]
    fn is_not_overdue_on_due_date() {
        let today = day::<()>("2024-03-10");
        let mut sale = sale("900", 1, "2024-01-31", "300");

        sale.commission_installments[0].due_on = Some(today.coerce());
        assert_eq!(sale.status(today), Status::Pending);
        assert_eq!(
            sale.down_payment_installments[0].status(day("2024-01-31")),
            Status::Pending,
        );
        assert_eq!(
            sale.down_payment_installments[0].status(day("2024-02-01")),
            Status::Overdue,
        );
    }

    #[test]
    fn sums_paid_and_pending_commission() {
        let mut sale = sale("900", 3, "2024-01-31", "1000");
        sale.commission_installments[0].due_on = Some(day("2024-02-01"));
        sale.commission_installments[0].paid_on = Some(day("2024-02-02"));
        sale.commission_installments[2].due_on = Some(day("2024-04-07"));

        assert_eq!(sale.commission_paid(), money("333.33"));
        assert_eq!(sale.commission_pending(), money("333.34"));
    }

    #[test]
    fn bounds_installments_count() {
        assert!(InstallmentsCount::new(0).is_none());
        assert!(InstallmentsCount::new(-3).is_none());
        assert!(InstallmentsCount::new(601).is_none());
        assert_eq!(InstallmentsCount::new(1).unwrap().get(), 1);
        assert_eq!(InstallmentsCount::new(600).unwrap().get(), 600);
    }
}
