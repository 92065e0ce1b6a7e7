//! Commission [`Installment`] definitions.

use common::{unit, Date, DateOf, Money};
use derive_more::{Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{down_payment, InstallmentNumber, Status};

/// Installment of a [`Sale`]'s commission paid to its broker.
///
/// Pegged to the down payment [`Installment`] of the same number: it becomes
/// due only once that one is paid.
///
/// [`Installment`]: down_payment::Installment
/// [`Sale`]: super::Sale
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Installment {
    /// ID of this [`Installment`].
    pub id: Id,

    /// [`InstallmentNumber`] of this [`Installment`] within its [`Sale`].
    ///
    /// [`Sale`]: super::Sale
    pub number: InstallmentNumber,

    /// Amount to be paid by this [`Installment`].
    pub amount: Money,

    /// ID of the [`down_payment::Installment`] this [`Installment`] is linked
    /// to.
    pub down_payment_installment_id: down_payment::Id,

    /// [`Date`] this [`Installment`] is due on.
    ///
    /// [`None`] until the linked [`down_payment::Installment`] is paid.
    pub due_on: Option<DueDate>,

    /// [`Date`] this [`Installment`] was paid on, if it was.
    pub paid_on: Option<PaymentDate>,
}

impl Installment {
    /// Indicates whether this [`Installment`] is paid.
    #[must_use]
    pub fn is_paid(&self) -> bool {
        self.paid_on.is_some()
    }

    /// Indicates whether this [`Installment`] is due and unpaid.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.due_on.is_some() && !self.is_paid()
    }

    /// Returns [`Status`] of this [`Installment`] as of the provided `today`.
    #[must_use]
    pub fn status(&self, today: Date) -> Status {
        if self.is_paid() {
            return Status::Paid;
        }
        match self.due_on {
            Some(due_on) if due_on.coerce() < today => Status::Overdue,
            Some(_) => Status::Pending,
            None => Status::Awaiting,
        }
    }
}

/// ID of an [`Installment`].
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
    PartialEq,
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

/// [`Date`] an [`Installment`] is due on.
pub type DueDate = DateOf<(Installment, unit::Due)>;

/// [`Date`] an [`Installment`] was paid on.
pub type PaymentDate = DateOf<(Installment, unit::Payment)>;
