//! Down payment [`Installment`] definitions.

use common::{unit, Date, DateOf, Money};
use derive_more::{Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{InstallmentNumber, Status};

/// Installment of a [`Sale`]'s down payment paid by its client.
///
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

    /// [`Date`] this [`Installment`] is due on.
    pub due_on: DueDate,

    /// [`Date`] this [`Installment`] was paid on, if it was.
    pub paid_on: Option<PaymentDate>,
}

impl Installment {
    /// Indicates whether this [`Installment`] is paid.
    #[must_use]
    pub fn is_paid(&self) -> bool {
        self.paid_on.is_some()
    }

    /// Returns [`Status`] of this [`Installment`] as of the provided `today`.
    ///
    /// Down payment [`Installment`]s are always due, so they're never
    /// [`Status::Awaiting`].
    #[must_use]
    pub fn status(&self, today: Date) -> Status {
        if self.is_paid() {
            Status::Paid
        } else if self.due_on.coerce() < today {
            Status::Overdue
        } else {
            Status::Pending
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
