//! GraphQL API [`Error`]s and their mapping from [`service`] errors.

use std::fmt;

use derive_more::{Display, Error as StdError};
use http::StatusCode;
use itertools::Itertools as _;
use juniper::IntoFieldError;
use service::{command, domain::sale::schedule, infra::database, query};
use tracerr::{Trace, Traced};

/// [`Error`] reported to a GraphQL client.
///
/// Anything without a [`Kind`] is reported as an internal server error.
#[derive(Clone, Debug, StdError)]
pub struct Error {
    /// [`Kind`] of this [`Error`], if it's a client-facing one.
    kind: Option<Kind>,

    /// Human-readable message of this [`Error`].
    message: String,

    /// [`Trace`] of the [`service`] error this [`Error`] is made from.
    #[error(not(backtrace))]
    backtrace: Option<Trace>,
}

impl Error {
    /// Creates a new internal server [`Error`] with the provided message.
    #[must_use]
    pub fn internal(msg: &impl ToString) -> Self {
        Self {
            kind: None,
            message: msg.to_string(),
            backtrace: None,
        }
    }

    /// Returns the [`Kind`] of this [`Error`], unless it's an internal one.
    #[must_use]
    pub fn kind(&self) -> Option<Kind> {
        self.kind
    }

    /// Returns the [`Code`] of this [`Error`].
    #[must_use]
    pub fn code(&self) -> Code {
        self.kind.map_or("INTERNAL_SERVER_ERROR", Kind::code)
    }

    /// Returns the [`StatusCode`] of the HTTP response carrying this
    /// [`Error`].
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        self.kind
            .map_or(StatusCode::INTERNAL_SERVER_ERROR, Kind::status_code)
    }
}

impl From<Kind> for Error {
    fn from(kind: Kind) -> Self {
        Self {
            kind: Some(kind),
            message: kind.to_string(),
            backtrace: None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]: {}", self.code(), self.message)?;
        if let Some(trace) = &self.backtrace {
            write!(f, "\n{}", trace.iter().format("\n"))?;
        }
        Ok(())
    }
}

impl<S> IntoFieldError<S> for Error
where
    S: From<String>,
{
    fn into_field_error(self) -> juniper::FieldError<S> {
        let frames = self
            .backtrace
            .iter()
            .flat_map(|trace| trace.iter())
            .map(|frame| juniper::Value::scalar(frame.to_string()))
            .collect();

        let mut ext = juniper::Object::with_capacity(2);
        drop(ext.add_field(
            "code",
            juniper::Value::scalar(self.code().to_owned()),
        ));
        drop(ext.add_field("backtrace", juniper::Value::list(frames)));

        juniper::FieldError::new(self.message, juniper::Value::object(ext))
    }
}

/// Machine-readable code of an [`Error`].
pub type Code = &'static str;

/// Client-facing kind of an [`Error`].
///
/// [`Display`]ed as the message sent to the client.
///
/// [`Display`]: fmt::Display
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum Kind {
    /// Pagination arguments go both forward and backward.
    #[display("Ambiguous pagination arguments")]
    AmbiguousPagination,

    /// Requested `Broker` does not exist.
    #[display("`Broker` with the specified ID does not exist")]
    BrokerNotExists,

    /// `Broker` still has `Sale`s and can't be deleted.
    #[display("`Broker` with the specified ID has sales")]
    BrokerHasSales,

    /// Requested `Development` does not exist.
    #[display("`Development` with the specified ID does not exist")]
    DevelopmentNotExists,

    /// `Development` still has `Sale`s and can't be deleted.
    #[display("`Development` with the specified ID has sales")]
    DevelopmentHasSales,

    /// Requested `Sale` does not exist.
    #[display("`Sale` with the specified ID does not exist")]
    SaleNotExists,

    /// Requested installment does not exist.
    #[display("Installment with the specified ID does not exist")]
    InstallmentNotExists,

    /// `CommissionInstallment` has no due date yet.
    #[display("`CommissionInstallment` has no due date yet")]
    CommissionNotDue,

    /// Installments count is out of the supported range.
    #[display("Installments count must be in `1..=600` range")]
    InvalidInstallmentsCount,

    /// Amount is below zero.
    #[display("Amount must not be negative")]
    NegativeAmount,

    /// Amount doesn't fit the storage.
    #[display("Amount must not exceed 99999999999999.99")]
    AmountOutOfRange,

    /// Installment due date overflows the calendar.
    #[display("Installment due date is out of range")]
    DueDateOutOfRange,
}

impl Kind {
    /// Returns the [`Code`] of this [`Kind`].
    #[must_use]
    pub const fn code(self) -> Code {
        match self {
            Self::AmbiguousPagination => "AMBIGUOUS_PAGINATION_ARGUMENTS",
            Self::BrokerNotExists => "BROKER_NOT_EXISTS",
            Self::BrokerHasSales => "BROKER_HAS_SALES",
            Self::DevelopmentNotExists => "DEVELOPMENT_NOT_EXISTS",
            Self::DevelopmentHasSales => "DEVELOPMENT_HAS_SALES",
            Self::SaleNotExists => "SALE_NOT_EXISTS",
            Self::InstallmentNotExists => "INSTALLMENT_NOT_EXISTS",
            Self::CommissionNotDue => "COMMISSION_NOT_DUE",
            Self::InvalidInstallmentsCount => "INVALID_INSTALLMENTS_COUNT",
            Self::NegativeAmount => "NEGATIVE_AMOUNT",
            Self::AmountOutOfRange => "AMOUNT_OUT_OF_RANGE",
            Self::DueDateOutOfRange => "DUE_DATE_OUT_OF_RANGE",
        }
    }

    /// Returns the [`StatusCode`] of this [`Kind`].
    #[must_use]
    pub const fn status_code(self) -> StatusCode {
        match self {
            Self::AmbiguousPagination
            | Self::InvalidInstallmentsCount
            | Self::NegativeAmount
            | Self::AmountOutOfRange
            | Self::DueDateOutOfRange => StatusCode::BAD_REQUEST,
            Self::BrokerNotExists
            | Self::DevelopmentNotExists
            | Self::SaleNotExists
            | Self::InstallmentNotExists => StatusCode::NOT_FOUND,
            Self::BrokerHasSales
            | Self::DevelopmentHasSales
            | Self::CommissionNotDue => StatusCode::CONFLICT,
        }
    }
}

/// Conversion of a [`service`] error into an [`Error`].
pub trait AsError {
    /// Returns the client-facing [`Error`] of this one.
    ///
    /// [`None`] means it's an internal error.
    fn try_as_error(&self) -> Option<Error>;

    /// Converts this error into an [`Error`], falling back to an internal one.
    fn as_error(&self) -> Error
    where
        Self: fmt::Display,
    {
        self.try_as_error().unwrap_or_else(|| Error::internal(&self))
    }

    /// Converts this error into an [`Error`] by consuming it.
    fn into_error(self) -> Error
    where
        Self: fmt::Display + Sized,
    {
        self.as_error()
    }
}

impl<E: AsError> AsError for Traced<E> {
    fn try_as_error(&self) -> Option<Error> {
        self.as_ref().try_as_error().map(|e| Error {
            backtrace: Some(self.trace().clone()),
            ..e
        })
    }
}

impl AsError for database::Error {
    fn try_as_error(&self) -> Option<Error> {
        None
    }
}

impl AsError for schedule::InvalidInput {
    fn try_as_error(&self) -> Option<Error> {
        Some(
            match self {
                Self::InstallmentsCount(_) => Kind::InvalidInstallmentsCount,
                Self::NegativeAmount(_) => Kind::NegativeAmount,
                Self::AmountOutOfRange(_) => Kind::AmountOutOfRange,
                Self::DueDateOutOfRange => Kind::DueDateOutOfRange,
            }
            .into(),
        )
    }
}

impl AsError for command::create_development::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        let kind = match self {
            Self::Db(e) => return e.try_as_error(),
            Self::NegativeCommission(_) => Kind::NegativeAmount,
            Self::CommissionOutOfRange(_) => Kind::AmountOutOfRange,
        };
        Some(kind.into())
    }
}

impl AsError for command::update_development::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        let kind = match self {
            Self::Db(e) => return e.try_as_error(),
            Self::DevelopmentNotExists(_) => Kind::DevelopmentNotExists,
            Self::NegativeCommission(_) => Kind::NegativeAmount,
            Self::CommissionOutOfRange(_) => Kind::AmountOutOfRange,
        };
        Some(kind.into())
    }
}

impl AsError for command::delete_development::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        let kind = match self {
            Self::Db(e) => return e.try_as_error(),
            Self::DevelopmentNotExists(_) => Kind::DevelopmentNotExists,
            Self::DevelopmentHasSales(_) => Kind::DevelopmentHasSales,
        };
        Some(kind.into())
    }
}

impl AsError for command::update_broker::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::BrokerNotExists(_) => Some(Kind::BrokerNotExists.into()),
        }
    }
}

impl AsError for command::delete_broker::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        let kind = match self {
            Self::Db(e) => return e.try_as_error(),
            Self::BrokerNotExists(_) => Kind::BrokerNotExists,
            Self::BrokerHasSales(_) => Kind::BrokerHasSales,
        };
        Some(kind.into())
    }
}

impl AsError for command::create_sale::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        let kind = match self {
            Self::Db(e) => return e.try_as_error(),
            Self::InvalidInput(e) => return e.try_as_error(),
            Self::BrokerNotExists(_) => Kind::BrokerNotExists,
            Self::DevelopmentNotExists(_) => Kind::DevelopmentNotExists,
        };
        Some(kind.into())
    }
}

impl AsError for command::delete_sale::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::SaleNotExists(_) => Some(Kind::SaleNotExists.into()),
        }
    }
}

impl AsError for command::mark_down_payment_installment_paid::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        let kind = match self {
            Self::Db(e) => return e.try_as_error(),
            Self::DueDateOutOfRange => Kind::DueDateOutOfRange,
            Self::InstallmentNotExists(_) => Kind::InstallmentNotExists,
        };
        Some(kind.into())
    }
}

impl AsError for command::mark_commission_installment_paid::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        let kind = match self {
            Self::Db(e) => return e.try_as_error(),
            Self::InstallmentNotExists(_) => Kind::InstallmentNotExists,
            Self::NotDue(_) => Kind::CommissionNotDue,
        };
        Some(kind.into())
    }
}

impl AsError for query::report::broker_dashboard::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::BrokerNotExists(_) => Some(Kind::BrokerNotExists.into()),
        }
    }
}

#[cfg(test)]
mod spec {
    use common::Money;
    use http::StatusCode;
    use service::{command, domain::sale::schedule};
    use tracerr::Traced;

    use super::{AsError as _, Error, Kind};

    #[test]
    fn maps_amount_out_of_range_to_bad_request() {
        let err =
            schedule::InvalidInput::AmountOutOfRange(Money::MAX).as_error();

        assert_eq!(err.kind(), Some(Kind::AmountOutOfRange));
        assert_eq!(err.code(), "AMOUNT_OUT_OF_RANGE");
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn maps_deletion_with_sales_to_conflict() {
        let err = command::delete_broker::ExecutionError::BrokerHasSales(
            service::domain::broker::Id::new(),
        )
        .as_error();

        assert_eq!(err.code(), "BROKER_HAS_SALES");
        assert_eq!(err.status_code(), StatusCode::CONFLICT);

        let err =
            command::delete_development::ExecutionError::DevelopmentHasSales(
                service::domain::development::Id::new(),
            )
            .as_error();

        assert_eq!(err.code(), "DEVELOPMENT_HAS_SALES");
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
    }

    #[test]
    fn keeps_trace_of_traced_errors() {
        let err: Traced<_> = tracerr::new!(
            command::delete_sale::ExecutionError::SaleNotExists(
                service::domain::sale::Id::new(),
            )
        );

        let err = err.into_error();

        assert_eq!(err.kind(), Some(Kind::SaleNotExists));
        assert!(err.backtrace.is_some());
    }

    #[test]
    fn falls_back_to_internal_error() {
        let err = Error::internal(&"boom");

        assert_eq!(err.kind(), None);
        assert_eq!(err.code(), "INTERNAL_SERVER_ERROR");
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_string(), "[INTERNAL_SERVER_ERROR]: boom");
    }
}
