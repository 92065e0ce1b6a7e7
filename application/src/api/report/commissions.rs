//! [`Commissions`] report definition.

use common::Money;
use juniper::graphql_object;
use service::query;

use crate::{api, Context};

/// Commissions report of the [`Sale`]s closed within a period.
///
/// [`Sale`]: api::Sale
#[derive(Clone, Debug)]
pub struct Commissions(query::report::commissions::Output);

impl From<query::report::commissions::Output> for Commissions {
    fn from(output: query::report::commissions::Output) -> Self {
        Self(output)
    }
}

/// Commissions report of the `Sale`s closed within a period.
#[graphql_object(name = "CommissionReport", context = Context)]
impl Commissions {
    /// Sum of the paid commission installments.
    #[must_use]
    pub fn paid(&self) -> Money {
        self.0.paid
    }

    /// Sum of the due, but not yet paid commission installments.
    #[must_use]
    pub fn pending(&self) -> Money {
        self.0.pending
    }

    /// Sum of the total commissions of the `Sale`s.
    #[must_use]
    pub fn generated(&self) -> Money {
        self.0.generated
    }

    /// Number of the `Sale`s.
    #[must_use]
    pub fn sales_count(&self) -> i32 {
        count(self.0.sales_count)
    }

    /// Sum of the down payments of the `Sale`s closed in the current month.
    #[must_use]
    pub fn monthly_revenue(&self) -> Money {
        self.0.monthly_revenue
    }

    /// Number of the overdue commission installments.
    #[must_use]
    pub fn overdue_count(&self) -> i32 {
        count(self.0.overdue_count)
    }

    /// Number of all the `Broker`s.
    #[must_use]
    pub fn brokers_count(&self) -> i32 {
        count(self.0.brokers_count)
    }

    /// Per-`Broker` rows, the highest earning first.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "CommissionReport.brokers",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    #[must_use]
    pub fn brokers(&self) -> Vec<BrokerRow> {
        self.0.brokers.iter().copied().map(BrokerRow).collect()
    }

    /// Per-`Development` rows, the best selling first.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "CommissionReport.developments",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    #[must_use]
    pub fn developments(&self) -> Vec<DevelopmentRow> {
        self.0
            .developments
            .iter()
            .copied()
            .map(DevelopmentRow)
            .collect()
    }
}

/// [`Commissions`] report row of a single [`Broker`].
///
/// [`Broker`]: api::Broker
#[derive(Clone, Copy, Debug)]
pub struct BrokerRow(query::report::commissions::BrokerRow);

/// `CommissionReport` row of a single `Broker`.
#[graphql_object(name = "CommissionReportBrokerRow", context = Context)]
impl BrokerRow {
    /// `Broker` this row is about.
    #[must_use]
    pub fn broker(&self) -> api::Broker {
        #[expect(unsafe_code, reason = "row is built of existing `Broker`")]
        unsafe {
            api::Broker::new_unchecked(self.0.broker_id)
        }
    }

    /// Number of the `Sale`s closed by the `Broker`.
    #[must_use]
    pub fn sales_count(&self) -> i32 {
        count(self.0.sales_count)
    }

    /// Paid commission of the `Broker`.
    #[must_use]
    pub fn paid(&self) -> Money {
        self.0.paid
    }

    /// Due, but not yet paid commission of the `Broker`.
    #[must_use]
    pub fn pending(&self) -> Money {
        self.0.pending
    }

    /// Sum of `paid` and `pending`.
    #[must_use]
    pub fn total(&self) -> Money {
        self.0.total()
    }
}

/// [`Commissions`] report row of a single [`Development`].
///
/// [`Development`]: api::Development
#[derive(Clone, Copy, Debug)]
pub struct DevelopmentRow(query::report::commissions::DevelopmentRow);

/// `CommissionReport` row of a single `Development`.
#[graphql_object(name = "CommissionReportDevelopmentRow", context = Context)]
impl DevelopmentRow {
    /// `Development` this row is about.
    #[must_use]
    pub fn development(&self) -> api::Development {
        #[expect(
            unsafe_code,
            reason = "row is built of existing `Development`"
        )]
        unsafe {
            api::Development::new_unchecked(self.0.development_id)
        }
    }

    /// Number of the `Sale`s in the `Development`.
    #[must_use]
    pub fn sales_count(&self) -> i32 {
        count(self.0.sales_count)
    }

    /// Sum of the down payments of the `Sale`s.
    #[must_use]
    pub fn revenue(&self) -> Money {
        self.0.revenue
    }

    /// Sum of the total commissions of the `Sale`s.
    #[must_use]
    pub fn commission(&self) -> Money {
        self.0.commission
    }

    /// Paid commission of the `Sale`s.
    #[must_use]
    pub fn paid(&self) -> Money {
        self.0.paid
    }

    /// Due, but not yet paid commission of the `Sale`s.
    #[must_use]
    pub fn pending(&self) -> Money {
        self.0.pending
    }
}

/// Converts the provided `count` into a GraphQL `Int`.
pub(super) fn count(count: usize) -> i32 {
    i32::try_from(count).unwrap_or(i32::MAX)
}
