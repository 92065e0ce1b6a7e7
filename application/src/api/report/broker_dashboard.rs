//! [`BrokerDashboard`] report definition.

use common::Money;
use juniper::graphql_object;
use service::query;

use super::commissions::count;
use crate::{api, Context};

/// Dashboard of a single [`Broker`]'s commissions.
///
/// [`Broker`]: api::Broker
#[derive(Clone, Debug)]
pub struct BrokerDashboard {
    /// ID of the [`Broker`] this dashboard is about.
    ///
    /// [`Broker`]: api::Broker
    broker_id: api::broker::Id,

    /// Underlying [`query::report::broker_dashboard::Output`].
    output: query::report::broker_dashboard::Output,
}

impl BrokerDashboard {
    /// Creates a new [`BrokerDashboard`] of the [`Broker`] with the provided
    /// ID.
    ///
    /// [`Broker`]: api::Broker
    #[must_use]
    pub fn new(
        broker_id: api::broker::Id,
        output: query::report::broker_dashboard::Output,
    ) -> Self {
        Self { broker_id, output }
    }
}

/// Dashboard of a single `Broker`'s commissions.
#[graphql_object(context = Context)]
impl BrokerDashboard {
    /// `Broker` this dashboard is about.
    #[must_use]
    pub fn broker(&self) -> api::Broker {
        #[expect(unsafe_code, reason = "dashboard is built of existing one")]
        unsafe {
            api::Broker::new_unchecked(self.broker_id)
        }
    }

    /// Paid commission of the `Broker`.
    #[must_use]
    pub fn paid(&self) -> Money {
        self.output.paid
    }

    /// Due, but not yet paid commission of the `Broker`.
    #[must_use]
    pub fn pending(&self) -> Money {
        self.output.pending
    }

    /// Number of the `Sale`s closed by the `Broker`.
    #[must_use]
    pub fn sales_count(&self) -> i32 {
        count(self.output.sales_count)
    }

    /// Number of the `Sale`s closed by the `Broker` in the current month.
    #[must_use]
    pub fn monthly_sales_count(&self) -> i32 {
        count(self.output.monthly_sales_count)
    }

    /// Unpaid `CommissionInstallment`s due within the next 7 days, the
    /// earliest first.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "BrokerDashboard.upcoming",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    #[must_use]
    pub fn upcoming(&self) -> Vec<api::sale::CommissionInstallment> {
        installments(&self.output.upcoming)
    }

    /// Unpaid `CommissionInstallment`s due in the past, the earliest first.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "BrokerDashboard.overdue",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    #[must_use]
    pub fn overdue(&self) -> Vec<api::sale::CommissionInstallment> {
        installments(&self.output.overdue)
    }

    /// Per-`Development` rows, the highest earning first.
    #[must_use]
    pub fn developments(&self) -> Vec<DevelopmentRow> {
        self.output
            .developments
            .iter()
            .copied()
            .map(DevelopmentRow)
            .collect()
    }
}

/// Converts the provided report entries into GraphQL objects.
fn installments(
    entries: &[query::report::broker_dashboard::Entry],
) -> Vec<api::sale::CommissionInstallment> {
    entries
        .iter()
        .map(|e| {
            api::sale::CommissionInstallment::new(
                e.sale_id,
                e.installment.clone(),
            )
        })
        .collect()
}

/// [`BrokerDashboard`] row of a single [`Development`].
///
/// [`Development`]: api::Development
#[derive(Clone, Copy, Debug)]
pub struct DevelopmentRow(query::report::broker_dashboard::DevelopmentRow);

/// `BrokerDashboard` row of a single `Development`.
#[graphql_object(name = "BrokerDashboardDevelopmentRow", context = Context)]
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

    /// Number of the `Broker`'s `Sale`s in the `Development`.
    #[must_use]
    pub fn sales_count(&self) -> i32 {
        count(self.0.sales_count)
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

    /// Sum of `paid` and `pending`.
    #[must_use]
    pub fn total(&self) -> Money {
        self.0.total()
    }
}
