//! [`Commissions`] report definition.

use std::collections::HashMap;

use common::{
    operations::{By, Select},
    Money,
};
use tracerr::Traced;

use crate::{
    domain::{broker, development, sale, Broker, Development, Sale},
    infra::{database, Database},
    read::sale::{Month, Period},
    Query, Service,
};

/// [`Query`] summarizing commissions of the [`Sale`]s closed in a [`Period`].
#[derive(Clone, Copy, Debug, Default)]
pub struct Commissions {
    /// [`Period`] the [`Sale`]s were closed in.
    pub period: Period,
}

/// Output of the [`Commissions`] [`Query`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Output {
    /// Sum of all the paid commission installments.
    pub paid: Money,

    /// Sum of all the due, but unpaid commission installments.
    pub pending: Money,

    /// Sum of the commissions of all the [`Sale`]s.
    pub generated: Money,

    /// Number of [`Sale`]s.
    pub sales_count: usize,

    /// Sum of the down payments of the [`Sale`]s closed in the current
    /// [`Month`], regardless of the [`Period`].
    pub monthly_revenue: Money,

    /// Number of overdue commission installments.
    pub overdue_count: usize,

    /// Number of [`Broker`]s.
    pub brokers_count: usize,

    /// Per-[`Broker`] rows, the best earning [`Broker`] first.
    pub brokers: Vec<BrokerRow>,

    /// Per-[`Development`] rows, the best selling [`Development`] first.
    pub developments: Vec<DevelopmentRow>,
}

/// Commissions of a single [`Broker`] in the [`Output`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct BrokerRow {
    /// ID of the [`Broker`].
    pub broker_id: broker::Id,

    /// Number of [`Sale`]s the [`Broker`] closed.
    pub sales_count: usize,

    /// Commission paid to the [`Broker`].
    pub paid: Money,

    /// Commission due, but not yet paid to the [`Broker`].
    pub pending: Money,
}

impl BrokerRow {
    /// Returns the paid and pending commission together.
    #[must_use]
    pub fn total(&self) -> Money {
        self.paid + self.pending
    }
}

/// Commissions of a single [`Development`] in the [`Output`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct DevelopmentRow {
    /// ID of the [`Development`].
    pub development_id: development::Id,

    /// Number of [`Sale`]s of the [`Development`].
    pub sales_count: usize,

    /// Sum of the down payments of the [`Sale`]s.
    pub revenue: Money,

    /// Sum of the commissions of the [`Sale`]s.
    pub commission: Money,

    /// Commission paid for the [`Sale`]s.
    pub paid: Money,

    /// Commission due, but not yet paid for the [`Sale`]s.
    pub pending: Money,
}

impl<Db> Query<Commissions> for Service<Db>
where
    Db: Database<
            Select<By<Vec<Sale>, Period>>,
            Ok = Vec<Sale>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Vec<Broker>, ()>>,
            Ok = Vec<Broker>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Vec<Development>, ()>>,
            Ok = Vec<Development>,
            Err = Traced<database::Error>,
        >,
{
    type Ok = Output;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Commissions { period }: Commissions,
    ) -> Result<Self::Ok, Self::Err> {
        let today = self.today();

        let sales = self
            .database()
            .execute(Select(By::<Vec<Sale>, _>::new(period)))
            .await
            .map_err(tracerr::wrap!())?;
        let monthly_revenue = self
            .database()
            .execute(Select(By::<Vec<Sale>, _>::new(Period::month(
                Month::of(today),
            ))))
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(|s| s.down_payment)
            .sum();
        let brokers = self
            .database()
            .execute(Select(By::<Vec<Broker>, _>::new(())))
            .await
            .map_err(tracerr::wrap!())?;
        let developments = self
            .database()
            .execute(Select(By::<Vec<Development>, _>::new(())))
            .await
            .map_err(tracerr::wrap!())?;

        let mut broker_rows = brokers
            .iter()
            .map(|b| {
                (b.id, BrokerRow {
                    broker_id: b.id,
                    sales_count: 0,
                    paid: Money::ZERO,
                    pending: Money::ZERO,
                })
            })
            .collect::<HashMap<_, _>>();
        let mut development_rows = developments
            .iter()
            .map(|d| {
                (d.id, DevelopmentRow {
                    development_id: d.id,
                    sales_count: 0,
                    revenue: Money::ZERO,
                    commission: Money::ZERO,
                    paid: Money::ZERO,
                    pending: Money::ZERO,
                })
            })
            .collect::<HashMap<_, _>>();

        let mut output = Output {
            paid: Money::ZERO,
            pending: Money::ZERO,
            generated: Money::ZERO,
            sales_count: sales.len(),
            monthly_revenue,
            overdue_count: 0,
            brokers_count: brokers.len(),
            brokers: Vec::with_capacity(brokers.len()),
            developments: Vec::with_capacity(developments.len()),
        };
        for s in &sales {
            let (paid, pending) = (s.commission_paid(), s.commission_pending());
            output.paid += paid;
            output.pending += pending;
            output.generated += s.commission;
            output.overdue_count += s
                .commission_installments
                .iter()
                .filter(|i| i.status(today) == sale::Status::Overdue)
                .count();

            if let Some(row) = broker_rows.get_mut(&s.broker_id) {
                row.sales_count += 1;
                row.paid += paid;
                row.pending += pending;
            }
            if let Some(row) = development_rows.get_mut(&s.development_id) {
                row.sales_count += 1;
                row.revenue += s.down_payment;
                row.commission += s.commission;
                row.paid += paid;
                row.pending += pending;
            }
        }

        // Rows follow the name order of their subjects on ties.
        output.brokers.extend(
            brokers.iter().filter_map(|b| broker_rows.remove(&b.id)),
        );
        output.brokers.sort_by(|a, b| b.total().cmp(&a.total()));
        output.developments.extend(
            developments
                .iter()
                .filter_map(|d| development_rows.remove(&d.id)),
        );
        output
            .developments
            .sort_by(|a, b| b.sales_count.cmp(&a.sales_count));

        Ok(output)
    }
}
