//! [`BrokerDashboard`] report definition.

use common::{
    operations::{By, Select},
    Money,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{
        broker,
        development,
        sale::{self, commission, COMMISSION_LAG_DAYS},
        Broker, Sale,
    },
    infra::{database, Database},
    read::sale::Month,
    Query, Service,
};

/// [`Query`] summarizing commissions of a single [`Broker`].
#[derive(Clone, Copy, Debug)]
pub struct BrokerDashboard {
    /// ID of the [`Broker`] to summarize commissions of.
    pub broker_id: broker::Id,
}

/// Output of the [`BrokerDashboard`] [`Query`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Output {
    /// Sum of the paid commission installments of the [`Broker`].
    pub paid: Money,

    /// Sum of the due, but unpaid commission installments of the [`Broker`].
    pub pending: Money,

    /// Number of [`Sale`]s the [`Broker`] closed.
    pub sales_count: usize,

    /// Number of [`Sale`]s the [`Broker`] closed in the current [`Month`].
    pub monthly_sales_count: usize,

    /// Unpaid commission installments due within the next
    /// [`COMMISSION_LAG_DAYS`], the earliest first.
    pub upcoming: Vec<Entry>,

    /// Overdue commission installments, the earliest first.
    pub overdue: Vec<Entry>,

    /// Per-development rows of the [`Sale`]s the [`Broker`] closed, the best
    /// earning first.
    pub developments: Vec<DevelopmentRow>,
}

/// Commission installment of a [`Sale`] in the [`Output`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Entry {
    /// ID of the [`Sale`] the installment belongs to.
    pub sale_id: sale::Id,

    /// The installment itself.
    pub installment: commission::Installment,
}

/// Commissions of the [`Broker`] for a single development.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct DevelopmentRow {
    /// ID of the development.
    pub development_id: development::Id,

    /// Number of [`Sale`]s of the development closed by the [`Broker`].
    pub sales_count: usize,

    /// Commission paid for the [`Sale`]s.
    pub paid: Money,

    /// Commission due, but not yet paid for the [`Sale`]s.
    pub pending: Money,
}

impl DevelopmentRow {
    /// Returns the paid and pending commission together.
    #[must_use]
    pub fn total(&self) -> Money {
        self.paid + self.pending
    }
}

impl<Db> Query<BrokerDashboard> for Service<Db>
where
    Db: Database<
            Select<By<Option<Broker>, broker::Id>>,
            Ok = Option<Broker>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Vec<Sale>, broker::Id>>,
            Ok = Vec<Sale>,
            Err = Traced<database::Error>,
        >,
{
    type Ok = Output;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        BrokerDashboard { broker_id }: BrokerDashboard,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        self.database()
            .execute(Select(By::<Option<Broker>, _>::new(broker_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::BrokerNotExists(broker_id))
            .map_err(tracerr::wrap!())
            .map(drop)?;

        let sales = self
            .database()
            .execute(Select(By::<Vec<Sale>, _>::new(broker_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let today = self.today();
        let horizon = today.checked_add_days(COMMISSION_LAG_DAYS);
        let month = Month::of(today);

        let mut output = Output {
            paid: Money::ZERO,
            pending: Money::ZERO,
            sales_count: sales.len(),
            monthly_sales_count: 0,
            upcoming: vec![],
            overdue: vec![],
            developments: vec![],
        };
        for s in sales {
            let (paid, pending) = (s.commission_paid(), s.commission_pending());
            output.paid += paid;
            output.pending += pending;
            if Month::of(s.sold_on) == month {
                output.monthly_sales_count += 1;
            }

            if let Some(row) = output
                .developments
                .iter_mut()
                .find(|r| r.development_id == s.development_id)
            {
                row.sales_count += 1;
                row.paid += paid;
                row.pending += pending;
            } else {
                output.developments.push(DevelopmentRow {
                    development_id: s.development_id,
                    sales_count: 1,
                    paid,
                    pending,
                });
            }

            for i in s.commission_installments {
                let Some(due_on) = i.due_on.filter(|_| !i.is_paid()) else {
                    continue;
                };
                let due_on = due_on.coerce();
                let entry = Entry {
                    sale_id: s.id,
                    installment: i,
                };
                if due_on < today {
                    output.overdue.push(entry);
                } else if horizon.map_or(true, |h| due_on <= h) {
                    output.upcoming.push(entry);
                }
            }
        }

        output.upcoming.sort_by_key(|e| e.installment.due_on);
        output.overdue.sort_by_key(|e| e.installment.due_on);
        output.developments.sort_by(|a, b| b.total().cmp(&a.total()));

        Ok(output)
    }
}

/// Error of [`BrokerDashboard`] [`Query`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Broker`] with the provided ID does not exist.
    #[display("`Broker(id: {_0})` does not exist")]
    BrokerNotExists(#[error(not(source))] broker::Id),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),
}
