//! [`Command`] for creating a new [`Sale`].

use common::{
    operations::{By, Commit, Insert, Lock, Select, Transact, Transacted},
    DateTime, Money,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{
        broker, development,
        sale::{self, schedule::InvalidInput, Schedule},
        Broker, Development, Sale,
    },
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for creating a new [`Sale`] along with its installments.
///
/// The commission of the [`Sale`] is copied from its [`Development`].
#[derive(Clone, Debug)]
pub struct CreateSale {
    /// [`sale::ClientName`] of a new [`Sale`].
    pub client_name: sale::ClientName,

    /// ID of the [`Development`] a new [`Sale`] belongs to.
    pub development_id: development::Id,

    /// ID of the [`Broker`] who closed a new [`Sale`].
    pub broker_id: broker::Id,

    /// Total down payment of a new [`Sale`].
    pub down_payment: Money,

    /// Number of installments the down payment is split into.
    pub installments_count: i32,

    /// [`sale::ClosingDate`] of a new [`Sale`].
    pub sold_on: sale::ClosingDate,

    /// [`sale::Lot`] of a new [`Sale`], if any.
    pub lot: Option<sale::Lot>,

    /// [`sale::Block`] of a new [`Sale`], if any.
    pub block: Option<sale::Block>,
}

impl<Db> Command<CreateSale> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Select<By<Option<Broker>, broker::Id>>,
            Ok = Option<Broker>,
            Err = Traced<database::Error>,
        > + Database<
            Lock<By<Development, development::Id>>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Development>, development::Id>>,
            Ok = Option<Development>,
            Err = Traced<database::Error>,
        > + Database<Insert<Sale>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Sale;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: CreateSale) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateSale {
            client_name,
            development_id,
            broker_id,
            down_payment,
            installments_count,
            sold_on,
            lot,
            block,
        } = cmd;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        tx.execute(Select(By::<Option<Broker>, _>::new(broker_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::BrokerNotExists(broker_id))
            .map_err(tracerr::wrap!())
            .map(drop)?;

        // Commission must not change while being copied.
        tx.execute(Lock(By::new(development_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let development = tx
            .execute(Select(By::<Option<Development>, _>::new(development_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::DevelopmentNotExists(development_id))
            .map_err(tracerr::wrap!())?;

        let Schedule {
            installments_count,
            down_payment_installments,
            commission_installments,
        } = Schedule::generate(
            down_payment,
            installments_count,
            sold_on,
            development.commission,
        )
        .map_err(tracerr::from_and_wrap!(=> E))?;

        let sale = Sale {
            id: sale::Id::new(),
            client_name,
            development_id,
            broker_id,
            down_payment,
            installments_count,
            sold_on,
            commission: development.commission,
            lot,
            block,
            down_payment_installments,
            commission_installments,
            created_at: DateTime::now().coerce(),
        };

        tx.execute(Insert(sale.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        log::info!(
            "`Sale(id: {})` created with {} installments",
            sale.id,
            sale.installments_count.get(),
        );

        Ok(sale)
    }
}

/// Error of [`CreateSale`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Broker`] with the provided ID does not exist.
    #[display("`Broker(id: {_0})` does not exist")]
    BrokerNotExists(#[error(not(source))] broker::Id),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Development`] with the provided ID does not exist.
    #[display("`Development(id: {_0})` does not exist")]
    DevelopmentNotExists(#[error(not(source))] development::Id),

    /// Installments can't be scheduled out of the provided inputs.
    #[display("Invalid input: {_0}")]
    #[from]
    InvalidInput(InvalidInput),
}
