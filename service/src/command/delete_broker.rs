//! [`Command`] for deleting a [`Broker`].

use common::operations::{
    By, Commit, Delete, Lock, Select, Transact, Transacted,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

#[cfg(doc)]
use crate::domain::Sale;
use crate::{
    domain::{broker, Broker},
    infra::{database, Database},
    read::sale::list::{Filter, TotalCount},
    Service,
};

use super::Command;

/// [`Command`] for deleting a [`Broker`] who has no [`Sale`]s.
#[derive(Clone, Copy, Debug)]
pub struct DeleteBroker {
    /// ID of the [`Broker`] to be deleted.
    pub broker_id: broker::Id,
}

impl<Db> Command<DeleteBroker> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Lock<By<Broker, broker::Id>>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Broker>, broker::Id>>,
            Ok = Option<Broker>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<TotalCount, Filter>>,
            Ok = TotalCount,
            Err = Traced<database::Error>,
        > + Database<
            Delete<By<Broker, broker::Id>>,
            Err = Traced<database::Error>,
        > + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Broker;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: DeleteBroker) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let DeleteBroker { broker_id } = cmd;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        tx.execute(Lock(By::new(broker_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let broker = tx
            .execute(Select(By::<Option<Broker>, _>::new(broker_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::BrokerNotExists(broker_id))
            .map_err(tracerr::wrap!())?;

        let sales = tx
            .execute(Select(By::<TotalCount, _>::new(Filter {
                broker_id: Some(broker_id),
                ..Filter::default()
            })))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if i32::from(sales) > 0 {
            return Err(tracerr::new!(E::BrokerHasSales(broker_id)));
        }

        tx.execute(Delete(By::<Broker, _>::new(broker_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        log::info!("`Broker(id: {broker_id})` deleted");

        Ok(broker)
    }
}

/// Error of [`DeleteBroker`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Broker`] with the provided ID does not exist.
    #[display("`Broker(id: {_0})` does not exist")]
    BrokerNotExists(#[error(not(source))] broker::Id),

    /// [`Broker`] still has [`Sale`]s referencing it.
    #[display("`Broker(id: {_0})` has sales")]
    BrokerHasSales(#[error(not(source))] broker::Id),
}
