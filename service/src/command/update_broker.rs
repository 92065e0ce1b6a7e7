//! [`Command`] for updating an existing [`Broker`].

use common::operations::{
    By, Commit, Lock, Select, Transact, Transacted, Update,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{broker, Broker},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for updating an existing [`Broker`].
///
/// Fields left as [`None`] keep their current values.
#[derive(Clone, Debug)]
pub struct UpdateBroker {
    /// ID of the [`Broker`] to be updated.
    pub broker_id: broker::Id,

    /// New [`broker::Name`].
    pub name: Option<broker::Name>,

    /// New [`broker::Email`].
    pub email: Option<broker::Email>,

    /// New [`broker::Phone`], where `Some(None)` removes the current one.
    pub phone: Option<Option<broker::Phone>>,

    /// New [`broker::HiringDate`].
    pub hired_on: Option<broker::HiringDate>,
}

impl<Db> Command<UpdateBroker> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Lock<By<Broker, broker::Id>>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Broker>, broker::Id>>,
            Ok = Option<Broker>,
            Err = Traced<database::Error>,
        > + Database<Update<Broker>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Broker;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: UpdateBroker) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let UpdateBroker {
            broker_id,
            name,
            email,
            phone,
            hired_on,
        } = cmd;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        tx.execute(Lock(By::new(broker_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let mut broker = tx
            .execute(Select(By::<Option<Broker>, _>::new(broker_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::BrokerNotExists(broker_id))
            .map_err(tracerr::wrap!())?;

        if let Some(name) = name {
            broker.name = name;
        }
        if let Some(email) = email {
            broker.email = email;
        }
        if let Some(phone) = phone {
            broker.phone = phone;
        }
        if let Some(hired_on) = hired_on {
            broker.hired_on = hired_on;
        }

        tx.execute(Update(broker.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        log::info!("`Broker(id: {broker_id})` updated");

        Ok(broker)
    }
}

/// Error of [`UpdateBroker`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Broker`] with the provided ID does not exist.
    #[display("`Broker(id: {_0})` does not exist")]
    BrokerNotExists(#[error(not(source))] broker::Id),
}
