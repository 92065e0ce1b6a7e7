//! [`Command`] for creating a new [`Broker`].

use common::{
    operations::{Commit, Insert, Transact, Transacted},
    DateTime,
};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{broker, Broker},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for creating a new [`Broker`].
#[derive(Clone, Debug)]
pub struct CreateBroker {
    /// [`broker::Name`] of a new [`Broker`].
    pub name: broker::Name,

    /// [`broker::Email`] of a new [`Broker`].
    pub email: broker::Email,

    /// [`broker::Phone`] of a new [`Broker`], if any.
    pub phone: Option<broker::Phone>,

    /// [`broker::HiringDate`] of a new [`Broker`].
    pub hired_on: broker::HiringDate,
}

impl<Db> Command<CreateBroker> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<Insert<Broker>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Broker;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: CreateBroker) -> Result<Self::Ok, Self::Err> {
        let CreateBroker {
            name,
            email,
            phone,
            hired_on,
        } = cmd;

        let broker = Broker {
            id: broker::Id::new(),
            name,
            email,
            phone,
            hired_on,
            created_at: DateTime::now().coerce(),
        };

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::wrap!())?;
        tx.execute(Insert(broker.clone()))
            .await
            .map_err(tracerr::wrap!())
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::wrap!())
            .map(drop)?;

        log::info!("`Broker(id: {})` created", broker.id);

        Ok(broker)
    }
}

/// Error of [`CreateBroker`] [`Command`] execution.
pub type ExecutionError = database::Error;
