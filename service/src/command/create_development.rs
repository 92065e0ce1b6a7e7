//! [`Command`] for creating a new [`Development`].

use common::{
    operations::{Commit, Insert, Transact, Transacted},
    DateTime, Money,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{development, Development},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for creating a new [`Development`].
#[derive(Clone, Debug)]
pub struct CreateDevelopment {
    /// [`development::Name`] of a new [`Development`].
    pub name: development::Name,

    /// [`development::Location`] of a new [`Development`].
    pub location: development::Location,

    /// Fixed commission paid for every sale of a new [`Development`].
    pub commission: Money,
}

impl<Db> Command<CreateDevelopment> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Insert<Development>,
            Err = Traced<database::Error>,
        > + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Development;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: CreateDevelopment,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateDevelopment {
            name,
            location,
            commission,
        } = cmd;

        if commission.is_negative() {
            return Err(tracerr::new!(E::NegativeCommission(commission)));
        }
        if commission.exceeds_max() {
            return Err(tracerr::new!(E::CommissionOutOfRange(commission)));
        }

        let development = Development {
            id: development::Id::new(),
            name,
            location,
            commission,
            created_at: DateTime::now().coerce(),
        };

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        tx.execute(Insert(development.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        log::info!("`Development(id: {})` created", development.id);

        Ok(development)
    }
}

/// Error of [`CreateDevelopment`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// Commission of the [`Development`] is negative.
    #[display("commission must not be negative, but is {_0}")]
    NegativeCommission(#[error(not(source))] Money),

    /// Commission of the [`Development`] is above [`Money::MAX`].
    #[display("commission must not exceed {}, but is {_0}", Money::MAX)]
    CommissionOutOfRange(#[error(not(source))] Money),
}
