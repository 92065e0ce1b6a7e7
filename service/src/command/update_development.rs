//! [`Command`] for updating an existing [`Development`].

use common::{
    operations::{By, Commit, Lock, Select, Transact, Transacted, Update},
    Money,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

#[cfg(doc)]
use crate::domain::Sale;
use crate::{
    domain::{development, Development},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for updating an existing [`Development`].
///
/// Existing [`Sale`]s keep the commission they were closed with.
#[derive(Clone, Debug)]
pub struct UpdateDevelopment {
    /// ID of the [`Development`] to be updated.
    pub development_id: development::Id,

    /// New [`development::Name`], if it should be changed.
    pub name: Option<development::Name>,

    /// New [`development::Location`], if it should be changed.
    pub location: Option<development::Location>,

    /// New commission, if it should be changed.
    pub commission: Option<Money>,
}

impl<Db> Command<UpdateDevelopment> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Lock<By<Development, development::Id>>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Development>, development::Id>>,
            Ok = Option<Development>,
            Err = Traced<database::Error>,
        > + Database<Update<Development>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Development;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: UpdateDevelopment,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let UpdateDevelopment {
            development_id,
            name,
            location,
            commission,
        } = cmd;

        if let Some(commission) = commission {
            if commission.is_negative() {
                return Err(tracerr::new!(E::NegativeCommission(commission)));
            }
            if commission.exceeds_max() {
                return Err(tracerr::new!(E::CommissionOutOfRange(
                    commission
                )));
            }
        }

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        tx.execute(Lock(By::new(development_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let mut development = tx
            .execute(Select(By::<Option<Development>, _>::new(development_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::DevelopmentNotExists(development_id))
            .map_err(tracerr::wrap!())?;

        if let Some(name) = name {
            development.name = name;
        }
        if let Some(location) = location {
            development.location = location;
        }
        if let Some(commission) = commission {
            development.commission = commission;
        }

        tx.execute(Update(development.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        log::info!("`Development(id: {development_id})` updated");

        Ok(development)
    }
}

/// Error of [`UpdateDevelopment`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Development`] with the provided ID does not exist.
    #[display("`Development(id: {_0})` does not exist")]
    DevelopmentNotExists(#[error(not(source))] development::Id),

    /// New commission of the [`Development`] is negative.
    #[display("commission must not be negative, but is {_0}")]
    NegativeCommission(#[error(not(source))] Money),

    /// New commission of the [`Development`] is above [`Money::MAX`].
    #[display("commission must not exceed {}, but is {_0}", Money::MAX)]
    CommissionOutOfRange(#[error(not(source))] Money),
}
