//! [`Command`] for deleting a [`Development`].

use common::operations::{
    By, Commit, Delete, Lock, Select, Transact, Transacted,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

#[cfg(doc)]
use crate::domain::Sale;
use crate::{
    domain::{development, Development},
    infra::{database, Database},
    read::sale::list::{Filter, TotalCount},
    Service,
};

use super::Command;

/// [`Command`] for deleting a [`Development`] which has no [`Sale`]s.
#[derive(Clone, Copy, Debug)]
pub struct DeleteDevelopment {
    /// ID of the [`Development`] to be deleted.
    pub development_id: development::Id,
}

impl<Db> Command<DeleteDevelopment> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Lock<By<Development, development::Id>>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Development>, development::Id>>,
            Ok = Option<Development>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<TotalCount, Filter>>,
            Ok = TotalCount,
            Err = Traced<database::Error>,
        > + Database<
            Delete<By<Development, development::Id>>,
            Err = Traced<database::Error>,
        > + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Development;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: DeleteDevelopment,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let DeleteDevelopment { development_id } = cmd;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

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

        let sales = tx
            .execute(Select(By::<TotalCount, _>::new(Filter {
                development_id: Some(development_id),
                ..Filter::default()
            })))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if i32::from(sales) > 0 {
            return Err(tracerr::new!(E::DevelopmentHasSales(
                development_id
            )));
        }

        tx.execute(Delete(By::<Development, _>::new(development_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        log::info!("`Development(id: {development_id})` deleted");

        Ok(development)
    }
}

/// Error of [`DeleteDevelopment`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Development`] with the provided ID does not exist.
    #[display("`Development(id: {_0})` does not exist")]
    DevelopmentNotExists(#[error(not(source))] development::Id),

    /// [`Development`] still has [`Sale`]s referencing it.
    #[display("`Development(id: {_0})` has sales")]
    DevelopmentHasSales(#[error(not(source))] development::Id),
}
