//! [`Development`]-related [`Database`] implementations.

use common::operations::{By, Delete, Insert, Lock, Select, Update};
use tracerr::Traced;

use crate::{
    domain::{development, Development},
    infra::{
        database::{
            self,
            memory::{Storage, Tx},
            Memory,
        },
        Database,
    },
};

impl<S> Database<Select<By<Option<Development>, development::Id>>>
    for Memory<S>
where
    S: Storage,
{
    type Ok = Option<Development>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Development>, development::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        Ok(self.state().read().await.developments.get(&id).cloned())
    }
}

impl<S> Database<Select<By<Vec<Development>, ()>>> for Memory<S>
where
    S: Storage,
{
    type Ok = Vec<Development>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Select<By<Vec<Development>, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        let mut developments = self
            .state()
            .read()
            .await
            .developments
            .values()
            .cloned()
            .collect::<Vec<_>>();
        developments.sort_by(|a, b| {
            (&a.name, a.created_at).cmp(&(&b.name, b.created_at))
        });
        Ok(developments)
    }
}

impl Database<Insert<Development>> for Memory<Tx> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(development): Insert<Development>,
    ) -> Result<Self::Ok, Self::Err> {
        self.execute(Update(development))
            .await
            .map_err(tracerr::wrap!())
    }
}

impl Database<Update<Development>> for Memory<Tx> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(development): Update<Development>,
    ) -> Result<Self::Ok, Self::Err> {
        drop(
            self.state()
                .write()
                .await
                .developments
                .insert(development.id, development),
        );
        Ok(())
    }
}

impl Database<Delete<By<Development, development::Id>>> for Memory<Tx> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Development, development::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        drop(self.state().write().await.developments.remove(&id));
        Ok(())
    }
}

impl Database<Lock<By<Development, development::Id>>> for Memory<Tx> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Lock<By<Development, development::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Transactions are serialized already.
        Ok(())
    }
}
