//! [`Broker`]-related [`Database`] implementations.

use common::operations::{By, Delete, Insert, Lock, Select, Update};
use tracerr::Traced;

use crate::{
    domain::{broker, Broker},
    infra::{
        database::{
            self,
            memory::{Storage, Tx},
            Memory,
        },
        Database,
    },
};

impl<S> Database<Select<By<Option<Broker>, broker::Id>>> for Memory<S>
where
    S: Storage,
{
    type Ok = Option<Broker>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Broker>, broker::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        Ok(self.state().read().await.brokers.get(&id).cloned())
    }
}

impl<S> Database<Select<By<Vec<Broker>, ()>>> for Memory<S>
where
    S: Storage,
{
    type Ok = Vec<Broker>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Select<By<Vec<Broker>, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        let mut brokers = self
            .state()
            .read()
            .await
            .brokers
            .values()
            .cloned()
            .collect::<Vec<_>>();
        brokers.sort_by(|a, b| {
            (&a.name, a.created_at).cmp(&(&b.name, b.created_at))
        });
        Ok(brokers)
    }
}

impl Database<Insert<Broker>> for Memory<Tx> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(broker): Insert<Broker>,
    ) -> Result<Self::Ok, Self::Err> {
        self.execute(Update(broker)).await.map_err(tracerr::wrap!())
    }
}

impl Database<Update<Broker>> for Memory<Tx> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(broker): Update<Broker>,
    ) -> Result<Self::Ok, Self::Err> {
        drop(self.state().write().await.brokers.insert(broker.id, broker));
        Ok(())
    }
}

impl Database<Delete<By<Broker, broker::Id>>> for Memory<Tx> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Broker, broker::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        drop(self.state().write().await.brokers.remove(&id));
        Ok(())
    }
}

impl Database<Lock<By<Broker, broker::Id>>> for Memory<Tx> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Lock<By<Broker, broker::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Transactions are serialized already.
        Ok(())
    }
}
