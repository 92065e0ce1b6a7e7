//! In-process [`Database`] implementation.
//!
//! Used in tests and local runs, where no external database is available.

mod impls;

use std::{collections::HashMap, sync::Arc};

use derive_more::Deref;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};

use crate::domain::{broker, development, sale, Broker, Development, Sale};
#[cfg(doc)]
use crate::infra::Database;

/// In-process [`Database`] keeping everything in memory.
///
/// Transactions are serialized: at most one [`Tx`] exists at a time, working
/// on its own copy of the [`State`] which replaces the shared one on commit.
/// Writes are implemented for [`Memory<Tx>`] only, so a commit never
/// discards a write made next to it. [`Memory<NonTx>`] only reads the
/// committed [`State`].
#[derive(Clone, Debug, Default, Deref)]
pub struct Memory<T = NonTx>(T);

impl Memory {
    /// Creates a new empty [`Memory`] database.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

/// Data stored in a [`Memory`] database.
#[derive(Clone, Debug, Default)]
pub struct State {
    /// Stored [`Broker`]s.
    brokers: HashMap<broker::Id, Broker>,

    /// Stored [`Development`]s.
    developments: HashMap<development::Id, Development>,

    /// Stored [`Sale`]s along with their installments.
    sales: HashMap<sale::Id, Sale>,
}

/// Storage of a [`State`].
pub trait Storage {
    /// Returns the [`State`] this [`Storage`] operates on.
    fn state(&self) -> &RwLock<State>;
}

/// Non-transactional [`Memory`] client.
#[derive(Clone, Debug, Default)]
pub struct NonTx {
    /// Committed [`State`].
    state: Arc<RwLock<State>>,

    /// Guard serializing [`Tx`]s.
    writer: Arc<Mutex<()>>,
}

impl Storage for NonTx {
    fn state(&self) -> &RwLock<State> {
        &self.state
    }
}

/// Transactional [`Memory`] client.
#[derive(Clone, Debug)]
pub struct Tx {
    /// Inner representation of this client.
    inner: Arc<Inner>,
}

/// Inner representation of the [`Tx`] client.
#[derive(Debug)]
struct Inner {
    /// [`State`] modified by this [`Tx`].
    staged: RwLock<State>,

    /// Committed [`State`] to be replaced on commit.
    committed: Arc<RwLock<State>>,

    /// Exclusive access to the committed [`State`], released on commit or
    /// drop.
    writer: Mutex<Option<OwnedMutexGuard<()>>>,
}

impl Tx {
    /// Starts a new [`Tx`] over the provided [`NonTx`] client, waiting for
    /// the previous one to finish.
    async fn start(client: &NonTx) -> Self {
        let writer = Arc::clone(&client.writer).lock_owned().await;
        let staged = client.state.read().await.clone();
        Self {
            inner: Arc::new(Inner {
                staged: RwLock::new(staged),
                committed: Arc::clone(&client.state),
                writer: Mutex::new(Some(writer)),
            }),
        }
    }

    /// Commits this [`Tx`], replacing the committed [`State`] with the staged
    /// one.
    ///
    /// Does nothing if this [`Tx`] is committed already.
    async fn commit(&self) {
        let mut writer = self.inner.writer.lock().await;
        if writer.is_none() {
            return;
        }
        *self.inner.committed.write().await =
            self.inner.staged.read().await.clone();
        drop(writer.take());
    }
}

impl Storage for Tx {
    fn state(&self) -> &RwLock<State> {
        &self.inner.staged
    }
}

#[cfg(test)]
mod spec {
    use common::{
        operations::{By, Commit, Insert, Select, Transact},
        DateTime,
    };

    use crate::{
        domain::{broker, Broker},
        infra::Database as _,
    };

    use super::Memory;

    fn broker(name: &str) -> Broker {
        Broker {
            id: broker::Id::new(),
            name: broker::Name::new(name).unwrap(),
            email: broker::Email::new("john@example.com").unwrap(),
            phone: None,
            hired_on: "2023-06-01".parse().unwrap(),
            created_at: DateTime::now().coerce(),
        }
    }

    #[tokio::test]
    async fn exposes_tx_writes_only_after_commit() {
        let db = Memory::new();
        let john = broker("John");

        let tx = db.execute(Transact).await.unwrap();
        tx.execute(Insert(john.clone())).await.unwrap();

        let by_id = || Select(By::<Option<Broker>, _>::new(john.id));
        assert!(tx.execute(by_id()).await.unwrap().is_some());
        assert!(db.execute(by_id()).await.unwrap().is_none());

        tx.execute(Commit).await.unwrap();

        assert!(db.execute(by_id()).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn discards_uncommitted_tx_writes() {
        let db = Memory::new();
        let john = broker("John");

        let tx = db.execute(Transact).await.unwrap();
        tx.execute(Insert(john.clone())).await.unwrap();
        drop(tx);

        let tx = db.execute(Transact).await.unwrap();
        let by_id = || Select(By::<Option<Broker>, _>::new(john.id));
        assert!(tx.execute(by_id()).await.unwrap().is_none());
        assert!(db.execute(by_id()).await.unwrap().is_none());
    }
}
