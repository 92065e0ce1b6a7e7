//! [`Sale`]-related [`Database`] implementations.

use common::{
    operations::{By, Delete, Insert, Lock, Select, Update},
    pagination,
};
use tracerr::Traced;

use crate::{
    domain::{broker, sale, Sale},
    infra::{
        database::{
            self,
            memory::{Storage, Tx},
            Memory,
        },
        Database,
    },
    read,
};

impl<S> Database<Select<By<Option<Sale>, sale::Id>>> for Memory<S>
where
    S: Storage,
{
    type Ok = Option<Sale>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Sale>, sale::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        Ok(self.state().read().await.sales.get(&id).cloned())
    }
}

impl<S> Database<Select<By<Option<sale::Id>, sale::down_payment::Id>>>
    for Memory<S>
where
    S: Storage,
{
    type Ok = Option<sale::Id>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<sale::Id>, sale::down_payment::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        Ok(self
            .state()
            .read()
            .await
            .sales
            .values()
            .find(|s| s.down_payment_installment(id).is_some())
            .map(|s| s.id))
    }
}

impl<S> Database<Select<By<Option<sale::Id>, sale::commission::Id>>>
    for Memory<S>
where
    S: Storage,
{
    type Ok = Option<sale::Id>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<sale::Id>, sale::commission::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        Ok(self
            .state()
            .read()
            .await
            .sales
            .values()
            .find(|s| s.commission_installment(id).is_some())
            .map(|s| s.id))
    }
}

impl<S> Database<Select<By<Vec<Sale>, read::sale::Period>>> for Memory<S>
where
    S: Storage,
{
    type Ok = Vec<Sale>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Sale>, read::sale::Period>>,
    ) -> Result<Self::Ok, Self::Err> {
        let period = by.into_inner();
        Ok(newest_first(
            self.state()
                .read()
                .await
                .sales
                .values()
                .filter(|s| period.contains(s.sold_on))
                .cloned()
                .collect(),
        ))
    }
}

impl<S> Database<Select<By<Vec<Sale>, broker::Id>>> for Memory<S>
where
    S: Storage,
{
    type Ok = Vec<Sale>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Sale>, broker::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let broker_id = by.into_inner();
        Ok(newest_first(
            self.state()
                .read()
                .await
                .sales
                .values()
                .filter(|s| s.broker_id == broker_id)
                .cloned()
                .collect(),
        ))
    }
}

impl Database<Insert<Sale>> for Memory<Tx> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(sale): Insert<Sale>,
    ) -> Result<Self::Ok, Self::Err> {
        self.execute(Update(sale)).await.map_err(tracerr::wrap!())
    }
}

impl Database<Update<Sale>> for Memory<Tx> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(sale): Update<Sale>,
    ) -> Result<Self::Ok, Self::Err> {
        drop(self.state().write().await.sales.insert(sale.id, sale));
        Ok(())
    }
}

impl Database<Delete<By<Sale, sale::Id>>> for Memory<Tx> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Sale, sale::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        drop(self.state().write().await.sales.remove(&id));
        Ok(())
    }
}

impl Database<Lock<By<Sale, sale::Id>>> for Memory<Tx> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Lock<By<Sale, sale::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Transactions are serialized already.
        Ok(())
    }
}

impl<S>
    Database<Select<By<read::sale::list::Page, read::sale::list::Selector>>>
    for Memory<S>
where
    S: Storage,
{
    type Ok = read::sale::list::Page;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<read::sale::list::Page, read::sale::list::Selector>,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        use pagination::Kind as K;
        use read::sale::list::Cursor;

        let read::sale::list::Selector { arguments, filter } = by.into_inner();

        let key = |c: &Cursor| (c.created_at, c.id);
        let passes = |c: &Cursor| {
            let Some(cursor) = arguments.cursor() else {
                return true;
            };
            // Newest `Sale`s go first, so "after" means "older".
            match arguments.kind() {
                K::Forward => key(c) < key(cursor),
                K::ForwardIncluding => key(c) <= key(cursor),
                K::Backward => key(c) > key(cursor),
                K::BackwardIncluding => key(c) >= key(cursor),
            }
        };

        let mut cursors = self
            .state()
            .read()
            .await
            .sales
            .values()
            .filter(|s| filter.matches(s))
            .map(Cursor::from)
            .filter(passes)
            .collect::<Vec<_>>();
        cursors.sort_by(|a, b| key(b).cmp(&key(a)));
        if arguments.kind().is_backward() {
            cursors.reverse();
        }

        let has_more = cursors.len() > arguments.limit();
        let edges = cursors
            .into_iter()
            .take(arguments.limit())
            .map(|c| (c, c.id))
            .collect::<Vec<_>>();

        Ok(read::sale::list::Page::new(&arguments, edges, has_more))
    }
}

impl<S>
    Database<Select<By<read::sale::list::TotalCount, read::sale::list::Filter>>>
    for Memory<S>
where
    S: Storage,
{
    type Ok = read::sale::list::TotalCount;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<read::sale::list::TotalCount, read::sale::list::Filter>,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        let filter = by.into_inner();
        let count = self
            .state()
            .read()
            .await
            .sales
            .values()
            .filter(|s| filter.matches(s))
            .count();
        Ok(i32::try_from(count).unwrap_or(i32::MAX).into())
    }
}

/// Sorts the provided [`Sale`]s from the newest to the oldest one.
fn newest_first(mut sales: Vec<Sale>) -> Vec<Sale> {
    sales.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
    sales
}
