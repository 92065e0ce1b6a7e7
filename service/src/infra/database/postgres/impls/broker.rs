//! [`Broker`]-related [`Database`] implementations.

use common::operations::{By, Delete, Insert, Lock, Select, Update};
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{broker, Broker},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
};

/// Builds a [`Broker`] out of the provided [`Row`].
fn from_row(row: &Row) -> Broker {
    Broker {
        id: row.get("id"),
        name: row.get("name"),
        email: row.get("email"),
        phone: row.get("phone"),
        hired_on: row.get("hired_on"),
        created_at: row.get("created_at"),
    }
}

impl<C> Database<Select<By<Option<Broker>, broker::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Broker>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Broker>, broker::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: broker::Id = by.into_inner();

        const SQL: &str = "\
            SELECT id, name, email, phone, hired_on, created_at \
            FROM brokers \
            WHERE id = $1::UUID";
        self.query_opt(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(|row| row.as_ref().map(from_row))
    }
}

impl<C> Database<Select<By<Vec<Broker>, ()>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Broker>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Select<By<Vec<Broker>, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        const SQL: &str = "\
            SELECT id, name, email, phone, hired_on, created_at \
            FROM brokers \
            ORDER BY name ASC, created_at ASC";
        self.query(SQL, &[])
            .await
            .map_err(tracerr::wrap!())
            .map(|rows| rows.iter().map(from_row).collect())
    }
}

impl<C> Database<Insert<Broker>> for Postgres<C>
where
    C: Connection,
    Self: Database<Update<Broker>, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(broker): Insert<Broker>,
    ) -> Result<Self::Ok, Self::Err> {
        self.execute(Update(broker)).await.map_err(tracerr::wrap!())
    }
}

impl<C> Database<Update<Broker>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(broker): Update<Broker>,
    ) -> Result<Self::Ok, Self::Err> {
        let Broker {
            id,
            name,
            email,
            phone,
            hired_on,
            created_at,
        } = broker;

        const SQL: &str = "\
            INSERT INTO brokers (\
                id, name, email, phone, hired_on, created_at\
            ) VALUES (\
                $1::UUID, $2::VARCHAR, $3::VARCHAR, $4::VARCHAR, \
                $5::DATE, $6::TIMESTAMPTZ\
            ) \
            ON CONFLICT (id) DO UPDATE \
            SET name = EXCLUDED.name, \
                email = EXCLUDED.email, \
                phone = EXCLUDED.phone, \
                hired_on = EXCLUDED.hired_on";
        self.exec(
            SQL,
            &[&id, &name, &email, &phone, &hired_on, &created_at],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}

impl<C> Database<Delete<By<Broker, broker::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Broker, broker::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: broker::Id = by.into_inner();

        const SQL: &str = "\
            DELETE FROM brokers \
            WHERE id = $1::UUID";
        self.exec(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

/// Holds the row until the transaction ends, so no [`Sale`] referencing the
/// [`Broker`] may be inserted meanwhile.
///
/// [`Sale`]: crate::domain::Sale
impl<C> Database<Lock<By<Broker, broker::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Lock(by): Lock<By<Broker, broker::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: broker::Id = by.into_inner();

        const SQL: &str = "\
            SELECT id \
            FROM brokers \
            WHERE id = $1::UUID \
            FOR UPDATE";
        self.query_opt(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}
