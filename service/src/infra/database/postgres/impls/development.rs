//! [`Development`]-related [`Database`] implementations.

use common::operations::{By, Delete, Insert, Lock, Select, Update};
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{development, Development},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
};

/// Builds a [`Development`] out of the provided [`Row`].
fn from_row(row: &Row) -> Development {
    Development {
        id: row.get("id"),
        name: row.get("name"),
        location: row.get("location"),
        commission: row.get("commission"),
        created_at: row.get("created_at"),
    }
}

impl<C> Database<Select<By<Option<Development>, development::Id>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Development>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Development>, development::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: development::Id = by.into_inner();

        const SQL: &str = "\
            SELECT id, name, location, commission, created_at \
            FROM developments \
            WHERE id = $1::UUID";
        self.query_opt(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(|row| row.as_ref().map(from_row))
    }
}

impl<C> Database<Select<By<Vec<Development>, ()>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Development>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Select<By<Vec<Development>, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        const SQL: &str = "\
            SELECT id, name, location, commission, created_at \
            FROM developments \
            ORDER BY name ASC, created_at ASC";
        self.query(SQL, &[])
            .await
            .map_err(tracerr::wrap!())
            .map(|rows| rows.iter().map(from_row).collect())
    }
}

impl<C> Database<Insert<Development>> for Postgres<C>
where
    C: Connection,
    Self: Database<Update<Development>, Ok = (), Err = Traced<database::Error>>,
{
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

impl<C> Database<Update<Development>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(development): Update<Development>,
    ) -> Result<Self::Ok, Self::Err> {
        let Development {
            id,
            name,
            location,
            commission,
            created_at,
        } = development;

        const SQL: &str = "\
            INSERT INTO developments (\
                id, name, location, commission, created_at\
            ) VALUES (\
                $1::UUID, $2::VARCHAR, $3::VARCHAR, $4::NUMERIC, \
                $5::TIMESTAMPTZ\
            ) \
            ON CONFLICT (id) DO UPDATE \
            SET name = EXCLUDED.name, \
                location = EXCLUDED.location, \
                commission = EXCLUDED.commission";
        self.exec(SQL, &[&id, &name, &location, &commission, &created_at])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C> Database<Lock<By<Development, development::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Lock(by): Lock<By<Development, development::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: development::Id = by.into_inner();

        const SQL: &str = "\
            SELECT id \
            FROM developments \
            WHERE id = $1::UUID \
            FOR UPDATE";
        self.query_opt(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C> Database<Delete<By<Development, development::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Development, development::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: development::Id = by.into_inner();

        const SQL: &str = "\
            DELETE FROM developments \
            WHERE id = $1::UUID";
        self.exec(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}
