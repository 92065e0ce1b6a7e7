//! [`Sale`]-related [`Database`] implementations.

use std::collections::HashMap;

use common::{
    operations::{By, Delete, Insert, Lock, Select, Update},
    pagination::Order,
    Money,
};
use itertools::Itertools as _;
use postgres_types::ToSql;
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{
        broker,
        sale::{
            self, commission, down_payment, InstallmentNumber,
            InstallmentsCount,
        },
        Sale,
    },
    infra::{
        database::{
            self,
            postgres::{self, Connection},
            Postgres,
        },
        Database,
    },
    read,
};

/// Columns of the `sales` table, as [`Postgres::select_sales()`] expects
/// them.
const SALE_COLUMNS: &str = "\
    id, client_name, development_id, broker_id, \
    down_payment, installments_count, sold_on, commission, \
    lot, block, created_at";

impl<C> Postgres<C>
where
    C: Connection,
{
    /// Selects [`Sale`]s along with their installments, filtered by the
    /// provided SQL `condition` over the `sales` table, from the newest to
    /// the oldest one.
    async fn select_sales(
        &self,
        condition: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> Result<Vec<Sale>, Traced<database::Error>> {
        let sql = format!(
            "SELECT {SALE_COLUMNS} \
             FROM sales \
             WHERE {condition} \
             ORDER BY created_at DESC, id DESC",
        );
        let rows = self
            .query(sql.as_str(), params)
            .await
            .map_err(tracerr::wrap!())?;
        if rows.is_empty() {
            return Ok(vec![]);
        }
        let ids = rows
            .iter()
            .map(|r| r.get::<_, sale::Id>("id"))
            .collect::<Vec<_>>();

        const DOWN_PAYMENTS_SQL: &str = "\
            SELECT id, sale_id, number, amount, due_on, paid_on \
            FROM down_payment_installments \
            WHERE sale_id = ANY($1::UUID[]) \
            ORDER BY sale_id, number";
        let mut down_payments = HashMap::<_, Vec<_>>::new();
        for row in self
            .query(DOWN_PAYMENTS_SQL, &[&ids])
            .await
            .map_err(tracerr::wrap!())?
        {
            down_payments
                .entry(row.get::<_, sale::Id>("sale_id"))
                .or_default()
                .push(down_payment::Installment {
                    id: row.get("id"),
                    number: number(&row)?,
                    amount: row.get("amount"),
                    due_on: row.get("due_on"),
                    paid_on: row.get("paid_on"),
                });
        }

        const COMMISSIONS_SQL: &str = "\
            SELECT id, sale_id, number, amount, \
                   down_payment_installment_id, due_on, paid_on \
            FROM commission_installments \
            WHERE sale_id = ANY($1::UUID[]) \
            ORDER BY sale_id, number";
        let mut commissions = HashMap::<_, Vec<_>>::new();
        for row in self
            .query(COMMISSIONS_SQL, &[&ids])
            .await
            .map_err(tracerr::wrap!())?
        {
            commissions
                .entry(row.get::<_, sale::Id>("sale_id"))
                .or_default()
                .push(commission::Installment {
                    id: row.get("id"),
                    number: number(&row)?,
                    amount: row.get("amount"),
                    down_payment_installment_id: row
                        .get("down_payment_installment_id"),
                    due_on: row.get("due_on"),
                    paid_on: row.get("paid_on"),
                });
        }

        rows.into_iter()
            .map(|row| {
                let id = row.get("id");
                Ok(Sale {
                    id,
                    client_name: row.get("client_name"),
                    development_id: row.get("development_id"),
                    broker_id: row.get("broker_id"),
                    down_payment: row.get("down_payment"),
                    installments_count: InstallmentsCount::new(
                        row.get::<_, i16>("installments_count"),
                    )
                    .ok_or_else(|| malformed("installments_count"))?,
                    sold_on: row.get("sold_on"),
                    commission: row.get("commission"),
                    lot: row.get("lot"),
                    block: row.get("block"),
                    down_payment_installments: down_payments
                        .remove(&id)
                        .unwrap_or_default(),
                    commission_installments: commissions
                        .remove(&id)
                        .unwrap_or_default(),
                    created_at: row.get("created_at"),
                })
            })
            .collect()
    }
}

/// Reads [`InstallmentNumber`] out of the provided installment [`Row`].
fn number(row: &Row) -> Result<InstallmentNumber, Traced<database::Error>> {
    u16::try_from(row.get::<_, i16>("number"))
        .map(InstallmentNumber::from)
        .map_err(|_| malformed("number"))
}

/// Creates a new [`postgres::Error::Malformed`] for the provided `column`.
fn malformed(column: &'static str) -> Traced<database::Error> {
    tracerr::new!(database::Error::from(postgres::Error::Malformed(column)))
}

/// Converts the provided [`InstallmentNumber`] into its `INT2` column value.
fn int2(n: impl Into<u16>) -> i16 {
    i16::try_from(n.into()).unwrap_or_else(|_| {
        unreachable!("`InstallmentsCount::MAX` fits into `INT2`")
    })
}

impl<C> Database<Select<By<Option<Sale>, sale::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Sale>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Sale>, sale::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: sale::Id = by.into_inner();

        Ok(self
            .select_sales("id = $1::UUID", &[&id])
            .await
            .map_err(tracerr::wrap!())?
            .pop())
    }
}

impl<C> Database<Select<By<Option<sale::Id>, down_payment::Id>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<sale::Id>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<sale::Id>, down_payment::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: down_payment::Id = by.into_inner();

        const SQL: &str = "\
            SELECT sale_id \
            FROM down_payment_installments \
            WHERE id = $1::UUID";
        self.query_opt(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(|row| row.map(|r| r.get("sale_id")))
    }
}

impl<C> Database<Select<By<Option<sale::Id>, commission::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<sale::Id>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<sale::Id>, commission::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: commission::Id = by.into_inner();

        const SQL: &str = "\
            SELECT sale_id \
            FROM commission_installments \
            WHERE id = $1::UUID";
        self.query_opt(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(|row| row.map(|r| r.get("sale_id")))
    }
}

impl<C> Database<Select<By<Vec<Sale>, read::sale::Period>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Sale>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Sale>, read::sale::Period>>,
    ) -> Result<Self::Ok, Self::Err> {
        let read::sale::Period { from, to } = by.into_inner();

        self.select_sales(
            "($1::DATE IS NULL OR sold_on >= $1::DATE) \
             AND ($2::DATE IS NULL OR sold_on <= $2::DATE)",
            &[&from, &to],
        )
        .await
        .map_err(tracerr::wrap!())
    }
}

impl<C> Database<Select<By<Vec<Sale>, broker::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Sale>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Sale>, broker::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let broker_id: broker::Id = by.into_inner();

        self.select_sales("broker_id = $1::UUID", &[&broker_id])
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<C> Database<Insert<Sale>> for Postgres<C>
where
    C: Connection,
    Self: Database<Update<Sale>, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(sale): Insert<Sale>,
    ) -> Result<Self::Ok, Self::Err> {
        self.execute(Update(sale)).await.map_err(tracerr::wrap!())
    }
}

impl<C> Database<Update<Sale>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(sale): Update<Sale>,
    ) -> Result<Self::Ok, Self::Err> {
        let Sale {
            id,
            client_name,
            development_id,
            broker_id,
            down_payment,
            installments_count,
            sold_on,
            commission,
            lot,
            block,
            down_payment_installments,
            commission_installments,
            created_at,
        } = sale;

        let installments_count = int2(installments_count);

        // Total commission and the installments split never change.
        const SALE_SQL: &str = "\
            INSERT INTO sales (\
                id, client_name, development_id, broker_id, \
                down_payment, installments_count, sold_on, commission, \
                lot, block, created_at\
            ) VALUES (\
                $1::UUID, $2::VARCHAR, $3::UUID, $4::UUID, \
                $5::NUMERIC, $6::INT2, $7::DATE, $8::NUMERIC, \
                $9::VARCHAR, $10::VARCHAR, $11::TIMESTAMPTZ\
            ) \
            ON CONFLICT (id) DO UPDATE \
            SET client_name = EXCLUDED.client_name, \
                lot = EXCLUDED.lot, \
                block = EXCLUDED.block";
        self.exec(
            SALE_SQL,
            &[
                &id,
                &client_name,
                &development_id,
                &broker_id,
                &down_payment,
                &installments_count,
                &sold_on,
                &commission,
                &lot,
                &block,
                &created_at,
            ],
        )
        .await
        .map_err(tracerr::wrap!())?;

        let (ids, numbers, amounts, due_ons, paid_ons): (
            Vec<down_payment::Id>,
            Vec<i16>,
            Vec<Money>,
            Vec<down_payment::DueDate>,
            Vec<Option<down_payment::PaymentDate>>,
        ) = down_payment_installments
            .into_iter()
            .map(|i| (i.id, int2(i.number), i.amount, i.due_on, i.paid_on))
            .multiunzip();

        const DOWN_PAYMENTS_SQL: &str = "\
            INSERT INTO down_payment_installments (\
                id, sale_id, number, amount, due_on, paid_on\
            ) \
            SELECT i.id, $1::UUID, i.number, i.amount, i.due_on, i.paid_on \
            FROM UNNEST(\
                $2::UUID[], $3::INT2[], $4::NUMERIC[], $5::DATE[], \
                $6::DATE[]\
            ) AS i(id, number, amount, due_on, paid_on) \
            ON CONFLICT (id) DO UPDATE \
            SET paid_on = EXCLUDED.paid_on";
        self.exec(
            DOWN_PAYMENTS_SQL,
            &[&id, &ids, &numbers, &amounts, &due_ons, &paid_ons],
        )
        .await
        .map_err(tracerr::wrap!())?;

        let (ids, numbers, amounts, linked_ids, due_ons, paid_ons): (
            Vec<commission::Id>,
            Vec<i16>,
            Vec<Money>,
            Vec<down_payment::Id>,
            Vec<Option<commission::DueDate>>,
            Vec<Option<commission::PaymentDate>>,
        ) = commission_installments
            .into_iter()
            .map(|i| {
                (
                    i.id,
                    int2(i.number),
                    i.amount,
                    i.down_payment_installment_id,
                    i.due_on,
                    i.paid_on,
                )
            })
            .multiunzip();

        const COMMISSIONS_SQL: &str = "\
            INSERT INTO commission_installments (\
                id, sale_id, number, amount, \
                down_payment_installment_id, due_on, paid_on\
            ) \
            SELECT i.id, $1::UUID, i.number, i.amount, \
                   i.down_payment_installment_id, i.due_on, i.paid_on \
            FROM UNNEST(\
                $2::UUID[], $3::INT2[], $4::NUMERIC[], $5::UUID[], \
                $6::DATE[], $7::DATE[]\
            ) AS i(\
                id, number, amount, down_payment_installment_id, \
                due_on, paid_on\
            ) \
            ON CONFLICT (id) DO UPDATE \
            SET due_on = EXCLUDED.due_on, \
                paid_on = EXCLUDED.paid_on";
        self.exec(
            COMMISSIONS_SQL,
            &[&id, &ids, &numbers, &amounts, &linked_ids, &due_ons, &paid_ons],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}

impl<C> Database<Delete<By<Sale, sale::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Sale, sale::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: sale::Id = by.into_inner();

        // Installments are removed by `ON DELETE CASCADE`.
        const SQL: &str = "\
            DELETE FROM sales \
            WHERE id = $1::UUID";
        self.exec(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C> Database<Lock<By<Sale, sale::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Lock(by): Lock<By<Sale, sale::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: sale::Id = by.into_inner();

        const SQL: &str = "\
            SELECT id \
            FROM sales \
            WHERE id = $1::UUID \
            FOR UPDATE";
        self.query_opt(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

/// Month of a [`read::sale::list::Filter`] as its first and last days.
type MonthBounds = (sale::ClosingDate, sale::ClosingDate);

/// Pushes parameters of the provided [`read::sale::list::Filter`] into the
/// `ps` and returns the SQL conditions over the `sales` table using them.
fn filter_conditions<'a>(
    filter: &'a read::sale::list::Filter,
    month: &'a Option<MonthBounds>,
    ps: &mut Vec<&'a (dyn ToSql + Sync)>,
) -> String {
    use sale::Status as S;

    let mut sql = String::new();
    if let Some(id) = &filter.broker_id {
        ps.push(id);
        sql.push_str(&format!(" AND broker_id = ${}::UUID", ps.len()));
    }
    if let Some(id) = &filter.development_id {
        ps.push(id);
        sql.push_str(&format!(" AND development_id = ${}::UUID", ps.len()));
    }
    if let Some((first, last)) = month {
        ps.push(first);
        ps.push(last);
        sql.push_str(&format!(
            " AND sold_on BETWEEN ${}::DATE AND ${}::DATE",
            ps.len() - 1,
            ps.len(),
        ));
    }
    if let Some(status) = &filter.status {
        ps.push(&status.today);
        let today = ps.len();

        let unpaid = "\
            SELECT 1 \
            FROM commission_installments c \
            WHERE c.sale_id = sales.id \
              AND c.paid_on IS NULL";
        let overdue = format!("{unpaid} AND c.due_on < ${today}::DATE");
        let due = format!("{unpaid} AND c.due_on IS NOT NULL");
        sql.push_str(&match status.status {
            S::Paid => format!(" AND NOT EXISTS ({unpaid})"),
            S::Overdue => format!(" AND EXISTS ({overdue})"),
            S::Pending => {
                format!(" AND EXISTS ({due}) AND NOT EXISTS ({overdue})")
            }
            S::Awaiting => {
                format!(" AND EXISTS ({unpaid}) AND NOT EXISTS ({due})")
            }
        });
    }
    sql
}

impl<C>
    Database<Select<By<read::sale::list::Page, read::sale::list::Selector>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = read::sale::list::Page;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<read::sale::list::Page, read::sale::list::Selector>,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        let read::sale::list::Selector { arguments, filter } = by.into_inner();

        let limit =
            i32::try_from(arguments.limit()).unwrap_or(i32::MAX - 1) + 1;
        let month = filter.month.map(|m| (m.first_day(), m.last_day()));

        let mut ps: Vec<&(dyn ToSql + Sync)> = vec![&limit];
        let cursor_idx = arguments.cursor().map(|c| {
            ps.push(&c.created_at);
            ps.push(&c.id);
            ps.len() - 1
        });
        let conditions = filter_conditions(&filter, &month, &mut ps);

        let kind = arguments.kind();
        let sql = format!(
            "SELECT id, created_at \
             FROM sales \
             WHERE true \
                   {cursor} \
                   {conditions} \
             ORDER BY created_at {order}, id {order} \
             LIMIT $1::INT4",
            cursor = cursor_idx.into_iter().format_with("", |idx, f| {
                let op = kind.operator(Order::Descending);
                f(&format_args!(
                    "AND (created_at, id) {op} \
                         (${idx}::TIMESTAMPTZ, ${}::UUID)",
                    idx + 1,
                ))
            }),
            order = kind.order(Order::Descending).sql(),
        );
        let rows = self
            .query(sql.as_str(), ps.as_slice())
            .await
            .map_err(tracerr::wrap!())?;

        let has_more = rows.len() > arguments.limit();
        let edges = rows
            .into_iter()
            .take(arguments.limit())
            .map(|row| {
                let cursor = read::sale::list::Cursor {
                    created_at: row.get("created_at"),
                    id: row.get("id"),
                };
                (cursor, cursor.id)
            })
            .collect::<Vec<_>>();

        Ok(read::sale::list::Page::new(&arguments, edges, has_more))
    }
}

impl<C>
    Database<Select<By<read::sale::list::TotalCount, read::sale::list::Filter>>>
    for Postgres<C>
where
    C: Connection,
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
        let month = filter.month.map(|m| (m.first_day(), m.last_day()));

        let mut ps: Vec<&(dyn ToSql + Sync)> = vec![];
        let sql = format!(
            "SELECT COUNT(*)::INT4 \
             FROM sales \
             WHERE true {}",
            filter_conditions(&filter, &month, &mut ps),
        );
        self.query_opt(sql.as_str(), ps.as_slice())
            .await
            .map_err(tracerr::wrap!())
            .map(|row| row.map_or(0, |r| r.get::<_, i32>(0)).into())
    }
}
