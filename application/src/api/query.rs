//! GraphQL [`Query`]s definitions.

use common::Date;
use juniper::graphql_object;
use service::{query, read, Query as _};

use crate::{api, error::Kind, AsError, Context, Error};

/// Root of all GraphQL queries.
#[derive(Clone, Copy, Debug)]
pub struct Query;

impl Query {
    /// Name of the [`tracing::Span`] for the queries.
    pub(crate) const SPAN_NAME: &'static str = "GraphQL query";
}

#[graphql_object(context = Context)]
impl Query {
    /// Returns the `Sale` with the specified ID.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `SALE_NOT_EXISTS` - the `Sale` with the specified ID does not exist.
    #[tracing::instrument(
        skip_all,
        fields(
            id = %id,
            gql.name = "sale",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn sale(
        id: api::sale::Id,
        ctx: &Context,
    ) -> Result<api::Sale, Error> {
        ctx.service()
            .execute(query::sale::ById::by(id.into()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?
            .ok_or_else(|| Kind::SaleNotExists.into())
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Fetches the page of `Sale`s, the newest first.
    ///
    /// `status` is evaluated as of today.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `AMBIGUOUS_PAGINATION_ARGUMENTS` - the pagination arguments are
    ///                                      ambiguous.
    #[expect(clippy::too_many_arguments, reason = "GraphQL arguments")]
    #[tracing::instrument(
        skip_all,
        fields(
            after = ?after,
            before = ?before,
            broker_id = ?broker_id,
            development_id = ?development_id,
            first = ?first,
            gql.name = "sales",
            last = ?last,
            month = ?month,
            otel.name = Self::SPAN_NAME,
            status = ?status,
        ),
    )]
    pub async fn sales(
        first: Option<i32>,
        after: Option<api::sale::list::Cursor>,
        last: Option<i32>,
        before: Option<api::sale::list::Cursor>,
        broker_id: Option<api::broker::Id>,
        development_id: Option<api::development::Id>,
        month: Option<api::sale::Month>,
        status: Option<api::sale::Status>,
        ctx: &Context,
    ) -> Result<api::sale::list::Connection, Error> {
        const DEFAULT_PAGE_SIZE: i32 = 10;

        let arguments = read::sale::list::Arguments::new(
            first,
            after.map(Into::into),
            last,
            before.map(Into::into),
            DEFAULT_PAGE_SIZE,
        )
        .ok_or_else(|| Kind::AmbiguousPagination.into())
        .map_err(ctx.error())?;
        let filter = read::sale::list::Filter {
            broker_id: broker_id.map(Into::into),
            development_id: development_id.map(Into::into),
            month: month.map(Into::into),
            status: status.map(|s| read::sale::list::StatusAsOf {
                status: s.into(),
                today: ctx.service().today(),
            }),
        };

        ctx.service()
            .execute(query::sales::List::by(read::sale::list::Selector {
                arguments,
                filter,
            }))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|c| api::sale::list::Connection::new(c, filter))
    }

    /// Returns the `Broker` with the specified ID.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `BROKER_NOT_EXISTS` - the `Broker` with the specified ID does not
    ///                         exist.
    #[tracing::instrument(
        skip_all,
        fields(
            id = %id,
            gql.name = "broker",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn broker(
        id: api::broker::Id,
        ctx: &Context,
    ) -> Result<api::Broker, Error> {
        ctx.service()
            .execute(query::broker::ById::by(id.into()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?
            .ok_or_else(|| Kind::BrokerNotExists.into())
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Returns all the `Broker`s ordered by their names.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "brokers",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn brokers(ctx: &Context) -> Result<Vec<api::Broker>, Error> {
        ctx.service()
            .execute(query::brokers::List::by(()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|brokers| brokers.into_iter().map(Into::into).collect())
    }

    /// Returns the `Development` with the specified ID.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `DEVELOPMENT_NOT_EXISTS` - the `Development` with the specified ID
    ///                              does not exist.
    #[tracing::instrument(
        skip_all,
        fields(
            id = %id,
            gql.name = "development",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn development(
        id: api::development::Id,
        ctx: &Context,
    ) -> Result<api::Development, Error> {
        ctx.service()
            .execute(query::development::ById::by(id.into()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?
            .ok_or_else(|| Kind::DevelopmentNotExists.into())
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Returns all the `Development`s ordered by their names.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "developments",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn developments(
        ctx: &Context,
    ) -> Result<Vec<api::Development>, Error> {
        ctx.service()
            .execute(query::developments::List::by(()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|devs| devs.into_iter().map(Into::into).collect())
    }

    /// Calculates the `CommissionReport` of the `Sale`s closed within the
    /// specified period, both ends inclusive.
    ///
    /// Missing end leaves the period unbounded at that side.
    #[tracing::instrument(
        skip_all,
        fields(
            from = ?from,
            gql.name = "commissionReport",
            otel.name = Self::SPAN_NAME,
            to = ?to,
        ),
    )]
    pub async fn commission_report(
        from: Option<Date>,
        to: Option<Date>,
        ctx: &Context,
    ) -> Result<api::report::Commissions, Error> {
        ctx.service()
            .execute(query::report::Commissions {
                period: read::sale::Period {
                    from: from.map(Date::coerce),
                    to: to.map(Date::coerce),
                },
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Calculates the `BrokerDashboard` of the `Broker` with the specified
    /// ID.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `BROKER_NOT_EXISTS` - the `Broker` with the specified ID does not
    ///                         exist.
    #[tracing::instrument(
        skip_all,
        fields(
            broker_id = %broker_id,
            gql.name = "brokerDashboard",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn broker_dashboard(
        broker_id: api::broker::Id,
        ctx: &Context,
    ) -> Result<api::report::BrokerDashboard, Error> {
        ctx.service()
            .execute(query::report::BrokerDashboard {
                broker_id: broker_id.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|output| api::report::BrokerDashboard::new(broker_id, output))
    }
}
