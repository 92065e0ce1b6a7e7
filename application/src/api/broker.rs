//! [`Broker`]-related definitions.

use std::future;

use common::{Date, DateTime, Handler as _};
use derive_more::{AsRef, Display, From, Into};
use futures::TryFutureExt as _;
use juniper::{graphql_object, GraphQLScalar};
use service::{domain, query};
use tokio::sync::OnceCell;
use uuid::Uuid;

use crate::{api, api::scalar, error::Kind, AsError, Context, Error};

/// A broker.
#[derive(Clone, Debug)]
pub struct Broker {
    /// ID of this [`Broker`].
    id: Id,

    /// Underlying [`domain::Broker`].
    broker: OnceCell<domain::Broker>,
}

impl From<domain::Broker> for Broker {
    fn from(broker: domain::Broker) -> Self {
        Self {
            id: broker.id.into(),
            broker: OnceCell::new_with(Some(broker)),
        }
    }
}

impl Broker {
    /// Creates a new [`Broker`] with the provided ID.
    ///
    /// # Safety
    ///
    /// Caller must ensure that [`Broker`] with the provided ID exists,
    /// otherwise accessing this [`Broker`] will result with an error.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(id: impl Into<Id>) -> Self {
        Self {
            id: id.into(),
            broker: OnceCell::new(),
        }
    }

    /// Returns the underlying [`domain::Broker`].
    ///
    /// # Errors
    ///
    /// Errors if the [`domain::Broker`] doesn't exist.
    async fn broker(&self, ctx: &Context) -> Result<&domain::Broker, Error> {
        let id = self.id.into();
        self.broker
            .get_or_try_init(|| {
                ctx.service()
                    .execute(query::broker::ById::by(id))
                    .map_err(AsError::into_error)
                    .map_err(ctx.error())
                    .and_then(|b| {
                        future::ready(b.ok_or_else(|| {
                            Kind::BrokerNotExists.into()
                        }))
                    })
            })
            .await
    }
}

/// A broker.
#[graphql_object(context = Context)]
impl Broker {
    /// Unique identifier of this `Broker`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Broker.id",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn id(&self) -> Id {
        self.id
    }

    /// Name of this `Broker`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Broker.name",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn name(&self, ctx: &Context) -> Result<Name, Error> {
        Ok(self.broker(ctx).await?.name.clone().into())
    }

    /// Email of this `Broker`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Broker.email",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn email(&self, ctx: &Context) -> Result<Email, Error> {
        Ok(self.broker(ctx).await?.email.clone().into())
    }

    /// Phone of this `Broker`, if any.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Broker.phone",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn phone(&self, ctx: &Context) -> Result<Option<Phone>, Error> {
        Ok(self.broker(ctx).await?.phone.clone().map(Into::into))
    }

    /// `Date` this `Broker` was hired on.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Broker.hiredOn",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn hired_on(&self, ctx: &Context) -> Result<Date, Error> {
        Ok(self.broker(ctx).await?.hired_on.coerce())
    }

    /// `DateTime` when this `Broker` was created.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Broker.createdAt",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn created_at(&self, ctx: &Context) -> Result<DateTime, Error> {
        Ok(self.broker(ctx).await?.created_at.coerce())
    }
}

/// Unique identifier of a `Broker`.
#[derive(Clone, Copy, Debug, Display, Into, From, GraphQLScalar)]
#[from(domain::broker::Id)]
#[into(domain::broker::Id)]
#[graphql(name = "BrokerId", transparent)]
pub struct Id(Uuid);

/// Name of a `Broker`.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(name = "BrokerName", with = scalar::Via::<domain::broker::Name>)]
pub struct Name(domain::broker::Name);

/// Email of a `Broker`.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(name = "BrokerEmail", with = scalar::Via::<domain::broker::Email>)]
pub struct Email(domain::broker::Email);

/// Phone of a `Broker`.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(name = "BrokerPhone", with = scalar::Via::<domain::broker::Phone>)]
pub struct Phone(domain::broker::Phone);
