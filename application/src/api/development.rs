//! [`Development`]-related definitions.

use std::future;

use common::{DateTime, Handler as _, Money};
use derive_more::{AsRef, Display, From, Into};
use futures::TryFutureExt as _;
use juniper::{graphql_object, GraphQLScalar};
use service::{domain, query};
use tokio::sync::OnceCell;
use uuid::Uuid;

use crate::{api, api::scalar, error::Kind, AsError, Context, Error};

/// A real estate development.
#[derive(Clone, Debug)]
pub struct Development {
    /// ID of this [`Development`].
    id: Id,

    /// Underlying [`domain::Development`].
    development: OnceCell<domain::Development>,
}

impl From<domain::Development> for Development {
    fn from(development: domain::Development) -> Self {
        Self {
            id: development.id.into(),
            development: OnceCell::new_with(Some(development)),
        }
    }
}

impl Development {
    /// Creates a new [`Development`] with the provided ID.
    ///
    /// # Safety
    ///
    /// Caller must ensure that [`Development`] with the provided ID exists,
    /// otherwise accessing this [`Development`] will result with an error.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(id: impl Into<Id>) -> Self {
        Self {
            id: id.into(),
            development: OnceCell::new(),
        }
    }

    /// Returns the underlying [`domain::Development`].
    ///
    /// # Errors
    ///
    /// Errors if the [`domain::Development`] doesn't exist.
    async fn development(
        &self,
        ctx: &Context,
    ) -> Result<&domain::Development, Error> {
        let id = self.id.into();
        self.development
            .get_or_try_init(|| {
                ctx.service()
                    .execute(query::development::ById::by(id))
                    .map_err(AsError::into_error)
                    .map_err(ctx.error())
                    .and_then(|d| {
                        future::ready(d.ok_or_else(|| {
                            Kind::DevelopmentNotExists.into()
                        }))
                    })
            })
            .await
    }
}

/// A real estate development.
#[graphql_object(context = Context)]
impl Development {
    /// Unique identifier of this `Development`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Development.id",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn id(&self) -> Id {
        self.id
    }

    /// Name of this `Development`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Development.name",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn name(&self, ctx: &Context) -> Result<Name, Error> {
        Ok(self.development(ctx).await?.name.clone().into())
    }

    /// Location of this `Development`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Development.location",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn location(&self, ctx: &Context) -> Result<Location, Error> {
        Ok(self.development(ctx).await?.location.clone().into())
    }

    /// Commission paid on every new `Sale` of this `Development`.
    ///
    /// Changing it doesn't affect the existing `Sale`s.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Development.commission",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn commission(&self, ctx: &Context) -> Result<Money, Error> {
        Ok(self.development(ctx).await?.commission)
    }

    /// `DateTime` when this `Development` was created.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Development.createdAt",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn created_at(&self, ctx: &Context) -> Result<DateTime, Error> {
        Ok(self.development(ctx).await?.created_at.coerce())
    }
}

/// Unique identifier of a `Development`.
#[derive(Clone, Copy, Debug, Display, Into, From, GraphQLScalar)]
#[from(domain::development::Id)]
#[into(domain::development::Id)]
#[graphql(name = "DevelopmentId", transparent)]
pub struct Id(Uuid);

/// Name of a `Development`.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "DevelopmentName",
    with = scalar::Via::<domain::development::Name>,
)]
pub struct Name(domain::development::Name);

/// Location of a `Development`.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "DevelopmentLocation",
    with = scalar::Via::<domain::development::Location>,
)]
pub struct Location(domain::development::Location);
