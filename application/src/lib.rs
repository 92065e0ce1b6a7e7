//! Application provides API for interacting with the [`Service`].

#![deny(
    nonstandard_style,
    rust_2018_idioms,
    rustdoc::all,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code
)]
#![forbid(non_ascii_idents)]
#![warn(
    clippy::allow_attributes,
    clippy::allow_attributes_without_reason,
    clippy::pedantic,
    clippy::wildcard_enum_match_arm,
    deprecated_in_future,
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    unreachable_pub,
    unused_crate_dependencies,
    unused_import_braces,
    unused_labels,
    unused_lifetimes,
    unused_qualifications,
    unused_results
)]

pub mod api;
pub mod args;
pub mod config;
mod context;
pub mod error;

use std::sync::Arc;

use axum::{
    response::{IntoResponse, Response},
    Extension, Json,
};
use derive_more::Debug;
use juniper::{
    http::{GraphQLBatchResponse, GraphQLResponse},
    IntoFieldError as _,
};
use juniper_axum::extract::JuniperRequest;
// Used in binary.
use axum_client_ip as _;
use refinery as _;
use tokio as _;
use tower_http as _;
use tracing_subscriber as _;

pub use self::{
    args::Args,
    config::Config,
    context::Context,
    error::{AsError, Error},
};

/// [`Service`] backed by Postgres.
///
/// [`Service`]: service::Service
pub type Service = service::Service<service::infra::Postgres>;

/// Response of the `/graphql` endpoint.
///
/// Successful responses are always `200 OK`.
#[derive(Debug)]
pub struct ApiResponse {
    /// [`http::StatusCode`] to respond with if the `body` has errors.
    error_status_code: http::StatusCode,

    /// Executed GraphQL response.
    #[debug(skip)]
    body: GraphQLBatchResponse,
}

impl ApiResponse {
    /// Creates a new [`ApiResponse`] rejecting the request with the provided
    /// [`Error`] before any execution.
    #[must_use]
    pub fn rejected(err: Error) -> Self {
        Self {
            error_status_code: err.status_code(),
            body: GraphQLBatchResponse::Single(GraphQLResponse::error(
                err.into_field_error(),
            )),
        }
    }
}

impl IntoResponse for ApiResponse {
    fn into_response(self) -> Response {
        if self.body.is_ok() {
            Json(self.body).into_response()
        } else {
            (self.error_status_code, Json(self.body)).into_response()
        }
    }
}

/// Executes a GraphQL request against the [`api::Schema`].
pub async fn graphql(
    Extension(schema): Extension<Arc<api::Schema>>,
    context: Context,
    JuniperRequest(request): JuniperRequest,
) -> ApiResponse {
    let body = request.execute(&*schema, &context).await;
    ApiResponse {
        error_status_code: context.error_status_code(),
        body,
    }
}
