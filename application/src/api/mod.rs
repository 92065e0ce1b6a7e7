//! GraphQL API definitions.

pub mod broker;
pub mod development;
mod mutation;
mod query;
pub mod report;
pub mod sale;
pub mod scalar;

use juniper::EmptySubscription;

use crate::Context;

pub use self::{
    broker::Broker, development::Development, mutation::Mutation,
    query::Query, sale::Sale,
};

/// GraphQL schema.
pub type Schema =
    juniper::RootNode<'static, Query, Mutation, EmptySubscription<Context>>;
