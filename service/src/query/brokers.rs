//! [`Query`] collection related to the multiple [`Broker`]s.

use common::operations::By;

use crate::domain::Broker;
#[cfg(doc)]
use crate::Query;

use super::DatabaseQuery;

/// Queries all the [`Broker`]s ordered by their names.
pub type List = DatabaseQuery<By<Vec<Broker>, ()>>;
