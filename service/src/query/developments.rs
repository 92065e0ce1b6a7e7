//! [`Query`] collection related to the multiple [`Development`]s.

use common::operations::By;

use crate::domain::Development;
#[cfg(doc)]
use crate::Query;

use super::DatabaseQuery;

/// Queries all the [`Development`]s ordered by their names.
pub type List = DatabaseQuery<By<Vec<Development>, ()>>;
