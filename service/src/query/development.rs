//! [`Query`] collection related to a single [`Development`].

use common::operations::By;

use crate::domain::{development, Development};
#[cfg(doc)]
use crate::Query;

use super::DatabaseQuery;

/// Queries a [`Development`] by its [`development::Id`].
pub type ById = DatabaseQuery<By<Option<Development>, development::Id>>;
