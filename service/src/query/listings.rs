//! [`Query`] collection related to multiple [`Listing`]s.

use std::collections::HashMap;

use common::operations::By;

#[cfg(doc)]
use crate::Query;
use crate::{
    domain::{listing, Listing},
    read::listing::list,
};

use super::DatabaseQuery;

/// Queries multiple [`Listing`]s by their [`listing::Id`]s, skipping the
/// unknown ones.
pub type ByIds =
    DatabaseQuery<By<HashMap<listing::Id, Listing>, Vec<listing::Id>>>;

/// Queries a page of [`Listing`]s.
pub type List = DatabaseQuery<By<list::Connection, list::Selector>>;

/// Queries total count of [`Listing`]s passing a [`list::Filter`].
pub type TotalCount = DatabaseQuery<By<list::TotalCount, list::Filter>>;
