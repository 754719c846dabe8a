//! [`Query`] collection related to multiple [`Product`]s.

use common::operations::By;

use crate::{domain::product::Document, read::product::list};
#[cfg(doc)]
use crate::{domain::Product, Query};

use super::DatabaseQuery;

/// Queries stored [`Product`]s matching the [`list::Filter`].
pub type List = DatabaseQuery<By<Vec<Document>, list::Filter>>;
