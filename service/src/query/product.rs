//! [`Query`] collection related to a single [`Product`].

use common::operations::By;

use crate::domain::product::{self, Document};
#[cfg(doc)]
use crate::{domain::Product, Query};

use super::DatabaseQuery;

/// Queries a stored [`Product`] by its [`product::Id`].
pub type ById = DatabaseQuery<By<Option<Document>, product::Id>>;
