//! [`Command`] for creating new [`Product`]s.

use common::operations::Insert;
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{product, Product},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for creating new [`Product`]s out of their unvalidated
/// [`product::Fields`].
///
/// Every [`Product`] is validated before any of them is stored.
#[derive(Clone, Debug)]
pub struct CreateProducts {
    /// [`product::Fields`] of the new [`Product`]s.
    pub products: Vec<product::Fields>,
}

impl<Db> Command<CreateProducts> for Service<Db>
where
    Db: Database<Insert<Product>, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = Vec<product::Id>;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: CreateProducts,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let products = cmd
            .products
            .into_iter()
            .enumerate()
            .map(|(index, fields)| {
                Product::validate(product::Id::new(), fields)
                    .map_err(|error| E::Validation { index, error })
            })
            .collect::<Result<Vec<_>, _>>()
            .map_err(tracerr::wrap!())?;

        let mut ids = Vec::with_capacity(products.len());
        for p in products {
            let id = p.id;
            self.database()
                .execute(Insert(p))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?;
            ids.push(id);
        }
        Ok(ids)
    }
}

/// Error of [`CreateProducts`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// One of the [`Product`]s is invalid.
    #[display("`Product` #{index} is invalid: {error}")]
    #[from(ignore)]
    Validation {
        /// Position of the invalid [`Product`] in the [`CreateProducts`].
        index: usize,

        /// Reason of the [`Product`] being invalid.
        #[error(source)]
        error: product::ValidationError,
    },
}
