//! [`Command`] for deleting a [`Product`].

use common::operations::{By, Delete};
use derive_more::{Display, Error, From};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::Product;
use crate::{
    domain::product,
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for deleting a [`Product`] by its raw [`product::Id`].
///
/// Deleting a non-existent [`Product`] is not an error, so the number of
/// actually deleted [`Product`]s is returned.
#[derive(Clone, Debug)]
pub struct DeleteProduct {
    /// Raw [`product::Id`] of the [`Product`] to delete.
    pub id: String,
}

impl<Db> Command<DeleteProduct> for Service<Db>
where
    Db: Database<
        Delete<By<u64, product::Id>>,
        Ok = u64,
        Err = Traced<database::Error>,
    >,
{
    type Ok = u64;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: DeleteProduct,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let id = product::Id::parse(&cmd.id)
            .map_err(tracerr::from_and_wrap!(=> E))?;

        let deleted = self
            .database()
            .execute(Delete(By::<u64, _>::new(id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        tracing::debug!(%id, deleted, "`Product` deletion");

        Ok(deleted)
    }
}

/// Error of [`DeleteProduct`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// Provided [`product::Id`] is malformed.
    #[display("{_0}")]
    InvalidIdentifier(product::InvalidIdentifier),
}

#[cfg(test)]
mod spec {
    use serde_json::json;

    use crate::{command::Command as _, domain::product, spec::service};

    use super::{DeleteProduct, ExecutionError};

    #[tokio::test]
    async fn deletes_existing_product() {
        let service = service();
        let id = product::Id::new();
        service.database().put_raw_product(id, json!({}));

        let deleted = service
            .execute(DeleteProduct { id: id.to_string() })
            .await
            .unwrap();

        assert_eq!(deleted, 1);
        assert!(service.database().raw_product(id).is_none());
    }

    #[tokio::test]
    async fn tolerates_missing_product() {
        let deleted = service()
            .execute(DeleteProduct {
                id: product::Id::new().to_string(),
            })
            .await
            .unwrap();

        assert_eq!(deleted, 0);
    }

    #[tokio::test]
    async fn rejects_malformed_identifier() {
        let err = service()
            .execute(DeleteProduct { id: "zzz".into() })
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::InvalidIdentifier(_)));
    }
}
