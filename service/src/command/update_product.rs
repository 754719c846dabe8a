//! [`Command`] for partially updating a [`Product`].

use common::operations::{
    By, Commit, Lock, Select, Transact, Transacted, Update,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{
        product::{self, Document},
        Product,
    },
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for partially updating a [`Product`] with a raw JSON payload.
///
/// Members present in the payload overwrite the stored ones, while absent
/// ones keep their stored values. The merged [`Product`] is validated as a
/// whole before being written back.
#[derive(Clone, Debug)]
pub struct UpdateProduct {
    /// Raw [`product::Id`] of the [`Product`] to update.
    pub id: String,

    /// Raw JSON object to merge into the stored [`Product`].
    pub payload: Vec<u8>,
}

impl<Db> Command<UpdateProduct> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Lock<By<Product, product::Id>>,
            Ok = (),
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Document>, product::Id>>,
            Ok = Option<Document>,
            Err = Traced<database::Error>,
        > + Database<Update<Product>, Ok = bool, Err = Traced<database::Error>>
        + Database<Commit, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = Product;
    type Err = Traced<ExecutionError>;

    #[tracing::instrument(skip_all, fields(id = %cmd.id))]
    async fn execute(
        &self,
        cmd: UpdateProduct,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let UpdateProduct { id, payload } = cmd;
        let id = product::Id::parse(&id)
            .map_err(tracerr::from_and_wrap!(=> E))?;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Avoid concurrent merges upon the same `Product`.
        tx.execute(Lock(By::new(id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let stored = tx
            .execute(Select(By::<Option<Document>, _>::new(id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::NotFound(id))
            .map_err(tracerr::wrap!())?;

        let merged = stored
            .fields
            .merge(&payload)
            .map_err(|e| tracerr::new!(E::InvalidPayload(e)))?;
        let product = Product::validate(id, merged)
            .map_err(tracerr::from_and_wrap!(=> E))?;

        let matched = tx
            .execute(Update(product.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if !matched {
            return Err(tracerr::new!(E::NotFound(id)));
        }

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Ok(product)
    }
}

/// Error of [`UpdateProduct`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from(ignore)]
    Db(database::Error),

    /// Stored [`Product`] cannot be decoded.
    #[display("Stored `Product` cannot be decoded: {_0}")]
    #[from(ignore)]
    Decode(serde_json::Error),

    /// Provided [`product::Id`] is malformed.
    #[display("{_0}")]
    InvalidIdentifier(product::InvalidIdentifier),

    /// Payload is not a JSON object of [`product::Fields`].
    #[display("Invalid `Product` payload: {_0}")]
    #[from(ignore)]
    InvalidPayload(serde_json::Error),

    /// [`Product`] doesn't exist.
    #[display("`Product(id: {_0})` does not exist")]
    #[from(ignore)]
    NotFound(#[error(not(source))] product::Id),

    /// Merged [`Product`] is invalid.
    #[display("{_0}")]
    Validation(product::ValidationError),
}

impl From<database::Error> for ExecutionError {
    fn from(e: database::Error) -> Self {
        match e {
            database::Error::Decode(e) => Self::Decode(e),
            #[cfg(feature = "postgres")]
            e @ database::Error::Postgres(_) => Self::Db(e),
            #[cfg(any(test, feature = "memory"))]
            e @ database::Error::Memory(_) => Self::Db(e),
        }
    }
}
