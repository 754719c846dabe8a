//! [`Product`]-related endpoints.
//!
//! [`Product`]: service::domain::Product

use axum::{
    body::Bytes,
    extract::{
        rejection::{
            BytesRejection, JsonRejection, PathRejection, QueryRejection,
        },
        Path, Query,
    },
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use service::{
    command::{self, Command as _},
    domain::product::{self, Document, Fields},
    query,
    read::product::list::Filter,
};

#[cfg(doc)]
use service::domain::Product;

use crate::{define_error, session::Session, AsError, Error, Service};

/// Body of a successful [`delete`] response.
pub const DELETED: &str = "Delete successfully";

/// Lists [`Product`]s matching the query parameters.
///
/// # Errors
///
/// If the `_id` parameter is malformed.
#[tracing::instrument(skip_all)]
pub async fn list(
    Extension(service): Extension<Service>,
    params: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Result<Json<Vec<Document>>, Error> {
    let Query(params) = params.map_err(AsError::into_error)?;
    let filter = Filter::from_query(params).map_err(invalid_identifier)?;

    service
        .execute(query::products::List::by(filter))
        .await
        .map(Json)
        .map_err(AsError::into_error)
}

/// Returns a single [`Product`] by its ID.
///
/// # Errors
///
/// If the ID is malformed, or no such [`Product`] exists.
#[tracing::instrument(skip_all)]
pub async fn get(
    Extension(service): Extension<Service>,
    id: Result<Path<String>, PathRejection>,
) -> Result<Json<Document>, Error> {
    let Path(id) = id.map_err(AsError::into_error)?;
    let id = product::Id::parse(&id).map_err(invalid_identifier)?;

    service
        .execute(query::product::ById::by(id))
        .await
        .map_err(AsError::into_error)?
        .map(Json)
        .ok_or_else(|| ProductError::NotExists.into())
}

/// Creates new [`Product`]s, responding with their IDs.
///
/// Nothing is created unless every provided [`Product`] is valid.
///
/// # Errors
///
/// If the payload is malformed, or any of the [`Product`]s is invalid.
#[tracing::instrument(skip_all, fields(user = %session.username))]
pub async fn create(
    Extension(service): Extension<Service>,
    Session(session): Session,
    products: Result<Json<Vec<Fields>>, JsonRejection>,
) -> Result<impl IntoResponse, Error> {
    let Json(products) = products.map_err(AsError::into_error)?;

    let ids = service
        .execute(command::CreateProducts { products })
        .await
        .map_err(AsError::into_error)?;

    Ok((StatusCode::CREATED, Json(ids)))
}

/// Partially updates a [`Product`], responding with its merged state.
///
/// # Errors
///
/// If the ID or the payload is malformed, no such [`Product`] exists, or the
/// merged [`Product`] is invalid.
#[tracing::instrument(skip_all, fields(user = %session.username))]
pub async fn update(
    Extension(service): Extension<Service>,
    Session(session): Session,
    id: Result<Path<String>, PathRejection>,
    payload: Result<Bytes, BytesRejection>,
) -> Result<Json<Document>, Error> {
    let Path(id) = id.map_err(AsError::into_error)?;
    let payload = payload.map_err(AsError::into_error)?;

    service
        .execute(command::UpdateProduct {
            id,
            payload: payload.into(),
        })
        .await
        .map(|p| Json(p.into()))
        .map_err(AsError::into_error)
}

/// Deletes a [`Product`] by its ID.
///
/// Deleting an absent [`Product`] still succeeds.
///
/// # Errors
///
/// If the ID is malformed.
#[tracing::instrument(skip_all, fields(user = %session.username))]
pub async fn delete(
    Extension(service): Extension<Service>,
    Session(session): Session,
    id: Result<Path<String>, PathRejection>,
) -> Result<Json<&'static str>, Error> {
    let Path(id) = id.map_err(AsError::into_error)?;

    _ = service
        .execute(command::DeleteProduct { id })
        .await
        .map_err(AsError::into_error)?;

    Ok(Json(DELETED))
}

/// Converts the provided [`product::InvalidIdentifier`] into an [`Error`].
fn invalid_identifier(e: product::InvalidIdentifier) -> Error {
    Error::from(ProductError::InvalidIdentifier).with_message(&e)
}

define_error! {
    enum ProductError {
        #[code = "INVALID_IDENTIFIER"]
        #[status = BAD_REQUEST]
        #[message = "Provided `Product` identifier is malformed"]
        InvalidIdentifier,

        #[code = "PRODUCT_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "`Product` with the provided identifier does not exist"]
        NotExists,

        #[code = "VALIDATION_FAILED"]
        #[status = BAD_REQUEST]
        #[message = "`Product` is invalid"]
        ValidationFailed,

        #[code = "INVALID_PAYLOAD"]
        #[status = BAD_REQUEST]
        #[message = "Provided payload is not a `Product` JSON object"]
        InvalidPayload,
    }
}

impl AsError for command::create_products::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::Validation { .. } => Some(
                Error::from(ProductError::ValidationFailed).with_message(self),
            ),
        }
    }
}

impl AsError for command::update_product::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::Decode(_) => None,
            Self::InvalidIdentifier(e) => Some(invalid_identifier(e.clone())),
            Self::InvalidPayload(e) => Some(
                Error::from(ProductError::InvalidPayload).with_message(e),
            ),
            Self::NotFound(_) => Some(ProductError::NotExists.into()),
            Self::Validation(e) => Some(
                Error::from(ProductError::ValidationFailed).with_message(e),
            ),
        }
    }
}

impl AsError for command::delete_product::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::InvalidIdentifier(e) => Some(invalid_identifier(e.clone())),
        }
    }
}
