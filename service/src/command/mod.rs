//! [`Command`] definition.

pub mod authorize_user_session;
pub mod create_products;
pub mod create_user;
pub mod create_user_session;
pub mod delete_product;
pub mod update_product;

/// [`Command`] of the [`Service`].
///
/// [`Service`]: crate::Service
pub use common::Handler as Command;

pub use self::{
    authorize_user_session::AuthorizeUserSession,
    create_products::CreateProducts, create_user::CreateUser,
    create_user_session::CreateUserSession, delete_product::DeleteProduct,
    update_product::UpdateProduct,
};
