//! Infrastructure layer.

pub mod database;
pub mod hasher;
pub mod jwt;

#[cfg(any(test, feature = "memory"))]
pub use self::database::Memory;
pub use self::{database::Database, hasher::Hasher, jwt::Jwt};
#[cfg(feature = "postgres")]
pub use self::database::{postgres, Postgres};
