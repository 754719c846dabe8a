//! [`Database`]-related implementations.

#[cfg(any(test, feature = "memory"))]
pub mod memory;
#[cfg(feature = "postgres")]
pub mod postgres;

use derive_more::{Display, Error as StdError, From};

#[cfg(any(test, feature = "memory"))]
pub use self::memory::Memory;
#[cfg(feature = "postgres")]
pub use self::postgres::Postgres;

/// Database operation.
pub use common::Handler as Database;

/// [`Database`] error.
#[derive(Debug, Display, From, StdError)]
pub enum Error {
    #[cfg(feature = "postgres")]
    /// [`Postgres`] error.
    Postgres(postgres::Error),

    #[cfg(any(test, feature = "memory"))]
    /// [`Memory`] error.
    Memory(memory::Error),

    /// Stored document cannot be decoded.
    #[display("Failed to decode a stored document: {_0}")]
    Decode(serde_json::Error),
}

impl Error {
    /// Checks whether this [`Error`] is a violation of the uniqueness of a
    /// [`User`] login.
    ///
    /// [`User`]: crate::domain::User
    #[must_use]
    pub fn is_unique_login_violation(&self) -> bool {
        match self {
            #[cfg(feature = "postgres")]
            Self::Postgres(e) => {
                e.is_unique_violation(Some(postgres::USERS_USERNAME_INDEX))
            }
            #[cfg(any(test, feature = "memory"))]
            Self::Memory(e) => matches!(e, memory::Error::UniqueViolation),
            Self::Decode(_) => false,
        }
    }
}
