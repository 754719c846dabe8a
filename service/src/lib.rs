//! Service contains the business logic of the application.
//!
//! List of available Cargo features:
#![doc = document_features::document_features!()]
#![deny(
    nonstandard_style,
    rust_2018_idioms,
    rustdoc::all,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code
)]
#![forbid(non_ascii_idents)]
#![warn(
    clippy::allow_attributes,
    clippy::allow_attributes_without_reason,
    clippy::pedantic,
    clippy::wildcard_enum_match_arm,
    deprecated_in_future,
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    unreachable_pub,
    unused_crate_dependencies,
    unused_import_braces,
    unused_labels,
    unused_lifetimes,
    unused_qualifications,
    unused_results
)]

pub mod command;
pub mod domain;
pub mod infra;
pub mod query;
pub mod read;

use std::time::Duration;

use derive_more::{Debug, Display, Error, From};
use secrecy::SecretString;
use smart_default::SmartDefault;

#[cfg(doc)]
use infra::Database;
use infra::{hasher, Hasher, Jwt};

pub use self::{command::Command, query::Query};

/// [`Service`] configuration.
#[derive(Clone, Debug, SmartDefault)]
pub struct Config {
    /// Shared secret signing [JWT]s of user sessions.
    ///
    /// Required: a [`Service`] refuses to start without it.
    ///
    /// [JWT]: https://datatracker.ietf.org/doc/html/rfc7519
    #[debug(skip)]
    pub jwt_secret: Option<SecretString>,

    /// Lifetime of issued session tokens.
    #[default(Jwt::DEFAULT_TTL)]
    pub token_ttl: Duration,

    /// Cost parameters of password hashing.
    pub password_hashing: hasher::Params,
}

/// Domain service.
#[derive(Clone, Debug)]
pub struct Service<Db> {
    /// [`Database`] of this [`Service`].
    database: Db,

    /// [`Hasher`] of user passwords.
    hasher: Hasher,

    /// Issuer and validator of user session tokens.
    jwt: Jwt,
}

impl<Db> Service<Db> {
    /// Creates a new [`Service`] with the provided parameters.
    ///
    /// # Errors
    ///
    /// If the provided [`Config`] is incomplete or invalid.
    pub fn new(config: Config, database: Db) -> Result<Self, ConfigurationError> {
        let Config {
            jwt_secret,
            token_ttl,
            password_hashing,
        } = config;

        Ok(Self {
            database,
            hasher: Hasher::new(password_hashing)?,
            jwt: Jwt::new(jwt_secret.as_ref(), token_ttl)
                .ok_or(ConfigurationError::MissingJwtSecret)?,
        })
    }

    /// Returns [`Database`] of this [`Service`].
    #[must_use]
    pub fn database(&self) -> &Db {
        &self.database
    }

    /// Returns [`Hasher`] of this [`Service`].
    #[must_use]
    pub fn hasher(&self) -> &Hasher {
        &self.hasher
    }

    /// Returns [`Jwt`] of this [`Service`].
    #[must_use]
    pub fn jwt(&self) -> &Jwt {
        &self.jwt
    }
}

/// Error of creating a [`Service`] out of an invalid [`Config`].
#[derive(Debug, Display, Error, From)]
pub enum ConfigurationError {
    /// [`Config::jwt_secret`] is missing or empty.
    #[display("JWT signing secret is not configured")]
    #[from(ignore)]
    MissingJwtSecret,

    /// [`Config::password_hashing`] parameters are out of bounds.
    #[display("Invalid password hashing parameters: {_0}")]
    InvalidHashingParams(#[error(not(source))] argon2::Error),
}

#[cfg(test)]
mod spec {
    use secrecy::SecretString;

    use crate::{
        infra::{hasher, Memory},
        Config, ConfigurationError, Service,
    };

    /// Creates a new [`Service`] over an empty [`Memory`] database, with
    /// hashing cheap enough for tests.
    pub(crate) fn service() -> Service<Memory> {
        service_over(Memory::new())
    }

    /// Creates a new [`Service`] over the provided `database`, with hashing
    /// cheap enough for tests.
    pub(crate) fn service_over<Db>(database: Db) -> Service<Db> {
        Service::new(
            Config {
                jwt_secret: Some(SecretString::from("test-secret")),
                password_hashing: hasher::Params {
                    memory_cost: 8,
                    iterations: 1,
                    parallelism: 1,
                },
                ..Config::default()
            },
            database,
        )
        .unwrap()
    }

    #[test]
    fn requires_jwt_secret() {
        assert!(matches!(
            Service::new(Config::default(), Memory::new()),
            Err(ConfigurationError::MissingJwtSecret),
        ));
        assert!(matches!(
            Service::new(
                Config {
                    jwt_secret: Some(SecretString::from("")),
                    ..Config::default()
                },
                Memory::new(),
            ),
            Err(ConfigurationError::MissingJwtSecret),
        ));
    }

    #[test]
    fn creates_with_defaults() {
        let service = service();

        assert_eq!(service.jwt().ttl(), crate::infra::Jwt::DEFAULT_TTL);
        assert_eq!(service.database().users_count(), 0);
    }
}
