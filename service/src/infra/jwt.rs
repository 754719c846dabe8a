//! [JWT] issuing and validation of [`Session`]s.
//!
//! [JWT]: https://datatracker.ietf.org/doc/html/rfc7519

use std::time::Duration;

use common::DateTime;
use derive_more::{Debug, Display, Error, From};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret as _, SecretString};

use crate::domain::user::{
    self,
    session::{ExpirationDateTime, Token},
    Session,
};

/// Signer and verifier of [`Session`] [`Token`]s using HS256 with a shared
/// secret.
#[derive(Clone, Debug)]
pub struct Jwt {
    /// Key signing [`Token`]s.
    #[debug(skip)]
    encoding_key: EncodingKey,

    /// Key verifying [`Token`]s.
    #[debug(skip)]
    decoding_key: DecodingKey,

    /// Lifetime of an issued [`Token`].
    ttl: Duration,
}

impl Jwt {
    /// Default lifetime of an issued [`Token`].
    pub const DEFAULT_TTL: Duration = Duration::from_secs(15 * 60);

    /// Signing algorithm of [`Token`]s.
    const ALGORITHM: Algorithm = Algorithm::HS256;

    /// Creates a new [`Jwt`] out of the provided signing `secret`.
    ///
    /// [`None`] is returned if the `secret` is missing or empty.
    #[must_use]
    pub fn new(secret: Option<&SecretString>, ttl: Duration) -> Option<Self> {
        let secret = secret
            .map(|s| s.expose_secret().as_bytes())
            .filter(|s| !s.is_empty())?;

        Some(Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            ttl,
        })
    }

    /// Returns the lifetime of the [`Token`]s issued by this [`Jwt`].
    #[must_use]
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issues a new [`Token`] for the provided [`user::Login`], expiring in
    /// [`Jwt::ttl()`] after the provided `now`, rounded up to whole seconds.
    ///
    /// # Errors
    ///
    /// If the claims fail to be encoded.
    pub fn issue(
        &self,
        login: &user::Login,
        now: DateTime,
    ) -> Result<(Token, ExpirationDateTime), jsonwebtoken::errors::Error> {
        // `exp` claim has seconds precision only, so it's rounded up to the
        // next whole second to never cut the lifetime short.
        let exact = now + self.ttl;
        let whole = DateTime::from_unix_timestamp(exact.unix_timestamp())
            .unwrap_or(exact);
        let expires_at: ExpirationDateTime = if whole < exact {
            whole + Duration::from_secs(1)
        } else {
            whole
        }
        .coerce();

        let token = jsonwebtoken::encode(
            &Header::new(Self::ALGORITHM),
            &Session {
                username: login.clone(),
                authorized: true,
                expires_at,
            },
            &self.encoding_key,
        )?;

        Ok((token.into(), expires_at))
    }

    /// Validates the provided [`Token`] at the provided `now`, returning the
    /// [`Session`] it carries.
    ///
    /// A [`Token`] is valid strictly before its expiration moment, without
    /// any leeway.
    ///
    /// # Errors
    ///
    /// With an [`InvalidToken`] if the signature, algorithm or claims are
    /// wrong, or if the [`Token`] has expired.
    pub fn validate(
        &self,
        token: &Token,
        now: DateTime,
    ) -> Result<Session, InvalidToken> {
        let mut validation = Validation::new(Self::ALGORITHM);
        validation.leeway = 0;
        validation.validate_exp = false;
        validation.set_required_spec_claims(&["exp"]);

        let session = jsonwebtoken::decode::<Session>(
            token.as_ref(),
            &self.decoding_key,
            &validation,
        )?
        .claims;

        if now >= session.expires_at.coerce() {
            return Err(InvalidToken::Expired);
        }
        Ok(session)
    }
}

/// Error of [`Jwt::validate()`].
#[derive(Debug, Display, Error, From)]
pub enum InvalidToken {
    /// [`Token`] is malformed or carries a wrong signature.
    #[display("Malformed JSON Web Token: {_0}")]
    Malformed(jsonwebtoken::errors::Error),

    /// [`Token`] has expired.
    #[display("Expired JSON Web Token")]
    Expired,
}
