//! [`Session`] definitions.

#[cfg(doc)]
use common::DateTime;
use common::{unit, DateTimeOf};
use derive_more::{AsRef, From};
use serde::{Deserialize, Serialize};

#[cfg(doc)]
use crate::domain::User;
use crate::domain::user;

/// Stateless session of a [`User`], being the claims of a signed [`Token`].
///
/// Nothing is kept on the server side: a [`Session`] lives as long as its
/// [`Token`] carries a valid signature and hasn't expired.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Session {
    /// [`user::Login`] of the [`User`] this [`Session`] belongs to.
    pub username: user::Login,

    /// Indicator whether the [`User`] is authorized.
    ///
    /// Always `true`, as there is no role granularity.
    pub authorized: bool,

    /// [`DateTime`] when this [`Session`] expires.
    #[serde(rename = "exp", with = "common::datetime::serde::unix_timestamp")]
    pub expires_at: ExpirationDateTime,
}

/// Bearer token of a [`Session`].
#[derive(AsRef, Clone, Debug, Eq, From, PartialEq)]
#[as_ref(str)]
pub struct Token(String);

/// [`DateTime`] of a [`Session`] expiration.
pub type ExpirationDateTime = DateTimeOf<(Session, unit::Expiration)>;
