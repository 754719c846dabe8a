//! [`User`] definitions.

pub mod session;

use std::{fmt, sync::LazyLock};

use derive_more::{AsRef, Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use regex::Regex;
use secrecy::zeroize::Zeroize;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use self::session::Session;

/// Registered user able to authenticate.
#[derive(Clone, Debug)]
pub struct User {
    /// ID of this [`User`].
    pub id: Id,

    /// [`Login`] of this [`User`].
    pub login: Login,

    /// [`PasswordHash`] of this [`User`].
    pub password_hash: PasswordHash,
}

/// ID of a [`User`], assigned by the store on creation.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Deserialize,
    Display,
    Eq,
    From,
    FromStr,
    Hash,
    Into,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
)]
#[cfg_attr(feature = "postgres", derive(ToSql, FromSql), postgres(transparent))]
pub struct Id(Uuid);

impl Id {
    /// Creates a new random [`Id`].
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

/// Login of a [`User`], being a well-formed email address.
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, Into, PartialEq)]
#[as_ref(str)]
#[derive(Deserialize, Serialize)]
#[serde(try_from = "String", into = "String")]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Login(String);

impl Login {
    /// Maximum length of a [`Login`] in bytes.
    const MAX_LEN: usize = 254;

    /// Creates a new [`Login`] if the given `address` is valid.
    #[must_use]
    pub fn new(address: impl Into<String>) -> Option<Self> {
        let address = address.into();
        Self::check(&address).then_some(Self(address))
    }

    /// Checks whether the given `address` is a valid [`Login`].
    fn check(address: impl AsRef<str>) -> bool {
        /// Regular expression checking email address format.
        static REGEX: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(
                "^([^\\x00-\\x20\\x22\\x28\\x29\\x2c\\x2e\\x3a-\
                     \\x3c\\x3e\\x40\\x5b-\\x5d\\x7f-\\xff]+\
                  |\\x22([^\\x0d\\x22\\x5c\\x80-\\xff]\
                  |\\x5c[\\x00-\\x7f])*\\x22)\
                  (\\x2e([^\\x00-\\x20\\x22\\x28\\x29\\x2c\\x2e\\x3a-\
                           \\x3c\\x3e\\x40\\x5b-\\x5d\\x7f-\\xff]+\
                        |\\x22([^\\x0d\\x22\\x5c\\x80-\\xff]\
                        |\\x5c[\\x00-\\x7f])*\\x22))*\\x40\
                  ([^\\x00-\\x20\\x22\\x28\\x29\\x2c\\x2e\\x3a-\
                     \\x3c\\x3e\\x40\\x5b-\\x5d\\x7f-\\xff]+\
                  |\\x5b([^\\x0d\\x5b-\\x5d\\x80-\\xff]\
                        |\\x5c[\\x00-\\x7f])*\\x5d)\
                  (\\x2e([^\\x00-\\x20\\x22\\x28\\x29\\x2c\\x2e\\x3a-\
                           \\x3c\\x3e\\x40\\x5b-\\x5d\\x7f-\\xff]+\
                        |\\x5b([^\\x0d\\x5b-\\x5d\\x80-\\xff]\
                        |\\x5c[\\x00-\\x7f])*\\x5d))*$",
            )
            .expect("valid regex")
        });

        let address = address.as_ref();
        address.len() <= Self::MAX_LEN && REGEX.is_match(address)
    }
}

impl TryFrom<String> for Login {
    type Error = &'static str;

    fn try_from(address: String) -> Result<Self, Self::Error> {
        Self::new(address).ok_or("invalid `Login`")
    }
}

impl FromStr for Login {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Login`")
    }
}

/// Raw password of a [`User`].
///
/// Never stored nor logged: it's only hashed into a [`PasswordHash`] or
/// verified against one.
#[derive(Clone)]
pub struct Password(String);

impl Password {
    /// Minimum length of a [`Password`] in characters.
    pub const MIN_LEN: usize = 8;

    /// Maximum length of a [`Password`] in characters.
    pub const MAX_LEN: usize = 300;

    /// Creates a new [`Password`] if the given `password` is valid.
    #[must_use]
    pub fn new(password: impl Into<String>) -> Option<Self> {
        let password = password.into();
        Self::check(&password).then_some(Self(password))
    }

    /// Checks whether the given `password` is a valid [`Password`].
    fn check(password: impl AsRef<str>) -> bool {
        (Self::MIN_LEN..=Self::MAX_LEN)
            .contains(&password.as_ref().chars().count())
    }

    /// Returns bytes of this [`Password`].
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(<redacted>)")
    }
}

impl FromStr for Password {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Password`")
    }
}

impl Zeroize for Password {
    fn zeroize(&mut self) {
        self.0.zeroize();
    }
}

/// One-way hash of a [`User`]'s [`Password`] in [PHC string format].
///
/// [PHC string format]: https://github.com/P-H-C/phc-string-format
#[derive(AsRef, Clone, Eq, From, PartialEq)]
#[as_ref(str)]
#[derive(Deserialize, Serialize)]
#[serde(transparent)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct PasswordHash(String);

impl fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordHash(<redacted>)")
    }
}

#[cfg(test)]
mod spec {
    use super::{Login, Password};

    #[test]
    fn login_is_an_email_address() {
        assert!(Login::new("a@b.com").is_some());
        assert!(Login::new("john.doe@example.org").is_some());

        assert!(Login::new("").is_none());
        assert!(Login::new("john").is_none());
        assert!(Login::new("john@").is_none());
        assert!(Login::new("@example.org").is_none());
        assert!(Login::new("john doe@example.org").is_none());
        assert!(Login::new(format!("{}@example.org", "a".repeat(250)))
            .is_none());
    }

    #[test]
    fn login_deserialization_validates() {
        let login: Login = serde_json::from_str(r#""a@b.com""#).unwrap();
        assert_eq!(login.as_ref(), "a@b.com");

        assert!(serde_json::from_str::<Login>(r#""not-an-email""#).is_err());
    }

    #[test]
    fn password_length_is_bounded() {
        assert!(Password::new("1234567").is_none());
        assert!(Password::new("12345678").is_some());
        assert!(Password::new("x".repeat(300)).is_some());
        assert!(Password::new("x".repeat(301)).is_none());

        // Counted in characters, not bytes.
        assert!(Password::new("пароль12").is_some());
    }

    #[test]
    fn password_is_not_printed() {
        let password = Password::new("12345678").unwrap();

        assert!(!format!("{password:?}").contains("12345678"));
    }
}
