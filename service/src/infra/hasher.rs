//! [`Hasher`] of [`Password`]s.

use argon2::{
    password_hash::{
        self, rand_core::OsRng, PasswordHasher as _, PasswordVerifier as _,
        SaltString,
    },
    Algorithm, Argon2, Version,
};
use derive_more::{Debug, Display, Error, From};
use smart_default::SmartDefault;

use crate::domain::user::{Password, PasswordHash};

/// [Argon2id] hasher of [`Password`]s.
///
/// [Argon2id]: https://datatracker.ietf.org/doc/html/rfc9106
#[derive(Clone, Debug)]
pub struct Hasher {
    /// Configured [`Argon2`] instance.
    #[debug(skip)]
    argon2: Argon2<'static>,
}

impl Hasher {
    /// Creates a new [`Hasher`] with the provided cost [`Params`].
    ///
    /// # Errors
    ///
    /// If the provided [`Params`] are out of the [Argon2] bounds.
    ///
    /// [Argon2]: https://datatracker.ietf.org/doc/html/rfc9106
    pub fn new(params: Params) -> Result<Self, argon2::Error> {
        let Params {
            memory_cost,
            iterations,
            parallelism,
        } = params;

        let params =
            argon2::Params::new(memory_cost, iterations, parallelism, None)?;
        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }

    /// Hashes the provided [`Password`] with a freshly generated salt.
    ///
    /// # Errors
    ///
    /// If the [`Password`] cannot be processed by the algorithm.
    pub fn hash(&self, password: &Password) -> Result<PasswordHash, HashingError> {
        let salt = SaltString::generate(&mut OsRng);
        Ok(self
            .argon2
            .hash_password(password.as_bytes(), &salt)?
            .to_string()
            .into())
    }

    /// Verifies the provided [`Password`] against the provided
    /// [`PasswordHash`].
    ///
    /// Comparison of the hashes is performed in constant time. A malformed
    /// [`PasswordHash`] never matches.
    #[must_use]
    pub fn verify(&self, hash: &PasswordHash, password: &Password) -> bool {
        password_hash::PasswordHash::new(hash.as_ref()).is_ok_and(|hash| {
            self.argon2
                .verify_password(password.as_bytes(), &hash)
                .is_ok()
        })
    }
}

/// Cost parameters of a [`Hasher`].
#[derive(Clone, Copy, Debug, SmartDefault)]
pub struct Params {
    /// Memory size in KiB.
    #[default(argon2::Params::DEFAULT_M_COST)]
    pub memory_cost: u32,

    /// Number of iterations.
    #[default(argon2::Params::DEFAULT_T_COST)]
    pub iterations: u32,

    /// Degree of parallelism.
    #[default(argon2::Params::DEFAULT_P_COST)]
    pub parallelism: u32,
}

/// Error of hashing a [`Password`].
#[derive(Clone, Debug, Display, Error, From)]
#[display("Failed to hash a password: {_0}")]
pub struct HashingError(#[error(not(source))] password_hash::Error);

#[cfg(test)]
mod spec {
    use crate::domain::user::{Password, PasswordHash};

    use super::{Hasher, Params};

    /// Returns a [`Hasher`] cheap enough for tests.
    fn hasher() -> Hasher {
        Hasher::new(Params {
            memory_cost: 8,
            iterations: 1,
            parallelism: 1,
        })
        .unwrap()
    }

    fn password(s: &str) -> Password {
        Password::new(s).unwrap()
    }

    #[test]
    fn verifies_own_hash() {
        let hasher = hasher();
        let secret = password("12345678");

        let hash = hasher.hash(&secret).unwrap();

        assert!(hasher.verify(&hash, &secret));
    }

    #[test]
    fn rejects_other_password() {
        let hasher = hasher();

        let hash = hasher.hash(&password("12345678")).unwrap();

        assert!(!hasher.verify(&hash, &password("12345679")));
        assert!(!hasher.verify(&hash, &password("1234567890")));
    }

    #[test]
    fn salts_every_hash() {
        let hasher = hasher();
        let secret = password("12345678");

        let first = hasher.hash(&secret).unwrap();
        let second = hasher.hash(&secret).unwrap();

        assert_ne!(first, second);
        assert!(hasher.verify(&first, &secret));
        assert!(hasher.verify(&second, &secret));
    }

    #[test]
    fn never_stores_plain_password() {
        let hash = hasher().hash(&password("12345678")).unwrap();

        assert!(hash.as_ref().starts_with("$argon2id$"));
        assert!(!hash.as_ref().contains("12345678"));
    }

    #[test]
    fn malformed_hash_never_matches() {
        let hasher = hasher();
        let secret = password("12345678");

        assert!(!hasher.verify(&PasswordHash::from(String::new()), &secret));
        assert!(!hasher
            .verify(&PasswordHash::from("12345678".to_owned()), &secret));
    }

    #[test]
    fn rejects_invalid_params() {
        assert!(Hasher::new(Params {
            memory_cost: 1,
            iterations: 1,
            parallelism: 1,
        })
        .is_err());
    }
}
