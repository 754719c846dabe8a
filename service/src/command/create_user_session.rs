//! [`Command`] for creating a [`Session`].

use common::{
    operations::{By, Select},
    DateTime,
};
use derive_more::{Display, Error, From};
use secrecy::{ExposeSecret as _, SecretBox};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::user::{session::Token, Login, Password, Session};
use crate::{
    domain::{
        user::{self, session},
        User,
    },
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for creating a [`Session`] by [`User`] credentials.
#[derive(Debug)]
pub struct CreateUserSession {
    /// [`Login`] of a [`User`].
    pub login: user::Login,

    /// [`Password`] of a [`User`].
    pub password: SecretBox<user::Password>,
}

/// Output of [`CreateUserSession`] [`Command`].
#[derive(Clone, Debug)]
pub struct Output {
    /// [`Login`] of the [`User`] whose [`Session`] has been created.
    pub login: user::Login,

    /// [`Token`] of the created [`Session`].
    pub token: session::Token,

    /// [`DateTime`] when the [`Session`] expires.
    pub expires_at: session::ExpirationDateTime,
}

impl<Db> Command<CreateUserSession> for Service<Db>
where
    Db: Database<
        Select<By<Option<User>, user::Login>>,
        Ok = Option<User>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Output;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: CreateUserSession,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateUserSession { login, password } = cmd;

        let user = self
            .database()
            .execute(Select(By::new(login.clone())))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or_else(|| E::UserNotFound(login))
            .map_err(tracerr::wrap!())?;

        if !self
            .hasher()
            .verify(&user.password_hash, password.expose_secret())
        {
            return Err(tracerr::new!(E::InvalidCredentials));
        }

        let (token, expires_at) = self
            .jwt()
            .issue(&user.login, DateTime::now())
            .map_err(tracerr::from_and_wrap!(=> E))?;

        Ok(Output {
            login: user.login,
            token,
            expires_at,
        })
    }
}

/// Error of [`CreateUserSession`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`jsonwebtoken`] encoding error.
    #[display("Failed to encode a JSON Web Token: {_0}")]
    JsonWebTokenEncodeError(jsonwebtoken::errors::Error),

    /// [`User`] with the provided [`Login`] does not exist.
    #[display("`User` with `{_0}` login does not exist")]
    #[from(ignore)]
    UserNotFound(#[error(not(source))] user::Login),

    /// Provided [`Password`] doesn't match the stored one.
    #[display("Wrong `User` credentials")]
    InvalidCredentials,
}
