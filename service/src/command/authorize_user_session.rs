//! [`Command`] for authorizing a [`Session`].

use common::DateTime;
use derive_more::{Display, Error, From};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::user::session::Token;
use crate::{
    domain::user::{session, Session},
    infra::jwt,
    Service,
};

use super::Command;

/// [`Command`] for authorizing a [`Session`] by its [`Token`].
///
/// No lookup is performed: a signed and non-expired [`Token`] is enough.
#[derive(Clone, Debug, From)]
pub struct AuthorizeUserSession {
    /// [`Session`] token to authorize.
    pub token: session::Token,
}

impl<Db> Command<AuthorizeUserSession> for Service<Db> {
    type Ok = Session;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: AuthorizeUserSession,
    ) -> Result<Self::Ok, Self::Err> {
        let AuthorizeUserSession { token } = cmd;

        self.jwt()
            .validate(&token, DateTime::now())
            .map_err(tracerr::from_and_wrap!(=> ExecutionError))
    }
}

/// Error of [`AuthorizeUserSession`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Token`] is not a valid one.
    #[display("Invalid `Session` token: {_0}")]
    InvalidToken(jwt::InvalidToken),
}
