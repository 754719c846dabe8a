//! [`User`]-related endpoints.
//!
//! [`User`]: service::domain::User

use axum::{
    extract::rejection::JsonRejection, http::StatusCode,
    response::IntoResponse, Extension, Json,
};
use axum_extra::TypedHeader;
use secrecy::SecretBox;
use serde::{Deserialize, Serialize};
use service::{
    command::{self, Command as _},
    domain::user,
};

use crate::{define_error, session::AuthToken, AsError, Error, Service};

/// Credentials of a [`User`] as provided by a client.
///
/// [`User`]: service::domain::User
#[derive(Deserialize)]
pub struct Credentials {
    /// Email address being the login.
    pub username: String,

    /// Raw password.
    pub password: String,
}

impl Credentials {
    /// Validates these [`Credentials`].
    ///
    /// # Errors
    ///
    /// If the `username` is not an email address, or the `password` length
    /// is out of bounds.
    pub fn validate(
        self,
    ) -> Result<(user::Login, SecretBox<user::Password>), Error> {
        let Self { username, password } = self;

        let login = user::Login::new(username)
            .ok_or(CredentialsError::InvalidUsername)?;
        let password = user::Password::new(password)
            .ok_or(CredentialsError::InvalidPassword)?;
        Ok((login, SecretBox::new(Box::new(password))))
    }
}

/// Body of a successful [`authenticate`] response.
#[derive(Debug, Serialize)]
pub struct Authenticated {
    /// Login of the authenticated [`User`].
    ///
    /// [`User`]: service::domain::User
    pub username: user::Login,
}

/// Registers a new [`User`], responding with its ID.
///
/// [`User`]: service::domain::User
///
/// # Errors
///
/// If the [`Credentials`] are invalid or already registered.
#[tracing::instrument(skip_all)]
pub async fn create(
    Extension(service): Extension<Service>,
    credentials: Result<Json<Credentials>, JsonRejection>,
) -> Result<impl IntoResponse, Error> {
    let Json(credentials) = credentials.map_err(AsError::into_error)?;
    let (login, password) = credentials.validate()?;

    let id = service
        .execute(command::CreateUser { login, password })
        .await
        .map_err(AsError::into_error)?;

    Ok((StatusCode::CREATED, Json(id)))
}

/// Authenticates a [`User`] by its [`Credentials`], responding with a
/// session token in the [`AuthToken`] header.
///
/// [`User`]: service::domain::User
///
/// # Errors
///
/// If the [`Credentials`] don't match any registered [`User`].
#[tracing::instrument(skip_all)]
pub async fn authenticate(
    Extension(service): Extension<Service>,
    credentials: Result<Json<Credentials>, JsonRejection>,
) -> Result<impl IntoResponse, Error> {
    let Json(credentials) = credentials.map_err(AsError::into_error)?;
    let (login, password) = credentials.validate()?;

    let out = service
        .execute(command::CreateUserSession { login, password })
        .await
        .map_err(AsError::into_error)?;
    tracing::debug!(
        expires_at = out.expires_at.unix_timestamp(),
        "`Session` created",
    );

    Ok(issued(out))
}

/// Forms the response of a successful [`authenticate`] out of the created
/// session.
fn issued(
    out: command::create_user_session::Output,
) -> (TypedHeader<AuthToken>, Json<Authenticated>) {
    let command::create_user_session::Output { login, token, .. } = out;

    (
        TypedHeader(AuthToken(token)),
        Json(Authenticated { username: login }),
    )
}

define_error! {
    enum CredentialsError {
        #[code = "VALIDATION_FAILED"]
        #[status = BAD_REQUEST]
        #[message = "`username` must be a valid email address"]
        InvalidUsername,

        #[code = "VALIDATION_FAILED"]
        #[status = BAD_REQUEST]
        #[message = "`password` must be from 8 to 300 characters long"]
        InvalidPassword,
    }
}

impl AsError for command::create_user::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "USER_EXISTS"]
                #[status = CONFLICT]
                #[message = "`User` with the provided `username` already \
                             exists"]
                DuplicateUser,
            }
        }

        match self {
            Self::Db(e) => e.try_as_error(),
            Self::DuplicateUser(_) => Some(Error::DuplicateUser.into()),
            Self::Hashing(_) => None,
        }
    }
}

impl AsError for command::create_user_session::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "USER_NOT_EXISTS"]
                #[status = NOT_FOUND]
                #[message = "`User` with the provided `username` does not \
                             exist"]
                UserNotFound,

                #[code = "INVALID_CREDENTIALS"]
                #[status = UNAUTHORIZED]
                #[message = "Provided credentials are invalid"]
                InvalidCredentials,
            }
        }

        match self {
            Self::Db(e) => e.try_as_error(),
            Self::JsonWebTokenEncodeError(_) => None,
            Self::UserNotFound(_) => Some(Error::UserNotFound.into()),
            Self::InvalidCredentials => Some(Error::InvalidCredentials.into()),
        }
    }
}

#[cfg(test)]
mod spec {
    use axum::response::IntoResponse as _;
    use service::{
        command,
        domain::user::{self, session::ExpirationDateTime},
    };

    use crate::AsError as _;

    use super::{issued, Credentials};

    fn credentials(username: &str, password: &str) -> Credentials {
        Credentials {
            username: username.into(),
            password: password.into(),
        }
    }

    #[test]
    fn validates_credentials() {
        assert!(credentials("a@b.com", "12345678").validate().is_ok());

        let err = credentials("not-an-email", "12345678")
            .validate()
            .unwrap_err();
        assert_eq!(err.code, "VALIDATION_FAILED");
        assert_eq!(err.status_code, http::StatusCode::BAD_REQUEST);

        let err = credentials("a@b.com", "short").validate().unwrap_err();
        assert_eq!(err.code, "VALIDATION_FAILED");
    }

    #[test]
    fn maps_registration_errors() {
        let login = user::Login::new("a@b.com").unwrap();

        let err =
            command::create_user::ExecutionError::DuplicateUser(login).as_error();
        assert_eq!(err.code, "USER_EXISTS");
        assert_eq!(err.status_code, http::StatusCode::CONFLICT);
        assert!(!err.message.contains("a@b.com"));
    }

    #[test]
    fn maps_authentication_errors() {
        use command::create_user_session::ExecutionError as E;

        let err = E::InvalidCredentials.as_error();
        assert_eq!(err.code, "INVALID_CREDENTIALS");
        assert_eq!(err.status_code, http::StatusCode::UNAUTHORIZED);

        let err = E::UserNotFound(user::Login::new("a@b.com").unwrap())
            .as_error();
        assert_eq!(err.code, "USER_NOT_EXISTS");
        assert_eq!(err.status_code, http::StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn responds_with_bearer_token() {
        let resp = issued(command::create_user_session::Output {
            login: user::Login::new("a@b.com").unwrap(),
            token: "abc.def.ghi".to_owned().into(),
            expires_at: ExpirationDateTime::from_unix_timestamp(1_700_000_000)
                .unwrap(),
        })
        .into_response();

        assert_eq!(resp.status(), http::StatusCode::OK);
        assert_eq!(resp.headers()["x-auth-token"], "Bearer abc.def.ghi");

        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body, serde_json::json!({"username": "a@b.com"}));
    }
}
