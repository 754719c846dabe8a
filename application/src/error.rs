//! [`Error`]-related definitions.

use std::fmt;

use axum::{
    extract::rejection::{
        BytesRejection, JsonRejection, PathRejection, QueryRejection,
    },
    response::{IntoResponse, Response},
    Json,
};
use derive_more::Error as StdError;
use itertools::Itertools as _;
use serde::Serialize;
use service::infra::database;
use tracerr::{Trace, Traced};

/// Defines a new error type.
#[expect(clippy::module_name_repetitions, reason = "more readable")]
#[macro_export]
macro_rules! define_error {
    (
        enum $name:ident {
            $(
                #[code = $code:literal]
                #[status = $status_code:ident]
                #[message = $message:literal]
                $variant:ident
            ),* $(,)?
        }
    ) => {
        /// Error type.
        #[derive(
            Clone,
            Copy,
            Debug,
            ::derive_more::Display,
            ::derive_more::Error
        )]
        pub enum $name {
            $(
                #[display($message)]
                #[doc = $message]
                $variant,
            )*
        }

        impl From<$name> for $crate::Error {
            fn from(err: $name) -> Self {
                match err {
                    $(
                        $name::$variant => Self {
                            code: $code,
                            status_code: ::http::StatusCode::$status_code,
                            message: $message.to_string(),
                            backtrace: None,
                        },
                    )*
                }
            }
        }
    };
}

/// HTTP API [`Error`].
#[derive(Clone, Debug, StdError)]
pub struct Error {
    /// [`Error`] code.
    pub code: Code,

    /// [`http::StatusCode`] of this [`Error`].
    pub status_code: http::StatusCode,

    /// Backtrace of this [`Error`].
    #[error(not(backtrace))]
    pub backtrace: Option<Trace>,

    /// [`Error`] message.
    pub message: String,
}

impl Error {
    /// Message exposed instead of the one of a server-side [`Error`].
    const INTERNAL_MESSAGE: &'static str = "Internal server error";

    /// Create a new [`Error`] representing an internal server error.
    #[must_use]
    pub fn internal(msg: &impl ToString) -> Self {
        Self {
            code: "INTERNAL_SERVER_ERROR",
            status_code: http::StatusCode::INTERNAL_SERVER_ERROR,
            message: msg.to_string(),
            backtrace: None,
        }
    }

    /// Replaces the message of this [`Error`] with the provided detailed one.
    #[must_use]
    pub fn with_message(mut self, msg: &impl ToString) -> Self {
        self.message = msg.to_string();
        self
    }

    /// Replaces the [`http::StatusCode`] of this [`Error`].
    #[must_use]
    pub fn with_status(mut self, status_code: http::StatusCode) -> Self {
        self.status_code = status_code;
        self
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self {
            code,
            status_code: _,
            backtrace,
            message,
        } = self;

        write!(
            f,
            "[{code}]: {message}{}",
            backtrace
                .iter()
                .format_with("\n", |trace, f| f(&format_args!("\n{trace}"))),
        )
    }
}

/// Body of an [`Error`] response.
#[derive(Debug, Serialize)]
struct Body {
    /// [`Error`] code.
    code: Code,

    /// [`Error`] message.
    message: String,
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let message = if self.status_code.is_server_error() {
            tracing::error!("{self}");
            Self::INTERNAL_MESSAGE.to_owned()
        } else {
            tracing::debug!("{self}");
            self.message
        };

        (
            self.status_code,
            Json(Body {
                code: self.code,
                message,
            }),
        )
            .into_response()
    }
}

/// [`Error`] code.
pub type Code = &'static str;

/// Helper trait for converting types into [`Error`]s.
pub trait AsError {
    /// Tries to convert the type into an [`Error`].
    ///
    /// [`None`] is returned if the type cannot be converted into an [`Error`].
    fn try_as_error(&self) -> Option<Error>;

    /// Converts the type into an [`Error`].
    fn as_error(&self) -> Error
    where
        Self: fmt::Display,
    {
        self.try_as_error()
            .unwrap_or_else(|| Error::internal(&self))
    }

    /// Converts the type into an [`Error`] by consuming it.
    fn into_error(self) -> Error
    where
        Self: fmt::Display + Sized,
    {
        self.as_error()
    }
}

impl<E: AsError + fmt::Display> AsError for Traced<E> {
    fn try_as_error(&self) -> Option<Error> {
        let mut error = self.as_ref().as_error();
        error.backtrace = Some(self.trace().clone());
        Some(error)
    }
}

define_error! {
    enum RequestError {
        #[code = "INVALID_PAYLOAD"]
        #[status = BAD_REQUEST]
        #[message = "Request payload is malformed"]
        InvalidPayload,

        #[code = "INVALID_QUERY"]
        #[status = BAD_REQUEST]
        #[message = "Request query is malformed"]
        InvalidQuery,

        #[code = "INVALID_PATH"]
        #[status = BAD_REQUEST]
        #[message = "Request path is malformed"]
        InvalidPath,
    }
}

// Rejections keep their own status, so an oversized body remains a `413`.
impl AsError for JsonRejection {
    fn try_as_error(&self) -> Option<Error> {
        Some(
            Error::from(RequestError::InvalidPayload)
                .with_status(self.status())
                .with_message(&self.body_text()),
        )
    }
}

impl AsError for BytesRejection {
    fn try_as_error(&self) -> Option<Error> {
        Some(
            Error::from(RequestError::InvalidPayload)
                .with_status(self.status())
                .with_message(&self.body_text()),
        )
    }
}

impl AsError for QueryRejection {
    fn try_as_error(&self) -> Option<Error> {
        Some(
            Error::from(RequestError::InvalidQuery)
                .with_message(&self.body_text()),
        )
    }
}

impl AsError for PathRejection {
    fn try_as_error(&self) -> Option<Error> {
        Some(
            Error::from(RequestError::InvalidPath)
                .with_message(&self.body_text()),
        )
    }
}

impl AsError for database::Error {
    fn try_as_error(&self) -> Option<Error> {
        None
    }
}

#[cfg(test)]
mod spec {
    use axum::response::IntoResponse as _;
    use service::infra::database;

    use super::{AsError as _, Error, RequestError};

    #[test]
    fn hides_internal_details() {
        let err = Error::internal(&"connection refused");
        assert_eq!(err.code, "INTERNAL_SERVER_ERROR");
        assert!(err.to_string().contains("connection refused"));

        let resp = err.into_response();
        assert_eq!(resp.status(), http::StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn store_errors_are_internal() {
        let err = database::Error::Decode(
            serde_json::from_str::<u8>("x").unwrap_err(),
        )
        .as_error();

        assert_eq!(err.status_code, http::StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn defined_errors_carry_status() {
        let err = Error::from(RequestError::InvalidPayload);

        assert_eq!(err.code, "INVALID_PAYLOAD");
        assert_eq!(err.status_code, http::StatusCode::BAD_REQUEST);
        assert_eq!(
            err.into_response().status(),
            http::StatusCode::BAD_REQUEST,
        );
    }
}
