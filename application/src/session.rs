//! Authentication of HTTP requests.

use axum::{async_trait, extract::FromRequestParts, RequestPartsExt as _};
use axum_extra::{
    headers::{self, Header},
    TypedHeader,
};
use http::{HeaderName, HeaderValue};
use service::{
    command::{self, Command as _},
    domain::user::session,
};

use crate::{define_error, AsError, Error, Service};

/// Name of the [`AuthToken`] header.
pub static X_AUTH_TOKEN: HeaderName = HeaderName::from_static("x-auth-token");

/// `x-auth-token` header carrying a bearer [`session::Token`].
#[derive(Clone, Debug)]
pub struct AuthToken(pub session::Token);

impl AuthToken {
    /// Scheme prefix of the header value.
    const SCHEME: &'static str = "Bearer ";
}

impl Header for AuthToken {
    fn name() -> &'static HeaderName {
        &X_AUTH_TOKEN
    }

    fn decode<'i, I>(values: &mut I) -> Result<Self, headers::Error>
    where
        I: Iterator<Item = &'i HeaderValue>,
    {
        values
            .next()
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix(Self::SCHEME))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(|t| Self(t.to_owned().into()))
            .ok_or_else(headers::Error::invalid)
    }

    fn encode<E>(&self, values: &mut E)
    where
        E: Extend<HeaderValue>,
    {
        let value = format!("{}{}", Self::SCHEME, self.0.as_ref());
        if let Ok(v) = HeaderValue::from_str(&value) {
            values.extend([v]);
        }
    }
}

/// Authorized [`session::Session`] of the current HTTP request.
#[derive(Clone, Debug)]
pub struct Session(pub session::Session);

#[async_trait]
impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(
        parts: &mut http::request::Parts,
        _: &S,
    ) -> Result<Self, Self::Rejection> {
        let service = parts
            .extensions
            .get::<Service>()
            .cloned()
            .ok_or_else(|| Error::internal(&"missing `Service` extension"))?;

        let TypedHeader(AuthToken(token)) = parts
            .extract::<TypedHeader<AuthToken>>()
            .await
            .map_err(|_| Error::from(AuthError::AuthorizationRequired))?;

        service
            .execute(command::AuthorizeUserSession { token })
            .await
            .map(Self)
            .map_err(AsError::into_error)
    }
}

impl AsError for command::authorize_user_session::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::InvalidToken(_) => {
                Some(AuthError::AuthorizationRequired.into())
            }
        }
    }
}

define_error! {
    enum AuthError {
        #[code = "AUTHORIZATION_REQUIRED"]
        #[status = UNAUTHORIZED]
        #[message = "Authorization required"]
        AuthorizationRequired,
    }
}

#[cfg(test)]
mod spec {
    use axum_extra::headers::{Header as _, HeaderMapExt as _};
    use http::{HeaderMap, HeaderValue};

    use super::AuthToken;

    fn decode(value: &'static str) -> Option<AuthToken> {
        let value = HeaderValue::from_static(value);
        let values = [&value];
        let token = AuthToken::decode(&mut values.into_iter()).ok();
        token
    }

    #[test]
    fn decodes_bearer_token() {
        let token = decode("Bearer abc.def.ghi").unwrap();

        assert_eq!(token.0.as_ref(), "abc.def.ghi");
    }

    #[test]
    fn rejects_malformed_values() {
        assert!(decode("abc.def.ghi").is_none());
        assert!(decode("Basic abc").is_none());
        assert!(decode("Bearer ").is_none());
        assert!(decode("bearer abc").is_none());
    }

    #[test]
    fn encodes_with_scheme() {
        let mut headers = HeaderMap::new();
        headers.typed_insert(AuthToken("abc".to_owned().into()));

        assert_eq!(headers["x-auth-token"], "Bearer abc");
    }
}
