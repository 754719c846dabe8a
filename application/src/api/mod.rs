//! HTTP API definitions.

pub mod product;
pub mod user;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, put},
    Router,
};

/// Builds the [`Router`] of the HTTP API.
///
/// Product mutations require an authorized [`Session`], and their bodies
/// are limited to `body_limit` bytes.
///
/// [`Session`]: crate::Session
#[must_use]
pub fn router(body_limit: usize) -> Router {
    let limit = DefaultBodyLimit::max(body_limit);

    Router::new()
        .route("/users", post(user::create))
        .route("/auth", post(user::authenticate))
        .route(
            "/products",
            get(product::list).merge(post(product::create).layer(limit)),
        )
        .route(
            "/products/:id",
            get(product::get)
                .delete(product::delete)
                .merge(put(product::update).layer(limit)),
        )
}

#[cfg(test)]
mod spec {
    use std::time::Duration;

    use axum::{body::Body, Extension, Router};
    use common::DateTime;
    use http::{header, Method, Request, StatusCode};
    use secrecy::SecretString;
    use service::{
        domain::{product, user},
        infra::{hasher, postgres, Jwt, Postgres},
    };
    use tower::ServiceExt as _;

    use crate::Service;

    /// Creates a new [`Service`] whose [`Postgres`] pool is never connected
    /// to, unless a request reaches the database.
    fn service() -> Service {
        let postgres = Postgres::new(&postgres::Config {
            host: Some("127.0.0.1".into()),
            dbname: Some("catalog".into()),
            ..postgres::Config::default()
        })
        .unwrap();

        Service::new(
            service::Config {
                jwt_secret: Some(SecretString::from("test-secret")),
                password_hashing: hasher::Params {
                    memory_cost: 8,
                    iterations: 1,
                    parallelism: 1,
                },
                ..service::Config::default()
            },
            postgres,
        )
        .unwrap()
    }

    fn app(service: Service) -> Router {
        super::router(1024).layer(Extension(service))
    }

    fn request(
        method: Method,
        uri: &str,
        token: Option<&str>,
    ) -> Request<Body> {
        let mut req = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            req = req.header("x-auth-token", format!("Bearer {token}"));
        }
        req.body(Body::from("not json")).unwrap()
    }

    async fn call(app: Router, req: Request<Body>) -> (StatusCode, String) {
        let resp = app.oneshot(req).await.unwrap();
        let status = resp.status();
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body).unwrap();

        (status, body["code"].as_str().unwrap_or_default().to_owned())
    }

    /// Returns the mutation endpoints along with their HTTP methods.
    fn mutations() -> Vec<(Method, String)> {
        let uri = format!("/products/{}", product::Id::new());
        vec![
            (Method::POST, "/products".to_owned()),
            (Method::PUT, uri.clone()),
            (Method::DELETE, uri),
        ]
    }

    fn token(service: &Service, issued_at: DateTime) -> String {
        let login = user::Login::new("a@b.com").unwrap();
        let (token, _) = service.jwt().issue(&login, issued_at).unwrap();
        token.as_ref().to_owned()
    }

    #[tokio::test]
    async fn mutations_require_token() {
        let service = service();

        for (method, uri) in mutations() {
            let (status, code) =
                call(app(service.clone()), request(method, &uri, None)).await;

            assert_eq!(status, StatusCode::UNAUTHORIZED, "{uri}");
            assert_eq!(code, "AUTHORIZATION_REQUIRED", "{uri}");
        }
    }

    #[tokio::test]
    async fn mutations_reject_garbage_token() {
        let service = service();

        for (method, uri) in mutations() {
            let (status, code) = call(
                app(service.clone()),
                request(method, &uri, Some("garbage")),
            )
            .await;

            assert_eq!(status, StatusCode::UNAUTHORIZED, "{uri}");
            assert_eq!(code, "AUTHORIZATION_REQUIRED", "{uri}");
        }
    }

    #[tokio::test]
    async fn mutations_reject_expired_token() {
        let service = service();
        let expired =
            token(&service, DateTime::now() - Duration::from_secs(16 * 60));

        for (method, uri) in mutations() {
            let (status, code) = call(
                app(service.clone()),
                request(method, &uri, Some(&expired)),
            )
            .await;

            assert_eq!(status, StatusCode::UNAUTHORIZED, "{uri}");
            assert_eq!(code, "AUTHORIZATION_REQUIRED", "{uri}");
        }
    }

    #[tokio::test]
    async fn mutations_reject_foreign_token() {
        let service = service();
        let foreign = {
            let jwt = Jwt::new(
                Some(&SecretString::from("other-secret")),
                Jwt::DEFAULT_TTL,
            )
            .unwrap();
            let login = user::Login::new("a@b.com").unwrap();
            jwt.issue(&login, DateTime::now()).unwrap().0
        };

        let (status, code) = call(
            app(service),
            request(Method::POST, "/products", Some(foreign.as_ref())),
        )
        .await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(code, "AUTHORIZATION_REQUIRED");
    }

    #[tokio::test]
    async fn valid_token_passes_gate() {
        let service = service();
        let valid = token(&service, DateTime::now());

        let (status, code) = call(
            app(service.clone()),
            request(Method::POST, "/products", Some(&valid)),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(code, "INVALID_PAYLOAD");

        let (status, code) = call(
            app(service),
            request(Method::PUT, "/products/zzz", Some(&valid)),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(code, "INVALID_IDENTIFIER");
    }
}
