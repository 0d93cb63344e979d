//! Principal extraction for callable endpoints.
//!
//! Modules never parse credentials themselves. The binary injects an
//! `Authenticator` at startup; the `authenticate` middleware stores the
//! resulting `Principal` in request extensions and handlers read it back
//! through the `Caller` extractor.

use std::convert::Infallible;
use std::sync::Arc;

use axum::extract::{FromRequestParts, Request, State};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::ServiceError;

/// The authenticated identity behind a call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    /// Subject id asserted by the identity provider. Keys `usuarios/<uid>`.
    pub uid: String,
}

impl Principal {
    pub fn new(uid: impl Into<String>) -> Self {
        Self { uid: uid.into() }
    }
}

/// Pluggable identity assertion.
///
/// - `Ok(None)`: the request carries no credentials.
/// - `Ok(Some(_))`: credentials were present and valid.
/// - `Err(_)`: credentials were present but rejected.
pub trait Authenticator: Send + Sync + 'static {
    fn authenticate(&self, headers: &HeaderMap) -> Result<Option<Principal>, ServiceError>;
}

/// Never yields a principal. Used for testing the unauthenticated paths.
pub struct Anonymous;

impl Authenticator for Anonymous {
    fn authenticate(&self, _headers: &HeaderMap) -> Result<Option<Principal>, ServiceError> {
        Ok(None)
    }
}

/// Always yields the same principal. Used for testing.
pub struct StaticPrincipal(pub Principal);

impl Authenticator for StaticPrincipal {
    fn authenticate(&self, _headers: &HeaderMap) -> Result<Option<Principal>, ServiceError> {
        Ok(Some(self.0.clone()))
    }
}

/// Extract the token from `Authorization: Bearer <token>`.
/// The scheme is matched case-insensitively.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?.trim();
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

/// Middleware: run the authenticator and stash the principal, if any.
///
/// Missing credentials pass through; handlers decide whether that is fatal.
/// Invalid credentials are answered immediately with `UNAUTHENTICATED`.
pub async fn authenticate(
    State(authenticator): State<Arc<dyn Authenticator>>,
    mut request: Request,
    next: Next,
) -> Response {
    match authenticator.authenticate(request.headers()) {
        Ok(Some(principal)) => {
            request.extensions_mut().insert(principal);
        }
        Ok(None) => {}
        Err(e) => return e.into_response(),
    }
    next.run(request).await
}

/// Handler-side view of the principal placed by [`authenticate`].
#[derive(Debug, Clone, Default)]
pub struct Caller(pub Option<Principal>);

impl Caller {
    pub fn principal(&self) -> Option<&Principal> {
        self.0.as_ref()
    }
}

impl<S: Send + Sync> FromRequestParts<S> for Caller {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Caller(parts.extensions.get::<Principal>().cloned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{HeaderValue, StatusCode};
    use axum::routing::get;
    use axum::Router;
    use tower::ServiceExt;

    struct RejectAll;

    impl Authenticator for RejectAll {
        fn authenticate(&self, _headers: &HeaderMap) -> Result<Option<Principal>, ServiceError> {
            Err(ServiceError::Unauthenticated("bad token".into()))
        }
    }

    fn app(authenticator: Arc<dyn Authenticator>) -> Router {
        async fn whoami(caller: Caller) -> String {
            caller.principal().map(|p| p.uid.clone()).unwrap_or_else(|| "-".into())
        }
        Router::new()
            .route("/whoami", get(whoami))
            .layer(axum::middleware::from_fn_with_state(authenticator, authenticate))
    }

    async fn call(router: Router) -> (StatusCode, String) {
        let req = axum::http::Request::builder().uri("/whoami").body(Body::empty()).unwrap();
        let resp = router.oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), 1024).await.unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn principal_reaches_handler() {
        let (status, body) = call(app(Arc::new(StaticPrincipal(Principal::new("u-7"))))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "u-7");
    }

    #[tokio::test]
    async fn anonymous_passes_through() {
        let (status, body) = call(app(Arc::new(Anonymous))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "-");
    }

    #[tokio::test]
    async fn rejected_credentials_short_circuit() {
        let (status, body) = call(app(Arc::new(RejectAll))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body.contains("UNAUTHENTICATED"));
    }

    #[test]
    fn bearer_token_parsing() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc.def"));
        assert_eq!(bearer_token(&headers), Some("abc.def"));

        headers.insert(AUTHORIZATION, HeaderValue::from_static("bearer   xyz "));
        assert_eq!(bearer_token(&headers), Some("xyz"));

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic dXNlcg=="));
        assert_eq!(bearer_token(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert_eq!(bearer_token(&headers), None);
    }
}
