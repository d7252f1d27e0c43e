//! Shared-secret access guard.
//!
//! When an API key is configured every request must carry it, either as the
//! `api_key` query parameter or as a top-level `api_key` field of a JSON body.
//! Rejected requests get a 401 before any handler (and so any database work)
//! runs. `/health` is always admitted.

use crate::errors::ServiceError;
use axum::{
    body::{to_bytes, Body},
    extract::{Query, Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};
use metrics::counter;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Query parameter and JSON body field carrying the key
pub const API_KEY_PARAM: &str = "api_key";

/// Largest JSON body buffered while looking for the key
const MAX_INSPECTED_BODY: usize = 2 * 1024 * 1024;

const EXEMPT_PATHS: &[&str] = &["/health"];

/// Configured secret; `None` admits every request
#[derive(Clone, Debug, Default)]
pub struct ApiKeyGuard {
    secret: Option<Arc<str>>,
}

impl ApiKeyGuard {
    pub fn new(secret: Option<&str>) -> Self {
        Self {
            secret: secret.filter(|s| !s.is_empty()).map(Arc::from),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.secret.is_some()
    }

    pub fn admits(&self, supplied: Option<&str>) -> bool {
        match &self.secret {
            None => true,
            Some(secret) => supplied == Some(secret.as_ref()),
        }
    }
}

fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.trim_start().starts_with("application/json"))
        .unwrap_or(false)
}

fn key_from_query(request: &Request) -> Option<String> {
    Query::<HashMap<String, String>>::try_from_uri(request.uri())
        .ok()
        .and_then(|Query(mut params)| params.remove(API_KEY_PARAM))
}

/// Reads `api_key` from the top level of a JSON object body.
pub fn key_from_json(body: &[u8]) -> Option<String> {
    let value: serde_json::Value = serde_json::from_slice(body).ok()?;
    value
        .get(API_KEY_PARAM)
        .and_then(|v| v.as_str())
        .map(str::to_string)
}

/// Rejects requests that do not carry the configured API key.
pub async fn api_key_middleware(
    State(guard): State<ApiKeyGuard>,
    request: Request,
    next: Next,
) -> Response {
    if !guard.is_enabled() || EXEMPT_PATHS.contains(&request.uri().path()) {
        return next.run(request).await;
    }

    let mut supplied = key_from_query(&request);

    let request = if supplied.is_none() && is_json(request.headers()) {
        let (parts, body) = request.into_parts();
        let bytes = match to_bytes(body, MAX_INSPECTED_BODY).await {
            Ok(bytes) => bytes,
            Err(e) => {
                debug!(error = %e, "Unable to buffer request body");
                return ServiceError::BadRequest("request body could not be read".into())
                    .into_response();
            }
        };
        supplied = key_from_json(&bytes);
        Request::from_parts(parts, Body::from(bytes))
    } else {
        request
    };

    if !guard.admits(supplied.as_deref()) {
        counter!("clinic.auth.rejected", 1);
        warn!(
            path = %request.uri().path(),
            key_supplied = supplied.is_some(),
            "Rejected request without a valid API key"
        );
        return ServiceError::Unauthorized("invalid or missing api_key".into()).into_response();
    }

    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        http::{Method, StatusCode},
        routing::{get, post},
        Router,
    };
    use tower::ServiceExt;

    fn app(secret: Option<&str>) -> Router {
        Router::new()
            .route("/health", get(|| async { "ok" }))
            .route("/get-patients", get(|| async { "patients" }))
            .route("/save-visit", post(|body: String| async move { body }))
            .layer(axum::middleware::from_fn_with_state(
                ApiKeyGuard::new(secret),
                api_key_middleware,
            ))
    }

    async fn call(app: Router, request: axum::http::Request<Body>) -> (StatusCode, String) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    fn get_request(uri: &str) -> axum::http::Request<Body> {
        axum::http::Request::builder()
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    fn json_post(uri: &str, body: &str) -> axum::http::Request<Body> {
        axum::http::Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[test]
    fn empty_secret_disables_guard() {
        let guard = ApiKeyGuard::new(Some(""));
        assert!(!guard.is_enabled());
        assert!(guard.admits(None));
    }

    #[test]
    fn key_is_read_from_top_level_json_only() {
        assert_eq!(
            key_from_json(br#"{"api_key":"s3cret","visitId":1}"#).as_deref(),
            Some("s3cret")
        );
        assert_eq!(key_from_json(br#"{"nested":{"api_key":"s3cret"}}"#), None);
        assert_eq!(key_from_json(b"not json"), None);
    }

    #[tokio::test]
    async fn unset_secret_admits_everything() {
        let (status, _) = call(app(None), get_request("/get-patients")).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn missing_or_wrong_key_is_rejected() {
        let (status, body) = call(app(Some("s3cret")), get_request("/get-patients")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body.contains("api_key"));

        let (status, _) = call(
            app(Some("s3cret")),
            get_request("/get-patients?api_key=wrong"),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn query_key_is_accepted() {
        let (status, body) = call(
            app(Some("s3cret")),
            get_request("/get-patients?api_key=s3cret"),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "patients");
    }

    #[tokio::test]
    async fn body_key_is_accepted_and_body_is_preserved() {
        let payload = r#"{"api_key":"s3cret","visitId":7}"#;
        let (status, body) = call(app(Some("s3cret")), json_post("/save-visit", payload)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, payload);
    }

    #[tokio::test]
    async fn health_is_exempt() {
        let (status, _) = call(app(Some("s3cret")), get_request("/health")).await;
        assert_eq!(status, StatusCode::OK);
    }
}
