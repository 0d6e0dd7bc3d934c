//! Request correlation for the recommendation endpoints.
//!
//! Every request carries a UUID in `x-request-id`: a valid incoming one is
//! kept, anything else is replaced. The per-request span also records which
//! recommendation branch the route serves and the `user_id` it was asked
//! for, so handlers only log what they produced.

use axum::{
    body::Body,
    extract::{Query, Request},
    http::{HeaderMap, HeaderValue, Uri},
    middleware::Next,
    response::Response,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::models::UserId;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Correlation id stored in request extensions
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RequestId(pub Uuid);

impl RequestId {
    /// Takes the id from `x-request-id` when it parses as a UUID, else generates one
    pub fn from_headers(headers: &HeaderMap) -> Self {
        headers
            .get(REQUEST_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| Uuid::parse_str(value.trim()).ok())
            .map(Self)
            .unwrap_or_else(|| Self(Uuid::new_v4()))
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

pub async fn request_id_middleware(mut request: Request, next: Next) -> Response {
    let request_id = RequestId::from_headers(request.headers());
    request.extensions_mut().insert(request_id);

    let mut response = next.run(request).await;

    if let Ok(value) = HeaderValue::from_str(&request_id.to_string()) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    response
}

/// Recommendation branch served by a route, if any
pub fn branch_for_path(path: &str) -> Option<&'static str> {
    match path {
        "/recommendations_offline" => Some("offline"),
        "/recommendations_online" => Some("online"),
        "/recommendations" => Some("blended"),
        _ => None,
    }
}

#[derive(Deserialize)]
struct UserParam {
    user_id: Option<UserId>,
}

/// `user_id` from the query string; absent or malformed yields `None`
pub fn user_id_from_uri(uri: &Uri) -> Option<UserId> {
    Query::<UserParam>::try_from_uri(uri)
        .ok()
        .and_then(|Query(param)| param.user_id)
}

/// Span wrapping one recommendation request
pub fn make_recs_span(request: &Request<Body>) -> tracing::Span {
    let request_id = request
        .extensions()
        .get::<RequestId>()
        .map(ToString::to_string)
        .unwrap_or_else(|| "unknown".to_string());

    let span = tracing::info_span!(
        "recs_request",
        method = %request.method(),
        uri = %request.uri(),
        request_id = %request_id,
        branch = tracing::field::Empty,
        user_id = tracing::field::Empty,
    );

    if let Some(branch) = branch_for_path(request.uri().path()) {
        span.record("branch", branch);
        if let Some(user_id) = user_id_from_uri(request.uri()) {
            span.record("user_id", user_id);
        }
    }

    span
}
