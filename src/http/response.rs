//! Response handling and transformation.
//!
//! # Responsibilities
//! - Wrap handler return values as JSON
//! - Map routing and body errors to HTTP status codes
//!
//! # Design Decisions
//! - Every "no route" flavor is a plain 404 without detail
//! - Error bodies share one shape: `{"error": {"code": N, "message": "..."}}`

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::http::request::BodyError;
use crate::routing::RouteError;

/// JSON error body with the given status.
pub fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    let body = json!({
        "error": {
            "code": status.as_u16(),
            "message": message.into(),
        }
    });
    (status, Json(body)).into_response()
}

/// Status code for a routing failure.
pub fn status_for(err: &RouteError) -> StatusCode {
    match err {
        RouteError::NoRoute { .. } => StatusCode::NOT_FOUND,
        RouteError::NotExposed { .. } => StatusCode::FORBIDDEN,
        RouteError::UnsupportedVerb(_) => StatusCode::METHOD_NOT_ALLOWED,
        RouteError::Invoke(e) if e.is_client_error() => StatusCode::BAD_REQUEST,
        RouteError::Invoke(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for RouteError {
    fn into_response(self) -> Response {
        let status = status_for(&self);
        let message = match &self {
            RouteError::NoRoute { .. } => "Not Found".to_string(),
            other => other.to_string(),
        };
        error_response(status, message)
    }
}

impl IntoResponse for BodyError {
    fn into_response(self) -> Response {
        error_response(StatusCode::BAD_REQUEST, self.to_string())
    }
}
