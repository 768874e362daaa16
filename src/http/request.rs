//! Request handling and transformation.
//!
//! # Responsibilities
//! - Determine the verb used for route lookup
//! - Flatten query-string and body values into request parameters
//!
//! # Design Decisions
//! - `X-HTTP-Method-Override` replaces the transport verb
//! - HEAD is looked up as GET
//! - Body values win over query values with the same name
//! - Bodies in unrecognized formats contribute no parameters

use axum::http::{header, HeaderMap, Method};
use serde_json::{Map, Value};
use thiserror::Error;
use url::form_urlencoded;

use crate::routing::{RequestParams, UnknownVerb, Verb};

/// Header that overrides the request method.
pub const METHOD_OVERRIDE_HEADER: &str = "x-http-method-override";

/// Errors while reading request parameters from the body.
#[derive(Debug, Error)]
pub enum BodyError {
    #[error("invalid JSON body: {0}")]
    Json(#[from] serde_json::Error),

    #[error("JSON body must be an object")]
    NotAnObject,
}

/// Verb used for route lookup.
pub fn effective_verb(method: &Method, headers: &HeaderMap) -> Result<Verb, UnknownVerb> {
    let name = headers
        .get(METHOD_OVERRIDE_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(method.as_str());

    match name.parse::<Verb>()? {
        Verb::Head => Ok(Verb::Get),
        verb => Ok(verb),
    }
}

/// Decode a URL query string into ordered pairs.
pub fn parse_query(query: Option<&str>) -> Vec<(String, String)> {
    query
        .map(|q| form_urlencoded::parse(q.as_bytes()).into_owned().collect())
        .unwrap_or_default()
}

/// Decode a request body according to its content type.
pub fn parse_body(content_type: Option<&str>, body: &[u8]) -> Result<Map<String, Value>, BodyError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Map::new());
    }

    let mime = content_type
        .and_then(|ct| ct.split(';').next())
        .map(|ct| ct.trim().to_ascii_lowercase())
        .unwrap_or_default();

    if mime == "application/json" || mime.ends_with("+json") {
        return match serde_json::from_slice::<Value>(body)? {
            Value::Object(map) => Ok(map),
            Value::Null => Ok(Map::new()),
            _ => Err(BodyError::NotAnObject),
        };
    }

    if mime == "application/x-www-form-urlencoded" {
        return Ok(form_urlencoded::parse(body)
            .into_owned()
            .map(|(k, v)| (k, Value::String(v)))
            .collect());
    }

    Ok(Map::new())
}

/// Flattened parameters for a request.
pub fn request_params(
    headers: &HeaderMap,
    query: Option<&str>,
    body: &[u8],
) -> Result<RequestParams, BodyError> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok());
    let body = parse_body(content_type, body)?;
    Ok(RequestParams::from_parts(body, parse_query(query)))
}
