//! Routing errors.

use std::fmt;

use thiserror::Error;

use crate::handler::InvokeError;
use crate::routing::table::{UnknownVerb, Verb};

/// Why a lookup produced no route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoRouteReason {
    /// Nothing is registered under the verb.
    UnknownVerb,
    /// The verb exists but the path does not.
    UnknownPath,
    /// The path exists but the `action` parameter is absent or names another method.
    ActionMismatch,
}

impl fmt::Display for NoRouteReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            NoRouteReason::UnknownVerb => "no routes for verb",
            NoRouteReason::UnknownPath => "no route for path",
            NoRouteReason::ActionMismatch => "action does not match",
        };
        f.write_str(text)
    }
}

/// Errors produced while dispatching or invoking a request.
#[derive(Debug, Error)]
pub enum RouteError {
    #[error("no route for {verb} `{path}` ({reason})")]
    NoRoute {
        verb: Verb,
        path: String,
        reason: NoRouteReason,
    },

    #[error("{handler}::{method} is not externally callable")]
    NotExposed { handler: String, method: String },

    #[error(transparent)]
    UnsupportedVerb(#[from] UnknownVerb),

    #[error(transparent)]
    Invoke(#[from] InvokeError),
}

impl RouteError {
    /// True for every flavor of "not found".
    pub fn is_not_found(&self) -> bool {
        matches!(self, RouteError::NoRoute { .. })
    }
}

/// Result type for routing operations.
pub type RouteResult<T> = Result<T, RouteError>;
