//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate addresses, the root URL, and the mount segment
//! - Check that routing parameter names are usable
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: RouterConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::fmt;
use std::net::SocketAddr;

use crate::config::schema::RouterConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field (e.g. "api.root_url").
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Validate a parsed configuration, collecting every problem found.
pub fn validate_config(config: &RouterConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("`{}` is not a socket address", config.listener.bind_address),
        ));
    }

    if config.listener.max_body_size == 0 {
        errors.push(ValidationError::new("listener.max_body_size", "must be greater than 0"));
    }

    let api = &config.api;
    match url::Url::parse(&api.root_url) {
        Ok(url) if url.query().is_some() || url.fragment().is_some() => {
            errors.push(ValidationError::new(
                "api.root_url",
                "must not contain a query or fragment",
            ));
        }
        Ok(_) => {}
        Err(e) => {
            errors.push(ValidationError::new("api.root_url", e.to_string()));
        }
    }

    if api.mount.contains(['?', '#']) {
        errors.push(ValidationError::new(
            "api.mount",
            "must not contain `?` or `#`",
        ));
    }

    for ext in &api.format_extensions {
        if ext.len() < 2 || !ext.starts_with('.') || ext.contains('/') {
            errors.push(ValidationError::new(
                "api.format_extensions",
                format!("`{ext}` must look like `.json`"),
            ));
        }
    }

    if api.catch_all_param.is_empty() {
        errors.push(ValidationError::new("api.catch_all_param", "must not be empty"));
    }
    if api.action_param.is_empty() {
        errors.push(ValidationError::new("api.action_param", "must not be empty"));
    }
    if !api.action_param.is_empty() && api.action_param == api.catch_all_param {
        errors.push(ValidationError::new(
            "api.action_param",
            "must differ from api.catch_all_param",
        ));
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new("timeouts.request_secs", "must be greater than 0"));
    }

    let observability = &config.observability;
    if observability.log_level.parse::<tracing::Level>().is_err() {
        errors.push(ValidationError::new(
            "observability.log_level",
            format!("unknown level `{}`", observability.log_level),
        ));
    }
    if observability.metrics_enabled
        && observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("`{}` is not a socket address", observability.metrics_address),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
