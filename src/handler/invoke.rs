//! Invocation seam between bound calls and handler code.

use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

/// Errors raised while invoking a handler method.
#[derive(Debug, Error)]
pub enum InvokeError {
    /// A required positional argument was not supplied and has no default.
    #[error("missing argument `{0}`")]
    MissingArgument(String),

    /// An argument was supplied but could not be converted.
    #[error("invalid argument `{name}`: {reason}")]
    InvalidArgument { name: String, reason: String },

    /// The handler itself failed.
    #[error("handler failed: {0}")]
    Failed(String),
}

impl InvokeError {
    /// True when the caller supplied bad input, as opposed to a handler fault.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            InvokeError::MissingArgument(_) | InvokeError::InvalidArgument { .. }
        )
    }
}

/// A handler method callable with positional arguments.
///
/// Arguments arrive in declaration order; a position with neither a supplied
/// value nor a default is passed as `Value::Null`.
pub trait Invocable: Send + Sync {
    fn call(&self, args: &[Value]) -> Result<Value, InvokeError>;
}

impl<F> Invocable for F
where
    F: Fn(&[Value]) -> Result<Value, InvokeError> + Send + Sync,
{
    fn call(&self, args: &[Value]) -> Result<Value, InvokeError> {
        self(args)
    }
}

/// Read and convert the argument at `position`.
///
/// Missing positions and nulls are reported as [`InvokeError::MissingArgument`].
/// Strings that hold a JSON scalar (`"3"`, `"true"`) are accepted for
/// non-string targets, since query and form values always arrive as text.
pub fn argument<T: DeserializeOwned>(
    args: &[Value],
    position: usize,
    name: &str,
) -> Result<T, InvokeError> {
    let value = match args.get(position) {
        None | Some(Value::Null) => return Err(InvokeError::MissingArgument(name.to_string())),
        Some(value) => value,
    };

    match serde_json::from_value::<T>(value.clone()) {
        Ok(parsed) => Ok(parsed),
        Err(err) => {
            let coerced = match value {
                Value::String(text) => serde_json::from_str::<T>(text).ok(),
                _ => None,
            };
            coerced.ok_or_else(|| InvokeError::InvalidArgument {
                name: name.to_string(),
                reason: err.to_string(),
            })
        }
    }
}
