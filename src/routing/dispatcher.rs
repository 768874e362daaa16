//! Request dispatch against a compiled route table.
//!
//! # Responsibilities
//! - Select the route for (verb, logical path, `action` parameter)
//! - Bind positional arguments from defaults and request parameters
//!
//! # Design Decisions
//! - Path comparison is literal string equality; `:name` segments are
//!   never treated as placeholders
//! - An `action` parameter naming the method is required, even when the path
//!   alone is unambiguous
//! - Null parameter values do not override defaults
//! - Dispatch never mutates the table

use std::sync::Arc;

use serde_json::{Map, Value};

use crate::handler::InvokeError;
use crate::routing::error::{NoRouteReason, RouteError, RouteResult};
use crate::routing::table::{CallDescriptor, RouteTable, Verb};

/// Default name of the parameter that selects the method.
pub const DEFAULT_ACTION_PARAM: &str = "action";

/// Flattened query-string and body parameters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestParams(Map<String, Value>);

impl RequestParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge body and query values. Body values win on conflicting keys.
    pub fn from_parts<Q>(body: Map<String, Value>, query: Q) -> Self
    where
        Q: IntoIterator<Item = (String, String)>,
    {
        let mut params = body;
        for (key, value) in query {
            params.entry(key).or_insert(Value::String(value));
        }
        Self(params)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    /// Builder-style variant of [`RequestParams::insert`].
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Map<String, Value>> for RequestParams {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl FromIterator<(String, Value)> for RequestParams {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// A request after path resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedRequest {
    pub verb: Verb,
    pub logical_path: String,
    pub params: RequestParams,
}

/// A matched route with its positional arguments bound.
#[derive(Debug, Clone)]
pub struct BoundCall {
    pub call: Arc<CallDescriptor>,
    /// The table key that matched.
    pub path: String,
    /// Bound values by position; `None` where nothing was supplied and no default exists.
    pub arguments: Vec<Option<Value>>,
}

impl BoundCall {
    pub fn argument(&self, position: usize) -> Option<&Value> {
        self.arguments.get(position).and_then(Option::as_ref)
    }

    /// Run the handler method. Unbound positions are passed as `Value::Null`.
    pub fn invoke(&self) -> Result<Value, InvokeError> {
        let args: Vec<Value> = self
            .arguments
            .iter()
            .map(|arg| arg.clone().unwrap_or(Value::Null))
            .collect();
        self.call.invoker.call(&args)
    }
}

/// Matches requests against a borrowed route table.
#[derive(Debug, Clone, Copy)]
pub struct Dispatcher<'a> {
    table: &'a RouteTable,
    action_param: &'a str,
    catch_all_param: &'a str,
}

impl<'a> Dispatcher<'a> {
    pub fn new(table: &'a RouteTable, action_param: &'a str, catch_all_param: &'a str) -> Self {
        Self {
            table,
            action_param,
            catch_all_param,
        }
    }

    /// Select and bind the route for a request.
    pub fn dispatch(
        &self,
        verb: Verb,
        logical_path: &str,
        params: &RequestParams,
    ) -> RouteResult<BoundCall> {
        let not_found = |reason| RouteError::NoRoute {
            verb,
            path: logical_path.to_string(),
            reason,
        };

        let routes = self
            .table
            .routes_for(verb)
            .filter(|routes| !routes.is_empty())
            .ok_or_else(|| not_found(NoRouteReason::UnknownVerb))?;

        let action = match self.action_param(params) {
            Some(Value::String(action)) => Some(action.as_str()),
            _ => None,
        };

        let mut path_matched = false;
        let found = routes.iter().find(|(path, call)| {
            if path.as_str() != logical_path {
                return false;
            }
            path_matched = true;
            action == Some(call.method_name.as_str())
        });

        let Some((path, call)) = found else {
            let reason = if path_matched {
                NoRouteReason::ActionMismatch
            } else {
                NoRouteReason::UnknownPath
            };
            return Err(not_found(reason));
        };

        Ok(BoundCall {
            call: Arc::clone(call),
            path: path.clone(),
            arguments: self.bind(call, params),
        })
    }

    fn action_param<'p>(&self, params: &'p RequestParams) -> Option<&'p Value> {
        if self.action_param == self.catch_all_param {
            return None;
        }
        params.get(self.action_param)
    }

    fn bind(&self, call: &CallDescriptor, params: &RequestParams) -> Vec<Option<Value>> {
        call.arguments
            .iter()
            .zip(&call.defaults)
            .map(|(name, default)| {
                if name == self.catch_all_param {
                    return Some(Value::Object(params.as_map().clone()));
                }
                match params.get(name) {
                    Some(value) if !value.is_null() => Some(value.clone()),
                    _ => default.clone(),
                }
            })
            .collect()
    }
}
