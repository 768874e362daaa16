//! Router instance: registration at startup, lookup at runtime.
//!
//! # Responsibilities
//! - Compile handler types into one shared route table
//! - Publish an immutable [`Router`] once registration is finished
//! - Expose resolve / dispatch / handle to request-handling code
//!
//! # Design Decisions
//! - Registration happens on [`RouterBuilder`]; [`Router`] has no mutating methods,
//!   so a built router can sit behind an `Arc` without locks
//! - No process-wide state: each router owns its table

use std::time::Instant;

use serde_json::Value;

use crate::config::ApiConfig;
use crate::handler::HandlerType;
use crate::observability::metrics;
use crate::routing::compiler::{CompileOptions, RouteCompiler};
use crate::routing::dispatcher::{
    BoundCall, Dispatcher, RequestParams, ResolvedRequest, DEFAULT_ACTION_PARAM,
};
use crate::routing::error::{RouteError, RouteResult};
use crate::routing::resolver::PathResolver;
use crate::routing::table::{RouteEntry, RouteTable, Verb};

/// Settings shared by compilation, resolution, and dispatch.
#[derive(Debug, Clone)]
pub struct RouterOptions {
    pub compile: CompileOptions,
    pub action_param: String,
    pub resolver: PathResolver,
}

impl RouterOptions {
    pub fn from_config(config: &ApiConfig) -> Self {
        Self {
            compile: CompileOptions {
                compatibility_mode: config.compatibility_mode,
                catch_all_param: config.catch_all_param.clone(),
            },
            action_param: config.action_param.clone(),
            resolver: PathResolver::from_config(config),
        }
    }
}

impl Default for RouterOptions {
    fn default() -> Self {
        Self {
            compile: CompileOptions::default(),
            action_param: DEFAULT_ACTION_PARAM.to_string(),
            resolver: PathResolver::from_config(&ApiConfig::default()),
        }
    }
}

/// Collects handler registrations before the table is published.
#[derive(Debug, Default)]
pub struct RouterBuilder {
    options: RouterOptions,
    table: RouteTable,
}

impl RouterBuilder {
    pub fn new(options: RouterOptions) -> Self {
        Self {
            options,
            table: RouteTable::new(),
        }
    }

    /// Compile `handler` and insert its routes.
    ///
    /// Without a base path the lower-cased handler name is used. Routes that
    /// collide with an existing (verb, path) replace it.
    pub fn register_handler(&mut self, handler: &HandlerType, base_path: Option<&str>) -> &mut Self {
        let base_path = base_path
            .map(str::to_string)
            .unwrap_or_else(|| handler.name().to_lowercase());

        let compiler = RouteCompiler::new(self.options.compile.clone());
        let routes = compiler.compile(handler, &base_path);
        let count = routes.len();

        for route in routes {
            tracing::debug!(
                verb = %route.verb,
                path = %route.path,
                method = %route.call.method_name,
                origin = ?route.origin,
                "Registering route"
            );
            if let Some(previous) = self.table.insert(route.verb, route.path.as_str(), route.call) {
                tracing::debug!(
                    verb = %route.verb,
                    path = %route.path,
                    replaced = %format!("{}::{}", previous.handler_type, previous.method_name),
                    "Route overwritten"
                );
            }
        }

        tracing::info!(
            handler = %handler.name(),
            base_path = %base_path,
            routes = count,
            "Handler registered"
        );
        self
    }

    /// Builder-style variant of [`RouterBuilder::register_handler`].
    pub fn handler(mut self, handler: &HandlerType, base_path: Option<&str>) -> Self {
        self.register_handler(handler, base_path);
        self
    }

    /// Freeze the table.
    pub fn build(self) -> Router {
        metrics::record_routes_registered(self.table.len());
        Router {
            options: self.options,
            table: self.table,
        }
    }
}

/// Immutable router serving lookups.
#[derive(Debug)]
pub struct Router {
    options: RouterOptions,
    table: RouteTable,
}

impl Router {
    pub fn builder(options: RouterOptions) -> RouterBuilder {
        RouterBuilder::new(options)
    }

    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    pub fn options(&self) -> &RouterOptions {
        &self.options
    }

    /// Route listing in registration order.
    pub fn routes(&self) -> Vec<RouteEntry> {
        self.table.entries()
    }

    /// Raw URL → logical path.
    pub fn resolve(&self, raw_url: &str) -> String {
        self.options.resolver.resolve(raw_url)
    }

    /// True when `raw_url` starts at the configured mount point.
    pub fn is_mounted(&self, raw_url: &str) -> bool {
        self.options.resolver.is_mounted(raw_url)
    }

    /// Match a resolved request and bind its arguments.
    pub fn dispatch(
        &self,
        verb: Verb,
        logical_path: &str,
        params: &RequestParams,
    ) -> RouteResult<BoundCall> {
        let dispatcher = Dispatcher::new(
            &self.table,
            &self.options.action_param,
            &self.options.compile.catch_all_param,
        );
        dispatcher.dispatch(verb, logical_path, params)
    }

    /// Build the per-request view used by [`Router::handle_resolved`].
    pub fn resolve_request(&self, verb: Verb, raw_url: &str, params: RequestParams) -> ResolvedRequest {
        ResolvedRequest {
            verb,
            logical_path: self.resolve(raw_url),
            params,
        }
    }

    /// Resolve, dispatch, and invoke in one step.
    pub fn handle(&self, verb: Verb, raw_url: &str, params: RequestParams) -> RouteResult<Value> {
        self.handle_resolved(&self.resolve_request(verb, raw_url, params))
    }

    /// Dispatch and invoke an already resolved request.
    ///
    /// Methods flagged protected-hidden are matched but refused.
    pub fn handle_resolved(&self, request: &ResolvedRequest) -> RouteResult<Value> {
        let start = Instant::now();
        let verb = request.verb;
        let logical_path = request.logical_path.as_str();

        let result = self.dispatch(verb, logical_path, &request.params).and_then(|bound| {
            if !bound.call.flag.is_externally_callable() {
                return Err(RouteError::NotExposed {
                    handler: bound.call.handler_type.clone(),
                    method: bound.call.method_name.clone(),
                });
            }
            tracing::debug!(
                verb = %verb,
                path = %logical_path,
                handler = %bound.call.handler_type,
                method = %bound.call.method_name,
                "Dispatching"
            );
            bound.invoke().map_err(RouteError::from)
        });

        match &result {
            Ok(_) => metrics::record_dispatch(verb, "ok", start),
            Err(RouteError::NoRoute { reason, .. }) => {
                tracing::warn!(verb = %verb, path = %logical_path, reason = %reason, "No route matched");
                metrics::record_dispatch(verb, "no_route", start);
            }
            Err(err) => {
                tracing::warn!(verb = %verb, path = %logical_path, error = %err, "Dispatch failed");
                metrics::record_dispatch(verb, "error", start);
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::{InvokeError, MethodDef};
    use crate::routing::error::NoRouteReason;
    use serde_json::json;

    fn items() -> HandlerType {
        HandlerType::new("Items")
            .method(MethodDef::public("getWidget", |args| Ok(json!({"widget": args[0]}))).param("id"))
            .method(MethodDef::protected("audit", |_| Ok(json!("audited"))))
            .method(MethodDef::public("fail", |_| Err(InvokeError::Failed("boom".into()))))
    }

    #[test]
    fn test_default_base_path_is_lowercased_name() {
        let router = RouterBuilder::default().handler(&items(), None).build();
        assert!(router.table().get(Verb::Get, "items/widget").is_some());
        assert!(router.table().get(Verb::Get, "items/widget/:id").is_some());
    }

    #[test]
    fn test_handle_end_to_end() {
        let router = RouterBuilder::default().handler(&items(), Some("/shop/")).build();
        let params = RequestParams::new().with("action", "getWidget").with("id", "9");

        let value = router
            .handle(Verb::Get, "http://localhost/api/shop/widget/:id.json?x=1", params)
            .unwrap();
        assert_eq!(value, json!({"widget": "9"}));
    }

    #[test]
    fn test_handle_refuses_hidden_protected() {
        let router = RouterBuilder::default().handler(&items(), None).build();
        let params = RequestParams::new().with("action", "audit");

        let bound = router.dispatch(Verb::Get, "items/audit", &params).unwrap();
        assert_eq!(bound.call.method_name, "audit");

        let err = router.handle(Verb::Get, "/api/items/audit", params).unwrap_err();
        assert!(matches!(err, RouteError::NotExposed { ref method, .. } if method == "audit"));
    }

    #[test]
    fn test_handle_propagates_errors() {
        let router = RouterBuilder::default().handler(&items(), None).build();

        let err = router
            .handle(Verb::Get, "/api/items/fail", RequestParams::new().with("action", "fail"))
            .unwrap_err();
        assert!(matches!(err, RouteError::Invoke(InvokeError::Failed(_))));

        let err = router
            .handle(Verb::Get, "/api/items/missing", RequestParams::new())
            .unwrap_err();
        assert!(matches!(
            err,
            RouteError::NoRoute { reason: NoRouteReason::UnknownPath, .. }
        ));
    }

    #[test]
    fn test_later_registration_overwrites() {
        let first = HandlerType::new("A").method(MethodDef::public("ping", |_| Ok(json!("a"))));
        let second = HandlerType::new("B").method(MethodDef::public("ping", |_| Ok(json!("b"))));
        let router = RouterBuilder::default()
            .handler(&first, Some("shared"))
            .handler(&second, Some("shared"))
            .build();

        assert_eq!(router.routes().len(), 1);
        let call = router.table().get(Verb::Get, "shared/ping").unwrap();
        assert_eq!(call.handler_type, "B");
    }
}
