//! Route compilation from handler declarations.
//!
//! # Responsibilities
//! - Merge type-level and method-level metadata
//! - Classify each method's external access
//! - Derive routes from `@url` annotations or from the method name
//! - Synthesize one extra route per leading positional parameter
//!
//! # Design Decisions
//! - Explicit `@url` routes suppress convention routes for that method
//! - Explicit paths are registered as written, without the base path
//! - Names starting with `_` are hidden unless they carry an `@url`
//! - Compilation is pure: it returns routes and leaves insertion to the caller

use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::handler::{HandlerType, MethodDef, Visibility};
use crate::metadata::Metadata;
use crate::routing::table::{CallDescriptor, MethodFlag, Verb};

/// Leading character that keeps a method out of convention routing.
pub const HIDDEN_PREFIX: char = '_';

/// Default name of the parameter that receives the full request mapping.
pub const DEFAULT_CATCH_ALL: &str = "request_data";

static EXPLICIT_ROUTE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"@url\s+(GET|POST|PUT|DELETE|HEAD|OPTIONS)[ \t]*/?(\S*)").unwrap()
});

/// Options that influence how routes are derived.
#[derive(Debug, Clone)]
pub struct CompileOptions {
    /// Expose every protected method.
    pub compatibility_mode: bool,
    /// Parameter name that ends positional path synthesis.
    pub catch_all_param: String,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            compatibility_mode: false,
            catch_all_param: DEFAULT_CATCH_ALL.to_string(),
        }
    }
}

/// How a route was declared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteOrigin {
    Explicit,
    Convention,
}

/// A route produced by compilation, not yet inserted into a table.
#[derive(Debug, Clone)]
pub struct CompiledRoute {
    pub verb: Verb,
    pub path: String,
    pub call: Arc<CallDescriptor>,
    pub origin: RouteOrigin,
}

/// Derives route entries for handler types.
#[derive(Debug, Clone, Default)]
pub struct RouteCompiler {
    options: CompileOptions,
}

impl RouteCompiler {
    pub fn new(options: CompileOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &CompileOptions {
        &self.options
    }

    /// Compile every routable method of `handler`, in declaration order.
    ///
    /// `base_path` is normalized with [`normalize_base_path`] first.
    pub fn compile(&self, handler: &HandlerType, base_path: &str) -> Vec<CompiledRoute> {
        let base = normalize_base_path(base_path);
        let type_metadata = Metadata::parse(handler.doc_block());

        handler
            .methods()
            .iter()
            .flat_map(|method| self.compile_method(handler, &type_metadata, method, &base))
            .collect()
    }

    fn compile_method(
        &self,
        handler: &HandlerType,
        type_metadata: &Metadata,
        method: &MethodDef,
        base: &str,
    ) -> Vec<CompiledRoute> {
        if method.visibility() == Visibility::Private {
            return Vec::new();
        }

        let metadata = type_metadata.merged_with(&Metadata::parse(method.doc_block()));
        let flag = self.method_flag(method.visibility(), &metadata);
        let call = Arc::new(CallDescriptor {
            handler_type: handler.name().to_string(),
            method_name: method.name().to_string(),
            arguments: method.params().iter().map(|p| p.name.clone()).collect(),
            defaults: method.params().iter().map(|p| p.default.clone()).collect(),
            metadata,
            flag,
            invoker: method.invoker(),
        });

        let explicit = explicit_routes(method.doc_block());
        if !explicit.is_empty() {
            return explicit
                .into_iter()
                .map(|(verb, path)| CompiledRoute {
                    verb,
                    path,
                    call: Arc::clone(&call),
                    origin: RouteOrigin::Explicit,
                })
                .collect();
        }

        let Some((verb, segment)) = convention_route(method.name()) else {
            tracing::debug!(
                handler = %handler.name(),
                method = %method.name(),
                "Skipping hidden method"
            );
            return Vec::new();
        };

        let mut path = format!("{base}{segment}").trim_end_matches('/').to_string();
        let mut routes = vec![CompiledRoute {
            verb,
            path: path.clone(),
            call: Arc::clone(&call),
            origin: RouteOrigin::Convention,
        }];

        for param in method.params() {
            if param.name == self.options.catch_all_param {
                break;
            }
            path.push_str(if path.is_empty() { ":" } else { "/:" });
            path.push_str(&param.name);
            routes.push(CompiledRoute {
                verb,
                path: path.clone(),
                call: Arc::clone(&call),
                origin: RouteOrigin::Convention,
            });
        }

        routes
    }

    fn method_flag(&self, visibility: Visibility, metadata: &Metadata) -> MethodFlag {
        match visibility {
            Visibility::Protected
                if self.options.compatibility_mode || metadata.contains("protected") =>
            {
                MethodFlag::ProtectedExposed
            }
            Visibility::Protected => MethodFlag::ProtectedHidden,
            _ => MethodFlag::Public,
        }
    }
}

/// Trim surrounding slashes and, if anything is left, add exactly one trailing slash.
pub fn normalize_base_path(base_path: &str) -> String {
    let trimmed = base_path.trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("{trimmed}/")
    }
}

/// Every `@url VERB [/]path` declaration in a raw annotation block.
pub fn explicit_routes(doc: &str) -> Vec<(Verb, String)> {
    EXPLICIT_ROUTE
        .captures_iter(doc)
        .filter_map(|caps| {
            let verb = caps.get(1)?.as_str().parse::<Verb>().ok()?;
            let path = caps.get(2).map_or("", |m| m.as_str());
            Some((verb, path.trim_end_matches('/').to_string()))
        })
        .collect()
}

/// Verb and path segment implied by a method name, or `None` for hidden names.
pub fn convention_route(method_name: &str) -> Option<(Verb, String)> {
    let lowered = method_name.to_lowercase();
    if lowered.starts_with(HIDDEN_PREFIX) {
        return None;
    }

    let (verb, segment) = Verb::ALL
        .into_iter()
        .find_map(|verb| {
            lowered
                .strip_prefix(&verb.as_str().to_ascii_lowercase())
                .map(|rest| (verb, rest))
        })
        .unwrap_or((Verb::Get, lowered.as_str()));

    let segment = match segment {
        "index" | "default" => "",
        other => other,
    };
    Some((verb, segment.to_string()))
}
