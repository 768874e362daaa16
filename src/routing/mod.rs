//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Route Compilation (at startup):
//!     HandlerType + base path
//!     → compiler.rs (explicit @url routes, or convention routes)
//!     → table.rs (verb → path → CallDescriptor)
//!     → router.rs (freeze as immutable Router)
//!
//! Incoming Request (verb, raw URL, parameters)
//!     → resolver.rs (raw URL → logical path)
//!     → dispatcher.rs (exact path + action match, argument binding)
//!     → Return: BoundCall or NoRoute
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - No regex in the request path (exact string comparison only)
//! - Deterministic: same input always matches same route
//! - First match in registration order wins

pub mod compiler;
pub mod dispatcher;
pub mod error;
pub mod resolver;
pub mod router;
pub mod table;

pub use compiler::{CompileOptions, CompiledRoute, RouteCompiler, RouteOrigin};
pub use dispatcher::{BoundCall, Dispatcher, RequestParams, ResolvedRequest};
pub use error::{NoRouteReason, RouteError, RouteResult};
pub use resolver::PathResolver;
pub use router::{Router, RouterBuilder, RouterOptions};
pub use table::{CallDescriptor, MethodFlag, RouteEntry, RouteTable, UnknownVerb, Verb};
