//! Annotation-routed endpoint library.
//!
//! Handler types are declared as data ([`handler::HandlerType`]), compiled
//! once into a verb → path → call table ([`routing::RouterBuilder`]), and
//! served read-only ([`routing::Router`]), directly or through the Axum
//! adapter in [`http`].

pub mod config;
pub mod handler;
pub mod http;
pub mod lifecycle;
pub mod metadata;
pub mod observability;
pub mod routing;

pub use config::schema::RouterConfig;
pub use handler::{HandlerType, InvokeError, MethodDef};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use routing::{RequestParams, Router, RouterBuilder, RouterOptions, Verb};
