//! HTTP host adapter.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware: request ID, tracing, timeout)
//!     → request.rs (effective verb, query + body parameters)
//!     → routing::Router (resolve → dispatch → invoke)
//!     → response.rs (JSON body, error status mapping)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use server::{AppState, HttpServer};
