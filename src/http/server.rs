//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum app that serves a built route table
//! - Wire up middleware (tracing, request ID, body limit, timeout)
//! - Reject paths outside the mount, percent-decode the rest
//! - Translate each HTTP request into a resolved routing request
//! - Serve until the shutdown signal fires

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, State},
    http::{HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json,
};
use percent_encoding::percent_decode_str;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::RouterConfig;
use crate::http::request::{effective_verb, request_params};
use crate::http::response::error_response;
use crate::lifecycle::shutdown::signalled;
use crate::routing::{RouteError, Router};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub router: Arc<Router>,
}

/// HTTP server exposing a route table.
pub struct HttpServer {
    app: axum::Router,
    config: RouterConfig,
}

impl HttpServer {
    /// Create a new HTTP server for an already built router.
    pub fn new(config: RouterConfig, router: Arc<Router>) -> Self {
        let state = AppState { router };
        let app = Self::build_app(&config, state);
        Self { app, config }
    }

    /// Build the Axum app with all middleware layers.
    #[allow(deprecated)]
    fn build_app(config: &RouterConfig, state: AppState) -> axum::Router {
        axum::Router::new()
            .fallback(api_handler)
            .with_state(state)
            .layer(DefaultBodyLimit::disable())
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                    .layer(TraceLayer::new_for_http())
                    .layer(PropagateRequestIdLayer::x_request_id())
                    .layer(RequestBodyLimitLayer::new(config.listener.max_body_size))
                    .layer(TimeoutLayer::new(Duration::from_secs(
                        config.timeouts.request_secs,
                    ))),
            )
    }

    /// The Axum app, for embedding into a larger service.
    pub fn app(&self) -> axum::Router {
        self.app.clone()
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.app)
            .with_graceful_shutdown(signalled(shutdown))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Catch-all handler: every request goes through the route table.
async fn api_handler(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let path = percent_decode_str(uri.path()).decode_utf8_lossy();
    if !state.router.is_mounted(&path) {
        tracing::debug!(method = %method, path = %path, "Request outside mount");
        return error_response(StatusCode::NOT_FOUND, "Not Found");
    }

    let verb = match effective_verb(&method, &headers) {
        Ok(verb) => verb,
        Err(e) => return RouteError::from(e).into_response(),
    };

    let params = match request_params(&headers, uri.query(), &body) {
        Ok(params) => params,
        Err(e) => return e.into_response(),
    };

    let request = state.router.resolve_request(verb, &path, params);

    tracing::debug!(
        method = %method,
        verb = %request.verb,
        path = %request.logical_path,
        params = request.params.len(),
        "Routing request"
    );

    match state.router.handle_resolved(&request) {
        Ok(value) => Json(value).into_response(),
        Err(e) => e.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::{HandlerType, MethodDef};
    use crate::routing::RouterBuilder;
    use axum::body::Body;
    use axum::http::Request;
    use serde_json::json;
    use tower::ServiceExt;

    fn server() -> HttpServer {
        let items = HandlerType::new("Items").method(
            MethodDef::public("getWidget", |args| Ok(json!({"id": args[0]}))).param("id"),
        );
        let router = RouterBuilder::default().handler(&items, None).build();
        HttpServer::new(RouterConfig::default(), Arc::new(router))
    }

    #[tokio::test]
    async fn test_routes_through_table() {
        let response = server()
            .app()
            .oneshot(
                Request::builder()
                    .uri("/api/items/widget/:id.json?action=getWidget&id=12")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
        let bytes = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(value, json!({"id": "12"}));
    }

    #[tokio::test]
    async fn test_missing_action_is_not_found() {
        let response = server()
            .app()
            .oneshot(
                Request::builder()
                    .uri("/api/items/widget")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_oversized_body_rejected() {
        let mut config = RouterConfig::default();
        config.listener.max_body_size = 16;
        let router = RouterBuilder::default().build();
        let response = HttpServer::new(config, Arc::new(router))
            .app()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/items/item?action=postItem")
                    .header("content-type", "application/json")
                    .header("content-length", "40")
                    .body(Body::from(format!("{{\"name\": \"{}\"}}", "x".repeat(28))))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn test_paths_outside_mount_are_not_found() {
        for uri in ["/items/widget?action=getWidget&id=1", "/apiary/items/widget?action=getWidget"] {
            let response = server()
                .app()
                .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::NOT_FOUND, "{uri}");
        }
    }

    #[tokio::test]
    async fn test_percent_encoded_path_is_decoded() {
        let response = server()
            .app()
            .oneshot(
                Request::builder()
                    .uri("/api/items/widget/%3Aid?action=getWidget&id=5")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(value, json!({"id": "5"}));
    }

    #[tokio::test]
    async fn test_unsupported_verb() {
        let response = server()
            .app()
            .oneshot(
                Request::builder()
                    .method("PATCH")
                    .uri("/api/items/widget?action=getWidget")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }
}
