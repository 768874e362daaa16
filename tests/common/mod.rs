//! Shared fixtures for integration tests.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Value};

use endpoint_router::config::RouterConfig;
use endpoint_router::handler::{argument, HandlerType, InvokeError, MethodDef};
use endpoint_router::http::HttpServer;
use endpoint_router::lifecycle::Shutdown;
use endpoint_router::routing::{Router, RouterBuilder};

/// `Items` handler used across tests.
///
/// - `getWidget(id)`: GET items/widget, items/widget/:id
/// - `postItem(name, qty = 1)`: POST items/item, items/item/:name, items/item/:name/:qty
/// - `index()`: GET items
/// - `search(term, request_data)`: GET items/search, items/search/:term
/// - `custom()`: explicit `POST custom/path`
/// - `_internal()`: no routes
/// - `audit()`: protected, exposed by tag
/// - `purge()`: protected, hidden
pub fn items() -> HandlerType {
    HandlerType::new("Items")
        .method(
            MethodDef::public("getWidget", |args| {
                let id: u64 = argument(args, 0, "id")?;
                Ok(json!({ "widget": id }))
            })
            .param("id"),
        )
        .method(
            MethodDef::public("postItem", |args| Ok(json!(args)))
                .param("name")
                .param_with_default("qty", 1),
        )
        .method(MethodDef::public("index", |_| Ok(json!(["pen", "cup"]))))
        .method(
            MethodDef::public("search", |args| {
                Ok(json!({ "term": args[0], "all": args[1] }))
            })
            .param("term")
            .param("request_data"),
        )
        .method(
            MethodDef::public("custom", |_| Ok(json!("custom")))
                .doc("/**\n * @url POST /custom/path\n */"),
        )
        .method(MethodDef::public("_internal", |_| Ok(Value::Null)))
        .method(MethodDef::protected("audit", |_| Ok(json!("audited"))).doc("/** @protected */"))
        .method(MethodDef::protected("purge", |_| Ok(json!("purged"))))
        .method(MethodDef::public("explode", |_| {
            Err(InvokeError::Failed("widget store offline".into()))
        }))
}

pub fn router() -> Router {
    RouterBuilder::default().handler(&items(), None).build()
}

/// Serve [`router`] on `addr` until the returned [`Shutdown`] is triggered.
#[allow(dead_code)]
pub async fn start_server(addr: SocketAddr) -> Shutdown {
    let mut config = RouterConfig::default();
    config.listener.bind_address = addr.to_string();

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config, Arc::new(router()));
    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    tokio::time::sleep(Duration::from_millis(100)).await;
    shutdown
}

#[allow(dead_code)]
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
