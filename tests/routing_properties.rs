//! Route table behavior through the public API.

use std::sync::Arc;

use serde_json::json;

use endpoint_router::handler::{HandlerType, MethodDef};
use endpoint_router::routing::{
    NoRouteReason, RequestParams, RouteCompiler, RouteError, RouteOrigin, RouterBuilder, Verb,
};

mod common;

#[test]
fn test_convention_methods_register_one_plus_arity() {
    let handler = common::items();
    let routes = RouteCompiler::default().compile(&handler, "items");

    for (method, expected) in [("getWidget", 2), ("postItem", 3), ("index", 1), ("search", 2)] {
        let count = routes
            .iter()
            .filter(|r| r.call.method_name == method)
            .count();
        assert_eq!(count, expected, "{method}");
    }
}

#[test]
fn test_verb_prefix_is_stripped_and_entries_share_descriptor() {
    let router = common::router();
    let table = router.table();

    let bare = table.get(Verb::Get, "items/widget").unwrap();
    let with_id = table.get(Verb::Get, "items/widget/:id").unwrap();
    assert!(Arc::ptr_eq(bare, with_id));
    assert_eq!(bare.method_name, "getWidget");
    assert!(table.get(Verb::Get, "items/getwidget").is_none());
}

#[test]
fn test_unprefixed_method_defaults_to_get() {
    let handler = HandlerType::new("Items")
        .method(MethodDef::public("widget", |_| Ok(json!(null))).param("id"));
    let router = RouterBuilder::default().handler(&handler, None).build();

    assert!(router.table().get(Verb::Get, "items/widget").is_some());
    assert!(router.table().get(Verb::Get, "items/widget/:id").is_some());
}

#[test]
fn test_resolve_is_idempotent_and_drops_query() {
    let router = common::router();
    for raw in [
        "http://localhost/api/items/widget/:id.json?action=getWidget&id=1",
        "/api/items/widget/",
        "/api/items?x=1",
        "items/widget.json",
    ] {
        let once = router.resolve(raw);
        assert!(!once.contains('?'), "{raw} -> {once}");
        assert_eq!(router.resolve(&once), once, "{raw}");
    }
    assert_eq!(
        router.resolve("http://localhost/api/items/widget/:id.json?action=getWidget"),
        "items/widget/:id"
    );
}

#[test]
fn test_dispatch_requires_action() {
    let router = common::router();

    let err = router
        .dispatch(Verb::Get, "items/widget", &RequestParams::new().with("id", 3))
        .unwrap_err();
    assert!(matches!(
        err,
        RouteError::NoRoute { reason: NoRouteReason::ActionMismatch, .. }
    ));

    let err = router
        .dispatch(
            Verb::Get,
            "items/widget",
            &RequestParams::new().with("action", "postItem"),
        )
        .unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn test_defaults_fill_missing_arguments() {
    let router = common::router();
    let params = RequestParams::new()
        .with("action", "postItem")
        .with("name", "pen");

    let bound = router.dispatch(Verb::Post, "items/item", &params).unwrap();
    assert_eq!(bound.arguments, vec![Some(json!("pen")), Some(json!(1))]);
    assert_eq!(bound.invoke().unwrap(), json!(["pen", 1]));
}

#[test]
fn test_catch_all_receives_whole_request() {
    let router = common::router();
    let params = RequestParams::new()
        .with("action", "search")
        .with("term", "pen")
        .with("limit", "5");

    let value = router
        .handle(Verb::Get, "/api/items/search", params)
        .unwrap();
    assert_eq!(value["term"], json!("pen"));
    assert_eq!(value["all"]["limit"], json!("5"));
    assert_eq!(value["all"]["action"], json!("search"));
}

#[test]
fn test_explicit_route_replaces_convention() {
    let handler = common::items();
    let routes = RouteCompiler::default().compile(&handler, "items");

    let custom: Vec<_> = routes
        .iter()
        .filter(|r| r.call.method_name == "custom")
        .collect();
    assert_eq!(custom.len(), 1);
    assert_eq!(custom[0].verb, Verb::Post);
    assert_eq!(custom[0].path, "custom/path");
    assert_eq!(custom[0].origin, RouteOrigin::Explicit);
}

#[test]
fn test_hidden_methods_have_no_routes() {
    let router = common::router();
    assert!(router
        .routes()
        .iter()
        .all(|entry| entry.method != "_internal"));
}

#[test]
fn test_protected_methods_are_flagged() {
    let router = common::router();

    let audit = router
        .handle(Verb::Get, "/api/items/audit", RequestParams::new().with("action", "audit"))
        .unwrap();
    assert_eq!(audit, json!("audited"));

    let err = router
        .handle(Verb::Get, "/api/items/purge", RequestParams::new().with("action", "purge"))
        .unwrap_err();
    assert!(matches!(err, RouteError::NotExposed { .. }));
}
