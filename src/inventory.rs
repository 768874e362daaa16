//! Sample handler types served by the `endpoint-router` binary.
//!
//! An in-memory item store exposed through convention-derived routes, one
//! explicit `@url` route, and a hidden helper that never gets a route.

use std::sync::{Arc, Mutex, MutexGuard};

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{json, Value};

use endpoint_router::handler::{argument, HandlerType, InvokeError, MethodDef};

#[derive(Debug, Clone, Serialize)]
struct Item {
    id: u64,
    name: String,
    qty: u64,
}

#[derive(Debug, Default)]
struct Store {
    next_id: u64,
    items: IndexMap<u64, Item>,
}

type SharedStore = Arc<Mutex<Store>>;

fn lock(store: &SharedStore) -> Result<MutexGuard<'_, Store>, InvokeError> {
    store
        .lock()
        .map_err(|_| InvokeError::Failed("item store lock poisoned".into()))
}

fn not_found(id: u64) -> InvokeError {
    InvokeError::Failed(format!("item {} does not exist", id))
}

/// Handler types registered by `serve`, `routes` and `resolve`, with their
/// base paths (`None` registers under the lower-cased type name).
pub fn handlers() -> Vec<(HandlerType, Option<&'static str>)> {
    let store = SharedStore::default();
    vec![(items(store.clone()), None), (status(store), Some("status"))]
}

fn items(store: SharedStore) -> HandlerType {
    let list = store.clone();
    let get = store.clone();
    let post = store.clone();
    let put = store.clone();
    let delete = store.clone();
    let bulk = store;

    HandlerType::new("Items")
        .doc("/** Inventory items. */")
        .method(MethodDef::public("index", move |_| {
            let store = lock(&list)?;
            Ok(json!(store.items.values().collect::<Vec<_>>()))
        }))
        .method(
            MethodDef::public("getItem", move |args| {
                let id: u64 = argument(args, 0, "id")?;
                let store = lock(&get)?;
                let item = store.items.get(&id).ok_or_else(|| not_found(id))?;
                Ok(json!(item))
            })
            .param("id"),
        )
        .method(
            MethodDef::public("postItem", move |args| {
                let name: String = argument(args, 0, "name")?;
                let qty: u64 = argument(args, 1, "qty")?;
                let mut store = lock(&post)?;
                store.next_id += 1;
                let item = Item {
                    id: store.next_id,
                    name,
                    qty,
                };
                store.items.insert(item.id, item.clone());
                tracing::debug!(id = item.id, "Item created");
                Ok(json!(item))
            })
            .param("name")
            .param_with_default("qty", 1),
        )
        .method(
            MethodDef::public("putItem", move |args| {
                let id: u64 = argument(args, 0, "id")?;
                let qty: u64 = argument(args, 1, "qty")?;
                let mut store = lock(&put)?;
                let item = store.items.get_mut(&id).ok_or_else(|| not_found(id))?;
                item.qty = qty;
                Ok(json!(item))
            })
            .param("id")
            .param("qty"),
        )
        .method(
            MethodDef::public("deleteItem", move |args| {
                let id: u64 = argument(args, 0, "id")?;
                let mut store = lock(&delete)?;
                let item = store.items.shift_remove(&id).ok_or_else(|| not_found(id))?;
                Ok(json!(item))
            })
            .param("id"),
        )
        .method(
            MethodDef::public("bulkImport", move |args| {
                let data = args.first().cloned().unwrap_or(Value::Null);
                let names = data
                    .get("names")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .split(',')
                    .map(str::trim)
                    .filter(|n| !n.is_empty())
                    .map(str::to_string)
                    .collect::<Vec<_>>();

                let mut store = lock(&bulk)?;
                for name in &names {
                    store.next_id += 1;
                    let id = store.next_id;
                    store.items.insert(id, Item { id, name: name.clone(), qty: 1 });
                }
                Ok(json!({ "imported": names.len() }))
            })
            .doc("/**\n * Create one item per comma-separated name.\n * @url POST /items/import\n */")
            .param("request_data"),
        )
        .method(MethodDef::public("_describe", |_| Ok(json!("items"))))
}

fn status(store: SharedStore) -> HandlerType {
    let audit = store.clone();

    HandlerType::new("Status")
        .method(MethodDef::public("ping", |_| Ok(json!("pong"))))
        .method(
            MethodDef::protected("audit", move |_| {
                let store = lock(&audit)?;
                Ok(json!({ "items": store.items.len(), "next_id": store.next_id }))
            })
            .doc("/** @protected */"),
        )
        .method(MethodDef::protected("reset", move |_| {
            let mut store = lock(&store)?;
            *store = Store::default();
            Ok(json!("reset"))
        }))
}
