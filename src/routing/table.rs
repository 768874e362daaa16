//! Compiled route table.
//!
//! # Responsibilities
//! - Hold verb → path → call descriptor mappings
//! - Preserve registration order for deterministic iteration
//! - Resolve (verb, path) collisions by overwrite
//!
//! # Design Decisions
//! - Keys are exact strings, never patterns
//! - An overwritten key keeps its original position in iteration order
//! - Descriptors are shared via `Arc` across every path that references them

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

use crate::handler::Invocable;
use crate::metadata::Metadata;

/// HTTP verbs a route can be registered under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Verb {
    Get,
    Post,
    Put,
    Delete,
    Head,
    Options,
}

impl Verb {
    /// Every verb, in the order convention prefixes are tested.
    pub const ALL: [Verb; 6] = [
        Verb::Get,
        Verb::Post,
        Verb::Put,
        Verb::Delete,
        Verb::Head,
        Verb::Options,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Verb::Get => "GET",
            Verb::Post => "POST",
            Verb::Put => "PUT",
            Verb::Delete => "DELETE",
            Verb::Head => "HEAD",
            Verb::Options => "OPTIONS",
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string names no supported verb.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported HTTP verb `{0}`")]
pub struct UnknownVerb(pub String);

impl FromStr for Verb {
    type Err = UnknownVerb;

    /// Case-insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Verb::ALL
            .into_iter()
            .find(|verb| verb.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownVerb(s.to_string()))
    }
}

/// Access classification of a routed method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum MethodFlag {
    Public,
    /// Protected, but callable from outside.
    ProtectedExposed,
    /// Protected and not externally callable.
    ProtectedHidden,
}

impl MethodFlag {
    pub fn is_externally_callable(&self) -> bool {
        !matches!(self, MethodFlag::ProtectedHidden)
    }
}

/// Everything needed to bind and invoke one handler method.
#[derive(Clone)]
pub struct CallDescriptor {
    pub handler_type: String,
    pub method_name: String,
    /// Parameter names indexed by position.
    pub arguments: Vec<String>,
    /// Declared defaults indexed by position; `None` means no default.
    pub defaults: Vec<Option<Value>>,
    pub metadata: Metadata,
    pub flag: MethodFlag,
    pub invoker: Arc<dyn Invocable>,
}

impl CallDescriptor {
    /// Position of the parameter called `name`.
    pub fn position_of(&self, name: &str) -> Option<usize> {
        self.arguments.iter().position(|arg| arg == name)
    }

    pub fn arity(&self) -> usize {
        self.arguments.len()
    }
}

impl fmt::Debug for CallDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallDescriptor")
            .field("handler_type", &self.handler_type)
            .field("method_name", &self.method_name)
            .field("arguments", &self.arguments)
            .field("defaults", &self.defaults)
            .field("metadata", &self.metadata)
            .field("flag", &self.flag)
            .finish_non_exhaustive()
    }
}

/// One row of a route listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteEntry {
    pub verb: Verb,
    pub path: String,
    pub handler: String,
    pub method: String,
    pub flag: MethodFlag,
}

/// Verb → path → descriptor mapping.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: IndexMap<Verb, IndexMap<String, Arc<CallDescriptor>>>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a route, returning the descriptor it replaced, if any.
    pub fn insert(
        &mut self,
        verb: Verb,
        path: impl Into<String>,
        call: Arc<CallDescriptor>,
    ) -> Option<Arc<CallDescriptor>> {
        self.routes.entry(verb).or_default().insert(path.into(), call)
    }

    pub fn get(&self, verb: Verb, path: &str) -> Option<&Arc<CallDescriptor>> {
        self.routes.get(&verb).and_then(|paths| paths.get(path))
    }

    /// All routes under `verb`, in registration order.
    pub fn routes_for(&self, verb: Verb) -> Option<&IndexMap<String, Arc<CallDescriptor>>> {
        self.routes.get(&verb)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Verb, &str, &Arc<CallDescriptor>)> {
        self.routes.iter().flat_map(|(verb, paths)| {
            paths
                .iter()
                .map(move |(path, call)| (*verb, path.as_str(), call))
        })
    }

    pub fn len(&self) -> usize {
        self.routes.values().map(IndexMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Flat, serializable listing of every route.
    pub fn entries(&self) -> Vec<RouteEntry> {
        self.iter()
            .map(|(verb, path, call)| RouteEntry {
                verb,
                path: path.to_string(),
                handler: call.handler_type.clone(),
                method: call.method_name.clone(),
                flag: call.flag,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::InvokeError;

    fn descriptor(method: &str) -> Arc<CallDescriptor> {
        Arc::new(CallDescriptor {
            handler_type: "Items".into(),
            method_name: method.into(),
            arguments: vec!["id".into()],
            defaults: vec![None],
            metadata: Metadata::new(),
            flag: MethodFlag::Public,
            invoker: Arc::new(|_: &[Value]| -> Result<Value, InvokeError> { Ok(Value::Null) }),
        })
    }

    #[test]
    fn test_verb_parsing() {
        assert_eq!("get".parse::<Verb>(), Ok(Verb::Get));
        assert_eq!("Options".parse::<Verb>(), Ok(Verb::Options));
        assert_eq!("PATCH".parse::<Verb>(), Err(UnknownVerb("PATCH".into())));
        assert_eq!(Verb::Delete.to_string(), "DELETE");
    }

    #[test]
    fn test_overwrite_keeps_position() {
        let mut table = RouteTable::new();
        assert!(table.insert(Verb::Get, "items", descriptor("first")).is_none());
        table.insert(Verb::Get, "items/:id", descriptor("first"));

        let replaced = table.insert(Verb::Get, "items", descriptor("second"));
        assert_eq!(replaced.map(|c| c.method_name.clone()), Some("first".to_string()));

        let paths: Vec<&str> = table.iter().map(|(_, path, _)| path).collect();
        assert_eq!(paths, vec!["items", "items/:id"]);
        assert_eq!(table.get(Verb::Get, "items").unwrap().method_name, "second");
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_entries_listing() {
        let mut table = RouteTable::new();
        table.insert(Verb::Post, "items", descriptor("postItem"));
        let entries = table.entries();

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].verb, Verb::Post);
        assert_eq!(entries[0].method, "postItem");

        let json = serde_json::to_value(&entries).unwrap();
        assert_eq!(json[0]["verb"], "POST");
        assert_eq!(json[0]["flag"], "public");
    }

    #[test]
    fn test_flag_callability() {
        assert!(MethodFlag::Public.is_externally_callable());
        assert!(MethodFlag::ProtectedExposed.is_externally_callable());
        assert!(!MethodFlag::ProtectedHidden.is_externally_callable());
    }
}
