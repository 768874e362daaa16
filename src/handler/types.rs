//! Handler type and method declarations.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::handler::invoke::{Invocable, InvokeError};

/// Declared visibility of a handler method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    Public,
    Protected,
    /// Never considered for routing.
    Private,
}

/// One declared parameter of a handler method.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamDef {
    pub name: String,
    pub default: Option<Value>,
}

impl ParamDef {
    pub fn required(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            default: None,
        }
    }

    pub fn optional(name: impl Into<String>, default: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            default: Some(default.into()),
        }
    }
}

/// A handler method: annotations, parameters, and the adapter that runs it.
#[derive(Clone)]
pub struct MethodDef {
    name: String,
    visibility: Visibility,
    doc: String,
    params: Vec<ParamDef>,
    invoker: Arc<dyn Invocable>,
}

impl MethodDef {
    /// Declare a method backed by any [`Invocable`].
    pub fn with_invoker(
        name: impl Into<String>,
        visibility: Visibility,
        invoker: Arc<dyn Invocable>,
    ) -> Self {
        Self {
            name: name.into(),
            visibility,
            doc: String::new(),
            params: Vec::new(),
            invoker,
        }
    }

    /// Declare a method backed by a closure.
    pub fn new<F>(name: impl Into<String>, visibility: Visibility, f: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value, InvokeError> + Send + Sync + 'static,
    {
        Self::with_invoker(name, visibility, Arc::new(f))
    }

    pub fn public<F>(name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value, InvokeError> + Send + Sync + 'static,
    {
        Self::new(name, Visibility::Public, f)
    }

    pub fn protected<F>(name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value, InvokeError> + Send + Sync + 'static,
    {
        Self::new(name, Visibility::Protected, f)
    }

    pub fn private<F>(name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value, InvokeError> + Send + Sync + 'static,
    {
        Self::new(name, Visibility::Private, f)
    }

    /// Attach the method's annotation block.
    pub fn doc(mut self, block: impl Into<String>) -> Self {
        self.doc = block.into();
        self
    }

    /// Append a required parameter.
    pub fn param(mut self, name: impl Into<String>) -> Self {
        self.params.push(ParamDef::required(name));
        self
    }

    /// Append a parameter with a declared default.
    pub fn param_with_default(mut self, name: impl Into<String>, default: impl Into<Value>) -> Self {
        self.params.push(ParamDef::optional(name, default));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    pub fn doc_block(&self) -> &str {
        &self.doc
    }

    pub fn params(&self) -> &[ParamDef] {
        &self.params
    }

    pub fn invoker(&self) -> Arc<dyn Invocable> {
        Arc::clone(&self.invoker)
    }
}

impl fmt::Debug for MethodDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodDef")
            .field("name", &self.name)
            .field("visibility", &self.visibility)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

/// A unit whose methods are exposed as endpoints.
#[derive(Debug, Clone)]
pub struct HandlerType {
    name: String,
    doc: String,
    methods: Vec<MethodDef>,
}

impl HandlerType {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            doc: String::new(),
            methods: Vec::new(),
        }
    }

    /// Attach the type-level annotation block.
    pub fn doc(mut self, block: impl Into<String>) -> Self {
        self.doc = block.into();
        self
    }

    /// Append a method. Declaration order is registration order.
    pub fn method(mut self, method: MethodDef) -> Self {
        self.methods.push(method);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn doc_block(&self) -> &str {
        &self.doc
    }

    pub fn methods(&self) -> &[MethodDef] {
        &self.methods
    }
}
