//! Handler declarations.
//!
//! A handler type is described as data: a name, a type-level annotation
//! block, and a list of methods. Each method carries its own annotation
//! block, its ordered parameters (with optional defaults), and an
//! [`Invocable`] adapter that receives positional arguments.
//!
//! # Data Flow
//! ```text
//! HandlerType::new("Items")
//!     .doc(...)                    (type-level tags)
//!     .method(MethodDef::public("getWidget", adapter).param("id"))
//!     → routing::compiler (route table entries)
//!     → routing::dispatcher (bound positional arguments)
//!     → Invocable::call(&[Value])
//! ```

pub mod invoke;
pub mod types;

pub use invoke::{argument, Invocable, InvokeError};
pub use types::{HandlerType, MethodDef, ParamDef, Visibility};
