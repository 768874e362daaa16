//! Annotation metadata subsystem.
//!
//! # Data Flow
//! ```text
//! type-level doc block ─┐
//!                       ├→ parser.rs (tag extraction)
//! method doc block ─────┘
//!     → Metadata (ordered tag map)
//!     → merged: method tags override type tags
//!     → stored on every CallDescriptor
//! ```
//!
//! # Design Decisions
//! - Parsing never fails; unrecognized lines are ignored
//! - Tag order follows first appearance in the block
//! - Repeated tags accumulate instead of replacing

pub mod parser;

pub use parser::{Metadata, TagValue};
