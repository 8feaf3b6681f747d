//! Schema model for jsonsmith.
//!
//! This crate defines the value node tree that describes generated JSON,
//! decodes it from YAML schema documents, and validates cross-references
//! between string nodes and declared corpus files.

pub mod decode;
pub mod error;
pub mod path;
pub mod range;
pub mod schema;
pub mod types;
pub mod validation;

pub use error::{Result, SchemaError};
pub use path::{NodePath, PathSegment};
pub use range::{FloatRange, IntRange, Length, RangeError};
pub use schema::Schema;
pub use types::{
    ArrayNode, EnumNode, FloatNode, IntegerNode, Node, NodeError, ObjectNode, StringNode,
};
pub use validation::{IssueSeverity, ValidationIssue, ValidationReport, Walk, walk};
