//! Document model for the editor: nodes, marks, type descriptors and the schema.
//!
//! Positions in a document use the flat integer scheme shared by every crate in
//! the workspace: the root's content starts at `0`, entering or leaving a
//! non-leaf node costs one position, text costs one position per character and
//! a leaf node costs exactly one position.

/// Attribute values and declarations.
pub mod attrs;
/// Content expression grammar and matcher.
pub mod content;
/// Styling marks attached to inline nodes.
pub mod mark;
/// The immutable document tree.
pub mod node;
/// Positions resolved against a document tree.
pub mod resolved;
/// Type descriptors and the compiled document schema.
pub mod schema;

pub use attrs::{AttrSpec, AttrValidator, Attrs, Value};
pub use content::{ContentExpr, ContentExprError};
pub use mark::Mark;
pub use node::{Node, fragment_size, normalize_fragment};
pub use resolved::{PositionError, ResolvedPos};
pub use schema::{
	DocumentSchema, MarkSpec, MarkType, NodeSpec, NodeType, SchemaBuilder, SchemaError,
	SchemaViolation,
};
