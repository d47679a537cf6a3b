//! Declarative mapping from graph labels to relational tables.
//!
//! A mapping lists entity tables (routed by a node's label set) and
//! relationship tables (routed by an edge's label), each with the
//! columns to project from element properties.

pub mod types;
pub mod validate;

pub use types::{ColumnSpec, DType, EntityTableSpec, MappingConfig, RelationshipTableSpec};
pub use validate::MappingValidator;
