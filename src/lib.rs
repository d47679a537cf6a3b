//! # graph-to-rdb - Property graph to relational tables
//!
//! Converts a stream of graph elements (nodes and relationships, as
//! exported one JSON object per line) into relational tables, driven by a
//! declarative mapping that routes label combinations to tables and
//! properties to columns.
//!
//! ## Modules
//!
//! - **mapping**: the mapping document and its validator
//! - **record**: input elements and their validator
//! - **relational**: schema plan, router and the in-memory store
//! - **emit**: table definitions and flat per-table output
//!
//! ## Quick Start
//!
//! ```rust
//! use graph_to_rdb::{Cell, TransformConfig, Transformer};
//! use serde_json::json;
//!
//! # fn main() -> anyhow::Result<()> {
//! let mapping = json!({
//!     "entity_tables": [{
//!         "map_node_label": ["Person"],
//!         "table_name": "person",
//!         "columns": [{"name": "name", "dtype": "text", "map_node_property": "name"}]
//!     }],
//!     "relationship_tables": [{
//!         "map_edge_label": "KNOWS",
//!         "table_name": "knows",
//!         "map_from_node_label": ["Person"],
//!         "map_to_node_label": ["Person"]
//!     }]
//! });
//!
//! let mut transformer = Transformer::from_mapping_value(mapping, TransformConfig::default())?;
//! transformer.ingest(vec![
//!     json!({"type": "node", "id": "1", "labels": ["Person"], "properties": {"name": "Ann"}}),
//! ])?;
//!
//! let person = transformer.store().table("person").unwrap();
//! assert_eq!(person.rows[0], vec![Cell::Integer(1), Cell::Text("Ann".into())]);
//! # Ok(())
//! # }
//! ```

use std::io::BufRead;

pub mod emit;
pub mod error;
pub mod mapping;
pub mod record;
pub mod relational;
pub mod transformer;
pub mod types;

mod shape;

// Re-export commonly used types for convenience
pub use error::{CoercionError, ConfigSchemaError, RecordSchemaError, Result, StoreError, TransformError};
pub use mapping::{ColumnSpec, DType, EntityTableSpec, MappingConfig, MappingValidator, RelationshipTableSpec};
pub use record::{GraphElement, RecordValidator};
pub use relational::{Cell, RelationalStore, RelationalTable, Router, SchemaPlan};
pub use transformer::{Transformer, CREATE_KEY};
pub use types::{TransformConfig, TransformStats};

/// Feed a JSON lines stream into `transformer`.
///
/// Lines are numbered from 1; blank lines are skipped but still counted.
pub fn transform_jsonl<R: BufRead>(reader: R, transformer: &mut Transformer) -> Result<()> {
    for (i, line) in reader.lines().enumerate() {
        let line_num = i + 1;
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let mut bytes = line.into_bytes();
        let value: serde_json::Value = simd_json::serde::from_slice(&mut bytes)
            .map_err(|e| TransformError::Decode {
                line: line_num,
                message: e.to_string(),
            })?;
        transformer.ingest_record(line_num, &value)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn transformer() -> Transformer {
        Transformer::from_mapping_value(
            json!({
                "entity_tables": [{
                    "map_node_label": ["Person"],
                    "table_name": "person",
                    "columns": []
                }],
                "relationship_tables": []
            }),
            TransformConfig::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_jsonl_line_numbers() {
        let input = concat!(
            r#"{"type": "node", "id": "1", "labels": ["Person"], "properties": {}}"#,
            "\n\n",
            r#"{"type": "node", "id": "2", "labels": ["Person"]}"#,
            "\n"
        );

        let mut transformer = transformer();
        let err = transform_jsonl(input.as_bytes(), &mut transformer).unwrap_err();
        match err {
            TransformError::Record(e) => assert_eq!(e.line, 3),
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(transformer.store().table("person").unwrap().rows.len(), 1);
    }

    #[test]
    fn test_jsonl_decode_error() {
        let mut transformer = transformer();
        let err = transform_jsonl("{not json\n".as_bytes(), &mut transformer).unwrap_err();
        assert!(matches!(err, TransformError::Decode { line: 1, .. }));
    }
}
