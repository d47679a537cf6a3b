use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Column storage type, selected by the `dtype` string of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DType {
    Text,
    Integer,
    Float,
    List,
}

impl DType {
    /// Parse a configured dtype, accepting the short spellings too.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "text" | "string" | "str" => Some(DType::Text),
            "integer" | "int" => Some(DType::Integer),
            "float" => Some(DType::Float),
            "list" => Some(DType::List),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DType::Text => "text",
            DType::Integer => "integer",
            DType::Float => "float",
            DType::List => "list",
        }
    }

    /// Column type used in emitted table definitions.
    pub fn storage_type(self) -> &'static str {
        match self {
            DType::Text => "TEXT",
            DType::Integer => "INTEGER",
            DType::Float => "NUMERIC",
            DType::List => "TEXT ARRAY",
        }
    }
}

/// One projected column: `name` receives `properties[source_property]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub name: String,

    /// Raw dtype string; resolved to [`DType`] when the schema is built.
    pub dtype: String,

    #[serde(alias = "map_node_property", alias = "map_edge_property")]
    pub source_property: String,
}

/// A table fed by nodes whose label set equals `map_node_label`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityTableSpec {
    pub map_node_label: Vec<String>,
    pub table_name: String,

    /// Accepted for compatibility; keys are never emitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pkey: Option<Value>,

    pub columns: Vec<ColumnSpec>,
}

/// A table fed by relationships whose label equals `map_edge_label`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationshipTableSpec {
    pub map_edge_label: String,
    pub table_name: String,

    /// Endpoint label constraints. Carried but not checked against data.
    pub map_from_node_label: Vec<String>,
    pub map_to_node_label: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pkey: Option<Value>,

    #[serde(default)]
    pub columns: Vec<ColumnSpec>,
}

/// The whole mapping document. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappingConfig {
    pub entity_tables: Vec<EntityTableSpec>,
    pub relationship_tables: Vec<RelationshipTableSpec>,
}

impl MappingConfig {
    /// Table names in emission order: entity tables, then relationship tables.
    pub fn table_names(&self) -> impl Iterator<Item = &str> {
        self.entity_tables
            .iter()
            .map(|t| t.table_name.as_str())
            .chain(self.relationship_tables.iter().map(|t| t.table_name.as_str()))
    }
}
