//! Structural validation of the mapping document.
//!
//! Runs once before any record is read. Only the shape is checked here;
//! dtype names are resolved when the schema plan is built.

use crate::error::ConfigSchemaError;
use crate::mapping::types::MappingConfig;
use crate::shape::{self, ShapeError, ShapeResult};
use serde_json::{Map, Value};

const ROOT_KEYS: &[&str] = &["entity_tables", "relationship_tables"];
const ENTITY_KEYS: &[&str] = &["map_node_label", "table_name", "pkey", "columns"];
const RELATIONSHIP_KEYS: &[&str] = &[
    "map_edge_label",
    "table_name",
    "pkey",
    "map_from_node_label",
    "map_to_node_label",
    "columns",
];

impl From<ShapeError> for ConfigSchemaError {
    fn from(err: ShapeError) -> Self {
        ConfigSchemaError::shape(err.path, err.expected)
    }
}

/// Checks and loads mapping documents.
#[derive(Debug, Clone)]
pub struct MappingValidator {
    /// Reject keys the mapping format does not define.
    strict_keys: bool,
}

impl Default for MappingValidator {
    fn default() -> Self {
        MappingValidator { strict_keys: true }
    }
}

impl MappingValidator {
    pub fn new(strict_keys: bool) -> Self {
        MappingValidator { strict_keys }
    }

    /// Decode mapping text (YAML or JSON), validate it and load it.
    pub fn load_text(&self, text: &str) -> Result<MappingConfig, ConfigSchemaError> {
        let value: Value =
            serde_yaml::from_str(text).map_err(|e| ConfigSchemaError::Decode(e.to_string()))?;
        self.load(value)
    }

    /// Validate an already-decoded mapping and load it.
    pub fn load(&self, value: Value) -> Result<MappingConfig, ConfigSchemaError> {
        self.validate(&value)?;
        serde_json::from_value(value).map_err(|e| ConfigSchemaError::Decode(e.to_string()))
    }

    pub fn validate(&self, value: &Value) -> Result<(), ConfigSchemaError> {
        let root = shape::object(value, "")?;
        self.check_keys(root, "", ROOT_KEYS)?;

        let entities = shape::array(shape::required(root, "", "entity_tables")?, "entity_tables")?;
        for (i, table) in entities.iter().enumerate() {
            self.validate_entity_table(table, &shape::index("entity_tables", i))?;
        }

        let relationships = shape::array(
            shape::required(root, "", "relationship_tables")?,
            "relationship_tables",
        )?;
        for (i, table) in relationships.iter().enumerate() {
            self.validate_relationship_table(table, &shape::index("relationship_tables", i))?;
        }

        Ok(())
    }

    fn validate_entity_table(&self, value: &Value, path: &str) -> ShapeResult<()> {
        let table = shape::object(value, path)?;
        self.check_keys(table, path, ENTITY_KEYS)?;

        shape::string_list(
            shape::required(table, path, "map_node_label")?,
            &shape::field(path, "map_node_label"),
        )?;
        shape::identifier(
            shape::required(table, path, "table_name")?,
            &shape::field(path, "table_name"),
        )?;
        validate_pkey(table, path)?;

        let columns_path = shape::field(path, "columns");
        let columns = shape::array(shape::required(table, path, "columns")?, &columns_path)?;
        for (i, column) in columns.iter().enumerate() {
            self.validate_column(column, &shape::index(&columns_path, i), "map_node_property")?;
        }
        Ok(())
    }

    fn validate_relationship_table(&self, value: &Value, path: &str) -> ShapeResult<()> {
        let table = shape::object(value, path)?;
        self.check_keys(table, path, RELATIONSHIP_KEYS)?;

        shape::string(
            shape::required(table, path, "map_edge_label")?,
            &shape::field(path, "map_edge_label"),
        )?;
        shape::identifier(
            shape::required(table, path, "table_name")?,
            &shape::field(path, "table_name"),
        )?;
        for key in ["map_from_node_label", "map_to_node_label"] {
            shape::string_list(shape::required(table, path, key)?, &shape::field(path, key))?;
        }
        validate_pkey(table, path)?;

        // columns are optional on relationship tables
        if let Some(columns) = table.get("columns") {
            let columns_path = shape::field(path, "columns");
            for (i, column) in shape::array(columns, &columns_path)?.iter().enumerate() {
                self.validate_column(column, &shape::index(&columns_path, i), "map_edge_property")?;
            }
        }
        Ok(())
    }

    /// `property_key` is the table-kind specific spelling of `source_property`.
    fn validate_column(&self, value: &Value, path: &str, property_key: &str) -> ShapeResult<()> {
        let column = shape::object(value, path)?;
        self.check_keys(column, path, &["name", "dtype", property_key, "source_property"])?;

        shape::identifier(shape::required(column, path, "name")?, &shape::field(path, "name"))?;
        shape::string(shape::required(column, path, "dtype")?, &shape::field(path, "dtype"))?;

        match (column.get(property_key), column.get("source_property")) {
            (Some(v), None) => shape::string(v, &shape::field(path, property_key)).map(|_| ()),
            (None, Some(v)) => shape::string(v, &shape::field(path, "source_property")).map(|_| ()),
            (Some(_), Some(_)) => Err(ShapeError::new(
                path,
                format!("only one of `{}` or `source_property`", property_key),
            )),
            (None, None) => Err(ShapeError::new(
                &shape::field(path, property_key),
                "a value (missing key)",
            )),
        }
    }

    fn check_keys(&self, obj: &Map<String, Value>, path: &str, allowed: &[&str]) -> ShapeResult<()> {
        if self.strict_keys {
            shape::only_keys(obj, path, allowed)
        } else {
            Ok(())
        }
    }
}

fn validate_pkey(table: &Map<String, Value>, path: &str) -> ShapeResult<()> {
    match table.get("pkey") {
        None | Some(Value::String(_)) => Ok(()),
        Some(Value::Number(n)) if n.is_i64() || n.is_u64() => Ok(()),
        Some(_) => Err(ShapeError::new(&shape::field(path, "pkey"), "an integer or a string")),
    }
}
