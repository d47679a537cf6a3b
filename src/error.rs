//! Error types for the graph-to-relational pipeline.
//!
//! - [`ConfigSchemaError`] - the mapping configuration is malformed
//! - [`RecordSchemaError`] - an input record is malformed
//! - [`CoercionError`] - a property value does not fit its column type
//! - [`StoreError`] - a row does not fit the store it is appended to
//! - [`TransformError`] - top-level error returned by the session
//!
//! Conversion into [`TransformError`] is automatic via `From`, so `?`
//! works across stage boundaries.

use thiserror::Error;

/// The mapping configuration failed structural or semantic validation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigSchemaError {
    /// A field is missing or has the wrong shape.
    #[error("invalid mapping at `{path}`: expected {expected}")]
    Shape { path: String, expected: String },

    /// A column declares a dtype outside the fixed enumeration.
    #[error("unknown dtype `{dtype}` at `{path}`")]
    UnknownDtype { path: String, dtype: String },

    /// Two tables share a name.
    #[error("duplicate table name `{0}`")]
    DuplicateTable(String),

    /// Two columns of one table share a name.
    #[error("duplicate column `{column}` in table `{table}`")]
    DuplicateColumn { table: String, column: String },

    /// Two tables of the same kind are routed by the same key.
    #[error("routing key {key} is claimed by both `{first}` and `{second}`")]
    DuplicateRoute {
        key: String,
        first: String,
        second: String,
    },

    /// The mapping text could not be decoded at all.
    #[error("failed to decode mapping: {0}")]
    Decode(String),
}

impl ConfigSchemaError {
    pub(crate) fn shape(path: impl Into<String>, expected: impl Into<String>) -> Self {
        ConfigSchemaError::Shape {
            path: path.into(),
            expected: expected.into(),
        }
    }
}

/// An input record failed structural validation.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("invalid record on line {line} at `{path}`: expected {expected}")]
pub struct RecordSchemaError {
    /// 1-based position of the record in the input stream.
    pub line: usize,
    pub path: String,
    pub expected: String,
}

/// A property value could not be converted to its column's storage type.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("cannot coerce {value} to {dtype}")]
pub struct CoercionError {
    pub dtype: &'static str,
    pub value: String,
}

/// A row was appended to a store not built from the routing plan.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StoreError {
    #[error("store has no table `{0}`")]
    UnknownTable(String),

    #[error("row of {found} fields does not fit table `{table}` with {expected} columns")]
    Arity {
        table: String,
        expected: usize,
        found: usize,
    },
}

/// Top-level pipeline error.
#[derive(Debug, Error)]
pub enum TransformError {
    #[error(transparent)]
    Config(#[from] ConfigSchemaError),

    #[error(transparent)]
    Record(#[from] RecordSchemaError),

    #[error(transparent)]
    Coercion(#[from] CoercionError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("failed to decode line {line}: {message}")]
    Decode { line: usize, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

pub type Result<T, E = TransformError> = std::result::Result<T, E>;
