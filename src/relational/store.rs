//! The in-memory relational store: one header and row list per table.

use crate::error::StoreError;
use serde::Serialize;
use serde_json::{json, Map, Value};
use std::collections::HashMap;

/// One field of a row.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    Null,
    Integer(i64),
    Float(f64),
    Text(String),
    List(Vec<Value>),
}

impl Cell {
    /// Render for a flat text file. Null is the empty field; lists use
    /// the PostgreSQL array literal so they load into `TEXT ARRAY`.
    pub fn to_field(&self) -> String {
        match self {
            Cell::Null => String::new(),
            Cell::Integer(i) => i.to_string(),
            Cell::Float(f) => f.to_string(),
            Cell::Text(s) => s.clone(),
            Cell::List(items) => {
                let quoted: Vec<String> = items
                    .iter()
                    .map(|item| {
                        let text = match item {
                            Value::String(s) => s.clone(),
                            other => other.to_string(),
                        };
                        format!("\"{}\"", text.replace('\\', "\\\\").replace('"', "\\\""))
                    })
                    .collect();
                format!("{{{}}}", quoted.join(","))
            }
        }
    }
}

pub type Row = Vec<Cell>;

/// A table: fixed header and rows in insertion order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RelationalTable {
    #[serde(skip)]
    pub name: String,
    pub header: Vec<String>,
    pub rows: Vec<Row>,
}

impl RelationalTable {
    pub fn new(name: impl Into<String>, header: Vec<String>) -> Self {
        RelationalTable {
            name: name.into(),
            header,
            rows: Vec::new(),
        }
    }

    pub fn arity(&self) -> usize {
        self.header.len()
    }

    pub(crate) fn push(&mut self, row: Row) -> Result<(), StoreError> {
        if row.len() != self.arity() {
            return Err(StoreError::Arity {
                table: self.name.clone(),
                expected: self.arity(),
                found: row.len(),
            });
        }
        self.rows.push(row);
        Ok(())
    }
}

/// All configured tables. Tables are created once, in configuration order,
/// and only ever appended to. Built by
/// [`SchemaPlan::new_store`](crate::relational::SchemaPlan::new_store).
#[derive(Debug, Clone, PartialEq)]
pub struct RelationalStore {
    tables: Vec<RelationalTable>,
    by_name: HashMap<String, usize>,
}

impl RelationalStore {
    pub(crate) fn with_tables(tables: Vec<RelationalTable>) -> Self {
        let by_name = tables
            .iter()
            .enumerate()
            .map(|(i, t)| (t.name.clone(), i))
            .collect();
        RelationalStore { tables, by_name }
    }

    pub fn table(&self, name: &str) -> Option<&RelationalTable> {
        self.by_name.get(name).map(|&i| &self.tables[i])
    }

    /// Tables in configuration order.
    pub fn tables(&self) -> impl Iterator<Item = &RelationalTable> {
        self.tables.iter()
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    pub fn total_rows(&self) -> usize {
        self.tables.iter().map(|t| t.rows.len()).sum()
    }

    /// Append to the table named `table`.
    pub(crate) fn append(&mut self, table: &str, row: Row) -> Result<(), StoreError> {
        let slot = *self
            .by_name
            .get(table)
            .ok_or_else(|| StoreError::UnknownTable(table.to_string()))?;
        self.tables[slot].push(row)
    }

    /// `{table_name: {"header": [...], "rows": [[...], ...]}}`
    pub fn to_json(&self) -> Value {
        let mut out = Map::new();
        for table in &self.tables {
            out.insert(
                table.name.clone(),
                json!({"header": table.header, "rows": table.rows}),
            );
        }
        Value::Object(out)
    }
}
