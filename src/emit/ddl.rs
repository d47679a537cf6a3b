//! PostgreSQL table definitions for the configured tables.
//!
//! Output is deliberately minimal: no keys, indexes, constraints or
//! sequences. Only configured columns are emitted; relationship tables get
//! `from_id` and `to_id` as INTEGER ahead of them.

use crate::relational::{SchemaPlan, TableKind};
use once_cell::sync::Lazy;
use regex::Regex;

static TABLE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)CREATE TABLE (\S+) \(\n(.*?)\n\);").unwrap()
});

static COLUMN_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\t(\S+)\t\t(.+?),?$").unwrap()
});

/// A table definition read back from DDL text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableDefinition {
    pub name: String,
    /// `(column name, storage type)` in declaration order.
    pub columns: Vec<(String, String)>,
}

/// Every `CREATE TABLE` statement, entity tables first, separated by a blank line.
pub fn table_definitions(plan: &SchemaPlan) -> String {
    plan.tables()
        .iter()
        .map(|table| {
            let mut columns = Vec::new();
            if table.kind == TableKind::Relationship {
                columns.push(column_line("from_id", "INTEGER"));
                columns.push(column_line("to_id", "INTEGER"));
            }
            columns.extend(
                table
                    .columns
                    .iter()
                    .map(|c| column_line(&c.name, c.dtype.storage_type())),
            );
            format!("CREATE TABLE {} (\n{}\n);", table.table_name, columns.join(",\n"))
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn column_line(name: &str, storage_type: &str) -> String {
    format!("\t{}\t\t{}", name, storage_type)
}

/// Parse text produced by [`table_definitions`] back into its structure.
pub fn parse_table_definitions(text: &str) -> Vec<TableDefinition> {
    TABLE_REGEX
        .captures_iter(text)
        .map(|caps| TableDefinition {
            name: caps[1].to_string(),
            columns: caps[2]
                .lines()
                .filter_map(|line| COLUMN_REGEX.captures(line))
                .map(|c| (c[1].to_string(), c[2].to_string()))
                .collect(),
        })
        .collect()
}
