//! Schema plan compiled from a mapping configuration.
//!
//! All routing and column decisions are made here, once, so projecting a
//! record is a hash lookup followed by a fixed walk over its column plan.

use crate::error::ConfigSchemaError;
use crate::mapping::{ColumnSpec, DType, MappingConfig};
use crate::relational::store::{RelationalStore, RelationalTable};
use crate::shape;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;

/// Order-independent set of labels, usable as a map key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct LabelSet(BTreeSet<String>);

impl LabelSet {
    pub fn new<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        LabelSet(labels.into_iter().map(Into::into).collect())
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl fmt::Display for LabelSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}}}", self.iter().collect::<Vec<_>>().join(", "))
    }
}

/// Value derived from a record's labels that selects its table.
///
/// Node keys match by set equality: a node carrying extra labels does not
/// match a table configured for a subset of them.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RoutingKey {
    Labels(LabelSet),
    Edge(String),
}

impl fmt::Display for RoutingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoutingKey::Labels(labels) => write!(f, "{}", labels),
            RoutingKey::Edge(label) => write!(f, "\"{}\"", label),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableKind {
    Entity,
    Relationship,
}

/// How one column is filled.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnPlan {
    pub name: String,
    pub source_property: String,
    pub dtype: DType,
}

/// Everything needed to fill one table.
#[derive(Debug, Clone, PartialEq)]
pub struct TablePlan {
    pub table_name: String,
    pub kind: TableKind,
    pub columns: Vec<ColumnPlan>,
}

impl TablePlan {
    /// Column names in row order, starting with the fixed identifier columns.
    pub fn header(&self) -> Vec<String> {
        let fixed: &[&str] = match self.kind {
            TableKind::Entity => &["id"],
            TableKind::Relationship => &["id", "from_id", "to_id"],
        };
        fixed
            .iter()
            .map(|s| s.to_string())
            .chain(self.columns.iter().map(|c| c.name.clone()))
            .collect()
    }
}

/// Compiled routing and column plan for a mapping.
#[derive(Debug, Clone)]
pub struct SchemaPlan {
    tables: Vec<TablePlan>,
    routes: HashMap<RoutingKey, usize>,
}

impl SchemaPlan {
    /// Compile `mapping`. Unknown dtypes, names that are not identifiers,
    /// duplicate table or column names and ambiguous routing keys are
    /// rejected here, before any data is read.
    pub fn build(mapping: &MappingConfig) -> Result<Self, ConfigSchemaError> {
        let mut plan = SchemaPlan {
            tables: Vec::new(),
            routes: HashMap::new(),
        };

        for (i, table) in mapping.entity_tables.iter().enumerate() {
            let path = format!("entity_tables[{}]", i);
            check_identifier(&table.table_name, &format!("{}.table_name", path))?;
            let columns = column_plans(&table.table_name, &table.columns, &path)?;
            plan.add(
                RoutingKey::Labels(LabelSet::new(table.map_node_label.iter().cloned())),
                &table.table_name,
                TableKind::Entity,
                columns,
            )?;
        }

        for (i, table) in mapping.relationship_tables.iter().enumerate() {
            let path = format!("relationship_tables[{}]", i);
            check_identifier(&table.table_name, &format!("{}.table_name", path))?;
            let columns = column_plans(&table.table_name, &table.columns, &path)?;
            plan.add(
                RoutingKey::Edge(table.map_edge_label.clone()),
                &table.table_name,
                TableKind::Relationship,
                columns,
            )?;
        }

        log::debug!(
            "built schema plan with {} tables ({} routes)",
            plan.tables.len(),
            plan.routes.len()
        );
        Ok(plan)
    }

    fn add(
        &mut self,
        key: RoutingKey,
        table_name: &str,
        kind: TableKind,
        columns: Vec<ColumnPlan>,
    ) -> Result<(), ConfigSchemaError> {
        if self.tables.iter().any(|t| t.table_name == table_name) {
            return Err(ConfigSchemaError::DuplicateTable(table_name.to_string()));
        }
        if let Some(&existing) = self.routes.get(&key) {
            return Err(ConfigSchemaError::DuplicateRoute {
                key: key.to_string(),
                first: self.tables[existing].table_name.clone(),
                second: table_name.to_string(),
            });
        }

        self.routes.insert(key, self.tables.len());
        self.tables.push(TablePlan {
            table_name: table_name.to_string(),
            kind,
            columns,
        });
        Ok(())
    }

    /// Find the table a routing key maps to.
    pub fn route(&self, key: &RoutingKey) -> Option<&TablePlan> {
        self.routes.get(key).map(|&slot| &self.tables[slot])
    }

    /// Table plans in configuration order (entity tables first).
    pub fn tables(&self) -> &[TablePlan] {
        &self.tables
    }

    /// A fresh store holding one empty table per configured table.
    pub fn new_store(&self) -> RelationalStore {
        RelationalStore::with_tables(
            self.tables
                .iter()
                .map(|t| RelationalTable::new(t.table_name.clone(), t.header()))
                .collect(),
        )
    }
}

/// Table and column names end up unquoted in DDL and in file names.
fn check_identifier(name: &str, path: &str) -> Result<(), ConfigSchemaError> {
    if shape::is_identifier(name) {
        Ok(())
    } else {
        Err(ConfigSchemaError::shape(path, shape::IDENTIFIER_EXPECTATION))
    }
}

fn column_plans(
    table_name: &str,
    columns: &[ColumnSpec],
    path: &str,
) -> Result<Vec<ColumnPlan>, ConfigSchemaError> {
    let mut seen = HashSet::new();
    columns
        .iter()
        .enumerate()
        .map(|(i, column)| -> Result<ColumnPlan, ConfigSchemaError> {
            check_identifier(&column.name, &format!("{}.columns[{}].name", path, i))?;
            let dtype = DType::parse(&column.dtype).ok_or_else(|| ConfigSchemaError::UnknownDtype {
                path: format!("{}.columns[{}].dtype", path, i),
                dtype: column.dtype.clone(),
            })?;
            if !seen.insert(column.name.as_str()) {
                return Err(ConfigSchemaError::DuplicateColumn {
                    table: table_name.to_string(),
                    column: column.name.clone(),
                });
            }
            Ok(ColumnPlan {
                name: column.name.clone(),
                source_property: column.source_property.clone(),
                dtype,
            })
        })
        .collect()
}
