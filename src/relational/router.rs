//! Routing and projection of graph elements into table rows.
//!
//! The [`Router`] borrows a compiled [`SchemaPlan`] and turns each element
//! into at most one row of at most one table. Endpoints of a relationship
//! contribute only their ids; they are not looked up.

use crate::error::{CoercionError, TransformError};
use crate::mapping::DType;
use crate::record::{ElementKind, GraphElement};
use crate::relational::coerce::is_truthy;
use crate::relational::plan::{LabelSet, RoutingKey, SchemaPlan, TablePlan};
use crate::relational::store::{Cell, RelationalStore, Row};
use serde_json::Value;

/// What happened to one element.
#[derive(Debug, Clone, PartialEq)]
pub enum Routed {
    /// A row was appended to `table`.
    Inserted { table: String },
    /// No table is configured for `key`; nothing was appended.
    Unmapped {
        kind: ElementKind,
        id: String,
        key: RoutingKey,
    },
}

/// Projects elements using a pre-computed plan.
#[derive(Debug, Clone, Copy)]
pub struct Router<'a> {
    plan: &'a SchemaPlan,
}

impl<'a> Router<'a> {
    pub fn new(plan: &'a SchemaPlan) -> Self {
        Router { plan }
    }

    /// Label set for nodes, label string for relationships.
    pub fn routing_key(element: &GraphElement) -> RoutingKey {
        match element {
            GraphElement::Node(node) => RoutingKey::Labels(LabelSet::new(node.labels.iter().cloned())),
            GraphElement::Relationship(rel) => RoutingKey::Edge(rel.label.clone()),
        }
    }

    /// Build the row for `element` without touching any store.
    ///
    /// Returns `Ok(None)` when no table matches the element's routing key.
    pub fn project(&self, element: &GraphElement) -> Result<Option<(&'a TablePlan, Row)>, CoercionError> {
        let key = Self::routing_key(element);
        let Some(table) = self.plan.route(&key) else {
            return Ok(None);
        };

        let mut row = Vec::with_capacity(table.columns.len() + 3);
        row.push(coerce_id(element.id())?);
        if let GraphElement::Relationship(rel) = element {
            row.push(coerce_id(&rel.start.id)?);
            row.push(coerce_id(&rel.end.id)?);
        }

        for column in &table.columns {
            // a falsy property is treated exactly like a missing one
            let cell = match element.property(&column.source_property) {
                Some(value) if is_truthy(value) => column.dtype.coerce(value)?,
                _ => Cell::Null,
            };
            row.push(cell);
        }

        Ok(Some((table, row)))
    }

    /// Project `element` and append the row to its table in `store`.
    ///
    /// An unmatched element is logged and skipped; it is not an error.
    /// `store` must come from [`SchemaPlan::new_store`] on the same plan;
    /// a row that does not fit it fails with [`TransformError::Store`].
    pub fn route(&self, element: &GraphElement, store: &mut RelationalStore) -> Result<Routed, TransformError> {
        match self.project(element)? {
            Some((table, row)) => {
                store.append(&table.table_name, row)?;
                Ok(Routed::Inserted {
                    table: table.table_name.clone(),
                })
            }
            None => {
                let key = Self::routing_key(element);
                log::warn!(
                    "skipping {} {}: no table mapped for routing key {}",
                    element.kind(),
                    element.id(),
                    key
                );
                Ok(Routed::Unmapped {
                    kind: element.kind(),
                    id: element.id().to_string(),
                    key,
                })
            }
        }
    }
}

fn coerce_id(id: &str) -> Result<Cell, CoercionError> {
    DType::Integer.coerce(&Value::String(id.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::mapping::MappingValidator;
    use crate::record::RecordValidator;
    use serde_json::json;

    fn plan() -> SchemaPlan {
        let mapping = MappingValidator::default()
            .load(json!({
                "entity_tables": [{
                    "map_node_label": ["Person"],
                    "table_name": "person",
                    "columns": [
                        {"name": "name", "dtype": "text", "map_node_property": "name"},
                        {"name": "age", "dtype": "integer", "map_node_property": "age"},
                        {"name": "tags", "dtype": "list", "map_node_property": "tags"}
                    ]
                }],
                "relationship_tables": [
                    {
                        "map_edge_label": "KNOWS",
                        "table_name": "knows",
                        "map_from_node_label": ["Person"],
                        "map_to_node_label": ["Person"]
                    },
                    {
                        "map_edge_label": "RATED",
                        "table_name": "rated",
                        "map_from_node_label": ["Person"],
                        "map_to_node_label": ["Movie"],
                        "columns": [{"name": "stars", "dtype": "float", "map_edge_property": "stars"}]
                    }
                ]
            }))
            .unwrap();
        SchemaPlan::build(&mapping).unwrap()
    }

    fn element(value: serde_json::Value) -> GraphElement {
        RecordValidator::default().validate(&value, 1).unwrap()
    }

    fn node(labels: serde_json::Value, properties: serde_json::Value) -> GraphElement {
        element(json!({"type": "node", "id": "1", "labels": labels, "properties": properties}))
    }

    #[test]
    fn test_node_row() {
        let plan = plan();
        let mut store = plan.new_store();
        let routed = Router::new(&plan)
            .route(&node(json!(["Person"]), json!({"name": "Ann", "age": "33", "tags": "x"})), &mut store)
            .unwrap();

        assert_eq!(routed, Routed::Inserted { table: "person".into() });
        assert_eq!(
            store.table("person").unwrap().rows,
            vec![vec![
                Cell::Integer(1),
                Cell::Text("Ann".into()),
                Cell::Integer(33),
                Cell::List(vec![json!("x")]),
            ]]
        );
    }

    #[test]
    fn test_superset_labels_skipped() {
        let plan = plan();
        let mut store = plan.new_store();
        let before = store.clone();

        let routed = Router::new(&plan)
            .route(&node(json!(["Person", "Employee"]), json!({"name": "Ann"})), &mut store)
            .unwrap();

        assert_eq!(
            routed,
            Routed::Unmapped {
                kind: ElementKind::Node,
                id: "1".into(),
                key: RoutingKey::Labels(LabelSet::new(["Employee", "Person"])),
            }
        );
        assert_eq!(store, before);
    }

    #[test]
    fn test_absent_and_falsy_properties_are_null() {
        let plan = plan();
        let (_, row) = Router::new(&plan)
            .project(&node(json!(["Person"]), json!({"name": "", "tags": []})))
            .unwrap()
            .unwrap();
        assert_eq!(row, vec![Cell::Integer(1), Cell::Null, Cell::Null, Cell::Null]);

        let (_, row) = Router::new(&plan)
            .project(&node(json!(["Person"]), json!({"age": 0})))
            .unwrap()
            .unwrap();
        assert_eq!(row[2], Cell::Null);
    }

    #[test]
    fn test_relationship_row_carries_endpoint_ids() {
        let plan = plan();
        let edge = element(json!({
            "type": "relationship",
            "id": "10",
            "label": "KNOWS",
            "start": {"id": "1", "labels": ["Person"]},
            "end": {"id": "2", "labels": ["Person"]}
        }));
        let (table, row) = Router::new(&plan).project(&edge).unwrap().unwrap();
        assert_eq!(table.table_name, "knows");
        assert_eq!(row, vec![Cell::Integer(10), Cell::Integer(1), Cell::Integer(2)]);
    }

    #[test]
    fn test_relationship_properties() {
        let plan = plan();
        let edge = element(json!({
            "type": "relationship",
            "id": "11",
            "label": "RATED",
            "properties": {"stars": 4.5},
            "start": {"id": "1", "labels": ["Person"]},
            "end": {"id": "99", "labels": ["Movie"]}
        }));
        let (_, row) = Router::new(&plan).project(&edge).unwrap().unwrap();
        assert_eq!(row, vec![Cell::Integer(11), Cell::Integer(1), Cell::Integer(99), Cell::Float(4.5)]);
    }

    #[test]
    fn test_coercion_failure_propagates() {
        let plan = plan();
        let mut store = plan.new_store();
        let err = Router::new(&plan)
            .route(&node(json!(["Person"]), json!({"age": "old"})), &mut store)
            .unwrap_err();
        assert!(matches!(err, TransformError::Coercion(CoercionError { dtype: "integer", .. })));
        assert_eq!(store.total_rows(), 0);
    }

    #[test]
    fn test_unmapped_relationship_names_label() {
        let plan = plan();
        let mut store = plan.new_store();
        let edge = element(json!({
            "type": "relationship",
            "id": "12",
            "label": "DIRECTED",
            "start": {"id": "1", "labels": ["Person"]},
            "end": {"id": "2", "labels": ["Movie"]}
        }));

        let routed = Router::new(&plan).route(&edge, &mut store).unwrap();
        assert_eq!(
            routed,
            Routed::Unmapped {
                kind: ElementKind::Relationship,
                id: "12".into(),
                key: RoutingKey::Edge("DIRECTED".into()),
            }
        );
        assert_eq!(store.total_rows(), 0);
    }

    #[test]
    fn test_store_from_another_plan_is_an_error() {
        let plan = plan();
        let other = SchemaPlan::build(
            &MappingValidator::default()
                .load(json!({
                    "entity_tables": [{"map_node_label": ["Movie"], "table_name": "movie", "columns": []}],
                    "relationship_tables": []
                }))
                .unwrap(),
        )
        .unwrap();
        let mut foreign = other.new_store();

        let err = Router::new(&plan)
            .route(&node(json!(["Person"]), json!({"name": "Ann"})), &mut foreign)
            .unwrap_err();
        assert!(matches!(
            err,
            TransformError::Store(StoreError::UnknownTable(ref table)) if table == "person"
        ));
        assert_eq!(foreign.total_rows(), 0);
    }

    #[test]
    fn test_non_numeric_id_fails() {
        let plan = plan();
        let record = element(json!({"type": "node", "id": "n-1", "labels": ["Person"], "properties": {}}));
        assert!(Router::new(&plan).project(&record).is_err());
    }
}
