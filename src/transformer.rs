//! A transformation session: one mapping, one batch of records, one store.

use crate::emit::{table_definitions, TableWriter};
use crate::error::{ConfigSchemaError, Result};
use crate::mapping::{MappingConfig, MappingValidator};
use crate::record::{GraphElement, RecordValidator};
use crate::relational::{RelationalStore, Routed, Router, SchemaPlan};
use crate::types::{TransformConfig, TransformStats};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Key of the table definitions in [`Transformer::generate_sql`] output.
pub const CREATE_KEY: &str = "CREATE";

/// Validates graph records against a mapping and projects them into tables.
///
/// The mapping is validated and compiled on construction. Records are then
/// fed with [`ingest`](Self::ingest) or [`ingest_record`](Self::ingest_record);
/// each is validated (the first failure is fatal) and kept. With
/// `begin_conversion` set, each record is also routed as it arrives;
/// otherwise call [`generate_rdb`](Self::generate_rdb) once ingestion is done.
#[derive(Debug)]
pub struct Transformer {
    mapping: MappingConfig,
    plan: SchemaPlan,
    config: TransformConfig,
    validator: RecordValidator,
    records: Vec<GraphElement>,
    store: RelationalStore,
    stats: TransformStats,
    last_line: usize,
}

impl Transformer {
    /// Start a session from a loaded mapping.
    pub fn new(mapping: MappingConfig, config: TransformConfig) -> Result<Self, ConfigSchemaError> {
        let plan = SchemaPlan::build(&mapping)?;
        let store = plan.new_store();
        let validator = RecordValidator::new(config.strict_keys);
        log::info!("mapping loaded: {} tables", store.len());

        Ok(Transformer {
            mapping,
            plan,
            config,
            validator,
            records: Vec::new(),
            store,
            stats: TransformStats::default(),
            last_line: 0,
        })
    }

    /// Start a session from a decoded mapping document.
    pub fn from_mapping_value(mapping: Value, config: TransformConfig) -> Result<Self, ConfigSchemaError> {
        let mapping = MappingValidator::new(config.strict_keys).load(mapping)?;
        Self::new(mapping, config)
    }

    /// Start a session from mapping text (YAML or JSON).
    pub fn from_mapping_text(mapping: &str, config: TransformConfig) -> Result<Self, ConfigSchemaError> {
        let mapping = MappingValidator::new(config.strict_keys).load_text(mapping)?;
        Self::new(mapping, config)
    }

    /// Validate and keep one record found at 1-based position `line`.
    pub fn ingest_record(&mut self, line: usize, value: &Value) -> Result<()> {
        let element = self.validator.validate(value, line)?;
        self.last_line = line;

        if self.config.begin_conversion {
            let routed = Router::new(&self.plan).route(&element, &mut self.store)?;
            tally(&mut self.stats, &routed);
        }
        self.records.push(element);
        self.stats.validated += 1;
        Ok(())
    }

    /// Ingest records numbered consecutively after the last ingested line.
    pub fn ingest<I>(&mut self, records: I) -> Result<()>
    where
        I: IntoIterator<Item = Value>,
    {
        for value in records {
            let line = self.last_line + 1;
            self.ingest_record(line, &value)?;
        }
        Ok(())
    }

    /// Rebuild the store from scratch by routing every kept record.
    ///
    /// Repeated calls produce identical tables. On a coercion failure the
    /// previous store is left untouched.
    pub fn generate_rdb(&mut self) -> Result<()> {
        let router = Router::new(&self.plan);
        let mut store = self.plan.new_store();
        let mut stats = TransformStats {
            validated: self.records.len(),
            ..TransformStats::default()
        };

        for element in &self.records {
            let routed = router.route(element, &mut store)?;
            tally(&mut stats, &routed);
        }

        log::info!(
            "generated {} rows from {} records ({} skipped)",
            stats.inserted,
            stats.validated,
            stats.skipped
        );
        self.store = store;
        self.stats = stats;
        Ok(())
    }

    /// Write one `<table>.csv` per table into `dir`.
    pub fn write_to_csv<P: AsRef<Path>>(&self, dir: P) -> Result<Vec<PathBuf>> {
        TableWriter::new(self.config.csv_delimiter).write_dir(&self.store, dir)
    }

    /// Table definitions for every configured table.
    ///
    /// Without a directory, returns them under the single key [`CREATE_KEY`].
    /// With one, writes them to `ddl_file_name` inside it and returns `None`.
    pub fn generate_sql(&self, dir: Option<&Path>) -> Result<Option<BTreeMap<String, String>>> {
        let create = table_definitions(&self.plan);
        match dir {
            Some(dir) => {
                std::fs::create_dir_all(dir)?;
                let path = dir.join(&self.config.ddl_file_name);
                std::fs::write(&path, create)?;
                log::info!("wrote table definitions to {}", path.display());
                Ok(None)
            }
            None => Ok(Some(BTreeMap::from([(CREATE_KEY.to_string(), create)]))),
        }
    }

    pub fn store(&self) -> &RelationalStore {
        &self.store
    }

    /// Validated records in input order.
    pub fn records(&self) -> &[GraphElement] {
        &self.records
    }

    pub fn mapping(&self) -> &MappingConfig {
        &self.mapping
    }

    pub fn plan(&self) -> &SchemaPlan {
        &self.plan
    }

    pub fn stats(&self) -> TransformStats {
        self.stats
    }
}

fn tally(stats: &mut TransformStats, routed: &Routed) {
    match routed {
        Routed::Inserted { .. } => stats.inserted += 1,
        Routed::Unmapped { .. } => stats.skipped += 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransformError;
    use crate::relational::Cell;
    use serde_json::json;

    fn mapping() -> Value {
        json!({
            "entity_tables": [{
                "map_node_label": ["Person"],
                "table_name": "person",
                "columns": [{"name": "name", "dtype": "text", "map_node_property": "name"}]
            }],
            "relationship_tables": [{
                "map_edge_label": "KNOWS",
                "table_name": "knows",
                "map_from_node_label": ["Person"],
                "map_to_node_label": ["Person"]
            }]
        })
    }

    fn records() -> Vec<Value> {
        vec![
            json!({"type": "node", "id": "1", "labels": ["Person"], "properties": {"name": "Ann"}}),
            json!({"type": "node", "id": "2", "labels": ["Person", "Employee"], "properties": {"name": "Bo"}}),
            json!({"type": "node", "id": "3", "labels": ["Person"], "properties": {}}),
            json!({
                "type": "relationship", "id": "10", "label": "KNOWS",
                "start": {"id": "1", "labels": ["Person"]},
                "end": {"id": "2", "labels": ["Person"]}
            }),
        ]
    }

    #[test]
    fn test_eager_conversion() {
        let mut transformer = Transformer::from_mapping_value(mapping(), TransformConfig::default()).unwrap();
        transformer.ingest(records()).unwrap();

        let person = transformer.store().table("person").unwrap();
        assert_eq!(
            person.rows,
            vec![
                vec![Cell::Integer(1), Cell::Text("Ann".into())],
                vec![Cell::Integer(3), Cell::Null],
            ]
        );
        assert_eq!(
            transformer.store().table("knows").unwrap().rows,
            vec![vec![Cell::Integer(10), Cell::Integer(1), Cell::Integer(2)]]
        );
        assert_eq!(
            transformer.stats(),
            TransformStats { validated: 4, inserted: 3, skipped: 1 }
        );
    }

    #[test]
    fn test_deferred_conversion_matches_eager() {
        let config = TransformConfig {
            begin_conversion: false,
            ..TransformConfig::default()
        };
        let mut deferred = Transformer::from_mapping_value(mapping(), config).unwrap();
        deferred.ingest(records()).unwrap();
        assert_eq!(deferred.store().total_rows(), 0);
        assert_eq!(deferred.records().len(), 4);

        deferred.generate_rdb().unwrap();
        let first = deferred.store().clone();
        deferred.generate_rdb().unwrap();
        assert_eq!(deferred.store(), &first);

        let mut eager = Transformer::from_mapping_value(mapping(), TransformConfig::default()).unwrap();
        eager.ingest(records()).unwrap();
        assert_eq!(eager.store(), &first);
        assert_eq!(eager.stats(), deferred.stats());
    }

    #[test]
    fn test_record_error_position() {
        let mut transformer = Transformer::from_mapping_value(mapping(), TransformConfig::default()).unwrap();
        let mut input = records();
        input.insert(2, json!({"type": "node", "id": "9", "labels": "Person", "properties": {}}));

        let err = transformer.ingest(input).unwrap_err();
        match err {
            TransformError::Record(e) => {
                assert_eq!(e.line, 3);
                assert_eq!(e.path, "labels");
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(transformer.records().len(), 2);
    }

    #[test]
    fn test_coercion_failure_keeps_stats_consistent() {
        let mut transformer = Transformer::from_mapping_value(mapping(), TransformConfig::default()).unwrap();
        transformer.ingest(records().into_iter().take(1)).unwrap();

        let bad = json!({"type": "node", "id": "x7", "labels": ["Person"], "properties": {}});
        let err = transformer.ingest(vec![bad]).unwrap_err();
        assert!(matches!(err, TransformError::Coercion(_)));

        assert_eq!(transformer.records().len(), 1);
        assert_eq!(
            transformer.stats(),
            TransformStats { validated: 1, inserted: 1, skipped: 0 }
        );
        transformer.generate_rdb().unwrap();
        assert_eq!(transformer.stats().validated, 1);
    }

    #[test]
    fn test_bad_mapping_rejected() {
        let mut bad = mapping();
        bad["entity_tables"][0]["columns"][0]["dtype"] = json!("blob");
        let err = Transformer::from_mapping_value(bad, TransformConfig::default()).unwrap_err();
        assert!(matches!(err, ConfigSchemaError::UnknownDtype { .. }));
    }

    #[test]
    fn test_generate_sql_in_memory() {
        let transformer = Transformer::from_mapping_value(mapping(), TransformConfig::default()).unwrap();
        let out = transformer.generate_sql(None).unwrap().unwrap();
        assert_eq!(out.len(), 1);
        assert!(out[CREATE_KEY].starts_with("CREATE TABLE person (\n\tname\t\tTEXT\n);"));
    }
}
