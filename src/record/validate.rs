//! Structural validation of input records.
//!
//! Dispatches on the `type` discriminator and builds a typed
//! [`GraphElement`] while checking, so a record that passes is already
//! decoded. Endpoints are never looked up: a relationship may reference
//! nodes that are absent from the stream.

use crate::error::RecordSchemaError;
use crate::record::{Endpoint, GraphElement, Node, Relationship};
use crate::shape::{self, ShapeError, ShapeResult};
use serde_json::{Map, Value};

const NODE_KEYS: &[&str] = &["type", "id", "labels", "properties"];
const RELATIONSHIP_KEYS: &[&str] = &["type", "id", "label", "properties", "start", "end"];
const ENDPOINT_KEYS: &[&str] = &["id", "labels", "properties"];

#[derive(Debug, Clone)]
pub struct RecordValidator {
    strict_keys: bool,
}

impl Default for RecordValidator {
    fn default() -> Self {
        RecordValidator { strict_keys: true }
    }
}

impl RecordValidator {
    pub fn new(strict_keys: bool) -> Self {
        RecordValidator { strict_keys }
    }

    /// Validate one decoded record. `line` is its 1-based stream position.
    pub fn validate(&self, value: &Value, line: usize) -> Result<GraphElement, RecordSchemaError> {
        self.element(value).map_err(|ShapeError { path, expected }| RecordSchemaError {
            line,
            path,
            expected,
        })
    }

    fn element(&self, value: &Value) -> ShapeResult<GraphElement> {
        let obj = shape::object(value, "")?;
        match obj.get("type").and_then(Value::as_str) {
            Some("node") => self.node(obj).map(GraphElement::Node),
            Some("relationship") => self.relationship(obj).map(GraphElement::Relationship),
            _ => Err(ShapeError::new("type", "\"node\" or \"relationship\"")),
        }
    }

    fn node(&self, obj: &Map<String, Value>) -> ShapeResult<Node> {
        self.check_keys(obj, "", NODE_KEYS)?;
        Ok(Node {
            id: shape::string(shape::required(obj, "", "id")?, "id")?.to_string(),
            labels: shape::string_list(shape::required(obj, "", "labels")?, "labels")?,
            properties: properties(shape::required(obj, "", "properties")?, "properties")?,
        })
    }

    fn relationship(&self, obj: &Map<String, Value>) -> ShapeResult<Relationship> {
        self.check_keys(obj, "", RELATIONSHIP_KEYS)?;
        Ok(Relationship {
            id: shape::string(shape::required(obj, "", "id")?, "id")?.to_string(),
            label: shape::string(shape::required(obj, "", "label")?, "label")?.to_string(),
            properties: obj
                .get("properties")
                .map(|p| properties(p, "properties"))
                .transpose()?,
            start: self.endpoint(shape::required(obj, "", "start")?, "start")?,
            end: self.endpoint(shape::required(obj, "", "end")?, "end")?,
        })
    }

    fn endpoint(&self, value: &Value, path: &str) -> ShapeResult<Endpoint> {
        let obj = shape::object(value, path)?;
        self.check_keys(obj, path, ENDPOINT_KEYS)?;
        Ok(Endpoint {
            id: shape::string(shape::required(obj, path, "id")?, &shape::field(path, "id"))?
                .to_string(),
            labels: shape::string_list(
                shape::required(obj, path, "labels")?,
                &shape::field(path, "labels"),
            )?,
            properties: obj
                .get("properties")
                .map(|p| properties(p, &shape::field(path, "properties")))
                .transpose()?,
        })
    }

    fn check_keys(&self, obj: &Map<String, Value>, path: &str, allowed: &[&str]) -> ShapeResult<()> {
        if self.strict_keys {
            shape::only_keys(obj, path, allowed)
        } else {
            Ok(())
        }
    }
}

/// Property values may be text, numbers, booleans, lists or nested mappings; never null.
fn properties(value: &Value, path: &str) -> ShapeResult<Map<String, Value>> {
    let obj = shape::object(value, path)?;
    if let Some((key, _)) = obj.iter().find(|(_, v)| v.is_null()) {
        return Err(ShapeError::new(
            &shape::field(path, key),
            "a string, number, list or mapping",
        ));
    }
    Ok(obj.clone())
}
