//! Graph elements read from the input stream.

pub mod validate;

pub use validate::RecordValidator;

use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;

/// A node: external id, label set and properties.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Node {
    pub id: String,
    pub labels: Vec<String>,
    pub properties: Map<String, Value>,
}

/// One end of a relationship. Only `id` is used for projection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Endpoint {
    pub id: String,
    pub labels: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<Map<String, Value>>,
}

/// A directed edge with a single label.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Relationship {
    pub id: String,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<Map<String, Value>>,
    pub start: Endpoint,
    pub end: Endpoint,
}

/// A validated input record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum GraphElement {
    Node(Node),
    Relationship(Relationship),
}

impl GraphElement {
    pub fn kind(&self) -> ElementKind {
        match self {
            GraphElement::Node(_) => ElementKind::Node,
            GraphElement::Relationship(_) => ElementKind::Relationship,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            GraphElement::Node(n) => &n.id,
            GraphElement::Relationship(r) => &r.id,
        }
    }

    pub fn property(&self, key: &str) -> Option<&Value> {
        match self {
            GraphElement::Node(n) => n.properties.get(key),
            GraphElement::Relationship(r) => r.properties.as_ref().and_then(|p| p.get(key)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    Node,
    Relationship,
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementKind::Node => write!(f, "node"),
            ElementKind::Relationship => write!(f, "relationship"),
        }
    }
}
