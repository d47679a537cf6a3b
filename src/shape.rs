//! Structural checks over decoded `serde_json::Value` trees.
//!
//! Both the mapping validator and the record validator walk untyped values
//! and need to report *where* a check failed. These helpers carry a dotted
//! path (`entity_tables[0].columns[1].dtype`) alongside the value so a
//! failure can name the offending location and what was expected there.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};

pub(crate) const IDENTIFIER_EXPECTATION: &str =
    "an identifier (letters, digits and underscores, not starting with a digit)";

static IDENTIFIER_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap()
});

/// A failed structural check: the location and what should have been there.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeError {
    pub path: String,
    pub expected: String,
}

impl ShapeError {
    pub fn new(path: &str, expected: impl Into<String>) -> Self {
        let path = if path.is_empty() { "$" } else { path };
        ShapeError {
            path: path.to_string(),
            expected: expected.into(),
        }
    }
}

pub(crate) type ShapeResult<T> = Result<T, ShapeError>;

pub(crate) fn field(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", path, key)
    }
}

pub(crate) fn index(path: &str, idx: usize) -> String {
    format!("{}[{}]", path, idx)
}

pub(crate) fn object<'a>(value: &'a Value, path: &str) -> ShapeResult<&'a Map<String, Value>> {
    value
        .as_object()
        .ok_or_else(|| ShapeError::new(path, "a mapping"))
}

pub(crate) fn array<'a>(value: &'a Value, path: &str) -> ShapeResult<&'a Vec<Value>> {
    value.as_array().ok_or_else(|| ShapeError::new(path, "a list"))
}

pub(crate) fn string<'a>(value: &'a Value, path: &str) -> ShapeResult<&'a str> {
    value.as_str().ok_or_else(|| ShapeError::new(path, "a string"))
}

pub(crate) fn is_identifier(s: &str) -> bool {
    IDENTIFIER_REGEX.is_match(s)
}

/// A string usable unquoted as a SQL identifier and as a file stem.
pub(crate) fn identifier<'a>(value: &'a Value, path: &str) -> ShapeResult<&'a str> {
    let s = string(value, path)?;
    if is_identifier(s) {
        Ok(s)
    } else {
        Err(ShapeError::new(
            path,
            IDENTIFIER_EXPECTATION,
        ))
    }
}

/// A list whose every element is a string.
pub(crate) fn string_list(value: &Value, path: &str) -> ShapeResult<Vec<String>> {
    array(value, path)?
        .iter()
        .enumerate()
        .map(|(i, item)| string(item, &index(path, i)).map(str::to_string))
        .collect()
}

pub(crate) fn required<'a>(obj: &'a Map<String, Value>, path: &str, key: &str) -> ShapeResult<&'a Value> {
    obj.get(key)
        .ok_or_else(|| ShapeError::new(&field(path, key), "a value (missing key)"))
}

/// Fails on the first key not listed in `allowed`.
pub(crate) fn only_keys(obj: &Map<String, Value>, path: &str, allowed: &[&str]) -> ShapeResult<()> {
    match obj.keys().find(|k| !allowed.contains(&k.as_str())) {
        Some(key) => Err(ShapeError::new(
            &field(path, key),
            format!("no such key (allowed: {})", allowed.join(", ")),
        )),
        None => Ok(()),
    }
}
