//! Conversion of raw property values into column storage types.

use crate::error::CoercionError;
use crate::mapping::DType;
use crate::relational::store::Cell;
use serde_json::Value;

impl DType {
    /// Coerce `value` to this type.
    ///
    /// - text: strings pass through, anything else is rendered as JSON
    ///   (`true`, `1.5`, `["a"]`)
    /// - integer: numbers (floats truncate), numeric strings, booleans as 0/1
    /// - float: numbers, numeric strings, booleans as 0/1
    /// - list: lists pass through, anything else becomes a one-element list
    pub fn coerce(self, value: &Value) -> Result<Cell, CoercionError> {
        match self {
            DType::Text => Ok(Cell::Text(match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })),
            DType::Integer => to_integer(value).map(Cell::Integer).ok_or_else(|| self.error(value)),
            DType::Float => to_float(value).map(Cell::Float).ok_or_else(|| self.error(value)),
            DType::List => Ok(Cell::List(match value {
                Value::Array(items) => items.clone(),
                other => vec![other.clone()],
            })),
        }
    }

    fn error(self, value: &Value) -> CoercionError {
        CoercionError {
            dtype: self.as_str(),
            value: value.to_string(),
        }
    }
}

fn to_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && *f >= i64::MIN as f64 && *f < i64::MAX as f64)
                .map(|f| f.trunc() as i64)
        }),
        Value::String(s) => s.trim().parse().ok(),
        Value::Bool(b) => Some(i64::from(*b)),
        _ => None,
    }
}

fn to_float(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    }
}

/// Truthiness used to decide whether a property supplies a value.
///
/// Zero, empty text, `false`, empty collections and null all count as
/// absent, so such a property projects to NULL exactly like a missing one.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_text() {
        assert_eq!(DType::Text.coerce(&json!("Ann")).unwrap(), Cell::Text("Ann".into()));
        assert_eq!(DType::Text.coerce(&json!(42)).unwrap(), Cell::Text("42".into()));
        assert_eq!(DType::Text.coerce(&json!(["a"])).unwrap(), Cell::Text("[\"a\"]".into()));
        assert_eq!(DType::Text.coerce(&json!(true)).unwrap(), Cell::Text("true".into()));
    }

    #[test]
    fn test_integer() {
        assert_eq!(DType::Integer.coerce(&json!("17")).unwrap(), Cell::Integer(17));
        assert_eq!(DType::Integer.coerce(&json!(" -3 ")).unwrap(), Cell::Integer(-3));
        assert_eq!(DType::Integer.coerce(&json!(3.9)).unwrap(), Cell::Integer(3));
        assert_eq!(DType::Integer.coerce(&json!(true)).unwrap(), Cell::Integer(1));

        let err = DType::Integer.coerce(&json!("abc")).unwrap_err();
        assert_eq!(err.dtype, "integer");
        assert!(DType::Integer.coerce(&json!([1])).is_err());
        assert!(DType::Integer.coerce(&json!("1.5")).is_err());
    }

    #[test]
    fn test_integer_out_of_range() {
        // 2^63 does not fit i64 and must not saturate to i64::MAX
        assert!(DType::Integer.coerce(&json!(9223372036854775808u64)).is_err());
        assert!(DType::Integer.coerce(&json!(9.223372036854775808e18)).is_err());
        assert!(DType::Integer.coerce(&json!(-1e19)).is_err());
        assert_eq!(DType::Integer.coerce(&json!(i64::MAX)).unwrap(), Cell::Integer(i64::MAX));
        assert_eq!(DType::Integer.coerce(&json!(-9.223372036854775808e18)).unwrap(), Cell::Integer(i64::MIN));
    }

    #[test]
    fn test_float() {
        assert_eq!(DType::Float.coerce(&json!("1.5")).unwrap(), Cell::Float(1.5));
        assert_eq!(DType::Float.coerce(&json!(2)).unwrap(), Cell::Float(2.0));
        assert!(DType::Float.coerce(&json!({"a": 1})).is_err());
    }

    #[test]
    fn test_list() {
        assert_eq!(
            DType::List.coerce(&json!(["a", "b"])).unwrap(),
            Cell::List(vec![json!("a"), json!("b")])
        );
        assert_eq!(DType::List.coerce(&json!("a")).unwrap(), Cell::List(vec![json!("a")]));
    }

    #[test]
    fn test_truthiness() {
        for falsy in [json!(0), json!(0.0), json!(""), json!(false), json!([]), json!({}), json!(null)] {
            assert!(!is_truthy(&falsy), "{} should be falsy", falsy);
        }
        for truthy in [json!(-1), json!("0"), json!(true), json!([0]), json!({"a": null})] {
            assert!(is_truthy(&truthy), "{} should be truthy", truthy);
        }
    }
}
