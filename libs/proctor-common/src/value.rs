//! Dynamic value universe shared by test case inputs, expected outputs and
//! the values a candidate function returns.
//!
//! **Canonical form (used for display AND equality):**
//! - Object keys sorted, no insignificant whitespace
//! - Integral numbers rendered without a fraction (`1.0` → `1`)
//! - Negative zero rendered as `0`
//! - NaN / ±Infinity rendered as `null` (what `JSON.stringify` does)
//! - Other numbers in shortest round-trip form
//! - Floating-point tolerance: NO (`0.1 + 0.2` does not equal `0.3`)

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::{self, Write as _};

/// Largest magnitude rendered in plain integer notation
const INTEGER_RENDER_LIMIT: f64 = 1e21;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "serde_json::Value", into = "serde_json::Value")]
pub enum Value {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Array(Vec<Value>),
    Object(BTreeMap<String, Value>),
}

impl Value {
    /// Parse a JSON document into a value
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str::<serde_json::Value>(json).map(Value::from)
    }

    /// Render the canonical serialization of this value
    pub fn canonical(&self) -> String {
        let mut out = String::new();
        self.write_canonical(&mut out);
        out
    }

    /// Deep structural equality over the canonical form
    pub fn canonical_eq(&self, other: &Value) -> bool {
        self.canonical() == other.canonical()
    }

    fn write_canonical(&self, out: &mut String) {
        match self {
            Value::Null => out.push_str("null"),
            Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
            Value::Number(n) => write_number(out, *n),
            Value::String(s) => write_string(out, s),
            Value::Array(items) => {
                out.push('[');
                for (idx, item) in items.iter().enumerate() {
                    if idx > 0 {
                        out.push(',');
                    }
                    item.write_canonical(out);
                }
                out.push(']');
            }
            Value::Object(map) => {
                out.push('{');
                for (idx, (key, item)) in map.iter().enumerate() {
                    if idx > 0 {
                        out.push(',');
                    }
                    write_string(out, key);
                    out.push(':');
                    item.write_canonical(out);
                }
                out.push('}');
            }
        }
    }
}

fn write_number(out: &mut String, n: f64) {
    if !n.is_finite() {
        out.push_str("null");
    } else if n == 0.0 {
        out.push('0');
    } else if n.fract() == 0.0 && n.abs() < INTEGER_RENDER_LIMIT {
        let _ = write!(out, "{:.0}", n);
    } else {
        let _ = write!(out, "{}", n);
    }
}

fn write_string(out: &mut String, s: &str) {
    match serde_json::to_string(s) {
        Ok(escaped) => out.push_str(&escaped),
        // Serializing a &str cannot fail; keep the raw text rather than panic
        Err(_) => {
            out.push('"');
            out.push_str(s);
            out.push('"');
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical())
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => n.as_f64().map_or(Value::Null, Value::Number),
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::Array(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => Value::Object(
                map.into_iter()
                    .map(|(key, item)| (key, Value::from(item)))
                    .collect(),
            ),
        }
    }
}

impl From<Value> for serde_json::Value {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(b),
            Value::Number(n) => number_to_json(n),
            Value::String(s) => serde_json::Value::String(s),
            Value::Array(items) => {
                serde_json::Value::Array(items.into_iter().map(Into::into).collect())
            }
            Value::Object(map) => serde_json::Value::Object(
                map.into_iter()
                    .map(|(key, item)| (key, item.into()))
                    .collect(),
            ),
        }
    }
}

/// Integral values inside the i64 range go back out as JSON integers
fn number_to_json(n: f64) -> serde_json::Value {
    if n.fract() == 0.0 && n >= i64::MIN as f64 && n <= i64::MAX as f64 {
        return serde_json::Value::from(n as i64);
    }
    serde_json::Number::from_f64(n)
        .map(serde_json::Value::Number)
        .unwrap_or(serde_json::Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn v(json: serde_json::Value) -> Value {
        Value::from(json)
    }

    #[test]
    fn test_canonical_scalars() {
        assert_eq!(v(json!(null)).canonical(), "null");
        assert_eq!(v(json!(true)).canonical(), "true");
        assert_eq!(v(json!(42)).canonical(), "42");
        assert_eq!(v(json!(-7)).canonical(), "-7");
        assert_eq!(v(json!(2.5)).canonical(), "2.5");
        assert_eq!(v(json!("hi \"there\"")).canonical(), r#""hi \"there\"""#);
    }

    #[test]
    fn test_integral_floats_match_integers() {
        assert!(v(json!(1.0)).canonical_eq(&v(json!(1))));
        assert_eq!(Value::Number(-0.0).canonical(), "0");
        assert_eq!(Value::Number(1e20).canonical(), "100000000000000000000");
    }

    #[test]
    fn test_non_finite_numbers_render_as_null() {
        assert_eq!(Value::Number(f64::NAN).canonical(), "null");
        assert_eq!(Value::Number(f64::INFINITY).canonical(), "null");
        assert!(Value::Number(f64::NEG_INFINITY).canonical_eq(&Value::Null));
    }

    #[test]
    fn test_no_float_tolerance() {
        let sum = Value::Number(0.1 + 0.2);
        assert_eq!(sum.canonical(), "0.30000000000000004");
        assert!(!sum.canonical_eq(&v(json!(0.3))));
    }

    #[test]
    fn test_object_keys_are_sorted() {
        let a = Value::from_json_str(r#"{"b": 1, "a": [1, 2, {"z": null, "y": "s"}]}"#).unwrap();
        let b = Value::from_json_str(r#"{"a":[1,2,{"y":"s","z":null}],"b":1}"#).unwrap();
        assert_eq!(a.canonical(), r#"{"a":[1,2,{"y":"s","z":null}],"b":1}"#);
        assert!(a.canonical_eq(&b));
    }

    #[test]
    fn test_array_order_matters() {
        assert!(!v(json!([0, 1])).canonical_eq(&v(json!([1, 0]))));
    }

    #[test]
    fn test_string_and_number_are_distinct() {
        assert!(!v(json!("1")).canonical_eq(&v(json!(1))));
    }

    #[test]
    fn test_serde_uses_json_shape() {
        let value: Value = serde_json::from_str(r#"[[2,7,11,15],9]"#).unwrap();
        assert_eq!(
            value,
            Value::Array(vec![
                Value::Array(vec![
                    Value::Number(2.0),
                    Value::Number(7.0),
                    Value::Number(11.0),
                    Value::Number(15.0),
                ]),
                Value::Number(9.0),
            ])
        );
        assert_eq!(serde_json::to_string(&value).unwrap(), "[[2,7,11,15],9]");
    }

    #[test]
    fn test_display_is_canonical() {
        let value = v(json!({"k": [1.5, "x"]}));
        assert_eq!(value.to_string(), r#"{"k":[1.5,"x"]}"#);
    }
}
