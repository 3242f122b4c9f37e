//! Declared-type coercion
//!
//! Used by generated setters and by return-type enforcement. A cast either
//! produces the coerced value or reports that the value is not assignable.

use strata_sdk::{format_number, InstanceId, Value};

/// Coerce `value` to `declared_type`.
///
/// Class and interface names are checked with `is_instance_of`, which the
/// caller supplies so this module stays independent of the arena.
pub fn cast(
    value: &Value,
    declared_type: &str,
    is_instance_of: &dyn Fn(InstanceId, &str) -> bool,
) -> Option<Value> {
    let type_name = declared_type.trim();
    match type_name.to_ascii_lowercase().as_str() {
        "" | "any" => Some(value.clone()),
        "void" | "null" => value.is_null().then_some(Value::Null),
        "string" => to_string(value).map(Value::from),
        "numeric" | "number" | "double" | "float" => to_number(value).map(Value::Number),
        "integer" | "int" | "long" | "short" => {
            to_number(value).map(|n| Value::Number(n.trunc()))
        }
        "boolean" | "bool" => to_boolean(value).map(Value::Bool),
        "array" => matches!(value, Value::Array(_)).then(|| value.clone()),
        "struct" => matches!(value, Value::Struct(_)).then(|| value.clone()),
        "function" | "closure" => value.is_callable().then(|| value.clone()),
        "component" | "class" => matches!(value, Value::Instance(_)).then(|| value.clone()),
        _ => match value {
            Value::Instance(id) if is_instance_of(*id, type_name) => Some(value.clone()),
            _ => None,
        },
    }
}

/// String coercion: text as-is, numbers without a trailing fraction, booleans
/// as `true`/`false`.
pub fn to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.to_string()),
        Value::Number(n) => Some(format_number(*n)),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Numeric coercion: numbers, numeric strings, booleans as 1/0.
pub fn to_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => Some(*n),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                return None;
            }
            s.parse::<f64>().ok().filter(|n| n.is_finite())
        }
        _ => None,
    }
}

/// Boolean coercion: booleans, numbers (non-zero is true), and the strings
/// `true`/`false`/`yes`/`no` or numeric text.
pub fn to_boolean(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => Some(*n != 0.0),
        Value::String(s) => {
            let s = s.trim();
            if s.eq_ignore_ascii_case("true") || s.eq_ignore_ascii_case("yes") {
                Some(true)
            } else if s.eq_ignore_ascii_case("false") || s.eq_ignore_ascii_case("no") {
                Some(false)
            } else {
                to_number(value).map(|n| n != 0.0)
            }
        }
        _ => None,
    }
}
