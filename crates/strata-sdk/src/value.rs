//! Runtime values
//!
//! [`Value`] is what every scope slot, argument and return value holds.
//! Containers are reference-counted and treated as opaque by the object
//! model; instances and classes are referenced by arena handle.

use std::fmt;
use std::sync::Arc;

use serde::ser::SerializeSeq;
use serde::{Serialize, Serializer};

use crate::function::Function;
use crate::scope::Scope;

/// Handle to an Instance in a runtime's arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstanceId(pub u32);

impl InstanceId {
    /// Arena index
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Identity of a registered Class Descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClassId(pub u32);

impl ClassId {
    /// Registry index
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A dynamically-typed runtime value.
///
/// `Null` doubles as the "undefined" sentinel returned by safe navigation.
#[derive(Clone, Default)]
pub enum Value {
    /// Absent / undefined
    #[default]
    Null,
    /// Boolean
    Bool(bool),
    /// Any number
    Number(f64),
    /// Text
    String(Arc<str>),
    /// Ordered list
    Array(Arc<Vec<Value>>),
    /// Key/value struct
    Struct(Arc<Scope>),
    /// Callable
    Function(Arc<dyn Function>),
    /// Object reference
    Instance(InstanceId),
}

impl Value {
    /// Build a string value
    pub fn string(s: impl AsRef<str>) -> Self {
        Value::String(Arc::from(s.as_ref()))
    }

    /// Build an array value
    pub fn array(items: Vec<Value>) -> Self {
        Value::Array(Arc::new(items))
    }

    /// Build a struct value
    pub fn structure(scope: Scope) -> Self {
        Value::Struct(Arc::new(scope))
    }

    /// Wrap a function
    pub fn function(f: impl Function + 'static) -> Self {
        Value::Function(Arc::new(f))
    }

    /// Check for the undefined sentinel
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Check whether this value can be invoked
    pub fn is_callable(&self) -> bool {
        matches!(self, Value::Function(_))
    }

    /// Get as function if callable
    pub fn as_function(&self) -> Option<&Arc<dyn Function>> {
        match self {
            Value::Function(f) => Some(f),
            _ => None,
        }
    }

    /// Get as boolean
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Get as number
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Get as string slice
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get as struct
    pub fn as_struct(&self) -> Option<&Scope> {
        match self {
            Value::Struct(s) => Some(s),
            _ => None,
        }
    }

    /// Get as instance handle
    pub fn as_instance(&self) -> Option<InstanceId> {
        match self {
            Value::Instance(id) => Some(*id),
            _ => None,
        }
    }

    /// Runtime type name used in error messages and coercion
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "numeric",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Struct(_) => "struct",
            Value::Function(_) => "function",
            Value::Instance(_) => "component",
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Struct(a), Value::Struct(b)) => a == b,
            (Value::Function(a), Value::Function(b)) => {
                std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
            }
            (Value::Instance(a), Value::Instance(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "Null"),
            Value::Bool(b) => write!(f, "Bool({})", b),
            Value::Number(n) => write!(f, "Number({})", n),
            Value::String(s) => write!(f, "String({:?})", s),
            Value::Array(items) => f.debug_list().entries(items.iter()).finish(),
            Value::Struct(scope) => scope.fmt(f),
            Value::Function(func) => write!(f, "Function({})", func.signature().name),
            Value::Instance(id) => write!(f, "Instance({})", id),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Number(n) => write!(f, "{}", format_number(*n)),
            Value::String(s) => f.write_str(s),
            Value::Array(items) => write!(f, "[array of {}]", items.len()),
            Value::Struct(scope) => write!(f, "{{struct of {}}}", scope.len()),
            Value::Function(func) => write!(f, "function {}", func.signature().name),
            Value::Instance(id) => write!(f, "component {}", id),
        }
    }
}

/// Render a number the way scripts expect: integral values without a fraction.
pub fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(n as f64)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::string(s)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(Arc::from(s))
    }
}

impl From<InstanceId> for Value {
    fn from(id: InstanceId) -> Self {
        Value::Instance(id)
    }
}

impl From<Scope> for Value {
    fn from(scope: Scope) -> Self {
        Value::structure(scope)
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => {
                serializer.serialize_i64(*n as i64)
            }
            Value::Number(n) => serializer.serialize_f64(*n),
            Value::String(s) => serializer.serialize_str(s),
            Value::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items.iter() {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Struct(scope) => scope.serialize(serializer),
            Value::Function(func) => {
                serializer.serialize_str(&format!("function {}", func.signature().name))
            }
            Value::Instance(id) => serializer.serialize_str(&format!("component {}", id)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_names() {
        assert_eq!(Value::Null.type_name(), "null");
        assert_eq!(Value::from(1.5).type_name(), "numeric");
        assert_eq!(Value::from("x").type_name(), "string");
        assert_eq!(Value::array(vec![]).type_name(), "array");
        assert_eq!(Value::Instance(InstanceId(3)).type_name(), "component");
    }

    #[test]
    fn test_number_display() {
        assert_eq!(Value::from(42.0).to_string(), "42");
        assert_eq!(Value::from(2.5).to_string(), "2.5");
    }

    #[test]
    fn test_serialize_to_json() {
        let v = Value::array(vec![Value::from(1), Value::from("a"), Value::Null]);
        assert_eq!(serde_json::to_string(&v).unwrap(), r#"[1,"a",null]"#);
    }
}
