//! Property definitions

use strata_sdk::{keys, Key, Scope, Value};

/// Metadata for one declared field.
///
/// Created once per class descriptor and shared by every instance through
/// `Arc`; never copied or mutated after the descriptor is built.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyDefinition {
    /// Property name
    pub name: Key,
    /// Declared type name, `"any"` when untyped
    pub declared_type: String,
    /// Evaluated default value
    pub default_value: Option<Value>,
    /// Generated getter name (`get` + Name)
    pub getter_name: Key,
    /// Generated setter name (`set` + Name)
    pub setter_name: Key,
    /// Documentation entries
    pub documentation: Scope,
    /// Annotations
    pub annotations: Scope,
    /// Class that declared the property (filled in by `ClassBuilder`)
    pub declaring_class: Option<Key>,
}

impl PropertyDefinition {
    /// Untyped property
    pub fn new(name: impl Into<Key>) -> Self {
        Self::typed(name, "any")
    }

    /// Property with a declared type
    pub fn typed(name: impl Into<Key>, declared_type: impl Into<String>) -> Self {
        let name = name.into();
        PropertyDefinition {
            getter_name: name.prefixed("get"),
            setter_name: name.prefixed("set"),
            name,
            declared_type: declared_type.into(),
            default_value: None,
            documentation: Scope::new(),
            annotations: Scope::new(),
            declaring_class: None,
        }
    }

    /// Attach a default value
    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        let value = value.into();
        self.annotations.put(keys::DEFAULT.clone(), value.clone());
        self.default_value = Some(value);
        self
    }

    /// Add an annotation
    pub fn annotation(mut self, key: impl Into<Key>, value: impl Into<Value>) -> Self {
        self.annotations.put(key, value);
        self
    }

    /// Set the `hint` documentation entry
    pub fn hint(mut self, text: impl AsRef<str>) -> Self {
        self.documentation.put(keys::HINT.clone(), Value::string(text));
        self
    }

    /// Whether the declared type enforces coercion
    pub fn is_typed(&self) -> bool {
        !(self.declared_type.is_empty() || self.declared_type.eq_ignore_ascii_case("any"))
    }

    /// Whether a getter should be generated (`getter=false` suppresses it)
    pub fn generates_getter(&self) -> bool {
        self.annotations.get_flag(&keys::GETTER).unwrap_or(true)
    }

    /// Whether a setter should be generated (`setter=false` suppresses it)
    pub fn generates_setter(&self) -> bool {
        self.annotations.get_flag(&keys::SETTER).unwrap_or(true)
    }
}
