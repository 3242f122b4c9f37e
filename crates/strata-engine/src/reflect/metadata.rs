//! Metadata builder
//!
//! Reflection records for external consumers. A class record describes one
//! hierarchy level and nests its super's record under `extends`.

use std::sync::Arc;

use serde::Serialize;
use strata_sdk::{keys, Function, InstanceId, Key, ObjResult, Scope, Signature, Value};

use crate::interpreter::Runtime;
use crate::object::{InterfaceContract, PropertyDefinition};

/// Record type tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MetadataKind {
    /// A class
    Component,
    /// An interface
    Interface,
}

/// Reflection record for a class or an interface
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassMetadata {
    /// Simple name
    pub name: String,
    /// Fully-qualified name
    pub fullname: String,
    /// `Component` or `Interface`
    #[serde(rename = "type")]
    pub kind: MetadataKind,
    /// `hint` documentation entry
    pub hint: String,
    /// Whether instances may write output (classes only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<bool>,
    /// Whether accessors are generated (classes only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accessors: Option<bool>,
    /// Whether raw access re-routes through accessors (classes only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invoke_implicit_accessor: Option<bool>,
    /// Functions declared at this level
    pub functions: Vec<FunctionMetadata>,
    /// Properties declared at this level
    pub properties: Vec<PropertyMetadata>,
    /// Interfaces declared at this level
    pub implements: Vec<String>,
    /// Documentation
    pub documentation: Scope,
    /// Annotations
    pub annotations: Scope,
    /// Super record, absent at the root
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extends: Option<Box<ClassMetadata>>,
}

/// Function record
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionMetadata {
    pub name: String,
    pub access: String,
    pub return_type: String,
    pub hint: String,
    pub parameters: Vec<ParameterMetadata>,
    pub annotations: Scope,
}

/// Function parameter record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParameterMetadata {
    pub name: String,
    #[serde(rename = "type")]
    pub declared_type: String,
    pub required: bool,
    pub default: Value,
}

/// Property record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PropertyMetadata {
    pub name: String,
    #[serde(rename = "type")]
    pub declared_type: String,
    pub default: Value,
    /// Documentation merged with annotations, without `default`
    pub annotations: Scope,
}

impl ClassMetadata {
    /// Render as a struct value, as `$bx` returns it
    pub fn to_value(&self) -> Value {
        match serde_json::to_value(self) {
            Ok(json) => from_json(json),
            Err(err) => {
                tracing::warn!(class = %self.fullname, error = %err, "metadata rendering failed");
                Value::Null
            }
        }
    }

    /// Depth of the `extends` chain
    pub fn depth(&self) -> usize {
        let mut depth = 0;
        let mut current = self.extends.as_deref();
        while let Some(parent) = current {
            depth += 1;
            current = parent.extends.as_deref();
        }
        depth
    }
}

impl FunctionMetadata {
    fn new(signature: &Signature, documentation: &Scope, annotations: &Scope) -> Self {
        FunctionMetadata {
            name: signature.name.name().to_string(),
            access: signature.access.as_str().to_string(),
            return_type: signature.return_type.clone(),
            hint: hint_of(documentation),
            parameters: signature
                .arguments
                .iter()
                .map(|arg| ParameterMetadata {
                    name: arg.name.name().to_string(),
                    declared_type: arg.declared_type.clone(),
                    required: arg.required,
                    default: arg.default_value.clone().unwrap_or_default(),
                })
                .collect(),
            annotations: annotations.clone(),
        }
    }

    fn of(function: &dyn Function) -> Self {
        Self::new(function.signature(), function.documentation(), function.annotations())
    }
}

impl PropertyMetadata {
    fn of(property: &PropertyDefinition) -> Self {
        let mut annotations = property.documentation.clone();
        annotations.add_all(&property.annotations);
        annotations.remove(&keys::DEFAULT);
        PropertyMetadata {
            name: property.name.name().to_string(),
            declared_type: property.declared_type.clone(),
            default: property.default_value.clone().unwrap_or_default(),
            annotations,
        }
    }
}

fn hint_of(documentation: &Scope) -> String {
    documentation
        .get(&keys::HINT)
        .map(|v| v.to_string())
        .unwrap_or_default()
}

fn from_json(json: serde_json::Value) -> Value {
    match json {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(b),
        serde_json::Value::Number(n) => n.as_f64().map(Value::Number).unwrap_or_default(),
        serde_json::Value::String(s) => Value::from(s),
        serde_json::Value::Array(items) => Value::array(items.into_iter().map(from_json).collect()),
        serde_json::Value::Object(map) => Value::structure(
            map.into_iter()
                .map(|(k, v)| (Key::new(k), from_json(v)))
                .collect::<Scope>(),
        ),
    }
}

impl Runtime {
    /// Reflection record for the level `id`; built once per instance
    pub fn get_metadata(&self, id: InstanceId) -> ObjResult<Arc<ClassMetadata>> {
        let inst = self.instance(id)?;
        inst.metadata
            .get_or_try_init(|| self.build_metadata(id).map(Arc::new))
            .cloned()
    }

    fn build_metadata(&self, id: InstanceId) -> ObjResult<ClassMetadata> {
        let inst = self.instance(id)?;
        let descriptor = &inst.descriptor;
        tracing::debug!(class = %inst.name, instance = %id, "building metadata");

        let extends = match inst.super_instance {
            Some(sup) => Some(Box::new((*self.get_metadata(sup)?).clone())),
            None => None,
        };

        Ok(ClassMetadata {
            name: inst.name.simple_name().to_string(),
            fullname: inst.name.name().to_string(),
            kind: MetadataKind::Component,
            hint: hint_of(&descriptor.documentation),
            output: Some(self.can_output(id)?),
            accessors: Some(self.has_accessors(id)?),
            invoke_implicit_accessor: Some(self.can_invoke_implicit_accessor(id)?),
            functions: descriptor
                .variables_members
                .values()
                .filter_map(Value::as_function)
                .map(|f| FunctionMetadata::of(f.as_ref()))
                .collect(),
            properties: descriptor
                .properties
                .iter()
                .map(|p| PropertyMetadata::of(p))
                .collect(),
            implements: descriptor
                .interface_names
                .iter()
                .map(|k| k.name().to_string())
                .collect(),
            documentation: descriptor.documentation.clone(),
            annotations: descriptor.annotations.clone(),
            extends,
        })
    }

    /// Reflection record for an interface and its super interfaces.
    ///
    /// A cyclic `extends` chain fails with `WiringCycle`.
    pub fn interface_metadata(&self, contract: &Arc<InterfaceContract>) -> ObjResult<ClassMetadata> {
        let chain = self.interface_chain(contract)?;
        // root first; the last entry is `contract` itself
        let ancestors = chain.split_last().map(|(_, rest)| rest).unwrap_or_default();

        let mut extends = None;
        for parent in ancestors {
            extends = Some(Box::new(interface_record(parent, extends)));
        }
        Ok(interface_record(contract, extends))
    }
}

fn interface_record(contract: &InterfaceContract, extends: Option<Box<ClassMetadata>>) -> ClassMetadata {
    let no_docs = Scope::new();
    let functions = contract
        .abstract_methods
        .values()
        .map(|sig| FunctionMetadata::new(sig, &no_docs, &no_docs))
        .chain(contract.default_methods.values().map(|f| FunctionMetadata::of(f.as_ref())))
        .collect();

    ClassMetadata {
        name: contract.name.simple_name().to_string(),
        fullname: contract.name.name().to_string(),
        kind: MetadataKind::Interface,
        hint: hint_of(&contract.documentation),
        output: None,
        accessors: None,
        invoke_implicit_accessor: None,
        functions,
        properties: Vec::new(),
        implements: Vec::new(),
        documentation: contract.documentation.clone(),
        annotations: contract.annotations.clone(),
        extends,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::ClassRegistry;
    use crate::object::ClassDescriptor;
    use strata_sdk::{Argument, Arguments, ScriptFunction};

    #[test]
    fn test_function_metadata_parameters() {
        let f = ScriptFunction::new("greet", |_, _| Ok(Value::Null))
            .argument(Argument::required("name", "string"))
            .argument(Argument::new("loud", "boolean").with_default(false))
            .returns("string")
            .hint("Say hello");
        let meta = FunctionMetadata::of(&f);

        assert_eq!(meta.name, "greet");
        assert_eq!(meta.access, "public");
        assert_eq!(meta.return_type, "string");
        assert_eq!(meta.hint, "Say hello");
        assert_eq!(meta.parameters.len(), 2);
        assert!(meta.parameters[0].required);
        assert_eq!(meta.parameters[1].default, Value::Bool(false));
    }

    #[test]
    fn test_property_metadata_drops_default_annotation() {
        let p = PropertyDefinition::typed("age", "numeric")
            .with_default(3)
            .annotation("inject", true)
            .hint("Age in years");
        let meta = PropertyMetadata::of(&p);

        assert_eq!(meta.default, Value::from(3));
        assert!(meta.annotations.contains_key(&Key::new("inject")));
        assert!(meta.annotations.contains_key(&Key::new("hint")));
        assert!(!meta.annotations.contains_key(&Key::new("default")));
    }

    #[test]
    fn test_metadata_is_memoized() {
        let registry = Arc::new(ClassRegistry::new());
        registry.register_class(ClassDescriptor::builder("Thing").build());
        let mut rt = Runtime::new(registry);
        let id = rt.instantiate(&Key::new("Thing"), Arguments::none()).unwrap();

        let first = rt.get_metadata(id).unwrap();
        let second = rt.get_metadata(id).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.kind, MetadataKind::Component);
        assert_eq!(first.depth(), 0);
    }

    #[test]
    fn test_to_value_is_struct() {
        let registry = Arc::new(ClassRegistry::new());
        registry.register_class(ClassDescriptor::builder("models.Thing").hint("A thing").build());
        let mut rt = Runtime::new(registry);
        let id = rt.instantiate(&Key::new("models.Thing"), Arguments::none()).unwrap();

        let value = rt.get_metadata(id).unwrap().to_value();
        let record = value.as_struct().unwrap();
        assert_eq!(record.get(&Key::new("name")), Some(&Value::from("Thing")));
        assert_eq!(record.get(&Key::new("type")), Some(&Value::from("Component")));
        assert_eq!(record.get(&Key::new("hint")), Some(&Value::from("A thing")));
        assert!(!record.contains_key(&Key::new("extends")));
    }
}
