//! Class descriptors
//!
//! A [`ClassDescriptor`] is the immutable, loader-produced template an
//! instance is allocated from. [`ClassBuilder`] is how loaders (and tests)
//! assemble one.

use std::fmt;
use std::sync::Arc;

use strata_sdk::{keys, Function, Key, NativeClass, Scope, ScriptFunction, Value};

use super::property::PropertyDefinition;

/// Dialect a class was compiled from; decides the implicit-accessor default
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SourceType {
    /// Modern script source: implicit accessors default on
    #[default]
    Script,
    /// Legacy tag/script source: implicit accessors default off
    Legacy,
}

/// Immutable template for a class's members, properties and annotations
pub struct ClassDescriptor {
    /// Fully-qualified name
    pub name: Key,
    /// Declared properties in declaration order
    pub properties: Vec<Arc<PropertyDefinition>>,
    /// Members placed into This at allocation
    pub this_members: Scope,
    /// Members placed into Variables at allocation
    pub variables_members: Scope,
    /// Members seeding the class's Static scope
    pub static_members: Scope,
    /// Class annotations
    pub annotations: Scope,
    /// Class documentation
    pub documentation: Scope,
    /// Declared super class name
    pub super_name: Option<Key>,
    /// Declared interface names in declaration order
    pub interface_names: Vec<Key>,
    /// Compiled top-level statements of the class body
    pub pseudo_constructor: Option<Arc<dyn Function>>,
    /// Cannot be instantiated directly
    pub is_abstract: bool,
    /// Cannot be extended
    pub is_final: bool,
    /// Source dialect
    pub source_type: SourceType,
    /// Host type this class extends
    pub native_super: Option<Arc<dyn NativeClass>>,
}

impl ClassDescriptor {
    /// Start building a descriptor
    pub fn builder(name: impl Into<Key>) -> ClassBuilder {
        ClassBuilder::new(name)
    }

    /// Names of functions declared in the class body, in declaration order
    pub fn compile_time_method_names(&self) -> Vec<Key> {
        self.variables_members
            .iter()
            .filter(|(_, v)| v.is_callable())
            .map(|(k, _)| k.clone())
            .collect()
    }

    /// Look up a declared property
    pub fn property(&self, name: &Key) -> Option<&Arc<PropertyDefinition>> {
        self.properties.iter().find(|p| p.name == *name)
    }
}

impl fmt::Debug for ClassDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassDescriptor")
            .field("name", &self.name)
            .field("super_name", &self.super_name)
            .field("interfaces", &self.interface_names)
            .field("properties", &self.properties.len())
            .field("is_abstract", &self.is_abstract)
            .field("is_final", &self.is_final)
            .finish()
    }
}

/// Builder for [`ClassDescriptor`]
pub struct ClassBuilder {
    descriptor: ClassDescriptor,
}

impl ClassBuilder {
    /// New builder for a class named `name`
    pub fn new(name: impl Into<Key>) -> Self {
        ClassBuilder {
            descriptor: ClassDescriptor {
                name: name.into(),
                properties: Vec::new(),
                this_members: Scope::new(),
                variables_members: Scope::new(),
                static_members: Scope::new(),
                annotations: Scope::new(),
                documentation: Scope::new(),
                super_name: None,
                interface_names: Vec::new(),
                pseudo_constructor: None,
                is_abstract: false,
                is_final: false,
                source_type: SourceType::Script,
                native_super: None,
            },
        }
    }

    /// Declare the super class
    pub fn extends(mut self, super_name: impl Into<Key>) -> Self {
        let super_name = super_name.into();
        self.descriptor
            .annotations
            .put(keys::EXTENDS.clone(), Value::string(super_name.name()));
        self.descriptor.super_name = Some(super_name);
        self
    }

    /// Declare an implemented interface
    pub fn implements(mut self, interface: impl Into<Key>) -> Self {
        self.descriptor.interface_names.push(interface.into());
        let listed = self
            .descriptor
            .interface_names
            .iter()
            .map(|k| k.name())
            .collect::<Vec<_>>()
            .join(",");
        self.descriptor
            .annotations
            .put(keys::IMPLEMENTS.clone(), Value::string(listed));
        self
    }

    /// Declare a property
    pub fn property(mut self, property: PropertyDefinition) -> Self {
        let property = PropertyDefinition {
            declaring_class: Some(self.descriptor.name.clone()),
            ..property
        };
        self.descriptor.properties.push(Arc::new(property));
        self
    }

    /// Declare a member function; public and remote functions are mirrored into This
    pub fn function(mut self, function: ScriptFunction) -> Self {
        let function = if function.has_declaring_class() {
            function
        } else {
            function.declared_in(self.descriptor.name.clone())
        };
        let name = function.name().clone();
        let public = function.signature().access.is_public();
        let value = Value::Function(Arc::new(function));
        if public {
            self.descriptor.this_members.put(name.clone(), value.clone());
        }
        self.descriptor.variables_members.put(name, value);
        self
    }

    /// Declare a member function implemented outside `ScriptFunction`
    pub fn native_function(mut self, function: Arc<dyn Function>) -> Self {
        let name = function.signature().name.clone();
        if function.signature().access.is_public() {
            self.descriptor
                .this_members
                .put(name.clone(), Value::Function(function.clone()));
        }
        self.descriptor
            .variables_members
            .put(name, Value::Function(function));
        self
    }

    /// Declare a static function
    pub fn static_function(mut self, function: ScriptFunction) -> Self {
        let function = function.declared_in(self.descriptor.name.clone());
        let name = function.name().clone();
        self.descriptor
            .static_members
            .put(name, Value::Function(Arc::new(function)));
        self
    }

    /// Declare a static value
    pub fn static_value(mut self, key: impl Into<Key>, value: impl Into<Value>) -> Self {
        self.descriptor.static_members.put(key, value);
        self
    }

    /// Declare a public field placed directly into This
    pub fn this_value(mut self, key: impl Into<Key>, value: impl Into<Value>) -> Self {
        self.descriptor.this_members.put(key, value);
        self
    }

    /// Add a class annotation
    pub fn annotation(mut self, key: impl Into<Key>, value: impl Into<Value>) -> Self {
        self.descriptor.annotations.put(key, value);
        self
    }

    /// Add a documentation entry
    pub fn documentation(mut self, key: impl Into<Key>, value: impl Into<Value>) -> Self {
        self.descriptor.documentation.put(key, value);
        self
    }

    /// Set the `hint` documentation entry
    pub fn hint(self, text: impl AsRef<str>) -> Self {
        self.documentation(keys::HINT.clone(), Value::string(text))
    }

    /// Set the pseudo-constructor body
    pub fn pseudo_constructor(mut self, body: ScriptFunction) -> Self {
        let body = body.declared_in(self.descriptor.name.clone());
        self.descriptor.pseudo_constructor = Some(Arc::new(body));
        self
    }

    /// Mark abstract
    pub fn abstract_class(mut self) -> Self {
        self.descriptor.is_abstract = true;
        self
    }

    /// Mark final
    pub fn final_class(mut self) -> Self {
        self.descriptor.is_final = true;
        self
    }

    /// Set the source dialect
    pub fn source_type(mut self, source_type: SourceType) -> Self {
        self.descriptor.source_type = source_type;
        self
    }

    /// Extend a host-native type
    pub fn native_super(mut self, native: Arc<dyn NativeClass>) -> Self {
        self.descriptor.native_super = Some(native);
        self
    }

    /// Finish building
    pub fn build(self) -> ClassDescriptor {
        self.descriptor
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_sdk::Access;

    fn noop(name: &str) -> ScriptFunction {
        ScriptFunction::new(name, |_, _| Ok(Value::Null))
    }

    #[test]
    fn test_member_placement_by_access() {
        let desc = ClassDescriptor::builder("Widget")
            .function(noop("render"))
            .function(noop("layout").access(Access::Private))
            .static_function(noop("create"))
            .build();

        assert!(desc.this_members.contains_key(&Key::new("render")));
        assert!(!desc.this_members.contains_key(&Key::new("layout")));
        assert!(desc.variables_members.contains_key(&Key::new("layout")));
        assert!(desc.static_members.contains_key(&Key::new("create")));
        assert_eq!(
            desc.compile_time_method_names(),
            vec![Key::new("render"), Key::new("layout")]
        );
    }

    #[test]
    fn test_functions_record_declaring_class() {
        let desc = ClassDescriptor::builder("Widget")
            .function(noop("render"))
            .build();
        let render = desc.variables_members.get(&Key::new("render")).cloned();
        let render = render.and_then(|v| v.as_function().cloned()).unwrap();
        assert_eq!(render.declaring_class(), Some(&Key::new("widget")));
    }

    #[test]
    fn test_extends_and_implements_annotations() {
        let desc = ClassDescriptor::builder("Dog")
            .extends("Animal")
            .implements("Walker")
            .implements("Barker")
            .build();
        assert_eq!(desc.super_name, Some(Key::new("animal")));
        assert_eq!(
            desc.annotations.get(&Key::new("implements")),
            Some(&Value::from("Walker,Barker"))
        );
        assert_eq!(
            desc.annotations.get(&Key::new("extends")),
            Some(&Value::from("Animal"))
        );
    }

    #[test]
    fn test_properties_record_declaring_class() {
        let desc = ClassDescriptor::builder("User")
            .property(PropertyDefinition::typed("age", "numeric"))
            .build();
        let age = desc.property(&Key::new("AGE")).unwrap();
        assert_eq!(age.declaring_class, Some(Key::new("User")));
    }
}
