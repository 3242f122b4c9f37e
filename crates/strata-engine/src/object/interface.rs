//! Interface contracts

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use strata_sdk::{keys, Function, Key, Scope, ScriptFunction, Signature, Value};

/// Abstract methods an implementer must provide plus default methods mixed
/// into it. Compiled once and shared by reference.
pub struct InterfaceContract {
    /// Interface name
    pub name: Key,
    /// Super interface name
    pub super_name: Option<Key>,
    /// Abstract method signatures in declaration order
    pub abstract_methods: IndexMap<Key, Signature>,
    /// Default methods in declaration order
    pub default_methods: IndexMap<Key, Arc<dyn Function>>,
    /// Interface annotations
    pub annotations: Scope,
    /// Interface documentation
    pub documentation: Scope,
}

impl InterfaceContract {
    /// Start building a contract
    pub fn builder(name: impl Into<Key>) -> InterfaceBuilder {
        InterfaceBuilder {
            contract: InterfaceContract {
                name: name.into(),
                super_name: None,
                abstract_methods: IndexMap::new(),
                default_methods: IndexMap::new(),
                annotations: Scope::new(),
                documentation: Scope::new(),
            },
        }
    }
}

impl fmt::Debug for InterfaceContract {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InterfaceContract")
            .field("name", &self.name)
            .field("super_name", &self.super_name)
            .field("abstract_methods", &self.abstract_methods.keys().collect::<Vec<_>>())
            .field("default_methods", &self.default_methods.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Builder for [`InterfaceContract`]
pub struct InterfaceBuilder {
    contract: InterfaceContract,
}

impl InterfaceBuilder {
    /// Extend another interface
    pub fn extends(mut self, super_name: impl Into<Key>) -> Self {
        let super_name = super_name.into();
        self.contract
            .annotations
            .put(keys::EXTENDS.clone(), Value::string(super_name.name()));
        self.contract.super_name = Some(super_name);
        self
    }

    /// Require a method
    pub fn abstract_method(mut self, signature: Signature) -> Self {
        self.contract
            .abstract_methods
            .insert(signature.name.clone(), signature);
        self
    }

    /// Provide a default method
    pub fn default_method(mut self, function: ScriptFunction) -> Self {
        let function = function.declared_in(self.contract.name.clone());
        self.contract
            .default_methods
            .insert(function.name().clone(), Arc::new(function));
        self
    }

    /// Add an annotation
    pub fn annotation(mut self, key: impl Into<Key>, value: impl Into<Value>) -> Self {
        self.contract.annotations.put(key, value);
        self
    }

    /// Set the `hint` documentation entry
    pub fn hint(mut self, text: impl AsRef<str>) -> Self {
        self.contract
            .documentation
            .put(keys::HINT.clone(), Value::string(text));
        self
    }

    /// Finish building
    pub fn build(self) -> InterfaceContract {
        self.contract
    }
}
