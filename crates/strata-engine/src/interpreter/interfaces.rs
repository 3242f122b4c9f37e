//! Interface contracts at runtime
//!
//! Validation happens when an interface is registered on an instance, never
//! at dispatch time. Default methods are mixed in add-if-absent, so among
//! several interfaces supplying the same default the first registered wins.

use std::sync::Arc;

use indexmap::IndexMap;
use strata_sdk::{keys, Function, InstanceId, Key, ObjResult, ObjectError, Signature, Value};

use super::core::Runtime;
use crate::object::InterfaceContract;

impl Runtime {
    /// Check that `id` satisfies every abstract method of `contract` and its
    /// super interfaces.
    ///
    /// A class defining `onMissingMethod` satisfies any interface.
    pub fn validate_interface(&self, id: InstanceId, contract: &Arc<InterfaceContract>) -> ObjResult<()> {
        let inst = self.instance(id)?;
        if inst
            .this
            .get(&keys::ON_MISSING_METHOD)
            .is_some_and(|v| v.is_callable())
        {
            return Ok(());
        }

        for (name, required) in self.all_abstract_methods(contract)? {
            let found = match inst.this.get(&name) {
                Some(Value::Function(function)) => function.signature(),
                _ => {
                    return Err(ObjectError::InterfaceNotSatisfied {
                        class: inst.name.name().to_string(),
                        interface: contract.name.name().to_string(),
                        signature: required.to_string(),
                        found: None,
                    })
                }
            };
            if !found.implements(&required) {
                return Err(ObjectError::InterfaceNotSatisfied {
                    class: inst.name.name().to_string(),
                    interface: contract.name.name().to_string(),
                    signature: required.to_string(),
                    found: Some(found.to_string()),
                });
            }
        }
        Ok(())
    }

    /// Validate, record and mix in `contract`'s default methods
    pub fn register_interface(&mut self, id: InstanceId, contract: Arc<InterfaceContract>) -> ObjResult<()> {
        self.validate_interface(id, &contract)?;
        self.mix_in_interface(id, contract)
    }

    fn mix_in_interface(&mut self, id: InstanceId, contract: Arc<InterfaceContract>) -> ObjResult<()> {
        let defaults = self.all_default_methods(&contract)?;
        let inst = self.instance_mut(id)?;

        for (name, function) in defaults {
            let public = function.signature().access.is_public();
            let value = Value::Function(function);
            if !inst.variables.put_if_absent(&name, &value) {
                tracing::debug!(
                    class = %inst.name,
                    interface = %contract.name,
                    method = %name,
                    "default method shadowed by existing member"
                );
            }
            if public {
                inst.this.put_if_absent(&name, &value);
            }
        }

        tracing::debug!(class = %inst.name, interface = %contract.name, "registered interface");
        inst.interfaces.push(contract);
        Ok(())
    }

    /// Register the interfaces `id`'s class declares, in declaration order.
    ///
    /// Abstract levels are not validated here; a concrete descendant is
    /// checked by [`Runtime::validate_inherited_interfaces`].
    pub(crate) fn register_declared_interfaces(&mut self, id: InstanceId) -> ObjResult<()> {
        let descriptor = self.instance(id)?.descriptor.clone();
        for name in &descriptor.interface_names {
            let contract = self.registry().resolve_interface(name)?;
            if descriptor.is_abstract {
                self.mix_in_interface(id, contract)?;
            } else {
                self.register_interface(id, contract)?;
            }
        }
        Ok(())
    }

    /// Validate the concrete level against interfaces registered on its
    /// abstract ancestors
    pub(crate) fn validate_inherited_interfaces(&self, bottom: InstanceId) -> ObjResult<()> {
        let mut current = self.super_instance(bottom);
        while let Some(level) = current {
            let inst = self.instance(level)?;
            if inst.descriptor.is_abstract {
                for contract in &inst.interfaces {
                    self.validate_interface(bottom, contract)?;
                }
            }
            current = inst.super_instance;
        }
        Ok(())
    }

    /// `contract` and its super interfaces, root first
    pub fn interface_chain(&self, contract: &Arc<InterfaceContract>) -> ObjResult<Vec<Arc<InterfaceContract>>> {
        let mut chain = vec![contract.clone()];
        let mut next = contract.super_name.clone();
        while let Some(name) = next {
            if chain.iter().any(|c| c.name == name) {
                let names: Vec<&str> = chain.iter().map(|c| c.name.name()).collect();
                return Err(ObjectError::WiringCycle {
                    class: name.name().to_string(),
                    chain: names.join(" -> "),
                });
            }
            let parent = self.registry().resolve_interface(&name)?;
            next = parent.super_name.clone();
            chain.push(parent);
        }
        chain.reverse();
        Ok(chain)
    }

    /// Abstract methods of `contract` merged over its super interfaces'
    pub fn all_abstract_methods(&self, contract: &Arc<InterfaceContract>) -> ObjResult<IndexMap<Key, Signature>> {
        let mut merged = IndexMap::new();
        for level in self.interface_chain(contract)? {
            for (name, signature) in &level.abstract_methods {
                merged.insert(name.clone(), signature.clone());
            }
        }
        Ok(merged)
    }

    /// Default methods of `contract` merged over its super interfaces'
    pub fn all_default_methods(
        &self,
        contract: &Arc<InterfaceContract>,
    ) -> ObjResult<IndexMap<Key, Arc<dyn Function>>> {
        let mut merged = IndexMap::new();
        for level in self.interface_chain(contract)? {
            for (name, function) in &level.default_methods {
                merged.insert(name.clone(), function.clone());
            }
        }
        Ok(merged)
    }
}
