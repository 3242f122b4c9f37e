//! Accessor synthesis
//!
//! Generated getters and setters are not functions stored in any scope;
//! they are resolved by name from the instance's accessor tables when
//! ordinary lookup fails, and always read or write the bottom class's
//! Variables scope.

use strata_sdk::{Arguments, InstanceId, Key, ObjResult, ObjectError, Value};

use super::core::Runtime;
use super::dispatch::AccessorKind;
use crate::caster;

impl Runtime {
    /// Accessor name a raw `assign`/`dereference` of `key` should be
    /// re-routed to, if any.
    ///
    /// Any declared property re-routes once the implicit-accessor capability
    /// is on, whether or not the accessor exists; a missing one surfaces from
    /// `invoke`. Access from the instance's own executing function stays raw.
    pub(crate) fn implicit_accessor(
        &self,
        id: InstanceId,
        key: &Key,
        kind: AccessorKind,
    ) -> ObjResult<Option<Key>> {
        let inst = self.instance(id)?;
        let Some(property) = inst.properties.get(key) else {
            return Ok(None);
        };
        if self.in_own_frame(id) || !self.can_invoke_implicit_accessor(id)? {
            return Ok(None);
        }
        Ok(Some(match kind {
            AccessorKind::Getter => property.getter_name.clone(),
            AccessorKind::Setter => property.setter_name.clone(),
        }))
    }

    /// Run a generated getter or setter named `name`.
    ///
    /// Returns `Ok(None)` when generated accessors are disabled or `name` is
    /// not an accessor alias.
    pub(crate) fn invoke_generated_accessor(
        &mut self,
        id: InstanceId,
        name: &Key,
        args: &Arguments,
        safe: bool,
    ) -> ObjResult<Option<Value>> {
        if !self.has_accessors(id)? {
            return Ok(None);
        }
        let inst = self.instance(id)?;
        let bottom = self.bottom_class(id);

        if let Some(property) = inst.getter_lookup.get(name).cloned() {
            tracing::trace!(getter = %name, property = %property.name, "generated getter");
            let value = self.instance(bottom)?.variables.dereference(&property.name, safe)?;
            return Ok(Some(value));
        }

        if let Some(property) = inst.setter_lookup.get(name).cloned() {
            tracing::trace!(setter = %name, property = %property.name, "generated setter");
            let Some(raw) = args.first_or_named(&property.name).cloned() else {
                return Err(ObjectError::MissingArgument {
                    function: name.name().to_string(),
                    argument: property.name.name().to_string(),
                });
            };
            let value = if property.is_typed() {
                let is_instance_of =
                    |target: InstanceId, type_name: &str| self.is_instance_of(target, type_name);
                caster::cast(&raw, &property.declared_type, &is_instance_of).ok_or_else(|| {
                    ObjectError::TypeMismatch {
                        method: name.name().to_string(),
                        actual: raw.type_name().to_string(),
                        expected: property.declared_type.clone(),
                    }
                })?
            } else {
                raw
            };
            self.instance_mut(bottom)?
                .variables
                .put(property.name.clone(), value);
            return Ok(Some(Value::Instance(bottom)));
        }

        Ok(None)
    }
}
