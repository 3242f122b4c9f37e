//! Dispatch resolution
//!
//! `assign`, `dereference` and `invoke` resolve a [`Key`] against an
//! instance through an ordered fallback chain. Safe mode turns the two
//! absent-member failures into `Value::Null`; every other failure raises.

use strata_sdk::{
    keys, Arguments, ClassId, InstanceId, Key, ObjResult, ObjectError, Receiver, Scope, Value,
};

use super::core::Runtime;

impl Runtime {
    /// `instance.key = value`
    pub fn assign(&mut self, id: InstanceId, key: &Key, value: Value) -> ObjResult<Value> {
        let id = self.bottom_class(id);

        if let Some(setter) = self.implicit_accessor(id, key, AccessorKind::Setter)? {
            tracing::trace!(key = %key, setter = %setter, "assign through implicit setter");
            return self.invoke(id, &setter, Arguments::positional([value]), false);
        }

        let class_id = self.instance(id)?.class_id;
        let in_this = self.instance(id)?.this.contains_key(key);
        if !in_this && self.statics(class_id).is_some_and(|s| s.contains_key(key)) {
            tracing::trace!(key = %key, "assign redirected to static scope");
            self.statics_mut(class_id)?.put(key.clone(), value.clone());
            return Ok(value);
        }

        self.instance_mut(id)?.this.put(key.clone(), value.clone());
        Ok(value)
    }

    /// `instance.key`, or `instance?.key` when `safe`
    pub fn dereference(&mut self, id: InstanceId, key: &Key, safe: bool) -> ObjResult<Value> {
        if *key == *keys::BX_META {
            return Ok(self.get_metadata(id)?.to_value());
        }

        let id = self.bottom_class(id);

        if let Some(getter) = self.implicit_accessor(id, key, AccessorKind::Getter)? {
            tracing::trace!(key = %key, getter = %getter, "dereference through implicit getter");
            return self.invoke(id, &getter, Arguments::none(), false);
        }

        let inst = self.instance(id)?;
        if let Some(value) = inst.this.get(key) {
            return Ok(value.clone());
        }
        if let Some(value) = self.statics(inst.class_id).and_then(|s| s.get(key)) {
            return Ok(value.clone());
        }
        if let Some(native) = &inst.native {
            if let Some(value) = native.get(key) {
                tracing::trace!(key = %key, native = native.type_name(), "dereference via native super");
                return Ok(value);
            }
        }

        if safe {
            return Ok(Value::Null);
        }
        Err(ObjectError::KeyNotFound {
            key: key.name().to_string(),
            valid_keys: inst.this.keys_as_string(),
        })
    }

    /// `instance.name(args)`, or `instance?.name(args)` when `safe`
    pub fn invoke(
        &mut self,
        id: InstanceId,
        name: &Key,
        args: Arguments,
        safe: bool,
    ) -> ObjResult<Value> {
        let inst = self.instance(id)?;

        // a level with a child is being reached through super.*; its
        // Variables hold the level-local definitions
        let scope: &Scope = if inst.child.is_some() {
            &inst.variables
        } else {
            &inst.this
        };

        match scope.get(name) {
            Some(Value::Function(function)) => {
                let function = function.clone();
                let receiver = Receiver::Instance {
                    this: self.bottom_class(id),
                    declaring: self.declaring_level(id, function.as_ref()),
                };
                return self.call_function(function, name, args, receiver);
            }
            Some(other) if !other.is_null() => {
                return Err(ObjectError::NotCallable {
                    key: name.name().to_string(),
                    type_name: other.type_name().to_string(),
                });
            }
            _ => {}
        }

        let class_id = inst.class_id;
        if let Some(value) = self.statics(class_id).and_then(|s| s.get(name)) {
            match value {
                Value::Function(function) => {
                    let function = function.clone();
                    tracing::trace!(method = %name, "invoke resolved in static scope");
                    return self.call_function(function, name, args, Receiver::Static(class_id));
                }
                Value::Null => {}
                other => {
                    return Err(ObjectError::NotCallable {
                        key: name.name().to_string(),
                        type_name: other.type_name().to_string(),
                    });
                }
            }
        }

        if let Some(result) = self.invoke_generated_accessor(id, name, &args, safe)? {
            return Ok(result);
        }

        let inst = self.instance(id)?;
        // This holds the handler even on levels whose Variables lack it
        match inst.this.get(&keys::ON_MISSING_METHOD) {
            Some(Value::Function(handler)) => {
                let handler = handler.clone();
                tracing::trace!(method = %name, "invoke falling back to onMissingMethod");
                let mut missing = Scope::with_capacity(2);
                missing.put(keys::MISSING_METHOD_NAME.clone(), Value::string(name.name()));
                missing.put(
                    keys::MISSING_METHOD_ARGUMENTS.clone(),
                    Value::structure(args.to_scope()),
                );
                let receiver = Receiver::Instance {
                    this: self.bottom_class(id),
                    declaring: self.declaring_level(id, handler.as_ref()),
                };
                return self.call_function(
                    handler,
                    &keys::ON_MISSING_METHOD,
                    Arguments::Named(missing),
                    receiver,
                );
            }
            Some(other) if !other.is_null() => {
                return Err(ObjectError::NotCallable {
                    key: keys::ON_MISSING_METHOD.name().to_string(),
                    type_name: other.type_name().to_string(),
                });
            }
            _ => {}
        }

        if let Some(native) = inst.native.clone() {
            if let Some(result) = native.call(name, &args) {
                tracing::trace!(method = %name, native = native.type_name(), "invoke via native super");
                return result;
            }
        }

        if safe {
            return Ok(Value::Null);
        }
        Err(ObjectError::MethodNotFound {
            name: name.name().to_string(),
        })
    }

    // ========================================================================
    // Static access
    // ========================================================================

    /// `Class::key = value`
    pub fn assign_static(&mut self, class: ClassId, key: &Key, value: Value) -> ObjResult<Value> {
        self.statics_mut(class)?.put(key.clone(), value.clone());
        Ok(value)
    }

    /// `Class::key`, or `Class?::key` when `safe`
    pub fn dereference_static(&mut self, class: ClassId, key: &Key, safe: bool) -> ObjResult<Value> {
        self.statics_mut(class)?.dereference(key, safe)
    }

    /// `Class::name(args)`
    pub fn invoke_static(&mut self, class: ClassId, name: &Key, args: Arguments) -> ObjResult<Value> {
        match self.statics_mut(class)?.get(name) {
            Some(Value::Function(function)) => {
                let function = function.clone();
                self.call_function(function, name, args, Receiver::Static(class))
            }
            Some(other) if !other.is_null() => Err(ObjectError::NotCallable {
                key: name.name().to_string(),
                type_name: other.type_name().to_string(),
            }),
            _ => Err(ObjectError::MethodNotFound {
                name: name.name().to_string(),
            }),
        }
    }
}

/// Which generated accessor a raw scope access maps to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AccessorKind {
    Getter,
    Setter,
}
