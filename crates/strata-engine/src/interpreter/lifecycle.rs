//! Instantiation lifecycle
//!
//! `instantiate(C)` allocates one level per class in C's super chain,
//! constructing the topmost ancestor first: each level is allocated, wired
//! to its fully-constructed super, pseudo-constructed and has its declared
//! interfaces registered before the level below it starts. The `init`
//! convention runs last, on the concrete level.

use std::sync::Arc;

use strata_sdk::{keys, Arguments, ClassId, InstanceId, Key, ObjResult, ObjectError, Receiver, Value};

use super::core::Runtime;
use crate::defaults::RESERVED_SUPER_NAMES;
use crate::object::ClassDescriptor;

impl Runtime {
    /// `new ClassName(args)`
    pub fn instantiate(&mut self, class_name: &Key, args: Arguments) -> ObjResult<InstanceId> {
        let (class_id, descriptor) = self.registry().resolve_class(class_name)?;
        if descriptor.is_abstract {
            return Err(ObjectError::AbstractInstantiation {
                class: descriptor.name.name().to_string(),
            });
        }

        let mut chain = Vec::new();
        let id = self.construct_level(class_id, descriptor, &mut chain)?;
        self.validate_inherited_interfaces(id)?;

        let has_init = self
            .instance(id)?
            .this
            .get(&keys::INIT)
            .is_some_and(|v| v.is_callable());
        if has_init {
            self.invoke(id, &keys::INIT, args, false)?;
        }

        tracing::debug!(class = %class_name, instance = %id, "instantiated");
        Ok(id)
    }

    fn construct_level(
        &mut self,
        class_id: ClassId,
        descriptor: Arc<ClassDescriptor>,
        chain: &mut Vec<Key>,
    ) -> ObjResult<InstanceId> {
        if chain.contains(&descriptor.name) {
            let mut names: Vec<&str> = chain.iter().map(|k| k.name()).collect();
            names.push(descriptor.name.name());
            return Err(ObjectError::WiringCycle {
                class: descriptor.name.name().to_string(),
                chain: names.join(" -> "),
            });
        }
        chain.push(descriptor.name.clone());

        let id = self.allocate(class_id, descriptor.clone());
        tracing::debug!(class = %descriptor.name, instance = %id, "allocated level");

        if let Some(super_name) = &descriptor.super_name {
            if RESERVED_SUPER_NAMES.iter().any(|r| super_name.matches(r)) {
                return Err(ObjectError::ReservedName {
                    class: descriptor.name.name().to_string(),
                    name: super_name.name().to_string(),
                });
            }
            let (super_id, super_descriptor) = self.registry().resolve_class(super_name)?;
            if super_descriptor.is_final {
                return Err(ObjectError::FinalExtension {
                    class: descriptor.name.name().to_string(),
                    super_class: super_descriptor.name.name().to_string(),
                });
            }
            let sup = self.construct_level(super_id, super_descriptor, chain)?;
            self.wire_super(id, sup)?;
        }

        self.pseudo_construct(id, &descriptor)?;
        self.register_declared_interfaces(id)?;

        chain.pop();
        Ok(id)
    }

    /// Property defaults declared by this level, then the class body.
    fn pseudo_construct(&mut self, id: InstanceId, descriptor: &ClassDescriptor) -> ObjResult<()> {
        let inst = self.instance_mut(id)?;
        for property in &descriptor.properties {
            let default = property.default_value.clone().unwrap_or(Value::Null);
            inst.variables.put(property.name.clone(), default);
        }

        let Some(body) = descriptor.pseudo_constructor.clone() else {
            return Ok(());
        };
        let name = Key::new("pseudoConstructor");
        let receiver = Receiver::Instance {
            this: id,
            declaring: id,
        };
        self.with_template(id, |rt| {
            rt.call_function(body, &name, Arguments::none(), receiver)
                .map(|_| ())
        })
    }
}
