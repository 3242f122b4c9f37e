//! Inheritance wiring
//!
//! Inheritance is emulated by flattening: once a super level has finished
//! its pseudo-constructor, its scopes, properties, accessor tables and
//! annotations are copied down into the sub level with add-if-absent
//! semantics. The sub level's own initializer then runs and shadows
//! whatever it assigns.

use strata_sdk::{keys, InstanceId, ObjResult, ObjectError};

use super::core::Runtime;
use crate::defaults::RESERVED_SUPER_NAMES;

impl Runtime {
    /// Link `sub` to `sup` and flatten `sup`'s members into `sub`.
    pub fn wire_super(&mut self, sub: InstanceId, sup: InstanceId) -> ObjResult<()> {
        self.check_wirable(sub, sup)?;

        let (sub_inst, sup_inst) = self.pair_mut(sub, sup)?;
        sup_inst.child = Some(sub);
        sub_inst.super_instance = Some(sup);

        sub_inst.variables.add_all_absent(&sup_inst.variables);
        sub_inst.this.add_all_absent(&sup_inst.this);

        for (name, property) in &sup_inst.properties {
            if !sub_inst.properties.contains_key(name) {
                sub_inst.properties.insert(name.clone(), property.clone());
            }
        }
        for (name, property) in &sup_inst.getter_lookup {
            sub_inst
                .getter_lookup
                .entry(name.clone())
                .or_insert_with(|| property.clone());
        }
        for (name, property) in &sup_inst.setter_lookup {
            sub_inst
                .setter_lookup
                .entry(name.clone())
                .or_insert_with(|| property.clone());
        }

        for (key, value) in sup_inst.annotations.iter() {
            if *key == *keys::EXTENDS || *key == *keys::IMPLEMENTS {
                continue;
            }
            sub_inst.annotations.put_if_absent(key, value);
        }

        tracing::debug!(
            sub = %sub_inst.name,
            sup = %sup_inst.name,
            "wired super class"
        );
        Ok(())
    }

    fn check_wirable(&self, sub: InstanceId, sup: InstanceId) -> ObjResult<()> {
        let sub_inst = self.instance(sub)?;
        let sup_inst = self.instance(sup)?;

        if RESERVED_SUPER_NAMES
            .iter()
            .any(|reserved| sup_inst.name.matches(reserved))
        {
            return Err(ObjectError::ReservedName {
                class: sub_inst.name.name().to_string(),
                name: sup_inst.name.name().to_string(),
            });
        }
        if sub_inst.super_instance.is_some() {
            return Err(ObjectError::AlreadyWired {
                class: sub_inst.name.name().to_string(),
            });
        }
        if sup_inst.child.is_some() {
            return Err(ObjectError::AlreadyWired {
                class: sup_inst.name.name().to_string(),
            });
        }

        let mut chain = vec![sub_inst.name.name().to_string()];
        let mut current = Some(sup);
        while let Some(id) = current {
            let inst = self.instance(id)?;
            chain.push(inst.name.name().to_string());
            if id == sub || inst.name == sub_inst.name {
                return Err(ObjectError::WiringCycle {
                    class: sub_inst.name.name().to_string(),
                    chain: chain.join(" -> "),
                });
            }
            current = inst.super_instance;
        }
        Ok(())
    }

    fn pair_mut(
        &mut self,
        a: InstanceId,
        b: InstanceId,
    ) -> ObjResult<(&mut crate::object::Instance, &mut crate::object::Instance)> {
        if a == b {
            return Err(ObjectError::WiringCycle {
                class: self.instance(a)?.name.name().to_string(),
                chain: "self".to_string(),
            });
        }
        self.instance(a)?;
        self.instance(b)?;
        let instances = self.instances_mut();
        let (lo, hi) = (a.index().min(b.index()), a.index().max(b.index()));
        let (left, right) = instances.split_at_mut(hi);
        let (lo_ref, hi_ref) = (&mut left[lo], &mut right[0]);
        if a.index() < b.index() {
            Ok((lo_ref, hi_ref))
        } else {
            Ok((hi_ref, lo_ref))
        }
    }
}
