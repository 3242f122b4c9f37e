//! Type queries against live instances

use strata_sdk::{InstanceId, Key};

use crate::interpreter::Runtime;

impl Runtime {
    /// Whether the object `id` belongs to is a `type_name`.
    ///
    /// Matches the full or simple class name of every level from the bottom
    /// up, and every interface registered on those levels together with its
    /// super interfaces.
    pub fn is_instance_of(&self, id: InstanceId, type_name: &str) -> bool {
        let type_name = type_name.trim();
        let names_match =
            |name: &Key| name.matches(type_name) || name.simple_name().eq_ignore_ascii_case(type_name);

        let mut current = Some(self.bottom_class(id));
        while let Some(level) = current {
            let Ok(inst) = self.instance(level) else {
                return false;
            };
            if names_match(&inst.name) {
                return true;
            }
            for contract in &inst.interfaces {
                let chain = self
                    .interface_chain(contract)
                    .unwrap_or_else(|_| vec![contract.clone()]);
                if chain.iter().any(|c| names_match(&c.name)) {
                    return true;
                }
            }
            current = inst.super_instance;
        }
        false
    }

    /// Class names from the bottom class up to the root
    pub fn class_hierarchy(&self, id: InstanceId) -> Vec<Key> {
        let mut names = Vec::new();
        let mut current = Some(self.bottom_class(id));
        while let Some(level) = current {
            match self.instance(level) {
                Ok(inst) => {
                    names.push(inst.name.clone());
                    current = inst.super_instance;
                }
                Err(_) => break,
            }
        }
        names
    }
}
