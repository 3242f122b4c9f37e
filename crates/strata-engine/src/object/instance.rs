//! Live instances
//!
//! One [`Instance`] exists per hierarchy level of a constructed object: a
//! `C extends B extends A` object is three instances linked through
//! `super_instance` / `child`. Links are arena handles, never owning
//! references.

use std::sync::Arc;

use indexmap::IndexMap;
use once_cell::sync::OnceCell;
use rustc_hash::FxHashMap;
use strata_sdk::{ClassId, InstanceId, Key, NativeObject, Scope};

use super::class::ClassDescriptor;
use super::interface::InterfaceContract;
use super::property::PropertyDefinition;
use crate::reflect::ClassMetadata;

/// Memoized capability flags.
///
/// Each flag is computed at most once; `OnceCell` gives a lock-free read
/// once set and serializes racing first computations.
#[derive(Debug, Default)]
pub struct CapabilityFlags {
    pub(crate) can_output: OnceCell<bool>,
    pub(crate) can_invoke_implicit_accessor: OnceCell<bool>,
}

impl CapabilityFlags {
    /// Cached `canOutput`, `None` while unset
    pub fn can_output(&self) -> Option<bool> {
        self.can_output.get().copied()
    }

    /// Cached `canInvokeImplicitAccessor`, `None` while unset
    pub fn can_invoke_implicit_accessor(&self) -> Option<bool> {
        self.can_invoke_implicit_accessor.get().copied()
    }
}

/// One level of a live object
#[derive(Debug)]
pub struct Instance {
    /// Class name
    pub name: Key,
    /// Descriptor identity
    pub class_id: ClassId,
    /// Descriptor this level was allocated from
    pub descriptor: Arc<ClassDescriptor>,
    /// Public members
    pub this: Scope,
    /// Internal members
    pub variables: Scope,
    /// Declared and inherited properties
    pub properties: IndexMap<Key, Arc<PropertyDefinition>>,
    /// Getter name -> property
    pub getter_lookup: FxHashMap<Key, Arc<PropertyDefinition>>,
    /// Setter name -> property
    pub setter_lookup: FxHashMap<Key, Arc<PropertyDefinition>>,
    /// Own and inherited annotations
    pub annotations: Scope,
    /// Class documentation
    pub documentation: Scope,
    /// Level one up
    pub super_instance: Option<InstanceId>,
    /// Level one down
    pub child: Option<InstanceId>,
    /// Registered interfaces in registration order
    pub interfaces: Vec<Arc<InterfaceContract>>,
    /// Host object for classes extending a native type
    pub native: Option<Arc<dyn NativeObject>>,
    pub(crate) flags: CapabilityFlags,
    pub(crate) metadata: OnceCell<Arc<ClassMetadata>>,
}

impl Instance {
    /// Allocate a level from its descriptor: declared members, properties
    /// and accessor tables are in place, links are empty.
    pub fn new(class_id: ClassId, descriptor: Arc<ClassDescriptor>) -> Self {
        let mut properties = IndexMap::with_capacity(descriptor.properties.len());
        let mut getter_lookup = FxHashMap::default();
        let mut setter_lookup = FxHashMap::default();
        for property in &descriptor.properties {
            properties.insert(property.name.clone(), property.clone());
            if property.generates_getter() {
                getter_lookup.insert(property.getter_name.clone(), property.clone());
            }
            if property.generates_setter() {
                setter_lookup.insert(property.setter_name.clone(), property.clone());
            }
        }
        let native = descriptor.native_super.as_ref().map(|n| n.instantiate());

        Instance {
            name: descriptor.name.clone(),
            class_id,
            this: descriptor.this_members.clone(),
            variables: descriptor.variables_members.clone(),
            properties,
            getter_lookup,
            setter_lookup,
            annotations: descriptor.annotations.clone(),
            documentation: descriptor.documentation.clone(),
            super_instance: None,
            child: None,
            interfaces: Vec::new(),
            native,
            flags: CapabilityFlags::default(),
            metadata: OnceCell::new(),
            descriptor,
        }
    }

    /// Memoized capability flags
    pub fn flags(&self) -> &CapabilityFlags {
        &self.flags
    }

    /// Whether `name` is a declared or inherited property
    pub fn has_property(&self, name: &Key) -> bool {
        self.properties.contains_key(name)
    }
}
