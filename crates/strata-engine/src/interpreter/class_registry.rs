//! Class and interface registry
//!
//! Loaders register descriptors here; runtimes resolve super classes and
//! interfaces by name at instantiation time. The registry sits behind a
//! `RwLock` so one `Arc<ClassRegistry>` can serve several runtimes.

use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use strata_sdk::{ClassId, Key, ObjResult, ObjectError};

use crate::object::{ClassDescriptor, InterfaceContract};

#[derive(Default)]
struct RegistryInner {
    /// Descriptors indexed by ID
    classes: Vec<Arc<ClassDescriptor>>,
    /// Class name to ID mapping
    name_to_id: FxHashMap<Key, ClassId>,
    /// Interface contracts by name
    interfaces: FxHashMap<Key, Arc<InterfaceContract>>,
}

/// Registry of class descriptors and interface contracts
#[derive(Default)]
pub struct ClassRegistry {
    inner: RwLock<RegistryInner>,
}

impl ClassRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a class descriptor.
    ///
    /// Re-registering a name gives it a fresh ID; instances allocated from the
    /// old descriptor keep theirs.
    pub fn register_class(&self, descriptor: ClassDescriptor) -> ClassId {
        let mut inner = self.inner.write();
        let id = ClassId(inner.classes.len() as u32);
        let name = descriptor.name.clone();

        inner.classes.push(Arc::new(descriptor));
        inner.name_to_id.insert(name, id);

        id
    }

    /// Register an interface contract
    pub fn register_interface(&self, contract: InterfaceContract) -> Arc<InterfaceContract> {
        let contract = Arc::new(contract);
        self.inner
            .write()
            .interfaces
            .insert(contract.name.clone(), contract.clone());
        contract
    }

    /// Get class by ID
    pub fn get_class(&self, id: ClassId) -> Option<Arc<ClassDescriptor>> {
        self.inner.read().classes.get(id.index()).cloned()
    }

    /// Get class by name
    pub fn get_class_by_name(&self, name: &Key) -> Option<(ClassId, Arc<ClassDescriptor>)> {
        let inner = self.inner.read();
        let id = *inner.name_to_id.get(name)?;
        inner.classes.get(id.index()).map(|d| (id, d.clone()))
    }

    /// Resolve a class by name, failing with `ClassNotFound`
    pub fn resolve_class(&self, name: &Key) -> ObjResult<(ClassId, Arc<ClassDescriptor>)> {
        self.get_class_by_name(name)
            .ok_or_else(|| ObjectError::ClassNotFound {
                name: name.name().to_string(),
            })
    }

    /// Get interface by name
    pub fn get_interface(&self, name: &Key) -> Option<Arc<InterfaceContract>> {
        self.inner.read().interfaces.get(name).cloned()
    }

    /// Resolve an interface by name, failing with `InterfaceNotFound`
    pub fn resolve_interface(&self, name: &Key) -> ObjResult<Arc<InterfaceContract>> {
        self.get_interface(name)
            .ok_or_else(|| ObjectError::InterfaceNotFound {
                name: name.name().to_string(),
            })
    }

    /// Get next available class ID
    pub fn next_class_id(&self) -> ClassId {
        ClassId(self.inner.read().classes.len() as u32)
    }

    /// Number of registered classes
    pub fn class_count(&self) -> usize {
        self.inner.read().classes.len()
    }
}

impl std::fmt::Debug for ClassRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.read();
        f.debug_struct("ClassRegistry")
            .field("classes", &inner.classes.len())
            .field("interfaces", &inner.interfaces.len())
            .finish()
    }
}
