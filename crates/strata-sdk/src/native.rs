//! Host-native interop
//!
//! A class may declare that it extends a type provided by the host. Lookups
//! that fail locally are delegated to the host object created for each
//! instance; how the host marshals those calls is its own business.

use std::fmt;
use std::sync::Arc;

use crate::error::ObjResult;
use crate::function::Arguments;
use crate::key::Key;
use crate::value::Value;

/// A host type a class can extend
pub trait NativeClass: Send + Sync {
    /// Host type name
    fn type_name(&self) -> &str;

    /// Create the host object backing one instance
    fn instantiate(&self) -> Arc<dyn NativeObject>;
}

/// Host object backing one instance
pub trait NativeObject: Send + Sync {
    /// Host type name
    fn type_name(&self) -> &str;

    /// Field or property lookup; `None` when the host has no such member
    fn get(&self, key: &Key) -> Option<Value>;

    /// Method call; `None` when the host has no such method
    fn call(&self, name: &Key, args: &Arguments) -> Option<ObjResult<Value>>;
}

impl fmt::Debug for dyn NativeClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NativeClass({})", self.type_name())
    }
}

impl fmt::Debug for dyn NativeObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NativeObject({})", self.type_name())
    }
}
