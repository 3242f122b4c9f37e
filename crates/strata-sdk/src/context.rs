//! ObjectContext trait: abstract object-model operations
//!
//! Defines the interface the Strata runtime implements. Function bodies and
//! host adapters program against this trait without depending on engine
//! internals.

use crate::error::ObjResult;
use crate::function::Arguments;
use crate::key::Key;
use crate::scope::Scope;
use crate::value::{ClassId, InstanceId, Value};

/// Abstract runtime handed to every executing [`Function`](crate::Function).
///
/// Dispatch methods follow the full resolution order (accessors, static
/// scope, `onMissingMethod`, native fallback). Scope accessors bypass
/// dispatch and touch the raw scope of exactly the addressed instance.
pub trait ObjectContext {
    // ========================================================================
    // Dispatch
    // ========================================================================

    /// `target.key = value`
    fn assign(&mut self, target: InstanceId, key: &Key, value: Value) -> ObjResult<Value>;

    /// `target.key`, or `target?.key` when `safe`
    fn dereference(&mut self, target: InstanceId, key: &Key, safe: bool) -> ObjResult<Value>;

    /// `target.name(args)`, or `target?.name(args)` when `safe`
    fn invoke(
        &mut self,
        target: InstanceId,
        name: &Key,
        args: Arguments,
        safe: bool,
    ) -> ObjResult<Value>;

    /// `Class::name(args)`
    fn invoke_static(&mut self, class: ClassId, name: &Key, args: Arguments) -> ObjResult<Value>;

    /// `new Class(args)`
    fn instantiate(&mut self, class_name: &Key, args: Arguments) -> ObjResult<InstanceId>;

    // ========================================================================
    // Scopes
    // ========================================================================

    /// Variables scope of `target`
    fn variables(&mut self, target: InstanceId) -> ObjResult<&mut Scope>;

    /// This scope of `target`
    fn this_scope(&mut self, target: InstanceId) -> ObjResult<&mut Scope>;

    /// Static scope shared by every instance of `class`
    fn static_scope(&mut self, class: ClassId) -> ObjResult<&mut Scope>;

    // ========================================================================
    // Hierarchy
    // ========================================================================

    /// Instance one level up from `target`
    fn super_of(&self, target: InstanceId) -> Option<InstanceId>;

    /// Most-derived instance of `target`'s hierarchy
    fn bottom_of(&self, target: InstanceId) -> InstanceId;

    /// Class descriptor identity of `target`
    fn class_of(&self, target: InstanceId) -> ObjResult<ClassId>;

    /// Instance whose pseudo-constructor is currently running
    fn current_template(&self) -> Option<InstanceId>;
}
