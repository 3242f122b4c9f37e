//! Runtime: the instance arena
//!
//! Owns every live [`Instance`], the Static scope of each class, the
//! current-template stack and the active call frames. All object-model
//! operations are methods on [`Runtime`]; they are split across the sibling
//! modules by concern.

use std::sync::Arc;

use rustc_hash::FxHashMap;
use strata_sdk::{
    Arguments, CallFrame, ClassId, Function, InstanceId, Key, ObjResult, ObjectContext,
    ObjectError, Receiver, Scope, Value,
};

use super::class_registry::ClassRegistry;
use crate::caster;
use crate::config::RuntimeOptions;
use crate::object::{ClassDescriptor, Instance};

/// An object-model runtime.
///
/// Instances are never shared between runtimes. Scopes are not internally
/// synchronized: mutation goes through `&mut Runtime`, so concurrent callers
/// serialize through whatever owns the runtime. Capability flags and
/// metadata need only `&Runtime` and are safe to compute from many threads.
///
/// The arena only grows. An [`InstanceId`] stays valid for the life of the
/// runtime and is never reused. Levels allocated by an `instantiate` that
/// fails stay in the arena, linked only to each other, and no handle to them
/// is returned; drop the runtime to reclaim them.
#[derive(Debug)]
pub struct Runtime {
    registry: Arc<ClassRegistry>,
    options: RuntimeOptions,
    instances: Vec<Instance>,
    statics: FxHashMap<ClassId, Scope>,
    templates: Vec<InstanceId>,
    frames: Vec<Receiver>,
}

impl Runtime {
    /// Runtime with default options
    pub fn new(registry: Arc<ClassRegistry>) -> Self {
        Self::with_options(registry, RuntimeOptions::default())
    }

    /// Runtime with explicit options
    pub fn with_options(registry: Arc<ClassRegistry>, options: RuntimeOptions) -> Self {
        Runtime {
            registry,
            options,
            instances: Vec::new(),
            statics: FxHashMap::default(),
            templates: Vec::new(),
            frames: Vec::new(),
        }
    }

    /// Class registry this runtime resolves names against
    pub fn registry(&self) -> &Arc<ClassRegistry> {
        &self.registry
    }

    /// Runtime options
    pub fn options(&self) -> &RuntimeOptions {
        &self.options
    }

    // ========================================================================
    // Arena
    // ========================================================================

    /// Number of allocated instances (every hierarchy level counts)
    pub fn instance_count(&self) -> usize {
        self.instances.len()
    }

    /// Get an instance
    pub fn instance(&self, id: InstanceId) -> ObjResult<&Instance> {
        self.instances
            .get(id.index())
            .ok_or(ObjectError::InvalidInstance(id))
    }

    pub(crate) fn instance_mut(&mut self, id: InstanceId) -> ObjResult<&mut Instance> {
        self.instances
            .get_mut(id.index())
            .ok_or(ObjectError::InvalidInstance(id))
    }

    pub(crate) fn instances_mut(&mut self) -> &mut [Instance] {
        &mut self.instances
    }

    /// Allocate one hierarchy level; seeds the class's Static scope on first use.
    /// Slots are never freed.
    pub(crate) fn allocate(&mut self, class_id: ClassId, descriptor: Arc<ClassDescriptor>) -> InstanceId {
        self.statics
            .entry(class_id)
            .or_insert_with(|| descriptor.static_members.clone());
        let id = InstanceId(self.instances.len() as u32);
        self.instances.push(Instance::new(class_id, descriptor));
        id
    }

    // ========================================================================
    // Hierarchy
    // ========================================================================

    /// Instance one level up
    pub fn super_instance(&self, id: InstanceId) -> Option<InstanceId> {
        self.instances.get(id.index()).and_then(|i| i.super_instance)
    }

    /// Instance one level down
    pub fn child_instance(&self, id: InstanceId) -> Option<InstanceId> {
        self.instances.get(id.index()).and_then(|i| i.child)
    }

    /// Most-derived level reachable through child links
    pub fn bottom_class(&self, id: InstanceId) -> InstanceId {
        let mut current = id;
        // the chain is acyclic; the bound only guards against a corrupted arena
        for _ in 0..self.instances.len() {
            match self.child_instance(current) {
                Some(child) => current = child,
                None => break,
            }
        }
        current
    }

    /// Resolve a class name to its descriptor identity
    pub fn class_id(&self, class_name: &Key) -> ObjResult<ClassId> {
        self.registry.resolve_class(class_name).map(|(id, _)| id)
    }

    // ========================================================================
    // Static scopes
    // ========================================================================

    /// Static scope of `class`, if any instance or static access created it
    pub fn statics(&self, class: ClassId) -> Option<&Scope> {
        self.statics.get(&class)
    }

    pub(crate) fn statics_mut(&mut self, class: ClassId) -> ObjResult<&mut Scope> {
        if !self.statics.contains_key(&class) {
            let descriptor = self.registry.get_class(class).ok_or_else(|| {
                ObjectError::ClassNotFound {
                    name: format!("<class {}>", class.0),
                }
            })?;
            self.statics.insert(class, descriptor.static_members.clone());
        }
        self.statics
            .get_mut(&class)
            .ok_or_else(|| ObjectError::thrown("static scope vanished"))
    }

    // ========================================================================
    // Templates and frames
    // ========================================================================

    /// Instance whose pseudo-constructor is running
    pub fn current_template(&self) -> Option<InstanceId> {
        self.templates.last().copied()
    }

    /// Run `body` with `id` pushed as the current template; the pop happens
    /// whether or not `body` fails.
    pub(crate) fn with_template<T>(
        &mut self,
        id: InstanceId,
        body: impl FnOnce(&mut Self) -> ObjResult<T>,
    ) -> ObjResult<T> {
        self.templates.push(id);
        let result = body(self);
        self.templates.pop();
        result
    }

    /// Whether the innermost executing function runs against `id`
    pub(crate) fn in_own_frame(&self, id: InstanceId) -> bool {
        matches!(self.frames.last(), Some(Receiver::Instance { this, .. }) if *this == id)
    }

    /// Level of `found_on`'s hierarchy whose class declared `function`.
    ///
    /// Inherited functions are flattened into descendants, so the level a
    /// function was found on is not necessarily where it was written.
    pub(crate) fn declaring_level(&self, found_on: InstanceId, function: &dyn Function) -> InstanceId {
        let Some(declared) = function.declaring_class() else {
            return found_on;
        };
        let mut current = Some(found_on);
        while let Some(id) = current {
            match self.instances.get(id.index()) {
                Some(inst) if inst.name == *declared => return id,
                Some(inst) => current = inst.super_instance,
                None => break,
            }
        }
        found_on
    }

    /// Bind arguments, run `function` and enforce its declared return type
    pub(crate) fn call_function(
        &mut self,
        function: Arc<dyn Function>,
        name: &Key,
        args: Arguments,
        receiver: Receiver,
    ) -> ObjResult<Value> {
        let signature = function.signature();
        let arguments = args.bind(signature)?;
        let frame = CallFrame::new(name.clone(), arguments, receiver);

        self.frames.push(receiver);
        let result = function.invoke(self, &frame);
        self.frames.pop();
        let value = result?;

        let return_type = signature.return_type.as_str();
        if value.is_null()
            || return_type.is_empty()
            || return_type.eq_ignore_ascii_case("any")
            || return_type.eq_ignore_ascii_case("void")
        {
            return Ok(value);
        }
        let is_instance_of = |id: InstanceId, type_name: &str| self.is_instance_of(id, type_name);
        caster::cast(&value, return_type, &is_instance_of).ok_or_else(|| {
            ObjectError::TypeMismatch {
                method: signature.name.name().to_string(),
                actual: value.type_name().to_string(),
                expected: return_type.to_string(),
            }
        })
    }
}

// ============================================================================
// ObjectContext
// ============================================================================

impl ObjectContext for Runtime {
    fn assign(&mut self, target: InstanceId, key: &Key, value: Value) -> ObjResult<Value> {
        Runtime::assign(self, target, key, value)
    }

    fn dereference(&mut self, target: InstanceId, key: &Key, safe: bool) -> ObjResult<Value> {
        Runtime::dereference(self, target, key, safe)
    }

    fn invoke(
        &mut self,
        target: InstanceId,
        name: &Key,
        args: Arguments,
        safe: bool,
    ) -> ObjResult<Value> {
        Runtime::invoke(self, target, name, args, safe)
    }

    fn invoke_static(&mut self, class: ClassId, name: &Key, args: Arguments) -> ObjResult<Value> {
        Runtime::invoke_static(self, class, name, args)
    }

    fn instantiate(&mut self, class_name: &Key, args: Arguments) -> ObjResult<InstanceId> {
        Runtime::instantiate(self, class_name, args)
    }

    fn variables(&mut self, target: InstanceId) -> ObjResult<&mut Scope> {
        Ok(&mut self.instance_mut(target)?.variables)
    }

    fn this_scope(&mut self, target: InstanceId) -> ObjResult<&mut Scope> {
        Ok(&mut self.instance_mut(target)?.this)
    }

    fn static_scope(&mut self, class: ClassId) -> ObjResult<&mut Scope> {
        self.statics_mut(class)
    }

    fn super_of(&self, target: InstanceId) -> Option<InstanceId> {
        self.super_instance(target)
    }

    fn bottom_of(&self, target: InstanceId) -> InstanceId {
        self.bottom_class(target)
    }

    fn class_of(&self, target: InstanceId) -> ObjResult<ClassId> {
        Ok(self.instance(target)?.class_id)
    }

    fn current_template(&self) -> Option<InstanceId> {
        Runtime::current_template(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_sdk::ScriptFunction;

    fn runtime_with(descriptors: Vec<ClassDescriptor>) -> Runtime {
        let registry = Arc::new(ClassRegistry::new());
        for d in descriptors {
            registry.register_class(d);
        }
        Runtime::new(registry)
    }

    #[test]
    fn test_allocate_seeds_static_scope_once() {
        let desc = ClassDescriptor::builder("Counter").static_value("count", 0).build();
        let mut rt = runtime_with(vec![]);
        let class = rt.registry().register_class(desc);
        let descriptor = rt.registry().get_class(class).unwrap();

        let a = rt.allocate(class, descriptor.clone());
        rt.statics_mut(class).unwrap().put("count", 5);
        let b = rt.allocate(class, descriptor);

        assert_ne!(a, b);
        assert_eq!(rt.statics(class).unwrap().get(&Key::new("count")), Some(&Value::from(5)));
        assert_eq!(rt.instance_count(), 2);
    }

    #[test]
    fn test_invalid_handle() {
        let rt = runtime_with(vec![]);
        assert_eq!(
            rt.instance(InstanceId(9)).unwrap_err(),
            ObjectError::InvalidInstance(InstanceId(9))
        );
    }

    #[test]
    fn test_template_stack_pops_on_error() {
        let mut rt = runtime_with(vec![]);
        let result: ObjResult<()> = rt.with_template(InstanceId(0), |rt| {
            assert_eq!(rt.current_template(), Some(InstanceId(0)));
            Err(ObjectError::thrown("boom"))
        });
        assert!(result.is_err());
        assert_eq!(rt.current_template(), None);
    }

    #[test]
    fn test_call_function_enforces_return_type() {
        let mut rt = runtime_with(vec![]);
        let f: Arc<dyn Function> = Arc::new(
            ScriptFunction::new("answer", |_, _| Ok(Value::from("42"))).returns("numeric"),
        );
        let class = rt.registry().register_class(ClassDescriptor::builder("X").build());
        let receiver = Receiver::Static(class);
        let v = rt
            .call_function(f, &Key::new("answer"), Arguments::none(), receiver)
            .unwrap();
        assert_eq!(v, Value::from(42));

        let bad: Arc<dyn Function> = Arc::new(
            ScriptFunction::new("bad", |_, _| Ok(Value::array(vec![]))).returns("numeric"),
        );
        let err = rt
            .call_function(bad, &Key::new("bad"), Arguments::none(), receiver)
            .unwrap_err();
        assert!(matches!(err, ObjectError::TypeMismatch { .. }));
    }
}
