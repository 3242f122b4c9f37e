//! Instantiation and inheritance wiring
//!
//! Tests cover:
//! - Ancestor-first pseudo-construction and scope flattening
//! - Property precedence across levels
//! - super.* delegation through the Variables scope
//! - Wiring failures (cycles, final supers, reserved names, abstract classes)
//! - The init convention

use std::sync::Arc;

use strata_engine::strata_sdk::{
    Arguments, CallFrame, Key, ObjResult, ObjectContext, ObjectError, ScriptFunction, Value,
};
use strata_engine::{ClassDescriptor, ClassRegistry, PropertyDefinition, Runtime};

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

fn runtime(classes: Vec<ClassDescriptor>) -> Runtime {
    let registry = Arc::new(ClassRegistry::new());
    for class in classes {
        registry.register_class(class);
    }
    Runtime::new(registry)
}

fn new(rt: &mut Runtime, class: &str) -> ObjResult<strata_engine::strata_sdk::InstanceId> {
    rt.instantiate(&Key::new(class), Arguments::none())
}

fn set_variable(name: &'static str, value: &'static str) -> ScriptFunction {
    ScriptFunction::new("pseudoConstructor", move |ctx, frame| {
        let this = frame.require_this()?;
        ctx.variables(this)?.put(name, value);
        Ok(Value::Null)
    })
}

/// `super.<name>()` from the level that declared the running function
fn call_super(ctx: &mut dyn ObjectContext, frame: &CallFrame, name: &str) -> ObjResult<Value> {
    let declaring = frame
        .declaring()
        .ok_or_else(|| ObjectError::thrown("no declaring level"))?;
    let sup = ctx
        .super_of(declaring)
        .ok_or_else(|| ObjectError::thrown("no super"))?;
    ctx.invoke(sup, &Key::new(name), Arguments::none(), false)
}

fn text(value: &Value) -> String {
    value.as_str().unwrap_or_default().to_string()
}

// =============================================================================
// PSEUDO-CONSTRUCTION ORDER
// =============================================================================

#[test]
fn test_ancestor_first_initialization() {
    let mut rt = runtime(vec![
        ClassDescriptor::builder("A")
            .pseudo_constructor(set_variable("x", "from A"))
            .function(ScriptFunction::new("readX", |ctx, frame| {
                let this = frame.require_this()?;
                ctx.variables(this)?.dereference(&Key::new("x"), false)
            }))
            .build(),
        ClassDescriptor::builder("B").extends("A").build(),
        ClassDescriptor::builder("C")
            .extends("B")
            .pseudo_constructor(set_variable("x", "from C"))
            .build(),
    ]);

    let c = new(&mut rt, "C").unwrap();
    let b = rt.super_instance(c).unwrap();
    let a = rt.super_instance(b).unwrap();

    let x = Key::new("x");
    assert_eq!(rt.instance(c).unwrap().variables.get(&x), Some(&Value::from("from C")));
    assert_eq!(rt.instance(b).unwrap().variables.get(&x), Some(&Value::from("from A")));
    assert_eq!(rt.instance(a).unwrap().variables.get(&x), Some(&Value::from("from A")));

    // inherited function runs against the concrete object
    let read = rt.invoke(c, &Key::new("readX"), Arguments::none(), false).unwrap();
    assert_eq!(read, Value::from("from C"));
}

#[test]
fn test_hierarchy_links() {
    let mut rt = runtime(vec![
        ClassDescriptor::builder("A").build(),
        ClassDescriptor::builder("B").extends("A").build(),
        ClassDescriptor::builder("C").extends("B").build(),
    ]);
    let c = new(&mut rt, "C").unwrap();
    let b = rt.super_instance(c).unwrap();
    let a = rt.super_instance(b).unwrap();

    assert_eq!(rt.super_instance(a), None);
    assert_eq!(rt.child_instance(a), Some(b));
    assert_eq!(rt.child_instance(b), Some(c));
    assert_eq!(rt.child_instance(c), None);
    assert_eq!(rt.bottom_class(a), c);
    assert_eq!(rt.instance_count(), 3);
}

#[test]
fn test_template_stack_during_pseudo_constructor() {
    let mut rt = runtime(vec![ClassDescriptor::builder("T")
        .pseudo_constructor(ScriptFunction::new("pseudoConstructor", |ctx, frame| {
            let this = frame.require_this()?;
            let seen = ctx.current_template() == Some(this);
            ctx.variables(this)?.put("sawTemplate", seen);
            Ok(Value::Null)
        }))
        .build()]);

    let t = new(&mut rt, "T").unwrap();
    assert_eq!(
        rt.instance(t).unwrap().variables.get(&Key::new("sawTemplate")),
        Some(&Value::Bool(true))
    );
    assert_eq!(rt.current_template(), None);
}

#[test]
fn test_failing_pseudo_constructor_pops_template() {
    let mut rt = runtime(vec![ClassDescriptor::builder("Broken")
        .pseudo_constructor(ScriptFunction::new("pseudoConstructor", |_, _| {
            Err(ObjectError::thrown("body failed"))
        }))
        .build()]);

    let err = new(&mut rt, "Broken").unwrap_err();
    assert_eq!(err, ObjectError::Thrown("body failed".to_string()));
    assert_eq!(rt.current_template(), None);
}

#[test]
fn test_failed_instantiation_keeps_handles_stable() {
    let mut rt = runtime(vec![
        ClassDescriptor::builder("Base").this_value("kind", "base").build(),
        ClassDescriptor::builder("Leaf")
            .extends("Base")
            .pseudo_constructor(ScriptFunction::new("pseudoConstructor", |_, _| {
                Err(ObjectError::thrown("leaf failed"))
            }))
            .build(),
    ]);

    let before = new(&mut rt, "Base").unwrap();
    assert_eq!(rt.instance_count(), 1);

    assert!(new(&mut rt, "Leaf").is_err());
    // both levels stay allocated; nothing hands out their handles
    assert_eq!(rt.instance_count(), 3);

    let after = new(&mut rt, "Base").unwrap();
    assert_eq!(after.index(), 3);
    assert_eq!(rt.dereference(before, &Key::new("kind"), false).unwrap(), Value::from("base"));
    assert_eq!(rt.bottom_class(before), before);
}

// =============================================================================
// PROPERTIES
// =============================================================================

#[test]
fn test_subclass_property_wins() {
    let mut rt = runtime(vec![
        ClassDescriptor::builder("A")
            .annotation("accessors", true)
            .property(PropertyDefinition::new("p").with_default(2))
            .build(),
        ClassDescriptor::builder("B")
            .extends("A")
            .property(PropertyDefinition::new("p").with_default(1))
            .build(),
        ClassDescriptor::builder("C").extends("B").build(),
    ]);

    let c = new(&mut rt, "C").unwrap();
    let p = Key::new("p");

    let inst = rt.instance(c).unwrap();
    assert_eq!(inst.variables.get(&p), Some(&Value::from(1)));
    assert_eq!(
        inst.properties.get(&p).unwrap().declaring_class,
        Some(Key::new("B"))
    );

    assert_eq!(rt.invoke(c, &Key::new("getP"), Arguments::none(), false).unwrap(), Value::from(1));
    assert_eq!(rt.dereference(c, &p, false).unwrap(), Value::from(1));
}

#[test]
fn test_property_without_default_is_null() {
    let mut rt = runtime(vec![ClassDescriptor::builder("Plain")
        .property(PropertyDefinition::new("empty"))
        .build()]);
    let id = new(&mut rt, "Plain").unwrap();
    assert_eq!(
        rt.instance(id).unwrap().variables.get(&Key::new("empty")),
        Some(&Value::Null)
    );
}

#[test]
fn test_annotations_inherit_except_declarations() {
    let mut rt = runtime(vec![
        ClassDescriptor::builder("Base")
            .annotation("cache", true)
            .annotation("table", "base")
            .implements("Nothing")
            .build(),
        ClassDescriptor::builder("Derived")
            .extends("Base")
            .annotation("table", "derived")
            .build(),
    ]);
    rt.registry()
        .register_interface(strata_engine::InterfaceContract::builder("Nothing").build());

    let d = new(&mut rt, "Derived").unwrap();
    let annotations = &rt.instance(d).unwrap().annotations;
    assert_eq!(annotations.get(&Key::new("cache")), Some(&Value::Bool(true)));
    assert_eq!(annotations.get(&Key::new("table")), Some(&Value::from("derived")));
    assert!(!annotations.contains_key(&Key::new("implements")));
    assert_eq!(annotations.get(&Key::new("extends")), Some(&Value::from("Base")));
}

// =============================================================================
// SUPER DELEGATION
// =============================================================================

#[test]
fn test_super_delegation_uses_level_definition() {
    let mut rt = runtime(vec![
        ClassDescriptor::builder("B")
            .function(ScriptFunction::new("foo", |_, _| Ok(Value::from("B.foo"))))
            .build(),
        ClassDescriptor::builder("C")
            .extends("B")
            .function(ScriptFunction::new("foo", |_, _| Ok(Value::from("C.foo"))))
            .function(ScriptFunction::new("callSuper", |ctx, frame| {
                call_super(ctx, frame, "foo")
            }))
            .build(),
    ]);

    let c = new(&mut rt, "C").unwrap();
    assert_eq!(rt.invoke(c, &Key::new("foo"), Arguments::none(), false).unwrap(), Value::from("C.foo"));
    assert_eq!(
        rt.invoke(c, &Key::new("callSuper"), Arguments::none(), false).unwrap(),
        Value::from("B.foo")
    );
}

#[test]
fn test_super_chain_through_three_levels() {
    let mut rt = runtime(vec![
        ClassDescriptor::builder("A")
            .function(ScriptFunction::new("describe", |_, _| Ok(Value::from("A"))))
            .build(),
        ClassDescriptor::builder("B")
            .extends("A")
            .function(ScriptFunction::new("describe", |ctx, frame| {
                let up = call_super(ctx, frame, "describe")?;
                Ok(Value::string(format!("{}B", text(&up))))
            }))
            .build(),
        ClassDescriptor::builder("C")
            .extends("B")
            .function(ScriptFunction::new("describe", |ctx, frame| {
                let up = call_super(ctx, frame, "describe")?;
                Ok(Value::string(format!("{}C", text(&up))))
            }))
            .build(),
    ]);

    let c = new(&mut rt, "C").unwrap();
    assert_eq!(
        rt.invoke(c, &Key::new("describe"), Arguments::none(), false).unwrap(),
        Value::from("ABC")
    );
}

#[test]
fn test_inherited_function_super_is_relative_to_declaration() {
    // C inherits B's `greet`; super inside it must reach A, not B
    let mut rt = runtime(vec![
        ClassDescriptor::builder("A")
            .function(ScriptFunction::new("greet", |_, _| Ok(Value::from("hello"))))
            .build(),
        ClassDescriptor::builder("B")
            .extends("A")
            .function(ScriptFunction::new("greet", |ctx, frame| {
                let up = call_super(ctx, frame, "greet")?;
                Ok(Value::string(format!("{} world", text(&up))))
            }))
            .build(),
        ClassDescriptor::builder("C").extends("B").build(),
    ]);

    let c = new(&mut rt, "C").unwrap();
    assert_eq!(
        rt.invoke(c, &Key::new("greet"), Arguments::none(), false).unwrap(),
        Value::from("hello world")
    );
}

// =============================================================================
// WIRING FAILURES
// =============================================================================

#[test]
fn test_cycle_is_rejected() {
    let mut rt = runtime(vec![
        ClassDescriptor::builder("Egg").extends("Chicken").build(),
        ClassDescriptor::builder("Chicken").extends("Egg").build(),
    ]);
    let err = new(&mut rt, "Egg").unwrap_err();
    assert!(matches!(err, ObjectError::WiringCycle { .. }), "got {err:?}");
}

#[test]
fn test_final_super_is_rejected() {
    let mut rt = runtime(vec![
        ClassDescriptor::builder("Sealed").final_class().build(),
        ClassDescriptor::builder("Sneaky").extends("Sealed").build(),
    ]);
    let err = new(&mut rt, "Sneaky").unwrap_err();
    assert_eq!(
        err,
        ObjectError::FinalExtension {
            class: "Sneaky".to_string(),
            super_class: "Sealed".to_string(),
        }
    );
    assert!(new(&mut rt, "Sealed").is_ok());
}

#[test]
fn test_reserved_super_name_is_rejected() {
    let mut rt = runtime(vec![ClassDescriptor::builder("Odd").extends("Variables").build()]);
    let err = new(&mut rt, "Odd").unwrap_err();
    assert!(matches!(err, ObjectError::ReservedName { .. }), "got {err:?}");
}

#[test]
fn test_unknown_super_is_rejected() {
    let mut rt = runtime(vec![ClassDescriptor::builder("Orphan").extends("Missing").build()]);
    let err = new(&mut rt, "Orphan").unwrap_err();
    assert_eq!(err, ObjectError::ClassNotFound { name: "Missing".to_string() });
}

#[test]
fn test_abstract_class() {
    let mut rt = runtime(vec![
        ClassDescriptor::builder("Shape").abstract_class().build(),
        ClassDescriptor::builder("Circle").extends("Shape").build(),
    ]);
    let err = new(&mut rt, "Shape").unwrap_err();
    assert_eq!(err, ObjectError::AbstractInstantiation { class: "Shape".to_string() });
    assert!(new(&mut rt, "Circle").is_ok());
}

#[test]
fn test_rewiring_is_rejected() {
    let mut rt = runtime(vec![
        ClassDescriptor::builder("A").build(),
        ClassDescriptor::builder("B").extends("A").build(),
    ]);
    let b = new(&mut rt, "B").unwrap();
    let a = rt.super_instance(b).unwrap();
    let other = new(&mut rt, "A").unwrap();

    let err = rt.wire_super(b, other).unwrap_err();
    assert!(matches!(err, ObjectError::AlreadyWired { .. }), "got {err:?}");
    let err = rt.wire_super(other, a).unwrap_err();
    assert!(matches!(err, ObjectError::AlreadyWired { .. }), "got {err:?}");
    let err = rt.wire_super(a, b).unwrap_err();
    assert!(matches!(err, ObjectError::WiringCycle { .. }), "got {err:?}");
}

// =============================================================================
// INIT CONVENTION
// =============================================================================

#[test]
fn test_init_receives_instantiation_arguments() {
    let mut rt = runtime(vec![ClassDescriptor::builder("Person")
        .function(
            ScriptFunction::new("init", |ctx, frame| {
                let this = frame.require_this()?;
                let name = frame.argument("name").cloned().unwrap_or_default();
                ctx.assign(this, &Key::new("name"), name)?;
                Ok(Value::from("ignored"))
            })
            .argument(strata_engine::strata_sdk::Argument::required("name", "string")),
        )
        .build()]);

    let ada = rt
        .instantiate(&Key::new("Person"), Arguments::positional([Value::from("Ada")]))
        .unwrap();
    assert_eq!(rt.dereference(ada, &Key::new("name"), false).unwrap(), Value::from("Ada"));

    let err = new(&mut rt, "Person").unwrap_err();
    assert!(matches!(err, ObjectError::MissingArgument { .. }), "got {err:?}");
}

#[test]
fn test_inherited_init_runs_once() {
    let mut rt = runtime(vec![
        ClassDescriptor::builder("Base")
            .function(ScriptFunction::new("init", |ctx, frame| {
                let this = frame.require_this()?;
                let calls = ctx.variables(this)?.get(&Key::new("calls")).and_then(Value::as_number);
                ctx.variables(this)?.put("calls", calls.unwrap_or(0.0) + 1.0);
                Ok(Value::Null)
            }))
            .build(),
        ClassDescriptor::builder("Leaf").extends("Base").build(),
    ]);
    let leaf = new(&mut rt, "Leaf").unwrap();
    assert_eq!(
        rt.instance(leaf).unwrap().variables.get(&Key::new("calls")),
        Some(&Value::from(1))
    );
}
