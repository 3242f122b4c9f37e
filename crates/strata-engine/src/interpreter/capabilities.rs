//! Capability flags
//!
//! `canOutput` and `canInvokeImplicitAccessor` are derived from annotations
//! (and, for the latter, ambient configuration) once per instance and cached
//! in a `OnceCell`. Racing first calls block on the cell and exactly one of
//! them runs the computation.

use strata_sdk::{keys, InstanceId, ObjResult};

use super::core::Runtime;
use crate::caster;
use crate::defaults;
use crate::object::{Instance, SourceType};

impl Runtime {
    /// Whether the instance may write to the output buffer
    pub fn can_output(&self, id: InstanceId) -> ObjResult<bool> {
        let inst = self.instance(id)?;
        Ok(*inst.flags.can_output.get_or_init(|| {
            inst.annotations
                .get_flag(&keys::OUTPUT)
                .unwrap_or_else(|| inst.name.simple_name().eq_ignore_ascii_case(defaults::OUTPUT_CLASS_NAME))
        }))
    }

    /// Whether raw `assign`/`dereference` of declared properties is re-routed
    /// through accessors
    pub fn can_invoke_implicit_accessor(&self, id: InstanceId) -> ObjResult<bool> {
        let inst = self.instance(id)?;
        Ok(*inst
            .flags
            .can_invoke_implicit_accessor
            .get_or_init(|| self.compute_implicit_accessor(inst)))
    }

    /// Whether getters and setters are generated for declared properties
    pub fn has_accessors(&self, id: InstanceId) -> ObjResult<bool> {
        let inst = self.instance(id)?;
        Ok(inst
            .annotations
            .get_flag(&keys::ACCESSORS)
            .unwrap_or(self.options().accessors_by_default))
    }

    fn compute_implicit_accessor(&self, inst: &Instance) -> bool {
        if let Some(flag) = inst.annotations.get_flag(&keys::INVOKE_IMPLICIT_ACCESSOR) {
            return flag;
        }
        let configured = self
            .options()
            .config
            .config_item(&keys::APPLICATION_SETTINGS, &keys::INVOKE_IMPLICIT_ACCESSOR)
            .and_then(|v| caster::to_boolean(&v));
        if let Some(flag) = configured {
            return flag;
        }
        match inst.descriptor.source_type {
            SourceType::Script => defaults::DEFAULT_SCRIPT_IMPLICIT_ACCESSOR,
            SourceType::Legacy => defaults::DEFAULT_LEGACY_IMPLICIT_ACCESSOR,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::config::{ApplicationSettings, RuntimeConfig, RuntimeOptions};
    use crate::interpreter::ClassRegistry;
    use crate::object::ClassDescriptor;
    use strata_sdk::{Arguments, Key};

    use super::*;

    fn single(desc: ClassDescriptor, options: RuntimeOptions) -> (Runtime, InstanceId) {
        let registry = Arc::new(ClassRegistry::new());
        let name = desc.name.clone();
        registry.register_class(desc);
        let mut rt = Runtime::with_options(registry, options);
        let id = rt.instantiate(&name, Arguments::none()).unwrap();
        (rt, id)
    }

    #[test]
    fn test_can_output_defaults() {
        let (rt, id) = single(ClassDescriptor::builder("app.Application").build(), RuntimeOptions::default());
        assert!(rt.can_output(id).unwrap());

        let (rt, id) = single(ClassDescriptor::builder("Widget").build(), RuntimeOptions::default());
        assert!(!rt.can_output(id).unwrap());
        assert_eq!(rt.instance(id).unwrap().flags().can_output(), Some(false));

        let (rt, id) = single(
            ClassDescriptor::builder("Widget").annotation("output", true).build(),
            RuntimeOptions::default(),
        );
        assert!(rt.can_output(id).unwrap());
    }

    #[test]
    fn test_implicit_accessor_precedence() {
        let (rt, id) = single(ClassDescriptor::builder("S").build(), RuntimeOptions::default());
        assert!(rt.can_invoke_implicit_accessor(id).unwrap());

        let (rt, id) = single(
            ClassDescriptor::builder("L").source_type(SourceType::Legacy).build(),
            RuntimeOptions::default(),
        );
        assert!(!rt.can_invoke_implicit_accessor(id).unwrap());

        let config = RuntimeConfig {
            application_settings: ApplicationSettings {
                invoke_implicit_accessor: Some(true),
            },
            ..Default::default()
        };
        let (rt, id) = single(
            ClassDescriptor::builder("L").source_type(SourceType::Legacy).build(),
            RuntimeOptions::from_config(config.clone()),
        );
        assert!(rt.can_invoke_implicit_accessor(id).unwrap());

        let (rt, id) = single(
            ClassDescriptor::builder("A")
                .annotation("invokeImplicitAccessor", false)
                .build(),
            RuntimeOptions::from_config(config),
        );
        assert!(!rt.can_invoke_implicit_accessor(id).unwrap());
    }

    #[test]
    fn test_has_accessors() {
        let (rt, id) = single(ClassDescriptor::builder("A").build(), RuntimeOptions::default());
        assert!(rt.has_accessors(id).unwrap());

        let (rt, id) = single(
            ClassDescriptor::builder("A").annotation("accessors", false).build(),
            RuntimeOptions::default(),
        );
        assert!(!rt.has_accessors(id).unwrap());

        let (rt, id) = single(
            ClassDescriptor::builder("A").build(),
            RuntimeOptions::default().with_accessors_by_default(false),
        );
        assert!(!rt.has_accessors(id).unwrap());

        let (rt, id) = single(
            ClassDescriptor::builder("A").annotation("accessors", "").build(),
            RuntimeOptions::default().with_accessors_by_default(false),
        );
        assert!(rt.has_accessors(id).unwrap());
        assert_eq!(rt.instance(id).unwrap().name, Key::new("a"));
    }
}
