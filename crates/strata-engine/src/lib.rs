//! Strata Object Engine
//!
//! This crate provides the runtime object model for class-based scripting:
//! - **Object**: class descriptors, properties, interfaces, instances (`object` module)
//! - **Interpreter**: the instance arena, inheritance wiring, dispatch and
//!   instantiation (`interpreter` module)
//! - **Reflect**: metadata records and type queries (`reflect` module)
//! - **Config**: runtime options loaded from TOML (`config` module)
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use strata_engine::{ClassDescriptor, ClassRegistry, Runtime};
//! use strata_engine::strata_sdk::{Arguments, Key, ScriptFunction, Value};
//!
//! let registry = Arc::new(ClassRegistry::new());
//! registry.register_class(
//!     ClassDescriptor::builder("Greeter")
//!         .function(ScriptFunction::new("hello", |_, _| Ok(Value::from("hi"))))
//!         .build(),
//! );
//!
//! let mut rt = Runtime::new(registry);
//! let greeter = rt.instantiate(&Key::new("Greeter"), Arguments::none())?;
//! let reply = rt.invoke(greeter, &Key::new("hello"), Arguments::none(), false)?;
//! ```

#![warn(rust_2018_idioms)]

/// Declared-type coercion
pub mod caster;

/// Runtime configuration
pub mod config;

/// Built-in defaults
pub mod defaults;

/// Object-model runtime
pub mod interpreter;

/// Class descriptors, properties, interfaces and instances
pub mod object;

/// Reflection metadata and type queries
pub mod reflect;

pub use config::{ConfigError, ConfigLookup, RuntimeConfig, RuntimeOptions};
pub use interpreter::{ClassRegistry, Runtime};
pub use object::{
    ClassBuilder, ClassDescriptor, Instance, InterfaceBuilder, InterfaceContract,
    PropertyDefinition, SourceType,
};
pub use reflect::{ClassMetadata, MetadataKind};

pub use strata_sdk;
