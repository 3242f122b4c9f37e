//! Strata SDK - shared vocabulary of the Strata object model
//!
//! This crate provides the types and traits needed to write function bodies
//! and host-native adapters without depending on the full strata-engine.
//!
//! # Example
//!
//! ```ignore
//! use strata_sdk::{Key, ScriptFunction, Value};
//!
//! let greet = ScriptFunction::new("greet", |ctx, frame| {
//!     let this = frame.require_this()?;
//!     let name = ctx.variables(this)?.dereference(&Key::new("name"), false)?;
//!     Ok(Value::string(format!("Hello, {}", name)))
//! });
//! ```

#![warn(missing_docs)]

pub mod context;
pub mod error;
pub mod function;
pub mod key;
pub mod native;
pub mod scope;
pub mod value;

pub use context::ObjectContext;
pub use error::{ObjResult, ObjectError};
pub use function::{
    Access, Argument, Arguments, CallFrame, Function, FunctionBody, Receiver, ScriptFunction,
    Signature,
};
pub use key::{keys, Key};
pub use native::{NativeClass, NativeObject};
pub use scope::Scope;
pub use value::{format_number, ClassId, InstanceId, Value};
