//! Object-model runtime
//!
//! [`Runtime`] is one struct; its operations are spread over the modules
//! below by concern.

mod accessors;
mod capabilities;
mod class_registry;
mod core;
mod dispatch;
mod interfaces;
mod lifecycle;
mod wiring;

pub use class_registry::ClassRegistry;
pub use core::Runtime;
