//! Object model data types
//!
//! Class descriptors, property definitions and interface contracts are the
//! immutable, loader-produced side; [`Instance`] is the mutable runtime side.

pub mod class;
pub mod instance;
pub mod interface;
pub mod property;

pub use class::{ClassBuilder, ClassDescriptor, SourceType};
pub use instance::{CapabilityFlags, Instance};
pub use interface::{InterfaceBuilder, InterfaceContract};
pub use property::PropertyDefinition;
