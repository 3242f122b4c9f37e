//! Reflection: metadata records and type queries

mod introspection;
mod metadata;

pub use metadata::{ClassMetadata, FunctionMetadata, MetadataKind, ParameterMetadata, PropertyMetadata};
