//! Default constants for runtime configuration.

/// Whether classes without an `accessors` annotation get generated accessors.
pub const DEFAULT_ACCESSORS: bool = true;

/// Implicit-accessor default for script-source classes.
pub const DEFAULT_SCRIPT_IMPLICIT_ACCESSOR: bool = true;

/// Implicit-accessor default for legacy-source classes.
pub const DEFAULT_LEGACY_IMPLICIT_ACCESSOR: bool = false;

/// Simple class name whose instances can output by default.
pub const OUTPUT_CLASS_NAME: &str = "application";

/// Names a class may never extend; they collide with scope and metadata keys.
pub const RESERVED_SUPER_NAMES: &[&str] = &["$bx", "this", "super", "variables", "static"];
