//! Case-insensitive identifiers
//!
//! Every scope member, property, method and annotation is addressed by a
//! [`Key`]. Two keys built from text that differs only in letter case are
//! equal and hash identically; the original spelling is kept for display.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use serde::{Serialize, Serializer};

/// A case-insensitive, cheaply clonable identifier.
#[derive(Clone)]
pub struct Key {
    name: Arc<str>,
    folded: Arc<str>,
}

impl Key {
    /// Create a key from any text
    pub fn new(name: impl AsRef<str>) -> Self {
        let name = name.as_ref();
        let lowered = name.to_lowercase();
        let name: Arc<str> = Arc::from(name);
        let folded = if lowered == *name {
            name.clone()
        } else {
            Arc::from(lowered)
        };
        Key { name, folded }
    }

    /// The spelling this key was created with
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The lower-cased form used for equality and hashing
    pub fn folded(&self) -> &str {
        &self.folded
    }

    /// Case-insensitive comparison against raw text
    pub fn matches(&self, text: &str) -> bool {
        *self.folded == *text.to_lowercase()
    }

    /// Prefix the key, keeping the remainder's spelling (`get` + `Name`)
    pub fn prefixed(&self, prefix: &str) -> Key {
        Key::new(format!("{}{}", prefix, self.name))
    }

    /// The last dot-separated segment (`models.User` -> `User`)
    pub fn simple_name(&self) -> &str {
        self.name.rsplit('.').next().unwrap_or(&self.name)
    }
}

impl PartialEq for Key {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.folded, &other.folded) || self.folded == other.folded
    }
}

impl Eq for Key {}

impl Hash for Key {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.folded.hash(state);
    }
}

impl PartialOrd for Key {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Key {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.folded.cmp(&other.folded)
    }
}

impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Key({:?})", self.name)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl From<&str> for Key {
    fn from(s: &str) -> Self {
        Key::new(s)
    }
}

impl From<String> for Key {
    fn from(s: String) -> Self {
        Key::new(s)
    }
}

impl From<&Key> for Key {
    fn from(k: &Key) -> Self {
        k.clone()
    }
}

impl Serialize for Key {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.name)
    }
}

// ============================================================================
// Well-known Keys
// ============================================================================

/// Keys with a fixed meaning in the object model.
pub mod keys {
    use super::Key;
    use once_cell::sync::Lazy;

    macro_rules! well_known {
        ($($(#[$doc:meta])* $ident:ident => $text:expr;)*) => {
            $(
                $(#[$doc])*
                pub static $ident: Lazy<Key> = Lazy::new(|| Key::new($text));
            )*
        };
    }

    well_known! {
        /// Self-metadata handle
        BX_META => "$bx";
        /// Universal fallback method
        ON_MISSING_METHOD => "onMissingMethod";
        /// First argument passed to `onMissingMethod`
        MISSING_METHOD_NAME => "missingMethodName";
        /// Second argument passed to `onMissingMethod`
        MISSING_METHOD_ARGUMENTS => "missingMethodArguments";
        /// User-defined constructor convention
        INIT => "init";
        /// Annotation recording the declared super class
        EXTENDS => "extends";
        /// Annotation recording the declared interfaces
        IMPLEMENTS => "implements";
        /// Annotation controlling output
        OUTPUT => "output";
        /// Annotation controlling implicit accessor re-routing
        INVOKE_IMPLICIT_ACCESSOR => "invokeImplicitAccessor";
        /// Annotation enabling generated accessors
        ACCESSORS => "accessors";
        /// Property annotation suppressing the generated getter
        GETTER => "getter";
        /// Property annotation suppressing the generated setter
        SETTER => "setter";
        /// Property annotation holding the default value
        DEFAULT => "default";
        /// Documentation entry rendered as the metadata hint
        HINT => "hint";
        /// Configuration section for application-wide settings
        APPLICATION_SETTINGS => "applicationSettings";
        /// Scope name
        THIS => "this";
        /// Scope name
        VARIABLES => "variables";
        /// Scope name
        STATIC => "static";
        /// Scope name
        SUPER => "super";
    }
}
