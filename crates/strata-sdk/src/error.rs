//! Error types for object-model operations

use crate::value::InstanceId;

/// Result type for object-model operations
pub type ObjResult<T> = Result<T, ObjectError>;

/// Failures raised by instantiation, wiring and dispatch.
///
/// All failures are synchronous; nothing is retried internally.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ObjectError {
    /// Strict dereference of an unbound key
    #[error("The key [{key}] was not found in the struct. Valid keys are ({valid_keys})")]
    KeyNotFound {
        /// Requested key
        key: String,
        /// Keys bound in the searched scope
        valid_keys: String,
    },

    /// Invoke resolved a binding that is not a function
    #[error("key '{key}' of type '{type_name}' is not a function")]
    NotCallable {
        /// Requested name
        key: String,
        /// Runtime type of the binding
        type_name: String,
    },

    /// Invoke exhausted every fallback in strict mode
    #[error("Method '{name}' not found")]
    MethodNotFound {
        /// Requested method
        name: String,
    },

    /// A value failed coercion to a declared type
    #[error("The method [{method}] received a value of type [{actual}] which is not assignable to the declared type [{expected}]")]
    TypeMismatch {
        /// Method that received the value
        method: String,
        /// Runtime type received
        actual: String,
        /// Declared type
        expected: String,
    },

    /// A required argument was not supplied
    #[error("Missing argument [{argument}] for function '{function}'")]
    MissingArgument {
        /// Function being called
        function: String,
        /// Argument name
        argument: String,
    },

    /// A class does not satisfy an interface it declares
    #[error("Class [{class}] {} [{signature}] from Interface [{interface}].", mismatch_detail(.found))]
    InterfaceNotSatisfied {
        /// Implementing class
        class: String,
        /// Interface name
        interface: String,
        /// Abstract method signature required by the interface
        signature: String,
        /// Signature of the incompatible method the class has, if any
        found: Option<String>,
    },

    /// An abstract class was instantiated directly
    #[error("Cannot instantiate abstract class [{class}]")]
    AbstractInstantiation {
        /// Class name
        class: String,
    },

    /// The super chain loops back onto itself
    #[error("Class [{class}] appears in its own super chain: {chain}")]
    WiringCycle {
        /// Class that closes the cycle
        class: String,
        /// Chain as walked, joined with " -> "
        chain: String,
    },

    /// A class extends a final class
    #[error("Class [{class}] cannot extend final class [{super_class}]")]
    FinalExtension {
        /// Extending class
        class: String,
        /// Final super class
        super_class: String,
    },

    /// A super name collides with a reserved key
    #[error("Class [{class}] cannot extend [{name}]: the name is reserved")]
    ReservedName {
        /// Extending class
        class: String,
        /// Reserved name
        name: String,
    },

    /// An instance already has a super or child link
    #[error("Instance of [{class}] is already wired")]
    AlreadyWired {
        /// Class of the already-wired instance
        class: String,
    },

    /// No class registered under the name
    #[error("Class [{name}] could not be found")]
    ClassNotFound {
        /// Requested class
        name: String,
    },

    /// No interface registered under the name
    #[error("Interface [{name}] could not be found")]
    InterfaceNotFound {
        /// Requested interface
        name: String,
    },

    /// A handle that does not address a live instance
    #[error("Invalid instance handle {0}")]
    InvalidInstance(InstanceId),

    /// Raised by a function body
    #[error("{0}")]
    Thrown(String),
}

fn mismatch_detail(found: &Option<String>) -> String {
    match found {
        Some(found) => format!(
            "has method [{}] but the signature doesn't match the signature of",
            found
        ),
        None => "does not implement method".to_string(),
    }
}

impl ObjectError {
    /// Absent-member kinds that safe navigation turns into the undefined sentinel
    pub fn is_absent_member(&self) -> bool {
        matches!(
            self,
            ObjectError::KeyNotFound { .. } | ObjectError::MethodNotFound { .. }
        )
    }

    /// Shorthand for an error raised from a function body
    pub fn thrown(message: impl Into<String>) -> Self {
        ObjectError::Thrown(message.into())
    }
}

impl From<String> for ObjectError {
    fn from(s: String) -> Self {
        ObjectError::Thrown(s)
    }
}

impl From<&str> for ObjectError {
    fn from(s: &str) -> Self {
        ObjectError::Thrown(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interface_messages() {
        let missing = ObjectError::InterfaceNotSatisfied {
            class: "Dog".into(),
            interface: "Animal".into(),
            signature: "public any function speak()".into(),
            found: None,
        };
        assert_eq!(
            missing.to_string(),
            "Class [Dog] does not implement method [public any function speak()] from Interface [Animal]."
        );

        let mismatch = ObjectError::InterfaceNotSatisfied {
            class: "Dog".into(),
            interface: "Animal".into(),
            signature: "public any function speak()".into(),
            found: Some("public any function speak(any loud)".into()),
        };
        assert!(mismatch
            .to_string()
            .contains("has method [public any function speak(any loud)] but the signature doesn't match"));
    }

    #[test]
    fn test_absent_member_kinds() {
        assert!(ObjectError::MethodNotFound { name: "x".into() }.is_absent_member());
        assert!(!ObjectError::thrown("boom").is_absent_member());
    }
}
