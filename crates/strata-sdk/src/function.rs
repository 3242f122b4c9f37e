//! Function contracts
//!
//! The object model never executes statements itself. It hands a bound
//! [`CallFrame`] to anything implementing [`Function`] and lets the body
//! call back through [`ObjectContext`].

use std::fmt;
use std::sync::Arc;

use crate::context::ObjectContext;
use crate::error::{ObjResult, ObjectError};
use crate::key::Key;
use crate::scope::Scope;
use crate::value::{ClassId, InstanceId, Value};

// ============================================================================
// Signatures
// ============================================================================

/// Access qualifier of a function
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Access {
    /// Visible through This
    #[default]
    Public,
    /// Visible through This, remotely callable
    Remote,
    /// Variables only, visible to subclasses
    Protected,
    /// Variables only
    Private,
    /// Variables only, package visible
    Package,
}

impl Access {
    /// Whether functions with this access are mirrored into This
    pub fn is_public(self) -> bool {
        matches!(self, Access::Public | Access::Remote)
    }

    /// Lower-case keyword
    pub fn as_str(self) -> &'static str {
        match self {
            Access::Public => "public",
            Access::Remote => "remote",
            Access::Protected => "protected",
            Access::Private => "private",
            Access::Package => "package",
        }
    }
}

impl fmt::Display for Access {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One declared function argument
#[derive(Debug, Clone, PartialEq)]
pub struct Argument {
    /// Argument name
    pub name: Key,
    /// Declared type, `"any"` when untyped
    pub declared_type: String,
    /// Whether the caller must supply it
    pub required: bool,
    /// Value used when the caller omits it
    pub default_value: Option<Value>,
}

impl Argument {
    /// Optional argument of the given type
    pub fn new(name: impl Into<Key>, declared_type: impl Into<String>) -> Self {
        Argument {
            name: name.into(),
            declared_type: declared_type.into(),
            required: false,
            default_value: None,
        }
    }

    /// Required argument of the given type
    pub fn required(name: impl Into<Key>, declared_type: impl Into<String>) -> Self {
        Argument {
            required: true,
            ..Argument::new(name, declared_type)
        }
    }

    /// Attach a default value
    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    /// Whether this argument satisfies `abstract_arg` from an interface
    pub fn implements(&self, abstract_arg: &Argument) -> bool {
        is_any(&abstract_arg.declared_type)
            || self.declared_type.eq_ignore_ascii_case(&abstract_arg.declared_type)
    }
}

/// Callable signature without a body
#[derive(Debug, Clone, PartialEq)]
pub struct Signature {
    /// Function name
    pub name: Key,
    /// Access qualifier
    pub access: Access,
    /// Declared return type, `"any"` when untyped
    pub return_type: String,
    /// Declared arguments in order
    pub arguments: Vec<Argument>,
}

impl Signature {
    /// Public, untyped, argument-less signature
    pub fn new(name: impl Into<Key>) -> Self {
        Signature {
            name: name.into(),
            access: Access::Public,
            return_type: "any".to_string(),
            arguments: Vec::new(),
        }
    }

    /// Add an argument
    pub fn argument(mut self, argument: Argument) -> Self {
        self.arguments.push(argument);
        self
    }

    /// Set the return type
    pub fn returns(mut self, return_type: impl Into<String>) -> Self {
        self.return_type = return_type.into();
        self
    }

    /// Set the access qualifier
    pub fn access(mut self, access: Access) -> Self {
        self.access = access;
        self
    }

    /// Arity, argument types and return type compatible with `abstract_sig`
    pub fn implements(&self, abstract_sig: &Signature) -> bool {
        if self.arguments.len() != abstract_sig.arguments.len() {
            return false;
        }
        let arguments_match = self
            .arguments
            .iter()
            .zip(abstract_sig.arguments.iter())
            .all(|(own, req)| own.implements(req));
        arguments_match
            && (is_any(&abstract_sig.return_type)
                || self.return_type.eq_ignore_ascii_case(&abstract_sig.return_type))
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} function {}(", self.access, self.return_type, self.name)?;
        for (i, arg) in self.arguments.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            if arg.required {
                f.write_str("required ")?;
            }
            write!(f, "{} {}", arg.declared_type, arg.name)?;
        }
        f.write_str(")")
    }
}

fn is_any(type_name: &str) -> bool {
    type_name.is_empty() || type_name.eq_ignore_ascii_case("any")
}

// ============================================================================
// Call frames
// ============================================================================

/// Arguments as supplied by a caller
#[derive(Debug, Clone, PartialEq)]
pub enum Arguments {
    /// Positional call: `f(a, b)`
    Positional(Vec<Value>),
    /// Named call: `f(x = a, y = b)`
    Named(Scope),
}

impl Default for Arguments {
    fn default() -> Self {
        Arguments::Positional(Vec::new())
    }
}

impl Arguments {
    /// No arguments
    pub fn none() -> Self {
        Self::default()
    }

    /// Positional arguments
    pub fn positional(values: impl IntoIterator<Item = Value>) -> Self {
        Arguments::Positional(values.into_iter().collect())
    }

    /// Named arguments
    pub fn named(scope: Scope) -> Self {
        Arguments::Named(scope)
    }

    /// Number of supplied arguments
    pub fn len(&self) -> usize {
        match self {
            Arguments::Positional(v) => v.len(),
            Arguments::Named(s) => s.len(),
        }
    }

    /// Check for an empty argument list
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// First positional argument, or the named argument `name` (falling back
    /// to the first named entry)
    pub fn first_or_named(&self, name: &Key) -> Option<&Value> {
        match self {
            Arguments::Positional(v) => v.first(),
            Arguments::Named(s) => s.get(name).or_else(|| s.values().next()),
        }
    }

    /// Arguments as a struct; positional entries are keyed `"1"`, `"2"`, ...
    pub fn to_scope(&self) -> Scope {
        match self {
            Arguments::Positional(v) => v
                .iter()
                .enumerate()
                .map(|(i, value)| ((i + 1).to_string(), value.clone()))
                .collect(),
            Arguments::Named(s) => s.clone(),
        }
    }

    /// Bind against declared arguments, applying defaults.
    ///
    /// Extra positional values are keyed by their 1-based position.
    pub fn bind(&self, signature: &Signature) -> ObjResult<Scope> {
        let declared = &signature.arguments;
        let mut bound = Scope::with_capacity(declared.len().max(self.len()));
        match self {
            Arguments::Positional(values) => {
                for (i, arg) in declared.iter().enumerate() {
                    let supplied = values.get(i).filter(|v| !v.is_null());
                    bind_one(&mut bound, signature, arg, supplied)?;
                }
                for (i, value) in values.iter().enumerate().skip(declared.len()) {
                    bound.put((i + 1).to_string(), value.clone());
                }
            }
            Arguments::Named(scope) => {
                for arg in declared {
                    let supplied = scope.get(&arg.name).filter(|v| !v.is_null());
                    bind_one(&mut bound, signature, arg, supplied)?;
                }
                for (key, value) in scope.iter() {
                    bound.put_if_absent(key, value);
                }
            }
        }
        Ok(bound)
    }
}

fn bind_one(
    bound: &mut Scope,
    signature: &Signature,
    arg: &Argument,
    supplied: Option<&Value>,
) -> ObjResult<()> {
    let value = match (supplied, &arg.default_value) {
        (Some(v), _) => v.clone(),
        (None, Some(default)) => default.clone(),
        (None, None) if arg.required => {
            return Err(ObjectError::MissingArgument {
                function: signature.name.name().to_string(),
                argument: arg.name.name().to_string(),
            })
        }
        (None, None) => Value::Null,
    };
    bound.put(arg.name.clone(), value);
    Ok(())
}

/// What a function body runs against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Receiver {
    /// Instance call
    Instance {
        /// Most-derived instance (what `this` resolves to)
        this: InstanceId,
        /// Hierarchy level whose class declared the function (base for `super`)
        declaring: InstanceId,
    },
    /// Static call bound to a class
    Static(ClassId),
}

/// Bound invocation handed to a [`Function`]
#[derive(Debug, Clone)]
pub struct CallFrame {
    /// Name the function was called by
    pub name: Key,
    /// Arguments bound to declared names
    pub arguments: Scope,
    /// Self reference
    pub receiver: Receiver,
}

impl CallFrame {
    /// Create a frame
    pub fn new(name: impl Into<Key>, arguments: Scope, receiver: Receiver) -> Self {
        CallFrame {
            name: name.into(),
            arguments,
            receiver,
        }
    }

    /// The concrete instance, if this is an instance call
    pub fn this(&self) -> Option<InstanceId> {
        match self.receiver {
            Receiver::Instance { this, .. } => Some(this),
            _ => None,
        }
    }

    /// The declaring level, if this is an instance call
    pub fn declaring(&self) -> Option<InstanceId> {
        match self.receiver {
            Receiver::Instance { declaring, .. } => Some(declaring),
            _ => None,
        }
    }

    /// The class a static call is bound to
    pub fn static_class(&self) -> Option<ClassId> {
        match self.receiver {
            Receiver::Static(class) => Some(class),
            _ => None,
        }
    }

    /// Bound argument by name
    pub fn argument(&self, name: &str) -> Option<&Value> {
        self.arguments.get(&Key::new(name))
    }

    /// Bound argument by position
    pub fn argument_at(&self, index: usize) -> Option<&Value> {
        self.arguments.get_index(index).map(|(_, v)| v)
    }

    /// The `this` handle, failing for non-instance calls
    pub fn require_this(&self) -> ObjResult<InstanceId> {
        self.this().ok_or_else(|| {
            ObjectError::thrown(format!(
                "Function '{}' requires an instance receiver",
                self.name
            ))
        })
    }
}

// ============================================================================
// Function trait
// ============================================================================

/// Anything invocable with a call frame.
///
/// Used uniformly for instance methods, static methods, interface defaults
/// and pseudo-constructors.
pub trait Function: Send + Sync {
    /// Declared signature
    fn signature(&self) -> &Signature;

    /// Function annotations
    fn annotations(&self) -> &Scope;

    /// Function documentation (`hint`, ...)
    fn documentation(&self) -> &Scope;

    /// Name of the class that declared this function
    fn declaring_class(&self) -> Option<&Key> {
        None
    }

    /// Run the body
    fn invoke(&self, ctx: &mut dyn ObjectContext, frame: &CallFrame) -> ObjResult<Value>;
}

impl fmt::Debug for dyn Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Function({})", self.signature())
    }
}

/// Body of a [`ScriptFunction`]
pub type FunctionBody = dyn Fn(&mut dyn ObjectContext, &CallFrame) -> ObjResult<Value> + Send + Sync;

/// A function whose body is a compiled closure supplied by the evaluator.
#[derive(Clone)]
pub struct ScriptFunction {
    signature: Signature,
    annotations: Scope,
    documentation: Scope,
    declaring_class: Option<Key>,
    body: Arc<FunctionBody>,
}

impl ScriptFunction {
    /// Public, untyped function with the given body
    pub fn new<F>(name: impl Into<Key>, body: F) -> Self
    where
        F: Fn(&mut dyn ObjectContext, &CallFrame) -> ObjResult<Value> + Send + Sync + 'static,
    {
        ScriptFunction {
            signature: Signature::new(name),
            annotations: Scope::new(),
            documentation: Scope::new(),
            declaring_class: None,
            body: Arc::new(body),
        }
    }

    /// Add a declared argument
    pub fn argument(mut self, argument: Argument) -> Self {
        self.signature.arguments.push(argument);
        self
    }

    /// Set the return type
    pub fn returns(mut self, return_type: impl Into<String>) -> Self {
        self.signature.return_type = return_type.into();
        self
    }

    /// Set the access qualifier
    pub fn access(mut self, access: Access) -> Self {
        self.signature.access = access;
        self
    }

    /// Add an annotation
    pub fn annotation(mut self, key: impl Into<Key>, value: impl Into<Value>) -> Self {
        self.annotations.put(key, value);
        self
    }

    /// Set the `hint` documentation entry
    pub fn hint(mut self, text: impl AsRef<str>) -> Self {
        self.documentation.put("hint", Value::string(text));
        self
    }

    /// Record the declaring class
    pub fn declared_in(mut self, class: impl Into<Key>) -> Self {
        self.declaring_class = Some(class.into());
        self
    }

    /// Whether a declaring class is recorded
    pub fn has_declaring_class(&self) -> bool {
        self.declaring_class.is_some()
    }

    /// Signature accessor usable before boxing
    pub fn name(&self) -> &Key {
        &self.signature.name
    }
}

impl Function for ScriptFunction {
    fn signature(&self) -> &Signature {
        &self.signature
    }

    fn annotations(&self) -> &Scope {
        &self.annotations
    }

    fn documentation(&self) -> &Scope {
        &self.documentation
    }

    fn declaring_class(&self) -> Option<&Key> {
        self.declaring_class.as_ref()
    }

    fn invoke(&self, ctx: &mut dyn ObjectContext, frame: &CallFrame) -> ObjResult<Value> {
        (self.body)(ctx, frame)
    }
}

impl fmt::Debug for ScriptFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScriptFunction")
            .field("signature", &self.signature.to_string())
            .field("declaring_class", &self.declaring_class)
            .finish()
    }
}
