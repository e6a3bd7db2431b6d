//! Validator contract and type references
//!
//! A [`Validator`] answers one question: does a string value pass. Specs
//! reference validators through [`TypeRef`], either as a named type that
//! is built on demand or as an already constructed instance.

use std::fmt;
use std::sync::Arc;

use crate::error::Result;
use crate::node::ValidatedNode;

/// Checks a single string value
pub trait Validator: fmt::Debug + Send + Sync {
    /// Whether the value passes this validator
    fn validate(&self, value: &str) -> bool;

    /// Context-aware variant, handed the document root and the node the
    /// value was found on. The default ignores the context.
    fn validate_with_context(
        &self,
        value: &str,
        _root: Option<&dyn ValidatedNode>,
        _current: Option<&dyn ValidatedNode>,
    ) -> bool {
        self.validate(value)
    }

    /// Whether this validator wants document context
    fn needs_context(&self) -> bool {
        false
    }
}

/// Invoke a validator, routing through the context-aware entry point when
/// the validator asks for it.
pub(crate) fn run_validator(
    validator: &dyn Validator,
    value: &str,
    root: Option<&dyn ValidatedNode>,
    current: Option<&dyn ValidatedNode>,
) -> bool {
    if validator.needs_context() {
        validator.validate_with_context(value, root, current)
    } else {
        validator.validate(value)
    }
}

/// A named validator type: an identity plus a factory that builds a fresh
/// instance of it.
#[derive(Clone, Copy)]
pub struct ValidatorType {
    /// Stable identity of the type
    pub name: &'static str,
    /// Factory producing an instance
    pub build: fn() -> Result<Arc<dyn Validator>>,
}

impl fmt::Debug for ValidatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidatorType").field("name", &self.name).finish()
    }
}

impl PartialEq for ValidatorType {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for ValidatorType {}

/// Reference to a validator: a named type or a concrete instance
#[derive(Debug, Clone)]
pub enum TypeRef {
    /// A named type, instantiated when the validator is needed
    Type(ValidatorType),
    /// An already built validator, shared by reference
    Instance(Arc<dyn Validator>),
}

impl TypeRef {
    /// Wrap a concrete validator into a reference
    pub fn of(validator: impl Validator + 'static) -> Self {
        TypeRef::Instance(Arc::new(validator))
    }

    /// Stable identity, available only for named types
    pub fn id(&self) -> Option<&'static str> {
        match self {
            TypeRef::Type(ty) => Some(ty.name),
            TypeRef::Instance(_) => None,
        }
    }

    /// Resolve this reference to a usable validator
    pub fn validator(&self) -> Result<Arc<dyn Validator>> {
        match self {
            TypeRef::Type(ty) => (ty.build)(),
            TypeRef::Instance(v) => Ok(Arc::clone(v)),
        }
    }
}

impl PartialEq for TypeRef {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (TypeRef::Type(a), TypeRef::Type(b)) => a == b,
            (TypeRef::Instance(a), TypeRef::Instance(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl From<ValidatorType> for TypeRef {
    fn from(ty: ValidatorType) -> Self {
        TypeRef::Type(ty)
    }
}

impl From<Arc<dyn Validator>> for TypeRef {
    fn from(v: Arc<dyn Validator>) -> Self {
        TypeRef::Instance(v)
    }
}
