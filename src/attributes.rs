//! Attribute specs
//!
//! An attribute spec binds an attribute name to the validator type that
//! checks its value. Beyond the plain [`TypedSpec`] there are two
//! aggregate flavors: [`ShorthandSpec`] for attributes like `margin`
//! that expand into `margin-top` and friends, and [`CompoundSpec`] for
//! dotted multi-value attributes like `keep-together.within-column`.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::node::ValidatedNode;
use crate::validators::base::TypeRef;
use crate::validators::builtins;

/// Condition deciding whether an attribute is required on a given node
pub type RequiredIf = Arc<dyn Fn(Option<&dyn ValidatedNode>) -> Option<bool> + Send + Sync>;

/// Outcome of removing one spec from an aggregate.
///
/// `Reduced` carries what remains once the target was found and removed.
/// `NotFound` means the aggregate does not contain the target and stays
/// whole.
#[derive(Debug, Clone, PartialEq)]
pub enum Except<T = AttributeSpec> {
    /// The target was found; these are the remaining parts
    Reduced(Vec<T>),
    /// The target is not part of the aggregate
    NotFound,
}

/// A single attribute bound to one validator type
#[derive(Clone)]
pub struct TypedSpec {
    name: String,
    type_ref: TypeRef,
    required_if: Option<RequiredIf>,
}

impl TypedSpec {
    /// Bind an attribute name to a validator type
    pub fn new(name: impl Into<String>, type_ref: impl Into<TypeRef>) -> Self {
        TypedSpec {
            name: name.into(),
            type_ref: type_ref.into(),
            required_if: None,
        }
    }

    /// Attach a condition that reconsiders whether this attribute is
    /// required. The condition runs every time requiredness is checked;
    /// returning `None` falls back to not required.
    pub fn required_if(
        mut self,
        condition: impl Fn(Option<&dyn ValidatedNode>) -> Option<bool> + Send + Sync + 'static,
    ) -> Self {
        self.required_if = Some(Arc::new(condition));
        self
    }

    /// Attribute name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Validator type reference
    pub fn type_ref(&self) -> &TypeRef {
        &self.type_ref
    }

    /// Whether this attribute is required on the given node
    pub fn is_required(&self, node: Option<&dyn ValidatedNode>) -> bool {
        match &self.required_if {
            Some(condition) => condition(node).unwrap_or(false),
            None => false,
        }
    }
}

impl fmt::Debug for TypedSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypedSpec")
            .field("name", &self.name)
            .field("type_ref", &self.type_ref)
            .field("conditional", &self.required_if.is_some())
            .finish()
    }
}

impl PartialEq for TypedSpec {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.type_ref == other.type_ref
    }
}

/// A shorthand attribute expanding into several linked attributes.
///
/// The main attribute is optional: some shorthands only exist through
/// their expansion.
#[derive(Debug, Clone, PartialEq)]
pub struct ShorthandSpec {
    main: TypedSpec,
    has_main: bool,
    subs: Vec<AttributeSpec>,
}

impl ShorthandSpec {
    /// Shorthand with a main attribute and its linked attributes
    pub fn new(
        name: impl Into<String>,
        type_ref: impl Into<TypeRef>,
        subs: Vec<AttributeSpec>,
    ) -> Self {
        ShorthandSpec {
            main: TypedSpec::new(name, type_ref),
            has_main: true,
            subs,
        }
    }

    /// Shorthand with no main attribute of its own
    pub fn without_main(subs: Vec<AttributeSpec>) -> Self {
        ShorthandSpec {
            main: TypedSpec::new("", builtins::NC_NAME),
            has_main: false,
            subs,
        }
    }

    /// Whether this shorthand has a main attribute
    pub fn has_main(&self) -> bool {
        self.has_main
    }

    /// Linked attributes
    pub fn sub_specs(&self) -> &[AttributeSpec] {
        &self.subs
    }
}

/// A dotted multi-value attribute: a main attribute plus sub-attributes
/// named `main.component`.
#[derive(Debug, Clone, PartialEq)]
pub struct CompoundSpec {
    main: TypedSpec,
    subs: Vec<AttributeSpec>,
}

impl CompoundSpec {
    /// Compound from explicit sub-specs
    pub fn new(
        name: impl Into<String>,
        type_ref: impl Into<TypeRef>,
        subs: Vec<AttributeSpec>,
    ) -> Self {
        CompoundSpec {
            main: TypedSpec::new(name, type_ref),
            subs,
        }
    }

    /// Compound from component suffixes: each `(suffix, type)` pair
    /// becomes a `name.suffix` sub-attribute.
    pub fn from_suffixes(
        name: impl Into<String>,
        type_ref: impl Into<TypeRef>,
        suffixes: Vec<(&str, TypeRef)>,
    ) -> Self {
        let name = name.into();
        let subs = suffixes
            .into_iter()
            .map(|(suffix, ty)| {
                AttributeSpec::Typed(TypedSpec::new(format!("{name}.{suffix}"), ty))
            })
            .collect();
        CompoundSpec {
            main: TypedSpec::new(name, type_ref),
            subs,
        }
    }

    /// Component attributes
    pub fn sub_specs(&self) -> &[AttributeSpec] {
        &self.subs
    }
}

/// Any of the three attribute spec flavors
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeSpec {
    /// A single attribute
    Typed(TypedSpec),
    /// A shorthand and its expansion
    Shorthand(ShorthandSpec),
    /// A dotted compound and its components
    Compound(CompoundSpec),
}

impl AttributeSpec {
    /// Name of the spec. A shorthand without a main attribute has an
    /// empty name.
    pub fn name(&self) -> &str {
        match self {
            AttributeSpec::Typed(t) => t.name(),
            AttributeSpec::Shorthand(s) => s.main.name(),
            AttributeSpec::Compound(c) => c.main.name(),
        }
    }

    /// Validator type of the main attribute
    pub fn type_ref(&self) -> &TypeRef {
        match self {
            AttributeSpec::Typed(t) => t.type_ref(),
            AttributeSpec::Shorthand(s) => s.main.type_ref(),
            AttributeSpec::Compound(c) => c.main.type_ref(),
        }
    }

    /// Inner specs of an aggregate; empty for a plain spec
    pub fn sub_specs(&self) -> &[AttributeSpec] {
        match self {
            AttributeSpec::Typed(_) => &[],
            AttributeSpec::Shorthand(s) => s.sub_specs(),
            AttributeSpec::Compound(c) => c.sub_specs(),
        }
    }

    /// All names this spec covers, mapped to their validator types.
    /// Aggregates contribute their main attribute, when they have one,
    /// followed by every inner name.
    pub fn unpack(&self) -> IndexMap<String, TypeRef> {
        let mut unpacked = IndexMap::new();
        match self {
            AttributeSpec::Typed(t) => {
                unpacked.insert(t.name().to_string(), t.type_ref().clone());
            }
            AttributeSpec::Shorthand(s) => {
                if s.has_main {
                    unpacked.insert(s.main.name().to_string(), s.main.type_ref().clone());
                }
                for sub in &s.subs {
                    unpacked.extend(sub.unpack());
                }
            }
            AttributeSpec::Compound(c) => {
                unpacked.insert(c.main.name().to_string(), c.main.type_ref().clone());
                for sub in &c.subs {
                    unpacked.extend(sub.unpack());
                }
            }
        }
        unpacked
    }

    /// Flatten into plain specs, aggregates recursively expanded
    pub fn flatten(&self) -> Vec<TypedSpec> {
        let mut flat = Vec::new();
        match self {
            AttributeSpec::Typed(t) => flat.push(t.clone()),
            AttributeSpec::Shorthand(s) => {
                if s.has_main {
                    flat.push(s.main.clone());
                }
                for sub in &s.subs {
                    flat.extend(sub.flatten());
                }
            }
            AttributeSpec::Compound(c) => {
                flat.push(c.main.clone());
                for sub in &c.subs {
                    flat.extend(sub.flatten());
                }
            }
        }
        flat
    }

    /// Whether this spec is required on the given node
    pub fn is_required(&self, node: Option<&dyn ValidatedNode>) -> bool {
        match self {
            AttributeSpec::Typed(t) => t.is_required(node),
            AttributeSpec::Shorthand(s) => s.main.is_required(node),
            AttributeSpec::Compound(c) => c.main.is_required(node),
        }
    }

    /// Whether this spec stands for the same attribute as another: same
    /// name, same validator type.
    pub(crate) fn matches(&self, other: &AttributeSpec) -> bool {
        self.name() == other.name() && self.type_ref() == other.type_ref()
    }

    /// Remove the target from this spec.
    ///
    /// Removing the main attribute of an aggregate leaves its inner
    /// specs. Removing an inner spec of a nested aggregate splices the
    /// reduced aggregate in place.
    pub fn except(&self, target: &AttributeSpec) -> Except<AttributeSpec> {
        match self {
            AttributeSpec::Typed(_) => {
                if self.matches(target) {
                    Except::Reduced(Vec::new())
                } else {
                    Except::NotFound
                }
            }
            AttributeSpec::Shorthand(s) => {
                if s.has_main && self.matches(target) {
                    return Except::Reduced(s.subs.clone());
                }
                except_from_subs(&s.subs, target)
            }
            AttributeSpec::Compound(c) => {
                if self.matches(target) {
                    return Except::Reduced(c.subs.clone());
                }
                except_from_subs(&c.subs, target)
            }
        }
    }
}

fn except_from_subs(subs: &[AttributeSpec], target: &AttributeSpec) -> Except<AttributeSpec> {
    let mut result = Vec::new();
    let mut found = false;
    for sub in subs {
        match sub {
            AttributeSpec::Shorthand(_) | AttributeSpec::Compound(_) => {
                match sub.except(target) {
                    Except::Reduced(inner) => {
                        found = true;
                        result.extend(inner);
                    }
                    Except::NotFound => result.push(sub.clone()),
                }
            }
            AttributeSpec::Typed(_) => {
                if sub.matches(target) {
                    found = true;
                    continue;
                }
                result.push(sub.clone());
            }
        }
    }
    if found {
        Except::Reduced(result)
    } else {
        Except::NotFound
    }
}

impl From<TypedSpec> for AttributeSpec {
    fn from(spec: TypedSpec) -> Self {
        AttributeSpec::Typed(spec)
    }
}

impl From<ShorthandSpec> for AttributeSpec {
    fn from(spec: ShorthandSpec) -> Self {
        AttributeSpec::Shorthand(spec)
    }
}

impl From<CompoundSpec> for AttributeSpec {
    fn from(spec: CompoundSpec) -> Self {
        AttributeSpec::Compound(spec)
    }
}
