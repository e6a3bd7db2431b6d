//! # tagrules
//!
//! Schema-driven validation for in-memory document trees.
//!
//! Rules are written per node kind as a [`Definition`]: attribute specs
//! grouped in sections, reusable attribute groups, and a child grammar
//! of elements, sequences and choices after the XSD particle model.
//! A [`PropertyRegistry`] owns every spec a validation run can resolve,
//! and a [`TagValidator`] walks any tree implementing [`ValidatedNode`]
//! and reports diagnostics.
//!
//! ## Example
//!
//! ```rust,ignore
//! use tagrules::{Definition, PropertyRegistry, TagValidator};
//!
//! let mut registry = PropertyRegistry::new();
//! let mut validator = TagValidator::new();
//!
//! // nodes build their own Definition through ValidatedNode
//! let valid = validator.validate(&document, &mut registry);
//! for error in validator.errors() {
//!     eprintln!("{error}");
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;

pub mod node;
pub mod validators;

pub mod attributes;
pub mod groups;
pub mod registry;

pub mod definition;
pub mod engine;
pub mod grammar;

pub use attributes::{AttributeSpec, CompoundSpec, Except, ShorthandSpec, TypedSpec};
pub use definition::{Definition, SpecSource};
pub use engine::{DefinitionHook, TagValidator, TagValidatorBuilder, ValueComputer};
pub use error::{Error, Result};
pub use grammar::{
    AnyElement, Choice, Element, GrammarKind, GrammarNode, GrammarTarget, Occurs, Sequence,
};
pub use groups::{AttributeGroup, GroupMember};
pub use node::{NodeAttribute, TagKind, ValidatedNode};
pub use registry::{PropertyRegistry, Registrable, SpecDef, SpecType};
pub use validators::{
    CompoundValidator, CumulativeOptionalOrderedValidator, CumulativeOptionalValidator,
    CumulativeOrderedValidator, CumulativeValidator, EnumValidator, IntersectValidator,
    InverseRegexValidator, MatchMode, Presence, RegexValidator, Separator, TypeRef, UnionValidator,
    Validator, ValidatorType,
};
