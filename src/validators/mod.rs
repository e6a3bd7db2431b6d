//! Validator library
//!
//! Everything that checks attribute values lives here: the base
//! [`Validator`] contract, pattern and enumeration validators, the
//! combinators, the cumulative family and the built-in XML types.

pub mod base;
pub mod builtins;
pub mod combinators;
pub mod cumulative;
pub mod separators;
pub mod strings;

pub use base::{TypeRef, Validator, ValidatorType};
pub use combinators::{CompoundValidator, IntersectValidator, UnionValidator};
pub use cumulative::{
    CumulativeOptionalOrderedValidator, CumulativeOptionalValidator, CumulativeOrderedValidator,
    CumulativeValidator, MatchMode, Presence,
};
pub use separators::Separator;
pub use strings::{EnumValidator, InverseRegexValidator, RegexValidator};
