//! Error types for tagrules
//!
//! Structural errors raised while wiring specs, groups and grammars are
//! represented here. Failures found while validating a document are not
//! errors: the validation engine reports those as a `false` result plus
//! diagnostic messages.

use thiserror::Error;

/// Result type alias using tagrules Error
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for tagrules operations
#[derive(Error, Debug)]
pub enum Error {
    /// A registry lookup by name or type failed
    #[error("property not found: {0}")]
    PropertyNotFound(String),

    /// A collection was used in a way it does not support
    #[error("invalid collection operation: {0}")]
    InvalidCollectionOperation(String),

    /// A grammar element was constructed with invalid arguments
    #[error("invalid element: {0}")]
    InvalidElement(String),

    /// A validator pattern failed to compile
    #[error("pattern error: {0}")]
    Pattern(#[from] regex::Error),
}
