//! Validators built out of other validators

use std::sync::Arc;

use crate::node::ValidatedNode;
use crate::validators::base::{run_validator, Validator};
use crate::validators::separators::Separator;

/// Passes when any of the inner validators passes
#[derive(Debug)]
pub struct UnionValidator {
    validators: Vec<Arc<dyn Validator>>,
}

impl UnionValidator {
    /// Build from the inner validators, tried in order
    pub fn new(validators: Vec<Arc<dyn Validator>>) -> Self {
        UnionValidator { validators }
    }
}

impl Validator for UnionValidator {
    fn validate(&self, value: &str) -> bool {
        self.validate_with_context(value, None, None)
    }

    fn validate_with_context(
        &self,
        value: &str,
        root: Option<&dyn ValidatedNode>,
        current: Option<&dyn ValidatedNode>,
    ) -> bool {
        self.validators
            .iter()
            .any(|v| run_validator(v.as_ref(), value, root, current))
    }

    fn needs_context(&self) -> bool {
        self.validators.iter().any(|v| v.needs_context())
    }
}

/// Passes only when every inner validator passes
#[derive(Debug)]
pub struct IntersectValidator {
    validators: Vec<Arc<dyn Validator>>,
}

impl IntersectValidator {
    /// Build from the inner validators, tried in order
    pub fn new(validators: Vec<Arc<dyn Validator>>) -> Self {
        IntersectValidator { validators }
    }
}

impl Validator for IntersectValidator {
    fn validate(&self, value: &str) -> bool {
        self.validate_with_context(value, None, None)
    }

    fn validate_with_context(
        &self,
        value: &str,
        root: Option<&dyn ValidatedNode>,
        current: Option<&dyn ValidatedNode>,
    ) -> bool {
        self.validators
            .iter()
            .all(|v| run_validator(v.as_ref(), value, root, current))
    }

    fn needs_context(&self) -> bool {
        self.validators.iter().any(|v| v.needs_context())
    }
}

/// Splits a value into chunks and validates every chunk with one inner
/// validator, enforcing a chunk count between `min` and `max`.
#[derive(Debug)]
pub struct CompoundValidator {
    validator: Arc<dyn Validator>,
    min: usize,
    max: Option<usize>,
    separator: Separator,
}

impl CompoundValidator {
    /// Build with occurrence bounds, `max` of `None` meaning unbounded
    pub fn new(validator: Arc<dyn Validator>, min: usize, max: Option<usize>) -> Self {
        CompoundValidator {
            validator,
            min,
            max,
            separator: Separator::none(),
        }
    }

    /// Set the chunk separator
    pub fn separator(mut self, separator: char) -> Self {
        let trim = self.separator.should_trim();
        self.separator = Separator::new(separator);
        if trim {
            self.separator = self.separator.trimming();
        }
        self
    }

    /// Trim each chunk before validating it
    pub fn trimming(mut self) -> Self {
        self.separator = self.separator.trimming();
        self
    }
}

impl Validator for CompoundValidator {
    fn validate(&self, value: &str) -> bool {
        self.validate_with_context(value, None, None)
    }

    fn validate_with_context(
        &self,
        value: &str,
        root: Option<&dyn ValidatedNode>,
        current: Option<&dyn ValidatedNode>,
    ) -> bool {
        let parts = self.separator.separate(value);
        if parts.len() < self.min {
            return false;
        }
        if let Some(max) = self.max {
            if parts.len() > max {
                return false;
            }
        }
        for part in &parts {
            let part = if self.separator.should_trim() {
                part.trim()
            } else {
                part.as_str()
            };
            if !run_validator(self.validator.as_ref(), part, root, current) {
                return false;
            }
        }
        true
    }

    fn needs_context(&self) -> bool {
        self.validator.needs_context()
    }
}
