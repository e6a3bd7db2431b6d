//! Cumulative validator family
//!
//! These validators split an attribute value into chunks and spend a pool
//! of inner validators on them. The plain variants require every inner
//! validator to be consumed exactly once; the optional variants mark each
//! inner validator as mandatory or optional and relax the accounting.

use std::sync::Arc;

use crate::node::ValidatedNode;
use crate::validators::base::{run_validator, Validator};
use crate::validators::separators::Separator;

/// Whether an inner validator of an optional cumulative has to match
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    /// The chunk this validator covers may be absent
    Optional,
    /// A chunk matching this validator must be present
    Mandatory,
}

/// Overall matching requirement of an optional cumulative
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    /// At least one inner validator must consume a chunk
    AtLeastOne,
    /// The value may satisfy no inner validator at all
    CanBeNone,
}

/// Each chunk must be claimed by a distinct inner validator, in any
/// order, and every inner validator must end up claimed.
#[derive(Debug)]
pub struct CumulativeValidator {
    validators: Vec<Arc<dyn Validator>>,
    separator: Separator,
}

impl CumulativeValidator {
    /// Build from the pool of inner validators
    pub fn new(validators: Vec<Arc<dyn Validator>>) -> Self {
        CumulativeValidator {
            validators,
            separator: Separator::none(),
        }
    }

    /// Set the chunk separator
    pub fn separator(mut self, separator: char) -> Self {
        self.separator = keep_trim(&self.separator, separator);
        self
    }

    /// Trim each chunk before validating it
    pub fn trimming(mut self) -> Self {
        self.separator = self.separator.clone().trimming();
        self
    }
}

impl Validator for CumulativeValidator {
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
        let mut remaining: Vec<&Arc<dyn Validator>> = self.validators.iter().collect();
        for part in &parts {
            let part = trimmed(&self.separator, part);
            if remaining.is_empty() {
                return false;
            }
            let Some(pos) = remaining
                .iter()
                .position(|v| run_validator(v.as_ref(), part, root, current))
            else {
                return false;
            };
            remaining.remove(pos);
        }
        remaining.is_empty()
    }

    fn needs_context(&self) -> bool {
        self.validators.iter().any(|v| v.needs_context())
    }
}

/// Each chunk is validated by the inner validator at the same position.
/// Extra chunks beyond the validator list fail; missing trailing chunks
/// are accepted.
#[derive(Debug)]
pub struct CumulativeOrderedValidator {
    validators: Vec<Arc<dyn Validator>>,
    separator: Separator,
}

impl CumulativeOrderedValidator {
    /// Build from the positional inner validators
    pub fn new(validators: Vec<Arc<dyn Validator>>) -> Self {
        CumulativeOrderedValidator {
            validators,
            separator: Separator::none(),
        }
    }

    /// Set the chunk separator
    pub fn separator(mut self, separator: char) -> Self {
        self.separator = keep_trim(&self.separator, separator);
        self
    }

    /// Trim each chunk before validating it
    pub fn trimming(mut self) -> Self {
        self.separator = self.separator.clone().trimming();
        self
    }
}

impl Validator for CumulativeOrderedValidator {
    fn validate(&self, value: &str) -> bool {
        self.validate_with_context(value, None, None)
    }

    fn validate_with_context(
        &self,
        value: &str,
        root: Option<&dyn ValidatedNode>,
        current: Option<&dyn ValidatedNode>,
    ) -> bool {
        for (index, part) in self.separator.separate(value).iter().enumerate() {
            let part = trimmed(&self.separator, part);
            let Some(validator) = self.validators.get(index) else {
                return false;
            };
            if !run_validator(validator.as_ref(), part, root, current) {
                return false;
            }
        }
        true
    }

    fn needs_context(&self) -> bool {
        self.validators.iter().any(|v| v.needs_context())
    }
}

/// Unordered cumulative where inner validators are individually optional
/// or mandatory.
///
/// Chunks claim validators first-fit like [`CumulativeValidator`], but
/// leftover validators only fail the value when one of them is mandatory,
/// or when the mode is [`MatchMode::AtLeastOne`] and nothing was claimed.
#[derive(Debug)]
pub struct CumulativeOptionalValidator {
    rows: Vec<(Presence, Arc<dyn Validator>)>,
    mode: MatchMode,
    separator: Separator,
}

impl CumulativeOptionalValidator {
    /// Build from presence-tagged inner validators
    pub fn new(rows: Vec<(Presence, Arc<dyn Validator>)>, mode: MatchMode) -> Self {
        CumulativeOptionalValidator {
            rows,
            mode,
            separator: Separator::none(),
        }
    }

    /// Set the chunk separator
    pub fn separator(mut self, separator: char) -> Self {
        self.separator = keep_trim(&self.separator, separator);
        self
    }

    /// Trim each chunk before validating it
    pub fn trimming(mut self) -> Self {
        self.separator = self.separator.clone().trimming();
        self
    }
}

impl Validator for CumulativeOptionalValidator {
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
        let mut remaining: Vec<&(Presence, Arc<dyn Validator>)> = self.rows.iter().collect();
        for part in &parts {
            let part = trimmed(&self.separator, part);
            if remaining.is_empty() {
                return false;
            }
            let Some(pos) = remaining
                .iter()
                .position(|(_, v)| run_validator(v.as_ref(), part, root, current))
            else {
                return false;
            };
            remaining.remove(pos);
        }
        if remaining.is_empty() {
            return true;
        }
        if remaining.iter().any(|(p, _)| *p == Presence::Mandatory) {
            return false;
        }
        if self.mode == MatchMode::AtLeastOne && remaining.len() == self.rows.len() {
            return false;
        }
        true
    }

    fn needs_context(&self) -> bool {
        self.rows.iter().any(|(_, v)| v.needs_context())
    }
}

/// Positional cumulative where inner validators are individually optional
/// or mandatory.
///
/// When an optional validator rejects its chunk, the same chunk is
/// retried against the next validator in line. A mandatory rejection
/// fails the value; running out of validators fails it too.
#[derive(Debug)]
pub struct CumulativeOptionalOrderedValidator {
    rows: Vec<(Presence, Arc<dyn Validator>)>,
    mode: MatchMode,
    separator: Separator,
}

impl CumulativeOptionalOrderedValidator {
    /// Build from presence-tagged positional validators
    pub fn new(rows: Vec<(Presence, Arc<dyn Validator>)>, mode: MatchMode) -> Self {
        CumulativeOptionalOrderedValidator {
            rows,
            mode,
            separator: Separator::none(),
        }
    }

    /// Set the chunk separator
    pub fn separator(mut self, separator: char) -> Self {
        self.separator = keep_trim(&self.separator, separator);
        self
    }

    /// Trim each chunk before validating it
    pub fn trimming(mut self) -> Self {
        self.separator = self.separator.clone().trimming();
        self
    }
}

impl Validator for CumulativeOptionalOrderedValidator {
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
        if parts.is_empty() && self.mode == MatchMode::AtLeastOne {
            return false;
        }
        let mut row = 0;
        let mut index = 0;
        while index < parts.len() {
            let part = trimmed(&self.separator, &parts[index]);
            let Some((presence, validator)) = self.rows.get(row) else {
                return false;
            };
            if run_validator(validator.as_ref(), part, root, current) {
                index += 1;
            } else if *presence == Presence::Mandatory {
                return false;
            }
            // an optional miss keeps the chunk and moves to the next row
            row += 1;
        }
        true
    }

    fn needs_context(&self) -> bool {
        self.rows.iter().any(|(_, v)| v.needs_context())
    }
}

fn keep_trim(current: &Separator, separator: char) -> Separator {
    let next = Separator::new(separator);
    if current.should_trim() {
        next.trimming()
    } else {
        next
    }
}

fn trimmed<'a>(separator: &Separator, part: &'a str) -> &'a str {
    if separator.should_trim() {
        part.trim()
    } else {
        part
    }
}
