//! Pattern and enumeration validators

use regex::{Regex, RegexBuilder};

use crate::error::Result;
use crate::validators::base::Validator;

/// Apply textual pattern flags to a builder.
///
/// The `u` flag is accepted and ignored, patterns are always unicode
/// aware here. Unknown flags are reported and skipped.
fn apply_flags(builder: &mut RegexBuilder, flags: &str) {
    for flag in flags.chars() {
        match flag {
            'i' => {
                builder.case_insensitive(true);
            }
            'm' => {
                builder.multi_line(true);
            }
            's' => {
                builder.dot_matches_new_line(true);
            }
            'x' => {
                builder.ignore_whitespace(true);
            }
            'u' => {}
            other => {
                log::warn!("ignoring unsupported pattern flag '{other}'");
            }
        }
    }
}

/// Matches a value against a regular expression.
///
/// The expression is anchored at both ends, so the full value must match
/// rather than any substring of it.
#[derive(Debug)]
pub struct RegexValidator {
    regex: Regex,
}

impl RegexValidator {
    /// Compile an anchored pattern
    pub fn new(expression: &str) -> Result<Self> {
        Self::with_flags(expression, "")
    }

    /// Compile an anchored pattern with textual flags
    pub fn with_flags(expression: &str, flags: &str) -> Result<Self> {
        let mut builder = RegexBuilder::new(&format!("^(?:{expression})$"));
        apply_flags(&mut builder, flags);
        Ok(RegexValidator {
            regex: builder.build()?,
        })
    }
}

impl Validator for RegexValidator {
    fn validate(&self, value: &str) -> bool {
        self.regex.is_match(value)
    }
}

/// Rejects a value when a forbidden pattern appears anywhere in it.
///
/// Unlike [`RegexValidator`] the expression is not anchored: any match
/// within the value fails the validation.
#[derive(Debug)]
pub struct InverseRegexValidator {
    regex: Regex,
}

impl InverseRegexValidator {
    /// Compile an unanchored forbidden pattern
    pub fn new(expression: &str) -> Result<Self> {
        Self::with_flags(expression, "")
    }

    /// Compile an unanchored forbidden pattern with textual flags
    pub fn with_flags(expression: &str, flags: &str) -> Result<Self> {
        let mut builder = RegexBuilder::new(expression);
        apply_flags(&mut builder, flags);
        Ok(InverseRegexValidator {
            regex: builder.build()?,
        })
    }
}

impl Validator for InverseRegexValidator {
    fn validate(&self, value: &str) -> bool {
        !self.regex.is_match(value)
    }
}

/// Allows a fixed set of values, compared exactly
#[derive(Debug, Clone)]
pub struct EnumValidator {
    values: Vec<String>,
}

impl EnumValidator {
    /// Build from the allowed values
    pub fn new<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        EnumValidator {
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// Allowed values, in declaration order
    pub fn values(&self) -> &[String] {
        &self.values
    }

    /// Report configuration mistakes in this validator: an empty set,
    /// duplicate values, or an empty string among the values. A non-empty
    /// report does not prevent use.
    pub fn self_check(&self) -> Vec<String> {
        let mut report = Vec::new();
        if self.values.is_empty() {
            report.push("enum has no values".to_string());
        }
        let mut seen = std::collections::HashSet::new();
        for value in &self.values {
            if !seen.insert(value.as_str()) {
                report.push(format!("enum value {value:?} is duplicated"));
            }
        }
        if self.values.iter().any(String::is_empty) {
            report.push("enum contains an empty value".to_string());
        }
        report
    }
}

impl Validator for EnumValidator {
    fn validate(&self, value: &str) -> bool {
        self.values.iter().any(|v| v == value)
    }
}
