//! Built-in validator types
//!
//! Ready-made validator types for the character productions of the XML
//! specification, plus a CSS-style identifier. Each is exposed as a
//! [`ValidatorType`] so specs can reference it by name and have the
//! validator built on demand.

use std::sync::Arc;

use once_cell::sync::Lazy;

use crate::error::Result;
use crate::validators::base::{Validator, ValidatorType};
use crate::validators::combinators::{IntersectValidator, UnionValidator};
use crate::validators::strings::{InverseRegexValidator, RegexValidator};

/// NameStartChar production, prefix colon included
pub const NAME_START_CHAR_PATTERN: &str = ":|[A-Z]|_|[a-z]|[\\x{C0}-\\x{D6}]|[\\x{D8}-\\x{F6}]|[\\x{F8}-\\x{02FF}]|[\\x{0370}-\\x{037D}]|[\\x{037F}-\\x{1FFF}]|[\\x{200C}-\\x{200D}]|[\\x{2070}-\\x{218F}]|[\\x{2C00}-\\x{2FEF}]|[\\x{3001}-\\x{D7FF}]|[\\x{F900}-\\x{FDCF}]|[\\x{FDF0}-\\x{FFFD}]";

/// NameStartChar without the colon, for non-colonized names
pub const UNPREFIXABLE_NAME_START_CHAR_PATTERN: &str = "[A-Z]|_|[a-z]|[\\x{C0}-\\x{D6}]|[\\x{D8}-\\x{F6}]|[\\x{F8}-\\x{02FF}]|[\\x{0370}-\\x{037D}]|[\\x{037F}-\\x{1FFF}]|[\\x{200C}-\\x{200D}]|[\\x{2070}-\\x{218F}]|[\\x{2C00}-\\x{2FEF}]|[\\x{3001}-\\x{D7FF}]|[\\x{F900}-\\x{FDCF}]|[\\x{FDF0}-\\x{FFFD}]";

const NAME_CHAR_EXTRA: &str = "\\-|\\.|[0-9]|\\x{B7}|[\\x{0300}-\\x{036F}]|[\\x{203F}-\\x{2040}]";

/// NameChar production
pub static NAME_CHAR_PATTERN: Lazy<String> =
    Lazy::new(|| format!("{NAME_START_CHAR_PATTERN}|{NAME_CHAR_EXTRA}"));

/// NameChar without the colon
pub static UNPREFIXABLE_NAME_CHAR_PATTERN: Lazy<String> =
    Lazy::new(|| format!("{UNPREFIXABLE_NAME_START_CHAR_PATTERN}|{NAME_CHAR_EXTRA}"));

/// Name ::= NameStartChar (NameChar)*
static NAME_PATTERN: Lazy<String> = Lazy::new(|| {
    format!(
        "(?:{NAME_START_CHAR_PATTERN})(?:{})*",
        NAME_CHAR_PATTERN.as_str()
    )
});

/// NCName ::= NCNameStartChar NCNameChar*
static NC_NAME_PATTERN: Lazy<String> = Lazy::new(|| {
    format!(
        "(?:{UNPREFIXABLE_NAME_START_CHAR_PATTERN})(?:{})*",
        UNPREFIXABLE_NAME_CHAR_PATTERN.as_str()
    )
});

/// Nmtoken ::= (NameChar)+
static NM_TOKEN_PATTERN: Lazy<String> =
    Lazy::new(|| format!("(?:{})+", NAME_CHAR_PATTERN.as_str()));

/// The four blank characters XML allows in white space
pub const BLANK_CHAR_PATTERN: &str = "\\x{20}|\\x{9}|\\x{D}|\\x{A}";

/// Any single character that is not an XML blank
const NOT_BLANK_CHAR_PATTERN: &str = "[^\\x{20}\\x{9}\\x{D}\\x{A}]";

/// CharRef ::= '&#' [0-9]+ ';' | '&#x' [0-9a-fA-F]+ ';'
const CHAR_ENTITY_PATTERN: &str = "&#(?:x[0-9A-Fa-f]+|[0-9]+);";

/// Char production, the full accepted unicode range
pub const UNICODE_CHAR_PATTERN: &str =
    "(?:[\\x{1}-\\x{D7FF}]|[\\x{E000}-\\x{FFFD}]|[\\x{10000}-\\x{10FFFF}])";

const RESTRICTED_CHARS: &str =
    "[\\x{1}-\\x{8}]|[\\x{B}-\\x{C}]|[\\x{E}-\\x{1F}]|[\\x{7F}-\\x{84}]|[\\x{86}-\\x{9F}]";

const EXTENDED_RESTRICTED_CHARS: &str = "[\\x{FDD0}-\\x{FDDF}]|[\\x{1FFFE}-\\x{1FFFF}]|[\\x{2FFFE}-\\x{2FFFF}]|[\\x{3FFFE}-\\x{3FFFF}]|[\\x{4FFFE}-\\x{4FFFF}]|[\\x{5FFFE}-\\x{5FFFF}]|[\\x{6FFFE}-\\x{6FFFF}]|[\\x{7FFFE}-\\x{7FFFF}]|[\\x{8FFFE}-\\x{8FFFF}]|[\\x{9FFFE}-\\x{9FFFF}]|[\\x{AFFFE}-\\x{AFFFF}]|[\\x{BFFFE}-\\x{BFFFF}]|[\\x{CFFFE}-\\x{CFFFF}]|[\\x{DFFFE}-\\x{DFFFF}]|[\\x{EFFFE}-\\x{EFFFF}]|[\\x{FFFFE}-\\x{FFFFF}]|[\\x{10FFFE}-\\x{10FFFF}]";

/// Restricted and discouraged characters, forbidden anywhere in a value
static RESTRICTED_PATTERN: Lazy<String> =
    Lazy::new(|| format!("{RESTRICTED_CHARS}|{EXTENDED_RESTRICTED_CHARS}"));

static STRING_PATTERN: Lazy<String> = Lazy::new(|| format!("{UNICODE_CHAR_PATTERN}*"));

const IDENTIFIER_ESCAPE: &str = "\\\\[0-9a-fA-F]{1,6}\\s?|\\\\[^0-9a-fA-F]";

/// CSS identifier: an optional single leading hyphen, then a start
/// character that is neither a digit nor a hyphen, then identifier
/// characters. This rules out a leading digit, a leading `-<digit>` and
/// a leading `--`.
static IDENTIFIER_PATTERN: Lazy<String> = Lazy::new(|| {
    format!(
        "-?(?:[a-zA-Z_]|[^\\x00-\\x7F]|{IDENTIFIER_ESCAPE})(?:[a-zA-Z0-9_-]|[^\\x00-\\x7F]|{IDENTIFIER_ESCAPE})*"
    )
});

fn regex(pattern: &str) -> Result<Arc<dyn Validator>> {
    Ok(Arc::new(RegexValidator::new(pattern)?))
}

fn build_name_start_char() -> Result<Arc<dyn Validator>> {
    regex(NAME_START_CHAR_PATTERN)
}

fn build_name_char() -> Result<Arc<dyn Validator>> {
    regex(&NAME_CHAR_PATTERN)
}

fn build_name() -> Result<Arc<dyn Validator>> {
    regex(&NAME_PATTERN)
}

fn build_nc_name() -> Result<Arc<dyn Validator>> {
    regex(&NC_NAME_PATTERN)
}

fn build_nm_token() -> Result<Arc<dyn Validator>> {
    regex(&NM_TOKEN_PATTERN)
}

fn build_blank_char() -> Result<Arc<dyn Validator>> {
    regex(BLANK_CHAR_PATTERN)
}

fn build_not_blank_char() -> Result<Arc<dyn Validator>> {
    regex(NOT_BLANK_CHAR_PATTERN)
}

fn build_char_entity() -> Result<Arc<dyn Validator>> {
    regex(CHAR_ENTITY_PATTERN)
}

fn build_unrestricted() -> Result<Arc<dyn Validator>> {
    Ok(Arc::new(InverseRegexValidator::new(&RESTRICTED_PATTERN)?))
}

fn build_unicode_char() -> Result<Arc<dyn Validator>> {
    Ok(Arc::new(IntersectValidator::new(vec![
        regex(UNICODE_CHAR_PATTERN)?,
        build_unrestricted()?,
    ])))
}

fn build_character() -> Result<Arc<dyn Validator>> {
    Ok(Arc::new(UnionValidator::new(vec![
        build_char_entity()?,
        build_unicode_char()?,
    ])))
}

fn build_string() -> Result<Arc<dyn Validator>> {
    regex(&STRING_PATTERN)
}

fn build_identifier() -> Result<Arc<dyn Validator>> {
    regex(&IDENTIFIER_PATTERN)
}

/// A single NameStartChar
pub const NAME_START_CHAR: ValidatorType = ValidatorType {
    name: "xml.name-start-char",
    build: build_name_start_char,
};

/// A single NameChar
pub const NAME_CHAR: ValidatorType = ValidatorType {
    name: "xml.name-char",
    build: build_name_char,
};

/// An XML Name
pub const NAME: ValidatorType = ValidatorType {
    name: "xml.name",
    build: build_name,
};

/// An XML Name without a colon
pub const NC_NAME: ValidatorType = ValidatorType {
    name: "xml.nc-name",
    build: build_nc_name,
};

/// An XML Nmtoken
pub const NM_TOKEN: ValidatorType = ValidatorType {
    name: "xml.nm-token",
    build: build_nm_token,
};

/// A single blank character
pub const BLANK_CHAR: ValidatorType = ValidatorType {
    name: "xml.blank-char",
    build: build_blank_char,
};

/// A single non-blank character
pub const NOT_BLANK_CHAR: ValidatorType = ValidatorType {
    name: "xml.not-blank-char",
    build: build_not_blank_char,
};

/// A character reference such as `&#xA9;` or `&#169;`
pub const CHAR_ENTITY: ValidatorType = ValidatorType {
    name: "xml.char-entity",
    build: build_char_entity,
};

/// A single accepted character that is not restricted or discouraged
pub const UNICODE_CHAR: ValidatorType = ValidatorType {
    name: "xml.unicode-char",
    build: build_unicode_char,
};

/// A single character or a character reference
pub const CHARACTER: ValidatorType = ValidatorType {
    name: "xml.character",
    build: build_character,
};

/// Any run of accepted characters, empty included
pub const STRING: ValidatorType = ValidatorType {
    name: "xml.string",
    build: build_string,
};

/// A CSS-style identifier
pub const IDENTIFIER: ValidatorType = ValidatorType {
    name: "css.identifier",
    build: build_identifier,
};

#[cfg(test)]
mod tests {
    use super::*;

    fn passes(ty: &ValidatorType, value: &str) -> bool {
        (ty.build)().unwrap().validate(value)
    }

    #[test]
    fn test_name_start_char() {
        assert!(passes(&NAME_START_CHAR, "a"));
        assert!(passes(&NAME_START_CHAR, ":"));
        assert!(passes(&NAME_START_CHAR, "_"));
        assert!(!passes(&NAME_START_CHAR, "1"));
        assert!(!passes(&NAME_START_CHAR, "-"));
        assert!(!passes(&NAME_START_CHAR, "ab"));
    }

    #[test]
    fn test_name() {
        assert!(passes(&NAME, "p"));
        assert!(passes(&NAME, "xlink:href"));
        assert!(passes(&NAME, "_under-score.1"));
        assert!(!passes(&NAME, "1st"));
        assert!(!passes(&NAME, ""));
    }

    #[test]
    fn test_nc_name_rejects_colon() {
        assert!(passes(&NC_NAME, "href"));
        assert!(!passes(&NC_NAME, "xlink:href"));
        assert!(!passes(&NC_NAME, ":href"));
    }

    #[test]
    fn test_nm_token_allows_leading_digit() {
        assert!(passes(&NM_TOKEN, "007"));
        assert!(passes(&NM_TOKEN, "a-b.c"));
        assert!(!passes(&NM_TOKEN, ""));
        assert!(!passes(&NM_TOKEN, "a b"));
    }

    #[test]
    fn test_blank_chars() {
        assert!(passes(&BLANK_CHAR, " "));
        assert!(passes(&BLANK_CHAR, "\t"));
        assert!(passes(&BLANK_CHAR, "\n"));
        assert!(!passes(&BLANK_CHAR, "x"));

        assert!(passes(&NOT_BLANK_CHAR, "x"));
        assert!(!passes(&NOT_BLANK_CHAR, " "));
        assert!(!passes(&NOT_BLANK_CHAR, "\t"));
    }

    #[test]
    fn test_char_entity() {
        assert!(passes(&CHAR_ENTITY, "&#169;"));
        assert!(passes(&CHAR_ENTITY, "&#xA9;"));
        assert!(!passes(&CHAR_ENTITY, "&#xG1;"));
        assert!(!passes(&CHAR_ENTITY, "&#;"));
    }

    #[test]
    fn test_unicode_char_excludes_restricted() {
        assert!(passes(&UNICODE_CHAR, "A"));
        assert!(passes(&UNICODE_CHAR, "é"));
        assert!(!passes(&UNICODE_CHAR, "\u{7}"));
        assert!(!passes(&UNICODE_CHAR, "\u{FDD0}"));
    }

    #[test]
    fn test_character_accepts_entities_too() {
        assert!(passes(&CHARACTER, "A"));
        assert!(passes(&CHARACTER, "&#xA9;"));
        assert!(!passes(&CHARACTER, "\u{7}"));
    }

    #[test]
    fn test_string_accepts_empty() {
        assert!(passes(&STRING, ""));
        assert!(passes(&STRING, "hello world"));
    }

    #[test]
    fn test_identifier() {
        assert!(passes(&IDENTIFIER, "main"));
        assert!(passes(&IDENTIFIER, "-moz-thing"));
        assert!(passes(&IDENTIFIER, "_private"));
        assert!(!passes(&IDENTIFIER, "1abc"));
        assert!(!passes(&IDENTIFIER, "-1abc"));
        assert!(!passes(&IDENTIFIER, "--custom"));
    }
}
