//! Document node abstraction
//!
//! The validation engine does not own a document model. Instead it walks
//! any tree whose nodes implement [`ValidatedNode`]: each node reports its
//! tag name, kind, attributes and children, and can produce the rule
//! [`Definition`](crate::definition::Definition) that governs it.

use crate::definition::Definition;
use crate::error::Result;
use crate::registry::PropertyRegistry;

/// Identity of a node kind, compared by its canonical name.
///
/// Grammar elements reference node kinds rather than node instances, so a
/// rule written once applies to every node of that kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TagKind(pub &'static str);

impl TagKind {
    /// Canonical name of this kind
    pub fn name(&self) -> &'static str {
        self.0
    }
}

impl std::fmt::Display for TagKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.0)
    }
}

/// A single attribute carried by a document node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeAttribute {
    /// Full attribute name as written, prefix included
    pub name: String,
    /// Name without any namespace prefix
    pub local_name: String,
    /// Namespace prefix, if the attribute carries one
    pub prefix: Option<String>,
    /// Raw attribute value
    pub value: String,
}

impl NodeAttribute {
    /// Build an attribute from its written name and value, splitting off
    /// a namespace prefix when present.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        let (prefix, local_name) = match name.split_once(':') {
            Some((p, l)) => (Some(p.to_string()), l.to_string()),
            None => (None, name.clone()),
        };
        NodeAttribute {
            name,
            local_name,
            prefix,
            value: value.into(),
        }
    }
}

/// A node of the document tree under validation
pub trait ValidatedNode {
    /// Tag name as it appears in the document
    fn tag_name(&self) -> &str;

    /// Kind of this node, used to match grammar references
    fn kind(&self) -> TagKind;

    /// Whether this node is of the given kind.
    ///
    /// The default compares kinds for equality; implementations with kind
    /// subtyping can widen the match.
    fn is_kind(&self, kind: &TagKind) -> bool {
        self.kind() == *kind
    }

    /// Attributes present on this node
    fn attributes(&self) -> Vec<NodeAttribute>;

    /// Child nodes, in document order
    fn children(&self) -> Vec<&dyn ValidatedNode>;

    /// Whether this node can hold children
    fn is_container(&self) -> bool;

    /// Root of the tree this node belongs to
    fn root(&self) -> &dyn ValidatedNode;

    /// Whether a rule definition exists for this node kind.
    ///
    /// Children without a definition are skipped by the engine rather
    /// than rejected.
    fn has_definition(&self) -> bool {
        true
    }

    /// Produce the rule definition for this node kind
    fn as_definition(&self, registry: &mut PropertyRegistry) -> Result<Definition>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_attribute_splits_prefix() {
        let attr = NodeAttribute::new("xlink:href", "#target");
        assert_eq!(attr.name, "xlink:href");
        assert_eq!(attr.local_name, "href");
        assert_eq!(attr.prefix.as_deref(), Some("xlink"));
        assert_eq!(attr.value, "#target");
    }

    #[test]
    fn test_node_attribute_without_prefix() {
        let attr = NodeAttribute::new("color", "red");
        assert_eq!(attr.local_name, "color");
        assert!(attr.prefix.is_none());
    }

    #[test]
    fn test_tag_kind_display() {
        assert_eq!(TagKind("paragraph").to_string(), "paragraph");
    }
}
