//! Child grammar
//!
//! A definition describes its allowed children with a small grammar of
//! elements, wildcards, sequences and choices, after the XSD particle
//! model. [`GrammarNode`] is the closed sum over the four shapes.

use crate::error::{Error, Result};
use crate::node::TagKind;

/// Occurrence bounds of a grammar node. `max` of `None` means unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Occurs {
    /// Minimum occurrences
    pub min: u32,
    /// Maximum occurrences, `None` for unbounded
    pub max: Option<u32>,
}

impl Occurs {
    /// Exactly once, the XSD default
    pub fn once() -> Self {
        Occurs { min: 1, max: Some(1) }
    }

    /// Explicit bounds
    pub fn new(min: u32, max: Option<u32>) -> Self {
        Occurs { min, max }
    }

    /// Zero or one
    pub fn optional() -> Self {
        Occurs { min: 0, max: Some(1) }
    }

    /// Zero or more
    pub fn any() -> Self {
        Occurs { min: 0, max: None }
    }
}

impl Default for Occurs {
    fn default() -> Self {
        Occurs::once()
    }
}

/// Reference to one kind of child node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// The node kind this element stands for
    pub ref_kind: TagKind,
    /// Occurrence bounds
    pub occurs: Occurs,
}

impl Element {
    /// Element occurring exactly once
    pub fn new(ref_kind: TagKind) -> Result<Self> {
        if ref_kind.name().is_empty() {
            return Err(Error::InvalidElement(
                "element reference cannot be empty".to_string(),
            ));
        }
        Ok(Element {
            ref_kind,
            occurs: Occurs::once(),
        })
    }

    /// Element with explicit occurrence bounds
    pub fn with_occurs(ref_kind: TagKind, occurs: Occurs) -> Result<Self> {
        let mut element = Element::new(ref_kind)?;
        element.occurs = occurs;
        Ok(element)
    }
}

/// Wildcard accepting any child, optionally narrowed to one kind
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AnyElement {
    /// Optional narrowing to one node kind
    pub ref_kind: Option<TagKind>,
    /// Namespace hint carried through to consumers
    pub namespace: Option<String>,
    /// Content processing hint carried through to consumers
    pub process_contents: Option<String>,
    /// Occurrence bounds
    pub occurs: Occurs,
}

impl AnyElement {
    /// Unrestricted wildcard occurring exactly once
    pub fn new() -> Self {
        AnyElement {
            occurs: Occurs::once(),
            ..AnyElement::default()
        }
    }

    /// Narrow the wildcard to one node kind
    pub fn with_ref(mut self, ref_kind: TagKind) -> Self {
        self.ref_kind = Some(ref_kind);
        self
    }

    /// Set the namespace hint
    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Set the content processing hint
    pub fn process_contents(mut self, process_contents: impl Into<String>) -> Self {
        self.process_contents = Some(process_contents.into());
        self
    }

    /// Set the occurrence bounds
    pub fn occurs(mut self, occurs: Occurs) -> Self {
        self.occurs = occurs;
        self
    }
}

/// Ordered list of child particles
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Sequence {
    /// Child particles, in order
    pub children: Vec<GrammarNode>,
    /// Occurrence bounds
    pub occurs: Occurs,
}

impl Sequence {
    /// Sequence of the given particles, occurring exactly once
    pub fn new(children: Vec<GrammarNode>) -> Self {
        Sequence {
            children,
            occurs: Occurs::once(),
        }
    }

    /// Set the occurrence bounds
    pub fn occurs(mut self, occurs: Occurs) -> Self {
        self.occurs = occurs;
        self
    }
}

/// Alternative child particles
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Choice {
    /// Alternative particles
    pub children: Vec<GrammarNode>,
    /// Occurrence bounds
    pub occurs: Occurs,
}

impl Choice {
    /// Choice over the given particles, occurring exactly once
    pub fn new(children: Vec<GrammarNode>) -> Self {
        Choice {
            children,
            occurs: Occurs::once(),
        }
    }

    /// Set the minimum occurrences
    pub fn min_occurs(mut self, min: u32) -> Self {
        self.occurs.min = min;
        self
    }

    /// Set the maximum occurrences, `None` for unbounded
    pub fn max_occurs(mut self, max: Option<u32>) -> Self {
        self.occurs.max = max;
        self
    }
}

/// Any particle of the child grammar
#[derive(Debug, Clone, PartialEq)]
pub enum GrammarNode {
    /// A reference to one node kind
    Element(Element),
    /// A wildcard
    Any(AnyElement),
    /// An ordered group
    Sequence(Sequence),
    /// An alternative group
    Choice(Choice),
}

/// The four particle shapes, for shape-based matching
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrammarKind {
    /// A node kind reference
    Element,
    /// A wildcard
    Any,
    /// An ordered group
    Sequence,
    /// An alternative group
    Choice,
}

/// What a grammar search looks for: a specific element reference or any
/// particle of a given shape
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrammarTarget {
    /// An element referencing this node kind
    Ref(TagKind),
    /// Any particle of this shape
    Kind(GrammarKind),
}

impl GrammarNode {
    /// Shape of this particle
    pub fn kind(&self) -> GrammarKind {
        match self {
            GrammarNode::Element(_) => GrammarKind::Element,
            GrammarNode::Any(_) => GrammarKind::Any,
            GrammarNode::Sequence(_) => GrammarKind::Sequence,
            GrammarNode::Choice(_) => GrammarKind::Choice,
        }
    }

    /// Whether this particle matches a search target. A kind reference
    /// only ever matches element particles.
    pub fn matches(&self, target: &GrammarTarget) -> bool {
        match target {
            GrammarTarget::Ref(kind) => {
                matches!(self, GrammarNode::Element(element) if element.ref_kind == *kind)
            }
            GrammarTarget::Kind(kind) => self.kind() == *kind,
        }
    }

    /// Occurrence bounds of this particle
    pub fn occurs(&self) -> Occurs {
        match self {
            GrammarNode::Element(element) => element.occurs,
            GrammarNode::Any(any) => any.occurs,
            GrammarNode::Sequence(sequence) => sequence.occurs,
            GrammarNode::Choice(choice) => choice.occurs,
        }
    }

    /// Replace the occurrence bounds of this particle
    pub fn set_occurs(&mut self, occurs: Occurs) {
        match self {
            GrammarNode::Element(element) => element.occurs = occurs,
            GrammarNode::Any(any) => any.occurs = occurs,
            GrammarNode::Sequence(sequence) => sequence.occurs = occurs,
            GrammarNode::Choice(choice) => choice.occurs = occurs,
        }
    }

    /// Children of a container particle, `None` for leaves
    pub fn children_mut(&mut self) -> Option<&mut Vec<GrammarNode>> {
        match self {
            GrammarNode::Sequence(sequence) => Some(&mut sequence.children),
            GrammarNode::Choice(choice) => Some(&mut choice.children),
            GrammarNode::Element(_) | GrammarNode::Any(_) => None,
        }
    }

    /// Children of a container particle, `None` for leaves
    pub fn children(&self) -> Option<&[GrammarNode]> {
        match self {
            GrammarNode::Sequence(sequence) => Some(&sequence.children),
            GrammarNode::Choice(choice) => Some(&choice.children),
            GrammarNode::Element(_) | GrammarNode::Any(_) => None,
        }
    }
}

impl From<Element> for GrammarNode {
    fn from(element: Element) -> Self {
        GrammarNode::Element(element)
    }
}

impl From<AnyElement> for GrammarNode {
    fn from(any: AnyElement) -> Self {
        GrammarNode::Any(any)
    }
}

impl From<Sequence> for GrammarNode {
    fn from(sequence: Sequence) -> Self {
        GrammarNode::Sequence(sequence)
    }
}

impl From<Choice> for GrammarNode {
    fn from(choice: Choice) -> Self {
        GrammarNode::Choice(choice)
    }
}

/// Depth-first search for a target, innermost matches first
pub(crate) fn deep_search<'a>(
    nodes: &'a [GrammarNode],
    target: &GrammarTarget,
) -> Option<&'a GrammarNode> {
    for node in nodes {
        if let Some(children) = node.children() {
            if let Some(found) = deep_search(children, target) {
                return Some(found);
            }
        }
        if node.matches(target) {
            return Some(node);
        }
    }
    None
}

/// Detach the first particle matching the target, searching containers
/// before their own match. A container emptied by the removal is pruned
/// from its parent.
pub(crate) fn detach_from(
    nodes: &mut Vec<GrammarNode>,
    target: &GrammarTarget,
) -> Option<GrammarNode> {
    let mut index = 0;
    while index < nodes.len() {
        if let Some(children) = nodes[index].children_mut() {
            if let Some(found) = detach_from(children, target) {
                if children.is_empty() {
                    nodes.remove(index);
                }
                return Some(found);
            }
        }
        if nodes[index].matches(target) {
            return Some(nodes.remove(index));
        }
        index += 1;
    }
    None
}
