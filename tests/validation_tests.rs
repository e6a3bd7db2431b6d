//! End-to-end validation tests.
//!
//! These tests build a small document model on top of [`ValidatedNode`]
//! and drive the full pipeline: definitions composed against a registry,
//! hooks and value computers on the engine, grammar checks and the
//! diagnostics they produce.

use pretty_assertions::assert_eq;

use tagrules::validators::builtins;
use tagrules::{
    AttributeGroup, AttributeSpec, Choice, Definition, Element, EnumValidator, GrammarNode,
    NodeAttribute, Occurs, PropertyRegistry, RegexValidator, Sequence, TagKind, TagValidator,
    TagValidatorBuilder, TypeRef, TypedSpec, ValidatedNode,
};

// =============================================================================
// Test document model
// =============================================================================

const DOC: TagKind = TagKind("doc");
const TITLE: TagKind = TagKind("title");
const PARA: TagKind = TagKind("para");
const NOTE: TagKind = TagKind("note");
const FIGURE: TagKind = TagKind("figure");

struct TestNode {
    kind: TagKind,
    attributes: Vec<NodeAttribute>,
    children: Vec<TestNode>,
    container: bool,
}

impl TestNode {
    fn new(kind: TagKind) -> Self {
        TestNode {
            kind,
            attributes: Vec::new(),
            children: Vec::new(),
            container: true,
        }
    }

    fn leaf(kind: TagKind) -> Self {
        TestNode {
            container: false,
            ..TestNode::new(kind)
        }
    }

    fn attr(mut self, name: &str, value: &str) -> Self {
        self.attributes.push(NodeAttribute::new(name, value));
        self
    }

    fn child(mut self, child: TestNode) -> Self {
        self.children.push(child);
        self
    }
}

impl ValidatedNode for TestNode {
    fn tag_name(&self) -> &str {
        self.kind.name()
    }

    fn kind(&self) -> TagKind {
        self.kind
    }

    fn attributes(&self) -> Vec<NodeAttribute> {
        self.attributes.clone()
    }

    fn children(&self) -> Vec<&dyn ValidatedNode> {
        self.children
            .iter()
            .map(|child| child as &dyn ValidatedNode)
            .collect()
    }

    fn is_container(&self) -> bool {
        self.container
    }

    fn root(&self) -> &dyn ValidatedNode {
        self
    }

    fn has_definition(&self) -> bool {
        self.kind != FIGURE
    }

    fn as_definition(&self, registry: &mut PropertyRegistry) -> tagrules::Result<Definition> {
        let mut definition = Definition::new();
        match self.kind.name() {
            "doc" => {
                definition
                    .allow(registry, TypedSpec::new("lang", builtins::NM_TOKEN))
                    .allow(
                        registry,
                        TypedSpec::new(
                            "version",
                            TypeRef::of(RegexValidator::new(r"\d+(?:\.\d+)?").unwrap()),
                        ),
                    )
                    .sequence(Sequence::new(vec![
                        element(TITLE, Occurs::once()),
                        element(PARA, Occurs::new(1, None)),
                    ]));
            }
            "title" => {}
            "para" => {
                definition
                    .mixed()
                    .allow(
                        registry,
                        AttributeGroup::new(
                            "fonts",
                            vec![
                                typed("font-family", builtins::STRING).into(),
                                typed("font-size", builtins::NM_TOKEN).into(),
                            ],
                        ),
                    )
                    .allow(
                        registry,
                        TypedSpec::new(
                            "align",
                            TypeRef::of(EnumValidator::new(["left", "right", "center"])),
                        ),
                    )
                    .sequence(Sequence::new(vec![element(NOTE, Occurs::optional())]));
            }
            "note" => {
                definition.allow(registry, typed("role", builtins::NC_NAME));
            }
            other => panic!("no definition wired for {other}"),
        }
        Ok(definition)
    }
}

fn typed(name: &str, ty: tagrules::ValidatorType) -> AttributeSpec {
    AttributeSpec::Typed(TypedSpec::new(name, ty))
}

fn element(kind: TagKind, occurs: Occurs) -> GrammarNode {
    GrammarNode::Element(Element::with_occurs(kind, occurs).unwrap())
}

fn valid_doc() -> TestNode {
    TestNode::new(DOC)
        .attr("lang", "en")
        .child(TestNode::leaf(TITLE))
        .child(TestNode::new(PARA).attr("align", "left"))
}

// =============================================================================
// Attribute validation
// =============================================================================

#[test]
fn test_valid_document_passes() {
    let mut registry = PropertyRegistry::new();
    let mut validator = TagValidator::new();
    assert!(validator.validate(&valid_doc(), &mut registry));
    assert_eq!(validator.errors(), &[] as &[String]);
}

#[test]
fn test_unknown_attribute_is_disallowed() {
    let mut registry = PropertyRegistry::new();
    let mut validator = TagValidator::new();
    let doc = valid_doc().attr("bogus", "x");
    assert!(!validator.validate(&doc, &mut registry));
    assert_eq!(
        validator.errors(),
        &["Attribute bogus is disallowed on doc".to_string()]
    );
}

#[test]
fn test_invalid_attribute_value() {
    let mut registry = PropertyRegistry::new();
    let mut validator = TagValidator::new();
    let doc = valid_doc().attr("version", "one.two");
    assert!(!validator.validate(&doc, &mut registry));
    assert_eq!(
        validator.errors(),
        &["Attribute version has an invalid value: one.two".to_string()]
    );
}

#[test]
fn test_namespace_attributes_are_skipped() {
    let mut registry = PropertyRegistry::new();
    let mut validator = TagValidator::new();
    let doc = valid_doc()
        .attr("xmlns:x", "http://example.com/ns")
        .attr("xml:space", "preserve");
    assert!(validator.validate(&doc, &mut registry));
}

#[test]
fn test_group_attributes_are_accepted_on_children() {
    let mut registry = PropertyRegistry::new();
    let mut validator = TagValidator::new();
    let doc = TestNode::new(DOC)
        .child(TestNode::leaf(TITLE))
        .child(
            TestNode::new(PARA)
                .attr("font-family", "serif")
                .attr("font-size", "12pt"),
        );
    assert!(validator.validate(&doc, &mut registry));
}

#[test]
fn test_enum_attribute_rejects_unknown_keyword() {
    let mut registry = PropertyRegistry::new();
    let mut validator = TagValidator::new();
    let doc = TestNode::new(DOC)
        .child(TestNode::leaf(TITLE))
        .child(TestNode::new(PARA).attr("align", "justified"));
    assert!(!validator.validate(&doc, &mut registry));
    assert_eq!(
        validator.errors(),
        &["Attribute align has an invalid value: justified".to_string()]
    );
}

// =============================================================================
// Grammar validation
// =============================================================================

#[test]
fn test_missing_mandatory_child() {
    let mut registry = PropertyRegistry::new();
    let mut validator = TagValidator::new();
    // no title
    let doc = TestNode::new(DOC).child(TestNode::new(PARA));
    assert!(!validator.validate(&doc, &mut registry));
    assert_eq!(
        validator.errors(),
        &["title must be at least 1 occurrences".to_string()]
    );
}

#[test]
fn test_too_many_children() {
    let mut registry = PropertyRegistry::new();
    let mut validator = TagValidator::new();
    let doc = valid_doc().child(TestNode::leaf(TITLE));
    assert!(!validator.validate(&doc, &mut registry));
    assert_eq!(
        validator.errors(),
        &["title must be at most 1 occurrences".to_string()]
    );
}

#[test]
fn test_child_outside_grammar_is_rejected() {
    let mut registry = PropertyRegistry::new();
    let mut validator = TagValidator::new();
    let doc = valid_doc().child(TestNode::new(NOTE));
    assert!(!validator.validate(&doc, &mut registry));
    assert_eq!(validator.errors(), &["note is not allowed".to_string()]);
}

#[test]
fn test_child_without_definition_is_skipped() {
    let mut registry = PropertyRegistry::new();
    let mut validator = TagValidator::new();
    // figure reports no definition, the engine walks past it
    let doc = valid_doc().child(TestNode::leaf(FIGURE));
    assert!(validator.validate(&doc, &mut registry));
}

#[test]
fn test_nested_validation_reports_inner_errors() {
    let mut registry = PropertyRegistry::new();
    let mut validator = TagValidator::new();
    let doc = TestNode::new(DOC)
        .child(TestNode::leaf(TITLE))
        .child(TestNode::new(PARA).child(TestNode::new(NOTE).attr("role", "a:b")));
    assert!(!validator.validate(&doc, &mut registry));
    assert_eq!(
        validator.errors(),
        &["Attribute role has an invalid value: a:b".to_string()]
    );
}

// =============================================================================
// Definition hooks and value computers
// =============================================================================

#[test]
fn test_hook_can_forbid_a_node() {
    let mut registry = PropertyRegistry::new();
    let mut validator = TagValidatorBuilder::new()
        .add_definition_hook(|node, definition| {
            if node.tag_name() == "para" {
                None
            } else {
                Some(definition)
            }
        })
        .build();
    let doc = valid_doc();
    assert!(!validator.validate(&doc, &mut registry));
    assert_eq!(
        validator.errors(),
        &["para is not allowed here, its definition is missing".to_string()]
    );
}

#[test]
fn test_hook_can_rewrite_a_definition() {
    let mut registry = PropertyRegistry::new();
    let mut validator = TagValidatorBuilder::new()
        .add_definition_hook(|node, mut definition| {
            if node.tag_name() == "doc" {
                // relax the grammar entirely
                definition.deny_element(&tagrules::GrammarTarget::Kind(
                    tagrules::GrammarKind::Sequence,
                ));
            }
            Some(definition)
        })
        .build();
    // an empty doc violates the original grammar, the hook relaxed it
    let doc = TestNode::new(DOC);
    assert!(validator.validate(&doc, &mut registry));
}

#[test]
fn test_value_computer_runs_before_validation() {
    let mut registry = PropertyRegistry::new();
    let mut validator = TagValidatorBuilder::new()
        .add_value_computer(|_, _, value| value.trim().to_string())
        .build();
    let doc = valid_doc().attr("version", "  1.2  ");
    assert!(validator.validate(&doc, &mut registry));
}

#[test]
fn test_value_computer_failure_reports_computed_value() {
    let mut registry = PropertyRegistry::new();
    let mut validator = TagValidatorBuilder::new()
        .add_value_computer(|_, _, value| format!("{value}!"))
        .build();
    let doc = valid_doc().attr("version", "1.2");
    assert!(!validator.validate(&doc, &mut registry));
    // the computed value is validated and reported, not the raw one
    assert_eq!(
        validator.errors(),
        &["Attribute version has an invalid value: 1.2!".to_string()]
    );
}

#[test]
fn test_errors_reset_between_runs() {
    let mut registry = PropertyRegistry::new();
    let mut validator = TagValidator::new();
    let bad = valid_doc().attr("bogus", "x");
    assert!(!validator.validate(&bad, &mut registry));
    assert_eq!(validator.errors().len(), 1);

    assert!(validator.validate(&valid_doc(), &mut registry));
    assert!(validator.errors().is_empty());
}

// =============================================================================
// Choice handling
// =============================================================================

struct ChoiceNode {
    choice: Choice,
}

impl ValidatedNode for ChoiceNode {
    fn tag_name(&self) -> &str {
        "chooser"
    }

    fn kind(&self) -> TagKind {
        TagKind("chooser")
    }

    fn attributes(&self) -> Vec<NodeAttribute> {
        Vec::new()
    }

    fn children(&self) -> Vec<&dyn ValidatedNode> {
        Vec::new()
    }

    fn is_container(&self) -> bool {
        true
    }

    fn root(&self) -> &dyn ValidatedNode {
        self
    }

    fn as_definition(&self, _registry: &mut PropertyRegistry) -> tagrules::Result<Definition> {
        let mut definition = Definition::new();
        definition.choice(self.choice.clone());
        Ok(definition)
    }
}

#[test]
fn test_choice_checks_declared_alternatives_against_bounds() {
    let mut registry = PropertyRegistry::new();
    let mut validator = TagValidator::new();
    // two declared alternatives, at most one allowed
    let node = ChoiceNode {
        choice: Choice::new(vec![
            element(PARA, Occurs::once()),
            element(NOTE, Occurs::once()),
        ])
        .max_occurs(Some(1)),
    };
    assert!(!validator.validate(&node, &mut registry));
    assert_eq!(
        validator.errors(),
        &["choice must be at most 1 occurrences".to_string()]
    );
}

#[test]
fn test_empty_choice_warns_but_passes() {
    let mut registry = PropertyRegistry::new();
    let mut validator = TagValidator::new();
    let node = ChoiceNode {
        choice: Choice::new(vec![]),
    };
    assert!(validator.validate(&node, &mut registry));
    assert_eq!(
        validator.errors(),
        &["choice is empty, this is a misconfiguration".to_string()]
    );
}
