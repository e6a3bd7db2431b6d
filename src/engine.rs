//! Validation engine
//!
//! [`TagValidator`] walks a document tree and checks every node against
//! the definition its kind produces. Definition hooks get a chance to
//! rewrite or withdraw each definition before it is applied, and value
//! computers can rewrite attribute values before validation.
//!
//! Validation failures are not errors in the [`crate::error`] sense: the
//! walk returns `false` and the diagnostics accumulate on the validator.

use crate::attributes::AttributeSpec;
use crate::definition::Definition;
use crate::grammar::{AnyElement, Choice, Element, GrammarNode, Sequence};
use crate::node::{TagKind, ValidatedNode};
use crate::registry::PropertyRegistry;

/// Rewrites or withdraws a definition for one node. Returning `None`
/// forbids the node outright.
pub type DefinitionHook =
    Box<dyn Fn(&dyn ValidatedNode, Definition) -> Option<Definition> + Send + Sync>;

/// Rewrites an attribute value before it is validated
pub type ValueComputer =
    Box<dyn Fn(&dyn ValidatedNode, &AttributeSpec, &str) -> String + Send + Sync>;

/// Assembles a [`TagValidator`] from hooks and computers
#[derive(Default)]
pub struct TagValidatorBuilder {
    hooks: Vec<DefinitionHook>,
    computers: Vec<ValueComputer>,
}

impl TagValidatorBuilder {
    /// Builder with no hooks
    pub fn new() -> Self {
        TagValidatorBuilder::default()
    }

    /// Add a definition hook, run in registration order
    pub fn add_definition_hook(
        mut self,
        hook: impl Fn(&dyn ValidatedNode, Definition) -> Option<Definition> + Send + Sync + 'static,
    ) -> Self {
        self.hooks.push(Box::new(hook));
        self
    }

    /// Add a value computer, run in registration order
    pub fn add_value_computer(
        mut self,
        computer: impl Fn(&dyn ValidatedNode, &AttributeSpec, &str) -> String + Send + Sync + 'static,
    ) -> Self {
        self.computers.push(Box::new(computer));
        self
    }

    /// Drop every registered hook and computer
    pub fn reset(mut self) -> Self {
        self.hooks.clear();
        self.computers.clear();
        self
    }

    /// Build the validator
    pub fn build(self) -> TagValidator {
        TagValidator {
            hooks: self.hooks,
            computers: self.computers,
            errors: Vec::new(),
        }
    }
}

/// Walks a document tree and validates each node against its definition
pub struct TagValidator {
    hooks: Vec<DefinitionHook>,
    computers: Vec<ValueComputer>,
    errors: Vec<String>,
}

impl TagValidator {
    /// Validator with no hooks or computers
    pub fn new() -> Self {
        TagValidatorBuilder::new().build()
    }

    /// Diagnostics accumulated by the last validation run
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// Validate a node and its subtree. Diagnostics from the previous
    /// run are discarded.
    pub fn validate(&mut self, node: &dyn ValidatedNode, registry: &mut PropertyRegistry) -> bool {
        self.errors.clear();
        self.validate_node(node, registry)
    }

    fn validate_node(&mut self, node: &dyn ValidatedNode, registry: &mut PropertyRegistry) -> bool {
        let definition = match node.as_definition(registry) {
            Ok(definition) => self.execute_hooks(node, definition),
            Err(err) => {
                self.errors
                    .push(format!("{}: {err}", node.tag_name()));
                return false;
            }
        };
        self.validate_attributes(node, definition.as_ref(), registry)
            && self.validate_tags(node, definition.as_ref(), registry)
    }

    /// Run definition hooks in order, stopping at the first withdrawal
    fn execute_hooks(
        &self,
        node: &dyn ValidatedNode,
        definition: Definition,
    ) -> Option<Definition> {
        let mut definition = definition;
        for hook in &self.hooks {
            definition = hook(node, definition)?;
        }
        Some(definition)
    }

    /// Check every attribute on the node against the definition's
    /// registered attributes. A missing definition validates lax.
    fn validate_attributes(
        &mut self,
        node: &dyn ValidatedNode,
        definition: Option<&Definition>,
        registry: &mut PropertyRegistry,
    ) -> bool {
        let Some(definition) = definition else {
            return true;
        };
        let registered = definition.registered_attributes();

        for attribute in node.attributes() {
            // namespace declarations and xml: attributes are not ours
            if matches!(attribute.prefix.as_deref(), Some("xmlns") | Some("xml")) {
                continue;
            }

            let Some(type_ref) = registered.get(&attribute.name) else {
                self.errors.push(format!(
                    "Attribute {} is disallowed on {}",
                    attribute.name,
                    node.tag_name()
                ));
                return false;
            };

            let validator = match type_ref.validator() {
                Ok(validator) => validator,
                Err(err) => {
                    self.errors.push(format!(
                        "Attribute {} has an unusable validator: {err}",
                        attribute.name
                    ));
                    return false;
                }
            };

            let spec = match registry.lookup_by_name(&attribute.name) {
                Ok(spec) => spec,
                Err(err) => {
                    self.errors
                        .push(format!("Attribute {}: {err}", attribute.name));
                    return false;
                }
            };

            let mut value = attribute.value.clone();
            for computer in &self.computers {
                value = computer(node, &spec, &value);
            }

            let valid = if validator.needs_context() {
                validator.validate_with_context(&value, Some(node.root()), Some(node))
            } else {
                validator.validate(&value)
            };
            if !valid {
                self.errors.push(format!(
                    "Attribute {} has an invalid value: {}",
                    attribute.name, value
                ));
                return false;
            }
        }
        true
    }

    /// Check the node's children against the definition's grammar, then
    /// recurse into them. A missing definition forbids the node.
    fn validate_tags(
        &mut self,
        node: &dyn ValidatedNode,
        definition: Option<&Definition>,
        registry: &mut PropertyRegistry,
    ) -> bool {
        let Some(definition) = definition else {
            self.errors.push(format!(
                "{} is not allowed here, its definition is missing",
                node.tag_name()
            ));
            return false;
        };

        for particle in definition.grammar() {
            match particle {
                GrammarNode::Sequence(sequence) => {
                    if !self.validate_sequence(node, sequence) {
                        return false;
                    }
                }
                GrammarNode::Choice(choice) => {
                    if !self.validate_choice(choice) {
                        return false;
                    }
                }
                GrammarNode::Element(_) | GrammarNode::Any(_) => {}
            }
        }

        if !node.is_container() {
            return true;
        }
        for child in node.children() {
            if !child.has_definition() {
                continue;
            }
            if !self.is_allowed(child, definition) {
                return false;
            }
            if !self.validate_node(child, registry) {
                return false;
            }
        }
        true
    }

    fn validate_sequence(&mut self, node: &dyn ValidatedNode, sequence: &Sequence) -> bool {
        for particle in &sequence.children {
            let ok = match particle {
                GrammarNode::Choice(choice) => self.validate_choice(choice),
                GrammarNode::Sequence(inner) => self.validate_sequence(node, inner),
                GrammarNode::Element(element) => self.validate_element_occurrences(node, element),
                GrammarNode::Any(any) => self.validate_any_occurrences(node, any),
            };
            if !ok {
                return false;
            }
        }
        true
    }

    /// A choice is checked against its own declared alternatives: their
    /// count has to satisfy the choice's occurrence bounds. An empty
    /// choice records a diagnostic but does not fail.
    fn validate_choice(&mut self, choice: &Choice) -> bool {
        if choice.children.is_empty() {
            self.errors
                .push("choice is empty, this is a misconfiguration".to_string());
            return true;
        }
        let declared = choice.children.len() as u32;
        if declared < choice.occurs.min {
            self.errors.push(format!(
                "choice must be at least {} occurrences",
                choice.occurs.min
            ));
            return false;
        }
        if let Some(max) = choice.occurs.max {
            if declared > max {
                self.errors
                    .push(format!("choice must be at most {max} occurrences"));
                return false;
            }
        }
        true
    }

    fn validate_element_occurrences(&mut self, node: &dyn ValidatedNode, element: &Element) -> bool {
        self.check_occurrences(node, Some(element.ref_kind), element.occurs.min, element.occurs.max)
    }

    fn validate_any_occurrences(&mut self, node: &dyn ValidatedNode, any: &AnyElement) -> bool {
        self.check_occurrences(node, any.ref_kind, any.occurs.min, any.occurs.max)
    }

    /// Count children of the referenced kind and compare against the
    /// bounds. Leaf nodes validate lax. A wildcard with no reference
    /// counts zero children.
    fn check_occurrences(
        &mut self,
        node: &dyn ValidatedNode,
        ref_kind: Option<TagKind>,
        min: u32,
        max: Option<u32>,
    ) -> bool {
        if !node.is_container() {
            return true;
        }
        let count = match ref_kind {
            Some(kind) => node
                .children()
                .iter()
                .filter(|child| child.is_kind(&kind))
                .count() as u32,
            None => 0,
        };
        let name = ref_kind.map(|kind| kind.name()).unwrap_or("any");
        if min > 0 && count < min {
            self.errors
                .push(format!("{name} must be at least {min} occurrences"));
            return false;
        }
        if let Some(max) = max {
            if count > max {
                self.errors
                    .push(format!("{name} must be at most {max} occurrences"));
                return false;
            }
        }
        true
    }

    /// Whether a child node is admitted anywhere in the grammar. Any
    /// wildcard admits every child.
    fn is_allowed(&mut self, child: &dyn ValidatedNode, definition: &Definition) -> bool {
        if Self::is_allowed_in(child, definition.grammar()) {
            return true;
        }
        self.errors
            .push(format!("{} is not allowed", child.tag_name()));
        false
    }

    fn is_allowed_in(child: &dyn ValidatedNode, particles: &[GrammarNode]) -> bool {
        particles.iter().any(|particle| match particle {
            GrammarNode::Any(_) => true,
            GrammarNode::Element(element) => child.is_kind(&element.ref_kind),
            GrammarNode::Sequence(sequence) => Self::is_allowed_in(child, &sequence.children),
            GrammarNode::Choice(choice) => Self::is_allowed_in(child, &choice.children),
        })
    }
}

impl Default for TagValidator {
    fn default() -> Self {
        TagValidator::new()
    }
}
