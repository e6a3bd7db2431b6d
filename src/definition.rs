//! Rule definitions
//!
//! A [`Definition`] is the rule set of one node kind: which attributes
//! it takes, split over four sections, and which children it accepts,
//! described by a grammar of elements, sequences and choices. Builder
//! methods accept anything convertible to a [`SpecSource`] so rules read
//! the same whether they name a spec, a group, a registry name or a
//! ready-made map.

use indexmap::IndexMap;

use crate::attributes::{AttributeSpec, CompoundSpec, ShorthandSpec, TypedSpec};
use crate::error::{Error, Result};
use crate::grammar::{
    deep_search, detach_from, Choice, GrammarNode, GrammarTarget, Occurs, Sequence,
};
use crate::groups::AttributeGroup;
use crate::registry::{PropertyRegistry, Registrable, SpecType};
use crate::validators::base::TypeRef;

/// Anything a definition section can be fed with
#[derive(Debug, Clone)]
pub enum SpecSource {
    /// A ready attribute spec
    Spec(AttributeSpec),
    /// An attribute group
    Group(AttributeGroup),
    /// A map of attribute names to validator references
    Map(IndexMap<String, TypeRef>),
    /// Several sources at once
    List(Vec<SpecSource>),
    /// A name resolved through the registry
    Name(String),
    /// A named spec type
    Type(SpecType),
}

impl From<AttributeSpec> for SpecSource {
    fn from(spec: AttributeSpec) -> Self {
        SpecSource::Spec(spec)
    }
}

impl From<TypedSpec> for SpecSource {
    fn from(spec: TypedSpec) -> Self {
        SpecSource::Spec(spec.into())
    }
}

impl From<ShorthandSpec> for SpecSource {
    fn from(spec: ShorthandSpec) -> Self {
        SpecSource::Spec(spec.into())
    }
}

impl From<CompoundSpec> for SpecSource {
    fn from(spec: CompoundSpec) -> Self {
        SpecSource::Spec(spec.into())
    }
}

impl From<AttributeGroup> for SpecSource {
    fn from(group: AttributeGroup) -> Self {
        SpecSource::Group(group)
    }
}

impl From<IndexMap<String, TypeRef>> for SpecSource {
    fn from(map: IndexMap<String, TypeRef>) -> Self {
        SpecSource::Map(map)
    }
}

impl From<Vec<SpecSource>> for SpecSource {
    fn from(sources: Vec<SpecSource>) -> Self {
        SpecSource::List(sources)
    }
}

impl From<&str> for SpecSource {
    fn from(name: &str) -> Self {
        SpecSource::Name(name.to_string())
    }
}

impl From<String> for SpecSource {
    fn from(name: String) -> Self {
        SpecSource::Name(name)
    }
}

impl From<SpecType> for SpecSource {
    fn from(ty: SpecType) -> Self {
        SpecSource::Type(ty)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Mandatory,
    Inheritable,
    Allowed,
    Denied,
}

/// The rule set of one node kind
#[derive(Debug, Default)]
pub struct Definition {
    mandatory: IndexMap<String, TypeRef>,
    inheritable: IndexMap<String, TypeRef>,
    allowed: IndexMap<String, TypeRef>,
    denied: IndexMap<String, TypeRef>,
    grammar: Vec<GrammarNode>,
    referenced_groups: Vec<AttributeGroup>,
    /// Whether text content may appear between child nodes
    pub mixed: bool,
    /// Advisory flag: attributes outside the sections are tolerated.
    /// Recorded on the definition, consumers decide what to do with it.
    pub any_attribute: bool,
}

impl Definition {
    /// Empty definition: no attributes, no children
    pub fn new() -> Self {
        Definition::default()
    }

    /// Allow text content between child nodes
    pub fn mixed(&mut self) -> &mut Self {
        self.mixed = true;
        self
    }

    /// Tolerate attributes outside the declared sections
    pub fn allow_any(&mut self) -> &mut Self {
        self.any_attribute = true;
        self
    }

    /// Reject attributes outside the declared sections
    pub fn disallow_any(&mut self) -> &mut Self {
        self.any_attribute = false;
        self
    }

    /// Append an ordered child group to the grammar
    pub fn sequence(&mut self, sequence: Sequence) -> &mut Self {
        self.grammar.push(GrammarNode::Sequence(sequence));
        self
    }

    /// Append an alternative child group to the grammar
    pub fn choice(&mut self, choice: Choice) -> &mut Self {
        self.grammar.push(GrammarNode::Choice(choice));
        self
    }

    /// Declare an attribute as allowed.
    ///
    /// The source is registered in the registry's virtual store first so
    /// later lookups by name resolve it. Registration problems are
    /// logged, not raised.
    pub fn allow(
        &mut self,
        registry: &mut PropertyRegistry,
        source: impl Into<SpecSource>,
    ) -> &mut Self {
        let source = source.into();
        register_source(registry, &source, None);
        self.push_to_section(Section::Allowed, registry, source);
        self
    }

    /// Declare several attributes as allowed
    pub fn allow_all(
        &mut self,
        registry: &mut PropertyRegistry,
        sources: impl Into<SpecSource>,
    ) -> &mut Self {
        self.allow(registry, sources.into())
    }

    /// Declare an attribute as mandatory
    pub fn require(
        &mut self,
        registry: &mut PropertyRegistry,
        source: impl Into<SpecSource>,
    ) -> &mut Self {
        self.push_to_section(Section::Mandatory, registry, source.into());
        self
    }

    /// Declare several attributes as mandatory
    pub fn require_all(
        &mut self,
        registry: &mut PropertyRegistry,
        sources: impl Into<SpecSource>,
    ) -> &mut Self {
        self.require(registry, sources.into())
    }

    /// Declare an attribute as inheritable by descendants
    pub fn inherit(
        &mut self,
        registry: &mut PropertyRegistry,
        source: impl Into<SpecSource>,
    ) -> &mut Self {
        self.push_to_section(Section::Inheritable, registry, source.into());
        self
    }

    /// Declare several attributes as inheritable
    pub fn inherit_all(
        &mut self,
        registry: &mut PropertyRegistry,
        sources: impl Into<SpecSource>,
    ) -> &mut Self {
        self.inherit(registry, sources.into())
    }

    /// Deny an attribute, a group or a registry name.
    ///
    /// Denied names win over every other section. Denying a group drops
    /// it from the referenced set before its attributes are recorded;
    /// recording them references the group again, so the group itself
    /// stays visible to [`Definition::remove_groups`].
    pub fn deny(
        &mut self,
        registry: &mut PropertyRegistry,
        source: impl Into<SpecSource>,
    ) -> Result<&mut Self> {
        let source = match source.into() {
            SpecSource::Group(group) => {
                self.referenced_groups.retain(|g| g.name() != group.name());
                SpecSource::Group(group)
            }
            SpecSource::Name(name) => SpecSource::Spec(registry.lookup_named(&name)?),
            SpecSource::Type(ty) => SpecSource::Spec(registry.lookup_by_type(ty)?),
            other => other,
        };
        self.push_to_section(Section::Denied, registry, source);
        Ok(self)
    }

    /// Deny several registry names at once
    pub fn deny_all(&mut self, registry: &mut PropertyRegistry, names: &[&str]) -> Result<&mut Self> {
        for name in names {
            self.deny(registry, *name)?;
        }
        Ok(self)
    }

    /// Attributes from the allowed, mandatory and inheritable sections,
    /// denied names excluded, first declaration wins
    pub fn registered_attributes(&self) -> IndexMap<String, TypeRef> {
        self.unique(&[Section::Allowed, Section::Mandatory, Section::Inheritable])
    }

    /// Attributes from the allowed and mandatory sections
    pub fn applied_attributes(&self) -> IndexMap<String, TypeRef> {
        self.unique(&[Section::Allowed, Section::Mandatory])
    }

    /// Attributes from the allowed section
    pub fn allowed_attributes(&self) -> IndexMap<String, TypeRef> {
        self.unique(&[Section::Allowed])
    }

    /// Attributes from the mandatory section
    pub fn mandatory_attributes(&self) -> IndexMap<String, TypeRef> {
        self.unique(&[Section::Mandatory])
    }

    /// Groups referenced by sections of this definition
    pub fn referenced_groups(&self) -> &[AttributeGroup] {
        &self.referenced_groups
    }

    /// The child grammar
    pub fn grammar(&self) -> &[GrammarNode] {
        &self.grammar
    }

    /// Swap the validator type of an allowed attribute.
    ///
    /// The entry is matched by section key, then by validator type
    /// identity, then through a registry resolution of the name. When no
    /// entry matches, the new attribute is still declared as allowed.
    pub fn replace_type(
        &mut self,
        registry: &mut PropertyRegistry,
        name: &str,
        type_ref: TypeRef,
    ) -> &mut Self {
        self.replace_spec(
            registry,
            name,
            AttributeSpec::Typed(TypedSpec::new(name, type_ref)),
        )
    }

    /// Swap an allowed attribute for another spec
    pub fn replace_spec(
        &mut self,
        registry: &mut PropertyRegistry,
        name: &str,
        spec: AttributeSpec,
    ) -> &mut Self {
        self.remove_allowed_entry(registry, name);
        self.allow(registry, spec)
    }

    fn remove_allowed_entry(&mut self, registry: &mut PropertyRegistry, name: &str) {
        if self.allowed.shift_remove(name).is_some() {
            return;
        }
        if let Some(key) = self
            .allowed
            .iter()
            .find(|(_, type_ref)| type_ref.id() == Some(name))
            .map(|(key, _)| key.clone())
        {
            self.allowed.shift_remove(&key);
            return;
        }
        if let Ok(spec) = registry.lookup_named(name) {
            if self.allowed.shift_remove(spec.name()).is_some() {
                return;
            }
            if let Some(key) = self
                .allowed
                .iter()
                .find(|(_, type_ref)| *type_ref == spec.type_ref())
                .map(|(key, _)| key.clone())
            {
                self.allowed.shift_remove(&key);
            }
        }
    }

    /// Remove every attribute contributed by a referenced group, from
    /// all four sections, then forget the groups.
    ///
    /// Removal goes by attribute name so an unrelated attribute sharing
    /// a validator type is untouched.
    pub fn remove_groups(&mut self, registry: &mut PropertyRegistry) -> Result<&mut Self> {
        let mut names = Vec::new();
        for group in &self.referenced_groups {
            for spec in group.as_collection(registry)? {
                names.extend(spec.unpack().into_keys());
            }
        }
        for name in &names {
            self.mandatory.shift_remove(name);
            self.inheritable.shift_remove(name);
            self.allowed.shift_remove(name);
            self.denied.shift_remove(name);
        }
        self.referenced_groups.clear();
        Ok(self)
    }

    /// Detach a grammar particle and re-attach it to the first top-level
    /// sequence or choice. A container emptied by the detachment is
    /// pruned. With no top-level container to receive it, the particle
    /// is dropped.
    pub fn move_main(&mut self, target: &GrammarTarget, occurs: Option<Occurs>) -> &mut Self {
        if let Some(mut found) = detach_from(&mut self.grammar, target) {
            if let Some(occurs) = occurs {
                found.set_occurs(occurs);
            }
            let container = self.grammar.iter_mut().find_map(|node| match node {
                GrammarNode::Sequence(sequence) => Some(&mut sequence.children),
                GrammarNode::Choice(choice) => Some(&mut choice.children),
                _ => None,
            });
            if let Some(children) = container {
                children.push(found);
            }
        }
        self
    }

    /// Append particles to the first top-level sequence or choice
    pub fn add_to_main(&mut self, elements: Vec<GrammarNode>) -> Result<&mut Self> {
        match self.grammar.first_mut().and_then(GrammarNode::children_mut) {
            Some(children) => {
                children.extend(elements);
                Ok(self)
            }
            None => Err(Error::InvalidCollectionOperation(
                "no top-level sequence or choice to add into".to_string(),
            )),
        }
    }

    /// Fold a choice of elements into this grammar.
    ///
    /// Every element the choice names is detached from wherever it sits
    /// in the grammar, then the choice itself is appended as a new
    /// top-level particle.
    pub fn merge_tag_group(&mut self, choice: Choice) -> &mut Self {
        let mut kinds = Vec::new();
        gather_element_kinds(&choice.children, &mut kinds);
        for kind in kinds {
            let _ = detach_from(&mut self.grammar, &GrammarTarget::Ref(kind));
        }
        self.grammar.push(GrammarNode::Choice(choice));
        self
    }

    /// Remove a particle from the grammar, pruning emptied containers
    pub fn deny_element(&mut self, target: &GrammarTarget) -> &mut Self {
        let _ = detach_from(&mut self.grammar, target);
        self
    }

    /// Remove several particles from the grammar
    pub fn deny_elements(&mut self, targets: &[GrammarTarget]) -> &mut Self {
        for target in targets {
            self.deny_element(target);
        }
        self
    }

    /// Find a particle anywhere in the grammar, innermost matches first
    pub fn deep_search(&self, target: &GrammarTarget) -> Option<&GrammarNode> {
        deep_search(&self.grammar, target)
    }

    fn push_to_section(
        &mut self,
        section: Section,
        registry: &mut PropertyRegistry,
        source: SpecSource,
    ) {
        let entries = self.normalize(registry, source);
        self.section_mut(section).extend(entries);
    }

    /// Flatten a source into name to validator entries. Groups are
    /// recorded in the referenced set as a side effect. A name that does
    /// not resolve contributes nothing beyond a logged warning.
    fn normalize(
        &mut self,
        registry: &mut PropertyRegistry,
        source: SpecSource,
    ) -> IndexMap<String, TypeRef> {
        match source {
            SpecSource::Spec(spec) => spec.unpack(),
            SpecSource::Group(group) => {
                self.referenced_groups.push(group.clone());
                match group.as_collection(registry) {
                    Ok(specs) => {
                        let mut entries = IndexMap::new();
                        for spec in specs {
                            entries.extend(spec.unpack());
                        }
                        entries
                    }
                    Err(err) => {
                        log::warn!("could not expand group {}: {err}", group.name());
                        IndexMap::new()
                    }
                }
            }
            SpecSource::Map(map) => map,
            SpecSource::List(sources) => {
                let mut entries = IndexMap::new();
                for source in sources {
                    entries.extend(self.normalize(registry, source));
                }
                entries
            }
            SpecSource::Name(name) => match registry.lookup_named(&name) {
                Ok(spec) => spec.unpack(),
                Err(err) => {
                    log::warn!("could not resolve {name}: {err}");
                    IndexMap::new()
                }
            },
            SpecSource::Type(ty) => match registry.lookup_by_type(ty) {
                Ok(spec) => spec.unpack(),
                Err(err) => {
                    log::warn!("could not resolve type {}: {err}", ty.name);
                    IndexMap::new()
                }
            },
        }
    }

    fn unique(&self, sections: &[Section]) -> IndexMap<String, TypeRef> {
        let mut result = IndexMap::new();
        for section in sections {
            for (name, type_ref) in self.section(*section) {
                if self.denied.contains_key(name) {
                    continue;
                }
                if result.contains_key(name) {
                    continue;
                }
                result.insert(name.clone(), type_ref.clone());
            }
        }
        result
    }

    fn section(&self, section: Section) -> &IndexMap<String, TypeRef> {
        match section {
            Section::Mandatory => &self.mandatory,
            Section::Inheritable => &self.inheritable,
            Section::Allowed => &self.allowed,
            Section::Denied => &self.denied,
        }
    }

    fn section_mut(&mut self, section: Section) -> &mut IndexMap<String, TypeRef> {
        match section {
            Section::Mandatory => &mut self.mandatory,
            Section::Inheritable => &mut self.inheritable,
            Section::Allowed => &mut self.allowed,
            Section::Denied => &mut self.denied,
        }
    }
}

/// Register a source's specs in the registry's virtual store
fn register_source(registry: &mut PropertyRegistry, source: &SpecSource, key: Option<&str>) {
    let outcome = match source {
        SpecSource::Spec(spec) => registry.register_virtual(Registrable::Spec(spec.clone()), key),
        SpecSource::Group(group) => {
            registry.register_virtual(Registrable::Group(group.clone()), key)
        }
        SpecSource::Type(ty) => registry.register_virtual(Registrable::Type(*ty), key),
        SpecSource::Map(map) => {
            for (name, type_ref) in map {
                if let Err(err) =
                    registry.register_virtual(Registrable::Validator(type_ref.clone()), Some(name))
                {
                    log::warn!("could not register {name}: {err}");
                }
            }
            Ok(())
        }
        SpecSource::List(sources) => {
            for source in sources {
                register_source(registry, source, None);
            }
            Ok(())
        }
        // a resolvable name is already registered somewhere
        SpecSource::Name(_) => Ok(()),
    };
    if let Err(err) = outcome {
        log::warn!("could not register virtual property: {err}");
    }
}

fn gather_element_kinds(nodes: &[GrammarNode], kinds: &mut Vec<crate::node::TagKind>) {
    for node in nodes {
        match node {
            GrammarNode::Element(element) => kinds.push(element.ref_kind),
            GrammarNode::Sequence(sequence) => gather_element_kinds(&sequence.children, kinds),
            GrammarNode::Choice(choice) => gather_element_kinds(&choice.children, kinds),
            GrammarNode::Any(_) => {}
        }
    }
}
