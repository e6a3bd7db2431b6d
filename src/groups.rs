//! Attribute groups
//!
//! A named bundle of attribute specs, other groups and registry names,
//! mirroring the attribute group construct of XSD. Groups are reusable:
//! a definition references a group and the group expands on demand.

use crate::attributes::{AttributeSpec, Except};
use crate::error::Result;
use crate::registry::PropertyRegistry;

/// One member of a group
#[derive(Debug, Clone, PartialEq)]
pub enum GroupMember {
    /// An attribute spec held directly
    Spec(AttributeSpec),
    /// A nested group
    Group(AttributeGroup),
    /// A name resolved through the registry when the group expands
    Named(String),
}

impl From<AttributeSpec> for GroupMember {
    fn from(spec: AttributeSpec) -> Self {
        GroupMember::Spec(spec)
    }
}

impl From<AttributeGroup> for GroupMember {
    fn from(group: AttributeGroup) -> Self {
        GroupMember::Group(group)
    }
}

impl From<&str> for GroupMember {
    fn from(name: &str) -> Self {
        GroupMember::Named(name.to_string())
    }
}

/// A named list of attribute specs, nested groups allowed
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeGroup {
    name: String,
    members: Vec<GroupMember>,
}

impl AttributeGroup {
    /// Build a group from its members
    pub fn new(name: impl Into<String>, members: Vec<GroupMember>) -> Self {
        AttributeGroup {
            name: name.into(),
            members,
        }
    }

    /// Group name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Members, in declaration order
    pub fn members(&self) -> &[GroupMember] {
        &self.members
    }

    /// Consume the group into its members
    pub fn into_members(self) -> Vec<GroupMember> {
        self.members
    }

    /// Expand this group into a flat list of attribute specs, nested
    /// groups recursively included and registry names resolved. A spec
    /// appearing twice with the same name and type is kept once.
    pub fn as_collection(&self, registry: &mut PropertyRegistry) -> Result<Vec<AttributeSpec>> {
        let mut result = Vec::new();
        self.collect_into(registry, &mut result)?;
        Ok(result)
    }

    fn collect_into(
        &self,
        registry: &mut PropertyRegistry,
        result: &mut Vec<AttributeSpec>,
    ) -> Result<()> {
        for member in &self.members {
            match member {
                GroupMember::Group(group) => group.collect_into(registry, result)?,
                GroupMember::Named(name) => {
                    let spec = registry.lookup_named(name)?;
                    push_unique(result, spec);
                }
                GroupMember::Spec(spec) => push_unique(result, spec.clone()),
            }
        }
        Ok(())
    }

    /// Remove one attribute spec from this group.
    ///
    /// Nested groups and aggregate specs that contained the target are
    /// spliced into the result as their remaining members. Returns
    /// [`Except::NotFound`] when nothing in the group stands for the
    /// target.
    pub fn except(
        &self,
        target: &AttributeSpec,
        registry: &mut PropertyRegistry,
    ) -> Result<Except<GroupMember>> {
        let mut result = Vec::new();
        let mut found = false;
        for member in &self.members {
            let spec;
            let current = match member {
                GroupMember::Group(group) => {
                    match group.except(target, registry)? {
                        Except::Reduced(inner) => {
                            found = true;
                            result.extend(inner);
                        }
                        Except::NotFound => result.push(member.clone()),
                    }
                    continue;
                }
                GroupMember::Named(name) => {
                    spec = registry.lookup_named(name)?;
                    &spec
                }
                GroupMember::Spec(spec) => spec,
            };
            if current.matches(target) {
                found = true;
                continue;
            }
            match current.except(target) {
                Except::Reduced(inner) => {
                    found = true;
                    result.extend(inner.into_iter().map(GroupMember::Spec));
                }
                Except::NotFound => result.push(member.clone()),
            }
        }
        if found {
            Ok(Except::Reduced(result))
        } else {
            Ok(Except::NotFound)
        }
    }
}

fn push_unique(result: &mut Vec<AttributeSpec>, spec: AttributeSpec) {
    if !result.iter().any(|existing| existing.matches(&spec)) {
        result.push(spec);
    }
}
