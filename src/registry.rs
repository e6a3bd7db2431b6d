//! Property registry
//!
//! The registry owns every attribute spec a validation run can resolve.
//! Specs come from profiles, named sets of definitions layered on a
//! stack, plus a virtual store for specs registered on the fly while
//! definitions are being composed.
//!
//! The bank of built specs is materialized once from the active profile
//! and then reused for the lifetime of the registry.

use indexmap::IndexMap;

use crate::attributes::{AttributeSpec, TypedSpec};
use crate::error::{Error, Result};
use crate::groups::{AttributeGroup, GroupMember};
use crate::validators::base::TypeRef;

/// A named spec type: an identity plus a factory building the spec
#[derive(Clone, Copy)]
pub struct SpecType {
    /// Stable identity of the spec type
    pub name: &'static str,
    /// Factory producing the spec
    pub build: fn() -> Result<AttributeSpec>,
}

impl std::fmt::Debug for SpecType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpecType").field("name", &self.name).finish()
    }
}

impl PartialEq for SpecType {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

/// A profile entry: either a spec built eagerly or a type built when
/// the bank materializes
#[derive(Debug, Clone)]
pub enum SpecDef {
    /// Build this named type when the bank materializes
    Type(SpecType),
    /// Use this spec as is
    Spec(AttributeSpec),
}

impl From<SpecType> for SpecDef {
    fn from(ty: SpecType) -> Self {
        SpecDef::Type(ty)
    }
}

impl From<AttributeSpec> for SpecDef {
    fn from(spec: AttributeSpec) -> Self {
        SpecDef::Spec(spec)
    }
}

/// Anything that can be registered as a virtual property
#[derive(Debug, Clone)]
pub enum Registrable {
    /// A ready spec
    Spec(AttributeSpec),
    /// A group, registered member by member
    Group(AttributeGroup),
    /// A spec type, built then registered
    Type(SpecType),
    /// A bare validator reference, requires an explicit key
    Validator(TypeRef),
}

/// Owns profiles, the materialized bank and the virtual spec store
#[derive(Debug, Default)]
pub struct PropertyRegistry {
    bank: Option<IndexMap<String, AttributeSpec>>,
    virtuals: IndexMap<String, AttributeSpec>,
    profiles: IndexMap<String, IndexMap<String, SpecDef>>,
    stack: Vec<String>,
}

impl PropertyRegistry {
    /// Empty registry with no profiles
    pub fn new() -> Self {
        PropertyRegistry::default()
    }

    /// Register a profile and make it active.
    ///
    /// Registering the same profile name twice keeps the first set of
    /// definitions; the profile is still pushed onto the stack.
    pub fn register_profile(
        &mut self,
        name: impl Into<String>,
        definitions: IndexMap<String, SpecDef>,
    ) {
        let name = name.into();
        self.profiles.entry(name.clone()).or_insert(definitions);
        self.push_profile(name);
    }

    /// Make an already registered profile active. Pushing the profile
    /// that is already on top does nothing.
    pub fn push_profile(&mut self, name: impl Into<String>) {
        let name = name.into();
        if self.stack.last() == Some(&name) {
            return;
        }
        self.stack.push(name);
    }

    /// Restore the previously active profile
    pub fn pop_profile(&mut self) {
        if self.stack.pop().is_none() {
            log::warn!("profile stack is empty, nothing to pop");
        }
    }

    /// Name of the active profile, if any
    pub fn active_profile(&self) -> Option<&str> {
        self.stack.last().map(String::as_str)
    }

    /// Look a spec up by attribute name.
    ///
    /// The bank is consulted first, then the virtual store. As a last
    /// resort a dotted name is resolved against the compound spec of its
    /// head segment, and the hit is cached as a virtual spec.
    pub fn lookup_by_name(&mut self, name: &str) -> Result<AttributeSpec> {
        self.ensure_bank()?;
        if let Some(spec) = self.bank.as_ref().and_then(|bank| bank.get(name)) {
            return Ok(spec.clone());
        }
        if let Some(spec) = self.virtuals.get(name) {
            return Ok(spec.clone());
        }
        if let Some((head, _)) = name.split_once('.') {
            let head_spec = self.bank.as_ref().and_then(|bank| bank.get(head)).cloned();
            if let Some(AttributeSpec::Compound(compound)) = head_spec {
                for inner in compound.sub_specs() {
                    if inner.name() == name {
                        self.virtuals.insert(name.to_string(), inner.clone());
                        return Ok(inner.clone());
                    }
                }
            }
        }
        Err(Error::PropertyNotFound(name.to_string()))
    }

    /// Look a spec up by its spec type.
    ///
    /// A spec declared under this type in the active profile wins;
    /// otherwise a previously built virtual spec is reused, and failing
    /// that the type is built and cached as a virtual spec.
    pub fn lookup_by_type(&mut self, ty: SpecType) -> Result<AttributeSpec> {
        if let Some(key) = self.profile_key_for_type(ty.name) {
            return self.lookup_by_name(&key);
        }
        if let Some(spec) = self.virtuals.get(ty.name) {
            return Ok(spec.clone());
        }
        let spec = (ty.build)()?;
        self.virtuals.insert(ty.name.to_string(), spec.clone());
        Ok(spec)
    }

    /// Look a spec up by the name of its spec type
    pub fn lookup_by_type_name(&mut self, type_name: &str) -> Result<AttributeSpec> {
        if let Some(key) = self.profile_key_for_type(type_name) {
            return self.lookup_by_name(&key);
        }
        if let Some(spec) = self.virtuals.get(type_name) {
            return Ok(spec.clone());
        }
        Err(Error::PropertyNotFound(type_name.to_string()))
    }

    /// Resolve a bare name that may be a spec type name or an attribute
    /// name, in that order
    pub fn lookup_named(&mut self, name: &str) -> Result<AttributeSpec> {
        self.lookup_by_type_name(name)
            .or_else(|_| self.lookup_by_name(name))
    }

    /// Specs from the bank whose names appear in the given list.
    /// Unknown names are skipped.
    pub fn lookup_many(&mut self, names: &[&str]) -> Result<Vec<AttributeSpec>> {
        self.ensure_bank()?;
        let Some(bank) = self.bank.as_ref() else {
            return Ok(Vec::new());
        };
        Ok(bank
            .iter()
            .filter(|(name, _)| names.contains(&name.as_str()))
            .map(|(_, spec)| spec.clone())
            .collect())
    }

    /// Register a spec outside any profile.
    ///
    /// Groups are registered member by member. A bare validator needs an
    /// explicit key to become an attribute spec. Registering a name that
    /// already resolves is a no-op.
    pub fn register_virtual(&mut self, value: Registrable, key: Option<&str>) -> Result<()> {
        match value {
            Registrable::Spec(spec) => {
                let name = key.unwrap_or_else(|| spec.name()).to_string();
                self.ensure_bank()?;
                let in_bank = self
                    .bank
                    .as_ref()
                    .map(|bank| bank.contains_key(&name))
                    .unwrap_or(false);
                if in_bank || self.virtuals.contains_key(&name) {
                    return Ok(());
                }
                self.virtuals.insert(name, spec);
                Ok(())
            }
            Registrable::Group(group) => {
                for member in group.into_members() {
                    match member {
                        GroupMember::Spec(spec) => {
                            self.register_virtual(Registrable::Spec(spec), None)?;
                        }
                        GroupMember::Group(inner) => {
                            self.register_virtual(Registrable::Group(inner), None)?;
                        }
                        GroupMember::Named(name) => {
                            let spec = self.lookup_named(&name)?;
                            self.register_virtual(Registrable::Spec(spec), None)?;
                        }
                    }
                }
                Ok(())
            }
            Registrable::Type(ty) => {
                let spec = (ty.build)()?;
                self.register_virtual(Registrable::Spec(spec), key)
            }
            Registrable::Validator(type_ref) => {
                let Some(key) = key else {
                    return Err(Error::PropertyNotFound(
                        "cannot register a bare validator without a name".to_string(),
                    ));
                };
                let spec = AttributeSpec::Typed(TypedSpec::new(key, type_ref));
                self.register_virtual(Registrable::Spec(spec), Some(key))
            }
        }
    }

    /// Materialize the bank from the active profile. Once built, the
    /// bank stays as is even if the active profile changes.
    fn ensure_bank(&mut self) -> Result<()> {
        if self.bank.is_some() {
            return Ok(());
        }
        let definitions = self.active_definitions();
        let mut bank = IndexMap::new();
        for (name, definition) in definitions {
            let spec = match definition {
                SpecDef::Type(ty) => (ty.build)()?,
                SpecDef::Spec(spec) => spec,
            };
            bank.insert(name, spec);
        }
        self.bank = Some(bank);
        Ok(())
    }

    fn active_definitions(&self) -> IndexMap<String, SpecDef> {
        match self.active_profile() {
            Some(profile) => self.profiles.get(profile).cloned().unwrap_or_default(),
            None => IndexMap::new(),
        }
    }

    fn profile_key_for_type(&self, type_name: &str) -> Option<String> {
        let profile = self.profiles.get(self.active_profile()?)?;
        profile.iter().find_map(|(key, definition)| match definition {
            SpecDef::Type(ty) if ty.name == type_name => Some(key.clone()),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::CompoundSpec;
    use crate::validators::builtins;

    fn typed(name: &str) -> AttributeSpec {
        AttributeSpec::Typed(TypedSpec::new(name, builtins::NM_TOKEN))
    }

    fn build_color() -> Result<AttributeSpec> {
        Ok(typed("color"))
    }

    const COLOR: SpecType = SpecType {
        name: "test.color",
        build: build_color,
    };

    fn profile() -> IndexMap<String, SpecDef> {
        let mut definitions = IndexMap::new();
        definitions.insert("color".to_string(), SpecDef::Type(COLOR));
        definitions.insert(
            "keep-together".to_string(),
            SpecDef::Spec(AttributeSpec::Compound(CompoundSpec::from_suffixes(
                "keep-together",
                builtins::STRING,
                vec![("within-column", TypeRef::Type(builtins::NM_TOKEN))],
            ))),
        );
        definitions
    }

    #[test]
    fn test_lookup_by_name_from_bank() {
        let mut registry = PropertyRegistry::new();
        registry.register_profile("fo", profile());
        let spec = registry.lookup_by_name("color").unwrap();
        assert_eq!(spec.name(), "color");
    }

    #[test]
    fn test_lookup_unknown_name_fails() {
        let mut registry = PropertyRegistry::new();
        registry.register_profile("fo", profile());
        assert!(matches!(
            registry.lookup_by_name("nope"),
            Err(Error::PropertyNotFound(_))
        ));
    }

    #[test]
    fn test_dotted_lookup_resolves_compound_component() {
        let mut registry = PropertyRegistry::new();
        registry.register_profile("fo", profile());
        let spec = registry.lookup_by_name("keep-together.within-column").unwrap();
        assert_eq!(spec.name(), "keep-together.within-column");
        // cached as a virtual spec for the next lookup
        assert!(registry.lookup_by_name("keep-together.within-column").is_ok());
    }

    #[test]
    fn test_lookup_by_type_prefers_profile_entry() {
        let mut registry = PropertyRegistry::new();
        registry.register_profile("fo", profile());
        let spec = registry.lookup_by_type(COLOR).unwrap();
        assert_eq!(spec.name(), "color");
    }

    #[test]
    fn test_lookup_by_type_builds_unlisted_type() {
        fn build_role() -> Result<AttributeSpec> {
            Ok(AttributeSpec::Typed(TypedSpec::new("role", builtins::NM_TOKEN)))
        }
        const ROLE: SpecType = SpecType {
            name: "test.role",
            build: build_role,
        };
        let mut registry = PropertyRegistry::new();
        registry.register_profile("fo", profile());
        let spec = registry.lookup_by_type(ROLE).unwrap();
        assert_eq!(spec.name(), "role");
        // second resolution reuses the cached virtual spec
        assert!(registry.lookup_by_type(ROLE).is_ok());
    }

    #[test]
    fn test_bank_is_built_once() {
        let mut registry = PropertyRegistry::new();
        registry.register_profile("fo", profile());
        assert!(registry.lookup_by_name("color").is_ok());

        let mut other = IndexMap::new();
        other.insert("role".to_string(), SpecDef::Spec(typed("role")));
        registry.register_profile("html", other);

        // the bank still reflects the profile it materialized from
        assert!(registry.lookup_by_name("color").is_ok());
        assert!(registry.lookup_by_name("role").is_err());
    }

    #[test]
    fn test_profile_stack() {
        let mut registry = PropertyRegistry::new();
        registry.register_profile("fo", profile());
        registry.register_profile("html", IndexMap::new());
        assert_eq!(registry.active_profile(), Some("html"));
        registry.pop_profile();
        assert_eq!(registry.active_profile(), Some("fo"));

        // pushing the active profile again does not grow the stack
        registry.push_profile("fo");
        registry.pop_profile();
        assert_eq!(registry.active_profile(), None);
    }

    #[test]
    fn test_register_profile_is_idempotent_per_name() {
        let mut registry = PropertyRegistry::new();
        registry.register_profile("fo", profile());
        let mut other = IndexMap::new();
        other.insert("role".to_string(), SpecDef::Spec(typed("role")));
        registry.register_profile("fo", other);
        // the original definitions are kept
        assert!(registry.lookup_by_name("color").is_ok());
    }

    #[test]
    fn test_register_virtual_spec_and_validator() {
        let mut registry = PropertyRegistry::new();
        registry.register_profile("fo", profile());
        registry
            .register_virtual(Registrable::Spec(typed("role")), None)
            .unwrap();
        assert!(registry.lookup_by_name("role").is_ok());

        registry
            .register_virtual(
                Registrable::Validator(TypeRef::Type(builtins::NM_TOKEN)),
                Some("class"),
            )
            .unwrap();
        assert!(registry.lookup_by_name("class").is_ok());

        // a bare validator without a key has nothing to register under
        assert!(registry
            .register_virtual(Registrable::Validator(TypeRef::Type(builtins::NM_TOKEN)), None)
            .is_err());
    }

    #[test]
    fn test_register_virtual_group_registers_members() {
        let mut registry = PropertyRegistry::new();
        registry.register_profile("fo", profile());
        let group = AttributeGroup::new(
            "fonts",
            vec![typed("font-family").into(), typed("font-size").into()],
        );
        registry
            .register_virtual(Registrable::Group(group), None)
            .unwrap();
        assert!(registry.lookup_by_name("font-family").is_ok());
        assert!(registry.lookup_by_name("font-size").is_ok());
    }

    #[test]
    fn test_lookup_many_skips_unknown_names() {
        let mut registry = PropertyRegistry::new();
        registry.register_profile("fo", profile());
        let specs = registry.lookup_many(&["color", "nope"]).unwrap();
        assert_eq!(specs.len(), 1);
        assert_eq!(specs[0].name(), "color");
    }
}
