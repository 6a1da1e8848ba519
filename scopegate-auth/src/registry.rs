// SPDX-License-Identifier: MIT OR Apache-2.0

//! Role and resource policy registries.
//!
//! Both registries are plain values, loaded once when the process starts (see
//! [`PolicyConfig`](crate::config::PolicyConfig)) and never mutated afterwards.
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::permission::{Action, Domain};

pub type RoleId = String;

pub type UserId = String;

pub type ResourceType = String;

pub type ScopeSlug = String;

/// Broadcast marker making a document visible to every role.
pub const PUBLIC: &str = "Public";

/// Broadcast marker granting read visibility to everyone but mutation only to the owner.
pub const PUBLIC_READ_ONLY: &str = "PublicReadOnly";

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleConfig {
    /// Admin roles bypass every check.
    #[serde(default)]
    pub is_admin: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// Static map of role ids to their configuration.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleRegistry(BTreeMap<RoleId, RoleConfig>);

impl RoleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_role(mut self, role: impl Into<RoleId>, is_admin: bool) -> Self {
        self.0.insert(
            role.into(),
            RoleConfig {
                is_admin,
                label: None,
            },
        );
        self
    }

    pub fn get(&self, role: &str) -> Option<&RoleConfig> {
        self.0.get(role)
    }

    pub fn contains(&self, role: &str) -> bool {
        self.0.contains_key(role)
    }

    /// Returns `true` only for registered roles marked as admin.
    pub fn is_admin(&self, role: &str) -> bool {
        self.get(role).is_some_and(|config| config.is_admin)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&RoleId, &RoleConfig)> {
        self.0.iter()
    }
}

/// Roles granted the capability to perform an action.
///
/// Both sets grant the capability. Members of `own_only_roles` may only exercise it on documents
/// they own, which is checked per document by the mutation guard.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionRule {
    #[serde(default)]
    pub roles: BTreeSet<RoleId>,

    #[serde(default)]
    pub own_only_roles: BTreeSet<RoleId>,
}

impl ActionRule {
    /// Returns `true` if the role holds the capability, with or without ownership restriction.
    pub fn grants(&self, role: &str) -> bool {
        self.roles.contains(role) || self.own_only_roles.contains(role)
    }

    /// Returns `true` if the role holds the capability only for documents it owns.
    pub fn is_own_only(&self, role: &str) -> bool {
        !self.roles.contains(role) && self.own_only_roles.contains(role)
    }

    pub(crate) fn merge(&mut self, other: &ActionRule) {
        self.roles.extend(other.roles.iter().cloned());
        self.own_only_roles.extend(other.own_only_roles.iter().cloned());
    }

    pub(crate) fn role_ids(&self) -> impl Iterator<Item = &RoleId> {
        self.roles.iter().chain(self.own_only_roles.iter())
    }
}

/// Per-action rules of a resource type. A missing rule denies the action to every non-admin role.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionRules {
    #[serde(default)]
    pub view: Option<ActionRule>,

    #[serde(default)]
    pub create: Option<ActionRule>,

    #[serde(default)]
    pub edit: Option<ActionRule>,

    #[serde(default)]
    pub delete: Option<ActionRule>,
}

impl ActionRules {
    pub fn get(&self, action: Action) -> Option<&ActionRule> {
        match action {
            Action::View => self.view.as_ref(),
            Action::Create => self.create.as_ref(),
            Action::Edit => self.edit.as_ref(),
            Action::Delete => self.delete.as_ref(),
        }
    }

    pub fn set(&mut self, action: Action, rule: ActionRule) {
        let slot = match action {
            Action::View => &mut self.view,
            Action::Create => &mut self.create,
            Action::Edit => &mut self.edit,
            Action::Delete => &mut self.delete,
        };
        *slot = Some(rule);
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (Action, &ActionRule)> {
        Action::ALL
            .into_iter()
            .filter_map(|action| self.get(action).map(|rule| (action, rule)))
    }
}

/// Kind of entity a key scope refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScopeKind {
    Entity,
    Group,
}

impl fmt::Display for ScopeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ScopeKind::Entity => "entity",
            ScopeKind::Group => "group",
        };
        write!(f, "{s}")
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeyScope {
    pub kind: ScopeKind,
    pub slug: ScopeSlug,
}

impl KeyScope {
    pub fn entity(slug: impl Into<ScopeSlug>) -> Self {
        Self {
            kind: ScopeKind::Entity,
            slug: slug.into(),
        }
    }

    pub fn group(slug: impl Into<ScopeSlug>) -> Self {
        Self {
            kind: ScopeKind::Group,
            slug: slug.into(),
        }
    }
}

/// How a held key translates into read access on documents of a resource type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum KeyFilterMode {
    /// The key is the id of the document itself.
    #[serde(rename = "self")]
    SelfMatch,

    /// The document references the keyed entity through a declared reference field.
    ByReference,

    /// The document is a member of the keyed group.
    ByGroupMembership,
}

fn enabled_by_default() -> bool {
    true
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyFilterRule {
    pub scope: KeyScope,

    pub mode: KeyFilterMode,

    #[serde(default)]
    pub roles: BTreeSet<RoleId>,

    #[serde(default = "enabled_by_default")]
    pub enabled: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_field_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_type_slug: Option<ScopeSlug>,
}

impl KeyFilterRule {
    pub fn new(scope: KeyScope, mode: KeyFilterMode) -> Self {
        Self {
            scope,
            mode,
            roles: BTreeSet::new(),
            enabled: true,
            reference_field_key: None,
            group_type_slug: None,
        }
    }

    /// Rule matching documents whose `field_key` references an entity of the given scope.
    pub fn by_reference(slug: impl Into<ScopeSlug>, field_key: impl Into<String>) -> Self {
        let mut rule = Self::new(KeyScope::entity(slug), KeyFilterMode::ByReference);
        rule.reference_field_key = Some(field_key.into());
        rule
    }

    pub fn with_roles<I, R>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Into<RoleId>,
    {
        self.roles = roles.into_iter().map(Into::into).collect();
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Returns `true` if the rule is enabled and lists the role.
    pub fn applies_to(&self, role: &str) -> bool {
        self.enabled && self.roles.contains(role)
    }

    /// Group type a member document must be listed under, falls back to the scope slug.
    pub fn group_type(&self) -> &str {
        self.group_type_slug.as_deref().unwrap_or(&self.scope.slug)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceConfig {
    #[serde(default)]
    pub label: String,

    #[serde(default)]
    pub actions: ActionRules,

    #[serde(default)]
    pub key_filters: Vec<KeyFilterRule>,
}

impl ResourceConfig {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Default::default()
        }
    }

    pub fn with_action(mut self, action: Action, rule: ActionRule) -> Self {
        self.actions.set(action, rule);
        self
    }

    pub fn with_key_filter(mut self, rule: KeyFilterRule) -> Self {
        self.key_filters.push(rule);
        self
    }
}

/// Static map of (domain, resource type) to resource configuration.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourcePolicyRegistry(BTreeMap<Domain, BTreeMap<ResourceType, ResourceConfig>>);

impl ResourcePolicyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_resource(
        mut self,
        domain: Domain,
        resource_type: impl Into<ResourceType>,
        config: ResourceConfig,
    ) -> Self {
        self.0
            .entry(domain)
            .or_default()
            .insert(resource_type.into(), config);
        self
    }

    pub fn get(&self, domain: Domain, resource_type: &str) -> Option<&ResourceConfig> {
        self.0.get(&domain)?.get(resource_type)
    }

    /// All resource types registered in a domain, ordered by resource type.
    pub fn resources(
        &self,
        domain: Domain,
    ) -> impl Iterator<Item = (&ResourceType, &ResourceConfig)> {
        self.0.get(&domain).into_iter().flatten()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Domain, &ResourceType, &ResourceConfig)> {
        self.0.iter().flat_map(|(domain, resources)| {
            resources
                .iter()
                .map(move |(resource_type, config)| (*domain, resource_type, config))
        })
    }
}
