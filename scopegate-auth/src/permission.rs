// SPDX-License-Identifier: MIT OR Apache-2.0

//! Role and action permission evaluation.
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::context::AuthContext;
use crate::registry::{ActionRule, ResourcePolicyRegistry, RoleRegistry};

/// Config-driven resource family.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Domain {
    /// Customer-like records.
    Entity,

    /// Group and classroom records.
    Group,

    /// Event records.
    Event,
}

impl Domain {
    pub const ALL: [Domain; 3] = [Domain::Entity, Domain::Group, Domain::Event];

    pub fn as_str(&self) -> &'static str {
        match self {
            Domain::Entity => "entity",
            Domain::Group => "group",
            Domain::Event => "event",
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Domain {
    type Err = PermissionError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Domain::ALL
            .into_iter()
            .find(|domain| domain.as_str() == value)
            .ok_or_else(|| PermissionError::UnknownDomain(value.to_string()))
    }
}

/// CRUD action on a resource.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    View,
    Create,
    Edit,
    Delete,
}

impl Action {
    pub const ALL: [Action; 4] = [Action::View, Action::Create, Action::Edit, Action::Delete];

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::View => "view",
            Action::Create => "create",
            Action::Edit => "edit",
            Action::Delete => "delete",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Action {
    type Err = PermissionError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Action::ALL
            .into_iter()
            .find(|action| action.as_str() == value)
            .ok_or_else(|| PermissionError::UnknownAction(value.to_string()))
    }
}

/// Typed `domain.action` permission.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Permission {
    pub domain: Domain,
    pub action: Action,
}

impl Permission {
    pub const fn new(domain: Domain, action: Action) -> Self {
        Self { domain, action }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.domain, self.action)
    }
}

impl FromStr for Permission {
    type Err = PermissionError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let (domain, action) = value
            .split_once('.')
            .ok_or_else(|| PermissionError::Malformed(value.to_string()))?;
        Ok(Self {
            domain: domain.parse()?,
            action: action.parse()?,
        })
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PermissionError {
    #[error("permission \"{0}\" is not of the form \"domain.action\"")]
    Malformed(String),

    #[error("unknown domain \"{0}\"")]
    UnknownDomain(String),

    #[error("unknown action \"{0}\"")]
    UnknownAction(String),
}

/// Resolve the rule for an action.
///
/// With a resource type the rule of exactly that type is returned. Without one the rules of
/// every resource type in the domain are merged, answering whether the role can perform the
/// action on anything in the domain.
pub fn resolve_rule<'a>(
    resources: &'a ResourcePolicyRegistry,
    permission: Permission,
    resource_type: Option<&str>,
) -> Option<Cow<'a, ActionRule>> {
    match resource_type {
        Some(resource_type) => resources
            .get(permission.domain, resource_type)?
            .actions
            .get(permission.action)
            .map(Cow::Borrowed),
        None => resources
            .resources(permission.domain)
            .filter_map(|(_, config)| config.actions.get(permission.action))
            .fold(None, |union: Option<ActionRule>, rule| {
                let mut union = union.unwrap_or_default();
                union.merge(rule);
                Some(union)
            })
            .map(Cow::Owned),
    }
}

/// Returns `true` if the principal's role may perform the action on the resource type, or on
/// any resource type of the domain when none is given.
///
/// Unknown roles are denied. Admin roles are allowed without looking at any rule. Holding the
/// capability through `ownOnlyRoles` counts as allowed here, ownership is checked by
/// [`can_edit_or_delete_resource`](crate::guard::can_edit_or_delete_resource).
pub fn has_permission(
    roles: &RoleRegistry,
    resources: &ResourcePolicyRegistry,
    auth: &AuthContext,
    permission: Permission,
    resource_type: Option<&str>,
) -> bool {
    let Some(role) = roles.get(&auth.role) else {
        debug!(role = %auth.role, %permission, "unknown role, permission denied");
        return false;
    };

    if role.is_admin {
        return true;
    }

    match resolve_rule(resources, permission, resource_type) {
        Some(rule) => rule.grants(&auth.role),
        None => false,
    }
}
