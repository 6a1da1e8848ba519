// SPDX-License-Identifier: MIT OR Apache-2.0

//! Policy configuration loaded at process start.
use std::fmt;
use std::io::Read;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::permission::{Action, Domain};
use crate::registry::{
    KeyFilterMode, ResourcePolicyRegistry, ResourceType, RoleId, RoleRegistry, ScopeKind,
};

/// Role and resource registries as stored in the policy configuration file.
///
/// ```json
/// {
///   "roles": { "Super": { "isAdmin": true }, "Agente": {} },
///   "resources": {
///     "entity": {
///       "conferme-ordine": {
///         "label": "Conferme d'ordine",
///         "actions": { "view": { "roles": ["Agente"] } },
///         "keyFilters": [{
///           "scope": { "kind": "entity", "slug": "clienti" },
///           "mode": "byReference",
///           "referenceFieldKey": "codiceCliente",
///           "roles": ["Agente"]
///         }]
///       }
///     }
///   }
/// }
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyConfig {
    #[serde(default)]
    pub roles: RoleRegistry,

    #[serde(default)]
    pub resources: ResourcePolicyRegistry,
}

impl PolicyConfig {
    pub fn new(roles: RoleRegistry, resources: ResourcePolicyRegistry) -> Self {
        Self { roles, resources }
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_reader(reader: impl Read) -> Result<Self, ConfigError> {
        Ok(serde_json::from_reader(reader)?)
    }

    /// Configuration entries which can never grant anything.
    ///
    /// Such entries are not rejected, they stay inert when access is evaluated.
    pub fn warnings(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        for (domain, resource_type, config) in self.resources.iter() {
            for (action, rule) in config.actions.iter() {
                for role in rule.role_ids() {
                    if !self.roles.contains(role) {
                        warnings.push(ConfigWarning::UnknownActionRole {
                            domain,
                            resource_type: resource_type.clone(),
                            action,
                            role: role.clone(),
                        });
                    }
                }
            }

            for (index, rule) in config.key_filters.iter().enumerate() {
                let location = RuleLocation {
                    domain,
                    resource_type: resource_type.clone(),
                    index,
                };

                if !rule.enabled {
                    continue;
                }

                if rule.roles.is_empty() {
                    warnings.push(ConfigWarning::RuleWithoutRoles(location.clone()));
                }

                for role in &rule.roles {
                    if !self.roles.contains(role) {
                        warnings
                            .push(ConfigWarning::UnknownRuleRole(location.clone(), role.clone()));
                    }
                }

                match rule.mode {
                    KeyFilterMode::ByReference if rule.reference_field_key.is_none() => {
                        warnings.push(ConfigWarning::MissingReferenceField(location));
                    }
                    KeyFilterMode::ByGroupMembership if rule.scope.kind != ScopeKind::Group => {
                        warnings.push(ConfigWarning::GroupRuleWithoutGroupScope(location));
                    }
                    _ => (),
                }
            }
        }

        warnings
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid policy configuration: {0}")]
    Json(#[from] serde_json::Error),

    #[error("could not read policy configuration: {0}")]
    Io(#[from] std::io::Error),
}

/// Position of a key filter rule in the configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RuleLocation {
    pub domain: Domain,
    pub resource_type: ResourceType,
    pub index: usize,
}

impl fmt::Display for RuleLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{} key filter #{}",
            self.domain, self.resource_type, self.index
        )
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ConfigWarning {
    #[error("{domain}.{resource_type} grants \"{action}\" to unknown role \"{role}\"")]
    UnknownActionRole {
        domain: Domain,
        resource_type: ResourceType,
        action: Action,
        role: RoleId,
    },

    #[error("{0} lists unknown role \"{1}\"")]
    UnknownRuleRole(RuleLocation, RoleId),

    #[error("{0} lists no roles")]
    RuleWithoutRoles(RuleLocation),

    #[error("{0} matches by reference but has no reference field key")]
    MissingReferenceField(RuleLocation),

    #[error("{0} matches by group membership but its scope is not a group")]
    GroupRuleWithoutGroupScope(RuleLocation),
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use crate::permission::{Action, Domain};

    use super::{ConfigError, ConfigWarning, PolicyConfig};

    #[test]
    fn load_from_json() {
        let config = PolicyConfig::from_json(
            r#"{
                "roles": { "Super": { "isAdmin": true }, "Agente": {} },
                "resources": {
                    "entity": {
                        "conferme-ordine": {
                            "label": "Conferme d'ordine",
                            "actions": {
                                "view": { "roles": ["Agente"] },
                                "edit": { "ownOnlyRoles": ["Agente"] }
                            },
                            "keyFilters": [{
                                "scope": { "kind": "entity", "slug": "clienti" },
                                "mode": "byReference",
                                "referenceFieldKey": "codiceCliente",
                                "roles": ["Agente"]
                            }]
                        }
                    },
                    "event": {}
                }
            }"#,
        )
        .unwrap();

        assert!(config.roles.is_admin("Super"));
        assert!(!config.roles.is_admin("Agente"));

        let resource = config
            .resources
            .get(Domain::Entity, "conferme-ordine")
            .unwrap();
        assert_eq!(resource.label, "Conferme d'ordine");
        assert!(resource.actions.get(Action::Edit).unwrap().is_own_only("Agente"));
        assert_eq!(resource.key_filters.len(), 1);
        assert!(config.warnings().is_empty());

        let config = PolicyConfig::from_reader(r#"{ "roles": {} }"#.as_bytes()).unwrap();
        assert_eq!(config, PolicyConfig::default());
    }

    #[test]
    fn reject_malformed_json() {
        assert_matches!(
            PolicyConfig::from_json(r#"{ "resources": { "unknown-domain": {} } }"#),
            Err(ConfigError::Json(_))
        );
        assert_matches!(
            PolicyConfig::from_json(
                r#"{ "resources": { "entity": { "clienti": { "keyFilters": [{ "mode": "byReference" }] } } } }"#
            ),
            Err(ConfigError::Json(_))
        );
    }

    #[test]
    fn warn_about_inert_entries() {
        let config = PolicyConfig::from_json(
            r#"{
                "roles": { "Agente": {} },
                "resources": {
                    "entity": {
                        "clienti": {
                            "actions": { "delete": { "roles": ["Ghost"] } },
                            "keyFilters": [
                                { "scope": { "kind": "entity", "slug": "clienti" }, "mode": "byReference", "roles": ["Agente"] },
                                { "scope": { "kind": "entity", "slug": "agenti" }, "mode": "byGroupMembership", "roles": ["Agente"] },
                                { "scope": { "kind": "entity", "slug": "clienti" }, "mode": "self" },
                                { "scope": { "kind": "entity", "slug": "clienti" }, "mode": "self", "roles": ["Nobody"] },
                                { "scope": { "kind": "entity", "slug": "clienti" }, "mode": "byReference", "enabled": false }
                            ]
                        }
                    }
                }
            }"#,
        )
        .unwrap();

        let warnings = config.warnings();
        assert_eq!(warnings.len(), 5, "{warnings:?}");
        assert_matches!(
            &warnings[0],
            ConfigWarning::UnknownActionRole { action: Action::Delete, role, .. } if role == "Ghost"
        );
        assert_matches!(
            &warnings[1],
            ConfigWarning::MissingReferenceField(location) if location.index == 0
        );
        assert_matches!(
            &warnings[2],
            ConfigWarning::GroupRuleWithoutGroupScope(location) if location.index == 1
        );
        assert_matches!(
            &warnings[3],
            ConfigWarning::RuleWithoutRoles(location) if location.index == 2
        );
        assert_matches!(
            &warnings[4],
            ConfigWarning::UnknownRuleRole(location, role)
                if location.index == 3 && role == "Nobody"
        );

        assert_eq!(
            warnings[1].to_string(),
            "entity.clienti key filter #0 matches by reference but has no reference field key"
        );
    }
}
