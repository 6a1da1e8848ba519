// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities.
use serde_json::{Value as JsonValue, json};

use crate::config::PolicyConfig;
use crate::context::AuthContext;
use crate::engine::AccessControl;
use crate::normalizer::StringIdNormalizer;
use crate::registry::ScopeKind;
use crate::schema::EntitySchemas;

pub type TestAccessControl = AccessControl<EntitySchemas, StringIdNormalizer>;

pub fn setup_logging() {
    if std::env::var("RUST_LOG").is_ok() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .try_init();
    }
}

/// Policy of a small sales and field agent back-office.
pub fn policy_config() -> PolicyConfig {
    PolicyConfig::from_json(
        &json!({
            "roles": {
                "Super": { "isAdmin": true },
                "Amministrazione": {},
                "Agente": {},
                "Cliente": {}
            },
            "resources": {
                "entity": {
                    "clienti": {
                        "label": "Clienti",
                        "actions": {
                            "view": { "roles": ["Agente", "Amministrazione"], "ownOnlyRoles": ["Cliente"] },
                            "edit": { "roles": ["Amministrazione"] }
                        },
                        "keyFilters": [
                            {
                                "scope": { "kind": "entity", "slug": "clienti" },
                                "mode": "self",
                                "roles": ["Cliente"]
                            }
                        ]
                    },
                    "conferme-ordine": {
                        "label": "Conferme d'ordine",
                        "actions": {
                            "view": { "roles": ["Agente", "Cliente", "Amministrazione"] },
                            "create": { "roles": ["Agente"] },
                            "edit": { "roles": ["Amministrazione"], "ownOnlyRoles": ["Agente"] },
                            "delete": { "roles": ["Amministrazione"] }
                        },
                        "keyFilters": [
                            {
                                "scope": { "kind": "entity", "slug": "clienti" },
                                "mode": "byReference",
                                "referenceFieldKey": "codiceCliente",
                                "roles": ["Agente"]
                            }
                        ]
                    },
                    "fatture": {
                        "label": "Fatture",
                        "actions": {
                            "view": { "roles": ["Amministrazione"] }
                        },
                        "keyFilters": [
                            {
                                "scope": { "kind": "entity", "slug": "clienti" },
                                "mode": "byReference",
                                "referenceFieldKey": "codiceCliente",
                                "roles": ["Agente"]
                            }
                        ]
                    },
                    "rapportini": {
                        "label": "Rapportini",
                        "actions": {
                            "view": { "roles": ["Agente"] },
                            "edit": { "ownOnlyRoles": ["Agente"] }
                        },
                        "keyFilters": [
                            {
                                "scope": { "kind": "group", "slug": "agenti" },
                                "mode": "byGroupMembership",
                                "roles": ["Agente"]
                            }
                        ]
                    },
                    "note": {
                        "label": "Note",
                        "actions": {
                            "view": { "roles": ["Agente", "Amministrazione"] },
                            "edit": { "roles": ["Agente", "Amministrazione"] }
                        }
                    }
                },
                "group": {
                    "agenti": {
                        "label": "Gruppi agenti",
                        "actions": { "view": { "roles": ["Agente", "Amministrazione"] } }
                    }
                },
                "event": {
                    "appuntamenti": {
                        "label": "Appuntamenti",
                        "actions": {
                            "view": { "roles": ["Agente"] },
                            "create": { "roles": ["Agente"] }
                        }
                    }
                }
            }
        })
        .to_string(),
    )
    .expect("valid test policy configuration")
}

/// Field catalogue matching [`policy_config`]. `fatture.codiceCliente` is a plain text field.
pub fn entity_schemas() -> EntitySchemas {
    EntitySchemas::from_json(
        &json!({
            "clienti": {
                "fields": [{ "key": "ragioneSociale", "type": "text" }]
            },
            "conferme-ordine": {
                "fields": [
                    { "key": "codiceCliente", "type": "reference", "target": "clienti" },
                    { "key": "totale", "type": "number" }
                ]
            },
            "fatture": {
                "fields": [{ "key": "codiceCliente", "type": "text" }]
            },
            "rapportini": {
                "fields": [{ "key": "data", "type": "date" }]
            }
        })
        .to_string(),
    )
    .expect("valid test entity schemas")
}

pub fn access_control() -> TestAccessControl {
    setup_logging();
    AccessControl::with_normalizer(policy_config(), entity_schemas(), StringIdNormalizer)
}

/// Field agent holding the key of customer `C1`.
pub fn agent() -> AuthContext {
    AuthContext::new("U1", "Agente", false).with_keys(ScopeKind::Entity, "clienti", ["C1"])
}

pub fn admin() -> AuthContext {
    AuthContext::new("U0", "Super", true)
}

/// Stored document with the given owner and visibility markers.
pub fn document(owner: &str, visibility_roles: &[&str]) -> JsonValue {
    json!({
        "_id": format!("{owner}-doc"),
        "owner": owner,
        "visibilityRoles": visibility_roles,
        "data": {},
        "groups": []
    })
}
