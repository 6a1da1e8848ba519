// SPDX-License-Identifier: MIT OR Apache-2.0

//! Static entity schema registry.
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::registry::ResourceType;
use crate::traits::SchemaRegistry;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldKind {
    Text,
    Number,
    Boolean,
    Date,
    Select,
    Reference,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDefinition {
    pub key: String,

    #[serde(rename = "type")]
    pub kind: FieldKind,

    /// Referenced resource type, only meaningful for reference fields.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<ResourceType>,
}

impl FieldDefinition {
    pub fn new(key: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            key: key.into(),
            kind,
            target: None,
        }
    }

    pub fn reference(key: impl Into<String>, target: impl Into<ResourceType>) -> Self {
        Self {
            key: key.into(),
            kind: FieldKind::Reference,
            target: Some(target.into()),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitySchema {
    #[serde(default)]
    pub fields: Vec<FieldDefinition>,
}

impl EntitySchema {
    pub fn field(&self, key: &str) -> Option<&FieldDefinition> {
        self.fields.iter().find(|field| field.key == key)
    }
}

/// Field catalogue of every entity resource type, loaded alongside the policy configuration.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntitySchemas(BTreeMap<ResourceType, EntitySchema>);

impl EntitySchemas {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn with_field(
        mut self,
        resource_type: impl Into<ResourceType>,
        field: FieldDefinition,
    ) -> Self {
        self.0
            .entry(resource_type.into())
            .or_default()
            .fields
            .push(field);
        self
    }

    pub fn get(&self, resource_type: &str) -> Option<&EntitySchema> {
        self.0.get(resource_type)
    }
}

impl SchemaRegistry for EntitySchemas {
    fn reference_target(&self, resource_type: &str, field_key: &str) -> Option<&str> {
        let field = self.get(resource_type)?.field(field_key)?;
        match field.kind {
            FieldKind::Reference => field.target.as_deref(),
            _ => None,
        }
    }
}
