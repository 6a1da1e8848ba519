// SPDX-License-Identifier: MIT OR Apache-2.0

//! Access-relevant shape of stored resource documents.
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::registry::{PUBLIC, PUBLIC_READ_ONLY, RoleId, UserId};

/// Field holding the id of the document.
pub const ID_FIELD: &str = "_id";

/// Field holding the user id of the document owner.
pub const OWNER_FIELD: &str = "owner";

/// List field holding the visibility markers of the document.
pub const VISIBILITY_FIELD: &str = "visibilityRoles";

/// Object field holding the schema-declared fields of the document.
pub const DATA_FIELD: &str = "data";

/// List field holding the group memberships of the document.
pub const GROUPS_FIELD: &str = "groups";

/// Group id of a group membership entry.
pub const GROUP_ID_FIELD: &str = "groupId";

/// Group type of a group membership entry.
pub const GROUP_TYPE_FIELD: &str = "groupType";

/// Path of a schema-declared field.
pub fn data_field(key: &str) -> String {
    format!("{DATA_FIELD}.{key}")
}

/// Visibility broadcast marker stored on a document.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum VisibilityMarker {
    /// Readable by every role, mutable by every role holding the capability.
    Public,

    /// Readable by every role, mutable only by the owner.
    PublicReadOnly,

    /// Readable by the given role.
    Role(RoleId),
}

impl VisibilityMarker {
    pub fn as_str(&self) -> &str {
        match self {
            VisibilityMarker::Public => PUBLIC,
            VisibilityMarker::PublicReadOnly => PUBLIC_READ_ONLY,
            VisibilityMarker::Role(role) => role,
        }
    }
}

impl From<String> for VisibilityMarker {
    fn from(value: String) -> Self {
        match value.as_str() {
            PUBLIC => VisibilityMarker::Public,
            PUBLIC_READ_ONLY => VisibilityMarker::PublicReadOnly,
            _ => VisibilityMarker::Role(value),
        }
    }
}

impl From<&str> for VisibilityMarker {
    fn from(value: &str) -> Self {
        VisibilityMarker::from(value.to_string())
    }
}

impl From<VisibilityMarker> for String {
    fn from(value: VisibilityMarker) -> Self {
        match value {
            VisibilityMarker::Role(role) => role,
            marker => marker.as_str().to_string(),
        }
    }
}

impl fmt::Display for VisibilityMarker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Logical per-document access state derived from the visibility markers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AccessState {
    /// No markers, only the owner sees the document.
    OwnerExclusive,

    /// Marked `PublicReadOnly`, broadcast for reading but frozen for everyone but the owner.
    BroadcastReadOnly,

    /// Broadcast markers without `PublicReadOnly`, mutable by roles holding the capability.
    BroadcastEditable,
}

/// Ownership and visibility of a stored document.
///
/// Deserializing a full stored document keeps only these fields.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceDocument {
    pub owner: UserId,

    #[serde(default)]
    pub visibility_roles: Vec<VisibilityMarker>,
}

impl ResourceDocument {
    pub fn new(owner: impl Into<UserId>) -> Self {
        Self {
            owner: owner.into(),
            visibility_roles: Vec::new(),
        }
    }

    pub fn with_visibility<I, M>(mut self, markers: I) -> Self
    where
        I: IntoIterator<Item = M>,
        M: Into<VisibilityMarker>,
    {
        self.visibility_roles = markers.into_iter().map(Into::into).collect();
        self
    }

    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.owner == user_id
    }

    pub fn is_read_only(&self) -> bool {
        self.visibility_roles.contains(&VisibilityMarker::PublicReadOnly)
    }

    pub fn access_state(&self) -> AccessState {
        if self.is_read_only() {
            AccessState::BroadcastReadOnly
        } else if self.visibility_roles.is_empty() {
            AccessState::OwnerExclusive
        } else {
            AccessState::BroadcastEditable
        }
    }
}
