// SPDX-License-Identifier: MIT OR Apache-2.0

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::registry::{RoleId, RoleRegistry, ScopeKind, ScopeSlug, UserId};

/// Raw key ids held for one scope slug, as handed over by session resolution.
pub type HeldKeys = BTreeMap<ScopeSlug, Vec<String>>;

/// Authenticated principal of a single request.
///
/// Built once per request by session resolution and only read by the engine. Key ids are kept
/// in their raw string form, conversion into storage ids happens when filters are built.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthContext {
    pub user_id: UserId,

    pub role: RoleId,

    #[serde(default)]
    pub is_admin: bool,

    #[serde(default)]
    pub key_scopes: BTreeMap<ScopeKind, HeldKeys>,
}

impl AuthContext {
    pub fn new(user_id: impl Into<UserId>, role: impl Into<RoleId>, is_admin: bool) -> Self {
        Self {
            user_id: user_id.into(),
            role: role.into(),
            is_admin,
            key_scopes: BTreeMap::new(),
        }
    }

    /// Build a principal taking the admin flag from the role registry.
    ///
    /// Unknown roles are never admin.
    pub fn resolve(
        roles: &RoleRegistry,
        user_id: impl Into<UserId>,
        role: impl Into<RoleId>,
    ) -> Self {
        let role = role.into();
        let is_admin = roles.is_admin(&role);
        Self::new(user_id, role, is_admin)
    }

    /// Add held key ids for a scope, extending ids already held for it.
    pub fn with_keys<I, K>(mut self, kind: ScopeKind, slug: impl Into<ScopeSlug>, ids: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        self.key_scopes
            .entry(kind)
            .or_default()
            .entry(slug.into())
            .or_default()
            .extend(ids.into_iter().map(Into::into));
        self
    }

    /// Non-empty raw ids held for the scope.
    pub fn held_keys<'a>(&'a self, kind: ScopeKind, slug: &str) -> impl Iterator<Item = &'a str> {
        self.key_scopes
            .get(&kind)
            .and_then(|scopes| scopes.get(slug))
            .into_iter()
            .flatten()
            .map(|id| id.trim())
            .filter(|id| !id.is_empty())
    }

    /// Returns `true` if at least one non-empty id is held for the scope.
    pub fn holds_keys(&self, kind: ScopeKind, slug: &str) -> bool {
        self.held_keys(kind, slug).next().is_some()
    }

    /// Slugs of a scope kind for which at least one non-empty id is held.
    pub fn held_scopes(&self, kind: ScopeKind) -> impl Iterator<Item = &ScopeSlug> {
        self.key_scopes
            .get(&kind)
            .into_iter()
            .flatten()
            .filter(move |(slug, _)| self.holds_keys(kind, slug))
            .map(|(slug, _)| slug)
    }
}
