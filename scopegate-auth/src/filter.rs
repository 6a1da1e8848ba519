// SPDX-License-Identifier: MIT OR Apache-2.0

//! Read access filters.
//!
//! A non-admin principal sees a document if any of these holds:
//!
//! 1. it owns the document,
//! 2. the document is broadcast to everyone or to the principal's role,
//! 3. an enabled key filter rule of the resource type lists the principal's role and the
//!    principal holds a key matching the document (the document itself, an entity it
//!    references or a group it is a member of).
//!
//! The conditions are combined with `OR` only. Every rule branch can be dropped without widening
//! access: unparseable ids, missing keys, role mismatches and schema mismatches all remove the
//! branch (or the id) instead of replacing it with something broader.
use std::collections::HashSet;

use scopegate_core::{Predicate, Value};
use tracing::{debug, trace};

use crate::context::AuthContext;
use crate::document::{
    GROUP_ID_FIELD, GROUP_TYPE_FIELD, GROUPS_FIELD, ID_FIELD, OWNER_FIELD, VISIBILITY_FIELD,
    data_field,
};
use crate::permission::Domain;
use crate::registry::{
    KeyFilterMode, KeyFilterRule, PUBLIC, PUBLIC_READ_ONLY, ResourcePolicyRegistry,
};
use crate::traits::{IdNormalizer, SchemaRegistry};

fn owner_branch(auth: &AuthContext) -> Predicate {
    Predicate::field_eq(OWNER_FIELD, auth.user_id.as_str())
}

fn broadcast_branch(auth: &AuthContext) -> Predicate {
    Predicate::field_in(
        VISIBILITY_FIELD,
        [PUBLIC, PUBLIC_READ_ONLY, auth.role.as_str()],
    )
}

/// Owner and broadcast filter, for resource types without key filter rules.
///
/// Admins get the empty predicate.
pub fn basic_access_filter(auth: &AuthContext) -> Predicate {
    if auth.is_admin {
        return Predicate::True;
    }

    Predicate::or(vec![owner_branch(auth), broadcast_branch(auth)])
}

/// Read filter for a resource type, extending the basic filter by one branch per key filter
/// rule contributing for the principal.
///
/// Unregistered resource types get the basic filter.
pub fn access_filter<S, N>(
    resources: &ResourcePolicyRegistry,
    schemas: &S,
    normalizer: &N,
    auth: &AuthContext,
    domain: Domain,
    resource_type: &str,
) -> Predicate
where
    S: SchemaRegistry + ?Sized,
    N: IdNormalizer + ?Sized,
{
    if auth.is_admin {
        return Predicate::True;
    }

    let mut branches = vec![owner_branch(auth), broadcast_branch(auth)];

    if let Some(config) = resources.get(domain, resource_type) {
        branches.extend(config.key_filters.iter().filter_map(|rule| {
            key_filter_branch(rule, schemas, normalizer, auth, resource_type)
        }));
    }

    trace!(
        %domain,
        resource_type,
        role = %auth.role,
        key_branches = branches.len() - 2,
        "built access filter"
    );

    Predicate::or(branches)
}

/// Branch granted by a single key filter rule, `None` if the rule does not contribute.
pub fn key_filter_branch<S, N>(
    rule: &KeyFilterRule,
    schemas: &S,
    normalizer: &N,
    auth: &AuthContext,
    resource_type: &str,
) -> Option<Predicate>
where
    S: SchemaRegistry + ?Sized,
    N: IdNormalizer + ?Sized,
{
    if !rule.applies_to(&auth.role) {
        return None;
    }

    let field = match rule.mode {
        KeyFilterMode::SelfMatch => ID_FIELD.to_string(),
        KeyFilterMode::ByReference => {
            let Some(field_key) = rule.reference_field_key.as_deref() else {
                debug!(
                    resource_type,
                    scope = %rule.scope.slug,
                    "skip reference rule without reference field"
                );
                return None;
            };

            let target = schemas.reference_target(resource_type, field_key);
            if target != Some(rule.scope.slug.as_str()) {
                debug!(
                    resource_type,
                    field_key,
                    scope = %rule.scope.slug,
                    declared_target = ?target,
                    "skip reference rule not backed by the schema"
                );
                return None;
            }

            data_field(field_key)
        }
        KeyFilterMode::ByGroupMembership => GROUP_ID_FIELD.to_string(),
    };

    let ids = normalize_keys(normalizer, auth, rule);
    if ids.is_empty() {
        return None;
    }

    let branch = match rule.mode {
        KeyFilterMode::ByGroupMembership => Predicate::any_element(
            GROUPS_FIELD,
            Predicate::and(vec![
                Predicate::field_in(field, ids),
                Predicate::field_eq(GROUP_TYPE_FIELD, rule.group_type()),
            ]),
        ),
        KeyFilterMode::SelfMatch | KeyFilterMode::ByReference => Predicate::field_in(field, ids),
    };

    Some(branch)
}

/// Held keys for the rule's scope converted into storage ids.
///
/// Ids failing conversion are dropped one by one, duplicates are kept out.
fn normalize_keys<N>(normalizer: &N, auth: &AuthContext, rule: &KeyFilterRule) -> Vec<Value>
where
    N: IdNormalizer + ?Sized,
{
    let mut ids: Vec<Value> = Vec::new();
    let mut seen: HashSet<Value> = HashSet::new();

    for raw in auth.held_keys(rule.scope.kind, &rule.scope.slug) {
        match normalizer.normalize(raw) {
            Ok(id) => {
                if seen.insert(id.clone()) {
                    ids.push(id);
                }
            }
            Err(err) => {
                debug!(
                    scope_kind = %rule.scope.kind,
                    scope = %rule.scope.slug,
                    "dropped key id: {err}"
                );
            }
        }
    }

    ids
}
