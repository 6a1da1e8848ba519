// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-document check run right before a mutation is applied.
use tracing::debug;

use crate::context::AuthContext;
use crate::document::ResourceDocument;
use crate::permission::{Action, Domain, Permission, has_permission, resolve_rule};
use crate::registry::{ResourcePolicyRegistry, RoleRegistry};

/// Returns `true` if the principal may apply the action to the document.
///
/// Admins always may. Everyone else needs the capability for the action (see
/// [`has_permission`]) and, on top of it, ownership of the document if either
///
/// - the document is marked `PublicReadOnly`, or
/// - the role holds the capability only through `ownOnlyRoles`.
pub fn can_edit_or_delete_resource(
    roles: &RoleRegistry,
    resources: &ResourcePolicyRegistry,
    auth: &AuthContext,
    document: &ResourceDocument,
    domain: Domain,
    action: Action,
    resource_type: Option<&str>,
) -> bool {
    if auth.is_admin {
        return true;
    }

    let permission = Permission::new(domain, action);
    if !has_permission(roles, resources, auth, permission, resource_type) {
        return false;
    }

    let is_owner = document.is_owned_by(&auth.user_id);

    if document.is_read_only() {
        if !is_owner {
            debug!(%permission, user_id = %auth.user_id, "document is read-only for non-owners");
        }
        return is_owner;
    }

    let own_only = resolve_rule(resources, permission, resource_type)
        .is_some_and(|rule| rule.is_own_only(&auth.role));
    if own_only {
        return is_owner;
    }

    true
}
