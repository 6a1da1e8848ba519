// SPDX-License-Identifier: MIT OR Apache-2.0

//! Authorization and visibility for config-declared resource types.
//!
//! Decides whether a role may perform an action on a resource type at all
//! ([`has_permission`](permission::has_permission)), which documents of a type a principal may
//! read ([`access_filter`](filter::access_filter)), whether a single document may be mutated
//! ([`can_edit_or_delete_resource`](guard::can_edit_or_delete_resource)) and which resource
//! types are reachable through the principal's entity keys
//! ([`relevant_resource_types`](expander::relevant_resource_types)).
//!
//! Nothing here touches storage. Read filters are returned as
//! [`Predicate`](scopegate_core::Predicate) trees which callers combine with their own filters
//! and lower into the query language of their store.
pub mod config;
pub mod context;
pub mod document;
mod engine;
pub mod expander;
pub mod filter;
pub mod guard;
pub mod normalizer;
pub mod permission;
pub mod registry;
pub mod schema;
#[cfg(any(test, feature = "test_utils"))]
pub mod test_utils;
#[cfg(test)]
mod tests;
pub mod traits;

pub use config::{ConfigError, ConfigWarning, PolicyConfig};
pub use context::AuthContext;
pub use document::{AccessState, ResourceDocument, VisibilityMarker};
pub use engine::AccessControl;
pub use permission::{Action, Domain, Permission, PermissionError};
pub use registry::{
    ActionRule, KeyFilterMode, KeyFilterRule, KeyScope, ResourceConfig, ResourcePolicyRegistry,
    RoleRegistry, ScopeKind,
};
