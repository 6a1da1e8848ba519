// SPDX-License-Identifier: MIT OR Apache-2.0

use scopegate_core::Predicate;
use tracing::warn;

use crate::config::PolicyConfig;
use crate::context::AuthContext;
use crate::document::ResourceDocument;
use crate::expander::ReferenceGraph;
use crate::filter;
use crate::guard;
use crate::normalizer::ObjectIdNormalizer;
use crate::permission::{self, Action, Domain, Permission};
use crate::registry::{ResourcePolicyRegistry, ResourceType, RoleRegistry};
use crate::schema::EntitySchemas;
use crate::traits::{IdNormalizer, SchemaRegistry};

/// Access control over the configured registries.
///
/// Built once when the process starts and shared by all requests. Every method is a pure
/// function of the configuration and the principal passed in.
#[derive(Clone, Debug)]
pub struct AccessControl<S = EntitySchemas, N = ObjectIdNormalizer> {
    roles: RoleRegistry,
    resources: ResourcePolicyRegistry,
    schemas: S,
    normalizer: N,
    references: ReferenceGraph,
}

impl<S> AccessControl<S, ObjectIdNormalizer>
where
    S: SchemaRegistry,
{
    /// Access control for storage using object ids.
    pub fn new(config: PolicyConfig, schemas: S) -> Self {
        Self::with_normalizer(config, schemas, ObjectIdNormalizer)
    }
}

impl<S, N> AccessControl<S, N>
where
    S: SchemaRegistry,
    N: IdNormalizer,
{
    pub fn with_normalizer(config: PolicyConfig, schemas: S, normalizer: N) -> Self {
        for warning in config.warnings() {
            warn!("policy configuration: {warning}");
        }

        let references = ReferenceGraph::from_registry(&config.resources);

        Self {
            roles: config.roles,
            resources: config.resources,
            schemas,
            normalizer,
            references,
        }
    }

    pub fn roles(&self) -> &RoleRegistry {
        &self.roles
    }

    pub fn resources(&self) -> &ResourcePolicyRegistry {
        &self.resources
    }

    pub fn schemas(&self) -> &S {
        &self.schemas
    }

    pub fn references(&self) -> &ReferenceGraph {
        &self.references
    }

    /// Build the principal for a session, taking the admin flag from the role registry.
    pub fn resolve_auth(&self, user_id: &str, role: &str) -> AuthContext {
        AuthContext::resolve(&self.roles, user_id, role)
    }

    /// See [`permission::has_permission`].
    pub fn has_permission(
        &self,
        auth: &AuthContext,
        permission: Permission,
        resource_type: Option<&str>,
    ) -> bool {
        permission::has_permission(&self.roles, &self.resources, auth, permission, resource_type)
    }

    /// See [`filter::basic_access_filter`].
    pub fn basic_access_filter(&self, auth: &AuthContext) -> Predicate {
        filter::basic_access_filter(auth)
    }

    /// Read filter for an entity resource type.
    pub fn access_filter(&self, auth: &AuthContext, resource_type: &str) -> Predicate {
        self.access_filter_in(auth, Domain::Entity, resource_type)
    }

    /// Read filter for a resource type of any domain, see [`filter::access_filter`].
    pub fn access_filter_in(
        &self,
        auth: &AuthContext,
        domain: Domain,
        resource_type: &str,
    ) -> Predicate {
        filter::access_filter(
            &self.resources,
            &self.schemas,
            &self.normalizer,
            auth,
            domain,
            resource_type,
        )
    }

    /// See [`guard::can_edit_or_delete_resource`].
    pub fn can_edit_or_delete_resource(
        &self,
        auth: &AuthContext,
        document: &ResourceDocument,
        domain: Domain,
        action: Action,
        resource_type: Option<&str>,
    ) -> bool {
        guard::can_edit_or_delete_resource(
            &self.roles,
            &self.resources,
            auth,
            document,
            domain,
            action,
            resource_type,
        )
    }

    /// See [`ReferenceGraph::relevant_resource_types`].
    pub fn relevant_resource_types(&self, auth: &AuthContext) -> Vec<ResourceType> {
        self.references.relevant_resource_types(auth)
    }
}
