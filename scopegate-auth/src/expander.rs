// SPDX-License-Identifier: MIT OR Apache-2.0

//! Resource types reachable through held entity keys.
//!
//! Holding a key on an entity makes documents of other resource types visible if those types
//! declare an enabled `byReference` rule for the entity's scope. The reference graph records
//! these relations as edges from the referenced scope to the dependent resource type.
//!
//! Expansion is a single hop: if `A` references `B` and `B` references `C`, a key on `C` reaches
//! `B` but not `A`.
use std::collections::{BTreeSet, HashMap};

use petgraph::Direction;
use petgraph::graphmap::DiGraphMap;

use crate::context::AuthContext;
use crate::permission::Domain;
use crate::registry::{KeyFilterMode, ResourcePolicyRegistry, ResourceType, ScopeKind};

/// Reference relations between entity resource types.
#[derive(Clone, Debug, Default)]
pub struct ReferenceGraph {
    names: Vec<ResourceType>,
    index: HashMap<ResourceType, usize>,
    graph: DiGraphMap<usize, ()>,
}

impl ReferenceGraph {
    /// Collect the enabled `byReference` rules of the entity domain.
    pub fn from_registry(resources: &ResourcePolicyRegistry) -> Self {
        let mut graph = Self::default();

        for (resource_type, config) in resources.resources(Domain::Entity) {
            for rule in &config.key_filters {
                if rule.enabled && rule.mode == KeyFilterMode::ByReference {
                    graph.add_reference(&rule.scope.slug, resource_type);
                }
            }
        }

        graph
    }

    fn node(&mut self, name: &str) -> usize {
        if let Some(index) = self.index.get(name) {
            return *index;
        }

        let index = self.names.len();
        self.names.push(name.to_string());
        self.index.insert(name.to_string(), index);
        self.graph.add_node(index);
        index
    }

    fn add_reference(&mut self, referenced: &str, dependent: &str) {
        let from = self.node(referenced);
        let to = self.node(dependent);
        self.graph.add_edge(from, to, ());
    }

    /// Resource types with an enabled reference rule for the given scope.
    pub fn dependents<'a>(&'a self, scope: &str) -> impl Iterator<Item = &'a ResourceType> {
        self.index
            .get(scope)
            .into_iter()
            .flat_map(|index| self.graph.neighbors_directed(*index, Direction::Outgoing))
            .map(|index| &self.names[index])
    }

    /// Number of reference relations.
    pub fn len(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Resource types a multi-type listing should query for the principal.
    ///
    /// These are the entity scopes the principal holds at least one non-empty key for, plus every
    /// resource type directly depending on one of them. The result is sorted and free of
    /// duplicates, and empty if no entity keys are held.
    pub fn relevant_resource_types(&self, auth: &AuthContext) -> Vec<ResourceType> {
        let direct: BTreeSet<&ResourceType> = auth.held_scopes(ScopeKind::Entity).collect();
        if direct.is_empty() {
            return Vec::new();
        }

        let mut relevant = direct.clone();
        for scope in &direct {
            relevant.extend(self.dependents(scope));
        }

        relevant.into_iter().cloned().collect()
    }
}

/// Resource types a multi-type listing should query for the principal.
///
/// Builds the reference graph on every call, hold on to a [`ReferenceGraph`] to avoid this.
pub fn relevant_resource_types(
    resources: &ResourcePolicyRegistry,
    auth: &AuthContext,
) -> Vec<ResourceType> {
    ReferenceGraph::from_registry(resources).relevant_resource_types(auth)
}
