//! Canonicalization: map a term or code to its preferred term within a hierarchy.
//!
//! A term is preferred when it is a member of the hierarchy through an edge of
//! the functional type. Aliases hang off preferred terms through structural
//! edges; resolving an alias climbs those edges until a functional membership
//! edge is found.

use crate::engine::Navigator;
use crate::walk::{Visit, WalkOrder, WalkSpec, walk_with};
use std::collections::BTreeMap;
use vocab_core::error::Result;
use vocab_core::graph::{CodeField, Edge, Node};
use vocab_core::hierarchy::Hierarchy;
use vocab_core::store::{CodeLookup, EdgeFilter, GraphStore};

impl<S: GraphStore + ?Sized> Navigator<'_, S> {
    /// Preferred term for `target`, or `None` when it has no canonical
    /// representative under the hierarchy's root.
    ///
    /// Idempotent: resolving a preferred term returns it unchanged.
    pub fn resolve_by_handle(&self, hierarchy: &Hierarchy, target: &str) -> Result<Option<Node>> {
        let predicates = hierarchy.bound_set();
        let member_side = hierarchy.direction.reach();
        let filter = EdgeFilter {
            root: &hierarchy.root,
            predicates: &predicates,
            endpoint: member_side,
            handle: target,
        };
        let mut edges: Vec<Edge> = self
            .store
            .edges(&filter)?
            .into_iter()
            .filter(|e| filter.accepts(e))
            .collect();
        // Functional edges first, then a stable order among structural ones.
        edges.sort_by(|a, b| {
            (!a.predicate.is_functional(), a).cmp(&(!b.predicate.is_functional(), b))
        });

        let Some(first) = edges.first() else {
            tracing::debug!(root = %hierarchy.root, target, "no membership edge");
            return Ok(None);
        };
        if first.predicate == hierarchy.functional {
            return Ok(self.store.node(target)?);
        }

        for alias_edge in edges.iter().filter(|e| !e.predicate.is_functional()) {
            if let Some(handle) = self.climb_to_preferred(hierarchy, alias_edge)? {
                tracing::debug!(root = %hierarchy.root, target, preferred = %handle, "resolved alias");
                return Ok(self.store.node(&handle)?);
            }
        }
        Ok(None)
    }

    /// Walk from the far side of a structural edge back toward the root until
    /// an edge of the functional type appears; its member side is preferred.
    fn climb_to_preferred(&self, hierarchy: &Hierarchy, alias_edge: &Edge) -> Result<Option<String>> {
        let predicates = hierarchy.bound_set();
        let member_side = hierarchy.direction.reach();
        let start = alias_edge.endpoint(hierarchy.direction.anchor());
        let spec = WalkSpec {
            start,
            direction: hierarchy.direction.reversed(),
            predicates: &predicates,
            root: &hierarchy.root,
            min_level: 1,
            max_level: self.limits.max_level,
            order: WalkOrder::BreadthFirst,
        };

        let mut preferred = None;
        walk_with(self.store, &spec, |step| match step.edge {
            Some(edge) if edge.predicate == hierarchy.functional => {
                preferred = Some(edge.endpoint(member_side).to_string());
                Visit::Stop
            }
            _ => Visit::Continue,
        })?;
        Ok(preferred)
    }

    /// Every node whose `field` equals `code`, mapped to its preferred term.
    /// Candidates without one are omitted.
    pub fn resolve_candidates_by_code(
        &self,
        hierarchy: &Hierarchy,
        code: &str,
        field: CodeField,
    ) -> Result<BTreeMap<String, Node>> {
        let candidates = self
            .store
            .find_nodes_by_code(field, &CodeLookup::exact(code))?;
        let mut resolved = BTreeMap::new();
        for candidate in candidates {
            if let Some(node) = self.resolve_by_handle(hierarchy, &candidate)? {
                resolved.insert(candidate, node);
            }
        }
        Ok(resolved)
    }

    /// Distinct preferred terms for `code`, ordered by handle.
    ///
    /// Several candidates may share a code across hierarchies; each resolves
    /// independently and duplicates collapse by handle.
    pub fn resolve_by_code(&self, hierarchy: &Hierarchy, code: &str, field: CodeField) -> Result<Vec<Node>> {
        let mut distinct = BTreeMap::new();
        for node in self.resolve_candidates_by_code(hierarchy, code, field)?.into_values() {
            distinct.entry(node.handle.clone()).or_insert(node);
        }
        Ok(distinct.into_values().collect())
    }
}
