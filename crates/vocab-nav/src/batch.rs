//! Resolve many handles or codes against one hierarchy.
//!
//! Each key is resolved independently; every input key appears in the output,
//! mapped to an empty result when nothing matched.

use crate::engine::Navigator;
use std::collections::BTreeMap;
use vocab_core::error::Result;
use vocab_core::graph::{CodeField, Edge, Node};
use vocab_core::hierarchy::Hierarchy;
use vocab_core::store::{CodeLookup, EdgeFilter, GraphStore};

impl<S: GraphStore + ?Sized> Navigator<'_, S> {
    /// Functional membership edges of `handle` under the hierarchy's root, sorted.
    fn membership_edges(&self, hierarchy: &Hierarchy, handle: &str) -> Result<Vec<Edge>> {
        let predicates = hierarchy.functional_set();
        let filter = EdgeFilter {
            root: &hierarchy.root,
            predicates: &predicates,
            endpoint: hierarchy.direction.reach(),
            handle,
        };
        let mut edges: Vec<Edge> = self
            .store
            .edges(&filter)?
            .into_iter()
            .filter(|e| filter.accepts(e))
            .collect();
        edges.sort();
        Ok(edges)
    }

    /// For each handle, the parent it hangs from through the functional type,
    /// or `None` when it is not a member of the hierarchy.
    pub fn check_membership(
        &self,
        hierarchy: &Hierarchy,
        handles: &[String],
    ) -> Result<BTreeMap<String, Option<String>>> {
        tracing::debug!(root = %hierarchy.root, keys = handles.len(), "check membership");
        let parent_side = hierarchy.direction.anchor();
        self.fan_out(handles, |handle| {
            Ok(self
                .membership_edges(hierarchy, handle)?
                .first()
                .map(|e| e.endpoint(parent_side).to_string()))
        })
    }

    /// For each code, the handles whose `field` equals it and which are members
    /// of the hierarchy through the functional type.
    pub fn check_codes(
        &self,
        hierarchy: &Hierarchy,
        field: CodeField,
        codes: &[String],
    ) -> Result<BTreeMap<String, Vec<String>>> {
        tracing::debug!(root = %hierarchy.root, %field, keys = codes.len(), "check codes");
        self.fan_out(codes, |code| {
            let mut candidates = self
                .store
                .find_nodes_by_code(field, &CodeLookup::exact(code.as_str()))?;
            candidates.sort();
            let mut members = Vec::new();
            for candidate in candidates {
                if !self.membership_edges(hierarchy, &candidate)?.is_empty() {
                    members.push(candidate);
                }
            }
            Ok(members)
        })
    }

    /// [`resolve_by_code`](Navigator::resolve_by_code) for every code.
    ///
    /// A code absent from the store and a code with no preferred term under
    /// this root both map to an empty list.
    pub fn resolve_many_by_code(
        &self,
        hierarchy: &Hierarchy,
        field: CodeField,
        codes: &[String],
    ) -> Result<BTreeMap<String, Vec<Node>>> {
        tracing::debug!(root = %hierarchy.root, %field, keys = codes.len(), "resolve many");
        self.fan_out(codes, |code| self.resolve_by_code(hierarchy, code, field))
    }
}
