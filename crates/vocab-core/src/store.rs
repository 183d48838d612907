//! Graph store adapter: the read-only contract the navigation engine walks.

use crate::error::{Error, StoreError};
use crate::graph::{CodeField, Edge, Endpoint, Node, VocabGraph};
use crate::hierarchy::PredicateSet;
use globset::{Glob, GlobMatcher};
use std::collections::BTreeSet;

/// Edge query: root membership, allowed relationship types, and one fixed endpoint.
#[derive(Debug, Clone, Copy)]
pub struct EdgeFilter<'a> {
    pub root: &'a str,
    pub predicates: &'a PredicateSet,
    /// Which side of the edge must equal `handle`.
    pub endpoint: Endpoint,
    pub handle: &'a str,
}

impl EdgeFilter<'_> {
    pub fn accepts(&self, edge: &Edge) -> bool {
        edge.endpoint(self.endpoint) == self.handle
            && self.predicates.contains(edge.predicate)
            && edge.is_member_of(self.root)
    }
}

/// Code lookup against the secondary index.
#[derive(Debug, Clone)]
pub enum CodeLookup {
    Exact(String),
    /// Shell-style glob over the field's values.
    Pattern(GlobMatcher),
}

impl CodeLookup {
    pub fn exact(code: impl Into<String>) -> Self {
        Self::Exact(code.into())
    }

    pub fn pattern(pattern: &str) -> Result<Self, Error> {
        let glob = Glob::new(pattern).map_err(|_| Error::InvalidFilter {
            kind: "code pattern",
            value: pattern.to_string(),
        })?;
        Ok(Self::Pattern(glob.compile_matcher()))
    }

    pub fn is_match(&self, value: &str) -> bool {
        match self {
            Self::Exact(code) => code == value,
            Self::Pattern(matcher) => matcher.is_match(value),
        }
    }
}

/// Read access to a vocabulary store.
///
/// Implementations must be safe to share across threads; the engine never
/// writes through this trait. No ordering is guaranteed for returned sequences.
pub trait GraphStore: Send + Sync {
    /// Point lookup. `Ok(None)` when the handle is unknown.
    fn node(&self, handle: &str) -> Result<Option<Node>, StoreError>;

    /// Edges accepted by `filter`.
    fn edges(&self, filter: &EdgeFilter<'_>) -> Result<Vec<Edge>, StoreError>;

    /// Handles of nodes whose `field` matches `lookup`.
    fn find_nodes_by_code(
        &self,
        field: CodeField,
        lookup: &CodeLookup,
    ) -> Result<Vec<String>, StoreError>;
}

impl GraphStore for VocabGraph {
    fn node(&self, handle: &str) -> Result<Option<Node>, StoreError> {
        Ok(self.get_node(handle).cloned())
    }

    fn edges(&self, filter: &EdgeFilter<'_>) -> Result<Vec<Edge>, StoreError> {
        Ok(self
            .edges_for(filter.handle)
            .into_iter()
            .filter(|e| filter.accepts(e))
            .cloned()
            .collect())
    }

    fn find_nodes_by_code(
        &self,
        field: CodeField,
        lookup: &CodeLookup,
    ) -> Result<Vec<String>, StoreError> {
        if self.code_index.is_empty() && !self.nodes.is_empty() {
            // Index not built: scan
            return Ok(self
                .nodes
                .values()
                .filter(|n| n.code.values(field).iter().any(|v| lookup.is_match(v)))
                .map(|n| n.handle.clone())
                .collect());
        }
        let Some(values) = self.code_index.get(&field) else {
            return Ok(Vec::new());
        };
        let handles: BTreeSet<&String> = match lookup {
            CodeLookup::Exact(code) => values.get(code).into_iter().flatten().collect(),
            CodeLookup::Pattern(matcher) => values
                .iter()
                .filter(|(value, _)| matcher.is_match(value.as_str()))
                .flat_map(|(_, handles)| handles)
                .collect(),
        };
        Ok(handles.into_iter().cloned().collect())
    }
}
