//! Hierarchy flattening and depth-bounded tree construction.

use crate::engine::Navigator;
use crate::walk::{Step, TraversalPath, Visit, walk_with};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use vocab_core::error::Result;
use vocab_core::graph::{Edge, Node, Predicate};
use vocab_core::hierarchy::Hierarchy;
use vocab_core::store::GraphStore;

/// One hierarchy level under a parent: relationship type → child handles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TreeNode {
    pub parent: String,
    pub children: BTreeMap<Predicate, BTreeSet<String>>,
}

impl TreeNode {
    pub fn child_handles(&self) -> impl Iterator<Item = &str> {
        self.children.values().flatten().map(String::as_str)
    }
}

impl<S: GraphStore + ?Sized> Navigator<'_, S> {
    /// Walk the hierarchy from its root through the functional and structural
    /// types, handing over every step reached by an edge of the functional type.
    ///
    /// Structural edges are crossed but never produce members themselves, so
    /// terms filed under a section or bridge still count while the aliases do
    /// not. `levels` bounds the walk; on deep hierarchies the result may be
    /// truncated, and on large ones this is the most expensive query in the crate.
    fn member_walk(
        &self,
        hierarchy: &Hierarchy,
        levels: usize,
        mut on_member: impl FnMut(Step),
    ) -> Result<()> {
        let predicates = hierarchy.bound_set();
        let spec = self.spec_from_root(hierarchy, &predicates, levels);
        walk_with(self.store, &spec, |step| {
            if step
                .edge
                .as_ref()
                .is_some_and(|e| e.predicate == hierarchy.functional)
            {
                on_member(step);
            }
            Visit::Continue
        })?;
        Ok(())
    }

    fn flatten_walk(&self, hierarchy: &Hierarchy, mut on_edge: impl FnMut(Node, Edge)) -> Result<()> {
        tracing::debug!(
            root = %hierarchy.root,
            predicate = %hierarchy.functional,
            direction = %hierarchy.direction,
            "flatten"
        );
        self.member_walk(hierarchy, self.limits.flatten_max_level, |step| {
            if let Some(edge) = step.edge {
                on_edge(step.vertex, edge);
            }
        })
    }

    /// Handles of every member reachable through the functional type.
    pub fn flatten(&self, hierarchy: &Hierarchy) -> Result<BTreeSet<String>> {
        let mut handles = BTreeSet::new();
        self.flatten_walk(hierarchy, |node, _| {
            handles.insert(node.handle);
        })?;
        Ok(handles)
    }

    /// Distinct functional edges of the hierarchy.
    pub fn flatten_edges(&self, hierarchy: &Hierarchy) -> Result<Vec<Edge>> {
        let mut edges = BTreeSet::new();
        self.flatten_walk(hierarchy, |_, edge| {
            edges.insert(edge);
        })?;
        Ok(edges.into_iter().collect())
    }

    /// Member nodes of the hierarchy, ordered by handle.
    pub fn flatten_nodes(&self, hierarchy: &Hierarchy) -> Result<Vec<Node>> {
        let mut nodes = BTreeMap::new();
        self.flatten_walk(hierarchy, |node, _| {
            nodes.entry(node.handle.clone()).or_insert(node);
        })?;
        Ok(nodes.into_values().collect())
    }

    /// Breadth-first tree of the hierarchy down to `levels` hops (`None` uses
    /// the flatten ceiling).
    ///
    /// Children are the members [`flatten`](Navigator::flatten) reports. A
    /// member reached through a section or bridge hangs from its nearest
    /// ancestor that is itself a member (or the root). Parents are listed in
    /// the order the walk first reaches them. Returns nothing when the root
    /// has no children under its own overlay.
    pub fn build_tree(&self, hierarchy: &Hierarchy, levels: Option<usize>) -> Result<Vec<TreeNode>> {
        let levels = levels.unwrap_or(self.limits.flatten_max_level);
        if levels == 0 {
            return Ok(Vec::new());
        }

        let mut tree: Vec<TreeNode> = Vec::new();
        let mut position: HashMap<String, usize> = HashMap::new();
        self.member_walk(hierarchy, levels, |step| {
            let parent = member_parent(&step.path, hierarchy.functional);
            let i = *position.entry(parent.to_string()).or_insert_with(|| {
                tree.push(TreeNode {
                    parent: parent.to_string(),
                    children: BTreeMap::new(),
                });
                tree.len() - 1
            });
            tree[i]
                .children
                .entry(hierarchy.functional)
                .or_default()
                .insert(step.vertex.handle);
        })?;

        if !position.contains_key(&hierarchy.root) {
            return Ok(Vec::new());
        }
        Ok(tree)
    }
}

/// Closest vertex before the end of `path` that is the walk's start or was
/// reached through `functional`.
fn member_parent(path: &TraversalPath, functional: Predicate) -> &str {
    let last = path.vertices.len().saturating_sub(1);
    (0..last)
        .rev()
        .find(|&i| i == 0 || path.edges[i - 1].predicate == functional)
        .map_or(path.vertices[0].as_str(), |i| path.vertices[i].as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use vocab_core::graph::{CodeSection, Direction, VocabGraph};

    fn graph() -> VocabGraph {
        let mut graph = VocabGraph::new();
        for h in ["struct", "name", "first", "last", "section"] {
            graph.insert_node(Node::new(h, CodeSection::new(None, h)));
        }
        // Downstream: parent → child.
        graph.insert_edge(Edge::new("struct", "name", Predicate::FieldOf, ["struct"]));
        graph.insert_edge(Edge::new("struct", "section", Predicate::SectionOf, ["struct"]));
        graph.insert_edge(Edge::new("name", "first", Predicate::FieldOf, ["struct"]));
        graph.insert_edge(Edge::new("section", "last", Predicate::FieldOf, ["struct"]));
        graph
    }

    #[test]
    fn test_flatten_crosses_sections_but_skips_them() {
        let graph = graph();
        let nav = Navigator::new(&graph);
        let h = Hierarchy::new("struct", Predicate::FieldOf, Direction::Downstream).unwrap();
        let members = nav.flatten(&h).unwrap();
        assert_eq!(
            members,
            BTreeSet::from(["first".to_string(), "last".to_string(), "name".to_string()])
        );
        assert_eq!(nav.flatten_edges(&h).unwrap().len(), 3);
        let nodes = nav.flatten_nodes(&h).unwrap();
        assert_eq!(nodes[0].handle, "first");

        // Without structural types the section is a dead end.
        let h = h.with_structural([]).unwrap();
        assert_eq!(
            nav.flatten(&h).unwrap(),
            BTreeSet::from(["first".to_string(), "name".to_string()])
        );
    }

    #[test]
    fn test_tree_groups_members_under_member_parents() {
        let graph = graph();
        let nav = Navigator::new(&graph);
        let h = Hierarchy::new("struct", Predicate::FieldOf, Direction::Downstream).unwrap();
        let tree = nav.build_tree(&h, Some(2)).unwrap();
        assert_eq!(tree[0].parent, "struct");
        assert_eq!(tree[0].children.len(), 1);
        // "last" sits under a section and is filed under the root.
        assert_eq!(
            tree[0].children[&Predicate::FieldOf],
            BTreeSet::from(["last".to_string(), "name".to_string()])
        );
        let parents: Vec<&str> = tree.iter().map(|t| t.parent.as_str()).collect();
        assert_eq!(parents, vec!["struct", "name"]);
        assert_eq!(tree[1].child_handles().collect::<Vec<_>>(), vec!["first"]);
    }

    #[test]
    fn test_tree_empty_when_root_has_no_children() {
        let graph = graph();
        let nav = Navigator::new(&graph);
        let h = Hierarchy::new("first", Predicate::FieldOf, Direction::Downstream).unwrap();
        assert!(nav.build_tree(&h, Some(3)).unwrap().is_empty());
        let h = Hierarchy::new("struct", Predicate::FieldOf, Direction::Downstream).unwrap();
        assert!(nav.build_tree(&h, Some(0)).unwrap().is_empty());
    }
}
