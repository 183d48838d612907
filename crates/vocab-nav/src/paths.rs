//! Path search from an origin to a target node or to the first node matching a code.

use crate::engine::Navigator;
use crate::walk::{TraversalPath, Visit, WalkOrder, WalkSpec, walk_with};
use vocab_core::error::Result;
use vocab_core::graph::CodeField;
use vocab_core::hierarchy::{Hierarchy, PredicateSet};
use vocab_core::store::{CodeLookup, GraphStore};

impl<S: GraphStore + ?Sized> Navigator<'_, S> {
    fn path_spec<'a>(
        &self,
        hierarchy: &'a Hierarchy,
        predicates: &'a PredicateSet,
        origin: &'a str,
        max_level: Option<usize>,
    ) -> WalkSpec<'a> {
        WalkSpec {
            start: origin,
            direction: hierarchy.direction,
            predicates,
            root: &hierarchy.root,
            min_level: 0,
            max_level: max_level.unwrap_or(self.limits.max_level),
            order: WalkOrder::DepthFirst,
        }
    }

    /// Every path from `origin` to `target` within the hierarchy.
    ///
    /// More than one path comes back when the graph is not strictly a tree.
    /// `origin == target` yields the single zero-length path.
    pub fn path_to_target(
        &self,
        hierarchy: &Hierarchy,
        origin: &str,
        target: &str,
        max_level: Option<usize>,
    ) -> Result<Vec<TraversalPath>> {
        let predicates = hierarchy.bound_set();
        let spec = self.path_spec(hierarchy, &predicates, origin, max_level);
        tracing::debug!(root = %hierarchy.root, origin, target, "path to target");

        let mut paths = Vec::new();
        walk_with(self.store, &spec, |step| {
            if step.vertex.handle == target {
                paths.push(step.path);
                // Any longer path through the target would revisit it.
                return Visit::Prune;
            }
            Visit::Continue
        })?;
        Ok(paths)
    }

    /// Every path from `origin` to a node whose `field` matches `code`.
    ///
    /// Multi-valued fields match on membership, the others on equality (or
    /// the glob for pattern lookups). Descent stops at the first match on
    /// each branch.
    pub fn path_to_code(
        &self,
        hierarchy: &Hierarchy,
        origin: &str,
        code: &CodeLookup,
        field: CodeField,
        max_level: Option<usize>,
    ) -> Result<Vec<TraversalPath>> {
        let predicates = hierarchy.bound_set();
        let spec = self.path_spec(hierarchy, &predicates, origin, max_level);
        tracing::debug!(root = %hierarchy.root, origin, %field, "path to code");

        let mut paths = Vec::new();
        walk_with(self.store, &spec, |step| {
            let matched = step
                .vertex
                .code
                .values(field)
                .iter()
                .any(|v| code.is_match(v));
            if matched {
                paths.push(step.path);
                return Visit::Prune;
            }
            Visit::Continue
        })?;
        Ok(paths)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vocab_core::graph::{CodeSection, Direction, Edge, Node, Predicate, VocabGraph};

    /// root ← a ← c and root ← b ← c (diamond, upstream from root).
    fn diamond() -> VocabGraph {
        let mut graph = VocabGraph::new();
        graph.insert_node(Node::new("root", CodeSection::new(None, "root")));
        graph.insert_node(Node::new("a", CodeSection::new(Some("ns"), "a")));
        graph.insert_node(Node::new("b", CodeSection::new(Some("ns"), "b")));
        graph.insert_node(Node::new(
            "c",
            CodeSection::new(Some("ns"), "c").with_aliases(["see"]),
        ));
        graph.insert_edge(Edge::new("a", "root", Predicate::EnumOf, ["root"]));
        graph.insert_edge(Edge::new("b", "root", Predicate::EnumOf, ["root"]));
        graph.insert_edge(Edge::new("c", "a", Predicate::EnumOf, ["root"]));
        graph.insert_edge(Edge::new("c", "b", Predicate::BridgeOf, ["root"]));
        graph
    }

    fn hierarchy() -> Hierarchy {
        Hierarchy::new("root", Predicate::EnumOf, Direction::Upstream).unwrap()
    }

    #[test]
    fn test_multiple_paths_to_target() {
        let graph = diamond();
        let nav = Navigator::new(&graph);
        let paths = nav.path_to_target(&hierarchy(), "root", "c", None).unwrap();
        assert_eq!(paths.len(), 2);
        assert_eq!(paths[0].vertices, vec!["root", "a", "c"]);
        assert_eq!(paths[1].vertices, vec!["root", "b", "c"]);
        assert_eq!(paths[1].edges[1].predicate, Predicate::BridgeOf);
    }

    #[test]
    fn test_path_respects_structural_list() {
        let graph = diamond();
        let nav = Navigator::new(&graph);
        let functional_only = hierarchy().with_structural([]).unwrap();
        let paths = nav.path_to_target(&functional_only, "root", "c", None).unwrap();
        assert_eq!(paths.len(), 1);
        assert_eq!(paths[0].vertices, vec!["root", "a", "c"]);
    }

    #[test]
    fn test_path_to_self_and_missing() {
        let graph = diamond();
        let nav = Navigator::new(&graph);
        let paths = nav.path_to_target(&hierarchy(), "root", "root", None).unwrap();
        assert_eq!(paths.len(), 1);
        assert!(paths[0].edges.is_empty());
        assert!(nav.path_to_target(&hierarchy(), "root", "zz", None).unwrap().is_empty());
        assert!(nav.path_to_target(&hierarchy(), "root", "c", Some(1)).unwrap().is_empty());
    }

    #[test]
    fn test_path_to_code_alias_and_pattern() {
        let graph = diamond();
        let nav = Navigator::new(&graph);
        let paths = nav
            .path_to_code(&hierarchy(), "root", &CodeLookup::exact("see"), CodeField::Aid, None)
            .unwrap();
        assert_eq!(paths.len(), 2);
        assert!(paths.iter().all(|p| p.last() == Some("c")));

        // First match on each branch ends the branch.
        let pattern = CodeLookup::pattern("ns_*").unwrap();
        let paths = nav
            .path_to_code(&hierarchy(), "root", &pattern, CodeField::Gid, None)
            .unwrap();
        let ends: Vec<&str> = paths.iter().filter_map(|p| p.last()).collect();
        assert_eq!(ends, vec!["a", "b"]);
    }
}
