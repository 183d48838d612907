//! Plain-text rendering of trees and paths for terminal output.

use crate::tree::TreeNode;
use crate::walk::TraversalPath;
use std::collections::{HashMap, HashSet};

/// Render a tree as an indented outline starting from `root`.
///
/// Parents reached more than once (converging edges) are expanded once; later
/// occurrences are marked with `(see above)`.
pub fn format_tree<'a>(tree: &'a [TreeNode], root: &'a str) -> String {
    let by_parent: HashMap<&str, &TreeNode> =
        tree.iter().map(|t| (t.parent.as_str(), t)).collect();
    let mut output = format!("{}\n", root);
    let mut expanded = HashSet::from([root]);
    format_children(&by_parent, root, 1, &mut expanded, &mut output);
    output
}

fn format_children<'a>(
    by_parent: &HashMap<&'a str, &'a TreeNode>,
    parent: &str,
    indent: usize,
    expanded: &mut HashSet<&'a str>,
    output: &mut String,
) {
    let Some(&node) = by_parent.get(parent) else {
        return;
    };
    let entries: Vec<(&'static str, &'a str)> = node
        .children
        .iter()
        .flat_map(|(predicate, children)| {
            let label = predicate.as_str().trim_start_matches("_predicate_");
            children.iter().map(move |child| (label, child.as_str()))
        })
        .collect();

    let prefix = "  ".repeat(indent - 1);
    let count = entries.len();
    for (i, (predicate, child)) in entries.into_iter().enumerate() {
        let connector = if i + 1 == count { "└──" } else { "├──" };
        let first_visit = expanded.insert(child);
        output.push_str(&format!(
            "{}{} {} ({}){}\n",
            prefix,
            connector,
            child,
            predicate,
            if !first_visit && by_parent.contains_key(child) { " (see above)" } else { "" }
        ));
        if first_visit {
            format_children(by_parent, child, indent + 1, expanded, output);
        }
    }
}

/// Render a path as `a -[enum-of]-> b -[bridge-of]-> c`.
pub fn format_path(path: &TraversalPath) -> String {
    let mut output = String::new();
    for (i, vertex) in path.vertices.iter().enumerate() {
        if i > 0 {
            let predicate = path.edges[i - 1]
                .predicate
                .as_str()
                .trim_start_matches("_predicate_");
            output.push_str(&format!(" -[{}]-> ", predicate));
        }
        output.push_str(vertex);
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{BTreeMap, BTreeSet};
    use vocab_core::graph::{Edge, Predicate};

    #[test]
    fn test_format_tree() {
        let tree = vec![
            TreeNode {
                parent: "langs".to_string(),
                children: BTreeMap::from([(
                    Predicate::EnumOf,
                    BTreeSet::from(["en".to_string(), "it".to_string()]),
                )]),
            },
            TreeNode {
                parent: "it".to_string(),
                children: BTreeMap::from([(
                    Predicate::BridgeOf,
                    BTreeSet::from(["ita".to_string()]),
                )]),
            },
        ];
        let text = format_tree(&tree, "langs");
        assert_eq!(
            text,
            "langs\n├── en (enum-of)\n└── it (enum-of)\n  └── ita (bridge-of)\n"
        );
    }

    #[test]
    fn test_format_tree_expands_converging_parent_once() {
        let enum_of = |parent: &str, children: &[&str]| TreeNode {
            parent: parent.to_string(),
            children: BTreeMap::from([(
                Predicate::EnumOf,
                children.iter().map(|c| c.to_string()).collect(),
            )]),
        };
        let tree = vec![
            enum_of("langs", &["en", "it"]),
            enum_of("en", &["x"]),
            enum_of("it", &["x"]),
            enum_of("x", &["y"]),
        ];
        assert_eq!(
            format_tree(&tree, "langs"),
            "langs\n\
             ├── en (enum-of)\n\
             \x20 └── x (enum-of)\n\
             \x20   └── y (enum-of)\n\
             └── it (enum-of)\n\
             \x20 └── x (enum-of) (see above)\n"
        );
    }

    #[test]
    fn test_format_path() {
        let path = TraversalPath {
            vertices: vec!["langs".to_string(), "it".to_string()],
            edges: vec![Edge::new("it", "langs", Predicate::EnumOf, ["langs"])],
        };
        assert_eq!(format_path(&path), "langs -[enum-of]-> it");
    }
}
