//! On-disk layout of a vocabulary store: `<project>/.vocab/graph.json`.
//!
//! Loading is where a parsed store becomes queryable. Code sections are
//! normalized, the endpoint and code indexes rebuilt, and the integrity report
//! logged. Integrity problems never fail a load: queries treat a dangling
//! endpoint as an absent term.

use crate::graph::VocabGraph;
use crate::schema;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

pub const STORE_DIR: &str = ".vocab";
pub const GRAPH_FILE: &str = "graph.json";

pub fn vocab_dir(project_root: &Path) -> PathBuf {
    project_root.join(STORE_DIR)
}

pub fn vocab_file(project_root: &Path) -> PathBuf {
    vocab_dir(project_root).join(GRAPH_FILE)
}

pub fn exists(project_root: &Path) -> bool {
    vocab_file(project_root).is_file()
}

/// What [`prepare`] had to fix or found wrong in a parsed store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Nodes whose `_gid` or `_aid` did not match their `_nid`/`_lid`.
    pub renormalized: usize,
    /// Integrity problems from [`VocabGraph::validate`].
    pub problems: Vec<String>,
}

/// Make a freshly parsed store queryable.
pub fn prepare(graph: &mut VocabGraph) -> LoadReport {
    let mut renormalized = 0;
    for node in graph.nodes.values_mut() {
        let before = (node.code.gid.clone(), node.code.aid.len());
        node.code.normalize();
        if before != (node.code.gid.clone(), node.code.aid.len()) {
            renormalized += 1;
        }
    }
    graph.rebuild_indexes();
    LoadReport {
        renormalized,
        problems: graph.validate(),
    }
}

pub fn load(project_root: &Path) -> Result<VocabGraph> {
    load_with_report(project_root).map(|(graph, _)| graph)
}

/// Load the store and return the preparation report alongside it.
pub fn load_with_report(project_root: &Path) -> Result<(VocabGraph, LoadReport)> {
    let path = vocab_file(project_root);
    let json = fs::read_to_string(&path)
        .with_context(|| format!("no readable vocabulary store at {}", path.display()))?;
    let mut graph = schema::from_json(&json)
        .with_context(|| format!("{} is not a vocabulary store", path.display()))?;

    let report = prepare(&mut graph);
    if report.renormalized > 0 {
        tracing::debug!(
            store = %path.display(),
            nodes = report.renormalized,
            "re-derived code sections"
        );
    }
    for problem in &report.problems {
        tracing::warn!(store = %path.display(), "{}", problem);
    }
    tracing::debug!(
        nodes = graph.nodes.len(),
        edges = graph.edges.len(),
        roots = graph.metadata.roots,
        "vocabulary store ready"
    );
    Ok((graph, report))
}

/// Write the store, replacing any previous `graph.json` only once the new
/// contents are fully on disk. Returns the path written.
pub fn save(project_root: &Path, graph: &VocabGraph) -> Result<PathBuf> {
    let dir = vocab_dir(project_root);
    fs::create_dir_all(&dir)
        .with_context(|| format!("cannot create {} under {}", STORE_DIR, project_root.display()))?;

    let path = vocab_file(project_root);
    let staging = path.with_extension("json.tmp");
    fs::write(&staging, schema::to_json(graph)?)
        .with_context(|| format!("cannot write vocabulary store to {}", staging.display()))?;
    fs::rename(&staging, &path)
        .with_context(|| format!("cannot move {} into place", staging.display()))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{CodeField, CodeSection, Edge, Node, Predicate};

    #[test]
    fn test_prepare_normalizes_and_indexes() {
        let mut graph = VocabGraph::new();
        let mut raw = Node::new("terms/iso_en", CodeSection::new(Some("iso"), "en"));
        raw.code.gid.clear();
        raw.code.aid.clear();
        graph.nodes.insert(raw.handle.clone(), raw);
        graph.edges.push(Edge::new("terms/iso_en", "terms/langs", Predicate::EnumOf, ["terms/langs"]));

        let report = prepare(&mut graph);
        assert_eq!(report.renormalized, 1);
        let code = &graph.nodes["terms/iso_en"].code;
        assert_eq!(code.gid, "iso_en");
        assert_eq!(code.aid, vec!["en"]);
        assert_eq!(graph.edges_for("terms/iso_en").len(), 1);
        assert!(graph.code_index.contains_key(&CodeField::Gid));
        assert!(report.problems.iter().any(|p| p.contains("terms/langs")));
    }

    #[test]
    fn test_save_leaves_no_staging_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = save(tmp.path(), &VocabGraph::new()).unwrap();
        assert_eq!(path, vocab_file(tmp.path()));
        assert!(exists(tmp.path()));
        assert!(!path.with_extension("json.tmp").exists());

        let (_, report) = load_with_report(tmp.path()).unwrap();
        assert_eq!(report, LoadReport::default());
    }
}
