use vocab_core::graph::*;
use vocab_core::hierarchy::PredicateSet;
use vocab_core::store::{CodeLookup, EdgeFilter, GraphStore};

fn term(handle: &str, nid: Option<&str>, lid: &str) -> Node {
    Node::new(handle, CodeSection::new(nid, lid))
}

fn make_graph() -> VocabGraph {
    let mut graph = VocabGraph::new();
    graph.insert_node(term("terms/langs", None, "langs"));
    graph.insert_node(term("terms/iso_en", Some("iso"), "en"));
    graph.insert_node(term("terms/iso_it", Some("iso"), "it"));
    graph.insert_edge(Edge::new(
        "terms/iso_en",
        "terms/langs",
        Predicate::EnumOf,
        ["terms/langs"],
    ));
    graph.insert_edge(Edge::new(
        "terms/iso_it",
        "terms/langs",
        Predicate::EnumOf,
        ["terms/langs", "terms/eu_langs"],
    ));
    graph
}

#[test]
fn test_insert_node_indexes_codes() {
    let graph = make_graph();
    assert_eq!(graph.nodes.len(), 3);
    let found = graph
        .find_nodes_by_code(CodeField::Gid, &CodeLookup::exact("iso_en"))
        .unwrap();
    assert_eq!(found, vec!["terms/iso_en"]);
    let by_ns = graph
        .find_nodes_by_code(CodeField::Nid, &CodeLookup::exact("iso"))
        .unwrap();
    assert_eq!(by_ns.len(), 2);
}

#[test]
fn test_replacing_node_reindexes() {
    let mut graph = make_graph();
    graph.insert_node(term("terms/iso_en", Some("iso"), "eng"));
    assert!(graph
        .find_nodes_by_code(CodeField::Lid, &CodeLookup::exact("en"))
        .unwrap()
        .is_empty());
    assert_eq!(
        graph
            .find_nodes_by_code(CodeField::Lid, &CodeLookup::exact("eng"))
            .unwrap(),
        vec!["terms/iso_en"]
    );
}

#[test]
fn test_remove_node_cleans_edges() {
    let mut graph = make_graph();
    let removed = graph.remove_node("terms/iso_en");
    assert_eq!(removed.unwrap().code.lid, "en");
    assert_eq!(graph.edges.len(), 1);
    assert_eq!(graph.edges_for("terms/langs").len(), 1);
    assert!(graph
        .find_nodes_by_code(CodeField::Lid, &CodeLookup::exact("en"))
        .unwrap()
        .is_empty());
    assert!(graph.remove_node("terms/iso_en").is_none());
}

#[test]
fn test_refresh_metadata_counts() {
    let mut graph = make_graph();
    graph.insert_node(term("terms/alias", None, "english"));
    graph.insert_edge(Edge::new(
        "terms/alias",
        "terms/iso_en",
        Predicate::BridgeOf,
        ["terms/langs"],
    ));
    graph.refresh_metadata();
    assert_eq!(graph.metadata.total_nodes, 4);
    assert_eq!(graph.metadata.total_edges, 3);
    assert_eq!(graph.metadata.functional_edges, 2);
    assert_eq!(graph.metadata.structural_edges, 1);
    assert_eq!(graph.metadata.roots, 2);
}

#[test]
fn test_edge_filter_endpoint_side() {
    let graph = make_graph();
    let predicates = PredicateSet::from_iter([Predicate::EnumOf]);
    let outbound = EdgeFilter {
        root: "terms/eu_langs",
        predicates: &predicates,
        endpoint: Endpoint::From,
        handle: "terms/iso_it",
    };
    assert_eq!(graph.edges(&outbound).unwrap().len(), 1);

    let wrong_side = EdgeFilter {
        endpoint: Endpoint::To,
        ..outbound
    };
    assert!(graph.edges(&wrong_side).unwrap().is_empty());
}

#[test]
fn test_validate_reports_integrity_problems() {
    let mut graph = make_graph();
    assert_eq!(graph.validate(), vec!["root terms/eu_langs is not a node"]);

    graph.edges.push(Edge::new(
        "terms/ghost",
        "terms/langs",
        Predicate::EnumOf,
        Vec::<String>::new(),
    ));
    let problems = graph.validate();
    assert!(problems.iter().any(|p| p.contains("dangling edge endpoint terms/ghost")));
    assert!(problems.iter().any(|p| p.contains("belongs to no hierarchy")));
    assert!(problems.iter().any(|p| p.contains("root terms/eu_langs is not a node")));
}
