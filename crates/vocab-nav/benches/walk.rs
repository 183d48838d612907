use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use vocab_core::graph::*;
use vocab_core::hierarchy::Hierarchy;
use vocab_nav::Navigator;

/// Build an overlay of `roots` enumerations sharing one pool of terms.
///
/// Each root has `fanout` direct members, each member `fanout` children, and
/// every third member carries a bridged alias. Every fifth edge is shared with
/// the next root to exercise the overlay filter.
fn build_overlay(roots: usize, fanout: usize) -> VocabGraph {
    let mut graph = VocabGraph::new();
    for r in 0..roots {
        let root = format!("terms/root_{}", r);
        graph.insert_node(Node::new(&root, CodeSection::new(None, format!("root_{}", r))));
        let shared = format!("terms/root_{}", (r + 1) % roots);
        for m in 0..fanout {
            let member = format!("terms/r{}_m{}", r, m);
            graph.insert_node(Node::new(
                &member,
                CodeSection::new(Some(format!("r{}", r).as_str()), format!("m{}", m)),
            ));
            let mut member_roots = vec![root.clone()];
            if m % 5 == 0 {
                member_roots.push(shared.clone());
            }
            graph.insert_edge(Edge::new(&member, &root, Predicate::EnumOf, member_roots));

            for c in 0..fanout {
                let child = format!("terms/r{}_m{}_c{}", r, m, c);
                graph.insert_node(Node::new(
                    &child,
                    CodeSection::new(Some(format!("r{}", r).as_str()), format!("m{}_c{}", m, c)),
                ));
                graph.insert_edge(Edge::new(&child, &member, Predicate::EnumOf, [root.clone()]));
            }

            if m % 3 == 0 {
                let alias = format!("terms/r{}_m{}_alias", r, m);
                graph.insert_node(Node::new(
                    &alias,
                    CodeSection::new(Some("alias"), format!("r{}_m{}", r, m)),
                ));
                graph.insert_edge(Edge::new(&alias, &member, Predicate::BridgeOf, [root.clone()]));
            }
        }
    }
    graph.refresh_metadata();
    graph
}

fn bench_flatten(c: &mut Criterion) {
    let graph = build_overlay(20, 30);
    let nav = Navigator::new(&graph);
    let h = Hierarchy::new("terms/root_7", Predicate::EnumOf, Direction::Upstream).unwrap();

    c.bench_function("flatten_overlay", |b| {
        b.iter(|| nav.flatten(black_box(&h)).unwrap())
    });
    c.bench_function("build_tree_2_levels", |b| {
        b.iter(|| nav.build_tree(black_box(&h), Some(2)).unwrap())
    });
}

fn bench_resolve(c: &mut Criterion) {
    let graph = build_overlay(20, 30);
    let nav = Navigator::new(&graph);
    let h = Hierarchy::new("terms/root_7", Predicate::EnumOf, Direction::Upstream).unwrap();
    let codes: Vec<String> = (0..30).map(|m| format!("r7_m{}", m)).collect();

    c.bench_function("resolve_alias", |b| {
        b.iter(|| nav.resolve_by_handle(&h, black_box("terms/r7_m3_alias")).unwrap())
    });
    c.bench_function("resolve_many_by_code_30", |b| {
        b.iter(|| {
            nav.resolve_many_by_code(&h, CodeField::Gid, black_box(&codes))
                .unwrap()
        })
    });
}

criterion_group!(benches, bench_flatten, bench_resolve);
criterion_main!(benches);
