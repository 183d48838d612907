//! Bounded, direction-aware walk over one overlay hierarchy.
//!
//! Every other query in this crate is a shaped consumer of [`walk_with`]:
//! only edges whose root-membership set contains the requested root and whose
//! relationship type is in the bound predicate set are followed, and a vertex
//! is never revisited along a single path.

use std::collections::VecDeque;
use vocab_core::error::{Error, Result};
use vocab_core::graph::{Direction, Edge, Node};
use vocab_core::hierarchy::PredicateSet;
use vocab_core::store::{EdgeFilter, GraphStore};

/// Expansion order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkOrder {
    /// Follow each branch to its end before backtracking.
    DepthFirst,
    /// Finish every vertex at depth `d` before any at depth `d + 1`.
    BreadthFirst,
}

/// Parameters of a single walk.
#[derive(Debug, Clone, Copy)]
pub struct WalkSpec<'a> {
    pub start: &'a str,
    pub direction: Direction,
    pub predicates: &'a PredicateSet,
    pub root: &'a str,
    /// Minimum edge hops from `start` for a vertex to be reported (0 includes `start`).
    pub min_level: usize,
    /// Maximum edge hops from `start`.
    pub max_level: usize,
    pub order: WalkOrder,
}

/// Ordered vertices and edges from the walk's start to a reached vertex.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct TraversalPath {
    pub vertices: Vec<String>,
    pub edges: Vec<Edge>,
}

impl TraversalPath {
    /// Number of edges.
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn last(&self) -> Option<&str> {
        self.vertices.last().map(String::as_str)
    }
}

/// One reported vertex: the node, the edge that reached it, and its path.
#[derive(Debug, Clone)]
pub struct Step {
    pub vertex: Node,
    /// `None` only for the start vertex.
    pub edge: Option<Edge>,
    pub path: TraversalPath,
}

impl Step {
    pub fn level(&self) -> usize {
        self.path.len()
    }
}

/// What the walk should do after a vertex is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visit {
    Continue,
    /// Keep the vertex but do not expand past it.
    Prune,
    Stop,
}

/// Outcome summary of a walk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkStats {
    pub reported: usize,
    pub expanded: usize,
    /// Set when some vertex sat at `max_level` and was not expanded; the
    /// result may be incomplete.
    pub hit_ceiling: bool,
    pub stopped: bool,
}

/// Arena cell: one vertex occurrence on one path.
struct Cell {
    vertex: String,
    edge: Option<Edge>,
    parent: Option<usize>,
    level: usize,
}

struct PathArena {
    cells: Vec<Cell>,
}

impl PathArena {
    fn push(&mut self, cell: Cell) -> usize {
        self.cells.push(cell);
        self.cells.len() - 1
    }

    /// True when `handle` already occurs on the path ending at `idx`.
    fn on_path(&self, mut idx: usize, handle: &str) -> bool {
        loop {
            let cell = &self.cells[idx];
            if cell.vertex == handle {
                return true;
            }
            match cell.parent {
                Some(parent) => idx = parent,
                None => return false,
            }
        }
    }

    fn path(&self, idx: usize) -> TraversalPath {
        let mut vertices = Vec::with_capacity(self.cells[idx].level + 1);
        let mut edges = Vec::with_capacity(self.cells[idx].level);
        let mut cursor = Some(idx);
        while let Some(i) = cursor {
            let cell = &self.cells[i];
            vertices.push(cell.vertex.clone());
            if let Some(edge) = &cell.edge {
                edges.push(edge.clone());
            }
            cursor = cell.parent;
        }
        vertices.reverse();
        edges.reverse();
        TraversalPath { vertices, edges }
    }
}

/// Walk and collect every reported step.
pub fn walk<S: GraphStore + ?Sized>(store: &S, spec: &WalkSpec<'_>) -> Result<Vec<Step>> {
    let mut steps = Vec::new();
    walk_with(store, spec, |step| {
        steps.push(step);
        Visit::Continue
    })?;
    Ok(steps)
}

/// Walk, handing each reported step to `visit`.
///
/// A missing start or root yields no steps. Store failures propagate unchanged.
pub fn walk_with<S, F>(store: &S, spec: &WalkSpec<'_>, mut visit: F) -> Result<WalkStats>
where
    S: GraphStore + ?Sized,
    F: FnMut(Step) -> Visit,
{
    if spec.min_level > spec.max_level {
        return Err(Error::InvalidLevels {
            min: spec.min_level,
            max: spec.max_level,
        });
    }

    let mut stats = WalkStats::default();
    if store.node(spec.root)?.is_none() {
        tracing::debug!(root = spec.root, "walk root not found");
        return Ok(stats);
    }
    let Some(start) = store.node(spec.start)? else {
        tracing::debug!(start = spec.start, "walk start not found");
        return Ok(stats);
    };

    let anchor = spec.direction.anchor();
    let reach = spec.direction.reach();

    let mut arena = PathArena { cells: Vec::new() };
    let first = arena.push(Cell {
        vertex: start.handle.clone(),
        edge: None,
        parent: None,
        level: 0,
    });
    let mut frontier: VecDeque<(usize, Node)> = VecDeque::new();
    frontier.push_back((first, start));

    while let Some((idx, node)) = match spec.order {
        WalkOrder::DepthFirst => frontier.pop_back(),
        WalkOrder::BreadthFirst => frontier.pop_front(),
    } {
        let level = arena.cells[idx].level;

        let mut expand = true;
        if level >= spec.min_level {
            let step = Step {
                vertex: node,
                edge: arena.cells[idx].edge.clone(),
                path: arena.path(idx),
            };
            stats.reported += 1;
            match visit(step) {
                Visit::Continue => {}
                Visit::Prune => expand = false,
                Visit::Stop => {
                    stats.stopped = true;
                    break;
                }
            }
        }
        if !expand {
            continue;
        }
        if level >= spec.max_level {
            stats.hit_ceiling = true;
            continue;
        }

        let handle = arena.cells[idx].vertex.clone();
        let filter = EdgeFilter {
            root: spec.root,
            predicates: spec.predicates,
            endpoint: anchor,
            handle: &handle,
        };
        let mut edges: Vec<Edge> = store
            .edges(&filter)?
            .into_iter()
            .filter(|e| filter.accepts(e))
            .collect();
        edges.sort();
        stats.expanded += 1;
        tracing::trace!(vertex = %handle, level, edges = edges.len(), "expanding");

        let mut children = Vec::with_capacity(edges.len());
        for edge in edges {
            let next = edge.endpoint(reach).to_string();
            if arena.on_path(idx, &next) {
                continue;
            }
            let Some(next_node) = store.node(&next)? else {
                tracing::trace!(vertex = %next, "skipping dangling edge endpoint");
                continue;
            };
            let child = arena.push(Cell {
                vertex: next,
                edge: Some(edge),
                parent: Some(idx),
                level: level + 1,
            });
            children.push((child, next_node));
        }
        match spec.order {
            // Reverse so the first child is popped first.
            WalkOrder::DepthFirst => frontier.extend(children.into_iter().rev()),
            WalkOrder::BreadthFirst => frontier.extend(children),
        }
    }

    if stats.hit_ceiling {
        tracing::debug!(
            start = spec.start,
            root = spec.root,
            max_level = spec.max_level,
            "walk reached its level ceiling; result may be incomplete"
        );
    }
    Ok(stats)
}
