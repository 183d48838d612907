//! Entry point binding a store to traversal limits.

use crate::walk::{WalkOrder, WalkSpec};
use rayon::prelude::*;
use std::collections::BTreeMap;
use vocab_core::config::VocabConfig;
use vocab_core::error::Result;
use vocab_core::hierarchy::{Hierarchy, PredicateSet};
use vocab_core::store::GraphStore;

/// Level ceilings and batch behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    pub max_level: usize,
    pub flatten_max_level: usize,
    pub parallel_batches: bool,
}

impl Default for Limits {
    fn default() -> Self {
        Self::from(&VocabConfig::default())
    }
}

impl From<&VocabConfig> for Limits {
    fn from(config: &VocabConfig) -> Self {
        Self {
            max_level: config.traversal.max_level,
            flatten_max_level: config.traversal.flatten_max_level,
            parallel_batches: config.resolution.parallel_batches,
        }
    }
}

/// Read-only query engine over a [`GraphStore`].
///
/// Holds no mutable state; one instance may serve any number of threads.
pub struct Navigator<'s, S: GraphStore + ?Sized> {
    pub(crate) store: &'s S,
    pub(crate) limits: Limits,
}

impl<'s, S: GraphStore + ?Sized> Navigator<'s, S> {
    pub fn new(store: &'s S) -> Self {
        Self::with_limits(store, Limits::default())
    }

    pub fn with_limits(store: &'s S, limits: Limits) -> Self {
        Self { store, limits }
    }

    pub fn store(&self) -> &'s S {
        self.store
    }

    pub fn limits(&self) -> Limits {
        self.limits
    }

    /// Walk spec rooted at `hierarchy.root` in the hierarchy's own direction.
    pub(crate) fn spec_from_root<'a>(
        &self,
        hierarchy: &'a Hierarchy,
        predicates: &'a PredicateSet,
        max_level: usize,
    ) -> WalkSpec<'a> {
        WalkSpec {
            start: &hierarchy.root,
            direction: hierarchy.direction,
            predicates,
            root: &hierarchy.root,
            min_level: 1,
            max_level,
            order: WalkOrder::BreadthFirst,
        }
    }

    /// Apply `f` to every key, on the rayon pool when batches run in parallel.
    /// Output is keyed and ordered by input key; duplicates collapse.
    pub(crate) fn fan_out<K, V, F>(&self, keys: &[K], f: F) -> Result<BTreeMap<K, V>>
    where
        K: Ord + Clone + Send + Sync,
        V: Send,
        F: Fn(&K) -> Result<V> + Send + Sync,
    {
        if self.limits.parallel_batches && keys.len() > 1 {
            keys.par_iter()
                .map(|k| f(k).map(|v| (k.clone(), v)))
                .collect()
        } else {
            keys.iter().map(|k| f(k).map(|v| (k.clone(), v))).collect()
        }
    }
}
