//! Navigation over controlled-vocabulary overlay graphs.
//!
//! Provides the bounded traversal primitive ([`walk`]), hierarchy flattening and
//! tree construction, path search, preferred-term canonicalization, and batch
//! resolution, all as methods on [`engine::Navigator`].

pub mod batch;
pub mod engine;
pub mod format;
pub mod paths;
pub mod preferred;
pub mod tree;
pub mod walk;

pub use engine::{Limits, Navigator};
