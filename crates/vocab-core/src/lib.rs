//! Core types and storage for controlled-vocabulary overlay graphs.
//!
//! Provides the data model ([`graph::VocabGraph`], [`graph::Node`], [`graph::Edge`]),
//! the read-only store contract the engine walks ([`store::GraphStore`]), request
//! scoping ([`hierarchy::Hierarchy`]), JSON persistence, and configuration.

pub mod config;
pub mod error;
pub mod graph;
pub mod hierarchy;
pub mod schema;
pub mod storage;
pub mod store;
