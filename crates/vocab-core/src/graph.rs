//! Graph data model for controlled-vocabulary overlay graphs.

use crate::error::Error;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::str::FromStr;

/// Separator placed between namespace and local identifier in a global identifier.
pub const NAMESPACE_SEPARATOR: &str = "_";

/// A vocabulary store: terms (nodes) and typed, root-tagged relationships (edges).
///
/// Many enumeration hierarchies share one physical edge list; each edge names the
/// hierarchy roots it participates in (see [`Edge::roots`]).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VocabGraph {
    pub version: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub metadata: GraphMetadata,
    /// Terms keyed by handle.
    pub nodes: BTreeMap<String, Node>,
    pub edges: Vec<Edge>,
    /// Performance index: node handle → indices into `edges` (either endpoint).
    /// Rebuilt on load and after edge mutations via `rebuild_indexes()`.
    #[serde(skip)]
    pub edge_index: HashMap<String, Vec<usize>>,
    /// Performance index: code field → code value → node handles.
    #[serde(skip)]
    pub code_index: HashMap<CodeField, BTreeMap<String, Vec<String>>>,
}

/// Aggregate statistics for the store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphMetadata {
    pub total_nodes: usize,
    pub total_edges: usize,
    pub functional_edges: usize,
    pub structural_edges: usize,
    /// Number of distinct hierarchy roots referenced by edges.
    pub roots: usize,
}

/// A vocabulary term.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Collection-qualified key, e.g. `terms/iso_639_3_eng`.
    pub handle: String,
    pub code: CodeSection,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Free-form descriptor values; opaque to the engine.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub descriptors: BTreeMap<String, serde_json::Value>,
}

impl Node {
    pub fn new(handle: impl Into<String>, code: CodeSection) -> Self {
        Self {
            handle: handle.into(),
            code,
            label: None,
            descriptors: BTreeMap::new(),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

/// Identification codes of a term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeSection {
    /// Namespace identifier.
    #[serde(rename = "_nid", default, skip_serializing_if = "Option::is_none")]
    pub nid: Option<String>,
    /// Local identifier, unique within the namespace.
    #[serde(rename = "_lid")]
    pub lid: String,
    /// Global identifier: `nid` + separator + `lid`, or `lid` without a namespace.
    #[serde(rename = "_gid", default)]
    pub gid: String,
    /// Official aliases; always contains `lid`.
    #[serde(rename = "_aid", default)]
    pub aid: Vec<String>,
    /// Provider-specific codes.
    #[serde(rename = "_pid", default, skip_serializing_if = "Vec::is_empty")]
    pub pid: Vec<String>,
}

impl CodeSection {
    pub fn new(nid: Option<&str>, lid: impl Into<String>) -> Self {
        let mut code = Self {
            nid: nid.map(str::to_string),
            lid: lid.into(),
            gid: String::new(),
            aid: Vec::new(),
            pid: Vec::new(),
        };
        code.normalize();
        code
    }

    pub fn with_aliases<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.aid.extend(aliases.into_iter().map(Into::into));
        self.normalize();
        self
    }

    pub fn with_provider_codes<I, S>(mut self, codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.pid.extend(codes.into_iter().map(Into::into));
        self.pid.sort();
        self.pid.dedup();
        self
    }

    /// Re-derive `gid` and make sure `aid` contains `lid`.
    pub fn normalize(&mut self) {
        self.gid = match &self.nid {
            Some(nid) if !nid.is_empty() => format!("{}{}{}", nid, NAMESPACE_SEPARATOR, self.lid),
            _ => self.lid.clone(),
        };
        if !self.aid.contains(&self.lid) {
            self.aid.push(self.lid.clone());
        }
        self.aid.sort();
        self.aid.dedup();
    }

    /// All values stored under `field`.
    pub fn values(&self, field: CodeField) -> Vec<&str> {
        match field {
            CodeField::Lid => vec![self.lid.as_str()],
            CodeField::Gid => vec![self.gid.as_str()],
            CodeField::Nid => self.nid.as_deref().into_iter().collect(),
            CodeField::Aid => self.aid.iter().map(String::as_str).collect(),
            CodeField::Pid => self.pid.iter().map(String::as_str).collect(),
        }
    }

    /// Membership for multi-valued fields, equality otherwise.
    pub fn matches(&self, field: CodeField, code: &str) -> bool {
        self.values(field).contains(&code)
    }
}

/// A directed, typed relationship tagged with the hierarchies it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Edge {
    pub from: String,
    pub to: String,
    pub predicate: Predicate,
    /// Root-membership set: the hierarchy roots this edge is visible under.
    #[serde(default)]
    pub roots: BTreeSet<String>,
}

impl Edge {
    pub fn new<I, S>(
        from: impl Into<String>,
        to: impl Into<String>,
        predicate: Predicate,
        roots: I,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            from: from.into(),
            to: to.into(),
            predicate,
            roots: roots.into_iter().map(Into::into).collect(),
        }
    }

    pub fn endpoint(&self, endpoint: Endpoint) -> &str {
        match endpoint {
            Endpoint::From => &self.from,
            Endpoint::To => &self.to,
        }
    }

    pub fn is_member_of(&self, root: &str) -> bool {
        self.roots.contains(root)
    }
}

/// Relationship type vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Predicate {
    /// Enumeration element → enumeration.
    #[serde(rename = "_predicate_enum-of")]
    EnumOf,
    /// Field → structure.
    #[serde(rename = "_predicate_field-of")]
    FieldOf,
    /// Property → object.
    #[serde(rename = "_predicate_property-of")]
    PropertyOf,
    /// Grouping section; not a hierarchy level.
    #[serde(rename = "_predicate_section-of")]
    SectionOf,
    /// Alias bridge to a preferred term.
    #[serde(rename = "_predicate_bridge-of")]
    BridgeOf,
}

/// Whether a relationship type carries hierarchy semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PredicateCategory {
    Functional,
    Structural,
}

impl fmt::Display for PredicateCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Functional => f.write_str("functional"),
            Self::Structural => f.write_str("structural"),
        }
    }
}

impl Predicate {
    pub const ALL: [Predicate; 5] = [
        Self::EnumOf,
        Self::FieldOf,
        Self::PropertyOf,
        Self::SectionOf,
        Self::BridgeOf,
    ];

    /// Structural types used when a request does not name its own.
    pub const DEFAULT_STRUCTURAL: [Predicate; 2] = [Self::SectionOf, Self::BridgeOf];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::EnumOf => "_predicate_enum-of",
            Self::FieldOf => "_predicate_field-of",
            Self::PropertyOf => "_predicate_property-of",
            Self::SectionOf => "_predicate_section-of",
            Self::BridgeOf => "_predicate_bridge-of",
        }
    }

    pub fn category(self) -> PredicateCategory {
        match self {
            Self::EnumOf | Self::FieldOf | Self::PropertyOf => PredicateCategory::Functional,
            Self::SectionOf | Self::BridgeOf => PredicateCategory::Structural,
        }
    }

    pub fn is_functional(self) -> bool {
        self.category() == PredicateCategory::Functional
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Predicate {
    type Err = Error;

    /// Accepts the wire name (`_predicate_enum-of`) or its suffix (`enum-of`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        let short = name.strip_prefix("_predicate_").unwrap_or(name);
        Self::ALL
            .into_iter()
            .find(|p| p.as_str().strip_prefix("_predicate_") == Some(short))
            .ok_or_else(|| Error::invalid("relationship type", s))
    }
}

/// One side of an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    From,
    To,
}

impl Endpoint {
    pub fn opposite(self) -> Self {
        match self {
            Self::From => Self::To,
            Self::To => Self::From,
        }
    }
}

/// Traversal direction, chosen per request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Follow edges whose `from` is the current vertex, reaching their `to`.
    Downstream,
    /// Follow edges whose `to` is the current vertex, reaching their `from`.
    Upstream,
}

impl Direction {
    /// Map the ascending/descending relationship flag to a walk direction.
    ///
    /// Ascending relationships point child → parent, so walking away from a
    /// root follows inbound edges.
    pub fn from_ascending(ascending: bool) -> Self {
        if ascending {
            Self::Upstream
        } else {
            Self::Downstream
        }
    }

    /// Endpoint the current vertex occupies on an expanded edge.
    pub fn anchor(self) -> Endpoint {
        match self {
            Self::Downstream => Endpoint::From,
            Self::Upstream => Endpoint::To,
        }
    }

    /// Endpoint reached by following an edge.
    pub fn reach(self) -> Endpoint {
        self.anchor().opposite()
    }

    pub fn reversed(self) -> Self {
        match self {
            Self::Downstream => Self::Upstream,
            Self::Upstream => Self::Downstream,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Downstream => f.write_str("downstream"),
            Self::Upstream => f.write_str("upstream"),
        }
    }
}

impl FromStr for Direction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "down" | "downstream" | "outbound" | "descending" => Ok(Self::Downstream),
            "up" | "upstream" | "inbound" | "ascending" => Ok(Self::Upstream),
            _ => Err(Error::invalid("direction", s)),
        }
    }
}

/// Indexed code-section fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CodeField {
    #[serde(rename = "_lid")]
    Lid,
    #[serde(rename = "_gid")]
    Gid,
    #[serde(rename = "_aid")]
    Aid,
    #[serde(rename = "_pid")]
    Pid,
    #[serde(rename = "_nid")]
    Nid,
}

impl CodeField {
    pub const ALL: [CodeField; 5] = [Self::Lid, Self::Gid, Self::Aid, Self::Pid, Self::Nid];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Lid => "_lid",
            Self::Gid => "_gid",
            Self::Aid => "_aid",
            Self::Pid => "_pid",
            Self::Nid => "_nid",
        }
    }

    pub fn is_multi_valued(self) -> bool {
        matches!(self, Self::Aid | Self::Pid)
    }
}

impl fmt::Display for CodeField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CodeField {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().trim_start_matches('_') {
            "lid" | "local" => Ok(Self::Lid),
            "gid" | "global" => Ok(Self::Gid),
            "aid" | "aliases" => Ok(Self::Aid),
            "pid" | "provider" => Ok(Self::Pid),
            "nid" | "namespace" => Ok(Self::Nid),
            _ => Err(Error::invalid("code field", s)),
        }
    }
}

impl VocabGraph {
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            version: crate::schema::CURRENT_VERSION.to_string(),
            created_at: now,
            updated_at: now,
            metadata: GraphMetadata::default(),
            nodes: BTreeMap::new(),
            edges: Vec::new(),
            edge_index: HashMap::new(),
            code_index: HashMap::new(),
        }
    }

    /// Recompute metadata from current state and rebuild performance indexes.
    pub fn refresh_metadata(&mut self) {
        self.metadata.total_nodes = self.nodes.len();
        self.metadata.total_edges = self.edges.len();
        self.metadata.functional_edges = self
            .edges
            .iter()
            .filter(|e| e.predicate.is_functional())
            .count();
        self.metadata.structural_edges = self.metadata.total_edges - self.metadata.functional_edges;
        self.metadata.roots = self
            .edges
            .iter()
            .flat_map(|e| e.roots.iter())
            .collect::<BTreeSet<_>>()
            .len();
        self.updated_at = Utc::now();
        self.rebuild_indexes();
    }

    /// Rebuild the endpoint and code indexes.
    /// Call after bulk mutations of `nodes` or `edges`.
    pub fn rebuild_indexes(&mut self) {
        self.edge_index.clear();
        for (i, edge) in self.edges.iter().enumerate() {
            self.edge_index.entry(edge.from.clone()).or_default().push(i);
            if edge.to != edge.from {
                self.edge_index.entry(edge.to.clone()).or_default().push(i);
            }
        }

        self.code_index.clear();
        for (handle, node) in &self.nodes {
            for field in CodeField::ALL {
                for value in node.code.values(field) {
                    self.code_index
                        .entry(field)
                        .or_default()
                        .entry(value.to_string())
                        .or_default()
                        .push(handle.clone());
                }
            }
        }
    }

    /// Insert or replace a node. The code section is normalized on the way in.
    pub fn insert_node(&mut self, mut node: Node) {
        node.code.normalize();
        if let Some(previous) = self.nodes.remove(&node.handle) {
            self.unindex_codes(&previous);
        }
        for field in CodeField::ALL {
            for value in node.code.values(field) {
                self.code_index
                    .entry(field)
                    .or_default()
                    .entry(value.to_string())
                    .or_default()
                    .push(node.handle.clone());
            }
        }
        self.nodes.insert(node.handle.clone(), node);
    }

    fn unindex_codes(&mut self, node: &Node) {
        for field in CodeField::ALL {
            let Some(values) = self.code_index.get_mut(&field) else {
                continue;
            };
            for value in node.code.values(field) {
                if let Some(handles) = values.get_mut(value) {
                    handles.retain(|h| h != &node.handle);
                    if handles.is_empty() {
                        values.remove(value);
                    }
                }
            }
        }
    }

    /// Append an edge. Identical edges are merged by unioning their root sets.
    pub fn insert_edge(&mut self, edge: Edge) {
        if let Some(existing) = self.edges.iter_mut().find(|e| {
            e.from == edge.from && e.to == edge.to && e.predicate == edge.predicate
        }) {
            existing.roots.extend(edge.roots);
            return;
        }
        let i = self.edges.len();
        self.edge_index.entry(edge.from.clone()).or_default().push(i);
        if edge.to != edge.from {
            self.edge_index.entry(edge.to.clone()).or_default().push(i);
        }
        self.edges.push(edge);
    }

    /// Remove a node and every edge touching it.
    pub fn remove_node(&mut self, handle: &str) -> Option<Node> {
        let node = self.nodes.remove(handle)?;
        self.unindex_codes(&node);
        let before = self.edges.len();
        self.edges.retain(|e| e.from != handle && e.to != handle);
        if self.edges.len() != before {
            self.rebuild_indexes();
        }
        Some(node)
    }

    pub fn get_node(&self, handle: &str) -> Option<&Node> {
        self.nodes.get(handle)
    }

    /// Edges with `handle` at either endpoint.
    pub fn edges_for(&self, handle: &str) -> Vec<&Edge> {
        if self.edge_index.is_empty() && !self.edges.is_empty() {
            // Index not built: scan
            return self
                .edges
                .iter()
                .filter(|e| e.from == handle || e.to == handle)
                .collect();
        }
        self.edge_index
            .get(handle)
            .map(|indices| indices.iter().filter_map(|&i| self.edges.get(i)).collect())
            .unwrap_or_default()
    }

    /// Distinct root handles referenced by any edge.
    pub fn roots(&self) -> BTreeSet<&str> {
        self.edges
            .iter()
            .flat_map(|e| e.roots.iter().map(String::as_str))
            .collect()
    }

    /// Check referential integrity. Returns one message per problem found.
    pub fn validate(&self) -> Vec<String> {
        let mut problems = Vec::new();
        let mut seen = BTreeSet::new();
        for edge in &self.edges {
            for handle in [&edge.from, &edge.to] {
                if !self.nodes.contains_key(handle) {
                    problems.push(format!(
                        "dangling edge endpoint {} ({} -> {}, {})",
                        handle, edge.from, edge.to, edge.predicate
                    ));
                }
            }
            if edge.roots.is_empty() {
                problems.push(format!(
                    "edge {} -> {} ({}) belongs to no hierarchy",
                    edge.from, edge.to, edge.predicate
                ));
            }
            if !seen.insert((&edge.from, &edge.to, edge.predicate)) {
                problems.push(format!(
                    "duplicate edge {} -> {} ({})",
                    edge.from, edge.to, edge.predicate
                ));
            }
        }
        for root in self.roots() {
            if !self.nodes.contains_key(root) {
                problems.push(format!("root {} is not a node", root));
            }
        }
        problems
    }
}

impl Default for VocabGraph {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_section_derives_gid_and_aliases() {
        let code = CodeSection::new(Some("iso_639_3"), "eng");
        assert_eq!(code.gid, "iso_639_3_eng");
        assert_eq!(code.aid, vec!["eng"]);

        let bare = CodeSection::new(None, "langs");
        assert_eq!(bare.gid, "langs");
    }

    #[test]
    fn test_code_section_matches_multi_valued() {
        let code = CodeSection::new(None, "it")
            .with_aliases(["ita", "it"])
            .with_provider_codes(["ITA-1"]);
        assert_eq!(code.aid, vec!["it", "ita"]);
        assert!(code.matches(CodeField::Aid, "ita"));
        assert!(code.matches(CodeField::Pid, "ITA-1"));
        assert!(!code.matches(CodeField::Lid, "ita"));
        assert!(!code.matches(CodeField::Nid, "it"));
    }

    #[test]
    fn test_predicate_parse() {
        assert_eq!(
            "_predicate_enum-of".parse::<Predicate>().unwrap(),
            Predicate::EnumOf
        );
        assert_eq!("bridge-of".parse::<Predicate>().unwrap(), Predicate::BridgeOf);
        assert!(matches!(
            "_predicate_unknown".parse::<Predicate>(),
            Err(Error::InvalidFilter { .. })
        ));
    }

    #[test]
    fn test_predicate_serde_uses_wire_names() {
        let json = serde_json::to_string(&Predicate::SectionOf).unwrap();
        assert_eq!(json, "\"_predicate_section-of\"");
    }

    #[test]
    fn test_direction_endpoints() {
        assert_eq!(Direction::Downstream.anchor(), Endpoint::From);
        assert_eq!(Direction::Downstream.reach(), Endpoint::To);
        assert_eq!(Direction::Upstream.anchor(), Endpoint::To);
        assert_eq!(Direction::Upstream.reversed(), Direction::Downstream);
        assert_eq!(Direction::from_ascending(true), Direction::Upstream);
    }

    #[test]
    fn test_code_field_parse() {
        assert_eq!("_lid".parse::<CodeField>().unwrap(), CodeField::Lid);
        assert_eq!("aid".parse::<CodeField>().unwrap(), CodeField::Aid);
        assert!("_title".parse::<CodeField>().is_err());
    }

    #[test]
    fn test_insert_edge_merges_roots() {
        let mut graph = VocabGraph::new();
        graph.insert_edge(Edge::new("a", "b", Predicate::EnumOf, ["r1"]));
        graph.insert_edge(Edge::new("a", "b", Predicate::EnumOf, ["r2"]));
        assert_eq!(graph.edges.len(), 1);
        assert_eq!(graph.edges[0].roots.len(), 2);
        assert_eq!(graph.edges_for("b").len(), 1);
    }

    #[test]
    fn test_edges_for_uses_index_once_built() {
        let mut graph = VocabGraph::new();
        graph.edges.push(Edge::new("a", "b", Predicate::EnumOf, ["r"]));
        // Unindexed edges are still found by scanning.
        assert_eq!(graph.edges_for("a").len(), 1);

        graph.rebuild_indexes();
        assert_eq!(graph.edges_for("b").len(), 1);
        assert!(graph.edges_for("missing").is_empty());

        // Lookups for unknown handles go through the index, not the edge list.
        graph.edges.push(Edge::new("c", "d", Predicate::EnumOf, ["r"]));
        assert!(graph.edges_for("c").is_empty());
    }
}
