//! Graph data model and structural reconciliation
//!
//! [`GraphData`] is what the note store hands over: ids, categories and
//! links. [`Graph`] is the engine's authoritative node/edge arrays. A
//! structural update reconciles the two, keeping position and velocity for
//! every retained id.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::path::Path;

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::LayoutConfig;
use crate::error::LayoutResult;

/// Opaque, externally assigned node identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    /// Create an id from anything string-like
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for NodeId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Node category, used for display radius and styling
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// A note that exists in the store
    #[default]
    Primary,
    /// A secondary node (e.g. a tag or an unresolved link target)
    Secondary,
}

impl Category {
    /// Display radius for this category under the given config
    pub fn display_radius(self, config: &LayoutConfig) -> f32 {
        match self {
            Category::Primary => config.primary_radius,
            Category::Secondary => config.secondary_radius,
        }
    }
}

/// A node as supplied by a structural update
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeSpec {
    /// Stable identifier
    pub id: NodeId,
    /// Category; defaults to primary
    #[serde(default)]
    pub category: Category,
}

impl NodeSpec {
    /// Create a node spec
    pub fn new(id: impl Into<NodeId>, category: Category) -> Self {
        Self {
            id: id.into(),
            category,
        }
    }
}

/// An undirected link as supplied by a structural update
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeSpec {
    /// One endpoint
    pub source: NodeId,
    /// The other endpoint
    pub target: NodeId,
}

impl EdgeSpec {
    /// Create an edge spec
    pub fn new(source: impl Into<NodeId>, target: impl Into<NodeId>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }
}

/// Complete structural description of a graph
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphData {
    /// All nodes
    pub nodes: Vec<NodeSpec>,
    /// All links
    #[serde(default)]
    pub edges: Vec<EdgeSpec>,
}

impl GraphData {
    /// Parse graph data from a JSON string
    pub fn from_json_str(json: &str) -> LayoutResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read graph data from a JSON file
    pub fn from_json_file(path: &Path) -> LayoutResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }
}

/// A simulated node
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// Stable identifier
    pub id: NodeId,
    /// World-space position
    pub position: Vec2,
    /// World-space velocity per tick
    pub velocity: Vec2,
    /// Position is controlled externally (dragging); integration skips it
    pub pinned: bool,
    /// Radius used for picking and rendering
    pub display_radius: f32,
    /// Category from the last structural update
    pub category: Category,
}

/// A deduplicated, undirected edge between two node indices (`source < target`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Edge {
    /// Lower node index
    pub source: usize,
    /// Higher node index
    pub target: usize,
}

/// Summary of a structural update
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
    /// Nodes seen for the first time
    pub added: usize,
    /// Nodes no longer listed
    pub removed: usize,
    /// Nodes kept with their position and velocity
    pub retained: usize,
    /// Edges dropped because an endpoint is unknown
    pub dangling_edges: usize,
    /// Edges collapsed into an existing edge
    pub duplicate_edges: usize,
    /// Edges dropped because both endpoints are the same node
    pub self_loops: usize,
}

/// Authoritative node and edge arrays
#[derive(Debug, Default)]
pub struct Graph {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    index: HashMap<NodeId, usize>,
}

impl Graph {
    /// Create an empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// All nodes, in structural-update order
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub(crate) fn nodes_mut(&mut self) -> &mut [Node] {
        &mut self.nodes
    }

    /// All deduplicated edges
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Number of nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the graph has no nodes
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Index of a node by id
    pub fn index_of(&self, id: &NodeId) -> Option<usize> {
        self.index.get(id).copied()
    }

    /// Node by id
    pub fn node(&self, id: &NodeId) -> Option<&Node> {
        self.index_of(id).map(|i| &self.nodes[i])
    }

    /// Whether any node is currently pinned
    pub fn any_pinned(&self) -> bool {
        self.nodes.iter().any(|n| n.pinned)
    }

    /// Replace the structure with `nodes`/`edges`
    ///
    /// Retained ids keep position, velocity and pin state. New ids spawn at a
    /// random point within `spawn_radius` of `center`. Duplicate node ids are
    /// resolved last-write-wins; dangling edges, self-loops and duplicate
    /// edges are dropped and counted.
    pub fn reconcile<R: Rng>(
        &mut self,
        nodes: &[NodeSpec],
        edges: &[EdgeSpec],
        config: &LayoutConfig,
        rng: &mut R,
    ) -> ReconcileReport {
        let mut report = ReconcileReport::default();

        // First appearance fixes the order, last appearance fixes the category.
        let mut order: Vec<(&NodeId, Category)> = Vec::with_capacity(nodes.len());
        let mut slot_of: HashMap<&NodeId, usize> = HashMap::with_capacity(nodes.len());
        for spec in nodes {
            match slot_of.get(&spec.id) {
                Some(&slot) => order[slot].1 = spec.category,
                None => {
                    slot_of.insert(&spec.id, order.len());
                    order.push((&spec.id, spec.category));
                }
            }
        }

        let mut previous: Vec<Option<Node>> =
            std::mem::take(&mut self.nodes).into_iter().map(Some).collect();
        let previous_index = std::mem::take(&mut self.index);

        let mut next = Vec::with_capacity(order.len());
        for (id, category) in order {
            let retained = previous_index
                .get(id)
                .and_then(|&i| previous.get_mut(i))
                .and_then(Option::take);

            let node = match retained {
                Some(mut node) => {
                    report.retained += 1;
                    node.category = category;
                    node.display_radius = category.display_radius(config);
                    node
                }
                None => {
                    report.added += 1;
                    Node {
                        id: id.clone(),
                        position: spawn_position(config, rng),
                        velocity: Vec2::ZERO,
                        pinned: false,
                        display_radius: category.display_radius(config),
                        category,
                    }
                }
            };
            next.push(node);
        }
        report.removed = previous.iter().filter(|n| n.is_some()).count();

        self.index = next
            .iter()
            .enumerate()
            .map(|(i, n)| (n.id.clone(), i))
            .collect();
        self.nodes = next;

        let mut seen = HashSet::with_capacity(edges.len());
        let next_edges: Vec<Edge> = edges
            .iter()
            .filter_map(|e| {
                let (Some(a), Some(b)) = (self.index_of(&e.source), self.index_of(&e.target))
                else {
                    report.dangling_edges += 1;
                    return None;
                };
                if a == b {
                    report.self_loops += 1;
                    return None;
                }
                let edge = Edge {
                    source: a.min(b),
                    target: a.max(b),
                };
                if !seen.insert(edge) {
                    report.duplicate_edges += 1;
                    return None;
                }
                Some(edge)
            })
            .collect();
        self.edges = next_edges;

        debug!(
            added = report.added,
            removed = report.removed,
            retained = report.retained,
            edges = self.edges.len(),
            "reconciled graph structure"
        );
        if report.dangling_edges > 0 {
            debug!(count = report.dangling_edges, "dropped dangling edges");
        }

        report
    }
}

// Sampled on the unit square and scaled, so `-r..=r` never has to span more than f32::MAX
fn spawn_position<R: Rng>(config: &LayoutConfig, rng: &mut R) -> Vec2 {
    let unit = Vec2::new(rng.gen_range(-1.0..=1.0), rng.gen_range(-1.0..=1.0));
    config.center + unit * config.spawn_radius
}
