//! GraphEngine - Core airport graph structure.
//!
//! The GraphEngine stores the route topology using petgraph's StableGraph
//! and maintains SoA (Structure of Arrays) buffers for simulation positions,
//! velocities and fixed positions so the force simulation can sweep them
//! without chasing pointers.

use petgraph::stable_graph::{NodeIndex, StableGraph};
use petgraph::visit::{EdgeRef, IntoEdgeReferences};
use petgraph::{Directed, Direction};
use std::collections::HashMap;

use super::edge::EdgeId;
use super::node::{Airport, NodeId};
use crate::data::{AirportGraphData, NodeRef};
use crate::error::AtlasError;

/// Mutable views of the per-node simulation buffers.
pub(crate) struct NodeBuffers<'a> {
    pub pos_x: &'a mut [f32],
    pub pos_y: &'a mut [f32],
    pub vel_x: &'a mut [f32],
    pub vel_y: &'a mut [f32],
    pub fixed: &'a [Option<[f32; 2]>],
}

/// The core graph engine.
///
/// This struct manages:
/// - Route topology via petgraph
/// - Airport metadata per node
/// - Position/velocity buffers in SoA layout
/// - Fixed positions for pinned (dragged) nodes
/// - Lookup from resource keys to stable IDs
pub struct GraphEngine {
    /// The underlying graph structure.
    /// Nodes store their stable NodeId, edges store their stable EdgeId.
    /// Nothing is ever removed, so a NodeId's slot is its petgraph index.
    graph: StableGraph<NodeId, EdgeId, Directed>,

    /// Map from the resource's `id` field to NodeId
    key_to_id: HashMap<String, NodeId>,

    /// Airport metadata, indexed by slot
    airports: Vec<Airport>,

    /// X positions (SoA layout); NaN until the simulation places the node
    pos_x: Vec<f32>,

    /// Y positions (SoA layout)
    pos_y: Vec<f32>,

    /// X velocities (SoA layout)
    vel_x: Vec<f32>,

    /// Y velocities (SoA layout)
    vel_y: Vec<f32>,

    /// Fixed positions (fx, fy) of pinned nodes
    fixed: Vec<Option<[f32; 2]>>,
}

impl GraphEngine {
    /// Create a new empty graph engine.
    pub fn new() -> Self {
        Self::with_capacity(0, 0)
    }

    /// Create a graph engine with pre-allocated capacity.
    pub fn with_capacity(node_capacity: usize, edge_capacity: usize) -> Self {
        Self {
            graph: StableGraph::with_capacity(node_capacity, edge_capacity),
            key_to_id: HashMap::new(),
            airports: Vec::with_capacity(node_capacity),
            pos_x: Vec::with_capacity(node_capacity),
            pos_y: Vec::with_capacity(node_capacity),
            vel_x: Vec::with_capacity(node_capacity),
            vel_y: Vec::with_capacity(node_capacity),
            fixed: Vec::with_capacity(node_capacity),
        }
    }

    /// Build the graph from the airport resource.
    ///
    /// Every link endpoint must resolve to an airport.
    pub fn from_data(data: &AirportGraphData) -> Result<Self, AtlasError> {
        let mut engine = Self::with_capacity(data.nodes.len(), data.links.len());

        for record in &data.nodes {
            engine.add_airport(Airport::from(record));
        }

        for (index, link) in data.links.iter().enumerate() {
            let resolve = |reference: &NodeRef| {
                engine
                    .resolve(reference)
                    .ok_or_else(|| AtlasError::UnresolvedLink {
                        index,
                        reference: reference.to_string(),
                    })
            };
            let source = resolve(&link.source)?;
            let target = resolve(&link.target)?;
            engine.add_edge(source, target);
        }

        Ok(engine)
    }

    // =========================================================================
    // Node Operations
    // =========================================================================

    /// Add an airport. Its position stays unset (NaN) until the simulation
    /// places it.
    pub fn add_airport(&mut self, airport: Airport) -> NodeId {
        let id = NodeId(self.airports.len() as u32);

        self.graph.add_node(id);
        if let Some(key) = &airport.key {
            self.key_to_id.insert(key.clone(), id);
        }

        self.airports.push(airport);
        self.pos_x.push(f32::NAN);
        self.pos_y.push(f32::NAN);
        self.vel_x.push(0.0);
        self.vel_y.push(0.0);
        self.fixed.push(None);

        id
    }

    /// Graph index of a node, if it exists.
    fn index(&self, id: NodeId) -> Option<NodeIndex> {
        (id.slot() < self.airports.len()).then_some(NodeIndex::new(id.slot()))
    }

    /// Resolve a resource reference to a node.
    pub fn resolve(&self, reference: &NodeRef) -> Option<NodeId> {
        match reference {
            NodeRef::Index(i) if *i < self.airports.len() => Some(NodeId(*i as u32)),
            NodeRef::Index(_) => None,
            NodeRef::Key(key) => self.key_to_id.get(key).copied(),
        }
    }

    /// Get the number of nodes.
    pub fn node_count(&self) -> u32 {
        self.graph.node_count() as u32
    }

    /// Iterate over node IDs in slot order.
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.airports.len() as u32).map(NodeId)
    }

    /// Get a node's airport metadata.
    pub fn airport(&self, id: NodeId) -> Option<&Airport> {
        self.airports.get(id.slot())
    }

    /// Largest passenger count across all airports (0 when empty).
    pub fn max_passengers(&self) -> f64 {
        self.airports
            .iter()
            .map(|a| a.passengers)
            .fold(0.0, f64::max)
    }

    /// Get a node's position.
    pub fn get_node_position(&self, id: NodeId) -> Option<(f32, f32)> {
        let i = id.slot();
        Some((*self.pos_x.get(i)?, *self.pos_y.get(i)?))
    }

    /// Set a node's position.
    pub fn set_node_position(&mut self, id: NodeId, x: f32, y: f32) {
        let i = id.slot();
        if i < self.airports.len() {
            self.pos_x[i] = x;
            self.pos_y[i] = y;
        }
    }

    /// Get a node's velocity.
    pub fn get_node_velocity(&self, id: NodeId) -> Option<(f32, f32)> {
        let i = id.slot();
        Some((*self.vel_x.get(i)?, *self.vel_y.get(i)?))
    }

    /// Pin a node at `(fx, fy)`; the simulation holds it there.
    pub fn fix_node(&mut self, id: NodeId, fx: f32, fy: f32) {
        if let Some(fixed) = self.fixed.get_mut(id.slot()) {
            *fixed = Some([fx, fy]);
        }
    }

    /// Release a pinned node back to the simulation.
    pub fn release_node(&mut self, id: NodeId) {
        if let Some(fixed) = self.fixed.get_mut(id.slot()) {
            *fixed = None;
        }
    }

    /// Check if a node is pinned.
    pub fn is_node_pinned(&self, id: NodeId) -> bool {
        self.fixed.get(id.slot()).is_some_and(Option::is_some)
    }

    // =========================================================================
    // Edge Operations
    // =========================================================================

    /// Add an edge between two nodes.
    pub fn add_edge(&mut self, source: NodeId, target: NodeId) -> Option<EdgeId> {
        let source_index = self.index(source)?;
        let target_index = self.index(target)?;

        let id = EdgeId(self.graph.edge_count() as u32);
        self.graph.add_edge(source_index, target_index, id);

        Some(id)
    }

    /// Get the number of edges.
    pub fn edge_count(&self) -> u32 {
        self.graph.edge_count() as u32
    }

    /// All edges as `(id, source, target)` in ID order.
    pub fn edges(&self) -> Vec<(EdgeId, NodeId, NodeId)> {
        let mut edges: Vec<_> = self
            .graph
            .edge_references()
            .map(|e| (*e.weight(), self.graph[e.source()], self.graph[e.target()]))
            .collect();
        edges.sort_unstable_by_key(|&(id, _, _)| id);
        edges
    }

    /// Number of edge endpoints at a node (a self-loop counts twice).
    pub fn degree(&self, id: NodeId) -> usize {
        self.index(id)
            .map(|index| {
                self.graph.edges_directed(index, Direction::Outgoing).count()
                    + self.graph.edges_directed(index, Direction::Incoming).count()
            })
            .unwrap_or(0)
    }

    // =========================================================================
    // Buffer Access
    // =========================================================================

    /// Get X positions slice.
    pub fn positions_x(&self) -> &[f32] {
        &self.pos_x
    }

    /// Get Y positions slice.
    pub fn positions_y(&self) -> &[f32] {
        &self.pos_y
    }

    /// Borrow all simulation buffers at once.
    pub(crate) fn buffers_mut(&mut self) -> NodeBuffers<'_> {
        NodeBuffers {
            pos_x: &mut self.pos_x,
            pos_y: &mut self.pos_y,
            vel_x: &mut self.vel_x,
            vel_y: &mut self.vel_y,
            fixed: &self.fixed,
        }
    }
}

impl Default for GraphEngine {
    fn default() -> Self {
        Self::new()
    }
}
