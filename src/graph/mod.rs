//! Graph data structures and operations.
//!
//! This module provides the airport graph using petgraph's StableGraph for
//! stable node/edge indices, with Structure of Arrays (SoA) layout for
//! positions and velocities used by the force simulation.

mod edge;
mod engine;
mod node;

pub use edge::EdgeId;
pub use engine::GraphEngine;
pub(crate) use engine::NodeBuffers;
pub use node::{Airport, NodeId};
