//! Layout algorithms for the airport graph.
//!
//! The Force layout is computed here by a cooling force simulation that
//! writes positions straight into the engine's SoA buffers. The Map layout
//! needs no simulation; it is a projection of each airport's coordinates
//! (see `crate::geo`).

pub mod force;

pub use force::Simulation;
