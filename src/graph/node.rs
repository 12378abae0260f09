//! Node type and related structures.
//!
//! Nodes are airports. Each node has:
//! - A stable unique identifier (its position in the input resource)
//! - Airport metadata (name, passenger count, geographic coordinates)
//! - Position (x, y) and velocity (vx, vy) in the engine's SoA buffers
//! - Pinned state (fixed at `(fx, fy)` while dragged)

use std::fmt;

use crate::data::AirportRecord;
use crate::geo::Position;

/// Stable node identifier.
///
/// Nodes are never removed, so the ID doubles as the node's slot in the
/// engine's position buffers. It wraps a u32 for WebAssembly interop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl NodeId {
    /// Create a new NodeId from a raw u32.
    #[inline]
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw u32 value.
    #[inline]
    pub fn raw(self) -> u32 {
        self.0
    }

    /// Slot index in the SoA buffers.
    #[inline]
    pub fn slot(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Node({})", self.0)
    }
}

impl From<u32> for NodeId {
    #[inline]
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl From<NodeId> for u32 {
    #[inline]
    fn from(id: NodeId) -> Self {
        id.0
    }
}

/// Airport metadata carried by a node.
#[derive(Debug, Clone, PartialEq)]
pub struct Airport {
    /// The `id` field from the resource, if any.
    pub key: Option<String>,
    pub name: String,
    pub passengers: f64,
    pub longitude: f64,
    pub latitude: f64,
}

impl Airport {
    /// Geographic position as `[lon, lat]`.
    pub fn position(&self) -> Position {
        [self.longitude, self.latitude]
    }
}

impl From<&AirportRecord> for Airport {
    fn from(record: &AirportRecord) -> Self {
        Self {
            key: record.id.clone(),
            name: record.name.clone(),
            passengers: record.passengers.unwrap_or(0.0),
            longitude: record.longitude,
            latitude: record.latitude,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_id() {
        let id = NodeId::new(42);
        assert_eq!(id.raw(), 42);
        assert_eq!(id.slot(), 42);
        assert_eq!(format!("{}", id), "Node(42)");
    }

    #[test]
    fn test_node_id_conversion() {
        let id: NodeId = 123.into();
        let raw: u32 = id.into();
        assert_eq!(raw, 123);
    }

    #[test]
    fn test_airport_from_record_defaults_passengers() {
        let record = AirportRecord {
            id: Some("SEA".into()),
            name: "Seattle".into(),
            passengers: None,
            longitude: -122.3,
            latitude: 47.45,
        };
        let airport = Airport::from(&record);
        assert_eq!(airport.passengers, 0.0);
        assert_eq!(airport.position(), [-122.3, 47.45]);
        assert_eq!(airport.key.as_deref(), Some("SEA"));
    }
}
