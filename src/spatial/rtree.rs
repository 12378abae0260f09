//! R-tree based spatial index using the rstar crate.
//!
//! Provides O(log n) lookup of the circle under a point for pointer hit
//! testing.

use rstar::{PointDistance, RTree, RTreeObject, AABB};

use crate::graph::NodeId;

/// A rendered circle in the spatial index with associated node ID.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeCircle {
    /// The node identifier.
    pub id: NodeId,
    /// Center X coordinate.
    pub x: f32,
    /// Center Y coordinate.
    pub y: f32,
    /// Radius.
    pub r: f32,
}

impl NodeCircle {
    /// Create a new NodeCircle. Negative radii are treated as zero.
    pub fn new(id: NodeId, x: f32, y: f32, r: f32) -> Self {
        Self { id, x, y, r: r.max(0.0) }
    }
}

impl RTreeObject for NodeCircle {
    type Envelope = AABB<[f32; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners(
            [self.x - self.r, self.y - self.r],
            [self.x + self.r, self.y + self.r],
        )
    }
}

impl PointDistance for NodeCircle {
    /// Squared distance from the point to the circle's boundary, zero inside.
    fn distance_2(&self, point: &[f32; 2]) -> f32 {
        let dx = self.x - point[0];
        let dy = self.y - point[1];
        let outside = ((dx * dx + dy * dy).sqrt() - self.r).max(0.0);
        outside * outside
    }

    /// A zero-radius circle is not painted and so contains nothing.
    fn contains_point(&self, point: &[f32; 2]) -> bool {
        let dx = self.x - point[0];
        let dy = self.y - point[1];
        self.r > 0.0 && dx * dx + dy * dy <= self.r * self.r
    }
}

/// Spatial index for rendered airport circles.
///
/// Uses an R*-tree for efficient spatial queries.
pub struct SpatialIndex {
    tree: RTree<NodeCircle>,
}

impl SpatialIndex {
    /// Create a new empty spatial index.
    pub fn new() -> Self {
        Self { tree: RTree::new() }
    }

    /// Find the circle under a point.
    ///
    /// When circles overlap the one painted last (highest NodeId) wins,
    /// matching SVG document order.
    pub fn node_at(&self, x: f32, y: f32) -> Option<NodeId> {
        self.tree
            .locate_all_at_point(&[x, y])
            .map(|circle| circle.id)
            .max()
    }

    /// Rebuild the index from a list of circles.
    ///
    /// Zero-radius circles are left out since they can never be hit.
    pub fn rebuild(&mut self, mut circles: Vec<NodeCircle>) {
        circles.retain(|circle| circle.r > 0.0);
        self.tree = RTree::bulk_load(circles);
    }

    /// Get the number of circles in the index.
    pub fn len(&self) -> usize {
        self.tree.size()
    }

    /// Check if the index is empty.
    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}

impl Default for SpatialIndex {
    fn default() -> Self {
        Self::new()
    }
}
