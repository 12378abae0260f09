//! Spatial indexing for O(log n) hit testing.
//!
//! This module provides an R-tree based spatial index over the rendered
//! airport circles so pointer events can find the circle under the cursor.

mod rtree;

pub use rtree::{NodeCircle, SpatialIndex};
