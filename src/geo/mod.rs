//! Geographic geometry, projection and SVG path generation.
//!
//! - `geometry`: decoded `geo` shapes in lon/lat degrees
//! - `projection`: Mercator projection with extent fitting
//! - `path`: projected geometry as SVG path data

mod geometry;
mod path;
mod projection;

pub use geometry::{
    Coord, Feature, FeatureCollection, Geometry, LineString, MultiLineString, MultiPoint,
    MultiPolygon, Point, Polygon, Position,
};
pub use path::{GeoPath, POINT_RADIUS};
pub(crate) use path::num;
pub use projection::Mercator;
