//! Decoded geographic geometry.
//!
//! Shapes produced by the topology decoder are plain `geo` geometries with
//! `x = longitude` and `y = latitude` in degrees.

use geo::Rect;

pub use geo::{Coord, Geometry, LineString, MultiLineString, MultiPoint, MultiPolygon, Point, Polygon};

/// A raw `[longitude, latitude]` pair in degrees, as stored in topology arcs.
pub type Position = [f64; 2];

/// A geometry with its identity and display name.
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    pub id: Option<String>,
    pub name: Option<String>,
    /// `None` for features that carry no geometry.
    pub geometry: Option<Geometry<f64>>,
}

/// An ordered collection of features.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureCollection {
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    /// Geometries of every feature that has one.
    pub fn geometries(&self) -> impl Iterator<Item = &Geometry<f64>> {
        self.features.iter().filter_map(|ft| ft.geometry.as_ref())
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

/// Smallest rectangle covering both `a` and `b`.
pub(crate) fn union(a: Rect<f64>, b: Rect<f64>) -> Rect<f64> {
    Rect::new(
        Coord {
            x: a.min().x.min(b.min().x),
            y: a.min().y.min(b.min().y),
        },
        Coord {
            x: a.max().x.max(b.max().x),
            y: a.max().y.max(b.max().y),
        },
    )
}
