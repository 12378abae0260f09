//! Spherical Mercator projection with extent fitting.
//!
//! The raw projection maps longitude λ to x = λ and latitude φ to
//! y = ln(tan(π/4 + φ/2)), both in radians. Screen coordinates are
//! `translate + scale * (x, -y)`, so north is up. Latitudes are clamped to the
//! square Mercator world (|y| ≤ π, about ±85.05°) so the poles stay finite.

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI, TAU};

use geo::{BoundingRect, MapCoords};

use super::geometry::{Coord, FeatureCollection, Position, union};

/// Scale used while measuring bounds during a fit.
const FIT_SCALE: f64 = 150.0;

/// Latitude (radians) at which the raw Mercator y reaches ±π.
fn max_latitude() -> f64 {
    2.0 * PI.exp().atan() - FRAC_PI_2
}

/// A Mercator projection from `[lon, lat]` degrees to screen pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mercator {
    scale: f64,
    translate: [f64; 2],
}

impl Mercator {
    /// A projection with the conventional default scale (961 / 2π) centered
    /// on a 960×500 canvas.
    pub fn new() -> Self {
        Self {
            scale: 961.0 / TAU,
            translate: [480.0, 250.0],
        }
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn translate(&self) -> [f64; 2] {
        self.translate
    }

    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_translate(mut self, translate: [f64; 2]) -> Self {
        self.translate = translate;
        self
    }

    /// Project `[lon, lat]` degrees to screen `[x, y]`.
    pub fn project(&self, position: impl Into<Coord<f64>>) -> [f64; 2] {
        let Coord { x, y } = self.project_coord(position.into());
        [x, y]
    }

    /// Project a lon/lat coordinate to a screen coordinate.
    pub fn project_coord(&self, coord: Coord<f64>) -> Coord<f64> {
        let [x, y] = raw_mercator(coord);
        Coord {
            x: self.translate[0] + self.scale * x,
            y: self.translate[1] - self.scale * y,
        }
    }

    /// Map screen `[x, y]` back to `[lon, lat]` degrees.
    pub fn invert(&self, point: [f64; 2]) -> Position {
        let x = (point[0] - self.translate[0]) / self.scale;
        let y = (self.translate[1] - point[1]) / self.scale;
        let lambda = x;
        let phi = 2.0 * y.exp().atan() - FRAC_PI_2;
        [lambda.to_degrees(), phi.to_degrees()]
    }

    /// Fit `features` inside `extent = [[x0, y0], [x1, y1]]`.
    ///
    /// Projects at a fixed scale with zero translation, measures the projected
    /// bounds, then picks the largest scale that fits both dimensions and
    /// centers the result. An empty or degenerate collection leaves the
    /// projection unchanged.
    pub fn fit_extent(mut self, extent: [[f64; 2]; 2], features: &FeatureCollection) -> Self {
        let probe = Self {
            scale: FIT_SCALE,
            translate: [0.0, 0.0],
        };

        let Some(bounds) = features
            .geometries()
            .filter_map(|g| g.map_coords(|c| probe.project_coord(c)).bounding_rect())
            .reduce(union)
        else {
            return self;
        };

        let (bw, bh) = (bounds.width(), bounds.height());
        if !(bw.is_finite() && bh.is_finite()) || (bw <= 0.0 && bh <= 0.0) {
            return self;
        }

        let w = extent[1][0] - extent[0][0];
        let h = extent[1][1] - extent[0][1];
        let k = match (bw > 0.0, bh > 0.0) {
            (true, true) => (w / bw).min(h / bh),
            (true, false) => w / bw,
            _ => h / bh,
        };
        let (min, max) = (bounds.min(), bounds.max());
        let x = extent[0][0] + (w - k * (max.x + min.x)) / 2.0;
        let y = extent[0][1] + (h - k * (max.y + min.y)) / 2.0;

        self.scale = FIT_SCALE * k;
        self.translate = [x, y];
        self
    }

    /// Fit `features` inside a `width × height` box anchored at the origin.
    pub fn fit_size(self, width: f64, height: f64, features: &FeatureCollection) -> Self {
        self.fit_extent([[0.0, 0.0], [width, height]], features)
    }
}

impl Default for Mercator {
    fn default() -> Self {
        Self::new()
    }
}

fn raw_mercator(coord: Coord<f64>) -> [f64; 2] {
    let limit = max_latitude();
    let lambda = coord.x.to_radians();
    let phi = coord.y.to_radians().clamp(-limit, limit);
    [lambda, (FRAC_PI_4 + phi / 2.0).tan().ln()]
}
