//! Render objects: the drawable state of the scene.
//!
//! These hold exactly what ends up on screen. The force simulation and
//! transitions write into them; the SVG writer and the DOM binding read them.

use serde::Serialize;

/// Fill of airport circles.
pub const NODE_FILL: &str = "orange";
/// Stroke of route lines.
pub const EDGE_STROKE: &str = "gray";
/// Stroke width of route lines.
pub const EDGE_STROKE_WIDTH: f32 = 1.0;
/// Stroke of the country boundary mesh.
pub const MESH_STROKE: &str = "white";
/// CSS class of the country boundary mesh.
pub const MESH_CLASS: &str = "subunit-boundary";

/// A drawn airport circle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeRender {
    pub cx: f32,
    pub cy: f32,
    /// Radius from the passenger scale.
    pub r: f32,
    /// Tooltip text (the airport name).
    pub title: String,
}

impl NodeRender {
    pub fn center(&self) -> [f32; 2] {
        [self.cx, self.cy]
    }

    pub fn set_center(&mut self, [cx, cy]: [f32; 2]) {
        self.cx = cx;
        self.cy = cy;
    }
}

/// A drawn route line.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct EdgeRender {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

impl EdgeRender {
    pub fn between([x1, y1]: [f32; 2], [x2, y2]: [f32; 2]) -> Self {
        Self { x1, y1, x2, y2 }
    }

    pub fn endpoints(&self) -> [f32; 4] {
        [self.x1, self.y1, self.x2, self.y2]
    }

    pub fn set_endpoints(&mut self, [x1, y1, x2, y2]: [f32; 4]) {
        *self = Self { x1, y1, x2, y2 };
    }
}

/// One country outline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountryShape {
    pub id: Option<String>,
    pub name: Option<String>,
    /// SVG path data.
    pub d: String,
}

/// The background map: country shapes plus the shared-boundary mesh.
///
/// Every path of the layer shares one opacity, which is 0 in the Force
/// layout and 1 in the Map layout.
#[derive(Debug, Clone, PartialEq)]
pub struct MapLayer {
    pub countries: Vec<CountryShape>,
    /// SVG path data of the interior boundary mesh.
    pub mesh: String,
    pub opacity: f64,
}

impl MapLayer {
    pub fn new(countries: Vec<CountryShape>, mesh: String) -> Self {
        Self {
            countries,
            mesh,
            opacity: 0.0,
        }
    }
}
