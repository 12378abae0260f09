//! Atlas configuration.
//!
//! Defaults reproduce the classic 960×500 airport demo. JavaScript callers can
//! override any subset of fields by passing a plain object to
//! `AirportAtlasWasm.withConfig`; missing fields fall back to the defaults.

use serde::Deserialize;

/// Canvas margins in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct Margin {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

/// Top-level configuration for a scene.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AtlasConfig {
    /// Total SVG width (default: 960).
    pub width: f32,
    /// Total SVG height (default: 500).
    pub height: f32,
    /// Margins around the drawing area (default: all zero).
    pub margin: Margin,
    /// Pixel range node radii are scaled into (default: [0, 15]).
    pub radius_range: [f32; 2],
    /// Duration of layout-switch transitions in milliseconds (default: 1000).
    pub transition_ms: f64,
    /// Alpha target held while a node is being dragged (default: 0.3).
    pub drag_alpha_target: f32,
    /// Name of the topology object holding the country geometries.
    pub countries_object: String,
    /// Force simulation parameters.
    pub force: ForceConfig,
}

impl AtlasConfig {
    /// Width of the drawing area inside the margins.
    pub fn inner_width(&self) -> f32 {
        self.width - self.margin.left - self.margin.right
    }

    /// Height of the drawing area inside the margins.
    pub fn inner_height(&self) -> f32 {
        self.height - self.margin.top - self.margin.bottom
    }
}

impl Default for AtlasConfig {
    fn default() -> Self {
        Self {
            width: 960.0,
            height: 500.0,
            margin: Margin::default(),
            radius_range: [0.0, 15.0],
            transition_ms: 1000.0,
            drag_alpha_target: 0.3,
            countries_object: "countries".to_string(),
            force: ForceConfig::default(),
        }
    }
}

/// Parameters of the force simulation.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ForceConfig {
    /// Many-body strength; negative values repel (default: -30).
    pub charge_strength: f32,
    /// Minimum distance used by the many-body force (default: 1).
    pub distance_min: f32,
    /// Maximum distance at which the many-body force applies (default: unbounded).
    pub distance_max: f32,
    /// Rest length of link springs (default: 30).
    pub link_distance: f32,
    /// Link constraint iterations per tick (default: 1).
    pub link_iterations: u32,
    /// Strength of the x/y centering forces (default: 0.1).
    pub center_strength: f32,
    /// Alpha below which the simulation stops (default: 0.001).
    pub alpha_min: f32,
    /// Per-tick alpha decay; cools to `alpha_min` in ~300 ticks by default.
    pub alpha_decay: f32,
    /// Fraction of velocity lost each tick (default: 0.4).
    pub velocity_decay: f32,
}

impl Default for ForceConfig {
    fn default() -> Self {
        let alpha_min = 0.001_f32;
        Self {
            charge_strength: -30.0,
            distance_min: 1.0,
            distance_max: f32::INFINITY,
            link_distance: 30.0,
            link_iterations: 1,
            center_strength: 0.1,
            alpha_min,
            alpha_decay: 1.0 - alpha_min.powf(1.0 / 300.0),
            velocity_decay: 0.4,
        }
    }
}
