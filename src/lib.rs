//! Airport Atlas - WASM Module
//!
//! This module draws an airport network two ways: as a force-directed graph
//! and as airports placed on a Mercator world map, with an animated switch
//! between them. It is compiled to WebAssembly and exposes a
//! JavaScript-friendly API via wasm-bindgen.
//!
//! # Architecture
//!
//! - `data`: Airport resource parsing and concurrent fetching
//! - `topology`: TopoJSON decoding (features and boundary mesh)
//! - `geo`: Mercator projection and SVG path generation
//! - `graph`: Airport graph using petgraph's StableGraph with SoA buffers
//! - `layout`: Force simulation for the Force layout
//! - `spatial`: R-tree spatial indexing for O(log n) hit testing
//! - `transition`: Eased attribute transitions
//! - `scene`: Modes, dragging, frame loop and render state
//! - `dom`: Browser binding (SVG elements, events, animation frames)

use js_sys::Float32Array;
use wasm_bindgen::prelude::*;

pub mod config;
pub mod data;
pub mod dom;
pub mod error;
pub mod geo;
pub mod graph;
pub mod layout;
pub mod scale;
pub mod scene;
pub mod spatial;
pub mod topology;
pub mod transition;

use config::AtlasConfig;
use graph::NodeId;
use scene::Scene;

pub use error::AtlasError;

/// Initialize the WASM module.
///
/// Core `tracing` events are forwarded as `log` records, which
/// `console_log` writes to the browser console.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Debug);
}

/// Fetch both resources, build the visualization under `<body>` and start it.
///
/// `config` may be `undefined` or a partial `AtlasConfig` object. On failure
/// the error is logged, shown on the page and returned.
#[wasm_bindgen(js_name = mountAtlas)]
pub async fn mount_atlas(
    airports_url: String,
    world_url: String,
    config: JsValue,
) -> Result<(), JsError> {
    let config = parse_config(config)?;
    if let Err(err) = dom::mount(config, &airports_url, &world_url).await {
        dom::show_error(&err);
        return Err(err.into());
    }
    Ok(())
}

fn parse_config(config: JsValue) -> Result<AtlasConfig, JsError> {
    if config.is_undefined() || config.is_null() {
        return Ok(AtlasConfig::default());
    }
    Ok(serde_wasm_bindgen::from_value(config)?)
}

/// Main entry point for driving a scene from JavaScript.
///
/// This struct wraps the internal Scene and provides the public API
/// exposed to JavaScript. Rendering is left to the caller.
#[wasm_bindgen]
pub struct AirportAtlasWasm {
    scene: Scene,
}

#[wasm_bindgen]
impl AirportAtlasWasm {
    /// Build a scene from the airport JSON and the world TopoJSON with the
    /// default configuration.
    #[wasm_bindgen(js_name = fromJson)]
    pub fn from_json(airports: &str, world: &str) -> Result<AirportAtlasWasm, JsError> {
        Ok(Self {
            scene: Scene::from_json(AtlasConfig::default(), airports, world)?,
        })
    }

    /// Build a scene with a partial configuration object.
    ///
    /// # Arguments
    ///
    /// * `airports` - Airport graph JSON (`nodes` and `links`)
    /// * `world` - World TopoJSON
    /// * `config` - Plain object; missing fields use the defaults
    #[wasm_bindgen(js_name = withConfig)]
    pub fn with_config(
        airports: &str,
        world: &str,
        config: JsValue,
    ) -> Result<AirportAtlasWasm, JsError> {
        Ok(Self {
            scene: Scene::from_json(parse_config(config)?, airports, world)?,
        })
    }

    // =========================================================================
    // Interaction
    // =========================================================================

    /// Switch to `"Force"` or `"Map"` at time `now` (ms).
    ///
    /// Returns false when the mode is already selected.
    #[wasm_bindgen(js_name = selectMode)]
    pub fn select_mode(&mut self, mode: &str, now: f64) -> Result<bool, JsError> {
        Ok(self.scene.select_mode_str(mode, now)?)
    }

    /// The current layout mode.
    pub fn mode(&self) -> String {
        self.scene.mode().to_string()
    }

    /// Advance the simulation and transitions to `now` (ms).
    ///
    /// Returns true when the render state changed.
    pub fn frame(&mut self, now: f64) -> bool {
        self.scene.frame(now)
    }

    /// Start dragging the airport under `(x, y)`.
    ///
    /// Returns the grabbed node ID, or None in Map mode or over empty space.
    #[wasm_bindgen(js_name = dragStart)]
    pub fn drag_start(&mut self, pointer_id: i32, x: f32, y: f32) -> Option<u32> {
        self.scene.drag_start(pointer_id, x, y).map(|id| id.0)
    }

    /// Move the node held by `pointer_id`.
    #[wasm_bindgen(js_name = dragMove)]
    pub fn drag_move(&mut self, pointer_id: i32, x: f32, y: f32) -> bool {
        self.scene.drag_move(pointer_id, x, y)
    }

    /// Release the node held by `pointer_id`.
    #[wasm_bindgen(js_name = dragEnd)]
    pub fn drag_end(&mut self, pointer_id: i32) -> bool {
        self.scene.drag_end(pointer_id)
    }

    /// The topmost airport under `(x, y)`.
    #[wasm_bindgen(js_name = nodeAt)]
    pub fn node_at(&mut self, x: f32, y: f32) -> Option<u32> {
        self.scene.node_at(x, y).map(|id| id.0)
    }

    // =========================================================================
    // Render State
    // =========================================================================

    /// Get the number of airports.
    #[wasm_bindgen(js_name = nodeCount)]
    pub fn node_count(&self) -> u32 {
        self.scene.engine().node_count()
    }

    /// Get the number of routes.
    #[wasm_bindgen(js_name = edgeCount)]
    pub fn edge_count(&self) -> u32 {
        self.scene.engine().edge_count()
    }

    /// Rendered circle centers as `[cx0, cy0, cx1, cy1, ...]`.
    #[wasm_bindgen(js_name = getNodePositions)]
    pub fn get_node_positions(&self) -> Float32Array {
        Float32Array::from(&node_positions(&self.scene)[..])
    }

    /// Circle radii in node order.
    #[wasm_bindgen(js_name = getNodeRadii)]
    pub fn get_node_radii(&self) -> Float32Array {
        Float32Array::from(&node_radii(&self.scene)[..])
    }

    /// Rendered route lines as `[x1, y1, x2, y2, ...]` in edge order.
    #[wasm_bindgen(js_name = getEdgeEndpoints)]
    pub fn get_edge_endpoints(&self) -> Float32Array {
        Float32Array::from(&edge_endpoints(&self.scene)[..])
    }

    /// Tooltip text of a node.
    #[wasm_bindgen(js_name = nodeTitle)]
    pub fn node_title(&self, node_id: u32) -> Option<String> {
        self.scene.node(NodeId(node_id)).map(|n| n.title.clone())
    }

    /// Country outlines as `[{id, name, d}, ...]`.
    #[wasm_bindgen(js_name = countryPaths)]
    pub fn country_paths(&self) -> Result<JsValue, JsError> {
        Ok(serde_wasm_bindgen::to_value(&self.scene.map_layer().countries)?)
    }

    /// Path data of the interior country boundaries.
    #[wasm_bindgen(js_name = meshPath)]
    pub fn mesh_path(&self) -> String {
        self.scene.map_layer().mesh.clone()
    }

    /// Current opacity of every map path.
    #[wasm_bindgen(js_name = mapOpacity)]
    pub fn map_opacity(&self) -> f64 {
        self.scene.map_layer().opacity
    }

    /// Whether the force simulation is stepping.
    #[wasm_bindgen(js_name = isSimulationRunning)]
    pub fn is_simulation_running(&self) -> bool {
        self.scene.simulation().is_running()
    }

    /// Current simulation alpha.
    pub fn alpha(&self) -> f32 {
        self.scene.simulation().alpha()
    }

    /// Serialize the current state as an SVG document.
    #[wasm_bindgen(js_name = renderSvg)]
    pub fn render_svg(&self) -> String {
        self.scene.to_svg()
    }
}

fn node_positions(scene: &Scene) -> Vec<f32> {
    scene
        .nodes()
        .values()
        .flat_map(|node| [node.cx, node.cy])
        .collect()
}

fn node_radii(scene: &Scene) -> Vec<f32> {
    scene.nodes().values().map(|node| node.r).collect()
}

fn edge_endpoints(scene: &Scene) -> Vec<f32> {
    scene
        .edges()
        .values()
        .flat_map(|edge| edge.endpoints())
        .collect()
}
