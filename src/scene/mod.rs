//! The airport scene: graph, simulation, map and render state in one place.
//!
//! A `Scene` owns everything needed to draw the visualization and is driven
//! by three kinds of input:
//!
//! - `select_mode` switches between the Force and Map layouts
//! - `frame` advances the simulation and any running transitions
//! - `drag_start` / `drag_move` / `drag_end` pin nodes under the pointer
//!
//! All times are milliseconds on one monotonic clock (the DOM binding uses
//! `performance.now()`). Nothing here touches the browser, so the whole
//! interaction flow is testable natively.

mod render;
mod svg;

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

use tracing::{debug, info, trace};

use crate::config::AtlasConfig;
use crate::data::AirportGraphData;
use crate::error::AtlasError;
use crate::geo::{GeoPath, Mercator};
use crate::graph::{EdgeId, GraphEngine, NodeId};
use crate::layout::Simulation;
use crate::scale::LinearScale;
use crate::spatial::{NodeCircle, SpatialIndex};
use crate::topology::Topology;
use crate::transition::{Transition, Transitions};

pub use svg::SVG_NS;
pub use render::{
    CountryShape, EdgeRender, MapLayer, NodeRender, EDGE_STROKE, EDGE_STROKE_WIDTH, MESH_CLASS,
    MESH_STROKE, NODE_FILL,
};

// =============================================================================
// Layout Mode
// =============================================================================

/// Which layout positions the airports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LayoutMode {
    /// Positions come from the force simulation; the map is hidden.
    #[default]
    Force,
    /// Positions are the projected airport coordinates; the map is shown.
    Map,
}

impl LayoutMode {
    /// The radio input value naming this mode.
    pub fn as_str(self) -> &'static str {
        match self {
            LayoutMode::Force => "Force",
            LayoutMode::Map => "Map",
        }
    }
}

impl FromStr for LayoutMode {
    type Err = AtlasError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Force" => Ok(LayoutMode::Force),
            "Map" => Ok(LayoutMode::Map),
            other => Err(AtlasError::UnknownMode(other.to_string())),
        }
    }
}

impl fmt::Display for LayoutMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A node held by a pointer.
#[derive(Debug, Clone, Copy, PartialEq)]
struct ActiveDrag {
    node: NodeId,
    /// Node position minus pointer position at drag start.
    offset: [f32; 2],
}

// =============================================================================
// Scene
// =============================================================================

/// The complete visualization state.
pub struct Scene {
    config: AtlasConfig,
    engine: GraphEngine,
    simulation: Simulation,
    projection: Mercator,
    radius: LinearScale,

    /// Projected airport coordinates, indexed by node slot.
    geo_positions: Vec<[f32; 2]>,

    nodes: BTreeMap<NodeId, NodeRender>,
    edges: BTreeMap<EdgeId, EdgeRender>,
    /// `(edge, source, target)` in edge order.
    edge_ends: Vec<(EdgeId, NodeId, NodeId)>,
    map: MapLayer,

    mode: LayoutMode,
    node_motion: Transitions<NodeId, [f32; 2]>,
    edge_motion: Transitions<EdgeId, [f32; 4]>,
    map_fade: Option<Transition<f64>>,
    /// Restart the simulation once the return-to-Force transition completes.
    pending_restart: bool,

    drags: HashMap<i32, ActiveDrag>,
    hit_index: SpatialIndex,
    hit_index_dirty: bool,
}

impl Scene {
    /// Build a scene from parsed resources.
    ///
    /// The projection is fitted to the country features, the simulation is
    /// started and the map is hidden (Force layout).
    pub fn new(
        config: AtlasConfig,
        airports: &AirportGraphData,
        world: &Topology,
    ) -> Result<Self, AtlasError> {
        let features = world.features(&config.countries_object)?;
        let boundaries = world.mesh(&config.countries_object)?;

        let width = config.inner_width();
        let height = config.inner_height();
        let projection = Mercator::new().fit_extent(
            [[0.0, 0.0], [f64::from(width), f64::from(height)]],
            &features,
        );

        let path = GeoPath::new(&projection);
        let countries = features
            .features
            .iter()
            .map(|feature| CountryShape {
                id: feature.id.clone(),
                name: feature.name.clone(),
                d: feature
                    .geometry
                    .as_ref()
                    .map(|geometry| path.path_data(geometry))
                    .unwrap_or_default(),
            })
            .collect();
        let map = MapLayer::new(countries, path.path_data(&boundaries));

        let mut engine = GraphEngine::from_data(airports)?;
        let radius = LinearScale::passengers(engine.max_passengers(), config.radius_range);
        let simulation = Simulation::new(
            &mut engine,
            config.force.clone(),
            [width / 2.0, height / 2.0],
        );

        let geo_positions = engine
            .node_ids()
            .map(|id| {
                engine
                    .airport(id)
                    .map(|airport| {
                        let [x, y] = projection.project(airport.position());
                        [x as f32, y as f32]
                    })
                    .unwrap_or([f32::NAN, f32::NAN])
            })
            .collect();

        let nodes = engine
            .node_ids()
            .filter_map(|id| {
                let airport = engine.airport(id)?;
                let (cx, cy) = engine.get_node_position(id)?;
                Some((
                    id,
                    NodeRender {
                        cx,
                        cy,
                        r: radius.apply(airport.passengers) as f32,
                        title: airport.name.clone(),
                    },
                ))
            })
            .collect();

        let edge_ends = engine.edges();

        info!(
            airports = engine.node_count(),
            routes = engine.edge_count(),
            countries = features.len(),
            scale = projection.scale(),
            "scene built"
        );

        let mut scene = Self {
            config,
            engine,
            simulation,
            projection,
            radius,
            geo_positions,
            nodes,
            edges: BTreeMap::new(),
            edge_ends,
            map,
            mode: LayoutMode::Force,
            node_motion: Transitions::new(),
            edge_motion: Transitions::new(),
            map_fade: None,
            pending_restart: false,
            drags: HashMap::new(),
            hit_index: SpatialIndex::new(),
            hit_index_dirty: true,
        };
        scene.edges = scene
            .edge_ends
            .iter()
            .map(|&(id, source, target)| {
                (id, EdgeRender::between(scene.center(source), scene.center(target)))
            })
            .collect();
        Ok(scene)
    }

    /// Parse both resources and build a scene.
    pub fn from_json(
        config: AtlasConfig,
        airports_json: &str,
        world_json: &str,
    ) -> Result<Self, AtlasError> {
        let airports = AirportGraphData::from_json(airports_json)?;
        let world = Topology::from_json(world_json)?;
        Self::new(config, &airports, &world)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn config(&self) -> &AtlasConfig {
        &self.config
    }

    pub fn mode(&self) -> LayoutMode {
        self.mode
    }

    pub fn engine(&self) -> &GraphEngine {
        &self.engine
    }

    pub fn simulation(&self) -> &Simulation {
        &self.simulation
    }

    pub fn projection(&self) -> &Mercator {
        &self.projection
    }

    /// Passenger count to radius scale.
    pub fn radius_scale(&self) -> &LinearScale {
        &self.radius
    }

    pub fn nodes(&self) -> &BTreeMap<NodeId, NodeRender> {
        &self.nodes
    }

    pub fn node(&self, id: NodeId) -> Option<&NodeRender> {
        self.nodes.get(&id)
    }

    pub fn edges(&self) -> &BTreeMap<EdgeId, EdgeRender> {
        &self.edges
    }

    pub fn edge(&self, id: EdgeId) -> Option<&EdgeRender> {
        self.edges.get(&id)
    }

    pub fn map_layer(&self) -> &MapLayer {
        &self.map
    }

    /// Projected coordinates of an airport.
    pub fn geo_position(&self, id: NodeId) -> Option<[f32; 2]> {
        self.geo_positions.get(id.slot()).copied()
    }

    /// Whether any position or opacity transition is still running.
    pub fn is_transitioning(&self) -> bool {
        !self.node_motion.is_empty() || !self.edge_motion.is_empty() || self.map_fade.is_some()
    }

    /// Whether the simulation will restart when the current transition ends.
    pub fn is_restart_pending(&self) -> bool {
        self.pending_restart
    }

    /// Node currently held by a pointer.
    pub fn dragged_node(&self, pointer_id: i32) -> Option<NodeId> {
        self.drags.get(&pointer_id).map(|drag| drag.node)
    }

    // =========================================================================
    // Mode Switching
    // =========================================================================

    /// Switch layouts, animating over `transition_ms` from `now`.
    ///
    /// Selecting the current mode does nothing and returns false. Transitions
    /// already running are replaced and continue from their current values.
    pub fn select_mode(&mut self, mode: LayoutMode, now: f64) -> bool {
        if mode == self.mode {
            return false;
        }
        self.mode = mode;
        info!(mode = %mode, "layout selected");

        let opacity = match mode {
            LayoutMode::Map => {
                self.simulation.stop();
                self.pending_restart = false;
                self.release_all_drags();
                1.0
            }
            LayoutMode::Force => {
                self.pending_restart = true;
                0.0
            }
        };

        let duration = self.config.transition_ms;
        for (&id, node) in &self.nodes {
            let target = self.target_position(id);
            self.node_motion
                .start(id, Transition::new(node.center(), target, now, duration));
        }
        for &(id, source, target) in &self.edge_ends {
            let Some(edge) = self.edges.get(&id) else {
                continue;
            };
            let [x1, y1] = self.target_position(source);
            let [x2, y2] = self.target_position(target);
            self.edge_motion.start(
                id,
                Transition::new(edge.endpoints(), [x1, y1, x2, y2], now, duration),
            );
        }
        self.map_fade = Some(Transition::new(self.map.opacity, opacity, now, duration));

        true
    }

    /// Parse a radio value and switch to it.
    pub fn select_mode_str(&mut self, mode: &str, now: f64) -> Result<bool, AtlasError> {
        let mode = mode.parse()?;
        Ok(self.select_mode(mode, now))
    }

    /// Where a node rests in the current layout.
    fn target_position(&self, id: NodeId) -> [f32; 2] {
        match self.mode {
            LayoutMode::Map => self.geo_position(id).unwrap_or([f32::NAN, f32::NAN]),
            LayoutMode::Force => self.simulation_position(id),
        }
    }

    fn simulation_position(&self, id: NodeId) -> [f32; 2] {
        self.engine
            .get_node_position(id)
            .map(|(x, y)| [x, y])
            .unwrap_or([f32::NAN, f32::NAN])
    }

    /// Rendered center of a node.
    fn center(&self, id: NodeId) -> [f32; 2] {
        self.nodes
            .get(&id)
            .map(NodeRender::center)
            .unwrap_or([f32::NAN, f32::NAN])
    }

    // =========================================================================
    // Frame Loop
    // =========================================================================

    /// Advance to time `now`. Returns true when anything visible changed.
    pub fn frame(&mut self, now: f64) -> bool {
        let ticked = self.simulation.step(&mut self.engine);
        if ticked {
            self.reconcile();
        }

        let moving = !self.node_motion.is_empty() || !self.edge_motion.is_empty();
        let nodes = &mut self.nodes;
        self.node_motion.advance(now, |id, center| {
            if let Some(node) = nodes.get_mut(&id) {
                node.set_center(center);
            }
        });
        let edges = &mut self.edges;
        self.edge_motion.advance(now, |id, endpoints| {
            if let Some(edge) = edges.get_mut(&id) {
                edge.set_endpoints(endpoints);
            }
        });

        let fading = self.map_fade.is_some();
        if let Some(fade) = self.map_fade {
            self.map.opacity = fade.value_at(now);
            if fade.is_finished(now) {
                self.map_fade = None;
            }
        }

        if self.pending_restart && self.node_motion.is_empty() {
            self.pending_restart = false;
            self.simulation.restart();
            debug!(alpha = self.simulation.alpha(), "force simulation restarted");
        }

        let changed = ticked || moving || fading;
        if changed {
            self.hit_index_dirty = true;
        }
        changed
    }

    /// Copy simulation positions to every render object not in transition.
    fn reconcile(&mut self) {
        for (&id, node) in self.nodes.iter_mut() {
            if self.node_motion.contains(id) {
                continue;
            }
            if let Some((x, y)) = self.engine.get_node_position(id) {
                node.set_center([x, y]);
            }
        }
        for &(id, source, target) in &self.edge_ends {
            if self.edge_motion.contains(id) {
                continue;
            }
            let (Some((x1, y1)), Some((x2, y2))) = (
                self.engine.get_node_position(source),
                self.engine.get_node_position(target),
            ) else {
                continue;
            };
            if let Some(edge) = self.edges.get_mut(&id) {
                edge.set_endpoints([x1, y1, x2, y2]);
            }
        }
    }

    // =========================================================================
    // Hit Testing
    // =========================================================================

    /// The topmost airport circle containing `(x, y)` in drawing coordinates.
    pub fn node_at(&mut self, x: f32, y: f32) -> Option<NodeId> {
        if self.hit_index_dirty {
            let circles = self
                .nodes
                .iter()
                .filter(|(_, node)| node.cx.is_finite() && node.cy.is_finite())
                .map(|(&id, node)| NodeCircle::new(id, node.cx, node.cy, node.r))
                .collect();
            self.hit_index.rebuild(circles);
            self.hit_index_dirty = false;
            trace!(circles = self.hit_index.len(), "hit index rebuilt");
        }
        self.hit_index.node_at(x, y)
    }

    // =========================================================================
    // Dragging
    // =========================================================================

    /// Start dragging the airport under the pointer.
    ///
    /// Only allowed in the Force layout. The first active drag reheats the
    /// simulation; the grabbed node is pinned where the simulation has it.
    /// Returns the grabbed node.
    pub fn drag_start(&mut self, pointer_id: i32, x: f32, y: f32) -> Option<NodeId> {
        if self.mode != LayoutMode::Force {
            return None;
        }
        let id = self.node_at(x, y)?;

        if self.drags.contains_key(&pointer_id) {
            self.drag_end(pointer_id);
        }

        // The simulation owns positions again from here on.
        if !self.node_motion.is_empty() || !self.edge_motion.is_empty() {
            self.node_motion.clear();
            self.edge_motion.clear();
        }
        self.pending_restart = false;

        if self.drags.is_empty() {
            self.simulation
                .set_alpha_target(self.config.drag_alpha_target);
            self.simulation.restart();
        }

        let [sx, sy] = self.simulation_position(id);
        self.engine.fix_node(id, sx, sy);
        self.drags.insert(
            pointer_id,
            ActiveDrag {
                node: id,
                offset: [sx - x, sy - y],
            },
        );
        debug!(node = %id, pointer_id, "drag started");
        Some(id)
    }

    /// Move the node held by `pointer_id`. Returns false for unknown pointers.
    pub fn drag_move(&mut self, pointer_id: i32, x: f32, y: f32) -> bool {
        let Some(drag) = self.drags.get(&pointer_id) else {
            return false;
        };
        self.engine
            .fix_node(drag.node, x + drag.offset[0], y + drag.offset[1]);
        true
    }

    /// Release the node held by `pointer_id`.
    ///
    /// When the last drag ends the simulation is left to cool.
    pub fn drag_end(&mut self, pointer_id: i32) -> bool {
        let Some(drag) = self.drags.remove(&pointer_id) else {
            return false;
        };
        if self.drags.is_empty() {
            self.simulation.set_alpha_target(0.0);
        }
        if !self.drags.values().any(|other| other.node == drag.node) {
            self.engine.release_node(drag.node);
        }
        debug!(node = %drag.node, pointer_id, "drag ended");
        true
    }

    fn release_all_drags(&mut self) {
        if self.drags.is_empty() {
            return;
        }
        for (_, drag) in self.drags.drain() {
            self.engine.release_node(drag.node);
        }
        self.simulation.set_alpha_target(0.0);
    }
}
