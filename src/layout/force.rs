//! Velocity-Verlet force simulation.
//!
//! A cooling simulation over the engine's SoA buffers. Each tick decays
//! `alpha` toward `alpha_target`, accumulates velocity from four forces
//! (many-body charge, link springs, x and y centering) and integrates:
//!
//! ```text
//! alpha += (alpha_target - alpha) * alpha_decay
//! v      = (v + forces) * (1 - velocity_decay)
//! x     += v            (or x = fx, v = 0 for pinned nodes)
//! ```
//!
//! The simulation keeps running until `alpha` drops below `alpha_min`.
//! Nodes without a position are seeded on a phyllotaxis spiral around the
//! origin so the layout is deterministic.

use std::f32::consts::PI;

use tracing::debug;

use crate::config::ForceConfig;
use crate::graph::{GraphEngine, NodeBuffers};

/// Radius step of the initial phyllotaxis spiral.
const INITIAL_RADIUS: f32 = 10.0;

/// A link spring between two node slots.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Spring {
    source: usize,
    target: usize,
    /// `1 / min(degree(source), degree(target))`
    strength: f32,
    /// Share of the correction applied to the target.
    bias: f32,
}

/// Linear congruential generator used to break ties between coincident nodes.
#[derive(Debug, Clone)]
struct Lcg {
    state: u64,
}

impl Lcg {
    const A: u64 = 1_664_525;
    const C: u64 = 1_013_904_223;
    const M: u64 = 1 << 32;

    fn new() -> Self {
        Self { state: 1 }
    }

    /// Next value in `[0, 1)`.
    fn next(&mut self) -> f32 {
        self.state = (Self::A * self.state + Self::C) % Self::M;
        (self.state as f64 / Self::M as f64) as f32
    }

    /// A tiny non-zero offset.
    fn jiggle(&mut self) -> f32 {
        (self.next() - 0.5) * 1e-6
    }
}

/// The force simulation driving the Force layout.
pub struct Simulation {
    config: ForceConfig,
    /// Point the x/y centering forces pull toward.
    center: [f32; 2],
    springs: Vec<Spring>,
    alpha: f32,
    alpha_target: f32,
    running: bool,
    random: Lcg,
    ticks: u64,
}

impl Simulation {
    /// Create a running simulation over the engine's nodes and edges.
    ///
    /// Unplaced nodes get their initial spiral positions here.
    pub fn new(engine: &mut GraphEngine, config: ForceConfig, center: [f32; 2]) -> Self {
        initialize_nodes(engine);

        let springs: Vec<Spring> = engine
            .edges()
            .into_iter()
            .map(|(_, source, target)| {
                let source_degree = engine.degree(source) as f32;
                let target_degree = engine.degree(target) as f32;
                Spring {
                    source: source.slot(),
                    target: target.slot(),
                    strength: 1.0 / source_degree.min(target_degree),
                    bias: source_degree / (source_degree + target_degree),
                }
            })
            .collect();

        debug!(
            nodes = engine.node_count(),
            springs = springs.len(),
            "force simulation initialized"
        );

        Self {
            config,
            center,
            springs,
            alpha: 1.0,
            alpha_target: 0.0,
            running: true,
            random: Lcg::new(),
            ticks: 0,
        }
    }

    // =========================================================================
    // Control
    // =========================================================================

    /// Current alpha (simulation temperature).
    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    /// The value alpha decays toward.
    pub fn alpha_target(&self) -> f32 {
        self.alpha_target
    }

    /// Set the value alpha decays toward. Holding it above `alpha_min`
    /// keeps the simulation warm indefinitely.
    pub fn set_alpha_target(&mut self, alpha_target: f32) {
        self.alpha_target = alpha_target;
    }

    /// Resume stepping. Alpha is left unchanged.
    pub fn restart(&mut self) {
        self.running = true;
    }

    /// Stop stepping. Positions stay where they are.
    pub fn stop(&mut self) {
        self.running = false;
    }

    /// Whether `step` will advance the simulation.
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Total ticks run so far.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Attraction point of the centering forces.
    pub fn center(&self) -> [f32; 2] {
        self.center
    }

    // =========================================================================
    // Stepping
    // =========================================================================

    /// Advance one frame if running. Returns true when a tick happened.
    ///
    /// The simulation stops itself once alpha cools below `alpha_min`.
    pub fn step(&mut self, engine: &mut GraphEngine) -> bool {
        if !self.running {
            return false;
        }
        self.tick(engine);
        if self.alpha < self.config.alpha_min {
            self.running = false;
            debug!(ticks = self.ticks, alpha = self.alpha, "force simulation cooled");
        }
        true
    }

    /// Run one tick unconditionally.
    pub fn tick(&mut self, engine: &mut GraphEngine) {
        self.alpha += (self.alpha_target - self.alpha) * self.config.alpha_decay;
        self.ticks += 1;

        let mut buffers = engine.buffers_mut();
        self.apply_charge(&mut buffers);
        for _ in 0..self.config.link_iterations {
            self.apply_links(&mut buffers);
        }
        self.apply_center(&mut buffers);
        self.integrate(&mut buffers);
    }

    /// Many-body force, exact pairwise.
    fn apply_charge(&mut self, b: &mut NodeBuffers<'_>) {
        let n = b.pos_x.len();
        let strength = self.config.charge_strength * self.alpha;
        let min2 = self.config.distance_min * self.config.distance_min;
        let max2 = self.config.distance_max * self.config.distance_max;

        for i in 0..n {
            for j in 0..n {
                if i == j {
                    continue;
                }
                let mut x = b.pos_x[j] - b.pos_x[i];
                let mut y = b.pos_y[j] - b.pos_y[i];
                let mut l = x * x + y * y;
                if l >= max2 {
                    continue;
                }
                if x == 0.0 {
                    x = self.random.jiggle();
                    l += x * x;
                }
                if y == 0.0 {
                    y = self.random.jiggle();
                    l += y * y;
                }
                if l < min2 {
                    l = (min2 * l).sqrt();
                }
                let w = strength / l;
                b.vel_x[i] += x * w;
                b.vel_y[i] += y * w;
            }
        }
    }

    /// Link springs toward `link_distance`, applied to predicted positions.
    fn apply_links(&mut self, b: &mut NodeBuffers<'_>) {
        for spring in &self.springs {
            let (s, t) = (spring.source, spring.target);
            let mut x = b.pos_x[t] + b.vel_x[t] - b.pos_x[s] - b.vel_x[s];
            if x == 0.0 {
                x = self.random.jiggle();
            }
            let mut y = b.pos_y[t] + b.vel_y[t] - b.pos_y[s] - b.vel_y[s];
            if y == 0.0 {
                y = self.random.jiggle();
            }
            let length = (x * x + y * y).sqrt();
            let k = (length - self.config.link_distance) / length * self.alpha * spring.strength;
            x *= k;
            y *= k;

            b.vel_x[t] -= x * spring.bias;
            b.vel_y[t] -= y * spring.bias;
            b.vel_x[s] += x * (1.0 - spring.bias);
            b.vel_y[s] += y * (1.0 - spring.bias);
        }
    }

    /// Independent x and y pulls toward the center.
    fn apply_center(&self, b: &mut NodeBuffers<'_>) {
        let k = self.config.center_strength * self.alpha;
        for i in 0..b.pos_x.len() {
            b.vel_x[i] += (self.center[0] - b.pos_x[i]) * k;
            b.vel_y[i] += (self.center[1] - b.pos_y[i]) * k;
        }
    }

    fn integrate(&self, b: &mut NodeBuffers<'_>) {
        let retain = 1.0 - self.config.velocity_decay;
        for i in 0..b.pos_x.len() {
            match b.fixed[i] {
                Some([fx, fy]) => {
                    b.pos_x[i] = fx;
                    b.pos_y[i] = fy;
                    b.vel_x[i] = 0.0;
                    b.vel_y[i] = 0.0;
                }
                None => {
                    b.vel_x[i] *= retain;
                    b.vel_y[i] *= retain;
                    b.pos_x[i] += b.vel_x[i];
                    b.pos_y[i] += b.vel_y[i];
                }
            }
        }
    }
}

/// Seed unplaced nodes on a phyllotaxis spiral; pinned nodes start at their pin.
fn initialize_nodes(engine: &mut GraphEngine) {
    let initial_angle = PI * (3.0 - 5.0_f32.sqrt());
    let b = engine.buffers_mut();
    for i in 0..b.pos_x.len() {
        if let Some([fx, fy]) = b.fixed[i] {
            b.pos_x[i] = fx;
            b.pos_y[i] = fy;
        }
        if b.pos_x[i].is_nan() || b.pos_y[i].is_nan() {
            let radius = INITIAL_RADIUS * (0.5 + i as f32).sqrt();
            let angle = i as f32 * initial_angle;
            b.pos_x[i] = radius * angle.cos();
            b.pos_y[i] = radius * angle.sin();
        }
        if b.vel_x[i].is_nan() || b.vel_y[i].is_nan() {
            b.vel_x[i] = 0.0;
            b.vel_y[i] = 0.0;
        }
    }
}
