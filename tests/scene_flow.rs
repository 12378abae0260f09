//! End-to-end interaction flows through the public scene API.

use airport_atlas_wasm::config::AtlasConfig;
use airport_atlas_wasm::graph::{EdgeId, NodeId};
use airport_atlas_wasm::scene::{LayoutMode, Scene};

/// Two unquantized rectangles, one per continent-ish region.
const WORLD: &str = r#"{
    "type": "Topology",
    "arcs": [
        [[-120, 25], [-70, 25], [-70, 50], [-120, 50], [-120, 25]],
        [[-10, 35], [30, 35], [30, 60], [-10, 60], [-10, 35]]
    ],
    "objects": {
        "countries": {
            "type": "GeometryCollection",
            "geometries": [
                {"type": "Polygon", "id": "W", "properties": {"name": "West"}, "arcs": [[0]]},
                {"type": "Polygon", "id": "E", "properties": {"name": "East"}, "arcs": [[1]]}
            ]
        }
    }
}"#;

const TWO_AIRPORTS: &str = r#"{
    "nodes": [
        {"id": "A", "name": "Alpha", "passengers": 100, "longitude": -100, "latitude": 40},
        {"id": "B", "name": "Bravo", "passengers": 50, "longitude": 10, "latitude": 50}
    ],
    "links": [{"source": "A", "target": "B"}]
}"#;

const FRAME_MS: f64 = 16.0;

fn two_airports() -> Scene {
    Scene::from_json(AtlasConfig::default(), TWO_AIRPORTS, WORLD).unwrap()
}

/// Run frames until the simulation cools. Returns the time reached.
fn settle(scene: &mut Scene, mut now: f64) -> f64 {
    while scene.simulation().is_running() {
        now += FRAME_MS;
        scene.frame(now);
    }
    now
}

/// Run frames at the display rate up to and including `until`.
fn run_until(scene: &mut Scene, mut now: f64, until: f64) -> f64 {
    while now < until {
        now = (now + FRAME_MS).min(until);
        scene.frame(now);
    }
    now
}

#[test]
fn test_radius_scale() {
    let scene = two_airports();
    assert_eq!(scene.node(NodeId(0)).unwrap().r, 15.0);
    assert_eq!(scene.node(NodeId(1)).unwrap().r, 7.5);
}

#[test]
fn test_two_airports_reach_projection_in_one_second() {
    let mut scene = two_airports();
    let start = settle(&mut scene, 0.0);

    assert!(scene.select_mode(LayoutMode::Map, start));
    run_until(&mut scene, start, start + 1000.0);

    let a = scene.projection().project([-100.0, 40.0]);
    let b = scene.projection().project([10.0, 50.0]);
    let a = [a[0] as f32, a[1] as f32];
    let b = [b[0] as f32, b[1] as f32];

    assert_eq!(scene.node(NodeId(0)).unwrap().center(), a);
    assert_eq!(scene.node(NodeId(1)).unwrap().center(), b);
    assert_eq!(
        scene.edge(EdgeId(0)).unwrap().endpoints(),
        [a[0], a[1], b[0], b[1]]
    );

    // Projected points lie inside the fitted 960x500 extent
    for [x, y] in [a, b] {
        assert!((0.0..=960.0).contains(&x));
        assert!((0.0..=500.0).contains(&y));
    }
}

#[test]
fn test_map_round_trip_has_no_drift() {
    let mut scene = two_airports();
    let mut now = settle(&mut scene, 0.0);
    for _ in 0..3 {
        let before: Vec<_> = scene.nodes().values().map(|n| n.center()).collect();

        scene.select_mode(LayoutMode::Map, now);
        now = run_until(&mut scene, now, now + 1000.0);
        scene.select_mode(LayoutMode::Force, now);
        now = run_until(&mut scene, now, now + 1000.0);

        let after: Vec<_> = scene.nodes().values().map(|n| n.center()).collect();
        assert_eq!(after, before);
        assert!(scene.simulation().is_running());

        // The restarted simulation is already cool and stops on its next tick
        now = settle(&mut scene, now);
    }
}

#[test]
fn test_map_opacity_follows_mode() {
    let mut scene = two_airports();
    let mut now = run_until(&mut scene, 0.0, 2000.0);
    assert_eq!(scene.map_layer().opacity, 0.0);

    scene.select_mode(LayoutMode::Map, now);
    now = run_until(&mut scene, now, now + 1000.0);
    assert_eq!(scene.map_layer().opacity, 1.0);

    now = run_until(&mut scene, now, now + 5000.0);
    assert_eq!(scene.map_layer().opacity, 1.0);

    scene.select_mode(LayoutMode::Force, now);
    run_until(&mut scene, now, now + 1000.0);
    assert_eq!(scene.map_layer().opacity, 0.0);
}

#[test]
fn test_drag_rejected_in_map_mode() {
    let mut scene = two_airports();
    let now = settle(&mut scene, 0.0);
    scene.select_mode(LayoutMode::Map, now);
    run_until(&mut scene, now, now + 1000.0);

    let before: Vec<_> = scene.nodes().values().map(|n| n.center()).collect();
    for (&id, node) in scene.nodes().clone().iter() {
        assert_eq!(scene.drag_start(1, node.cx, node.cy), None);
        assert!(!scene.drag_move(1, node.cx + 50.0, node.cy));
        assert!(!scene.engine().is_node_pinned(id));
    }
    run_until(&mut scene, now + 1000.0, now + 1500.0);
    let after: Vec<_> = scene.nodes().values().map(|n| n.center()).collect();
    assert_eq!(after, before);
}

#[test]
fn test_drag_moves_node_and_neighbors_react() {
    let mut scene = two_airports();
    let mut now = settle(&mut scene, 0.0);
    let [ax, ay] = scene.node(NodeId(0)).unwrap().center();
    let b_before = scene.node(NodeId(1)).unwrap().center();

    assert_eq!(scene.drag_start(9, ax, ay), Some(NodeId(0)));
    for step in 1..=30 {
        scene.drag_move(9, ax + 5.0 * step as f32, ay);
        now += FRAME_MS;
        scene.frame(now);
    }
    let [x, _] = scene.node(NodeId(0)).unwrap().center();
    assert!((x - (ax + 150.0)).abs() < 1e-2);
    assert_ne!(scene.node(NodeId(1)).unwrap().center(), b_before);

    scene.drag_end(9);
    assert!(!scene.engine().is_node_pinned(NodeId(0)));
    let end = settle(&mut scene, now);
    assert!(end > now);
}

#[test]
fn test_switching_back_before_arrival_does_not_restart() {
    let mut scene = two_airports();
    let mut now = settle(&mut scene, 0.0);

    scene.select_mode(LayoutMode::Map, now);
    now = run_until(&mut scene, now, now + 1000.0);
    scene.select_mode(LayoutMode::Force, now);
    now = run_until(&mut scene, now, now + 300.0);
    scene.select_mode(LayoutMode::Map, now);
    run_until(&mut scene, now, now + 2000.0);

    assert_eq!(scene.mode(), LayoutMode::Map);
    assert!(!scene.simulation().is_running());
    assert_eq!(scene.map_layer().opacity, 1.0);
}
