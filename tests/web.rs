//! Browser tests for the wasm facade.
//!
//! Run with `wasm-pack test --headless --chrome`.

#![cfg(target_arch = "wasm32")]

use airport_atlas_wasm::{mount_atlas, AirportAtlasWasm};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use wasm_bindgen_test::*;
use web_sys::{Document, Element, Event, HtmlInputElement};

wasm_bindgen_test_configure!(run_in_browser);

const WORLD: &str = r#"{
    "type": "Topology",
    "arcs": [[[-120, 25], [-70, 25], [-70, 50], [-120, 50], [-120, 25]]],
    "objects": {
        "countries": {
            "type": "GeometryCollection",
            "geometries": [{"type": "Polygon", "id": "W", "properties": {"name": "West"}, "arcs": [[0]]}]
        }
    }
}"#;

const AIRPORTS: &str = r#"{
    "nodes": [
        {"name": "Alpha", "passengers": 100, "longitude": -100, "latitude": 40},
        {"name": "Bravo", "passengers": 50, "longitude": -80, "latitude": 30}
    ],
    "links": [{"source": 0, "target": 1}]
}"#;

fn atlas() -> AirportAtlasWasm {
    match AirportAtlasWasm::from_json(AIRPORTS, WORLD) {
        Ok(atlas) => atlas,
        Err(_) => panic!("fixture failed to load"),
    }
}

#[wasm_bindgen_test]
fn test_buffers() {
    let mut atlas = atlas();
    atlas.frame(0.0);

    assert_eq!(atlas.node_count(), 2);
    assert_eq!(atlas.edge_count(), 1);
    assert_eq!(atlas.get_node_positions().length(), 4);
    assert_eq!(atlas.get_node_radii().to_vec(), vec![15.0, 7.5]);
    assert_eq!(atlas.get_edge_endpoints().length(), 4);
    assert_eq!(atlas.node_title(1).as_deref(), Some("Bravo"));
}

#[wasm_bindgen_test]
fn test_mode_switch() {
    let mut atlas = atlas();
    assert_eq!(atlas.mode(), "Force");
    assert_eq!(atlas.select_mode("Map", 0.0).ok(), Some(true));
    assert!(!atlas.is_simulation_running());
    atlas.frame(1000.0);
    assert_eq!(atlas.map_opacity(), 1.0);
    assert!(atlas.select_mode("Satellite", 1000.0).is_err());
    assert_eq!(atlas.drag_start(1, 0.0, 0.0), None);
}

#[wasm_bindgen_test]
fn test_with_config() {
    let config = js_sys::JSON::parse(r#"{"width": 800, "height": 400}"#).unwrap();
    let atlas = AirportAtlasWasm::with_config(AIRPORTS, WORLD, config).ok().unwrap();
    assert!(atlas.render_svg().contains(r#"width="800" height="400""#));

    let atlas = AirportAtlasWasm::with_config(AIRPORTS, WORLD, JsValue::UNDEFINED)
        .ok()
        .unwrap();
    assert!(atlas.render_svg().contains(r#"width="960" height="500""#));
}

#[wasm_bindgen_test]
fn test_country_paths() {
    let atlas = atlas();
    let countries = atlas.country_paths().ok().unwrap();
    let array = js_sys::Array::from(&countries);
    assert_eq!(array.length(), 1);
    assert!(atlas.mesh_path().starts_with('M'));
}

#[wasm_bindgen_test]
fn test_init_routes_logs_to_console() {
    // Safe to call more than once.
    airport_atlas_wasm::init();
    airport_atlas_wasm::init();
    assert!(log::log_enabled!(log::Level::Debug));
}

// =============================================================================
// Mounting
// =============================================================================

fn document() -> Document {
    web_sys::window().unwrap().document().unwrap()
}

/// Empty `<body>` so each mount starts from a blank page.
fn reset_body() -> Element {
    let body: Element = document().body().unwrap().into();
    body.set_inner_html("");
    body
}

fn data_url(json: &str) -> String {
    let encoded: String = js_sys::encode_uri_component(json).into();
    format!("data:application/json,{encoded}")
}

async fn sleep(ms: i32) {
    let promise = js_sys::Promise::new(&mut |resolve, _| {
        web_sys::window()
            .unwrap()
            .set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, ms)
            .unwrap();
    });
    JsFuture::from(promise).await.unwrap();
}

fn radio(body: &Element, value: &str, checked: bool) -> HtmlInputElement {
    let input: HtmlInputElement = document()
        .create_element("input")
        .unwrap()
        .dyn_into()
        .unwrap();
    input.set_type("radio");
    input.set_name("selection");
    input.set_value(value);
    input.set_checked(checked);
    body.append_child(&input).unwrap();
    input
}

fn tag_names(parent: &Element) -> Vec<String> {
    let mut names = Vec::new();
    let mut child = parent.first_element_child();
    while let Some(element) = child {
        names.push(element.tag_name().to_lowercase());
        child = element.next_element_sibling();
    }
    names
}

#[wasm_bindgen_test]
async fn test_mount_failure_shows_message() {
    let body = reset_body();
    let result = mount_atlas(
        "/no-such-airports.json".to_string(),
        data_url(WORLD),
        JsValue::UNDEFINED,
    )
    .await;

    assert!(result.is_err());
    let message = body.query_selector("p.atlas-error").unwrap().unwrap();
    assert!(message.text_content().unwrap().contains("airports"));
    assert!(body.query_selector("svg").unwrap().is_none());
}

#[wasm_bindgen_test]
async fn test_mount_builds_svg_in_paint_order() {
    let body = reset_body();
    mount_atlas(data_url(AIRPORTS), data_url(WORLD), JsValue::UNDEFINED)
        .await
        .ok()
        .unwrap();

    let svg = body.query_selector("svg").unwrap().unwrap();
    assert_eq!(svg.get_attribute("width").as_deref(), Some("960"));
    let group = svg.first_element_child().unwrap();
    assert_eq!(tag_names(&group), ["path", "path", "line", "circle", "circle"]);

    let mesh = body.query_selector("path.subunit-boundary").unwrap().unwrap();
    assert_eq!(mesh.get_attribute("style").as_deref(), Some("opacity: 0"));
    let title = body.query_selector("circle title").unwrap().unwrap();
    assert_eq!(title.text_content().as_deref(), Some("Alpha"));
    assert!(body.query_selector("p.atlas-error").unwrap().is_none());
}

#[wasm_bindgen_test]
async fn test_radio_change_switches_mode() {
    let body = reset_body();
    radio(&body, "Force", true);
    let map = radio(&body, "Map", false);
    mount_atlas(data_url(AIRPORTS), data_url(WORLD), JsValue::UNDEFINED)
        .await
        .ok()
        .unwrap();

    map.set_checked(true);
    map.dispatch_event(&Event::new("change").unwrap()).unwrap();
    sleep(1500).await;

    let mesh = body.query_selector("path.subunit-boundary").unwrap().unwrap();
    assert_eq!(mesh.get_attribute("style").as_deref(), Some("opacity: 1"));
}
