//! Browser binding: builds the SVG, wires input events and runs the frame loop.
//!
//! The scene does all the work; this module only mirrors its render state
//! into DOM attributes and feeds it radio, pointer and animation-frame
//! events. Element lists are kept in the scene's key order, so index `i` of
//! `circles` is the `i`-th entry of `Scene::nodes`.

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use tracing::{error, info};
use web_sys::{Document, Element, Event, HtmlInputElement, PointerEvent, Window};

use crate::config::AtlasConfig;
use crate::data::load_resources;
use crate::error::AtlasError;
use crate::geo::num;
use crate::scene::{
    Scene, EDGE_STROKE, EDGE_STROKE_WIDTH, MESH_CLASS, MESH_STROKE, NODE_FILL, SVG_NS,
};

/// Selector of the layout radio inputs.
const MODE_INPUTS: &str = "input[name=selection]";

fn dom_error(value: JsValue) -> AtlasError {
    AtlasError::Dom(format!("{value:?}"))
}

fn missing(what: &str) -> AtlasError {
    AtlasError::Dom(format!("no {what} available"))
}

fn log_error(err: &AtlasError) {
    error!(%err, "airport atlas error");
}

/// Current time on the animation clock.
fn now(window: &Window) -> f64 {
    window.performance().map(|p| p.now()).unwrap_or(0.0)
}

// =============================================================================
// View
// =============================================================================

/// The SVG elements mirroring a scene.
struct DomView {
    svg: Element,
    countries: Vec<Element>,
    mesh: Element,
    lines: Vec<Element>,
    circles: Vec<Element>,
}

impl DomView {
    /// Create the SVG under `parent` in paint order: countries, mesh, routes,
    /// airports.
    fn create(document: &Document, parent: &Element, scene: &Scene) -> Result<Self, AtlasError> {
        let svg_element = |name: &str| {
            document
                .create_element_ns(Some(SVG_NS), name)
                .map_err(dom_error)
        };
        let config = scene.config();

        let svg = svg_element("svg")?;
        svg.set_attribute("width", &num(f64::from(config.width))).map_err(dom_error)?;
        svg.set_attribute("height", &num(f64::from(config.height))).map_err(dom_error)?;
        svg.set_attribute("style", "touch-action: none").map_err(dom_error)?;

        let group = svg_element("g")?;
        group
            .set_attribute(
                "transform",
                &format!(
                    "translate({},{})",
                    num(f64::from(config.margin.left)),
                    num(f64::from(config.margin.top))
                ),
            )
            .map_err(dom_error)?;
        svg.append_child(&group).map_err(dom_error)?;

        let map = scene.map_layer();
        let mut countries = Vec::with_capacity(map.countries.len());
        for country in &map.countries {
            let path = svg_element("path")?;
            path.set_attribute("d", &country.d).map_err(dom_error)?;
            group.append_child(&path).map_err(dom_error)?;
            countries.push(path);
        }

        let mesh = svg_element("path")?;
        mesh.set_attribute("d", &map.mesh).map_err(dom_error)?;
        mesh.set_attribute("fill", "none").map_err(dom_error)?;
        mesh.set_attribute("stroke", MESH_STROKE).map_err(dom_error)?;
        mesh.set_attribute("class", MESH_CLASS).map_err(dom_error)?;
        group.append_child(&mesh).map_err(dom_error)?;

        let line_style = format!(
            "stroke: {EDGE_STROKE}; stroke-width: {}",
            num(f64::from(EDGE_STROKE_WIDTH))
        );
        let mut lines = Vec::with_capacity(scene.edges().len());
        for _ in scene.edges() {
            let line = svg_element("line")?;
            line.set_attribute("style", &line_style).map_err(dom_error)?;
            group.append_child(&line).map_err(dom_error)?;
            lines.push(line);
        }

        let mut circles = Vec::with_capacity(scene.nodes().len());
        for node in scene.nodes().values() {
            let circle = svg_element("circle")?;
            circle
                .set_attribute("r", &num(f64::from(node.r)))
                .map_err(dom_error)?;
            circle
                .set_attribute("style", &format!("fill: {NODE_FILL}"))
                .map_err(dom_error)?;
            let title = svg_element("title")?;
            title.set_text_content(Some(&node.title));
            circle.append_child(&title).map_err(dom_error)?;
            group.append_child(&circle).map_err(dom_error)?;
            circles.push(circle);
        }

        parent.append_child(&svg).map_err(dom_error)?;

        let view = Self {
            svg,
            countries,
            mesh,
            lines,
            circles,
        };
        view.sync(scene)?;
        Ok(view)
    }

    /// Copy positions and opacity from the scene.
    fn sync(&self, scene: &Scene) -> Result<(), AtlasError> {
        let opacity = format!("opacity: {}", num(scene.map_layer().opacity));
        for path in self.countries.iter().chain(std::iter::once(&self.mesh)) {
            path.set_attribute("style", &opacity).map_err(dom_error)?;
        }

        for (line, edge) in self.lines.iter().zip(scene.edges().values()) {
            line.set_attribute("x1", &num(f64::from(edge.x1))).map_err(dom_error)?;
            line.set_attribute("y1", &num(f64::from(edge.y1))).map_err(dom_error)?;
            line.set_attribute("x2", &num(f64::from(edge.x2))).map_err(dom_error)?;
            line.set_attribute("y2", &num(f64::from(edge.y2))).map_err(dom_error)?;
        }

        for (circle, node) in self.circles.iter().zip(scene.nodes().values()) {
            circle.set_attribute("cx", &num(f64::from(node.cx))).map_err(dom_error)?;
            circle.set_attribute("cy", &num(f64::from(node.cy))).map_err(dom_error)?;
        }
        Ok(())
    }
}

/// Scene plus its view, shared by every event handler.
struct Mount {
    scene: Scene,
    view: DomView,
}

type Shared = Rc<RefCell<Mount>>;

// =============================================================================
// Mounting
// =============================================================================

/// Load both resources, append the visualization to `<body>` and start it.
pub async fn mount(
    config: AtlasConfig,
    airports_url: &str,
    world_url: &str,
) -> Result<(), AtlasError> {
    let window = web_sys::window().ok_or_else(|| missing("window"))?;
    let document = window.document().ok_or_else(|| missing("document"))?;
    let body = document.body().ok_or_else(|| missing("document body"))?;

    let (airports, world) = load_resources(airports_url, world_url).await?;
    let scene = Scene::new(config, &airports, &world)?;
    let view = DomView::create(&document, &body, &scene)?;

    info!(
        airports = scene.engine().node_count(),
        routes = scene.engine().edge_count(),
        countries = scene.map_layer().countries.len(),
        "airport atlas mounted"
    );

    let shared: Shared = Rc::new(RefCell::new(Mount { scene, view }));
    bind_mode_inputs(&window, &document, &shared)?;
    bind_pointer(&window, &shared)?;
    start_frame_loop(&window, shared)?;
    Ok(())
}

/// Put a visible error message on the page.
pub fn show_error(err: &AtlasError) {
    log_error(err);
    let Some(document) = web_sys::window().and_then(|w| w.document()) else {
        return;
    };
    let (Some(body), Ok(message)) = (document.body(), document.create_element("p")) else {
        return;
    };
    let _ = message.set_attribute("class", "atlas-error");
    message.set_text_content(Some(&format!("Unable to load the airport atlas: {err}")));
    let _ = body.append_child(&message);
}

/// Route radio `change` events to `select_mode`.
fn bind_mode_inputs(window: &Window, document: &Document, shared: &Shared) -> Result<(), AtlasError> {
    let inputs = document
        .query_selector_all(MODE_INPUTS)
        .map_err(dom_error)?;

    let on_change = {
        let window = window.clone();
        let shared = Rc::clone(shared);
        Closure::<dyn FnMut(Event)>::new(move |event: Event| {
            let Some(input) = event
                .target()
                .and_then(|t| t.dyn_into::<HtmlInputElement>().ok())
            else {
                return;
            };
            let value = input.value();
            let result = shared
                .borrow_mut()
                .scene
                .select_mode_str(&value, now(&window));
            if let Err(err) = result {
                log_error(&err);
            }
        })
    };

    for i in 0..inputs.length() {
        if let Some(input) = inputs.get(i) {
            input
                .add_event_listener_with_callback("change", on_change.as_ref().unchecked_ref())
                .map_err(dom_error)?;
        }
    }
    on_change.forget();
    Ok(())
}

/// Pointer down on the SVG starts a drag; move/up anywhere continue it.
fn bind_pointer(window: &Window, shared: &Shared) -> Result<(), AtlasError> {
    let svg = shared.borrow().view.svg.clone();

    let on_down = {
        let shared = Rc::clone(shared);
        let svg = svg.clone();
        Closure::<dyn FnMut(PointerEvent)>::new(move |event: PointerEvent| {
            let mut mount = shared.borrow_mut();
            let [x, y] = local_point(&svg, &mount.scene, &event);
            if mount.scene.drag_start(event.pointer_id(), x, y).is_some() {
                event.prevent_default();
            }
        })
    };
    svg.add_event_listener_with_callback("pointerdown", on_down.as_ref().unchecked_ref())
        .map_err(dom_error)?;
    on_down.forget();

    let on_move = {
        let shared = Rc::clone(shared);
        let svg = svg.clone();
        Closure::<dyn FnMut(PointerEvent)>::new(move |event: PointerEvent| {
            let mut mount = shared.borrow_mut();
            let [x, y] = local_point(&svg, &mount.scene, &event);
            if mount.scene.drag_move(event.pointer_id(), x, y) {
                event.prevent_default();
            }
        })
    };
    window
        .add_event_listener_with_callback("pointermove", on_move.as_ref().unchecked_ref())
        .map_err(dom_error)?;
    on_move.forget();

    let on_up = {
        let shared = Rc::clone(shared);
        Closure::<dyn FnMut(PointerEvent)>::new(move |event: PointerEvent| {
            shared.borrow_mut().scene.drag_end(event.pointer_id());
        })
    };
    for name in ["pointerup", "pointercancel"] {
        window
            .add_event_listener_with_callback(name, on_up.as_ref().unchecked_ref())
            .map_err(dom_error)?;
    }
    on_up.forget();

    Ok(())
}

/// Pointer position in drawing coordinates (inside the margin group).
///
/// The client offset is divided by the rendered-to-declared size ratio so
/// hit-testing still lines up when CSS scales the SVG.
fn local_point(svg: &Element, scene: &Scene, event: &PointerEvent) -> [f32; 2] {
    let rect = svg.get_bounding_client_rect();
    let config = scene.config();
    to_drawing(
        [f64::from(event.client_x()), f64::from(event.client_y())],
        [rect.left(), rect.top(), rect.width(), rect.height()],
        config,
    )
}

/// Map a client point into drawing coordinates given the SVG's client
/// rectangle `[left, top, width, height]`.
fn to_drawing(client: [f64; 2], rect: [f64; 4], config: &AtlasConfig) -> [f32; 2] {
    let ratio = |rendered: f64, declared: f32| {
        if rendered > 0.0 && declared > 0.0 {
            rendered / f64::from(declared)
        } else {
            1.0
        }
    };
    let sx = ratio(rect[2], config.width);
    let sy = ratio(rect[3], config.height);
    [
        ((client[0] - rect[0]) / sx) as f32 - config.margin.left,
        ((client[1] - rect[1]) / sy) as f32 - config.margin.top,
    ]
}

/// Drive `Scene::frame` from `requestAnimationFrame` for the page lifetime.
fn start_frame_loop(window: &Window, shared: Shared) -> Result<(), AtlasError> {
    let callback: Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>> = Rc::new(RefCell::new(None));

    let next = Rc::clone(&callback);
    let loop_window = window.clone();
    *callback.borrow_mut() = Some(Closure::<dyn FnMut(f64)>::new(move |timestamp: f64| {
        {
            let mut mount = shared.borrow_mut();
            let mount = &mut *mount;
            if mount.scene.frame(timestamp) {
                if let Err(err) = mount.view.sync(&mount.scene) {
                    log_error(&err);
                }
            }
        }
        if let Some(cb) = next.borrow().as_ref() {
            if let Err(err) = loop_window.request_animation_frame(cb.as_ref().unchecked_ref()) {
                log_error(&dom_error(err));
            }
        }
    }));

    if let Some(cb) = callback.borrow().as_ref() {
        window
            .request_animation_frame(cb.as_ref().unchecked_ref())
            .map_err(dom_error)?;
    }
    Ok(())
}
