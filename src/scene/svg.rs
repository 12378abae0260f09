//! Static SVG snapshot of a scene.
//!
//! Produces the same document the DOM binding maintains live: country
//! paths, the boundary mesh, route lines and airport circles, in that
//! paint order, inside a group translated by the margins.

use std::fmt::Write;

use super::{Scene, EDGE_STROKE, EDGE_STROKE_WIDTH, MESH_CLASS, MESH_STROKE, NODE_FILL};
use crate::geo::num;

/// SVG namespace URI.
pub const SVG_NS: &str = "http://www.w3.org/2000/svg";

impl Scene {
    /// Serialize the current render state as an SVG document.
    pub fn to_svg(&self) -> String {
        let config = self.config();
        let map = self.map_layer();
        let opacity = num(map.opacity);
        let mut out = String::new();

        let _ = write!(
            out,
            r#"<svg xmlns="{SVG_NS}" width="{}" height="{}"><g transform="translate({},{})">"#,
            num(f64::from(config.width)),
            num(f64::from(config.height)),
            num(f64::from(config.margin.left)),
            num(f64::from(config.margin.top)),
        );

        for country in &map.countries {
            let _ = write!(
                out,
                r#"<path d="{}" style="opacity: {opacity}"/>"#,
                escape(&country.d)
            );
        }
        let _ = write!(
            out,
            r#"<path d="{}" fill="none" stroke="{MESH_STROKE}" class="{MESH_CLASS}" style="opacity: {opacity}"/>"#,
            escape(&map.mesh)
        );

        for edge in self.edges().values() {
            let _ = write!(
                out,
                r#"<line x1="{}" y1="{}" x2="{}" y2="{}" style="stroke: {EDGE_STROKE}; stroke-width: {}"/>"#,
                num(f64::from(edge.x1)),
                num(f64::from(edge.y1)),
                num(f64::from(edge.x2)),
                num(f64::from(edge.y2)),
                num(f64::from(EDGE_STROKE_WIDTH)),
            );
        }

        for node in self.nodes().values() {
            let _ = write!(
                out,
                r#"<circle cx="{}" cy="{}" r="{}" style="fill: {NODE_FILL}"><title>{}</title></circle>"#,
                num(f64::from(node.cx)),
                num(f64::from(node.cy)),
                num(f64::from(node.r)),
                escape(&node.title),
            );
        }

        out.push_str("</g></svg>");
        out
    }
}

/// Escape text for use in element content and double-quoted attributes.
pub(crate) fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}
