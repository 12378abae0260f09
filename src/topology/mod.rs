//! TopoJSON decoding.
//!
//! A topology stores every shared boundary once, as an *arc*, and geometries
//! reference arcs by index (a negative index `!i` means arc `i` reversed).
//! Quantized topologies also delta-encode arc positions and carry a
//! `transform` that maps integer grid coordinates back to degrees.
//!
//! Arcs are decoded to absolute `[lon, lat]` positions once, at parse time.
//! `feature` then assembles renderable geometries from them and `mesh` emits
//! every referenced arc exactly once, stitched into continuous lines.

mod feature;
mod mesh;

use std::collections::HashMap;

use serde::Deserialize;
use serde_json::Value;

use crate::error::AtlasError;
use crate::geo::Position;

pub use feature::feature;
pub use mesh::mesh;

/// Quantization transform.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Transform {
    pub scale: [f64; 2],
    pub translate: [f64; 2],
}

impl Transform {
    fn apply(&self, x: f64, y: f64) -> Position {
        [
            x * self.scale[0] + self.translate[0],
            y * self.scale[1] + self.translate[1],
        ]
    }
}

/// A named topology object.
#[derive(Debug, Clone, PartialEq)]
pub struct TopoObject {
    pub id: Option<String>,
    /// The `name` property, if the object carries one.
    pub name: Option<String>,
    pub shape: TopoShape,
}

/// Arc-referencing geometry of a topology object.
#[derive(Debug, Clone, PartialEq)]
pub enum TopoShape {
    /// An object with a null geometry.
    Empty,
    Point(Position),
    MultiPoint(Vec<Position>),
    LineString(Vec<i64>),
    MultiLineString(Vec<Vec<i64>>),
    Polygon(Vec<Vec<i64>>),
    MultiPolygon(Vec<Vec<Vec<i64>>>),
    GeometryCollection(Vec<TopoObject>),
}

impl TopoShape {
    /// Visit every arc reference, in order.
    pub fn for_each_arc(&self, f: &mut impl FnMut(i64)) {
        match self {
            TopoShape::Empty | TopoShape::Point(_) | TopoShape::MultiPoint(_) => {}
            TopoShape::LineString(arcs) => arcs.iter().copied().for_each(f),
            TopoShape::MultiLineString(lines) | TopoShape::Polygon(lines) => {
                lines.iter().flatten().copied().for_each(f)
            }
            TopoShape::MultiPolygon(polygons) => {
                polygons.iter().flatten().flatten().copied().for_each(f)
            }
            TopoShape::GeometryCollection(objects) => {
                for object in objects {
                    object.shape.for_each_arc(f);
                }
            }
        }
    }
}

/// A decoded topology.
#[derive(Debug, Clone, PartialEq)]
pub struct Topology {
    pub transform: Option<Transform>,
    /// Absolute arc positions after delta decoding and transform.
    pub arcs: Vec<Vec<Position>>,
    pub objects: HashMap<String, TopoObject>,
}

impl Topology {
    /// Parse and decode a TopoJSON document.
    pub fn from_json(json: &str) -> Result<Self, AtlasError> {
        let raw: RawTopology = serde_json::from_str(json).map_err(|source| AtlasError::Json {
            resource: "topology",
            source,
        })?;

        if raw.kind != "Topology" {
            return Err(AtlasError::UnsupportedGeometry(format!(
                "expected a Topology document, found `{}`",
                raw.kind
            )));
        }

        let transform = raw.transform;
        let arcs = decode_arcs(&raw.arcs, transform.as_ref())?;
        let arc_count = arcs.len();

        let objects = raw
            .objects
            .into_iter()
            .map(|(name, object)| {
                convert_object(object, transform.as_ref(), arc_count).map(|o| (name, o))
            })
            .collect::<Result<_, _>>()?;

        Ok(Self {
            transform,
            arcs,
            objects,
        })
    }

    /// Look up a named object.
    pub fn object(&self, name: &str) -> Result<&TopoObject, AtlasError> {
        self.objects
            .get(name)
            .ok_or_else(|| AtlasError::MissingObject(name.to_string()))
    }

    /// Positions of an arc, reversed for negative references.
    pub fn arc(&self, index: i64) -> Result<Vec<Position>, AtlasError> {
        let arc = self
            .arcs
            .get(arc_slot(index))
            .ok_or(AtlasError::InvalidArc(index))?;
        let mut points = arc.clone();
        if index < 0 {
            points.reverse();
        }
        Ok(points)
    }

    /// First and last positions of an arc in reference order.
    pub fn arc_ends(&self, index: i64) -> Result<(Position, Position), AtlasError> {
        let arc = self
            .arcs
            .get(arc_slot(index))
            .ok_or(AtlasError::InvalidArc(index))?;
        let (Some(&first), Some(&last)) = (arc.first(), arc.last()) else {
            return Err(AtlasError::InvalidArc(index));
        };
        Ok(if index < 0 { (last, first) } else { (first, last) })
    }

    /// Append an arc to a running line, sharing the joint position.
    pub(crate) fn push_arc(&self, index: i64, points: &mut Vec<Position>) -> Result<(), AtlasError> {
        let arc = self.arc(index)?;
        points.pop();
        points.extend(arc);
        Ok(())
    }
}

/// Index into the arc table for a possibly-reversed reference.
pub(crate) fn arc_slot(index: i64) -> usize {
    (if index < 0 { !index } else { index }) as usize
}

#[derive(Deserialize)]
struct RawTopology {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    transform: Option<Transform>,
    #[serde(default)]
    arcs: Vec<Vec<Vec<f64>>>,
    #[serde(default)]
    objects: HashMap<String, RawObject>,
}

#[derive(Deserialize)]
struct RawObject {
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default)]
    id: Option<Value>,
    #[serde(default)]
    properties: Option<serde_json::Map<String, Value>>,
    #[serde(default)]
    arcs: Option<Value>,
    #[serde(default)]
    coordinates: Option<Value>,
    #[serde(default)]
    geometries: Option<Vec<RawObject>>,
}

fn decode_arcs(
    raw: &[Vec<Vec<f64>>],
    transform: Option<&Transform>,
) -> Result<Vec<Vec<Position>>, AtlasError> {
    raw.iter()
        .enumerate()
        .map(|(index, arc)| {
            let (mut x, mut y) = (0.0, 0.0);
            arc.iter()
                .map(|p| -> Result<Position, AtlasError> {
                    let [dx, dy] = p.get(..2).and_then(|s| <[f64; 2]>::try_from(s).ok()).ok_or(
                        AtlasError::InvalidArc(index as i64),
                    )?;
                    Ok(match transform {
                        Some(t) => {
                            x += dx;
                            y += dy;
                            t.apply(x, y)
                        }
                        None => [dx, dy],
                    })
                })
                .collect()
        })
        .collect()
}

fn convert_object(
    raw: RawObject,
    transform: Option<&Transform>,
    arc_count: usize,
) -> Result<TopoObject, AtlasError> {
    let id = raw.id.and_then(|v| match v {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    });
    let name = raw
        .properties
        .as_ref()
        .and_then(|p| p.get("name"))
        .and_then(Value::as_str)
        .map(str::to_string);

    let shape = match raw.kind.as_deref() {
        None => TopoShape::Empty,
        Some("GeometryCollection") => TopoShape::GeometryCollection(
            raw.geometries
                .unwrap_or_default()
                .into_iter()
                .map(|g| convert_object(g, transform, arc_count))
                .collect::<Result<_, _>>()?,
        ),
        Some("Point") => {
            let p: Vec<f64> = take(raw.coordinates, "Point")?;
            TopoShape::Point(point(&p, transform)?)
        }
        Some("MultiPoint") => {
            let ps: Vec<Vec<f64>> = take(raw.coordinates, "MultiPoint")?;
            TopoShape::MultiPoint(
                ps.iter()
                    .map(|p| point(p, transform))
                    .collect::<Result<_, _>>()?,
            )
        }
        Some("LineString") => TopoShape::LineString(take(raw.arcs, "LineString")?),
        Some("MultiLineString") => TopoShape::MultiLineString(take(raw.arcs, "MultiLineString")?),
        Some("Polygon") => TopoShape::Polygon(take(raw.arcs, "Polygon")?),
        Some("MultiPolygon") => TopoShape::MultiPolygon(take(raw.arcs, "MultiPolygon")?),
        Some(other) => return Err(AtlasError::UnsupportedGeometry(other.to_string())),
    };

    let mut invalid = None;
    shape.for_each_arc(&mut |i| {
        if invalid.is_none() && arc_slot(i) >= arc_count {
            invalid = Some(i);
        }
    });
    if let Some(i) = invalid {
        return Err(AtlasError::InvalidArc(i));
    }

    Ok(TopoObject { id, name, shape })
}

fn take<T: serde::de::DeserializeOwned>(value: Option<Value>, kind: &str) -> Result<T, AtlasError> {
    let value = value
        .ok_or_else(|| AtlasError::UnsupportedGeometry(format!("{kind} without coordinates")))?;
    serde_json::from_value(value).map_err(|source| AtlasError::Json {
        resource: "topology",
        source,
    })
}

fn point(p: &[f64], transform: Option<&Transform>) -> Result<Position, AtlasError> {
    let [x, y] = p
        .get(..2)
        .and_then(|s| <[f64; 2]>::try_from(s).ok())
        .ok_or_else(|| AtlasError::UnsupportedGeometry("point with fewer than two coordinates".into()))?;
    Ok(match transform {
        Some(t) => t.apply(x, y),
        None => [x, y],
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Two unit squares sharing their middle edge, quantized on a 1° grid.
    ///
    /// Arc 0: the shared edge (1,0)→(1,1).
    /// Arc 1: left square remainder (1,1)→(0,1)→(0,0)→(1,0).
    /// Arc 2: right square remainder (1,0)→(2,0)→(2,1)→(1,1).
    pub(crate) const TWO_SQUARES: &str = r#"{
        "type": "Topology",
        "transform": {"scale": [1, 1], "translate": [0, 0]},
        "arcs": [
            [[1, 0], [0, 1]],
            [[1, 1], [-1, 0], [0, -1], [1, 0]],
            [[1, 0], [1, 0], [0, 1], [-1, 0]]
        ],
        "objects": {
            "countries": {
                "type": "GeometryCollection",
                "geometries": [
                    {"type": "Polygon", "id": "L", "properties": {"name": "Left"}, "arcs": [[0, 1]]},
                    {"type": "Polygon", "id": 2, "arcs": [[2, -1]]},
                    {"type": null}
                ]
            }
        }
    }"#;

    #[test]
    fn test_delta_decoding() {
        let topology = Topology::from_json(TWO_SQUARES).unwrap();
        assert_eq!(topology.arcs.len(), 3);
        assert_eq!(topology.arcs[0], vec![[1.0, 0.0], [1.0, 1.0]]);
        assert_eq!(
            topology.arcs[1],
            vec![[1.0, 1.0], [0.0, 1.0], [0.0, 0.0], [1.0, 0.0]]
        );
    }

    #[test]
    fn test_transform_applies_scale_and_translate() {
        let topology = Topology::from_json(
            r#"{"type": "Topology",
                "transform": {"scale": [0.5, 2], "translate": [-10, 5]},
                "arcs": [[[2, 1], [2, 1]]],
                "objects": {}}"#,
        )
        .unwrap();
        assert_eq!(topology.arcs[0], vec![[-9.0, 7.0], [-8.0, 9.0]]);
    }

    #[test]
    fn test_unquantized_arcs_are_absolute() {
        let topology = Topology::from_json(
            r#"{"type": "Topology", "arcs": [[[10, 10], [20, 20]]], "objects": {}}"#,
        )
        .unwrap();
        assert_eq!(topology.arcs[0], vec![[10.0, 10.0], [20.0, 20.0]]);
    }

    #[test]
    fn test_reversed_arc() {
        let topology = Topology::from_json(TWO_SQUARES).unwrap();
        assert_eq!(topology.arc(-1).unwrap(), vec![[1.0, 1.0], [1.0, 0.0]]);
        assert_eq!(
            topology.arc_ends(-1).unwrap(),
            ([1.0, 1.0], [1.0, 0.0])
        );
    }

    #[test]
    fn test_object_metadata() {
        let topology = Topology::from_json(TWO_SQUARES).unwrap();
        let countries = topology.object("countries").unwrap();
        let TopoShape::GeometryCollection(members) = &countries.shape else {
            panic!("expected a collection");
        };
        assert_eq!(members[0].id.as_deref(), Some("L"));
        assert_eq!(members[0].name.as_deref(), Some("Left"));
        assert_eq!(members[1].id.as_deref(), Some("2"));
        assert_eq!(members[2].shape, TopoShape::Empty);
    }

    #[test]
    fn test_missing_object() {
        let topology = Topology::from_json(TWO_SQUARES).unwrap();
        assert!(matches!(
            topology.object("land"),
            Err(AtlasError::MissingObject(name)) if name == "land"
        ));
    }

    #[test]
    fn test_out_of_range_arc_is_rejected() {
        let err = Topology::from_json(
            r#"{"type": "Topology", "arcs": [[[0, 0], [1, 1]]],
                "objects": {"x": {"type": "LineString", "arcs": [0, -3]}}}"#,
        )
        .unwrap_err();
        assert!(matches!(err, AtlasError::InvalidArc(-3)));
    }

    #[test]
    fn test_not_a_topology() {
        let err = Topology::from_json(r#"{"type": "FeatureCollection", "features": []}"#)
            .unwrap_err();
        assert!(matches!(err, AtlasError::UnsupportedGeometry(_)));
    }
}
