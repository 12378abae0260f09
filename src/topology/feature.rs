//! Topology objects to renderable features.

use super::{TopoObject, TopoShape, Topology};
use crate::error::AtlasError;
use crate::geo::{
    Feature, FeatureCollection, Geometry, LineString, MultiLineString, MultiPoint, MultiPolygon,
    Point, Polygon, Position,
};

/// Convert a topology object into features.
///
/// A `GeometryCollection` yields one feature per member; any other object
/// yields a single-feature collection.
pub fn feature(topology: &Topology, object: &TopoObject) -> Result<FeatureCollection, AtlasError> {
    let features = match &object.shape {
        TopoShape::GeometryCollection(members) => members
            .iter()
            .map(|member| to_feature(topology, member))
            .collect::<Result<_, _>>()?,
        _ => vec![to_feature(topology, object)?],
    };
    Ok(FeatureCollection { features })
}

impl Topology {
    /// Features of the named object.
    pub fn features(&self, name: &str) -> Result<FeatureCollection, AtlasError> {
        feature(self, self.object(name)?)
    }
}

fn to_feature(topology: &Topology, object: &TopoObject) -> Result<Feature, AtlasError> {
    Ok(Feature {
        id: object.id.clone(),
        name: object.name.clone(),
        geometry: geometry(topology, &object.shape)?,
    })
}

fn geometry(topology: &Topology, shape: &TopoShape) -> Result<Option<Geometry<f64>>, AtlasError> {
    let geometry = match shape {
        TopoShape::Empty => return Ok(None),
        TopoShape::Point(p) => Geometry::Point(Point::from(*p)),
        TopoShape::MultiPoint(ps) => Geometry::MultiPoint(MultiPoint::from(ps.clone())),
        TopoShape::LineString(arcs) => Geometry::LineString(line(topology, arcs)?.into()),
        TopoShape::MultiLineString(lines) => Geometry::MultiLineString(MultiLineString(
            lines
                .iter()
                .map(|arcs| line(topology, arcs).map(LineString::from))
                .collect::<Result<_, _>>()?,
        )),
        TopoShape::Polygon(rings) => Geometry::Polygon(polygon(topology, rings)?),
        TopoShape::MultiPolygon(polygons) => Geometry::MultiPolygon(MultiPolygon(
            polygons
                .iter()
                .map(|rings| polygon(topology, rings))
                .collect::<Result<_, _>>()?,
        )),
        TopoShape::GeometryCollection(members) => Geometry::GeometryCollection(
            geo::GeometryCollection(
                members
                    .iter()
                    .map(|m| geometry(topology, &m.shape))
                    .filter_map(Result::transpose)
                    .collect::<Result<_, _>>()?,
            ),
        ),
    };
    Ok(Some(geometry))
}

/// Join arcs into one line. A single-position line is doubled so it still
/// has two positions.
pub(super) fn line(topology: &Topology, arcs: &[i64]) -> Result<Vec<Position>, AtlasError> {
    let mut points = Vec::new();
    for &arc in arcs {
        topology.push_arc(arc, &mut points)?;
    }
    if points.len() == 1 {
        points.push(points[0]);
    }
    Ok(points)
}

/// Join arcs into a closed ring with at least four positions.
fn ring(topology: &Topology, arcs: &[i64]) -> Result<Vec<Position>, AtlasError> {
    let mut points = line(topology, arcs)?;
    if let Some(&first) = points.first() {
        while points.len() < 4 {
            points.push(first);
        }
    }
    Ok(points)
}

/// The first ring is the exterior, the rest are holes.
fn polygon(topology: &Topology, rings: &[Vec<i64>]) -> Result<Polygon<f64>, AtlasError> {
    let mut rings = rings
        .iter()
        .map(|arcs| ring(topology, arcs).map(LineString::from))
        .collect::<Result<Vec<_>, _>>()?
        .into_iter();
    let exterior = rings.next().unwrap_or_else(|| LineString::new(Vec::new()));
    Ok(Polygon::new(exterior, rings.collect()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::Coord;
    use crate::topology::tests::TWO_SQUARES;

    fn square(ring: Vec<Position>) -> Geometry<f64> {
        Geometry::Polygon(Polygon::new(LineString::from(ring), vec![]))
    }

    #[test]
    fn test_countries_become_features() {
        let topology = Topology::from_json(TWO_SQUARES).unwrap();
        let countries = topology.features("countries").unwrap();
        assert_eq!(countries.len(), 3);

        let left = &countries.features[0];
        assert_eq!(left.name.as_deref(), Some("Left"));
        assert_eq!(
            left.geometry,
            Some(square(vec![
                [1.0, 0.0],
                [1.0, 1.0],
                [0.0, 1.0],
                [0.0, 0.0],
                [1.0, 0.0],
            ]))
        );

        // The right square walks the shared edge backwards.
        assert_eq!(
            countries.features[1].geometry,
            Some(square(vec![
                [1.0, 0.0],
                [2.0, 0.0],
                [2.0, 1.0],
                [1.0, 1.0],
                [1.0, 0.0],
            ]))
        );

        assert_eq!(countries.features[2].geometry, None);
    }

    #[test]
    fn test_degenerate_ring_is_padded() {
        let topology = Topology::from_json(
            r#"{"type": "Topology", "arcs": [[[3, 4], [5, 6]]],
                "objects": {"tiny": {"type": "Polygon", "arcs": [[0]]}}}"#,
        )
        .unwrap();
        let features = topology.features("tiny").unwrap();
        let Some(Geometry::Polygon(polygon)) = &features.features[0].geometry else {
            panic!("expected a polygon");
        };
        assert_eq!(polygon.exterior().0.len(), 4);
        assert_eq!(polygon.exterior().0[2], Coord { x: 3.0, y: 4.0 });
    }

    #[test]
    fn test_line_shares_joint_positions() {
        let topology = Topology::from_json(TWO_SQUARES).unwrap();
        let points = line(&topology, &[1, 0]).unwrap();
        assert_eq!(
            points,
            vec![[1.0, 1.0], [0.0, 1.0], [0.0, 0.0], [1.0, 0.0], [1.0, 1.0]]
        );
    }
}
