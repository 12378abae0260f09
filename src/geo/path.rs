//! SVG path data generation for projected geometry.

use std::fmt::Write;

use super::geometry::{Coord, Geometry, LineString};
use super::projection::Mercator;

/// Radius of the circle drawn for point geometries.
pub const POINT_RADIUS: f64 = 4.5;

/// Turns geometry into SVG `d` attribute strings through a projection.
#[derive(Debug, Clone, Copy)]
pub struct GeoPath<'a> {
    projection: &'a Mercator,
}

impl<'a> GeoPath<'a> {
    pub fn new(projection: &'a Mercator) -> Self {
        Self { projection }
    }

    /// Path data for a geometry. Empty geometry yields an empty string.
    pub fn path_data(&self, geometry: &Geometry<f64>) -> String {
        let mut out = String::new();
        self.write_geometry(&mut out, geometry);
        out
    }

    fn write_geometry(&self, out: &mut String, geometry: &Geometry<f64>) {
        match geometry {
            Geometry::Point(p) => self.write_point(out, p.0),
            Geometry::MultiPoint(points) => {
                for p in points {
                    self.write_point(out, p.0);
                }
            }
            Geometry::Line(line) => self.write_line(out, &[line.start, line.end], false),
            Geometry::LineString(line) => self.write_line(out, &line.0, false),
            Geometry::MultiLineString(lines) => {
                for line in lines {
                    self.write_line(out, &line.0, false);
                }
            }
            Geometry::Polygon(polygon) => {
                self.write_rings(out, polygon.exterior(), polygon.interiors())
            }
            Geometry::MultiPolygon(polygons) => {
                for polygon in polygons {
                    self.write_rings(out, polygon.exterior(), polygon.interiors());
                }
            }
            Geometry::Rect(rect) => {
                let polygon = rect.to_polygon();
                self.write_rings(out, polygon.exterior(), polygon.interiors());
            }
            Geometry::Triangle(triangle) => {
                let polygon = triangle.to_polygon();
                self.write_rings(out, polygon.exterior(), polygon.interiors());
            }
            Geometry::GeometryCollection(geometries) => {
                for g in geometries {
                    self.write_geometry(out, g);
                }
            }
        }
    }

    fn write_rings(
        &self,
        out: &mut String,
        exterior: &LineString<f64>,
        interiors: &[LineString<f64>],
    ) {
        self.write_line(out, &exterior.0, true);
        for ring in interiors {
            self.write_line(out, &ring.0, true);
        }
    }

    fn write_point(&self, out: &mut String, coord: Coord<f64>) {
        let [x, y] = self.projection.project(coord);
        let r = POINT_RADIUS;
        let _ = write!(
            out,
            "M{},{}m0,{}a{},{} 0 1,1 0,{}a{},{} 0 1,1 0,{}z",
            num(x),
            num(y),
            num(r),
            num(r),
            num(r),
            num(-2.0 * r),
            num(r),
            num(r),
            num(2.0 * r)
        );
    }

    /// Rings drop their repeated closing position and end with `Z`.
    fn write_line(&self, out: &mut String, coords: &[Coord<f64>], closed: bool) {
        let coords = match coords {
            [rest @ .., last] if closed && rest.first() == Some(last) => rest,
            all => all,
        };
        let Some((first, rest)) = coords.split_first() else {
            return;
        };

        let [x, y] = self.projection.project(*first);
        let _ = write!(out, "M{},{}", num(x), num(y));
        for c in rest {
            let [x, y] = self.projection.project(*c);
            let _ = write!(out, "L{},{}", num(x), num(y));
        }
        if closed {
            out.push('Z');
        }
    }
}

/// Round to three decimals and print without trailing zeros.
pub(crate) fn num(value: f64) -> String {
    let rounded = (value * 1000.0).round() / 1000.0;
    if rounded == 0.0 {
        "0".to_string()
    } else {
        format!("{rounded}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::geometry::{MultiPolygon, Point, Polygon};

    fn ring(coords: Vec<[f64; 2]>) -> Polygon<f64> {
        Polygon::new(LineString::from(coords), vec![])
    }

    fn identity_like() -> Mercator {
        // Scale chosen so one degree of longitude is one pixel at the equator.
        Mercator::new()
            .with_scale(180.0 / std::f64::consts::PI)
            .with_translate([0.0, 0.0])
    }

    #[test]
    fn test_line_string() {
        let projection = identity_like();
        let path = GeoPath::new(&projection);
        let d = path.path_data(&Geometry::LineString(LineString::from(vec![
            [0.0, 0.0],
            [10.0, 0.0],
        ])));
        assert_eq!(d, "M0,0L10,0");
    }

    #[test]
    fn test_polygon_drops_closing_point() {
        let projection = identity_like();
        let path = GeoPath::new(&projection);
        let d = path.path_data(&Geometry::Polygon(ring(vec![
            [0.0, 0.0],
            [10.0, 0.0],
            [20.0, 0.0],
            [0.0, 0.0],
        ])));
        assert_eq!(d, "M0,0L10,0L20,0Z");
    }

    #[test]
    fn test_multi_polygon_has_one_subpath_per_ring() {
        let projection = identity_like();
        let path = GeoPath::new(&projection);
        let square = ring(vec![[0.0, 0.0], [1.0, 0.0], [2.0, 0.0], [0.0, 0.0]]);
        let d = path.path_data(&Geometry::MultiPolygon(MultiPolygon(vec![
            square.clone(),
            square,
        ])));
        assert_eq!(d.matches('M').count(), 2);
        assert_eq!(d.matches('Z').count(), 2);
    }

    #[test]
    fn test_polygon_hole_is_own_subpath() {
        let projection = identity_like();
        let path = GeoPath::new(&projection);
        let polygon = Polygon::new(
            LineString::from(vec![[0.0, 0.0], [40.0, 0.0], [20.0, 0.0], [0.0, 0.0]]),
            vec![LineString::from(vec![
                [10.0, 0.0],
                [20.0, 0.0],
                [30.0, 0.0],
                [10.0, 0.0],
            ])],
        );
        let d = path.path_data(&Geometry::Polygon(polygon));
        assert_eq!(d, "M0,0L40,0L20,0ZM10,0L20,0L30,0Z");
    }

    #[test]
    fn test_point_is_circle() {
        let projection = identity_like();
        let path = GeoPath::new(&projection);
        let d = path.path_data(&Geometry::Point(Point::new(0.0, 0.0)));
        assert_eq!(d, "M0,0m0,4.5a4.5,4.5 0 1,1 0,-9a4.5,4.5 0 1,1 0,9z");
    }

    #[test]
    fn test_empty_line_is_empty_path() {
        let projection = identity_like();
        let path = GeoPath::new(&projection);
        assert_eq!(path.path_data(&Geometry::LineString(LineString::new(Vec::new()))), "");
    }

    #[test]
    fn test_num_formatting() {
        assert_eq!(num(1.23456), "1.235");
        assert_eq!(num(480.0), "480");
        assert_eq!(num(-0.0001), "0");
    }
}
