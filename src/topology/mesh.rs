//! Boundary mesh: every arc of an object emitted once.
//!
//! Shared borders appear in two polygons but only once in the mesh, so
//! stroking the mesh draws each border a single time. Arcs that meet end to
//! start are stitched into longer lines.

use std::collections::{HashMap, HashSet, VecDeque};

use super::feature::line;
use super::{TopoObject, Topology, arc_slot};
use crate::error::AtlasError;
use crate::geo::{Geometry, LineString, MultiLineString, Position};

/// Build the mesh of `object` as a `MultiLineString`.
pub fn mesh(topology: &Topology, object: &TopoObject) -> Result<Geometry<f64>, AtlasError> {
    let arcs = distinct_arcs(object);
    let lines = stitch(topology, &arcs)?
        .into_iter()
        .map(|mut fragment| line(topology, fragment.make_contiguous()).map(LineString::from))
        .collect::<Result<_, _>>()?;
    Ok(Geometry::MultiLineString(MultiLineString(lines)))
}

impl Topology {
    /// Mesh of the named object.
    pub fn mesh(&self, name: &str) -> Result<Geometry<f64>, AtlasError> {
        mesh(self, self.object(name)?)
    }
}

/// Arc references of `object`, first occurrence of each arc only.
fn distinct_arcs(object: &TopoObject) -> Vec<i64> {
    let mut seen = HashSet::new();
    let mut arcs = Vec::new();
    object.shape.for_each_arc(&mut |i| {
        if seen.insert(arc_slot(i)) {
            arcs.push(i);
        }
    });
    arcs
}

type EndKey = (u64, u64);

fn key(p: Position) -> EndKey {
    (p[0].to_bits(), p[1].to_bits())
}

struct Fragment {
    arcs: VecDeque<i64>,
    start: EndKey,
    end: EndKey,
}

/// Chain arcs whose endpoints coincide.
fn stitch(topology: &Topology, arcs: &[i64]) -> Result<Vec<VecDeque<i64>>, AtlasError> {
    let mut fragments: Vec<Option<Fragment>> = Vec::new();
    let mut by_start: HashMap<EndKey, usize> = HashMap::new();
    let mut by_end: HashMap<EndKey, usize> = HashMap::new();

    for &arc in arcs {
        let (start, end) = topology.arc_ends(arc)?;
        let (start, end) = (key(start), key(end));

        if let Some(f) = by_end.remove(&start) {
            // Extend fragment f forwards.
            let Some(frag) = fragments[f].as_mut() else {
                continue;
            };
            frag.arcs.push_back(arc);
            frag.end = end;

            match by_start.remove(&end) {
                Some(g) if g != f => {
                    let Some(tail) = fragments[g].take() else {
                        continue;
                    };
                    let Some(frag) = fragments[f].as_mut() else {
                        continue;
                    };
                    frag.arcs.extend(tail.arcs);
                    frag.end = tail.end;
                    by_start.insert(frag.start, f);
                    by_end.insert(frag.end, f);
                }
                _ => {
                    by_start.insert(frag.start, f);
                    by_end.insert(frag.end, f);
                }
            }
        } else if let Some(f) = by_start.remove(&end) {
            // Extend fragment f backwards.
            let Some(frag) = fragments[f].as_mut() else {
                continue;
            };
            frag.arcs.push_front(arc);
            frag.start = start;

            match by_end.remove(&start) {
                Some(g) if g != f => {
                    let Some(head) = fragments[f].take() else {
                        continue;
                    };
                    let Some(frag) = fragments[g].as_mut() else {
                        continue;
                    };
                    frag.arcs.extend(head.arcs);
                    frag.end = head.end;
                    by_start.insert(frag.start, g);
                    by_end.insert(frag.end, g);
                }
                _ => {
                    by_start.insert(frag.start, f);
                    by_end.insert(frag.end, f);
                }
            }
        } else {
            let index = fragments.len();
            fragments.push(Some(Fragment {
                arcs: VecDeque::from([arc]),
                start,
                end,
            }));
            by_start.insert(start, index);
            by_end.insert(end, index);
        }
    }

    Ok(fragments.into_iter().flatten().map(|f| f.arcs).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::tests::TWO_SQUARES;

    fn lines(geometry: Geometry<f64>) -> Vec<LineString<f64>> {
        match geometry {
            Geometry::MultiLineString(lines) => lines.0,
            other => panic!("expected a MultiLineString, got {other:?}"),
        }
    }

    #[test]
    fn test_shared_border_appears_once() {
        let topology = Topology::from_json(TWO_SQUARES).unwrap();
        let countries = topology.object("countries").unwrap();
        assert_eq!(distinct_arcs(countries), vec![0, 1, 2]);

        let mesh_lines = lines(topology.mesh("countries").unwrap());
        let total_segments: usize = mesh_lines.iter().map(|l| l.0.len() - 1).sum();
        // 1 shared edge + 3 + 3 outer edges.
        assert_eq!(total_segments, 7);
    }

    #[test]
    fn test_connected_arcs_are_stitched() {
        let topology = Topology::from_json(TWO_SQUARES).unwrap();
        // Arc 0 ends at (1,1) where arc 1 starts, and arc 1 ends at (1,0)
        // where arc 2 starts: all three chain into one line.
        let fragments = stitch(&topology, &[0, 1, 2]).unwrap();
        assert_eq!(fragments.len(), 1);
        assert_eq!(fragments[0], VecDeque::from([0, 1, 2]));
    }

    #[test]
    fn test_every_arc_lands_in_one_fragment() {
        let topology = Topology::from_json(TWO_SQUARES).unwrap();
        // Arcs 0 and 2 share both endpoints, so arc 1 can only close one of
        // them into a ring; the other stays on its own.
        let fragments = stitch(&topology, &[0, 2, 1]).unwrap();
        let total: usize = fragments.iter().map(|f| f.len()).sum();
        assert_eq!(total, 3);
        assert_eq!(fragments.len(), 2);
    }

    #[test]
    fn test_disjoint_arcs_stay_separate() {
        let topology = Topology::from_json(
            r#"{"type": "Topology",
                "arcs": [[[0, 0], [1, 0]], [[5, 5], [6, 6]]],
                "objects": {"lines": {"type": "MultiLineString", "arcs": [[0], [1]]}}}"#,
        )
        .unwrap();
        let mesh_lines = lines(topology.mesh("lines").unwrap());
        assert_eq!(mesh_lines.len(), 2);
    }
}
