// Copyright 2025 the Vizdeck Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! TopoJSON decoding into pre-projected [`GeoFeature`]s.
//!
//! Only what the choropleth needs is supported: polygonal geometries (optionally nested in
//! geometry collections), delta-encoded arcs under a `transform`, and raw arcs without one.
//! Point and line geometries are skipped.

use kurbo::Point;
use serde::Deserialize;
use serde_json::Value;
use vizdeck_core::{GeoFeature, Polygon, Ring};

use crate::{NormalizeError, decode, field};

#[derive(Debug, Deserialize)]
struct Transform {
    scale: [f64; 2],
    translate: [f64; 2],
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum Geometry {
    GeometryCollection {
        geometries: Vec<Geometry>,
    },
    Polygon {
        #[serde(default)]
        id: Option<Value>,
        arcs: Vec<Vec<i64>>,
    },
    MultiPolygon {
        #[serde(default)]
        id: Option<Value>,
        arcs: Vec<Vec<Vec<i64>>>,
    },
    #[serde(other)]
    Unsupported,
}

/// Decoded arcs in absolute coordinates.
struct Arcs(Vec<Vec<Point>>);

impl Arcs {
    fn decode(
        raw: Vec<Vec<Vec<f64>>>,
        transform: Option<&Transform>,
    ) -> Result<Self, NormalizeError> {
        let mut arcs = Vec::with_capacity(raw.len());
        for (row, arc) in raw.into_iter().enumerate() {
            let mut points = Vec::with_capacity(arc.len());
            let (mut x, mut y) = (0.0, 0.0);
            for position in arc {
                let &[px, py, ..] = position.as_slice() else {
                    return Err(NormalizeError::InvalidRow {
                        row,
                        reason: "arc position needs at least two coordinates".into(),
                    });
                };
                points.push(match transform {
                    Some(t) => {
                        x += px;
                        y += py;
                        Point::new(
                            x * t.scale[0] + t.translate[0],
                            y * t.scale[1] + t.translate[1],
                        )
                    }
                    None => Point::new(px, py),
                });
            }
            arcs.push(points);
        }
        Ok(Self(arcs))
    }

    /// Stitches arc references into a ring; negative references walk an arc backwards.
    fn ring(&self, refs: &[i64]) -> Result<Ring, NormalizeError> {
        let mut ring: Ring = Vec::new();
        for &r in refs {
            let (index, reversed) = if r < 0 { (!r, true) } else { (r, false) };
            let arc = usize::try_from(index)
                .ok()
                .and_then(|i| self.0.get(i))
                .ok_or(NormalizeError::ArcOutOfRange {
                    index: r,
                    len: self.0.len(),
                })?;
            // Consecutive arcs share their joining point.
            ring.pop();
            if reversed {
                ring.extend(arc.iter().rev().copied());
            } else {
                ring.extend(arc.iter().copied());
            }
        }
        Ok(ring)
    }

    fn polygon(&self, rings: &[Vec<i64>]) -> Result<Polygon, NormalizeError> {
        Ok(Polygon {
            rings: rings
                .iter()
                .map(|refs| self.ring(refs))
                .collect::<Result<_, _>>()?,
        })
    }
}

fn feature_id(id: Option<&Value>) -> Option<u32> {
    match id? {
        Value::Number(n) => n.as_u64().and_then(|v| u32::try_from(v).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn collect(
    geometry: Geometry,
    arcs: &Arcs,
    out: &mut Vec<GeoFeature>,
) -> Result<(), NormalizeError> {
    let (id, polygons) = match geometry {
        Geometry::GeometryCollection { geometries } => {
            for g in geometries {
                collect(g, arcs, out)?;
            }
            return Ok(());
        }
        Geometry::Polygon { id, arcs: rings } => (id, vec![arcs.polygon(&rings)?]),
        Geometry::MultiPolygon { id, arcs: polys } => (
            id,
            polys
                .iter()
                .map(|rings| arcs.polygon(rings))
                .collect::<Result<_, _>>()?,
        ),
        Geometry::Unsupported => return Ok(()),
    };
    match feature_id(id.as_ref()) {
        Some(id) => out.push(GeoFeature::new(id, polygons)),
        None => tracing::warn!(?id, "skipping geometry without a numeric id"),
    }
    Ok(())
}

/// Decodes the polygonal features of topology object `object` (e.g. `"counties"`).
pub fn decode_topology(payload: &Value, object: &str) -> Result<Vec<GeoFeature>, NormalizeError> {
    let objects = field(payload, "objects")?;
    let geometry = objects
        .get(object)
        .ok_or_else(|| NormalizeError::MissingObject {
            name: object.to_owned(),
        })?;
    let geometry: Geometry = decode(geometry, "objects")?;

    let transform: Option<Transform> = match payload.get("transform") {
        Some(t) if !t.is_null() => Some(decode(t, "transform")?),
        _ => None,
    };
    let raw_arcs: Vec<Vec<Vec<f64>>> = decode(field(payload, "arcs")?, "arcs")?;
    let arcs = Arcs::decode(raw_arcs, transform.as_ref())?;

    let mut features = Vec::new();
    collect(geometry, &arcs, &mut features)?;
    tracing::debug!(object, features = features.len(), "decoded topology");
    Ok(features)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn square_topology() -> Value {
        // Two unit squares sharing the edge x = 1, split into three arcs.
        json!({
            "type": "Topology",
            "objects": {
                "counties": {
                    "type": "GeometryCollection",
                    "geometries": [
                        {"type": "Polygon", "id": 1001, "arcs": [[0, -2]]},
                        {"type": "MultiPolygon", "id": "01003", "arcs": [[[1, -3]]]},
                        {"type": "Point", "id": 9, "coordinates": [0, 0]},
                        {"type": "Polygon", "arcs": [[0, -2]]}
                    ]
                }
            },
            "arcs": [
                [[1, 0], [0, 0], [0, 1], [1, 1]],
                [[1, 0], [1, 1]],
                [[1, 0], [2, 0], [2, 1], [1, 1]]
            ]
        })
    }

    #[test]
    fn stitches_arcs_and_walks_negative_references_backwards() {
        let features = decode_topology(&square_topology(), "counties").unwrap();
        assert_eq!(features.len(), 2, "point and id-less geometries are skipped");

        let left = &features[0];
        assert_eq!(left.id(), 1001);
        let ring = &left.polygons()[0].rings[0];
        assert_eq!(
            ring,
            &vec![
                Point::new(1.0, 0.0),
                Point::new(0.0, 0.0),
                Point::new(0.0, 1.0),
                Point::new(1.0, 1.0),
                Point::new(1.0, 0.0),
            ]
        );

        let right = &features[1];
        assert_eq!(right.id(), 1003);
        let ring = &right.polygons()[0].rings[0];
        assert_eq!(
            ring,
            &vec![
                Point::new(1.0, 0.0),
                Point::new(1.0, 1.0),
                Point::new(2.0, 1.0),
                Point::new(2.0, 0.0),
                Point::new(1.0, 0.0),
            ]
        );
    }

    #[test]
    fn quantized_arcs_are_delta_decoded() {
        let topo = json!({
            "type": "Topology",
            "transform": {"scale": [2.0, 0.5], "translate": [10.0, 20.0]},
            "objects": {"counties": {"type": "Polygon", "id": 7, "arcs": [[0]]}},
            "arcs": [[[0, 0], [3, 0], [0, 4], [-3, -4]]]
        });
        let features = decode_topology(&topo, "counties").unwrap();
        let ring = &features[0].polygons()[0].rings[0];
        assert_eq!(
            ring,
            &vec![
                Point::new(10.0, 20.0),
                Point::new(16.0, 20.0),
                Point::new(16.0, 22.0),
                Point::new(10.0, 20.0),
            ]
        );
    }

    #[test]
    fn structural_problems_are_reported() {
        let err = decode_topology(&square_topology(), "states").unwrap_err();
        assert!(matches!(err, NormalizeError::MissingObject { .. }));

        let err = decode_topology(&json!({"arcs": []}), "counties").unwrap_err();
        assert!(matches!(err, NormalizeError::MissingField { field: "objects" }));

        let topo = json!({
            "objects": {"counties": {"type": "Polygon", "id": 1, "arcs": [[5]]}},
            "arcs": []
        });
        let err = decode_topology(&topo, "counties").unwrap_err();
        assert!(matches!(err, NormalizeError::ArcOutOfRange { index: 5, len: 0 }));
    }
}
