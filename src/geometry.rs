/// The closed set of geometric entity kinds accepted by the pipeline, and
/// their conversion into primitive buffers.
///
/// Conversion is a single match dispatch over the tagged variant so the
/// table of supported kinds stays colocated and statically checkable.
use serde::Deserialize;

use crate::buffer::PrimitiveBuffer;
use crate::color::Color;
use crate::display::DisplayMode;
use crate::error::Result;
use crate::tessellate;

/// The plane carrying an arc: origin, normal and x-axis.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Plane {
    pub o: [f64; 3],
    pub n: [f64; 3],
    pub x: [f64; 3],
}

/// A geometric primitive. 2-D kinds are embedded in 3-D at z = 0.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum Shape {
    Point3D {
        x: f64,
        y: f64,
        z: f64,
    },
    Point2D {
        x: f64,
        y: f64,
    },
    LineSegment3D {
        p: [f64; 3],
        v: [f64; 3],
    },
    LineSegment2D {
        p: [f64; 2],
        v: [f64; 2],
    },
    Polyline3D {
        vertices: Vec<[f64; 3]>,
    },
    Polyline2D {
        vertices: Vec<[f64; 2]>,
    },
    Polygon2D {
        vertices: Vec<[f64; 2]>,
    },
    Arc3D {
        plane: Plane,
        radius: f64,
        #[serde(default)]
        a1: f64,
        #[serde(default = "full_turn")]
        a2: f64,
    },
    Mesh3D {
        vertices: Vec<[f64; 3]>,
        faces: Vec<Vec<u32>>,
    },
    Mesh2D {
        vertices: Vec<[f64; 2]>,
        faces: Vec<Vec<u32>>,
    },
    /// A single planar face given by its boundary loop. Concave faces and
    /// faces with holes must be pre-triangulated into a mesh by the caller.
    Face3D {
        boundary: Vec<[f64; 3]>,
    },
    /// A solid given by a shared vertex pool and per-face index loops; only
    /// the outer loop of each face is used.
    Polyface3D {
        vertices: Vec<[f64; 3]>,
        face_indices: Vec<Vec<Vec<u32>>>,
    },
    Cone {
        vertex: [f64; 3],
        axis: [f64; 3],
        angle: f64,
    },
    Sphere {
        center: [f64; 3],
        radius: f64,
    },
    Cylinder {
        center: [f64; 3],
        axis: [f64; 3],
        radius: f64,
        height: f64,
    },
}

fn full_turn() -> f64 {
    2.0 * std::f64::consts::PI
}

fn embed(v: [f64; 2]) -> [f64; 3] {
    [v[0], v[1], 0.0]
}

impl Shape {
    /// Convert this shape to a primitive buffer.
    pub fn to_buffer(&self) -> Result<PrimitiveBuffer> {
        let buffer = match self {
            Shape::Point3D { x, y, z } => PrimitiveBuffer::from_points(vec![[*x, *y, *z]]),
            Shape::Point2D { x, y } => PrimitiveBuffer::from_points(vec![[*x, *y, 0.0]]),
            Shape::LineSegment3D { p, v } => PrimitiveBuffer::from_polyline(vec![
                *p,
                tessellate::add(*p, *v),
            ]),
            Shape::LineSegment2D { p, v } => PrimitiveBuffer::from_polyline(vec![
                embed(*p),
                embed([p[0] + v[0], p[1] + v[1]]),
            ]),
            Shape::Polyline3D { vertices } => PrimitiveBuffer::from_polyline(vertices.clone()),
            Shape::Polyline2D { vertices } => {
                PrimitiveBuffer::from_polyline(vertices.iter().copied().map(embed).collect())
            }
            Shape::Polygon2D { vertices } => {
                // close the loop back to the first vertex
                let mut pts: Vec<[f64; 3]> = vertices.iter().copied().map(embed).collect();
                if let Some(first) = pts.first().copied() {
                    pts.push(first);
                }
                PrimitiveBuffer::from_polyline(pts)
            }
            Shape::Arc3D {
                plane,
                radius,
                a1,
                a2,
            } => PrimitiveBuffer::from_polyline(tessellate::arc_points(
                plane.o, plane.n, plane.x, *radius, *a1, *a2,
            )),
            Shape::Mesh3D { vertices, faces } => {
                PrimitiveBuffer::from_mesh(vertices.clone(), faces.clone())
            }
            Shape::Mesh2D { vertices, faces } => PrimitiveBuffer::from_mesh(
                vertices.iter().copied().map(embed).collect(),
                faces.clone(),
            ),
            Shape::Face3D { boundary } => {
                let face = (0..boundary.len() as u32).collect();
                PrimitiveBuffer::from_mesh(boundary.clone(), vec![face])
            }
            Shape::Polyface3D {
                vertices,
                face_indices,
            } => {
                let faces = face_indices
                    .iter()
                    .filter_map(|loops| loops.first().cloned())
                    .collect();
                PrimitiveBuffer::from_mesh(vertices.clone(), faces)
            }
            Shape::Cone {
                vertex,
                axis,
                angle,
            } => {
                let (points, faces) = tessellate::cone_mesh(*vertex, *axis, *angle, true);
                PrimitiveBuffer::from_mesh(points, faces)
            }
            Shape::Sphere { center, radius } => {
                let (points, faces) = tessellate::sphere_mesh(*center, *radius);
                PrimitiveBuffer::from_mesh(points, faces)
            }
            Shape::Cylinder {
                center,
                axis,
                radius,
                height,
            } => {
                let (points, faces) =
                    tessellate::cylinder_mesh(*center, *axis, *radius, *height, true);
                PrimitiveBuffer::from_mesh(points, faces)
            }
        };
        Ok(buffer)
    }

    pub fn is_point(&self) -> bool {
        matches!(self, Shape::Point3D { .. } | Shape::Point2D { .. })
    }

    pub fn is_mesh(&self) -> bool {
        matches!(self, Shape::Mesh3D { .. } | Shape::Mesh2D { .. })
    }

    /// The coordinates of a point shape, if this is one.
    pub fn as_point(&self) -> Option<[f64; 3]> {
        match self {
            Shape::Point3D { x, y, z } => Some([*x, *y, *z]),
            Shape::Point2D { x, y } => Some([*x, *y, 0.0]),
            _ => None,
        }
    }

    /// Face count used when deriving the value-matching convention.
    pub fn face_count(&self) -> usize {
        match self {
            Shape::Mesh3D { faces, .. } | Shape::Mesh2D { faces, .. } => faces.len(),
            Shape::Polyface3D { face_indices, .. } => face_indices.len(),
            _ => 1,
        }
    }

    /// Vertex count used when deriving the value-matching convention.
    pub fn vertex_count(&self) -> usize {
        match self {
            Shape::Mesh3D { vertices, .. } | Shape::Polyface3D { vertices, .. } => vertices.len(),
            Shape::Mesh2D { vertices, .. } => vertices.len(),
            Shape::Polyline3D { vertices } => vertices.len(),
            Shape::Polyline2D { vertices } | Shape::Polygon2D { vertices } => vertices.len(),
            Shape::Point3D { .. } | Shape::Point2D { .. } => 1,
            Shape::LineSegment3D { .. } | Shape::LineSegment2D { .. } => 2,
            _ => 0,
        }
    }
}

/// Optional display payload carried by context entities. An entity either
/// has one or it does not; grouping logic checks presence explicitly.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct DisplayAttributes {
    #[serde(default)]
    pub color: Option<Color>,
    #[serde(default)]
    pub display_mode: Option<DisplayMode>,
}

/// A geometric entity as it appears in the visualization input: a shape
/// plus an optional display payload.
#[derive(Debug, Clone, Deserialize)]
pub struct Entity {
    #[serde(flatten)]
    pub shape: Shape,
    #[serde(default)]
    pub display: Option<DisplayAttributes>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_converts_to_single_vertex_cell() {
        let shape = Shape::Point3D {
            x: 1.0,
            y: 2.0,
            z: 3.0,
        };
        let buffer = shape.to_buffer().unwrap();
        assert_eq!(buffer.point_count(), 1);
        assert_eq!(buffer.cell_count(), 1);
        assert_eq!(buffer.verts().len(), 1);
    }

    #[test]
    fn polyline_converts_to_single_line_cell() {
        let shape = Shape::Polyline3D {
            vertices: vec![[0.0; 3], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0]],
        };
        let buffer = shape.to_buffer().unwrap();
        assert_eq!(buffer.lines().len(), 1);
        assert_eq!(buffer.lines()[0].len(), 3);
    }

    #[test]
    fn polygon_closes_its_loop() {
        let shape = Shape::Polygon2D {
            vertices: vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0]],
        };
        let buffer = shape.to_buffer().unwrap();
        assert_eq!(buffer.point_count(), 4);
        assert_eq!(buffer.points()[3], buffer.points()[0]);
    }

    #[test]
    fn mesh_converts_one_poly_cell_per_face() {
        let shape = Shape::Mesh3D {
            vertices: vec![[0.0; 3], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0], [0.0, 1.0, 0.0]],
            faces: vec![vec![0, 1, 2], vec![0, 2, 3]],
        };
        let buffer = shape.to_buffer().unwrap();
        assert_eq!(buffer.polys().len(), 2);
        assert_eq!(buffer.cell_count(), 2);
        assert_eq!(shape.face_count(), 2);
        assert_eq!(shape.vertex_count(), 4);
    }

    #[test]
    fn polyface_uses_outer_loops_only() {
        let shape = Shape::Polyface3D {
            vertices: vec![[0.0; 3], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0], [0.0, 1.0, 0.0]],
            face_indices: vec![vec![vec![0, 1, 2]], vec![vec![0, 2, 3], vec![1, 2, 3]]],
        };
        let buffer = shape.to_buffer().unwrap();
        assert_eq!(buffer.polys().len(), 2);
    }

    #[test]
    fn sphere_tessellates_to_faces() {
        let shape = Shape::Sphere {
            center: [0.0; 3],
            radius: 1.0,
        };
        let buffer = shape.to_buffer().unwrap();
        assert!(buffer.polys().len() > 100);
    }

    #[test]
    fn entity_deserializes_with_optional_display_payload() {
        let entity: Entity = serde_json::from_str(
            r#"{
                "type": "Point3D", "x": 0, "y": 0, "z": 0,
                "display": {"color": {"r": 255, "g": 0, "b": 0}, "display_mode": "Points"}
            }"#,
        )
        .unwrap();
        let display = entity.display.unwrap();
        assert_eq!(display.color.unwrap().r, 255);
        assert_eq!(display.display_mode, Some(DisplayMode::Points));

        let bare: Entity =
            serde_json::from_str(r#"{"type": "Point3D", "x": 0, "y": 11, "z": 0}"#).unwrap();
        assert!(bare.display.is_none());
    }
}
