/// Edge sets derived from triangle meshes
use nalgebra::Point3;
use std::collections::HashSet;

use crate::geometry::Mesh;

/// Positions closer than this are treated as the same corner
const WELD_EPSILON: f32 = 1e-4;

/// A line segment between two points in model space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    pub start: Point3<f32>,
    pub end: Point3<f32>,
}

/// The line-segment skeleton of a mesh
#[derive(Debug, Clone, Default)]
pub struct Wireframe {
    pub edges: Vec<Edge>,
}

type CornerKey = (i64, i64, i64);

fn corner_key(point: &Point3<f32>) -> CornerKey {
    let q = |v: f32| (v / WELD_EPSILON).round() as i64;
    (q(point.x), q(point.y), q(point.z))
}

impl Wireframe {
    /// Collect each undirected triangle edge exactly once
    pub fn from_mesh(mesh: &Mesh) -> Self {
        let mut seen: HashSet<(CornerKey, CornerKey)> = HashSet::new();
        let mut edges = Vec::new();

        for triangle in &mesh.triangles {
            for (a, b) in [(0, 1), (1, 2), (2, 0)] {
                let start = triangle.vertices[a].position;
                let end = triangle.vertices[b].position;
                let (ka, kb) = (corner_key(&start), corner_key(&end));
                if ka == kb {
                    continue;
                }
                let key = if ka < kb { (ka, kb) } else { (kb, ka) };
                if seen.insert(key) {
                    edges.push(Edge { start, end });
                }
            }
        }

        Self { edges }
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_octahedron_edges() {
        let wireframe = Wireframe::from_mesh(&Mesh::octahedron(1.3, 0));
        assert_eq!(wireframe.len(), 12);
    }

    #[test]
    fn test_torus_edges() {
        // Each grid cell contributes two sides and one diagonal
        let wireframe = Wireframe::from_mesh(&Mesh::torus(3.0, 0.6, 10, 35));
        assert_eq!(wireframe.len(), 3 * 10 * 35);
    }

    #[test]
    fn test_empty_mesh() {
        assert!(Wireframe::from_mesh(&Mesh::new()).is_empty());
    }
}
