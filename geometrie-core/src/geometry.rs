/// Geometry primitives for 3D rendering
use nalgebra::{Point3, Vector3};
use std::f32::consts::TAU;

/// A 3D vertex with position and normal
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    pub position: Point3<f32>,
    pub normal: Vector3<f32>,
}

impl Vertex {
    pub fn new(x: f32, y: f32, z: f32, nx: f32, ny: f32, nz: f32) -> Self {
        Self {
            position: Point3::new(x, y, z),
            normal: Vector3::new(nx, ny, nz),
        }
    }

    pub fn from_parts(position: Point3<f32>, normal: Vector3<f32>) -> Self {
        Self { position, normal }
    }
}

/// A triangle face defined by three vertices
#[derive(Debug, Clone)]
pub struct Triangle {
    pub vertices: [Vertex; 3],
}

impl Triangle {
    pub fn new(v0: Vertex, v1: Vertex, v2: Vertex) -> Self {
        Self {
            vertices: [v0, v1, v2],
        }
    }

    /// Calculate the face normal from the triangle's vertices
    pub fn calculate_normal(&self) -> Vector3<f32> {
        let v0 = self.vertices[0].position;
        let v1 = self.vertices[1].position;
        let v2 = self.vertices[2].position;

        let edge1 = v1 - v0;
        let edge2 = v2 - v0;

        edge1.cross(&edge2).normalize()
    }
}

/// A 3D mesh composed of triangles
#[derive(Debug, Clone)]
pub struct Mesh {
    pub triangles: Vec<Triangle>,
}

impl Mesh {
    pub fn new() -> Self {
        Self {
            triangles: Vec::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            triangles: Vec::with_capacity(capacity),
        }
    }

    pub fn add_triangle(&mut self, triangle: Triangle) {
        self.triangles.push(triangle);
    }

    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Closed torus lying in the XY plane, centered on the origin.
    ///
    /// `radius` is the distance from the center to the middle of the tube,
    /// `tube` the tube radius. The ring is split into `tubular_segments`
    /// sections, each tube cross-section into `radial_segments`.
    pub fn torus(radius: f32, tube: f32, radial_segments: usize, tubular_segments: usize) -> Self {
        let radial_segments = radial_segments.max(2);
        let tubular_segments = tubular_segments.max(3);

        // Seam vertices are shared through modular indexing, so coincident
        // corners are bit-identical.
        let mut grid = Vec::with_capacity(radial_segments * tubular_segments);
        for j in 0..radial_segments {
            let v = j as f32 / radial_segments as f32 * TAU;
            for i in 0..tubular_segments {
                let u = i as f32 / tubular_segments as f32 * TAU;
                let position = Point3::new(
                    (radius + tube * v.cos()) * u.cos(),
                    (radius + tube * v.cos()) * u.sin(),
                    tube * v.sin(),
                );
                let center = Point3::new(radius * u.cos(), radius * u.sin(), 0.0);
                grid.push(Vertex::from_parts(position, (position - center).normalize()));
            }
        }

        let at = |j: usize, i: usize| grid[(j % radial_segments) * tubular_segments + (i % tubular_segments)];

        let mut mesh = Self::with_capacity(2 * radial_segments * tubular_segments);
        for j in 1..=radial_segments {
            for i in 1..=tubular_segments {
                let a = at(j, i - 1);
                let b = at(j - 1, i - 1);
                let c = at(j - 1, i);
                let d = at(j, i);

                mesh.add_triangle(Triangle::new(a, b, d));
                mesh.add_triangle(Triangle::new(b, c, d));
            }
        }

        mesh
    }

    /// Octahedron inscribed in a sphere of `radius`.
    ///
    /// With `detail > 0` every face is split into `(detail + 1)^2`
    /// triangles and the new vertices are pushed out onto the sphere.
    pub fn octahedron(radius: f32, detail: usize) -> Self {
        const CORNERS: [[f32; 3]; 6] = [
            [1.0, 0.0, 0.0],
            [-1.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            [0.0, -1.0, 0.0],
            [0.0, 0.0, 1.0],
            [0.0, 0.0, -1.0],
        ];
        const FACES: [[usize; 3]; 8] = [
            [0, 2, 4],
            [0, 4, 3],
            [0, 3, 5],
            [0, 5, 2],
            [1, 2, 5],
            [1, 5, 3],
            [1, 3, 4],
            [1, 4, 2],
        ];

        let corner = |index: usize| {
            let [x, y, z] = CORNERS[index];
            Vector3::new(x, y, z)
        };

        let cols = detail + 1;
        let mut mesh = Self::with_capacity(FACES.len() * cols * cols);

        for face in FACES {
            let (a, b, c) = (corner(face[0]), corner(face[1]), corner(face[2]));

            // rows[i][j] walks from edge a-b towards corner c
            let mut rows: Vec<Vec<Vector3<f32>>> = Vec::with_capacity(cols + 1);
            for i in 0..=cols {
                let t = i as f32 / cols as f32;
                let aj = a.lerp(&c, t);
                let bj = b.lerp(&c, t);
                let steps = cols - i;
                let row = (0..=steps)
                    .map(|j| {
                        if steps == 0 {
                            aj
                        } else {
                            aj.lerp(&bj, j as f32 / steps as f32)
                        }
                    })
                    .collect();
                rows.push(row);
            }

            for i in 0..cols {
                for j in 0..(2 * (cols - i) - 1) {
                    let k = j / 2;
                    let corners = if j % 2 == 0 {
                        [rows[i][k + 1], rows[i + 1][k], rows[i][k]]
                    } else {
                        [rows[i][k + 1], rows[i + 1][k + 1], rows[i + 1][k]]
                    };
                    mesh.add_triangle(spherical_triangle(corners, radius, detail == 0));
                }
            }
        }

        mesh
    }
}

/// Project the corners onto the sphere and attach flat or smooth normals
fn spherical_triangle(corners: [Vector3<f32>; 3], radius: f32, flat: bool) -> Triangle {
    let positions = corners.map(|corner| Point3::from(corner.normalize() * radius));
    let face_normal = (positions[1] - positions[0])
        .cross(&(positions[2] - positions[0]))
        .normalize();

    let vertex = |position: Point3<f32>| {
        let normal = if flat { face_normal } else { position.coords.normalize() };
        Vertex::from_parts(position, normal)
    };

    Triangle::new(vertex(positions[0]), vertex(positions[1]), vertex(positions[2]))
}

impl Default for Mesh {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_torus_triangle_count() {
        let torus = Mesh::torus(3.0, 0.6, 10, 35);
        assert_eq!(torus.len(), 2 * 10 * 35);
    }

    #[test]
    fn test_torus_vertices_lie_on_tube() {
        let torus = Mesh::torus(3.0, 0.6, 10, 35);
        for triangle in &torus.triangles {
            for vertex in &triangle.vertices {
                let p = vertex.position;
                let ring = (p.x * p.x + p.y * p.y).sqrt() - 3.0;
                let distance = (ring * ring + p.z * p.z).sqrt();
                assert!((distance - 0.6).abs() < 1e-4);
                assert!((vertex.normal.norm() - 1.0).abs() < 1e-4);
            }
        }
    }

    #[test]
    fn test_octahedron_base_shape() {
        let octahedron = Mesh::octahedron(1.3, 0);
        assert_eq!(octahedron.len(), 8);
        for triangle in &octahedron.triangles {
            let normal = triangle.calculate_normal();
            for vertex in &triangle.vertices {
                assert!((vertex.position.coords.norm() - 1.3).abs() < 1e-5);
                // flat shading, outward facing
                assert!((vertex.normal - normal).norm() < 1e-5);
                assert!(vertex.normal.dot(&vertex.position.coords) > 0.0);
            }
        }
    }

    #[test]
    fn test_octahedron_subdivision() {
        let octahedron = Mesh::octahedron(2.0, 2);
        assert_eq!(octahedron.len(), 8 * 9);
        for triangle in &octahedron.triangles {
            for vertex in &triangle.vertices {
                assert!((vertex.position.coords.norm() - 2.0).abs() < 1e-5);
            }
        }
    }
}
