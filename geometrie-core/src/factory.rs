/// Construction of the two shapes and the camera that frames them
use nalgebra::Point3;

use crate::color::Color;
use crate::geometry::Mesh;
use crate::material::Material;
use crate::projection::Camera;
use crate::scene::Node;
use crate::viewport::SurfaceSize;
use crate::wireframe::Wireframe;

pub const BASE_COLOR: Color = Color::from_hex(0x352935);

pub const TORUS_RADIUS: f32 = 3.0;
pub const TORUS_TUBE: f32 = 0.6;
pub const TORUS_RADIAL_SEGMENTS: usize = 10;
pub const TORUS_TUBULAR_SEGMENTS: usize = 35;
pub const TORUS_WIRE_OPACITY: f32 = 0.39;

pub const OCTAHEDRON_RADIUS: f32 = 1.3;
pub const OCTAHEDRON_DETAIL: usize = 0;
pub const OCTAHEDRON_WIRE_OPACITY: f32 = 0.75;

pub const CAMERA_FOV: f32 = 75.0;
pub const CAMERA_NEAR: f32 = 0.1;
pub const CAMERA_FAR: f32 = 1000.0;
pub const CAMERA_POSITION: [f32; 3] = [1.0, 1.0, 6.0];

/// A solid mesh and the wireframe drawn over it
#[derive(Debug, Clone)]
pub struct Shape {
    pub solid: Node,
    pub overlay: Node,
}

impl Shape {
    fn new(mesh: Mesh, color: Color, wire_opacity: f32) -> Self {
        let wireframe = Wireframe::from_mesh(&mesh);
        Self {
            solid: Node::mesh(mesh, Material::basic(color)),
            overlay: Node::lines(wireframe, Material::overlay_lines(wire_opacity)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ModelBundle {
    /// Torus
    pub primary: Shape,
    /// Octahedron
    pub secondary: Shape,
}

impl ModelBundle {
    /// Where the model sits in world space
    pub fn position(&self) -> Point3<f32> {
        self.primary.solid.position
    }
}

/// Build a fresh torus/octahedron pair.
///
/// Every call allocates new geometry; callers should build once and share
/// the position with [`build_camera`].
pub fn build_model() -> ModelBundle {
    ModelBundle {
        primary: Shape::new(
            Mesh::torus(TORUS_RADIUS, TORUS_TUBE, TORUS_RADIAL_SEGMENTS, TORUS_TUBULAR_SEGMENTS),
            BASE_COLOR,
            TORUS_WIRE_OPACITY,
        ),
        secondary: Shape::new(
            Mesh::octahedron(OCTAHEDRON_RADIUS, OCTAHEDRON_DETAIL),
            BASE_COLOR,
            OCTAHEDRON_WIRE_OPACITY,
        ),
    }
}

/// Perspective camera for `surface`, looking at `look_at`
pub fn build_camera(surface: SurfaceSize, look_at: Point3<f32>) -> Camera {
    let mut camera = Camera::perspective(CAMERA_FOV, surface.aspect(), CAMERA_NEAR, CAMERA_FAR);
    let [x, y, z] = CAMERA_POSITION;
    camera.position = Point3::new(x, y, z);
    camera.look_at(look_at);
    camera
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::NodeKind;

    #[test]
    fn test_model_parameters() {
        let model = build_model();

        match &model.primary.solid.kind {
            NodeKind::Mesh(mesh) => assert_eq!(mesh.len(), 2 * 10 * 35),
            other => panic!("unexpected node {:?}", other),
        }
        match &model.secondary.overlay.kind {
            NodeKind::Lines(wireframe) => assert_eq!(wireframe.len(), 12),
            other => panic!("unexpected node {:?}", other),
        }

        assert_eq!(model.primary.solid.material.color, BASE_COLOR);
        assert_eq!(model.secondary.solid.material.color, BASE_COLOR);
        assert_eq!(model.primary.overlay.material.opacity, 0.39);
        assert_eq!(model.secondary.overlay.material.opacity, 0.75);
        assert!(!model.primary.overlay.material.depth_test);
        assert!(model.secondary.overlay.material.transparent);
    }

    #[test]
    fn test_camera_aspect_matches_surface() {
        for (width, height) in [(800, 600), (1, 1), (1920, 1080), (333, 777)] {
            let camera = build_camera(SurfaceSize::new(width, height).unwrap(), Point3::origin());
            assert_eq!(camera.aspect, width as f32 / height as f32);
        }
    }

    #[test]
    fn test_camera_looks_at_given_position() {
        let target = Point3::new(0.5, -1.0, 2.0);
        let camera = build_camera(SurfaceSize::new(640, 480).unwrap(), target);
        assert_eq!(camera.target, target);
        assert_eq!(camera.position, Point3::new(1.0, 1.0, 6.0));
        assert_eq!(camera.fov, 75.0);
        assert_eq!(camera.near, 0.1);
        assert_eq!(camera.far, 1000.0);
    }
}
