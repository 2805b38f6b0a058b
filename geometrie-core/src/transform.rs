/// Node rotation and the object-to-world matrix
use nalgebra::{Matrix4, Point3, Vector3};

/// Euler angles in radians, applied intrinsically in X, Y, Z order
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RotationState {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl RotationState {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn zero() -> Self {
        Self::default()
    }

    pub fn rotate(&mut self, dx: f32, dy: f32, dz: f32) {
        self.x += dx;
        self.y += dy;
        self.z += dz;
    }

    pub fn matrix(&self) -> Matrix4<f32> {
        let axis = |x, y, z| Matrix4::new_rotation(Vector3::new(x, y, z));
        axis(self.x, 0.0, 0.0) * axis(0.0, self.y, 0.0) * axis(0.0, 0.0, self.z)
    }
}

/// Rotate in place, then move to `position`
pub fn model_matrix(position: &Point3<f32>, rotation: &RotationState) -> Matrix4<f32> {
    Matrix4::new_translation(&position.coords) * rotation.matrix()
}
