/// Camera and projection utilities
use nalgebra::{Matrix4, Point3, Vector3, Vector4};

/// A projected point: pixel coordinates plus normalized depth in `[-1, 1]`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenPoint {
    pub x: f32,
    pub y: f32,
    pub depth: f32,
}

/// Perspective camera configuration for 3D rendering
#[derive(Debug, Clone)]
pub struct Camera {
    pub position: Point3<f32>,
    pub target: Point3<f32>,
    pub up: Vector3<f32>,
    /// Vertical field of view in degrees
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    projection: Matrix4<f32>,
}

impl Camera {
    pub fn perspective(fov: f32, aspect: f32, near: f32, far: f32) -> Self {
        let mut camera = Self {
            position: Point3::origin(),
            target: Point3::new(0.0, 0.0, -1.0),
            up: Vector3::y(),
            fov,
            aspect,
            near,
            far,
            projection: Matrix4::identity(),
        };
        camera.update_projection_matrix();
        camera
    }

    /// Point the camera at `target`, keeping its position
    pub fn look_at(&mut self, target: Point3<f32>) {
        self.target = target;
    }

    /// Change the aspect ratio. The projection matrix is not touched until
    /// [`Camera::update_projection_matrix`] runs.
    pub fn set_aspect(&mut self, aspect: f32) {
        self.aspect = aspect;
    }

    pub fn update_projection_matrix(&mut self) {
        self.projection =
            Matrix4::new_perspective(self.aspect, self.fov.to_radians(), self.near, self.far);
    }

    /// Create the view matrix (camera transformation)
    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(&self.position, &self.target, &self.up)
    }

    /// The projection matrix as of the last update
    pub fn projection_matrix(&self) -> &Matrix4<f32> {
        &self.projection
    }

    pub fn view_projection(&self) -> Matrix4<f32> {
        self.projection * self.view_matrix()
    }

    /// World-space (right, up, forward) unit vectors of the camera
    pub fn basis(&self) -> (Vector3<f32>, Vector3<f32>, Vector3<f32>) {
        let forward = (self.target - self.position).normalize();
        let right = forward.cross(&self.up).normalize();
        let up = right.cross(&forward);
        (right, up, forward)
    }

    pub fn distance_to_target(&self) -> f32 {
        (self.position - self.target).norm()
    }

    /// Project a 3D point to screen space.
    ///
    /// `view_projection` is the combined matrix for the current frame. Points
    /// behind the camera or beyond the clip range yield `None`; points off
    /// the sides of the screen are still returned so edges can be clipped
    /// by the rasterizer.
    pub fn project_to_screen(
        view_projection: &Matrix4<f32>,
        point: &Point3<f32>,
        model_matrix: &Matrix4<f32>,
        width: u32,
        height: u32,
    ) -> Option<ScreenPoint> {
        let clip: Vector4<f32> = view_projection * model_matrix * point.to_homogeneous();

        // Prevent division by near-zero depth values
        if clip.w < 1e-6 {
            return None;
        }

        let ndc_x = clip.x / clip.w;
        let ndc_y = clip.y / clip.w;
        let depth = clip.z / clip.w;

        if !(-1.0..=1.0).contains(&depth) {
            return None;
        }

        // Convert to screen space
        Some(ScreenPoint {
            x: (ndc_x + 1.0) * 0.5 * width as f32,
            y: (1.0 - ndc_y) * 0.5 * height as f32,
            depth,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera() -> Camera {
        let mut camera = Camera::perspective(75.0, 800.0 / 600.0, 0.1, 1000.0);
        camera.position = Point3::new(0.0, 0.0, 5.0);
        camera.look_at(Point3::origin());
        camera
    }

    #[test]
    fn test_camera_creation() {
        let camera = camera();
        assert!((camera.aspect - 800.0 / 600.0).abs() < 1e-6);
        let expected = Matrix4::new_perspective(800.0 / 600.0, 75f32.to_radians(), 0.1, 1000.0);
        assert_eq!(camera.projection_matrix(), &expected);
    }

    #[test]
    fn test_view_matrix() {
        let camera = camera();
        let view = camera.view_matrix();
        // View matrix should be non-zero
        assert!(view.norm() > 0.0);
    }

    #[test]
    fn test_aspect_needs_explicit_update() {
        let mut camera = camera();
        let before = *camera.projection_matrix();
        camera.set_aspect(2.0);
        assert_eq!(camera.projection_matrix(), &before);
        camera.update_projection_matrix();
        assert_ne!(camera.projection_matrix(), &before);
    }

    #[test]
    fn test_target_projects_to_center() {
        let camera = camera();
        let vp = camera.view_projection();
        let point = Camera::project_to_screen(&vp, &Point3::origin(), &Matrix4::identity(), 800, 600)
            .expect("origin is in front of the camera");
        assert!((point.x - 400.0).abs() < 1e-3);
        assert!((point.y - 300.0).abs() < 1e-3);
    }

    #[test]
    fn test_point_behind_camera_is_rejected() {
        let camera = camera();
        let vp = camera.view_projection();
        let behind = Point3::new(0.0, 0.0, 10.0);
        assert!(Camera::project_to_screen(&vp, &behind, &Matrix4::identity(), 800, 600).is_none());
    }

    #[test]
    fn test_basis_is_orthonormal() {
        let (right, up, forward) = camera().basis();
        assert!((right - Vector3::x()).norm() < 1e-6);
        assert!((up - Vector3::y()).norm() < 1e-6);
        assert!((forward + Vector3::z()).norm() < 1e-6);
    }
}
