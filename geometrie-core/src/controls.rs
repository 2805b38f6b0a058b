/// Orbit controls.
///
/// Pointer gestures accumulate pending rotation, dolly and pan deltas;
/// [`OrbitControls::update`] folds them into the camera once per frame.
/// With damping enabled only a fraction of the pending motion is applied
/// per update and the remainder decays, so the camera glides to rest.
use nalgebra::{Point3, Vector3};
use std::f32::consts::{PI, TAU};

use crate::projection::Camera;
use crate::viewport::SurfaceSize;

const EPS: f32 = 1e-6;

/// Closest the camera may dolly to its target; matches the camera's near plane
pub const DEFAULT_MIN_DISTANCE: f32 = 0.1;

/// Pointer button driving a drag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Middle,
    Secondary,
}

/// Host-independent pointer input, in surface pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Down { x: f32, y: f32, button: PointerButton },
    Move { x: f32, y: f32 },
    Up,
    /// Positive values scroll towards the user
    Wheel { delta_y: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Gesture {
    Idle,
    Rotate,
    Dolly,
    Pan,
}

/// Spherical coordinates around the orbit target, Y up
#[derive(Debug, Clone, Copy, PartialEq)]
struct Spherical {
    radius: f32,
    /// Polar angle from +Y
    phi: f32,
    /// Azimuth around Y, measured from +Z
    theta: f32,
}

impl Spherical {
    fn from_offset(offset: &Vector3<f32>) -> Self {
        let radius = offset.norm();
        if radius < EPS {
            return Self {
                radius,
                phi: 0.0,
                theta: 0.0,
            };
        }
        Self {
            radius,
            theta: offset.x.atan2(offset.z),
            phi: (offset.y / radius).clamp(-1.0, 1.0).acos(),
        }
    }

    fn to_offset(self) -> Vector3<f32> {
        let sin_phi_radius = self.phi.sin() * self.radius;
        Vector3::new(
            sin_phi_radius * self.theta.sin(),
            self.phi.cos() * self.radius,
            sin_phi_radius * self.theta.cos(),
        )
    }

    fn make_safe(&mut self) {
        self.phi = self.phi.clamp(EPS, PI - EPS);
    }
}

#[derive(Debug, Clone)]
pub struct OrbitControls {
    pub target: Point3<f32>,
    pub enabled: bool,
    pub enable_damping: bool,
    pub damping_factor: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    pub min_polar_angle: f32,
    pub max_polar_angle: f32,

    surface: SurfaceSize,
    gesture: Gesture,
    last_pointer: (f32, f32),
    delta_theta: f32,
    delta_phi: f32,
    scale: f32,
    pan_offset: Vector3<f32>,
}

impl OrbitControls {
    pub fn new(target: Point3<f32>, surface: SurfaceSize) -> Self {
        Self {
            target,
            enabled: true,
            enable_damping: false,
            damping_factor: 0.05,
            rotate_speed: 1.0,
            zoom_speed: 1.0,
            min_distance: DEFAULT_MIN_DISTANCE,
            max_distance: f32::INFINITY,
            min_polar_angle: 0.0,
            max_polar_angle: PI,
            surface,
            gesture: Gesture::Idle,
            last_pointer: (0.0, 0.0),
            delta_theta: 0.0,
            delta_phi: 0.0,
            scale: 1.0,
            pan_offset: Vector3::zeros(),
        }
    }

    /// Track the element size used to scale pointer deltas
    pub fn set_surface(&mut self, surface: SurfaceSize) {
        self.surface = surface;
    }

    pub fn is_dragging(&self) -> bool {
        self.gesture != Gesture::Idle
    }

    pub fn handle_pointer(&mut self, event: PointerEvent, camera: &Camera) {
        if !self.enabled {
            return;
        }

        match event {
            PointerEvent::Down { x, y, button } => {
                self.gesture = match button {
                    PointerButton::Primary => Gesture::Rotate,
                    PointerButton::Middle => Gesture::Dolly,
                    PointerButton::Secondary => Gesture::Pan,
                };
                self.last_pointer = (x, y);
            }
            PointerEvent::Move { x, y } => {
                let (dx, dy) = (x - self.last_pointer.0, y - self.last_pointer.1);
                self.last_pointer = (x, y);
                match self.gesture {
                    Gesture::Idle => {}
                    Gesture::Rotate => {
                        let height = self.surface.height() as f32;
                        self.rotate_left(TAU * dx * self.rotate_speed / height);
                        self.rotate_up(TAU * dy * self.rotate_speed / height);
                    }
                    Gesture::Dolly => {
                        if dy > 0.0 {
                            self.dolly_out();
                        } else if dy < 0.0 {
                            self.dolly_in();
                        }
                    }
                    Gesture::Pan => self.pan(dx, dy, camera),
                }
            }
            PointerEvent::Up => self.gesture = Gesture::Idle,
            PointerEvent::Wheel { delta_y } => {
                if delta_y < 0.0 {
                    self.dolly_in();
                } else if delta_y > 0.0 {
                    self.dolly_out();
                }
            }
        }
    }

    pub fn rotate_left(&mut self, angle: f32) {
        self.delta_theta -= angle;
    }

    pub fn rotate_up(&mut self, angle: f32) {
        self.delta_phi -= angle;
    }

    fn zoom_scale(&self) -> f32 {
        0.95f32.powf(self.zoom_speed)
    }

    /// Move towards the target
    pub fn dolly_in(&mut self) {
        self.scale *= self.zoom_scale();
    }

    /// Move away from the target
    pub fn dolly_out(&mut self) {
        self.scale /= self.zoom_scale();
    }

    /// Screen-space pan by a pointer delta in pixels
    pub fn pan(&mut self, dx: f32, dy: f32, camera: &Camera) {
        let (right, up, _) = camera.basis();
        let half_fov = (camera.fov / 2.0).to_radians();
        let target_distance = camera.distance_to_target() * half_fov.tan();
        let height = self.surface.height() as f32;

        self.pan_offset -= right * (2.0 * dx * target_distance / height);
        self.pan_offset += up * (2.0 * dy * target_distance / height);
    }

    /// Apply pending motion to the camera; true if the camera moved
    pub fn update(&mut self, camera: &mut Camera) -> bool {
        let previous_position = camera.position;
        let previous_target = self.target;

        let offset = camera.position - self.target;
        let mut spherical = Spherical::from_offset(&offset);

        let factor = if self.enable_damping { self.damping_factor } else { 1.0 };
        spherical.theta += self.delta_theta * factor;
        spherical.phi += self.delta_phi * factor;
        spherical.phi = spherical.phi.clamp(self.min_polar_angle, self.max_polar_angle);
        spherical.make_safe();
        spherical.radius = (spherical.radius * self.scale).clamp(self.min_distance, self.max_distance);

        self.target += self.pan_offset * factor;

        camera.position = self.target + spherical.to_offset();
        camera.look_at(self.target);

        if self.enable_damping {
            let decay = 1.0 - self.damping_factor;
            self.delta_theta *= decay;
            self.delta_phi *= decay;
            self.pan_offset *= decay;
        } else {
            self.delta_theta = 0.0;
            self.delta_phi = 0.0;
            self.pan_offset = Vector3::zeros();
        }
        self.scale = 1.0;

        (camera.position - previous_position).norm_squared() > EPS
            || (self.target - previous_target).norm_squared() > EPS
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factory::build_camera;

    fn setup() -> (OrbitControls, Camera) {
        let surface = SurfaceSize::new(800, 600).unwrap();
        let camera = build_camera(surface, Point3::origin());
        (OrbitControls::new(Point3::origin(), surface), camera)
    }

    #[test]
    fn test_idle_update_keeps_camera() {
        let (mut controls, mut camera) = setup();
        let before = camera.position;
        assert!(!controls.update(&mut camera));
        assert!((camera.position - before).norm() < 1e-4);
    }

    #[test]
    fn test_drag_rotates_around_target() {
        let (mut controls, mut camera) = setup();
        let radius = camera.distance_to_target();

        controls.handle_pointer(PointerEvent::Down { x: 100.0, y: 100.0, button: PointerButton::Primary }, &camera);
        controls.handle_pointer(PointerEvent::Move { x: 160.0, y: 100.0 }, &camera);
        controls.handle_pointer(PointerEvent::Up, &camera);

        let before = camera.position;
        assert!(controls.update(&mut camera));
        assert!((camera.position - before).norm() > 1e-3);
        assert!((camera.distance_to_target() - radius).abs() < 1e-3);
        assert_eq!(camera.target, Point3::origin());
    }

    #[test]
    fn test_damping_spreads_motion_over_frames() {
        let (mut controls, mut camera) = setup();
        controls.enable_damping = true;
        controls.rotate_left(0.5);

        let start = camera.position;
        controls.update(&mut camera);
        let first_step = (camera.position - start).norm();

        let mid = camera.position;
        controls.update(&mut camera);
        let second_step = (camera.position - mid).norm();

        assert!(first_step > 0.0);
        assert!(second_step < first_step);
    }

    #[test]
    fn test_wheel_dollies() {
        let (mut controls, mut camera) = setup();
        let radius = camera.distance_to_target();

        controls.handle_pointer(PointerEvent::Wheel { delta_y: -100.0 }, &camera);
        controls.update(&mut camera);
        assert!((camera.distance_to_target() - radius * 0.95).abs() < 1e-3);

        controls.handle_pointer(PointerEvent::Wheel { delta_y: 100.0 }, &camera);
        controls.update(&mut camera);
        assert!((camera.distance_to_target() - radius).abs() < 1e-3);
    }

    #[test]
    fn test_pan_moves_target() {
        let (mut controls, mut camera) = setup();
        controls.handle_pointer(PointerEvent::Down { x: 0.0, y: 0.0, button: PointerButton::Secondary }, &camera);
        controls.handle_pointer(PointerEvent::Move { x: 50.0, y: 0.0 }, &camera);
        controls.update(&mut camera);
        assert!(controls.target.coords.norm() > 1e-3);
        assert_eq!(camera.target, controls.target);
    }

    #[test]
    fn test_zoom_in_stops_short_of_target_and_recovers() {
        let (mut controls, mut camera) = setup();
        for _ in 0..320 {
            controls.handle_pointer(PointerEvent::Wheel { delta_y: -100.0 }, &camera);
            controls.update(&mut camera);
        }
        let closest = camera.distance_to_target();
        assert!((closest - DEFAULT_MIN_DISTANCE).abs() < 1e-4);
        assert!(camera.view_matrix().iter().all(|v| v.is_finite()));

        for _ in 0..100 {
            controls.handle_pointer(PointerEvent::Wheel { delta_y: 100.0 }, &camera);
            controls.update(&mut camera);
        }
        assert!(camera.distance_to_target() > 1.0);
        assert!(camera.view_matrix().iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_camera_on_target_is_pushed_out() {
        let (mut controls, mut camera) = setup();
        camera.position = Point3::origin();
        controls.update(&mut camera);
        assert!(camera.distance_to_target() >= DEFAULT_MIN_DISTANCE - 1e-5);
    }

    #[test]
    fn test_disabled_controls_ignore_input() {
        let (mut controls, mut camera) = setup();
        controls.enabled = false;
        controls.handle_pointer(PointerEvent::Wheel { delta_y: -100.0 }, &camera);
        assert!(!controls.update(&mut camera));
    }
}
