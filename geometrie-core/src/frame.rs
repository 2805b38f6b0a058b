/// Screen-space draw lists shared by the software renderers
use crate::color::Color;
use crate::projection::{Camera, ScreenPoint};
use crate::scene::{NodeKind, Scene};
use crate::viewport::SurfaceSize;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilledTriangle {
    pub points: [ScreenPoint; 3],
    pub color: Color,
    pub opacity: f32,
    pub depth_test: bool,
}

impl FilledTriangle {
    /// Mean normalized depth, for painter's ordering
    pub fn depth(&self) -> f32 {
        (self.points[0].depth + self.points[1].depth + self.points[2].depth) / 3.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineSegment {
    pub from: ScreenPoint,
    pub to: ScreenPoint,
    pub color: Color,
    pub opacity: f32,
    pub depth_test: bool,
}

/// One primitive in draw order
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Primitive {
    Triangle(FilledTriangle),
    Line(LineSegment),
}

#[derive(Debug, Clone, Default)]
pub struct DrawList {
    pub primitives: Vec<Primitive>,
}

impl DrawList {
    pub fn triangles(&self) -> impl Iterator<Item = &FilledTriangle> {
        self.primitives.iter().filter_map(|primitive| match primitive {
            Primitive::Triangle(triangle) => Some(triangle),
            Primitive::Line(_) => None,
        })
    }

    pub fn lines(&self) -> impl Iterator<Item = &LineSegment> {
        self.primitives.iter().filter_map(|primitive| match primitive {
            Primitive::Line(line) => Some(line),
            Primitive::Triangle(_) => None,
        })
    }

    pub fn len(&self) -> usize {
        self.primitives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }
}

/// Project every visible node of `scene` for a surface of `size`.
///
/// Primitives come out in the scene's draw order. Anything with a corner
/// behind the camera or outside the clip range is dropped.
pub fn project_scene(scene: &Scene, camera: &Camera, size: SurfaceSize) -> DrawList {
    let view_projection = camera.view_projection();
    let (width, height) = (size.width(), size.height());
    let mut list = DrawList::default();

    for (_, node) in scene.draw_order() {
        let model = node.model_matrix();
        let material = node.material;
        let opacity = material.effective_opacity();
        if opacity <= 0.0 {
            continue;
        }

        match &node.kind {
            NodeKind::Mesh(mesh) => {
                for triangle in &mesh.triangles {
                    let project = |index: usize| {
                        Camera::project_to_screen(
                            &view_projection,
                            &triangle.vertices[index].position,
                            &model,
                            width,
                            height,
                        )
                    };
                    if let (Some(a), Some(b), Some(c)) = (project(0), project(1), project(2)) {
                        list.primitives.push(Primitive::Triangle(FilledTriangle {
                            points: [a, b, c],
                            color: material.color,
                            opacity,
                            depth_test: material.depth_test,
                        }));
                    }
                }
            }
            NodeKind::Lines(wireframe) => {
                for edge in &wireframe.edges {
                    let from = Camera::project_to_screen(&view_projection, &edge.start, &model, width, height);
                    let to = Camera::project_to_screen(&view_projection, &edge.end, &model, width, height);
                    if let (Some(from), Some(to)) = (from, to) {
                        list.primitives.push(Primitive::Line(LineSegment {
                            from,
                            to,
                            color: material.color,
                            opacity,
                            depth_test: material.depth_test,
                        }));
                    }
                }
            }
        }
    }

    list
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factory::{build_camera, build_model};
    use crate::scene::{compose_scene, SceneHandles};

    fn setup(wireframe: bool) -> (Scene, SceneHandles, SurfaceSize) {
        let size = SurfaceSize::new(320, 240).unwrap();
        let model = build_model();
        let camera = build_camera(size, model.position());
        let (scene, handles) = compose_scene(model, camera, wireframe);
        (scene, handles, size)
    }

    #[test]
    fn test_full_scene_projects_everything() {
        let (scene, _, size) = setup(true);
        let list = project_scene(&scene, scene.camera(), size);
        assert_eq!(list.triangles().count(), 700 + 8);
        assert_eq!(list.lines().count(), 1050 + 12);
    }

    #[test]
    fn test_lines_follow_triangles() {
        let (scene, _, size) = setup(true);
        let list = project_scene(&scene, scene.camera(), size);
        let first_line = list
            .primitives
            .iter()
            .position(|primitive| matches!(primitive, Primitive::Line(_)))
            .unwrap();
        assert!(list.primitives[first_line..]
            .iter()
            .all(|primitive| matches!(primitive, Primitive::Line(_))));
    }

    #[test]
    fn test_hidden_solids_and_transparent_lines_are_skipped() {
        let (mut scene, handles, size) = setup(true);
        for id in handles.solids() {
            scene.node_mut(id).unwrap().visible = false;
        }
        for id in handles.overlays() {
            scene.node_mut(id).unwrap().material.opacity = 0.0;
        }
        let list = project_scene(&scene, scene.camera(), size);
        assert!(list.is_empty());
    }

    #[test]
    fn test_lines_keep_overlay_material() {
        let (scene, _, size) = setup(true);
        let list = project_scene(&scene, scene.camera(), size);
        let line = list.lines().next().unwrap();
        assert_eq!(line.color, Color::WHITE);
        assert!(!line.depth_test);
        assert!((line.opacity - 0.39).abs() < 1e-6);
    }
}
