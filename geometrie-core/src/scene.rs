/// Retained-mode scene graph.
///
/// A [`Scene`] owns its drawable nodes and the camera. Nodes are addressed
/// through the [`NodeId`] handed out on insertion; ids stay valid for the
/// scene's lifetime because nodes are never removed.
use nalgebra::{Matrix4, Point3};

use crate::factory::{ModelBundle, Shape};
use crate::geometry::Mesh;
use crate::material::Material;
use crate::projection::Camera;
use crate::transform::{self, RotationState};
use crate::wireframe::Wireframe;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug, Clone)]
pub enum NodeKind {
    /// Filled triangles
    Mesh(Mesh),
    /// Line segments
    Lines(Wireframe),
}

#[derive(Debug, Clone)]
pub struct Node {
    pub kind: NodeKind,
    pub material: Material,
    pub position: Point3<f32>,
    pub rotation: RotationState,
    pub visible: bool,
}

impl Node {
    fn with_kind(kind: NodeKind, material: Material) -> Self {
        Self {
            kind,
            material,
            position: Point3::origin(),
            rotation: RotationState::zero(),
            visible: true,
        }
    }

    pub fn mesh(mesh: Mesh, material: Material) -> Self {
        Self::with_kind(NodeKind::Mesh(mesh), material)
    }

    pub fn lines(wireframe: Wireframe, material: Material) -> Self {
        Self::with_kind(NodeKind::Lines(wireframe), material)
    }

    pub fn model_matrix(&self) -> Matrix4<f32> {
        transform::model_matrix(&self.position, &self.rotation)
    }
}

pub struct Scene {
    nodes: Vec<Node>,
    camera: Camera,
}

impl Scene {
    pub fn new(camera: Camera) -> Self {
        Self {
            nodes: Vec::new(),
            camera,
        }
    }

    pub fn add(&mut self, node: Node) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    /// Nodes in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes.iter().enumerate().map(|(index, node)| (NodeId(index), node))
    }

    /// Visible nodes in draw order: opaque first, then transparent, each
    /// group in insertion order
    pub fn draw_order(&self) -> Vec<(NodeId, &Node)> {
        let visible = || self.iter().filter(|(_, node)| node.visible);
        visible()
            .filter(|(_, node)| !node.material.transparent)
            .chain(visible().filter(|(_, node)| node.material.transparent))
            .collect()
    }
}

/// Scene handles for one shape
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShapeHandles {
    pub solid: NodeId,
    /// `None` when the scene was composed without wireframe overlays
    pub overlay: Option<NodeId>,
}

impl ShapeHandles {
    /// Solid and overlay ids, when present
    pub fn nodes(&self) -> impl Iterator<Item = NodeId> {
        std::iter::once(self.solid).chain(self.overlay)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SceneHandles {
    pub primary: ShapeHandles,
    pub secondary: ShapeHandles,
}

impl SceneHandles {
    pub fn solids(&self) -> [NodeId; 2] {
        [self.primary.solid, self.secondary.solid]
    }

    /// Overlay ids that made it into the scene
    pub fn overlays(&self) -> impl Iterator<Item = NodeId> {
        self.primary.overlay.into_iter().chain(self.secondary.overlay)
    }

    pub fn has_overlays(&self) -> bool {
        self.primary.overlay.is_some() || self.secondary.overlay.is_some()
    }
}

/// Assemble the model and camera into a scene.
///
/// Overlays are only inserted when `wireframe` is set; a scene composed
/// without them never gains them later.
pub fn compose_scene(model: ModelBundle, camera: Camera, wireframe: bool) -> (Scene, SceneHandles) {
    let ModelBundle { primary, secondary } = model;
    let Shape {
        solid: primary_solid,
        overlay: primary_overlay,
    } = primary;
    let Shape {
        solid: secondary_solid,
        overlay: secondary_overlay,
    } = secondary;

    let mut scene = Scene::new(camera);

    let (primary_line, secondary_line) = if wireframe {
        (Some(scene.add(primary_overlay)), Some(scene.add(secondary_overlay)))
    } else {
        (None, None)
    };

    let handles = SceneHandles {
        primary: ShapeHandles {
            solid: scene.add(primary_solid),
            overlay: primary_line,
        },
        secondary: ShapeHandles {
            solid: scene.add(secondary_solid),
            overlay: secondary_line,
        },
    };

    tracing::debug!(nodes = scene.len(), wireframe, "composed scene");
    (scene, handles)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factory::{build_camera, build_model};
    use crate::viewport::SurfaceSize;
    use pretty_assertions::assert_eq;

    fn compose(wireframe: bool) -> (Scene, SceneHandles) {
        let model = build_model();
        let camera = build_camera(SurfaceSize::new(800, 600).unwrap(), model.position());
        compose_scene(model, camera, wireframe)
    }

    #[test]
    fn test_compose_with_wireframe() {
        let (scene, handles) = compose(true);
        assert_eq!(scene.len(), 4);
        assert!(handles.has_overlays());
        assert_eq!(handles.overlays().count(), 2);
        for id in handles.overlays() {
            let node = scene.node(id).unwrap();
            assert!(matches!(node.kind, NodeKind::Lines(_)));
        }
        for id in handles.solids() {
            assert!(matches!(scene.node(id).unwrap().kind, NodeKind::Mesh(_)));
        }
    }

    #[test]
    fn test_compose_without_wireframe() {
        let (scene, handles) = compose(false);
        assert_eq!(scene.len(), 2);
        assert!(!handles.has_overlays());
        assert_eq!(handles.primary.nodes().count(), 1);
    }

    #[test]
    fn test_draw_order_puts_transparent_last() {
        let (scene, handles) = compose(true);
        let order: Vec<NodeId> = scene.draw_order().into_iter().map(|(id, _)| id).collect();
        let expected = vec![
            handles.primary.solid,
            handles.secondary.solid,
            handles.primary.overlay.unwrap(),
            handles.secondary.overlay.unwrap(),
        ];
        assert_eq!(order, expected);
    }

    #[test]
    fn test_hidden_nodes_are_not_drawn() {
        let (mut scene, handles) = compose(true);
        scene.node_mut(handles.primary.solid).unwrap().visible = false;
        assert_eq!(scene.draw_order().len(), 3);
    }
}
