/// Geometrie Core Library - Scene, camera and animation logic
///
/// This library provides the host-independent half of the viewer: the two
/// wireframed shapes, the retained scene graph, orbit controls, the settings
/// panel model, frame stats, the viewport controller and the animation loop.
/// Front-ends supply a [`Renderer`] and feed host events into a [`Viewport`].

pub mod animation;
pub mod color;
pub mod controls;
pub mod error;
pub mod factory;
pub mod frame;
pub mod geometry;
pub mod material;
pub mod projection;
pub mod scene;
pub mod settings;
pub mod stats;
pub mod transform;
pub mod viewport;
pub mod wireframe;

// Re-export commonly used types
pub use animation::{AnimationLoop, StopHandle, Timing};
pub use color::Color;
pub use controls::{OrbitControls, PointerButton, PointerEvent};
pub use error::{Error, Result};
pub use frame::{project_scene, DrawList, Primitive};
pub use geometry::{Mesh, Triangle, Vertex};
pub use material::Material;
pub use projection::{Camera, ScreenPoint};
pub use scene::{NodeId, Scene, SceneHandles};
pub use settings::{SettingsChange, SettingsState};
pub use stats::{FrameStats, StatsPanel};
pub use transform::RotationState;
pub use viewport::{Renderer, SurfaceSize, Viewport, ViewportEvent, ViewportOptions};
pub use wireframe::Wireframe;
