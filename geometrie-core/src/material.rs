/// Surface and line appearance
use crate::color::Color;

/// Appearance shared by solid meshes and line overlays
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub color: Color,
    pub opacity: f32,
    pub transparent: bool,
    pub depth_test: bool,
}

impl Material {
    /// Unlit, opaque, depth-tested fill
    pub fn basic(color: Color) -> Self {
        Self {
            color,
            opacity: 1.0,
            transparent: false,
            depth_test: true,
        }
    }

    /// White lines drawn on top of everything else
    pub fn overlay_lines(opacity: f32) -> Self {
        Self {
            color: Color::WHITE,
            opacity: opacity.clamp(0.0, 1.0),
            transparent: true,
            depth_test: false,
        }
    }

    /// Opacity actually applied when compositing
    pub fn effective_opacity(&self) -> f32 {
        if self.transparent {
            self.opacity.clamp(0.0, 1.0)
        } else {
            1.0
        }
    }
}

impl Default for Material {
    fn default() -> Self {
        Self::basic(Color::WHITE)
    }
}
