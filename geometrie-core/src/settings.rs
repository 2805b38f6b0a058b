/// Settings panel model.
///
/// The panel owns the user-facing [`SettingsState`]. A host widget layer
/// renders [`FIELDS`] however it likes and reports edits as
/// [`SettingsChange`] values; [`SettingsPanel::set`] normalizes them and
/// [`apply`] pushes the result into the scene.
use tracing::debug;

use crate::color::Color;
use crate::factory::BASE_COLOR;
use crate::scene::{Scene, SceneHandles};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SettingsState {
    pub color: Color,
    pub shapes_visible: bool,
    pub wireframe_visible: bool,
    pub wireframe_opacity: f32,
}

impl Default for SettingsState {
    fn default() -> Self {
        Self {
            color: BASE_COLOR,
            shapes_visible: true,
            wireframe_visible: true,
            wireframe_opacity: 0.39,
        }
    }
}

impl SettingsState {
    /// Edits that turn `base` into `self`, in panel field order
    pub fn changes_from(&self, base: &SettingsState) -> Vec<SettingsChange> {
        let mut changes = Vec::new();
        if self.color != base.color {
            changes.push(SettingsChange::Color(self.color));
        }
        if self.wireframe_visible != base.wireframe_visible {
            changes.push(SettingsChange::Wireframe(self.wireframe_visible));
        }
        if self.wireframe_opacity != base.wireframe_opacity {
            changes.push(SettingsChange::OpacityWireframe(self.wireframe_opacity));
        }
        if self.shapes_visible != base.shapes_visible {
            changes.push(SettingsChange::IsVisible(self.shapes_visible));
        }
        changes
    }
}

/// One edit coming from the panel
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SettingsChange {
    Color(Color),
    Wireframe(bool),
    OpacityWireframe(f32),
    IsVisible(bool),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldKind {
    Color,
    Toggle,
    Range { min: f32, max: f32, step: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldSpec {
    pub key: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
}

pub const OPACITY_RANGE: FieldKind = FieldKind::Range {
    min: 0.0,
    max: 1.0,
    step: 0.01,
};

pub const FIELDS: [FieldSpec; 4] = [
    FieldSpec {
        key: "color",
        label: "Color:",
        kind: FieldKind::Color,
    },
    FieldSpec {
        key: "wireframe",
        label: "Wireframe:",
        kind: FieldKind::Toggle,
    },
    FieldSpec {
        key: "opacityWireframe",
        label: "Wireframe | Opacity:",
        kind: OPACITY_RANGE,
    },
    FieldSpec {
        key: "isVisible",
        label: "Remove color:",
        kind: FieldKind::Toggle,
    },
];

/// Clamp into the range and snap to its step grid
pub fn normalize_range(value: f32, kind: FieldKind) -> f32 {
    match kind {
        FieldKind::Range { min, max, step } => {
            let value = if value.is_finite() { value } else { min };
            let clamped = value.clamp(min, max);
            if step > 0.0 {
                let snapped = min + ((clamped - min) / step).round() * step;
                // round away float noise from the multiplication
                let decimals = (1.0 / step).log10().ceil().max(0.0) as i32;
                let scale = 10f32.powi(decimals);
                ((snapped * scale).round() / scale).clamp(min, max)
            } else {
                clamped
            }
        }
        _ => value,
    }
}

#[derive(Debug, Default)]
pub struct SettingsPanel {
    state: SettingsState,
}

impl SettingsPanel {
    pub fn new(state: SettingsState) -> Self {
        Self { state }
    }

    pub fn state(&self) -> &SettingsState {
        &self.state
    }

    pub fn fields(&self) -> &'static [FieldSpec] {
        &FIELDS
    }

    /// Store an edit and return it in normalized form
    pub fn set(&mut self, change: SettingsChange) -> SettingsChange {
        let change = match change {
            SettingsChange::OpacityWireframe(value) => {
                SettingsChange::OpacityWireframe(normalize_range(value, OPACITY_RANGE))
            }
            other => other,
        };

        match change {
            SettingsChange::Color(color) => self.state.color = color,
            SettingsChange::Wireframe(visible) => self.state.wireframe_visible = visible,
            SettingsChange::OpacityWireframe(opacity) => self.state.wireframe_opacity = opacity,
            SettingsChange::IsVisible(visible) => self.state.shapes_visible = visible,
        }

        change
    }
}

/// Push a normalized change into the scene.
///
/// Color and solid visibility touch only the solids. Overlay edits only
/// reach overlays that were composed into the scene.
pub fn apply(change: SettingsChange, scene: &mut Scene, handles: &SceneHandles) {
    match change {
        SettingsChange::Color(color) => {
            for id in handles.solids() {
                if let Some(node) = scene.node_mut(id) {
                    node.material.color = color;
                }
            }
        }
        SettingsChange::IsVisible(visible) => {
            for id in handles.solids() {
                if let Some(node) = scene.node_mut(id) {
                    node.visible = visible;
                }
            }
        }
        SettingsChange::Wireframe(visible) => {
            if !handles.has_overlays() {
                debug!(visible, "wireframe overlays were not composed, ignoring toggle");
            }
            for id in handles.overlays() {
                if let Some(node) = scene.node_mut(id) {
                    node.visible = visible;
                }
            }
        }
        SettingsChange::OpacityWireframe(opacity) => {
            debug!(opacity, "wireframe opacity");
            for id in handles.overlays() {
                if let Some(node) = scene.node_mut(id) {
                    node.material.opacity = opacity;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let state = SettingsState::default();
        assert_eq!(state.color, Color::from_hex(0x352935));
        assert!(state.shapes_visible);
        assert!(state.wireframe_visible);
        assert_eq!(state.wireframe_opacity, 0.39);
    }

    #[test]
    fn test_opacity_bounds() {
        let mut panel = SettingsPanel::default();
        assert_eq!(panel.set(SettingsChange::OpacityWireframe(0.0)), SettingsChange::OpacityWireframe(0.0));
        assert_eq!(panel.state().wireframe_opacity, 0.0);
        assert_eq!(panel.set(SettingsChange::OpacityWireframe(1.0)), SettingsChange::OpacityWireframe(1.0));
        assert_eq!(panel.state().wireframe_opacity, 1.0);

        panel.set(SettingsChange::OpacityWireframe(1.7));
        assert_eq!(panel.state().wireframe_opacity, 1.0);
        panel.set(SettingsChange::OpacityWireframe(-0.2));
        assert_eq!(panel.state().wireframe_opacity, 0.0);
        panel.set(SettingsChange::OpacityWireframe(f32::NAN));
        assert_eq!(panel.state().wireframe_opacity, 0.0);
    }

    #[test]
    fn test_opacity_snaps_to_step() {
        assert!((normalize_range(0.394, OPACITY_RANGE) - 0.39).abs() < 1e-6);
        assert!((normalize_range(0.396, OPACITY_RANGE) - 0.40).abs() < 1e-6);
    }

    #[test]
    fn test_changes_from_lists_only_differences() {
        let base = SettingsState::default();
        assert!(base.changes_from(&base).is_empty());

        let edited = SettingsState {
            color: Color::from_hex(0xff0000),
            shapes_visible: false,
            ..base
        };
        assert_eq!(
            edited.changes_from(&base),
            vec![
                SettingsChange::Color(Color::from_hex(0xff0000)),
                SettingsChange::IsVisible(false),
            ]
        );
    }

    #[test]
    fn test_field_labels() {
        let labels: Vec<&str> = FIELDS.iter().map(|field| field.label).collect();
        assert_eq!(labels, ["Color:", "Wireframe:", "Wireframe | Opacity:", "Remove color:"]);
    }
}
