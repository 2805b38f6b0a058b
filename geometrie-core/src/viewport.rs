/// Viewport controller.
///
/// [`Viewport`] owns everything a frame needs: the renderer, the scene, the
/// orbit controls, the settings panel and the frame stats. Hosts feed it
/// events through [`Viewport::dispatch`] and drive frames through
/// [`Viewport::tick`]; each call runs to completion before the next.
use tracing::{debug, info, trace};

use crate::animation::{spin, Timing};
use crate::controls::{OrbitControls, PointerEvent};
use crate::error::{Error, Result};
use crate::factory::{build_camera, build_model};
use crate::projection::Camera;
use crate::scene::{compose_scene, Scene, SceneHandles};
use crate::settings::{self, SettingsChange, SettingsPanel, SettingsState};
use crate::stats::FrameStats;

pub const DEFAULT_PIXEL_RATIO_CAP: f64 = 2.0;

/// Logical size of the render surface; never zero
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceSize {
    width: u32,
    height: u32,
}

impl SurfaceSize {
    pub fn new(width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidDimensions { width, height });
        }
        Ok(Self { width, height })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height as f32
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportConfig {
    pub surface: SurfaceSize,
    pub pixel_ratio_cap: f64,
}

impl ViewportConfig {
    /// Device pixel ratio limited to the cap; bogus ratios fall back to 1
    pub fn pixel_ratio(&self, device_pixel_ratio: f64) -> f64 {
        if device_pixel_ratio.is_finite() && device_pixel_ratio > 0.0 {
            device_pixel_ratio.min(self.pixel_ratio_cap)
        } else {
            1.0
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportOptions {
    /// Compose wireframe overlays into the scene
    pub wireframe: bool,
    pub pixel_ratio_cap: f64,
    pub timing: Timing,
    pub settings: SettingsState,
}

impl Default for ViewportOptions {
    fn default() -> Self {
        Self {
            wireframe: true,
            pixel_ratio_cap: DEFAULT_PIXEL_RATIO_CAP,
            timing: Timing::default(),
            settings: SettingsState::default(),
        }
    }
}

/// Draws a scene onto some surface
pub trait Renderer {
    fn set_size(&mut self, surface: SurfaceSize);

    fn set_pixel_ratio(&mut self, ratio: f64);

    fn render(&mut self, scene: &Scene, camera: &Camera) -> Result<()>;
}

/// Everything a host can report between frames
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ViewportEvent {
    Resize {
        width: u32,
        height: u32,
        device_pixel_ratio: f64,
    },
    Pointer(PointerEvent),
    Settings(SettingsChange),
}

pub struct Viewport<R: Renderer> {
    renderer: R,
    scene: Scene,
    handles: SceneHandles,
    controls: OrbitControls,
    panel: SettingsPanel,
    stats: FrameStats,
    config: ViewportConfig,
    pixel_ratio: f64,
}

impl<R: Renderer> Viewport<R> {
    /// Build the scene, size the renderer and draw the first frame
    pub fn mount(
        mut renderer: R,
        surface: SurfaceSize,
        device_pixel_ratio: f64,
        options: ViewportOptions,
    ) -> Result<Self> {
        let config = ViewportConfig {
            surface,
            pixel_ratio_cap: options.pixel_ratio_cap,
        };

        let model = build_model();
        let target = model.position();
        let camera = build_camera(surface, target);
        let (mut scene, handles) = compose_scene(model, camera, options.wireframe);
        let controls = OrbitControls::new(target, surface);

        // Bring the scene in line with the initial panel values
        let mut panel = SettingsPanel::default();
        for change in options.settings.changes_from(panel.state()) {
            let change = panel.set(change);
            settings::apply(change, &mut scene, &handles);
        }

        let pixel_ratio = config.pixel_ratio(device_pixel_ratio);
        renderer.set_size(surface);
        renderer.set_pixel_ratio(pixel_ratio);
        renderer.render(&scene, scene.camera())?;

        info!(
            width = surface.width(),
            height = surface.height(),
            pixel_ratio,
            wireframe = options.wireframe,
            "viewport mounted"
        );

        Ok(Self {
            renderer,
            scene,
            handles,
            controls,
            panel,
            stats: FrameStats::new(),
            config,
            pixel_ratio,
        })
    }

    /// Adopt a new surface size and redraw immediately
    pub fn resize(&mut self, width: u32, height: u32, device_pixel_ratio: f64) -> Result<()> {
        let surface = SurfaceSize::new(width, height)?;
        self.config.surface = surface;

        let camera = self.scene.camera_mut();
        camera.set_aspect(surface.aspect());
        camera.update_projection_matrix();

        self.controls.set_surface(surface);
        self.pixel_ratio = self.config.pixel_ratio(device_pixel_ratio);
        self.renderer.set_size(surface);
        self.renderer.set_pixel_ratio(self.pixel_ratio);

        debug!(width, height, pixel_ratio = self.pixel_ratio, "viewport resized");
        self.renderer.render(&self.scene, self.scene.camera())
    }

    /// Store and apply a settings edit; returns the normalized change
    pub fn apply_settings(&mut self, change: SettingsChange) -> SettingsChange {
        let change = self.panel.set(change);
        debug!(?change, "settings changed");
        settings::apply(change, &mut self.scene, &self.handles);
        change
    }

    pub fn handle_pointer(&mut self, event: PointerEvent) {
        self.controls.handle_pointer(event, self.scene.camera());
    }

    pub fn dispatch(&mut self, event: ViewportEvent) -> Result<()> {
        match event {
            ViewportEvent::Resize {
                width,
                height,
                device_pixel_ratio,
            } => self.resize(width, height, device_pixel_ratio),
            ViewportEvent::Pointer(pointer) => {
                self.handle_pointer(pointer);
                Ok(())
            }
            ViewportEvent::Settings(change) => {
                self.apply_settings(change);
                Ok(())
            }
        }
    }

    /// One animation step: rotate, poll controls, render, update stats
    pub fn tick(&mut self, rotation_step: f32, now_ms: f64) -> Result<()> {
        spin(&mut self.scene, &self.handles, rotation_step);

        self.controls.enable_damping = true;
        let moved = self.controls.update(self.scene.camera_mut());

        self.renderer.render(&self.scene, self.scene.camera())?;
        self.stats.update(now_ms);

        trace!(rotation_step, moved, "tick");
        Ok(())
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn handles(&self) -> &SceneHandles {
        &self.handles
    }

    pub fn camera(&self) -> &Camera {
        self.scene.camera()
    }

    pub fn controls(&self) -> &OrbitControls {
        &self.controls
    }

    pub fn controls_mut(&mut self) -> &mut OrbitControls {
        &mut self.controls
    }

    pub fn settings(&self) -> &SettingsState {
        self.panel.state()
    }

    pub fn panel(&self) -> &SettingsPanel {
        &self.panel
    }

    pub fn stats(&self) -> &FrameStats {
        &self.stats
    }

    pub fn config(&self) -> &ViewportConfig {
        &self.config
    }

    pub fn pixel_ratio(&self) -> f64 {
        self.pixel_ratio
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }
}
