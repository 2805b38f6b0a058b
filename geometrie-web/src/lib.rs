/// Geometrie Web - the wireframe viewer on a 2D canvas
///
/// `mount` finds the canvas, builds the viewport around a
/// [`CanvasRenderer`], attaches the settings panel and stats overlay and
/// starts a `requestAnimationFrame` loop. The returned [`App`] stops the
/// loop and releases every listener when stopped or dropped.
use console_error_panic_hook::set_once;
use geometrie_core::{
    AnimationLoop, Error, PointerButton, PointerEvent, StopHandle, SurfaceSize, Timing, Viewport,
    ViewportEvent, ViewportOptions,
};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, HtmlCanvasElement, MouseEvent, WheelEvent, Window};

pub mod dom;
pub mod logging;
pub mod renderer;

pub use dom::{Listener, SettingsForm, StatsOverlay};
pub use renderer::CanvasRenderer;

/// Selector used when `mount` is given none
pub const DEFAULT_SELECTOR: &str = ".geometrie-3d";

#[wasm_bindgen(start)]
pub fn start() {
    set_once();
    logging::init(tracing::Level::INFO);
}

/// Startup options visible to JavaScript
#[wasm_bindgen]
#[derive(Debug, Clone, Copy)]
pub struct WebOptions {
    /// Compose wireframe overlays
    pub wireframe: bool,
    /// Rotate in fixed 50 ms steps instead of by elapsed time
    pub fixed_delay: bool,
}

#[wasm_bindgen]
impl WebOptions {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Default for WebOptions {
    fn default() -> Self {
        Self {
            wireframe: true,
            fixed_delay: false,
        }
    }
}

impl From<WebOptions> for ViewportOptions {
    fn from(options: WebOptions) -> Self {
        ViewportOptions {
            wireframe: options.wireframe,
            timing: if options.fixed_delay {
                Timing::fixed()
            } else {
                Timing::DeltaTime
            },
            ..ViewportOptions::default()
        }
    }
}

fn to_js(err: Error) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn report(context: &str, err: &JsValue) {
    web_sys::console::error_2(&JsValue::from_str(context), err);
}

fn window() -> Result<Window, JsValue> {
    web_sys::window().ok_or_else(|| JsValue::from_str("no window"))
}

fn window_surface(window: &Window) -> Result<SurfaceSize, JsValue> {
    let width = window.inner_width()?.as_f64().unwrap_or(0.0);
    let height = window.inner_height()?.as_f64().unwrap_or(0.0);
    SurfaceSize::new(width as u32, height as u32).map_err(to_js)
}

fn find_canvas(document: &Document, selector: &str) -> Result<HtmlCanvasElement, Error> {
    document
        .query_selector(selector)
        .ok()
        .flatten()
        .and_then(|element| element.dyn_into::<HtmlCanvasElement>().ok())
        .ok_or_else(|| Error::MissingSurface(selector.to_string()))
}

fn pointer_button(button: i16) -> PointerButton {
    match button {
        1 => PointerButton::Middle,
        2 => PointerButton::Secondary,
        _ => PointerButton::Primary,
    }
}

/// State shared by the frame callback and the event listeners
struct Shared {
    viewport: Viewport<CanvasRenderer>,
    animation: AnimationLoop,
    form: SettingsForm,
    stats: StatsOverlay,
}

impl Shared {
    fn dispatch(&mut self, event: ViewportEvent) {
        if let Err(err) = self.viewport.dispatch(event) {
            tracing::warn!(%err, "event ignored");
        }
    }

    /// Run one animation frame; `false` once the loop has stopped
    fn frame(&mut self, now_ms: f64) -> bool {
        let ticks = self.animation.ticks();
        match self.animation.frame(&mut self.viewport, now_ms) {
            Ok(running) => {
                if self.animation.ticks() != ticks {
                    self.stats.show(self.viewport.stats());
                }
                running
            }
            Err(err) => {
                report("frame failed", &to_js(err));
                self.animation.stop_handle().stop();
                false
            }
        }
    }
}

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

#[wasm_bindgen]
pub struct App {
    window: Window,
    shared: Rc<RefCell<Shared>>,
    callback: FrameCallback,
    frame_id: Rc<Cell<Option<i32>>>,
    listeners: Vec<Listener>,
    stop: StopHandle,
}

/// Mount the viewer on the canvas matching `selector`
#[wasm_bindgen]
pub fn mount(selector: Option<String>, options: Option<WebOptions>) -> Result<App, JsValue> {
    let selector = selector.unwrap_or_else(|| DEFAULT_SELECTOR.to_string());
    let options = options.unwrap_or_default();

    let window = window()?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;
    let canvas = find_canvas(&document, &selector).map_err(to_js)?;

    let surface = window_surface(&window)?;
    let renderer = CanvasRenderer::new(canvas.clone()).map_err(to_js)?;
    let viewport = Viewport::mount(
        renderer,
        surface,
        window.device_pixel_ratio(),
        options.into(),
    )
    .map_err(to_js)?;

    let form = SettingsForm::new(&document, viewport.settings())?;
    let stats = StatsOverlay::new(&document)?;
    let host = canvas
        .parent_element()
        .or_else(|| document.body().map(Into::into))
        .ok_or_else(|| JsValue::from_str("canvas has no parent"))?;
    host.append_child(form.element())?;
    host.append_child(stats.element())?;

    let animation = AnimationLoop::new(ViewportOptions::from(options).timing);
    let stop = animation.stop_handle();
    let shared = Rc::new(RefCell::new(Shared {
        viewport,
        animation,
        form,
        stats,
    }));

    let mut app = App {
        window,
        shared,
        callback: Rc::new(RefCell::new(None)),
        frame_id: Rc::new(Cell::new(None)),
        listeners: Vec::new(),
        stop,
    };
    app.listen(&canvas)?;
    app.start_loop()?;

    tracing::info!(%selector, "mounted");
    Ok(app)
}

impl App {
    fn listen(&mut self, canvas: &HtmlCanvasElement) -> Result<(), JsValue> {
        let window = self.window.clone();
        let shared = self.shared.clone();
        self.listeners.push(Listener::new(&self.window, "resize", move |_| {
            let width = window.inner_width().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
            let height = window.inner_height().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
            shared.borrow_mut().dispatch(ViewportEvent::Resize {
                width: width as u32,
                height: height as u32,
                device_pixel_ratio: window.device_pixel_ratio(),
            });
        })?);

        let shared = self.shared.clone();
        self.listeners.push(Listener::new(canvas, "pointerdown", move |event| {
            if let Some(event) = event.dyn_ref::<MouseEvent>() {
                shared.borrow_mut().dispatch(ViewportEvent::Pointer(PointerEvent::Down {
                    x: event.client_x() as f32,
                    y: event.client_y() as f32,
                    button: pointer_button(event.button()),
                }));
            }
        })?);

        // Moves and releases are tracked on the window so drags survive
        // leaving the canvas
        let shared = self.shared.clone();
        self.listeners.push(Listener::new(&self.window, "pointermove", move |event| {
            let mut shared = shared.borrow_mut();
            if !shared.viewport.controls().is_dragging() {
                return;
            }
            if let Some(event) = event.dyn_ref::<MouseEvent>() {
                shared.dispatch(ViewportEvent::Pointer(PointerEvent::Move {
                    x: event.client_x() as f32,
                    y: event.client_y() as f32,
                }));
            }
        })?);

        let shared = self.shared.clone();
        self.listeners.push(Listener::new(&self.window, "pointerup", move |_| {
            shared.borrow_mut().dispatch(ViewportEvent::Pointer(PointerEvent::Up));
        })?);

        let shared = self.shared.clone();
        self.listeners.push(Listener::new(canvas, "wheel", move |event| {
            if let Some(wheel) = event.dyn_ref::<WheelEvent>() {
                event.prevent_default();
                shared.borrow_mut().dispatch(ViewportEvent::Pointer(PointerEvent::Wheel {
                    delta_y: wheel.delta_y() as f32,
                }));
            }
        })?);

        self.listeners
            .push(Listener::new(canvas, "contextmenu", |event| event.prevent_default())?);

        let inputs = self.shared.borrow().form.inputs().to_vec();
        for (field, input) in inputs {
            let shared = self.shared.clone();
            let source = input.clone();
            self.listeners.push(Listener::new(&input, "input", move |_| {
                let Some(change) = dom::change_from_input(&field, &source) else {
                    return;
                };
                let mut shared = shared.borrow_mut();
                shared.dispatch(ViewportEvent::Settings(change));
                let state = *shared.viewport.settings();
                shared.form.show(&state);
            })?);
        }

        Ok(())
    }

    fn start_loop(&self) -> Result<(), JsValue> {
        let shared = self.shared.clone();
        let window = self.window.clone();
        let frame_id = self.frame_id.clone();
        let handle = self.callback.clone();

        *self.callback.borrow_mut() = Some(Closure::new(move |now: f64| {
            frame_id.set(None);
            if !shared.borrow_mut().frame(now) {
                return;
            }
            if let Some(callback) = handle.borrow().as_ref() {
                match window.request_animation_frame(callback.as_ref().unchecked_ref()) {
                    Ok(id) => frame_id.set(Some(id)),
                    Err(err) => report("requestAnimationFrame failed", &err),
                }
            }
        }));

        if let Some(callback) = self.callback.borrow().as_ref() {
            let id = self
                .window
                .request_animation_frame(callback.as_ref().unchecked_ref())?;
            self.frame_id.set(Some(id));
        }
        Ok(())
    }
}

#[wasm_bindgen]
impl App {
    /// Stop animating and detach every listener
    pub fn stop(&mut self) {
        self.stop.stop();
        if let Some(id) = self.frame_id.take() {
            let _ = self.window.cancel_animation_frame(id);
        }
        self.callback.borrow_mut().take();
        self.listeners.clear();
    }

    pub fn is_running(&self) -> bool {
        !self.stop.is_stopped()
    }

    pub fn ticks(&self) -> u64 {
        self.shared.borrow().animation.ticks()
    }
}

impl Drop for App {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_web_options_map_to_viewport_options() {
        let options = ViewportOptions::from(WebOptions::default());
        assert!(options.wireframe);
        assert_eq!(options.timing, Timing::DeltaTime);

        let options = ViewportOptions::from(WebOptions {
            wireframe: false,
            fixed_delay: true,
        });
        assert!(!options.wireframe);
        assert_eq!(options.timing, Timing::fixed());
    }

    #[test]
    fn test_pointer_buttons() {
        assert_eq!(pointer_button(0), PointerButton::Primary);
        assert_eq!(pointer_button(1), PointerButton::Middle);
        assert_eq!(pointer_button(2), PointerButton::Secondary);
    }
}
