/// Terminal front-end for the wireframe viewer
use crossterm::{
    cursor,
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        MouseButton, MouseEvent, MouseEventKind,
    },
    execute, queue,
    style::{Color as TermColor, Print, ResetColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};
use geometrie_core::{
    AnimationLoop, Color, PointerButton, PointerEvent, Result, SettingsChange, SettingsState,
    StatsPanel, SurfaceSize, Timing, Viewport, ViewportEvent, ViewportOptions,
};
use std::io::{stdout, BufWriter, Stdout, Write};
use std::time::{Duration, Instant};
use tracing::{info, warn};

pub mod renderer;

pub use renderer::TerminalRenderer;

/// Text rows reserved below the image for the panel and stats
pub const OVERLAY_ROWS: u16 = 2;

/// Pacing for delta-time mode; terminals have no vsync to follow
const TERMINAL_FRAME_MS: f64 = 1000.0 / 60.0;

const OPACITY_FINE_STEP: f32 = 0.01;
const OPACITY_COARSE_STEP: f32 = 0.1;

/// Colors offered by the `c` key
pub const PALETTE: [Color; 6] = [
    Color::from_hex(0x352935),
    Color::from_hex(0xff0000),
    Color::from_hex(0x2e86de),
    Color::from_hex(0x10ac84),
    Color::from_hex(0xfeca57),
    Color::from_hex(0xffffff),
];

type Screen = TerminalRenderer<BufWriter<Stdout>>;

/// What a key press asks for
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum KeyAction {
    Quit,
    Settings(SettingsChange),
}

/// Pixel surface for a terminal of `columns x rows` cells
pub fn surface_for_terminal(columns: u16, rows: u16) -> Result<SurfaceSize> {
    let image_rows = rows.saturating_sub(OVERLAY_ROWS);
    SurfaceSize::new(columns as u32, image_rows as u32 * 2)
}

/// Color after `current` in the palette, wrapping around
pub fn next_color(current: Color) -> Color {
    match PALETTE.iter().position(|color| *color == current) {
        Some(index) => PALETTE[(index + 1) % PALETTE.len()],
        None => PALETTE[0],
    }
}

/// Map a key to a settings edit, given the current panel state
pub fn key_action(code: KeyCode, state: &SettingsState) -> Option<KeyAction> {
    let opacity = |delta: f32| {
        KeyAction::Settings(SettingsChange::OpacityWireframe(state.wireframe_opacity + delta))
    };
    match code {
        KeyCode::Char('q') | KeyCode::Esc => Some(KeyAction::Quit),
        KeyCode::Char('c') => Some(KeyAction::Settings(SettingsChange::Color(next_color(state.color)))),
        KeyCode::Char('w') => Some(KeyAction::Settings(SettingsChange::Wireframe(!state.wireframe_visible))),
        KeyCode::Char('v') => Some(KeyAction::Settings(SettingsChange::IsVisible(!state.shapes_visible))),
        KeyCode::Char('[') => Some(opacity(-OPACITY_FINE_STEP)),
        KeyCode::Char(']') => Some(opacity(OPACITY_FINE_STEP)),
        KeyCode::Char('{') => Some(opacity(-OPACITY_COARSE_STEP)),
        KeyCode::Char('}') => Some(opacity(OPACITY_COARSE_STEP)),
        _ => None,
    }
}

/// Translate terminal mouse input into surface pixels
pub fn pointer_from_mouse(event: &MouseEvent) -> Option<PointerEvent> {
    let x = event.column as f32;
    let y = event.row as f32 * 2.0;
    match event.kind {
        MouseEventKind::Down(button) => Some(PointerEvent::Down {
            x,
            y,
            button: match button {
                MouseButton::Left => PointerButton::Primary,
                MouseButton::Middle => PointerButton::Middle,
                MouseButton::Right => PointerButton::Secondary,
            },
        }),
        MouseEventKind::Drag(_) => Some(PointerEvent::Move { x, y }),
        MouseEventKind::Up(_) => Some(PointerEvent::Up),
        MouseEventKind::ScrollUp => Some(PointerEvent::Wheel { delta_y: -100.0 }),
        MouseEventKind::ScrollDown => Some(PointerEvent::Wheel { delta_y: 100.0 }),
        _ => None,
    }
}

fn checkbox(value: bool) -> &'static str {
    if value {
        "[x]"
    } else {
        "[ ]"
    }
}

/// The settings line shown under the image
pub fn settings_line(state: &SettingsState) -> String {
    format!(
        "Color: {} (c)  Wireframe: {} (w)  Wireframe | Opacity: {:.2} ([ ] {{ }})  Remove color: {} (v)",
        state.color,
        checkbox(state.wireframe_visible),
        state.wireframe_opacity,
        checkbox(state.shapes_visible),
    )
}

/// Main application struct for terminal 3D rendering
pub struct TerminalApp {
    viewport: Viewport<Screen>,
    animation: AnimationLoop,
    clock: Instant,
    last_frame_ms: f64,
}

impl TerminalApp {
    /// Take over the terminal, run until quit, then restore it
    pub fn run(options: ViewportOptions) -> Result<()> {
        terminal::enable_raw_mode()?;
        execute!(stdout(), terminal::EnterAlternateScreen, EnableMouseCapture, cursor::Hide)?;

        let result = Self::mount(options).and_then(|mut app| app.main_loop());

        // Cleanup
        execute!(stdout(), DisableMouseCapture, terminal::LeaveAlternateScreen, cursor::Show)?;
        terminal::disable_raw_mode()?;

        result
    }

    fn mount(options: ViewportOptions) -> Result<Self> {
        let (columns, rows) = terminal::size()?;
        let surface = surface_for_terminal(columns, rows)?;
        let renderer = TerminalRenderer::new(BufWriter::with_capacity(1 << 16, stdout()));

        let viewport = Viewport::mount(renderer, surface, 1.0, options)?;
        let mut app = Self {
            viewport,
            animation: AnimationLoop::new(options.timing),
            clock: Instant::now(),
            last_frame_ms: 0.0,
        };
        app.draw_overlay()?;
        Ok(app)
    }

    fn now_ms(&self) -> f64 {
        self.clock.elapsed().as_secs_f64() * 1000.0
    }

    /// Milliseconds until the next frame should be attempted
    fn next_frame_in(&self, now_ms: f64) -> f64 {
        match self.animation.timing() {
            Timing::FixedDelay { .. } => self.animation.wait_hint_ms(now_ms),
            Timing::DeltaTime => (self.last_frame_ms + TERMINAL_FRAME_MS - now_ms).max(0.0),
        }
    }

    fn main_loop(&mut self) -> Result<()> {
        let stop = self.animation.stop_handle();

        while !stop.is_stopped() {
            // Handle input until the next frame is due
            let wait = self.next_frame_in(self.now_ms());
            if event::poll(Duration::from_secs_f64(wait / 1000.0))? {
                self.handle_event(event::read()?)?;
                while !stop.is_stopped() && event::poll(Duration::ZERO)? {
                    self.handle_event(event::read()?)?;
                }
            }

            let now = self.now_ms();
            if stop.is_stopped() || self.next_frame_in(now) > 0.0 {
                continue;
            }

            let ticks = self.animation.ticks();
            self.animation.frame(&mut self.viewport, now)?;
            self.last_frame_ms = now;
            if self.animation.ticks() != ticks {
                self.draw_overlay()?;
            }
        }

        info!(ticks = self.animation.ticks(), "animation stopped");
        Ok(())
    }

    fn handle_event(&mut self, event: Event) -> Result<()> {
        match event {
            Event::Key(KeyEvent { code, kind, .. }) if kind != KeyEventKind::Release => {
                match key_action(code, self.viewport.settings()) {
                    Some(KeyAction::Quit) => self.animation.stop_handle().stop(),
                    Some(KeyAction::Settings(change)) => {
                        self.viewport.dispatch(ViewportEvent::Settings(change))?;
                        self.draw_overlay()?;
                    }
                    None => {}
                }
            }
            Event::Mouse(mouse) => {
                if let Some(pointer) = pointer_from_mouse(&mouse) {
                    self.viewport.dispatch(ViewportEvent::Pointer(pointer))?;
                }
            }
            Event::Resize(columns, rows) => match surface_for_terminal(columns, rows) {
                Ok(surface) => {
                    queue!(self.viewport.renderer_mut().writer_mut(), Clear(ClearType::All))?;
                    self.viewport.dispatch(ViewportEvent::Resize {
                        width: surface.width(),
                        height: surface.height(),
                        device_pixel_ratio: 1.0,
                    })?;
                    self.draw_overlay()?;
                }
                Err(err) => warn!(columns, rows, %err, "terminal too small, keeping previous size"),
            },
            _ => {}
        }
        Ok(())
    }

    fn draw_overlay(&mut self) -> Result<()> {
        let width = self.viewport.config().surface.width() as usize;
        let row = self.viewport.renderer().rows() as u16;

        let settings = settings_line(self.viewport.settings());
        let stats = self.viewport.stats();
        let status = format!(
            "{} | {} | drag: orbit  right-drag: pan  scroll: zoom  q: quit",
            stats.panel_text(StatsPanel::Fps),
            stats.panel_text(StatsPanel::Ms),
        );

        let out = self.viewport.renderer_mut().writer_mut();
        for (offset, (text, color)) in [(settings, TermColor::White), (status, TermColor::Yellow)]
            .into_iter()
            .enumerate()
        {
            let line: String = text.chars().take(width).collect();
            queue!(
                out,
                cursor::MoveTo(0, row + offset as u16),
                Clear(ClearType::CurrentLine),
                SetForegroundColor(color),
                Print(line),
                ResetColor
            )?;
        }
        out.flush()?;
        Ok(())
    }
}
