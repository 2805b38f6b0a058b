/// Half-block rasterizer for terminal rendering
///
/// Every character cell holds two vertically stacked pixels: the upper one
/// is the foreground of `▀`, the lower one its background. A surface of
/// `w x h` pixels therefore occupies `w` columns and `ceil(h / 2)` rows.
use crossterm::{
    cursor,
    style::{Color as TermColor, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    QueueableCommand,
};
use geometrie_core::frame::{FilledTriangle, LineSegment, Primitive};
use geometrie_core::{project_scene, Camera, Color, Renderer, Result, Scene, SurfaceSize};
use std::io::Write;

const HALF_BLOCK: char = '▀';

/// Software rasterizer that paints scenes into a terminal
pub struct TerminalRenderer<W: Write> {
    out: W,
    width: usize,
    height: usize,
    pixel_ratio: f64,
    background: Color,
    depth_buffer: Vec<f32>,
    color_buffer: Vec<Color>,
}

impl<W: Write> TerminalRenderer<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            width: 0,
            height: 0,
            pixel_ratio: 1.0,
            background: Color::BLACK,
            depth_buffer: Vec::new(),
            color_buffer: Vec::new(),
        }
    }

    pub fn writer_mut(&mut self) -> &mut W {
        &mut self.out
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Character rows covered by the image
    pub fn rows(&self) -> usize {
        self.height.div_ceil(2)
    }

    pub fn pixel_ratio(&self) -> f64 {
        self.pixel_ratio
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<Color> {
        if x < self.width && y < self.height {
            Some(self.color_buffer[y * self.width + x])
        } else {
            None
        }
    }

    pub fn clear(&mut self) {
        self.depth_buffer.fill(f32::INFINITY);
        self.color_buffer.fill(self.background);
    }

    /// Rasterize a projected frame into the pixel buffers
    pub fn rasterize(&mut self, primitives: &[Primitive]) {
        for primitive in primitives {
            match primitive {
                Primitive::Triangle(triangle) => self.rasterize_triangle(triangle),
                Primitive::Line(line) => self.rasterize_line(line),
            }
        }
    }

    fn plot(&mut self, x: i32, y: i32, depth: f32, color: Color, opacity: f32, depth_test: bool) {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return;
        }
        let idx = y as usize * self.width + x as usize;
        if depth_test {
            if depth >= self.depth_buffer[idx] {
                return;
            }
            self.depth_buffer[idx] = depth;
        }
        self.color_buffer[idx] = if opacity >= 1.0 {
            color
        } else {
            self.color_buffer[idx].lerp(color, opacity)
        };
    }

    fn rasterize_triangle(&mut self, triangle: &FilledTriangle) {
        let [v0, v1, v2] = triangle.points;

        // Bounding box
        let min_x = v0.x.min(v1.x).min(v2.x).floor() as i32;
        let max_x = v0.x.max(v1.x).max(v2.x).ceil() as i32;
        let min_y = v0.y.min(v1.y).min(v2.y).floor() as i32;
        let max_y = v0.y.max(v1.y).max(v2.y).ceil() as i32;

        // Clip to screen bounds
        let min_x = min_x.max(0);
        let max_x = max_x.min(self.width as i32 - 1);
        let min_y = min_y.max(0);
        let max_y = max_y.min(self.height as i32 - 1);

        // Scanline rasterization
        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let px = x as f32 + 0.5;
                let py = y as f32 + 0.5;

                // Barycentric coordinates
                if let Some((w0, w1, w2)) = barycentric((v0.x, v0.y), (v1.x, v1.y), (v2.x, v2.y), (px, py)) {
                    if w0 >= 0.0 && w1 >= 0.0 && w2 >= 0.0 {
                        // Interpolate depth
                        let depth = w0 * v0.depth + w1 * v1.depth + w2 * v2.depth;
                        self.plot(x, y, depth, triangle.color, triangle.opacity, triangle.depth_test);
                    }
                }
            }
        }
    }

    fn rasterize_line(&mut self, line: &LineSegment) {
        let (from, to) = (line.from, line.to);
        let (dx, dy) = (to.x - from.x, to.y - from.y);

        // Lines reaching far off-screen are sampled no finer than the
        // screen can show
        let limit = 4 * (self.width + self.height).max(1);
        let steps = (dx.abs().max(dy.abs()).ceil() as usize).clamp(1, limit);

        for step in 0..=steps {
            let t = step as f32 / steps as f32;
            let x = from.x + dx * t;
            let y = from.y + dy * t;
            let depth = from.depth + (to.depth - from.depth) * t;
            self.plot(x.floor() as i32, y.floor() as i32, depth, line.color, line.opacity, line.depth_test);
        }
    }

    /// Write the pixel buffer to the terminal, starting at the top-left cell
    pub fn draw(&mut self) -> std::io::Result<()> {
        let mut current: Option<(Color, Color)> = None;
        for row in 0..self.rows() {
            self.out.queue(cursor::MoveTo(0, row as u16))?;
            for x in 0..self.width {
                let top = self.color_buffer[(row * 2) * self.width + x];
                let bottom = if row * 2 + 1 < self.height {
                    self.color_buffer[(row * 2 + 1) * self.width + x]
                } else {
                    self.background
                };

                if current != Some((top, bottom)) {
                    self.out.queue(SetForegroundColor(term_color(top)))?;
                    self.out.queue(SetBackgroundColor(term_color(bottom)))?;
                    current = Some((top, bottom));
                }
                self.out.queue(Print(HALF_BLOCK))?;
            }
        }
        self.out.queue(ResetColor)?;
        Ok(())
    }
}

impl<W: Write> Renderer for TerminalRenderer<W> {
    fn set_size(&mut self, surface: SurfaceSize) {
        self.width = surface.width() as usize;
        self.height = surface.height() as usize;
        let size = self.width * self.height;
        self.depth_buffer = vec![f32::INFINITY; size];
        self.color_buffer = vec![self.background; size];
    }

    fn set_pixel_ratio(&mut self, ratio: f64) {
        // Cells cannot be subdivided further; the ratio is only recorded
        self.pixel_ratio = ratio;
    }

    fn render(&mut self, scene: &Scene, camera: &Camera) -> Result<()> {
        let surface = SurfaceSize::new(self.width as u32, self.height as u32)?;
        let list = project_scene(scene, camera, surface);

        self.clear();
        self.rasterize(&list.primitives);
        self.draw()?;
        self.out.flush()?;
        Ok(())
    }
}

fn term_color(color: Color) -> TermColor {
    TermColor::Rgb {
        r: color.r(),
        g: color.g(),
        b: color.b(),
    }
}

/// Calculate barycentric coordinates for a point in a triangle
fn barycentric(
    v0: (f32, f32),
    v1: (f32, f32),
    v2: (f32, f32),
    p: (f32, f32),
) -> Option<(f32, f32, f32)> {
    let denom = (v1.1 - v2.1) * (v0.0 - v2.0) + (v2.0 - v1.0) * (v0.1 - v2.1);

    if denom.abs() < 1e-6 {
        return None;
    }

    let w0 = ((v1.1 - v2.1) * (p.0 - v2.0) + (v2.0 - v1.0) * (p.1 - v2.1)) / denom;
    let w1 = ((v2.1 - v0.1) * (p.0 - v2.0) + (v0.0 - v2.0) * (p.1 - v2.1)) / denom;
    let w2 = 1.0 - w0 - w1;

    Some((w0, w1, w2))
}
