/// Canvas 2D renderer
///
/// Triangles are painted back to front inside each material group, then
/// the lines on top. The backing store is `css size * pixel ratio`.
use geometrie_core::frame::{FilledTriangle, LineSegment, Primitive};
use geometrie_core::{project_scene, Camera, Color, Error, Renderer, Result, Scene, SurfaceSize};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

const LINE_WIDTH: f64 = 1.0;

pub struct CanvasRenderer {
    canvas: HtmlCanvasElement,
    context: CanvasRenderingContext2d,
    surface: Option<SurfaceSize>,
    pixel_ratio: f64,
    background: Color,
}

fn js_error(err: JsValue) -> Error {
    Error::Render(format!("{:?}", err))
}

impl CanvasRenderer {
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self> {
        let context = canvas
            .get_context("2d")
            .map_err(js_error)?
            .ok_or_else(|| Error::Render("canvas has no 2d context".into()))?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| Error::Render("unexpected context type".into()))?;

        Ok(Self {
            canvas,
            context,
            surface: None,
            pixel_ratio: 1.0,
            background: Color::BLACK,
        })
    }

    pub fn canvas(&self) -> &HtmlCanvasElement {
        &self.canvas
    }

    fn resize_backing_store(&self) -> Result<()> {
        let Some(surface) = self.surface else {
            return Ok(());
        };
        let style = self.canvas.style();
        style
            .set_property("width", &format!("{}px", surface.width()))
            .map_err(js_error)?;
        style
            .set_property("height", &format!("{}px", surface.height()))
            .map_err(js_error)?;
        self.canvas
            .set_width((surface.width() as f64 * self.pixel_ratio).round() as u32);
        self.canvas
            .set_height((surface.height() as f64 * self.pixel_ratio).round() as u32);
        Ok(())
    }

    fn fill_triangle(&self, triangle: &FilledTriangle) {
        let [a, b, c] = triangle.points;
        let ctx = &self.context;
        ctx.set_global_alpha(triangle.opacity as f64);
        ctx.set_fill_style_str(&triangle.color.to_css());
        ctx.begin_path();
        ctx.move_to(a.x as f64, a.y as f64);
        ctx.line_to(b.x as f64, b.y as f64);
        ctx.line_to(c.x as f64, c.y as f64);
        ctx.close_path();
        ctx.fill();
        // hairline seams between neighbours otherwise show the background
        if triangle.opacity >= 1.0 {
            ctx.set_stroke_style_str(&triangle.color.to_css());
            ctx.stroke();
        }
    }

    fn stroke_line(&self, line: &LineSegment) {
        let ctx = &self.context;
        ctx.set_global_alpha(line.opacity as f64);
        ctx.set_stroke_style_str(&line.color.to_css());
        ctx.begin_path();
        ctx.move_to(line.from.x as f64, line.from.y as f64);
        ctx.line_to(line.to.x as f64, line.to.y as f64);
        ctx.stroke();
    }
}

/// Depth-tested triangles back to front, then everything else in
/// draw-list order
pub fn paint_order(primitives: &[Primitive]) -> Vec<Primitive> {
    let (mut ordered, rest): (Vec<Primitive>, Vec<Primitive>) = primitives
        .iter()
        .partition(|primitive| matches!(primitive, Primitive::Triangle(t) if t.depth_test));
    ordered.sort_by(|a, b| match (a, b) {
        (Primitive::Triangle(a), Primitive::Triangle(b)) => b.depth().total_cmp(&a.depth()),
        _ => std::cmp::Ordering::Equal,
    });
    ordered.extend(rest);
    ordered
}

impl Renderer for CanvasRenderer {
    fn set_size(&mut self, surface: SurfaceSize) {
        self.surface = Some(surface);
        if let Err(err) = self.resize_backing_store() {
            tracing::warn!(%err, "could not resize canvas");
        }
    }

    fn set_pixel_ratio(&mut self, ratio: f64) {
        self.pixel_ratio = ratio;
        if let Err(err) = self.resize_backing_store() {
            tracing::warn!(%err, "could not resize canvas");
        }
    }

    fn render(&mut self, scene: &Scene, camera: &Camera) -> Result<()> {
        let surface = self
            .surface
            .ok_or_else(|| Error::Render("render before set_size".into()))?;
        let list = project_scene(scene, camera, surface);

        let ctx = &self.context;
        ctx.set_transform(self.pixel_ratio, 0.0, 0.0, self.pixel_ratio, 0.0, 0.0)
            .map_err(js_error)?;
        ctx.set_global_alpha(1.0);
        ctx.set_fill_style_str(&self.background.to_css());
        ctx.fill_rect(0.0, 0.0, surface.width() as f64, surface.height() as f64);
        ctx.set_line_width(LINE_WIDTH);

        for primitive in paint_order(&list.primitives) {
            match primitive {
                Primitive::Triangle(triangle) => self.fill_triangle(&triangle),
                Primitive::Line(line) => self.stroke_line(&line),
            }
        }
        ctx.set_global_alpha(1.0);
        Ok(())
    }
}
