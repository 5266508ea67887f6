//! Software drawing into the RGB8 display buffer.

use crate::font;
use crate::presenter::{LiveView, Pill, View};
use crate::ttf::FontRenderer;
use crate::types::{Color, Rect};

/// Mutable view over a packed RGB8 buffer. Everything outside the bounds is
/// clipped.
pub struct Canvas<'a> {
    buf: &'a mut [u8],
    width: usize,
    height: usize,
}

impl<'a> Canvas<'a> {
    pub fn new(buf: &'a mut [u8], width: usize, height: usize) -> Self {
        Self { buf, width, height }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return None;
        }
        let idx = (y as usize * self.width + x as usize) * 3;
        (idx + 2 < self.buf.len()).then_some(idx)
    }

    pub fn pixel(&self, x: i32, y: i32) -> Option<Color> {
        self.index(x, y)
            .map(|i| Color::new(self.buf[i], self.buf[i + 1], self.buf[i + 2]))
    }

    pub fn set_pixel(&mut self, x: i32, y: i32, color: Color) {
        if let Some(idx) = self.index(x, y) {
            self.buf[idx] = color.r;
            self.buf[idx + 1] = color.g;
            self.buf[idx + 2] = color.b;
        }
    }

    pub fn clear(&mut self, color: Color) {
        for px in self.buf.chunks_exact_mut(3) {
            px.copy_from_slice(&[color.r, color.g, color.b]);
        }
    }

    pub fn fill_rect_px(&mut self, x: i32, y: i32, w: i32, h: i32, color: Color) {
        for py in y..y + h {
            for px in x..x + w {
                self.set_pixel(px, py, color);
            }
        }
    }

    pub fn fill_rect(&mut self, rect: Rect, color: Color) {
        let (x, y, w, h) = snap(rect);
        self.fill_rect_px(x, y, w, h, color);
    }

    /// Outline drawn inward from the edge of `rect`.
    pub fn stroke_rect(&mut self, rect: Rect, thickness: i32, color: Color) {
        let (x, y, w, h) = snap(rect);
        let t = thickness.min(w / 2).min(h / 2).max(1);
        self.fill_rect_px(x, y, w, t, color);
        self.fill_rect_px(x, y + h - t, w, t, color);
        self.fill_rect_px(x, y + t, t, h - 2 * t, color);
        self.fill_rect_px(x + w - t, y + t, t, h - 2 * t, color);
    }

    pub fn fill_rounded_rect(&mut self, rect: Rect, radius: i32, color: Color) {
        let (x, y, w, h) = snap(rect);
        let r = radius.min(w / 2).min(h / 2).max(0);
        for py in 0..h {
            for px in 0..w {
                if inside_rounded(px, py, w, h, r) {
                    self.set_pixel(x + px, y + py, color);
                }
            }
        }
    }
}

fn snap(rect: Rect) -> (i32, i32, i32, i32) {
    (
        rect.x.round() as i32,
        rect.y.round() as i32,
        rect.width.round() as i32,
        rect.height.round() as i32,
    )
}

fn inside_rounded(px: i32, py: i32, w: i32, h: i32, r: i32) -> bool {
    if r == 0 {
        return true;
    }
    // Distance from the nearest corner circle center, pixel centers at +0.5
    let cx = if px < r { r } else if px >= w - r { w - r } else { return true };
    let cy = if py < r { r } else if py >= h - r { h - r } else { return true };
    let dx = (px as f32 + 0.5) - cx as f32;
    let dy = (py as f32 + 0.5) - cy as f32;
    dx * dx + dy * dy <= (r * r) as f32
}

/// TrueType text when a font was found, the bitmap font otherwise.
pub enum TextRenderer {
    TrueType { font: FontRenderer, size_pt: f32 },
    Bitmap { scale: usize },
}

impl TextRenderer {
    pub fn load(family: &str, size_pt: f32, bitmap_scale: usize) -> Self {
        match FontRenderer::try_load(family) {
            Some(font) => TextRenderer::TrueType { font, size_pt },
            None => TextRenderer::Bitmap {
                scale: bitmap_scale.max(1),
            },
        }
    }

    pub fn measure(&self, text: &str) -> (usize, usize) {
        match self {
            TextRenderer::TrueType { font, size_pt } => {
                (font.measure_width(text, *size_pt), font.measure_height(*size_pt))
            }
            TextRenderer::Bitmap { scale } => {
                (font::measure_text_width(text, *scale), font::text_height(*scale))
            }
        }
    }

    pub fn draw(&self, canvas: &mut Canvas, x: i32, y: i32, text: &str, color: Color) {
        match self {
            TextRenderer::TrueType { font, size_pt } => {
                font.draw_text(canvas, x, y, text, color, *size_pt)
            }
            TextRenderer::Bitmap { scale } => font::draw_text_line(canvas, x, y, text, color, *scale),
        }
    }
}

/// Paints `view` over whatever the canvas holds (the camera frame, for a
/// live view).
pub fn render(canvas: &mut Canvas, view: &View, text: &TextRenderer) {
    match view {
        View::Status { message } => {
            canvas.clear(Color::BLACK);
            let (tw, th) = text.measure(message);
            let x = (canvas.width() as i32 - tw as i32) / 2;
            let y = (canvas.height() as i32 - th as i32) / 2;
            text.draw(canvas, x.max(0), y.max(0), message, Color::WHITE);
        }
        View::Live(live) => render_live(canvas, live, text),
    }
}

fn render_live(canvas: &mut Canvas, live: &LiveView, text: &TextRenderer) {
    canvas.stroke_rect(live.marker, live.marker_border as i32, live.marker_color);
    if let Some(pill) = &live.pill {
        render_pill(canvas, pill, text);
    }
}

fn render_pill(canvas: &mut Canvas, pill: &Pill, text: &TextRenderer) {
    canvas.fill_rounded_rect(pill.bounds, pill.radius as i32, pill.background);
    let (x, y) = pill.text_origin;
    text.draw(canvas, x.round() as i32, y.round() as i32, pill.label.text(), pill.foreground);
}
