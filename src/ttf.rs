use log::{debug, info};
use rusttype::{point, Font, Scale};
use std::fs;
use std::path::Path;

use crate::draw::Canvas;
use crate::types::Color;

pub struct FontRenderer {
    font: Font<'static>,
}

impl FontRenderer {
    pub fn try_load(family: &str) -> Option<Self> {
        // Family is like "DejaVuSans", "Arial"; files are "<family>.ttf"
        let paths = [
            format!("/Library/Fonts/{}.ttf", family),
            format!("/System/Library/Fonts/{}.ttf", family),
            format!("/System/Library/Fonts/Supplemental/{}.ttf", family),
            format!("/usr/share/fonts/truetype/{}.ttf", family),
            format!("/usr/share/fonts/truetype/dejavu/{}.ttf", family),
            format!("C:\\Windows\\Fonts\\{}.ttf", family),
            format!("{}.ttf", family),
        ];

        for p in paths.iter() {
            if !Path::new(p).exists() {
                continue;
            }
            if let Some(font) = fs::read(p).ok().and_then(Font::try_from_vec) {
                info!("Loaded font from {}", p);
                return Some(Self { font });
            }
        }

        debug!("Could not find font family '{}'. Falling back to bitmap.", family);
        None
    }

    pub fn draw_text(&self, canvas: &mut Canvas, x: i32, y: i32, text: &str, color: Color, size_pt: f32) {
        let scale = Scale::uniform(size_pt);
        let v_metrics = self.font.v_metrics(scale);
        let start = point(x as f32, y as f32 + v_metrics.ascent);

        for glyph in self.font.layout(text, scale, start) {
            if let Some(bb) = glyph.pixel_bounding_box() {
                glyph.draw(|gx, gy, v| {
                    if v > 0.2 {
                        canvas.set_pixel(bb.min.x + gx as i32, bb.min.y + gy as i32, color);
                    }
                });
            }
        }
    }

    /// Advance width of the laid out text.
    pub fn measure_width(&self, text: &str, size_pt: f32) -> usize {
        let scale = Scale::uniform(size_pt);
        self.font
            .layout(text, scale, point(0.0, 0.0))
            .last()
            .map(|g| g.position().x + g.unpositioned().h_metrics().advance_width)
            .map_or(0, |w| w.ceil() as usize)
    }

    pub fn measure_height(&self, size_pt: f32) -> usize {
        let v_metrics = self.font.v_metrics(Scale::uniform(size_pt));
        (v_metrics.ascent - v_metrics.descent).ceil() as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_family_falls_back() {
        assert!(FontRenderer::try_load("definitely-not-a-font-family").is_none());
    }
}
