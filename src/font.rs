//! A tiny 3x5 bitmap font, used when no TrueType font could be loaded.
//! Letters render as uppercase.
use crate::draw::Canvas;
use crate::types::Color;

const GLYPH_W: usize = 3;
const GLYPH_H: usize = 5;

pub fn draw_text_line(canvas: &mut Canvas, x: i32, y: i32, text: &str, color: Color, scale: usize) {
    let mut cx = x;
    for c in text.chars() {
        draw_char(canvas, cx, y, c, color, scale);
        cx += ((GLYPH_W + 1) * scale) as i32; // 3 width + 1 spacing, scaled
    }
}

pub fn measure_text_width(text: &str, scale: usize) -> usize {
    let n = text.chars().count();
    if n == 0 {
        return 0;
    }
    n * (GLYPH_W + 1) * scale - scale
}

pub fn text_height(scale: usize) -> usize {
    GLYPH_H * scale
}

fn glyph(c: char) -> [u8; GLYPH_H] {
    // Rows top to bottom, 3 bits each (bit 2 = left column)
    match c.to_ascii_uppercase() {
        '0' => [0x7, 0x5, 0x5, 0x5, 0x7],
        '1' => [0x2, 0x6, 0x2, 0x2, 0x7],
        '2' => [0x7, 0x1, 0x7, 0x4, 0x7],
        '3' => [0x7, 0x1, 0x7, 0x1, 0x7],
        '4' => [0x5, 0x5, 0x7, 0x1, 0x1],
        '5' => [0x7, 0x4, 0x7, 0x1, 0x7],
        '6' => [0x7, 0x4, 0x7, 0x5, 0x7],
        '7' => [0x7, 0x1, 0x2, 0x4, 0x4],
        '8' => [0x7, 0x5, 0x7, 0x5, 0x7],
        '9' => [0x7, 0x5, 0x7, 0x1, 0x7],
        'A' => [0x2, 0x5, 0x7, 0x5, 0x5],
        'B' => [0x6, 0x5, 0x6, 0x5, 0x6],
        'C' => [0x7, 0x4, 0x4, 0x4, 0x7],
        'D' => [0x6, 0x5, 0x5, 0x5, 0x6],
        'E' => [0x7, 0x4, 0x6, 0x4, 0x7],
        'F' => [0x7, 0x4, 0x6, 0x4, 0x4],
        'G' => [0x7, 0x4, 0x5, 0x5, 0x7],
        'H' => [0x5, 0x5, 0x7, 0x5, 0x5],
        'I' => [0x7, 0x2, 0x2, 0x2, 0x7],
        'J' => [0x1, 0x1, 0x1, 0x5, 0x7],
        'K' => [0x5, 0x5, 0x6, 0x5, 0x5],
        'L' => [0x4, 0x4, 0x4, 0x4, 0x7],
        'M' => [0x5, 0x7, 0x7, 0x5, 0x5],
        'N' => [0x6, 0x5, 0x5, 0x5, 0x5],
        'O' => [0x7, 0x5, 0x5, 0x5, 0x7],
        'P' => [0x7, 0x5, 0x7, 0x4, 0x4],
        'Q' => [0x7, 0x5, 0x5, 0x7, 0x1],
        'R' => [0x6, 0x5, 0x6, 0x5, 0x5],
        'S' => [0x3, 0x4, 0x2, 0x1, 0x6], // approx
        'T' => [0x7, 0x2, 0x2, 0x2, 0x2],
        'U' => [0x5, 0x5, 0x5, 0x5, 0x7],
        'V' => [0x5, 0x5, 0x5, 0x5, 0x2],
        'W' => [0x5, 0x5, 0x7, 0x7, 0x5],
        'X' => [0x5, 0x5, 0x2, 0x5, 0x5],
        'Y' => [0x5, 0x5, 0x2, 0x2, 0x2],
        'Z' => [0x7, 0x1, 0x2, 0x4, 0x7],
        ' ' => [0x0, 0x0, 0x0, 0x0, 0x0],
        '#' => [0x5, 0x7, 0x5, 0x7, 0x5],
        '!' => [0x2, 0x2, 0x2, 0x0, 0x2],
        '.' => [0x0, 0x0, 0x0, 0x0, 0x2],
        ',' => [0x0, 0x0, 0x0, 0x2, 0x4],
        ':' => [0x0, 0x2, 0x0, 0x2, 0x0],
        '-' => [0x0, 0x0, 0x7, 0x0, 0x0],
        '(' => [0x2, 0x4, 0x4, 0x4, 0x2],
        ')' => [0x2, 0x1, 0x1, 0x1, 0x2],
        _ => [0x7, 0x7, 0x7, 0x7, 0x7], // block
    }
}

fn draw_char(canvas: &mut Canvas, x: i32, y: i32, c: char, color: Color, scale: usize) {
    let s = scale as i32;
    for (row, bits) in glyph(c).iter().enumerate() {
        for col in 0..GLYPH_W {
            if (bits >> (GLYPH_W - 1 - col)) & 1 == 1 {
                let px = x + col as i32 * s;
                let py = y + row as i32 * s;
                canvas.fill_rect_px(px, py, s, s, color);
            }
        }
    }
}
