use anyhow::Result;
use minifb::{Key, KeyRepeat, MouseButton, MouseMode};

/// The preview window. Shows an RGB8 buffer of any size stretched to the
/// window, and reports clicks in buffer coordinates.
pub struct WindowOutput {
    window: minifb::Window,
    buffer: Vec<u32>,
    mouse_down_prev: bool,
}

impl WindowOutput {
    pub fn new(title: &str, width: usize, height: usize) -> Result<Self> {
        let mut window = minifb::Window::new(
            title,
            width,
            height,
            minifb::WindowOptions {
                resize: true,
                ..minifb::WindowOptions::default()
            },
        )
        .map_err(|e| anyhow::anyhow!("Failed to create window: {}", e))?;

        window.limit_update_rate(Some(std::time::Duration::from_micros(16600))); // ~60 FPS

        Ok(Self {
            window,
            buffer: Vec::new(),
            mouse_down_prev: false,
        })
    }

    pub fn is_open(&self) -> bool {
        self.window.is_open()
    }

    pub fn is_key_down(&self, key: Key) -> bool {
        self.window.is_key_down(key)
    }

    pub fn keys_pressed(&self) -> Vec<Key> {
        self.window.get_keys_pressed(KeyRepeat::No)
    }

    /// Position of a fresh left-button press, mapped onto a `buf_w` x `buf_h`
    /// buffer. Holding the button reports it once.
    pub fn take_click(&mut self, buf_w: usize, buf_h: usize) -> Option<(f32, f32)> {
        let down = self.window.get_mouse_down(MouseButton::Left);
        let pressed = down && !self.mouse_down_prev;
        self.mouse_down_prev = down;
        if !pressed {
            return None;
        }
        let pos = self.window.get_mouse_pos(MouseMode::Discard)?;
        Some(window_to_buffer(pos, self.window.get_size(), (buf_w, buf_h)))
    }

    pub fn update(&mut self, rgb: &[u8], width: usize, height: usize) -> Result<()> {
        pack_rgb(rgb, width * height, &mut self.buffer);
        self.window
            .update_with_buffer(&self.buffer, width, height)
            .map_err(|e| anyhow::anyhow!("Window update failed: {}", e))
    }
}

/// RGB8 to minifb's 0x00RRGGBB.
fn pack_rgb(rgb: &[u8], pixels: usize, out: &mut Vec<u32>) {
    out.clear();
    out.extend(rgb.chunks_exact(3).take(pixels).map(|c| {
        let r = c[0] as u32;
        let g = c[1] as u32;
        let b = c[2] as u32;
        (r << 16) | (g << 8) | b
    }));
    out.resize(pixels, 0);
}

fn window_to_buffer(pos: (f32, f32), window: (usize, usize), buffer: (usize, usize)) -> (f32, f32) {
    let (ww, wh) = (window.0.max(1) as f32, window.1.max(1) as f32);
    (pos.0 * buffer.0 as f32 / ww, pos.1 * buffer.1 as f32 / wh)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packs_rgb_and_pads_short_buffers() {
        let mut out = Vec::new();
        pack_rgb(&[0x12, 0x34, 0x56, 0xff, 0x00, 0x01], 3, &mut out);
        assert_eq!(out, vec![0x123456, 0xff0001, 0]);
    }

    #[test]
    fn click_scales_into_buffer() {
        assert_eq!(window_to_buffer((640.0, 360.0), (1280, 720), (1920, 1080)), (960.0, 540.0));
        assert_eq!(window_to_buffer((10.0, 10.0), (0, 0), (4, 4)), (40.0, 40.0));
    }
}
