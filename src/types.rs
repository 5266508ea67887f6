use crate::error::{HueError, Result};

/// A single sampled pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::new(0, 0, 0);
    pub const WHITE: Color = Color::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl From<image::Rgb<u8>> for Color {
    fn from(px: image::Rgb<u8>) -> Self {
        Self::new(px[0], px[1], px[2])
    }
}

/// Camera permission for the current session.
///
/// Starts as `Unknown` and resolves exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PermissionState {
    #[default]
    Unknown,
    Granted,
    Denied,
}

impl PermissionState {
    pub fn is_resolved(self) -> bool {
        self != PermissionState::Unknown
    }

    /// Validates a move to `next`. Re-applying the current state is a no-op.
    pub fn transition(self, next: PermissionState) -> Result<PermissionState> {
        match (self, next) {
            (a, b) if a == b => Ok(a),
            (PermissionState::Unknown, resolved) => Ok(resolved),
            (from, to) => Err(HueError::InvalidTransition { from, to }),
        }
    }
}

/// Which way the preferred camera should point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FacingMode {
    /// Rear camera, pointing away from the user.
    Environment,
    /// Front camera.
    User,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    pub fn contains(&self, px: f32, py: f32) -> bool {
        px >= self.x && px < self.x + self.width && py >= self.y && py < self.y + self.height
    }

    pub fn center(&self) -> (f32, f32) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}
