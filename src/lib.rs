pub mod app;
pub mod args;
pub mod camera;
pub mod clipboard;
pub mod color;
pub mod config;
pub mod draw;
pub mod error;
pub mod feedback;
pub mod font;
pub mod output;
pub mod permission;
pub mod presenter;
pub mod sampler;
pub mod ttf;
pub mod types;

pub use error::{HueError, Result};
pub use types::{Color, PermissionState};
