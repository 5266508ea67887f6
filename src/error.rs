use thiserror::Error;

use crate::types::PermissionState;

#[derive(Debug, Error)]
pub enum HueError {
    #[error("camera error: {0}")]
    Camera(String),

    #[error("clipboard error: {0}")]
    Clipboard(String),

    #[error("invalid permission transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: PermissionState,
        to: PermissionState,
    },
}

pub type Result<T> = std::result::Result<T, HueError>;
