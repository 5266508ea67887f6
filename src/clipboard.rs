use log::warn;

use crate::error::{HueError, Result};

/// Where copied color codes go.
pub trait ClipboardSink {
    fn set_text(&mut self, text: &str) -> Result<()>;
}

/// The OS clipboard. Held for the whole session; on X11 the contents
/// disappear when the owner is dropped.
pub struct SystemClipboard {
    inner: arboard::Clipboard,
}

impl SystemClipboard {
    pub fn new() -> Result<Self> {
        let inner = arboard::Clipboard::new().map_err(|e| HueError::Clipboard(e.to_string()))?;
        Ok(Self { inner })
    }
}

impl ClipboardSink for SystemClipboard {
    fn set_text(&mut self, text: &str) -> Result<()> {
        self.inner
            .set_text(text.to_owned())
            .map_err(|e| HueError::Clipboard(e.to_string()))
    }
}

/// Stand-in when no clipboard is reachable; every write fails.
pub struct NullClipboard;

impl ClipboardSink for NullClipboard {
    fn set_text(&mut self, _text: &str) -> Result<()> {
        Err(HueError::Clipboard("clipboard unavailable".to_string()))
    }
}

pub fn system_or_null() -> Box<dyn ClipboardSink> {
    match SystemClipboard::new() {
        Ok(cb) => Box::new(cb),
        Err(e) => {
            warn!("{}; copying is disabled", e);
            Box::new(NullClipboard)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_clipboard_rejects_writes() {
        let mut cb = NullClipboard;
        assert!(matches!(cb.set_text("#ffffff"), Err(HueError::Clipboard(_))));
    }
}
