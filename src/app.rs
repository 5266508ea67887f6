use std::time::{Duration, Instant};

use log::{debug, warn};

use crate::clipboard::ClipboardSink;
use crate::error::Result;
use crate::feedback::CopyFeedback;
use crate::types::{Color, PermissionState};

#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    PermissionResolved(PermissionState),
    Sampled(Color),
    /// A clipboard write went through.
    Copied(Instant),
    StreamFailed(String),
}

/// Everything the view depends on. Changes only through [`App::handle`].
#[derive(Debug, Clone)]
pub struct App {
    permission: PermissionState,
    sample: Option<Color>,
    feedback: CopyFeedback,
    stream_error: Option<String>,
}

impl App {
    pub fn new(copy_feedback: Duration) -> Self {
        Self {
            permission: PermissionState::Unknown,
            sample: None,
            feedback: CopyFeedback::new(copy_feedback),
            stream_error: None,
        }
    }

    pub fn handle(&mut self, event: AppEvent) -> Result<()> {
        match event {
            AppEvent::PermissionResolved(next) => {
                self.permission = self.permission.transition(next)?;
            }
            AppEvent::Sampled(color) => {
                if self.permission == PermissionState::Granted {
                    self.sample = Some(color);
                } else {
                    debug!("dropping sample without camera permission");
                }
            }
            AppEvent::Copied(at) => self.feedback.record(at),
            AppEvent::StreamFailed(reason) => self.stream_error = Some(reason),
        }
        Ok(())
    }

    pub fn permission(&self) -> PermissionState {
        self.permission
    }

    pub fn sample(&self) -> Option<Color> {
        self.sample
    }

    pub fn stream_error(&self) -> Option<&str> {
        self.stream_error.as_deref()
    }

    pub fn is_copied(&self, now: Instant) -> bool {
        self.feedback.is_copied(now)
    }

    /// Hex code of the current sample, if there is one.
    pub fn code(&self) -> Option<String> {
        self.sample.map(|c| c.to_hex())
    }

    /// Writes the current code to `sink`. A failed write is logged and
    /// otherwise ignored; only a successful one starts the feedback window.
    pub fn request_copy(&mut self, sink: &mut dyn ClipboardSink, now: Instant) -> bool {
        let Some(code) = self.code() else {
            return false;
        };
        match sink.set_text(&code) {
            Ok(()) => {
                debug!("copied {}", code);
                self.handle(AppEvent::Copied(now)).is_ok()
            }
            Err(e) => {
                warn!("copy failed: {}", e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HueError;

    #[derive(Default)]
    struct MemoryClipboard {
        text: Option<String>,
        fail: bool,
    }

    impl ClipboardSink for MemoryClipboard {
        fn set_text(&mut self, text: &str) -> Result<()> {
            if self.fail {
                return Err(HueError::Clipboard("busy".into()));
            }
            self.text = Some(text.to_string());
            Ok(())
        }
    }

    fn granted_app() -> App {
        let mut app = App::new(Duration::from_secs(2));
        app.handle(AppEvent::PermissionResolved(PermissionState::Granted)).unwrap();
        app
    }

    #[test]
    fn permission_cannot_flip() {
        let mut app = granted_app();
        let err = app.handle(AppEvent::PermissionResolved(PermissionState::Denied));
        assert!(matches!(err, Err(HueError::InvalidTransition { .. })));
        assert_eq!(app.permission(), PermissionState::Granted);
    }

    #[test]
    fn samples_need_permission() {
        let mut app = App::new(Duration::from_secs(2));
        app.handle(AppEvent::Sampled(Color::WHITE)).unwrap();
        assert_eq!(app.sample(), None);

        let mut app = granted_app();
        app.handle(AppEvent::Sampled(Color::new(255, 0, 0))).unwrap();
        assert_eq!(app.code().as_deref(), Some("#ff0000"));
        app.handle(AppEvent::Sampled(Color::BLACK)).unwrap();
        assert_eq!(app.code().as_deref(), Some("#000000"));
    }

    #[test]
    fn copy_writes_code_and_starts_feedback() {
        let now = Instant::now();
        let mut app = granted_app();
        app.handle(AppEvent::Sampled(Color::new(0x12, 0xab, 0xcd))).unwrap();

        let mut cb = MemoryClipboard::default();
        assert!(app.request_copy(&mut cb, now));
        assert_eq!(cb.text.as_deref(), Some("#12abcd"));
        assert!(app.is_copied(now + Duration::from_millis(500)));
        assert!(!app.is_copied(now + Duration::from_secs(2)));
    }

    #[test]
    fn failed_copy_is_silent() {
        let now = Instant::now();
        let mut app = granted_app();
        app.handle(AppEvent::Sampled(Color::WHITE)).unwrap();

        let mut cb = MemoryClipboard {
            fail: true,
            ..Default::default()
        };
        assert!(!app.request_copy(&mut cb, now));
        assert!(!app.is_copied(now));
    }

    #[test]
    fn nothing_to_copy_before_first_sample() {
        let mut app = granted_app();
        let mut cb = MemoryClipboard::default();
        assert!(!app.request_copy(&mut cb, Instant::now()));
        assert_eq!(cb.text, None);
    }

    #[test]
    fn stream_failure_is_recorded() {
        let mut app = granted_app();
        app.handle(AppEvent::StreamFailed("Open stream: busy".into())).unwrap();
        assert_eq!(app.stream_error(), Some("Open stream: busy"));
    }
}
