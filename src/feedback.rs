use std::time::{Duration, Instant};

/// Remembers the last successful copy so the pill can say "Copied!!" for a
/// short while.
#[derive(Debug, Clone)]
pub struct CopyFeedback {
    window: Duration,
    last_copy: Option<Instant>,
}

impl CopyFeedback {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last_copy: None,
        }
    }

    pub fn record(&mut self, now: Instant) {
        self.last_copy = Some(now);
    }

    pub fn last_copy(&self) -> Option<Instant> {
        self.last_copy
    }

    /// True for `now` in `[t, t + window)`.
    pub fn is_copied(&self, now: Instant) -> bool {
        self.last_copy
            .and_then(|t| now.checked_duration_since(t))
            .map_or(false, |elapsed| elapsed < self.window)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_SECS: Duration = Duration::from_secs(2);

    #[test]
    fn idle_before_any_copy() {
        let fb = CopyFeedback::new(TWO_SECS);
        assert!(!fb.is_copied(Instant::now()));
        assert_eq!(fb.last_copy(), None);
    }

    #[test]
    fn window_is_half_open() {
        let t = Instant::now();
        let mut fb = CopyFeedback::new(TWO_SECS);
        fb.record(t);
        assert!(fb.is_copied(t));
        assert!(fb.is_copied(t + Duration::from_millis(1999)));
        assert!(!fb.is_copied(t + TWO_SECS));
        assert!(!fb.is_copied(t + Duration::from_secs(10)));
    }

    #[test]
    fn later_copy_restarts_window() {
        let t = Instant::now();
        let mut fb = CopyFeedback::new(TWO_SECS);
        fb.record(t);
        fb.record(t + Duration::from_millis(1500));
        assert!(fb.is_copied(t + Duration::from_millis(3000)));
        assert!(!fb.is_copied(t + Duration::from_millis(3500)));
    }

    #[test]
    fn query_before_copy_time_is_not_copied() {
        let t = Instant::now();
        let mut fb = CopyFeedback::new(TWO_SECS);
        fb.record(t + Duration::from_secs(1));
        assert!(!fb.is_copied(t));
    }
}
