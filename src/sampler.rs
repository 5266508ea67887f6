//! The center-pixel sampling loop.
//!
//! A [`SamplingSession`] owns the stream and a [`SamplingTask`] ticker. The
//! main loop pulls frames through it as fast as the camera delivers them.
//! Only when the task is due does a frame get copied into the offscreen
//! buffer and sampled. Dropping the session cancels the task and stops the
//! stream.

use std::time::{Duration, Instant};

use image::RgbImage;
use log::debug;

use crate::error::Result;
use crate::permission::Granted;
use crate::types::Color;

/// A live video stream.
pub trait FrameSource {
    fn capture(&mut self) -> Result<RgbImage>;

    /// Releases the device. Called once when the session ends.
    fn stop(&mut self) {}
}

/// Color at `(width / 2, height / 2)`. Empty frames have no center.
pub fn center_pixel(frame: &RgbImage) -> Option<Color> {
    let (w, h) = frame.dimensions();
    if w == 0 || h == 0 {
        return None;
    }
    Some(Color::from(*frame.get_pixel(w / 2, h / 2)))
}

/// Deadline-based repeating task, polled from the main loop.
///
/// Fires at most once per poll. Periods missed while the loop was busy are
/// skipped, not replayed.
#[derive(Debug)]
pub struct SamplingTask {
    period: Duration,
    next_due: Option<Instant>,
}

impl SamplingTask {
    /// The first tick is due immediately.
    pub fn start(period: Duration, now: Instant) -> Self {
        Self {
            period,
            next_due: Some(now),
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn is_active(&self) -> bool {
        self.next_due.is_some()
    }

    pub fn poll(&mut self, now: Instant) -> bool {
        let Some(due) = self.next_due else {
            return false;
        };
        if now < due {
            return false;
        }
        let mut next = due + self.period;
        if next <= now {
            next = now + self.period;
        }
        self.next_due = Some(next);
        true
    }

    pub fn cancel(&mut self) {
        self.next_due = None;
    }
}

pub struct SamplingSession<S: FrameSource> {
    source: S,
    task: SamplingTask,
    live: RgbImage,
    offscreen: RgbImage,
    mirror: bool,
}

impl<S: FrameSource> SamplingSession<S> {
    pub fn start(source: S, _granted: Granted, period: Duration, now: Instant) -> Self {
        debug!("sampling every {:?}", period);
        Self {
            source,
            task: SamplingTask::start(period, now),
            live: RgbImage::new(0, 0),
            offscreen: RgbImage::new(0, 0),
            mirror: false,
        }
    }

    pub fn with_mirror(mut self, mirror: bool) -> Self {
        self.mirror = mirror;
        self
    }

    /// Pulls the next frame and, when the task is due, samples its center.
    pub fn advance(&mut self, now: Instant) -> Result<Option<Color>> {
        if !self.task.is_active() {
            return Ok(None);
        }

        let mut frame = self.source.capture()?;
        if self.mirror {
            image::imageops::flip_horizontal_in_place(&mut frame);
        }
        self.live = frame;

        if !self.task.poll(now) {
            return Ok(None);
        }

        if self.offscreen.dimensions() == self.live.dimensions() {
            self.offscreen.copy_from_slice(&self.live);
        } else {
            self.offscreen = self.live.clone();
        }
        Ok(center_pixel(&self.offscreen))
    }

    /// Most recent frame, for display.
    pub fn frame(&self) -> &RgbImage {
        &self.live
    }

    pub fn is_active(&self) -> bool {
        self.task.is_active()
    }

    pub fn source(&self) -> &S {
        &self.source
    }
}

impl<S: FrameSource> Drop for SamplingSession<S> {
    fn drop(&mut self) {
        self.task.cancel();
        self.source.stop();
        debug!("sampling session closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::permission::{AuthorizationStatus, CameraAuthorization, PermissionManager};
    use image::Rgb;
    use std::cell::Cell;
    use std::rc::Rc;

    struct AlwaysGranted;

    impl CameraAuthorization for AlwaysGranted {
        fn query(&self) -> AuthorizationStatus {
            AuthorizationStatus::Granted
        }
        fn request(&mut self) -> bool {
            true
        }
    }

    fn granted() -> Granted {
        let mut mgr = PermissionManager::new(AlwaysGranted);
        mgr.resolve();
        mgr.granted().unwrap()
    }

    /// Solid frames whose red channel counts captures.
    struct CountingSource {
        captures: u8,
        stopped: Rc<Cell<bool>>,
    }

    impl FrameSource for CountingSource {
        fn capture(&mut self) -> Result<RgbImage> {
            self.captures += 1;
            Ok(RgbImage::from_pixel(4, 2, Rgb([self.captures, 0, 0])))
        }

        fn stop(&mut self) {
            self.stopped.set(true);
        }
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn center_pixel_reads_midpoint() {
        let mut frame = RgbImage::from_pixel(5, 3, Rgb([0, 0, 0]));
        frame.put_pixel(2, 1, Rgb([10, 20, 30]));
        assert_eq!(center_pixel(&frame), Some(Color::new(10, 20, 30)));

        let mut frame = RgbImage::from_pixel(4, 4, Rgb([0, 0, 0]));
        frame.put_pixel(2, 2, Rgb([1, 2, 3]));
        assert_eq!(center_pixel(&frame), Some(Color::new(1, 2, 3)));
    }

    #[test]
    fn empty_frame_has_no_center() {
        assert_eq!(center_pixel(&RgbImage::new(0, 0)), None);
        assert_eq!(center_pixel(&RgbImage::new(8, 0)), None);
    }

    #[test]
    fn task_fires_once_per_period() {
        let t0 = Instant::now();
        let mut task = SamplingTask::start(ms(100), t0);
        assert!(task.poll(t0));
        assert!(!task.poll(t0));
        assert!(!task.poll(t0 + ms(99)));
        assert!(task.poll(t0 + ms(100)));
        assert!(!task.poll(t0 + ms(150)));
        assert!(task.poll(t0 + ms(200)));
    }

    #[test]
    fn task_skips_missed_periods() {
        let t0 = Instant::now();
        let mut task = SamplingTask::start(ms(100), t0);
        assert!(task.poll(t0));
        // The loop stalled for half a second: one tick, not five.
        assert!(task.poll(t0 + ms(550)));
        assert!(!task.poll(t0 + ms(600)));
        assert!(task.poll(t0 + ms(650)));
    }

    #[test]
    fn cancelled_task_never_fires() {
        let t0 = Instant::now();
        let mut task = SamplingTask::start(ms(100), t0);
        task.cancel();
        assert!(!task.is_active());
        assert!(!task.poll(t0 + ms(1000)));
    }

    #[test]
    fn session_samples_only_when_due() {
        let t0 = Instant::now();
        let stopped = Rc::new(Cell::new(false));
        let source = CountingSource {
            captures: 0,
            stopped: stopped.clone(),
        };
        let mut session = SamplingSession::start(source, granted(), ms(100), t0);

        assert_eq!(session.advance(t0).unwrap(), Some(Color::new(1, 0, 0)));
        assert_eq!(session.advance(t0 + ms(30)).unwrap(), None);
        assert_eq!(session.frame().get_pixel(0, 0), &Rgb([2, 0, 0]));
        assert_eq!(session.advance(t0 + ms(60)).unwrap(), None);
        assert_eq!(session.advance(t0 + ms(100)).unwrap(), Some(Color::new(4, 0, 0)));
        assert_eq!(session.source().captures, 4);
    }

    #[test]
    fn dropping_session_stops_stream() {
        let stopped = Rc::new(Cell::new(false));
        let source = CountingSource {
            captures: 0,
            stopped: stopped.clone(),
        };
        let session = SamplingSession::start(source, granted(), ms(100), Instant::now());
        assert!(session.is_active());
        drop(session);
        assert!(stopped.get());
    }

    #[test]
    fn mirror_flips_before_sampling() {
        struct Split;
        impl FrameSource for Split {
            fn capture(&mut self) -> Result<RgbImage> {
                // Left half red, right half blue.
                Ok(RgbImage::from_fn(4, 1, |x, _| {
                    if x < 2 { Rgb([255, 0, 0]) } else { Rgb([0, 0, 255]) }
                }))
            }
        }

        let t0 = Instant::now();
        let mut plain = SamplingSession::start(Split, granted(), ms(100), t0);
        assert_eq!(plain.advance(t0).unwrap(), Some(Color::new(0, 0, 255)));

        let mut mirrored = SamplingSession::start(Split, granted(), ms(100), t0).with_mirror(true);
        assert_eq!(mirrored.advance(t0).unwrap(), Some(Color::new(255, 0, 0)));
    }
}
