//! Frame clock for the host loop.
//!
//! A [`FrameScheduler`] stands in for the display's frame-ready signal: each
//! call to [`FrameScheduler::next_frame`] arms one deadline, waits for it and
//! hands back a [`Frame`]. The [`CancelHandle`] returned at subscribe time
//! stops the clock; once cancelled no further frame is produced.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    /// Zero-based count of frames delivered by this scheduler.
    pub index: u64,
    /// Time since the previous frame (zero for the first).
    pub delta: Duration,
}

/// Stops a [`FrameScheduler`]. Clones share the same flag.
#[derive(Debug, Clone)]
pub struct CancelHandle {
    cancelled: Arc<AtomicBool>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Wraps the handle so that dropping the guard cancels the scheduler.
    pub fn cancel_on_drop(self) -> CancelGuard {
        CancelGuard(self)
    }
}

/// Cancels its scheduler when dropped.
#[derive(Debug)]
pub struct CancelGuard(CancelHandle);

impl Drop for CancelGuard {
    fn drop(&mut self) {
        self.0.cancel();
    }
}

#[derive(Debug)]
pub struct FrameScheduler {
    interval: Duration,
    next_deadline: Option<Instant>,
    last_frame: Option<Instant>,
    index: u64,
    cancelled: Arc<AtomicBool>,
}

impl FrameScheduler {
    pub fn subscribe(interval: Duration) -> (Self, CancelHandle) {
        let cancelled = Arc::new(AtomicBool::new(false));
        let scheduler = Self {
            interval,
            next_deadline: None,
            last_frame: None,
            index: 0,
            cancelled: Arc::clone(&cancelled),
        };
        (scheduler, CancelHandle { cancelled })
    }

    /// Interval for a target frame rate; a rate of zero is treated as one.
    pub fn interval_for_fps(fps: u32) -> Duration {
        Duration::from_nanos(1_000_000_000 / u64::from(fps.max(1)))
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Waits for the armed deadline and re-arms the next one.
    ///
    /// Returns `None` once cancelled, without waiting. The first frame fires
    /// immediately. A late frame re-arms from the current time instead of
    /// bursting to catch up.
    pub fn next_frame(&mut self) -> Option<Frame> {
        if self.cancelled.load(Ordering::SeqCst) {
            self.next_deadline = None;
            return None;
        }

        if let Some(deadline) = self.next_deadline {
            let now = Instant::now();
            if deadline > now {
                std::thread::sleep(deadline - now);
            }
            // Cancelled while sleeping: drop the pending frame.
            if self.cancelled.load(Ordering::SeqCst) {
                self.next_deadline = None;
                return None;
            }
        }

        let now = Instant::now();
        let delta = self.last_frame.map_or(Duration::ZERO, |last| now - last);
        self.last_frame = Some(now);
        self.next_deadline = Some(now + self.interval);

        let frame = Frame {
            index: self.index,
            delta,
        };
        self.index += 1;
        Some(frame)
    }

    /// Whether a deadline is currently armed.
    pub fn is_armed(&self) -> bool {
        self.next_deadline.is_some()
    }
}
