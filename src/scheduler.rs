//! Busy flag and cancellation for an external frame driver.
//!
//! The pipeline never schedules itself: a host loop (camera callback, render
//! tick, ...) calls into it once per frame. [`FrameScheduler`] is the small
//! piece of state that loop needs to keep at most one frame in flight per
//! stream and to stop cleanly at teardown.
//!
//! ```
//! use hand_gesture::FrameScheduler;
//!
//! let scheduler = FrameScheduler::new();
//! if let Some(_ticket) = scheduler.try_begin() {
//!     // classify this frame; the ticket frees the slot when dropped
//!     assert!(scheduler.try_begin().is_none());
//! }
//! assert!(!scheduler.is_busy());
//! ```

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// Per-stream in-flight guard and cancellation token.
#[derive(Debug, Default)]
pub struct FrameScheduler {
    busy: AtomicBool,
    cancelled: AtomicBool,
    dropped: AtomicU64,
}

/// Proof that the holder owns the stream's single in-flight slot.
///
/// Dropping the ticket marks the stream ready again.
#[derive(Debug)]
#[must_use = "dropping the ticket immediately frees the frame slot"]
pub struct FrameTicket<'a> {
    scheduler: &'a FrameScheduler,
}

impl FrameScheduler {
    /// Create an idle, uncancelled scheduler.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            busy: AtomicBool::new(false),
            cancelled: AtomicBool::new(false),
            dropped: AtomicU64::new(0),
        }
    }

    /// Claim the in-flight slot for a new frame.
    ///
    /// Returns `None` if a frame is already being processed or the stream
    /// has been cancelled; the caller should drop the frame.
    pub fn try_begin(&self) -> Option<FrameTicket<'_>> {
        if self.cancelled.load(Ordering::Acquire) {
            self.dropped.fetch_add(1, Ordering::Relaxed);
            return None;
        }
        if self
            .busy
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_err()
        {
            self.dropped.fetch_add(1, Ordering::Relaxed);
            return None;
        }
        Some(FrameTicket { scheduler: self })
    }

    /// Whether a frame is in flight.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Refuse all further frames.
    pub fn cancel(&self) {
        log::debug!("Frame scheduler cancelled");
        self.cancelled.store(true, Ordering::Release);
    }

    /// Whether [`cancel`](Self::cancel) has been called.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// Accept frames again and clear the drop counter.
    pub fn reset(&self) {
        self.cancelled.store(false, Ordering::Release);
        self.dropped.store(0, Ordering::Relaxed);
    }

    /// Frames refused because the stream was busy or cancelled.
    #[must_use]
    pub fn dropped_frames(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

impl Drop for FrameTicket<'_> {
    fn drop(&mut self) {
        self.scheduler.busy.store(false, Ordering::Release);
    }
}
