use std::cell::Cell;
use std::rc::Rc;
use std::time::Instant;

use super::{FrameClock, FrameTime};

/// An outstanding frame request.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct FrameRequest(pub u64);

/// Something that can call back once per display frame.
pub trait FrameScheduler {
    /// Asks for one callback at the next frame.
    fn request(&mut self) -> FrameRequest;

    /// Withdraws a request that has not fired yet.
    fn cancel(&mut self, request: FrameRequest);
}

/// Drives a per-frame callback with timing data.
///
/// Each fired frame requests the next one before reporting its timing, so
/// the loop keeps going until [`FrameDriver::stop`] or drop, both of which
/// cancel the outstanding request.
pub struct FrameDriver<S: FrameScheduler> {
    scheduler: S,
    clock: FrameClock,
    pending: Option<FrameRequest>,
}

impl<S: FrameScheduler> FrameDriver<S> {
    pub fn new(scheduler: S) -> Self {
        Self {
            scheduler,
            clock: FrameClock::new(),
            pending: None,
        }
    }

    pub fn start(&mut self) {
        self.start_at(Instant::now());
    }

    /// Starts (or restarts) timing at `now` and requests the first frame.
    pub fn start_at(&mut self, now: Instant) {
        self.stop();
        self.clock.reset_at(now);
        self.pending = Some(self.scheduler.request());
    }

    pub fn fire(&mut self) -> Option<FrameTime> {
        self.fire_at(Instant::now())
    }

    /// Handles the scheduler's callback. `None` when no frame was requested.
    pub fn fire_at(&mut self, now: Instant) -> Option<FrameTime> {
        self.pending.take()?;
        self.pending = Some(self.scheduler.request());
        Some(self.clock.tick_at(now))
    }

    /// Cancels the outstanding request. No frame fires after this.
    pub fn stop(&mut self) {
        if let Some(request) = self.pending.take() {
            self.scheduler.cancel(request);
        }
    }

    pub fn is_running(&self) -> bool {
        self.pending.is_some()
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }
}

impl<S: FrameScheduler> Drop for FrameDriver<S> {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Scheduler backed by window redraws.
///
/// Holds at most one request. The runtime takes it and turns it into a
/// redraw of its window; a cancelled request is simply forgotten.
#[derive(Debug, Clone, Default)]
pub struct RedrawScheduler {
    next_id: Rc<Cell<u64>>,
    pending: Rc<Cell<Option<FrameRequest>>>,
}

impl RedrawScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes the outstanding request, if any.
    pub fn take_request(&self) -> Option<FrameRequest> {
        self.pending.take()
    }

    pub fn has_request(&self) -> bool {
        self.pending.get().is_some()
    }
}

impl FrameScheduler for RedrawScheduler {
    fn request(&mut self) -> FrameRequest {
        let request = FrameRequest(self.next_id.get());
        self.next_id.set(request.0.wrapping_add(1));
        self.pending.set(Some(request));
        request
    }

    fn cancel(&mut self, request: FrameRequest) {
        if self.pending.get() == Some(request) {
            self.pending.set(None);
        }
    }
}
