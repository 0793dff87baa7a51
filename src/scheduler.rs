//! Refresh-rate coalescing of draw requests.
//!
//! Any number of requests between two display frames collapse into the
//! most recent one. Once detached, queued work is dropped and late frame
//! callbacks do nothing.

use std::cell::Cell;
use std::rc::Rc;

/// Shared flag telling scheduled callbacks whether their owner still exists.
#[derive(Debug, Clone)]
pub struct Liveness(Rc<Cell<bool>>);

impl Liveness {
    fn new() -> Self {
        Self(Rc::new(Cell::new(true)))
    }

    pub fn is_alive(&self) -> bool {
        self.0.get()
    }
}

#[derive(Debug)]
pub struct FrameScheduler<T> {
    pending: Option<T>,
    liveness: Liveness,
}

impl<T> Default for FrameScheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> FrameScheduler<T> {
    pub fn new() -> Self {
        Self {
            pending: None,
            liveness: Liveness::new(),
        }
    }

    /// Queue `request` for the next frame, replacing any earlier one.
    /// Returns false once detached.
    pub fn request(&mut self, request: T) -> bool {
        if !self.liveness.is_alive() {
            return false;
        }
        self.pending = Some(request);
        true
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Hand out the pending request for this frame.
    pub fn take(&mut self) -> Option<T> {
        if !self.liveness.is_alive() {
            return None;
        }
        self.pending.take()
    }

    pub fn detach(&mut self) {
        self.liveness.0.set(false);
        self.pending = None;
    }

    pub fn is_alive(&self) -> bool {
        self.liveness.is_alive()
    }

    pub fn liveness(&self) -> Liveness {
        self.liveness.clone()
    }
}
