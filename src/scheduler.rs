//! Frame-callback scheduling.
//!
//! A session keeps at most one outstanding request. The host calls back into
//! [`SessionOrchestrator::on_frame`] with the id it was handed; an id that was
//! cancelled in the meantime is simply never delivered.
//!
//! [`SessionOrchestrator::on_frame`]: crate::SessionOrchestrator::on_frame

use std::collections::BTreeSet;

/// Identifies one registered frame callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FrameRequest(u64);

impl FrameRequest {
    /// Wrap a host-assigned id (e.g. the value `requestAnimationFrame`
    /// returned).
    #[must_use]
    pub fn from_raw(id: u64) -> Self {
        Self(id)
    }

    /// The raw id.
    #[must_use]
    pub fn raw(self) -> u64 {
        self.0
    }
}

/// The host's "call me on the next display refresh" facility.
pub trait FrameScheduler {
    /// Register a callback for the next frame.
    fn request_frame(&mut self) -> FrameRequest;

    /// Revoke a registration. After this returns the callback must not be
    /// delivered. Cancelling an unknown or already-delivered id is a no-op.
    fn cancel_frame(&mut self, request: FrameRequest);
}

/// A [`FrameScheduler`] for event-loop hosts.
///
/// Requests accumulate until the host's next redraw, where [`drain`] hands
/// them back for delivery.
///
/// [`drain`]: Self::drain
#[derive(Debug, Default)]
pub struct FrameQueue {
    next_id: u64,
    outstanding: BTreeSet<FrameRequest>,
}

impl FrameQueue {
    /// An empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Take every outstanding request, oldest first.
    pub fn drain(&mut self) -> Vec<FrameRequest> {
        std::mem::take(&mut self.outstanding).into_iter().collect()
    }

    /// Whether any callback is waiting. Hosts use this to decide whether to
    /// ask the window for another redraw.
    #[must_use]
    pub fn has_pending(&self) -> bool {
        !self.outstanding.is_empty()
    }

    /// Number of callbacks waiting.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.outstanding.len()
    }
}

impl FrameScheduler for FrameQueue {
    fn request_frame(&mut self) -> FrameRequest {
        self.next_id += 1;
        let request = FrameRequest(self.next_id);
        self.outstanding.insert(request);
        request
    }

    fn cancel_frame(&mut self, request: FrameRequest) {
        self.outstanding.remove(&request);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique() {
        let mut queue = FrameQueue::new();
        let a = queue.request_frame();
        let b = queue.request_frame();
        assert_ne!(a, b);
        assert_eq!(queue.drain(), vec![a, b]);
    }

    #[test]
    fn cancelled_requests_are_never_drained() {
        let mut queue = FrameQueue::new();
        let a = queue.request_frame();
        queue.cancel_frame(a);
        assert!(!queue.has_pending());
        assert!(queue.drain().is_empty());
    }

    #[test]
    fn drain_empties_the_queue() {
        let mut queue = FrameQueue::new();
        queue.request_frame();
        assert_eq!(queue.pending(), 1);
        assert_eq!(queue.drain().len(), 1);
        assert!(queue.drain().is_empty());
    }

    #[test]
    fn cancelling_a_delivered_request_is_harmless() {
        let mut queue = FrameQueue::new();
        let a = queue.request_frame();
        queue.drain();
        queue.cancel_frame(a);
        assert_eq!(queue.pending(), 0);
    }
}
