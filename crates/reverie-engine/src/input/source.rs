use std::time::Duration;

use super::types::{Event, EventKind};

/// Queue of normalized events consumed by the interaction loop.
///
/// The loop never blocks except through [`EventSource::wait`], and always
/// with a finite timeout derived from its armed deadlines.
pub trait EventSource {
    /// Next queued event without removing it. Never blocks.
    fn peek(&mut self) -> Option<&Event>;

    /// Removes and returns the next queued event. Never blocks.
    fn poll(&mut self) -> Option<Event>;

    /// Blocks until an event arrives or `timeout` elapses (`None` = no limit).
    /// Returns `None` on timeout.
    fn wait(&mut self, timeout: Option<Duration>) -> Option<Event>;

    /// Appends an event to the queue.
    fn post(&mut self, ev: Event);

    /// Removes every queued event of `kind`, in arrival order.
    fn drain(&mut self, kind: EventKind) -> Vec<Event>;

    /// Drops every queued event whose kind is listed.
    fn clear(&mut self, kinds: &[EventKind]) {
        for kind in kinds {
            let _ = self.drain(*kind);
        }
    }

    /// True when an event of a kind not listed in `ignore` is queued.
    fn has_pending(&mut self, ignore: &[EventKind]) -> bool;
}
