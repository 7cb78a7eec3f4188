use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::time::{Duration, Instant};

use reverie_engine::device::Screenshot;
use reverie_engine::input::{Event, EventSender, TimerKind};

#[derive(Default)]
enum HandoffState {
    #[default]
    Idle,
    Requested,
    Ready(Screenshot),
}

#[derive(Default)]
struct Shared {
    state: Mutex<HandoffState>,
    done: Condvar,
}

/// Interaction-thread side of the background screenshot handoff.
///
/// At most one request is outstanding. The loop checks for it at a safe
/// point before blocking for events and answers with the current frame.
#[derive(Default)]
pub struct ScreenshotHandoff {
    shared: Arc<Shared>,
}

impl ScreenshotHandoff {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn requester(&self) -> ScreenshotRequester {
        ScreenshotRequester {
            shared: Arc::clone(&self.shared),
            waker: None,
        }
    }

    pub fn is_requested(&self) -> bool {
        let state = self.shared.state.lock().unwrap_or_else(PoisonError::into_inner);
        matches!(*state, HandoffState::Requested)
    }

    /// Answers a pending request with `capture()`. Returns false when no
    /// request was pending.
    pub fn serve(&self, capture: impl FnOnce() -> Screenshot) -> bool {
        let mut state = self.shared.state.lock().unwrap_or_else(PoisonError::into_inner);
        if !matches!(*state, HandoffState::Requested) {
            return false;
        }
        *state = HandoffState::Ready(capture());
        self.shared.done.notify_all();
        true
    }
}

/// Other-thread side of the handoff. `Send`, not `Clone`; ask the handoff
/// for another requester instead.
pub struct ScreenshotRequester {
    shared: Arc<Shared>,
    waker: Option<EventSender>,
}

impl ScreenshotRequester {
    /// Posts a redraw tick through `sender` with each request so a loop
    /// blocked on input gets to its safe point.
    pub fn with_waker(mut self, sender: EventSender) -> Self {
        self.waker = Some(sender);
        self
    }

    /// Blocks until the interaction thread captures a frame, or `timeout`
    /// passes. Returns `None` at once while another request is pending.
    pub fn request(&self, timeout: Duration) -> Option<Screenshot> {
        let deadline = Instant::now() + timeout;
        let mut state = self.shared.state.lock().unwrap_or_else(PoisonError::into_inner);

        if !matches!(*state, HandoffState::Idle) {
            log::warn!("background screenshot already pending; request dropped");
            return None;
        }
        *state = HandoffState::Requested;
        if let Some(waker) = &self.waker {
            waker.send(Event::Timer(TimerKind::Redraw));
        }

        loop {
            if matches!(*state, HandoffState::Ready(_)) {
                return match std::mem::take(&mut *state) {
                    HandoffState::Ready(shot) => Some(shot),
                    _ => None,
                };
            }

            let now = Instant::now();
            if now >= deadline {
                // Still ours: no other request starts while this one is pending.
                log::warn!("background screenshot timed out");
                *state = HandoffState::Idle;
                return None;
            }

            state = self
                .shared
                .done
                .wait_timeout(state, deadline - now)
                .map(|(guard, _)| guard)
                .unwrap_or_else(|e| e.into_inner().0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn shot() -> Screenshot {
        Screenshot {
            width: 1,
            height: 1,
            pixels: vec![1, 2, 3, 255],
        }
    }

    #[test]
    fn serve_without_request_does_nothing() {
        let h = ScreenshotHandoff::new();
        assert!(!h.serve(shot));
    }

    #[test]
    fn background_request_is_answered_by_the_owner() {
        let h = ScreenshotHandoff::new();
        let requester = h.requester();

        let worker = thread::spawn(move || requester.request(Duration::from_secs(10)));

        while !h.is_requested() {
            thread::yield_now();
        }
        assert!(h.serve(shot));

        let got = worker.join().unwrap();
        assert_eq!(got, Some(shot()));
        assert!(!h.is_requested());
    }

    #[test]
    fn request_times_out_and_resets() {
        let h = ScreenshotHandoff::new();
        assert_eq!(h.requester().request(Duration::from_millis(10)), None);
        assert!(!h.is_requested());
    }

    #[test]
    fn second_request_is_refused_while_one_is_pending() {
        let h = ScreenshotHandoff::new();
        let first = h.requester();
        let second = h.requester();

        let worker = thread::spawn(move || first.request(Duration::from_secs(10)));
        while !h.is_requested() {
            thread::yield_now();
        }

        assert_eq!(second.request(Duration::from_millis(10)), None);
        assert!(h.is_requested());

        assert!(h.serve(shot));
        assert_eq!(worker.join().unwrap(), Some(shot()));
        assert_eq!(second.request(Duration::from_millis(10)), None);
        assert!(!h.is_requested());
    }
}
