use std::collections::VecDeque;
use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::time::{Duration, Instant};

use super::source::EventSource;
use super::types::{Event, EventKind};

#[derive(Default)]
struct Inbox {
    events: Mutex<VecDeque<Event>>,
    ready: Condvar,
}

/// Cloneable handle for feeding events from other threads (platform glue,
/// test drivers).
#[derive(Clone)]
pub struct EventSender {
    inbox: Arc<Inbox>,
}

impl EventSender {
    pub fn send(&self, ev: Event) {
        let mut q = self.inbox.events.lock().unwrap_or_else(PoisonError::into_inner);
        q.push_back(ev);
        self.inbox.ready.notify_one();
    }
}

/// Blocking event queue owned by the interaction thread.
///
/// Events sent from other threads land in a shared inbox and are moved into
/// the local queue on every access, so arrival order is preserved.
#[derive(Default)]
pub struct EventQueue {
    pending: VecDeque<Event>,
    inbox: Arc<Inbox>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sender(&self) -> EventSender {
        EventSender {
            inbox: Arc::clone(&self.inbox),
        }
    }

    fn pump(&mut self) {
        let mut q = self.inbox.events.lock().unwrap_or_else(PoisonError::into_inner);
        self.pending.extend(q.drain(..));
    }
}

impl EventSource for EventQueue {
    fn peek(&mut self) -> Option<&Event> {
        self.pump();
        self.pending.front()
    }

    fn poll(&mut self) -> Option<Event> {
        self.pump();
        self.pending.pop_front()
    }

    fn wait(&mut self, timeout: Option<Duration>) -> Option<Event> {
        if let Some(ev) = self.poll() {
            return Some(ev);
        }

        let deadline = timeout.map(|t| Instant::now() + t);
        let mut q = self.inbox.events.lock().unwrap_or_else(PoisonError::into_inner);

        loop {
            if let Some(ev) = q.pop_front() {
                return Some(ev);
            }

            match deadline {
                None => {
                    q = self.inbox.ready.wait(q).unwrap_or_else(PoisonError::into_inner);
                }
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        return None;
                    }
                    let (guard, _) = self
                        .inbox
                        .ready
                        .wait_timeout(q, deadline - now)
                        .unwrap_or_else(PoisonError::into_inner);
                    q = guard;
                }
            }
        }
    }

    fn post(&mut self, ev: Event) {
        self.pump();
        self.pending.push_back(ev);
    }

    fn drain(&mut self, kind: EventKind) -> Vec<Event> {
        self.pump();
        let mut taken = Vec::new();
        self.pending.retain(|ev| {
            if ev.kind() == kind {
                taken.push(ev.clone());
                false
            } else {
                true
            }
        });
        taken
    }

    fn has_pending(&mut self, ignore: &[EventKind]) -> bool {
        self.pump();
        self.pending.iter().any(|ev| !ignore.contains(&ev.kind()))
    }
}
