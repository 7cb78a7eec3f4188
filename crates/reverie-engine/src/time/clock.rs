use std::cell::Cell;
use std::rc::Rc;
use std::time::Instant;

/// Monotonic time source in seconds.
pub trait Clock {
    fn now(&self) -> f64;
}

/// Clock handle shared between Scene Lists and the interaction session.
pub type SharedClock = Rc<dyn Clock>;

/// Wall clock anchored at construction.
///
/// `now()` starts near zero, which keeps `f64` precision high for long
/// sessions.
#[derive(Debug, Clone)]
pub struct SystemClock {
    base: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            base: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    #[inline]
    fn now(&self) -> f64 {
        self.base.elapsed().as_secs_f64()
    }
}

/// Settable clock for deterministic tests and offline runs.
///
/// Clones share the same underlying time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    t: Rc<Cell<f64>>,
}

impl ManualClock {
    pub fn new(start: f64) -> Self {
        Self {
            t: Rc::new(Cell::new(start)),
        }
    }

    pub fn set(&self, t: f64) {
        self.t.set(t);
    }

    /// Moves time forward by `dt` seconds. Negative steps are ignored.
    pub fn advance(&self, dt: f64) {
        if dt > 0.0 {
            self.t.set(self.t.get() + dt);
        }
    }
}

impl Clock for ManualClock {
    #[inline]
    fn now(&self) -> f64 {
        self.t.get()
    }
}
