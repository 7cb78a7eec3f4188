//! Time sources.
//!
//! Every timestamp in the interaction core is an `f64` number of seconds
//! read from a [`Clock`]. Show/attribute times, transition start times,
//! redraw deadlines and timeouts all share this base so they can be compared
//! and subtracted directly.

mod clock;

pub use clock::{Clock, ManualClock, SharedClock, SystemClock};
