//! Input normalization.
//!
//! The public API is platform-agnostic and does not expose winit types.
//! Platform glue (see [`platform`]) translates native events into [`Event`]s,
//! which reach the interaction loop through an [`EventSource`].

mod queue;
mod source;
mod types;

pub mod platform;

pub use queue::{EventQueue, EventSender};
pub use source::EventSource;
pub use types::{Event, EventKind, FocusChange, Key, Modifiers, MouseButton, TimerKind};
