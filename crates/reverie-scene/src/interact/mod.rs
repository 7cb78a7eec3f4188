//! The Interaction Engine.
//!
//! An [`Interface`] owns the drawing backend and event source and runs one
//! interaction per [`Interface::interact`] call: it composes the scene from
//! the current [`Context`]'s Scene Lists, wraps it in any ongoing
//! transitions, then alternates between drawing frames and dispatching
//! events until a displayable produces a response.

mod config;
mod context;
mod error;
mod scene;
mod screenshot;
mod session;
mod timeout;
mod transition;

pub use config::{CursorFrame, EngineConfig, InteractConfig};
pub use context::Context;
pub use error::InteractError;
pub use scene::Scene;
pub use screenshot::{ScreenshotHandoff, ScreenshotRequester};
pub use session::{InteractOptions, Interface};
pub use timeout::Timeout;
pub use transition::{Ongoing, Transition, TransitionCoordinator, TransitionNode, TransitionScope};
