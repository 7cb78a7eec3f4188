//! Reverie interaction core.
//!
//! Scene Lists describe what is shown on each layer; the [`interact`] module
//! turns them into frames and drives the event loop that waits for the next
//! meaningful input.
//!
//! Everything here runs on one thread. Displayables are shared through
//! [`DisplayableRef`] (`Rc<dyn Displayable>`) and keep their per-frame state in
//! cells, so the same node can appear in several scene snapshots at once.

pub mod displayable;
pub mod focus;
pub mod hooks;
pub mod interact;
pub mod placement;
pub mod predict;
pub mod scene;
pub mod widgets;

#[cfg(test)]
mod testing;

pub use displayable::{
    Displayable, DisplayableId, DisplayableRef, EventCtx, EventResult, HideReason, RenderCtx,
    Response, TransformEvent,
};
pub use placement::{Placement, Position};
