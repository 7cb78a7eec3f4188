//! Geometry shared by render trees, placement, and focus hit-testing.
//!
//! Canonical space:
//! - virtual screen pixels
//! - origin top-left
//! - +X right, +Y down

mod rect;
mod vec2;

pub use rect::Rect;
pub use vec2::Vec2;
