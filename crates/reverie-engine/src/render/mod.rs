//! Renderer-agnostic output of the scene graph.
//!
//! Displayables produce [`Render`] trees; a drawing backend consumes the
//! flattened [`DrawList`]. Nothing here touches a GPU.

mod draw_list;
mod key;
mod redraw;
mod tree;

pub use draw_list::{DrawCmd, DrawItem, DrawList};
pub use key::{SortKey, ZIndex};
pub use redraw::RedrawQueue;
pub use tree::{Blit, Content, FocusRegion, Render, Rgba};
