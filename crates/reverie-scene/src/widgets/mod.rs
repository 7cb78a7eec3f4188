//! Stock displayables.
//!
//! Leaves ([`Solid`], [`Image`], [`Null`]), the [`Fixed`] container that
//! layers are built from, the [`Transform`] wrapper, behaviors that end
//! interactions, and the [`Dissolve`] transition.

mod behavior;
mod button;
mod dissolve;
mod fixed;
mod image;
mod solid;
mod transform;

pub use behavior::{PauseBehavior, SayBehavior};
pub use button::Button;
pub use dissolve::{Dissolve, DissolveNode};
pub use fixed::Fixed;
pub use image::Image;
pub use solid::{Null, Solid};
pub use transform::{Animation, LayerTransform, Transform, TransformState};

/// Ordered list of transforms applied to a tag or a layer.
pub type AttrList = Vec<std::rc::Rc<dyn LayerTransform>>;
