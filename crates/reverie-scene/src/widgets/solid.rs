use reverie_engine::render::{Content, Render, Rgba};

use crate::displayable::{Displayable, RenderCtx};
use crate::placement::Placement;

/// A flat color fill. Without an explicit size it fills the offered box.
pub struct Solid {
    color: Rgba,
    size: Option<(f32, f32)>,
    placement: Placement,
}

impl Solid {
    pub fn new(color: Rgba) -> Self {
        Self {
            color,
            size: None,
            placement: Placement::default(),
        }
    }

    pub fn sized(color: Rgba, width: f32, height: f32) -> Self {
        Self {
            size: Some((width, height)),
            ..Self::new(color)
        }
    }

    pub fn placed(mut self, placement: Placement) -> Self {
        self.placement = placement;
        self
    }

    pub fn color(&self) -> Rgba {
        self.color
    }
}

impl Displayable for Solid {
    fn render(&self, _ctx: &mut RenderCtx<'_>, width: f32, height: f32, _st: f64, _at: f64) -> Render {
        let (w, h) = self.size.unwrap_or((width, height));
        Render::new(w.min(width), h.min(height)).with_content(Content::Solid(self.color))
    }

    fn placement(&self) -> Placement {
        self.placement
    }
}

/// Draws nothing. Stands in for a missing side of a transition.
#[derive(Default)]
pub struct Null;

impl Displayable for Null {
    fn render(&self, _ctx: &mut RenderCtx<'_>, _width: f32, _height: f32, _st: f64, _at: f64) -> Render {
        Render::new(0.0, 0.0)
    }
}
