use reverie_engine::render::{Content, Render};

use crate::displayable::{Displayable, RenderCtx};
use crate::placement::Placement;

/// A named image asset of known size.
///
/// Decoding happens in the backend; the scene graph only carries the name
/// and reports it to prediction so the cache can warm up ahead of time.
pub struct Image {
    name: String,
    width: f32,
    height: f32,
    placement: Placement,
}

impl Image {
    pub fn new(name: impl Into<String>, width: f32, height: f32) -> Self {
        Self {
            name: name.into(),
            width,
            height,
            placement: Placement::default(),
        }
    }

    pub fn placed(mut self, placement: Placement) -> Self {
        self.placement = placement;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Displayable for Image {
    fn render(&self, _ctx: &mut RenderCtx<'_>, _width: f32, _height: f32, _st: f64, _at: f64) -> Render {
        Render::new(self.width, self.height).with_content(Content::Image(self.name.clone()))
    }

    fn placement(&self) -> Placement {
        self.placement
    }

    fn predict(&self, images: &mut Vec<String>) {
        images.push(self.name.clone());
    }
}
