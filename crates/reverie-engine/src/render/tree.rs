use serde::{Deserialize, Serialize};

use crate::coords::{Rect, Vec2};

use super::{DrawCmd, DrawList, ZIndex};

/// Straight-alpha 8-bit color.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Rgba(pub [u8; 4]);

impl Rgba {
    pub const BLACK: Rgba = Rgba([0, 0, 0, 255]);
    pub const WHITE: Rgba = Rgba([255, 255, 255, 255]);
    pub const TRANSPARENT: Rgba = Rgba([0, 0, 0, 0]);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self([r, g, b, a])
    }
}

/// Leaf payload of a render node.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Content {
    #[default]
    Empty,
    Solid(Rgba),
    /// Image by asset name; decoding is the backend's business.
    Image(String),
    Text(String),
}

/// A child render positioned inside its parent.
#[derive(Debug, Clone, PartialEq)]
pub struct Blit {
    pub pos: Vec2,
    pub render: Render,
}

/// Absolute screen area owned by a focusable displayable.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FocusRegion {
    pub owner: usize,
    pub rect: Rect,
}

/// Output of rendering one displayable: a sized box with optional content
/// and positioned children.
#[derive(Debug, Clone, PartialEq)]
pub struct Render {
    pub width: f32,
    pub height: f32,
    pub content: Content,
    pub alpha: f32,
    /// Clip children to this box.
    pub clip: bool,
    /// Raises this subtree above its siblings in paint order.
    pub z: ZIndex,
    /// Identity of the focusable displayable that owns this box.
    pub focus: Option<usize>,
    pub children: Vec<Blit>,
}

impl Default for Render {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

impl Render {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            content: Content::Empty,
            alpha: 1.0,
            clip: false,
            z: ZIndex::default(),
            focus: None,
            children: Vec::new(),
        }
    }

    pub fn with_content(mut self, content: Content) -> Self {
        self.content = content;
        self
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    pub fn blit(&mut self, render: Render, pos: Vec2) {
        self.children.push(Blit { pos, render });
    }

    /// Flattens the tree into absolute draw items, preserving tree order.
    pub fn flatten(&self) -> DrawList {
        let mut list = DrawList::new();
        self.record(&mut list, Vec2::zero(), 1.0, ZIndex::default());
        list
    }

    fn record(&self, list: &mut DrawList, origin: Vec2, alpha: f32, z: ZIndex) {
        let rect = Rect::new(origin.x, origin.y, self.width, self.height);
        let alpha = alpha * self.alpha;
        let z = ZIndex(z.0 + self.z.0);

        if self.clip {
            list.push_clip(rect);
        }

        if self.content != Content::Empty {
            list.push(
                z,
                DrawCmd {
                    rect,
                    content: self.content.clone(),
                    alpha,
                },
            );
        }

        for blit in &self.children {
            blit.render.record(list, origin + blit.pos, alpha, z);
        }

        if self.clip {
            list.pop_clip();
        }
    }

    /// Focus owners and their absolute rects, in paint order.
    pub fn focus_regions(&self) -> Vec<FocusRegion> {
        let mut out = Vec::new();
        self.collect_focus(Vec2::zero(), None, &mut out);
        out
    }

    fn collect_focus(&self, origin: Vec2, clip: Option<Rect>, out: &mut Vec<FocusRegion>) {
        let rect = Rect::new(origin.x, origin.y, self.width, self.height);

        if let Some(owner) = self.focus {
            let visible = match clip {
                Some(c) => c.intersect(rect),
                None => Some(rect),
            };
            if let Some(rect) = visible {
                out.push(FocusRegion { owner, rect });
            }
        }

        let clip = if self.clip {
            Some(clip.and_then(|c| c.intersect(rect)).unwrap_or(rect))
        } else {
            clip
        };

        for blit in &self.children {
            blit.render.collect_focus(origin + blit.pos, clip, out);
        }
    }
}
