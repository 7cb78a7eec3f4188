use crate::coords::Rect;

use super::tree::Content;
use super::{SortKey, ZIndex};

/// One leaf of a flattened render tree, in absolute screen coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawCmd {
    pub rect: Rect,
    pub content: Content,
    /// Product of every ancestor's alpha.
    pub alpha: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DrawItem {
    pub key: SortKey,
    pub cmd: DrawCmd,
    /// Scissor rect. `None` = no clipping.
    pub clip_rect: Option<Rect>,
}

/// Recorded draw stream for one frame.
///
/// Clips pushed with [`DrawList::push_clip`] are intersected with their
/// parent, so nested clipped layers only ever shrink the visible area.
#[derive(Debug, Default)]
pub struct DrawList {
    items: Vec<DrawItem>,
    next_order: u32,
    clip_stack: Vec<Rect>,
}

impl DrawList {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.next_order = 0;
        self.clip_stack.clear();
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Items in recording order.
    pub fn items(&self) -> &[DrawItem] {
        &self.items
    }

    pub fn push(&mut self, z: ZIndex, cmd: DrawCmd) {
        let order = self.next_order;
        self.next_order = self.next_order.wrapping_add(1);

        self.items.push(DrawItem {
            key: SortKey::new(z, order),
            cmd,
            clip_rect: self.clip_stack.last().copied(),
        });
    }

    pub fn push_clip(&mut self, rect: Rect) {
        let effective = match self.clip_stack.last() {
            None => rect,
            // Disjoint clips collapse to an empty rect; backends skip those items.
            Some(&parent) => parent.intersect(rect).unwrap_or_default(),
        };
        self.clip_stack.push(effective);
    }

    pub fn pop_clip(&mut self) {
        debug_assert!(!self.clip_stack.is_empty(), "pop_clip without push_clip");
        self.clip_stack.pop();
    }

    /// Items sorted back-to-front.
    pub fn in_paint_order(&self) -> Vec<&DrawItem> {
        let mut sorted: Vec<&DrawItem> = self.items.iter().collect();
        sorted.sort_by_key(|item| item.key);
        sorted
    }
}
