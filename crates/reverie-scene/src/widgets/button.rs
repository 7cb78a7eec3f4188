use std::cell::Cell;

use reverie_engine::coords::{Rect, Vec2};
use reverie_engine::input::{Event, MouseButton};
use reverie_engine::render::Render;

use crate::displayable::{
    Displayable, DisplayableId, DisplayableRef, EventCtx, EventResult, RenderCtx, Response,
};
use crate::placement::Placement;

/// A focusable wrapper that ends the interaction with `response` when
/// clicked, or when activated from the keyboard while focused.
pub struct Button {
    child: DisplayableRef,
    response: Response,
    placement: Placement,
    focused: Cell<bool>,
    size: Cell<Vec2>,
}

impl Button {
    pub fn new(child: DisplayableRef, response: Response) -> Self {
        Self {
            child,
            response,
            placement: Placement::default(),
            focused: Cell::new(false),
            size: Cell::new(Vec2::zero()),
        }
    }

    pub fn placed(mut self, placement: Placement) -> Self {
        self.placement = placement;
        self
    }

    pub fn is_focused(&self) -> bool {
        self.focused.get()
    }
}

impl Displayable for Button {
    fn render(&self, ctx: &mut RenderCtx<'_>, width: f32, height: f32, st: f64, at: f64) -> Render {
        let surf = self.child.render(ctx, width, height, st, at);
        self.size.set(surf.size());

        let mut rv = Render::new(surf.width, surf.height);
        rv.focus = Some(DisplayableId::of_ref(self).get());
        rv.blit(surf, Vec2::zero());
        rv
    }

    fn event(&self, _ctx: &mut EventCtx<'_>, ev: &Event, x: f32, y: f32, _st: f64) -> EventResult {
        let size = self.size.get();
        let inside = Rect::from_size(size.x, size.y).contains(Vec2::new(x, y));

        match ev {
            Event::MouseUp {
                button: MouseButton::Left,
                ..
            } if inside => EventResult::Handled(self.response.clone()),
            _ => EventResult::Unhandled,
        }
    }

    fn visit(&self) -> Vec<Option<DisplayableRef>> {
        vec![Some(self.child.clone())]
    }

    fn placement(&self) -> Placement {
        self.placement
    }

    fn focusable(&self) -> bool {
        true
    }

    fn focus(&self, _default: bool) {
        self.focused.set(true);
    }

    fn unfocus(&self) {
        self.focused.set(false);
    }

    fn activate(&self) -> Option<Response> {
        Some(self.response.clone())
    }
}
