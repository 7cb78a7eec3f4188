use std::rc::Rc;

use reverie_engine::coords::Vec2;
use reverie_engine::input::Event;
use reverie_engine::render::Render;

use crate::displayable::{Displayable, DisplayableRef, EventCtx, EventResult, RenderCtx};
use crate::interact::{Transition, TransitionNode};

/// Cross-fade transition lasting `duration` seconds.
#[derive(Debug, Clone, Copy)]
pub struct Dissolve {
    duration: f64,
}

impl Dissolve {
    pub fn new(duration: f64) -> Self {
        Self {
            duration: duration.max(0.0),
        }
    }
}

impl Transition for Dissolve {
    fn apply(&self, old: DisplayableRef, new: DisplayableRef) -> Option<TransitionNode> {
        Some(TransitionNode {
            displayable: Rc::new(DissolveNode {
                old,
                new,
                duration: self.duration,
            }),
            delay: self.duration,
        })
    }

    fn describe(&self) -> String {
        format!("Dissolve({})", self.duration)
    }
}

/// The displayable a [`Dissolve`] produces. Input goes to the new scene.
pub struct DissolveNode {
    old: DisplayableRef,
    new: DisplayableRef,
    duration: f64,
}

impl DissolveNode {
    fn progress(&self, st: f64) -> f32 {
        if self.duration <= 0.0 {
            return 1.0;
        }
        (st / self.duration).clamp(0.0, 1.0) as f32
    }
}

impl Displayable for DissolveNode {
    fn render(&self, ctx: &mut RenderCtx<'_>, width: f32, height: f32, st: f64, at: f64) -> Render {
        let progress = self.progress(st);
        let mut rv = Render::new(width, height);

        if progress < 1.0 {
            rv.blit(self.old.render(ctx, width, height, st, at), Vec2::zero());
            ctx.redraw(0.0);
        }

        let mut top = self.new.render(ctx, width, height, st, at);
        top.alpha *= progress;
        rv.blit(top, Vec2::zero());
        rv
    }

    fn event(&self, ctx: &mut EventCtx<'_>, ev: &Event, x: f32, y: f32, st: f64) -> EventResult {
        self.new.event(ctx, ev, x, y, st)
    }

    fn visit(&self) -> Vec<Option<DisplayableRef>> {
        vec![Some(self.old.clone()), Some(self.new.clone())]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::widgets::Solid;
    use reverie_engine::render::{RedrawQueue, Rgba};

    fn node() -> TransitionNode {
        Dissolve::new(2.0)
            .apply(
                Rc::new(Solid::new(Rgba::BLACK)),
                Rc::new(Solid::new(Rgba::WHITE)),
            )
            .unwrap()
    }

    #[test]
    fn delay_matches_duration() {
        assert_eq!(node().delay, 2.0);
    }

    #[test]
    fn midway_blends_both_and_keeps_animating() {
        let n = node();
        let mut redraws = RedrawQueue::new();
        let mut ctx = RenderCtx::new(10.0, &mut redraws);
        let r = n.displayable.render(&mut ctx, 10.0, 10.0, 1.0, 1.0);

        assert_eq!(r.children.len(), 2);
        assert_eq!(r.children[1].render.alpha, 0.5);
        assert_eq!(redraws.next_time(), Some(10.0));
    }

    #[test]
    fn finished_dissolve_shows_only_new() {
        let n = node();
        let mut redraws = RedrawQueue::new();
        let mut ctx = RenderCtx::new(0.0, &mut redraws);
        let r = n.displayable.render(&mut ctx, 10.0, 10.0, 5.0, 5.0);

        assert_eq!(r.children.len(), 1);
        assert_eq!(r.children[0].render.alpha, 1.0);
        assert!(redraws.is_empty());
    }
}
