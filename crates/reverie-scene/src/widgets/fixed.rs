use std::cell::Cell;

use reverie_engine::coords::{Rect, Vec2};
use reverie_engine::input::Event;
use reverie_engine::render::Render;

use crate::displayable::{Displayable, DisplayableRef, EventCtx, EventResult, RenderCtx};
use crate::placement::Placement;

// ── FixedChild ────────────────────────────────────────────────────────────

struct FixedChild {
    displayable: DisplayableRef,
    /// `Some` when the child has its own timebase (scene-list entries,
    /// transitions). The inner `None` is latched on first render.
    times: Option<(Cell<Option<f64>>, Cell<Option<f64>>)>,
    /// Where the child was last blitted, for event translation.
    pos: Cell<Option<Vec2>>,
}

impl FixedChild {
    /// Child `(st, at)` given the parent's times and the current time.
    fn times(&self, now: f64, st: f64, at: f64) -> (f64, f64) {
        match &self.times {
            None => (st, at),
            Some((show, attr)) => {
                let show = show.get().unwrap_or(now);
                let attr = attr.get().unwrap_or(now);
                (now - show, now - attr)
            }
        }
    }

    fn latch(&self, now: f64) {
        if let Some((show, attr)) = &self.times {
            if show.get().is_none() {
                show.set(Some(now));
            }
            if attr.get().is_none() {
                attr.set(Some(now));
            }
        }
    }
}

// ── Fixed ─────────────────────────────────────────────────────────────────

/// Container that places each child by its own [`Placement`].
///
/// Children paint in insertion order (first = bottom). Events are routed in
/// reverse order so the topmost child sees them first.
pub struct Fixed {
    children: Vec<FixedChild>,
    placement: Placement,
    size: Option<Vec2>,
    clip: bool,
    name: Option<String>,
}

impl Fixed {
    pub fn new() -> Self {
        Self {
            children: Vec::new(),
            placement: Placement::default(),
            size: None,
            clip: false,
            name: None,
        }
    }

    /// A container named after the layer it renders.
    pub fn layer(name: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            ..Self::new()
        }
    }

    /// A box of fixed size at `(x, y)` that clips its children.
    pub fn clipped(rect: Rect) -> Self {
        Self {
            placement: Placement::default().offset(rect.origin.x, rect.origin.y),
            size: Some(rect.size),
            clip: true,
            ..Self::new()
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Adds a child that shares this container's timebase.
    pub fn add(&mut self, child: DisplayableRef) {
        self.children.push(FixedChild {
            displayable: child,
            times: None,
            pos: Cell::new(None),
        });
    }

    /// Adds a child with its own show and attribute start times. `None`
    /// times start at the first frame that renders the child.
    pub fn add_timed(&mut self, child: DisplayableRef, show: Option<f64>, attr: Option<f64>) {
        self.children.push(FixedChild {
            displayable: child,
            times: Some((Cell::new(show), Cell::new(attr))),
            pos: Cell::new(None),
        });
    }

    pub fn children(&self) -> impl Iterator<Item = &DisplayableRef> {
        self.children.iter().map(|c| &c.displayable)
    }
}

impl Default for Fixed {
    fn default() -> Self {
        Self::new()
    }
}

impl Displayable for Fixed {
    fn render(&self, ctx: &mut RenderCtx<'_>, width: f32, height: f32, st: f64, at: f64) -> Render {
        let (w, h) = match self.size {
            Some(s) => (s.x.min(width), s.y.min(height)),
            None => (width, height),
        };

        let mut rv = Render::new(w, h);
        rv.clip = self.clip;
        let now = ctx.frame_time();

        for child in &self.children {
            child.latch(now);
            let (cst, cat) = child.times(now, st, at);

            let surf = child.displayable.render(ctx, w, h, cst, cat);
            let pos = child
                .displayable
                .placement()
                .place(Rect::from_size(w, h), surf.size());

            child.pos.set(Some(pos));
            rv.blit(surf, pos);
        }

        rv
    }

    fn event(&self, ctx: &mut EventCtx<'_>, ev: &Event, x: f32, y: f32, st: f64) -> EventResult {
        let now = ctx.now();

        for child in self.children.iter().rev() {
            let offset = child.pos.get().unwrap_or_default();
            let (cst, _) = child.times(now, st, st);

            let rv = child
                .displayable
                .event(ctx, ev, x - offset.x, y - offset.y, cst);
            if !rv.is_unhandled() {
                return rv;
            }
        }

        EventResult::Unhandled
    }

    fn visit(&self) -> Vec<Option<DisplayableRef>> {
        self.children
            .iter()
            .map(|c| Some(c.displayable.clone()))
            .collect()
    }

    fn placement(&self) -> Placement {
        self.placement
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interact::Timeout;
    use crate::placement::Position;
    use crate::testing::Probe;
    use crate::widgets::Solid;
    use reverie_engine::render::{RedrawQueue, Rgba};
    use std::rc::Rc;

    fn render(d: &dyn Displayable, now: f64) -> Render {
        let mut redraws = RedrawQueue::new();
        let mut ctx = RenderCtx::new(now, &mut redraws);
        d.render(&mut ctx, 800.0, 600.0, 0.0, 0.0)
    }

    #[test]
    fn children_blit_at_their_placement() {
        let mut f = Fixed::new();
        f.add(Rc::new(
            Solid::sized(Rgba::WHITE, 100.0, 50.0)
                .placed(Placement::at(Position::Fraction(0.5), Position::Absolute(10.0))
                    .anchor(Position::Fraction(0.5), Position::Absolute(0.0))),
        ));

        let r = render(&f, 0.0);
        assert_eq!(r.children[0].pos, Vec2::new(350.0, 10.0));
    }

    #[test]
    fn timed_children_latch_on_first_render() {
        let probe = Rc::new(Probe::new("p"));
        let mut f = Fixed::new();
        f.add_timed(probe.clone(), None, Some(1.0));

        render(&f, 4.0);
        render(&f, 6.0);
        assert_eq!(probe.rendered_times(), vec![(0.0, 3.0), (2.0, 5.0)]);
    }

    #[test]
    fn clipped_box_sets_size_and_offset() {
        let f = Fixed::clipped(Rect::new(10.0, 20.0, 100.0, 50.0));
        let r = render(&f, 0.0);
        assert!(r.clip);
        assert_eq!(r.size(), Vec2::new(100.0, 50.0));
        assert_eq!(
            f.placement().place(Rect::from_size(800.0, 600.0), r.size()),
            Vec2::new(10.0, 20.0)
        );
    }

    #[test]
    fn events_route_topmost_first_in_local_coordinates() {
        let bottom = Rc::new(Probe::new("bottom").consuming());
        let top = Rc::new(Probe::new("top").placed(Placement::default().offset(10.0, 10.0)));
        let mut f = Fixed::new();
        f.add(bottom.clone());
        f.add(top.clone());
        render(&f, 0.0);

        let mut timeout = Timeout::default();
        let mut redraws = RedrawQueue::new();
        let mut restart = false;
        let mut ctx = EventCtx::new(0.0, &mut timeout, &mut redraws, &mut restart);
        let rv = f.event(&mut ctx, &Event::MouseMove { x: 15.0, y: 15.0 }, 15.0, 15.0, 0.0);

        assert!(matches!(rv, EventResult::Handled(_)));
        assert_eq!(top.event_positions(), vec![(5.0, 5.0)]);
        assert_eq!(bottom.event_positions(), vec![(15.0, 15.0)]);
    }
}
