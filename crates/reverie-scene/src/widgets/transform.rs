use std::cell::{Cell, RefCell};
use std::rc::Rc;

use reverie_engine::coords::Vec2;
use reverie_engine::input::Event;
use reverie_engine::render::Render;

use crate::displayable::{
    Displayable, DisplayableRef, EventCtx, EventResult, HideReason, RenderCtx, TransformEvent,
};
use crate::placement::Placement;

// ── State ─────────────────────────────────────────────────────────────────

/// Animated properties of a [`Transform`].
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct TransformState {
    pub alpha: f32,
    pub xoffset: f32,
    pub yoffset: f32,
}

impl Default for TransformState {
    fn default() -> Self {
        Self {
            alpha: 1.0,
            xoffset: 0.0,
            yoffset: 0.0,
        }
    }
}

/// Drives a [`TransformState`] over time.
///
/// Returns the delay until the next frame is needed, or `None` once the
/// animation is at rest.
pub trait Animation {
    fn update(&self, state: &mut TransformState, st: f64, at: f64) -> Option<f64>;
}

impl<F> Animation for F
where
    F: Fn(&mut TransformState, f64, f64) -> Option<f64>,
{
    fn update(&self, state: &mut TransformState, st: f64, at: f64) -> Option<f64> {
        self(state, st, at)
    }
}

// ── LayerTransform ────────────────────────────────────────────────────────

/// Something that wraps a displayable: an at-list entry or a layer transform.
pub trait LayerTransform {
    /// `None` when the transform cannot wrap `child`.
    fn wrap(&self, child: DisplayableRef) -> Option<DisplayableRef>;

    fn describe(&self) -> String {
        std::any::type_name::<Self>().to_string()
    }
}

impl<F> LayerTransform for F
where
    F: Fn(DisplayableRef) -> Option<DisplayableRef>,
{
    fn wrap(&self, child: DisplayableRef) -> Option<DisplayableRef> {
        self(child)
    }
}

// ── Transform ─────────────────────────────────────────────────────────────

/// Wraps one child, animating its alpha and offset.
///
/// A transform with a hide duration fades out when hidden: the first
/// `hide` returns a copy that keeps the slot until the fade completes.
pub struct Transform {
    child: RefCell<DisplayableRef>,
    placement: Option<Placement>,
    state: Cell<TransformState>,
    animation: Option<Rc<dyn Animation>>,
    hide_duration: Option<f64>,
    /// `st` at which hiding began, set on the successor returned by `hide`.
    hide_at: Cell<Option<f64>>,
    event: Cell<Option<TransformEvent>>,
}

impl Transform {
    pub fn new(child: DisplayableRef) -> Self {
        Self {
            child: RefCell::new(child),
            placement: None,
            state: Cell::new(TransformState::default()),
            animation: None,
            hide_duration: None,
            hide_at: Cell::new(None),
            event: Cell::new(None),
        }
    }

    /// Overrides the child's placement.
    pub fn placed(mut self, placement: Placement) -> Self {
        self.placement = Some(placement);
        self
    }

    pub fn animated(mut self, animation: impl Animation + 'static) -> Self {
        self.animation = Some(Rc::new(animation));
        self
    }

    pub fn animated_rc(mut self, animation: Rc<dyn Animation>) -> Self {
        self.animation = Some(animation);
        self
    }

    /// Fade out over `seconds` when hidden or replaced.
    pub fn hide_over(mut self, seconds: f64) -> Self {
        self.hide_duration = Some(seconds);
        self
    }

    pub fn with_state(self, state: TransformState) -> Self {
        self.state.set(state);
        self
    }

    pub fn child(&self) -> DisplayableRef {
        self.child.borrow().clone()
    }

    pub fn set_child(&self, child: DisplayableRef) {
        *self.child.borrow_mut() = child;
    }

    pub fn state(&self) -> TransformState {
        self.state.get()
    }

    /// Continues `old`'s animated state from where it is now.
    pub fn take_state(&self, old: &Transform) {
        self.state.set(old.state.get());
    }

    /// A copy of this transform (state, animation, placement) around a new
    /// child. The running animation continues uninterrupted.
    pub fn with_child(&self, child: DisplayableRef) -> Transform {
        Transform {
            child: RefCell::new(child),
            placement: self.placement,
            state: Cell::new(self.state.get()),
            animation: self.animation.clone(),
            hide_duration: self.hide_duration,
            hide_at: Cell::new(None),
            event: Cell::new(None),
        }
    }

    fn fade(&self, st: f64) -> Option<f32> {
        let duration = self.hide_duration?;
        let start = self.hide_at.get()?;
        if duration <= 0.0 {
            return Some(0.0);
        }
        Some((1.0 - (st - start) / duration).clamp(0.0, 1.0) as f32)
    }
}

impl Displayable for Transform {
    fn render(&self, ctx: &mut RenderCtx<'_>, width: f32, height: f32, st: f64, at: f64) -> Render {
        let mut state = self.state.get();
        if let Some(anim) = &self.animation {
            if let Some(delay) = anim.update(&mut state, st, at) {
                ctx.redraw(delay);
            }
            self.state.set(state);
        }

        let mut alpha = state.alpha;
        if let Some(fade) = self.fade(st) {
            alpha *= fade;
            if fade > 0.0 {
                ctx.redraw(0.0);
            }
        }

        let child = self.child();
        let surf = child.render(ctx, width, height, st, at);

        let mut rv = Render::new(surf.width, surf.height);
        rv.alpha = alpha;
        rv.blit(surf, Vec2::zero());
        rv
    }

    fn event(&self, ctx: &mut EventCtx<'_>, ev: &Event, x: f32, y: f32, st: f64) -> EventResult {
        // Hiding transforms are on their way out and take no input.
        if self.hide_at.get().is_some() {
            return EventResult::Unhandled;
        }
        self.child().event(ctx, ev, x, y, st)
    }

    fn visit(&self) -> Vec<Option<DisplayableRef>> {
        vec![Some(self.child())]
    }

    fn placement(&self) -> Placement {
        let state = self.state.get();
        let mut p = self.placement.unwrap_or_else(|| self.child().placement());
        p.xoffset += state.xoffset;
        p.yoffset += state.yoffset;
        p
    }

    fn hide(self: Rc<Self>, st: f64, _at: f64, reason: HideReason) -> Option<DisplayableRef> {
        let duration = self.hide_duration?;

        match self.hide_at.get() {
            Some(start) if st - start >= duration => None,
            Some(_) => Some(self),
            None => {
                let successor = self.with_child(self.child());
                successor.hide_at.set(Some(st));
                successor.event.set(Some(reason.into()));
                Some(Rc::new(successor))
            }
        }
    }

    fn set_transform_event(&self, event: Option<TransformEvent>) {
        self.event.set(event);
    }

    fn transform_event(&self) -> Option<TransformEvent> {
        self.event.get()
    }

    fn as_transform(&self) -> Option<&Transform> {
        Some(self)
    }
}

impl LayerTransform for Transform {
    fn wrap(&self, child: DisplayableRef) -> Option<DisplayableRef> {
        Some(Rc::new(self.with_child(child)))
    }

    fn describe(&self) -> String {
        "Transform".to_string()
    }
}
