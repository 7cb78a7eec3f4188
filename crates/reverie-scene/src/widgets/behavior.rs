use reverie_engine::input::{Event, Key, MouseButton};
use reverie_engine::render::Render;

use crate::displayable::{Displayable, EventCtx, EventResult, RenderCtx, Response};

/// Dismisses the current line of dialogue on a click, Enter or Space.
#[derive(Debug, Default)]
pub struct SayBehavior;

impl SayBehavior {
    pub fn new() -> Self {
        Self
    }
}

impl Displayable for SayBehavior {
    fn render(&self, _ctx: &mut RenderCtx<'_>, _width: f32, _height: f32, _st: f64, _at: f64) -> Render {
        Render::new(0.0, 0.0)
    }

    fn event(&self, _ctx: &mut EventCtx<'_>, ev: &Event, _x: f32, _y: f32, _st: f64) -> EventResult {
        let dismiss = match ev {
            Event::MouseUp {
                button: MouseButton::Left,
                ..
            } => true,
            Event::KeyDown {
                key: Key::Enter | Key::Space,
                repeat: false,
                ..
            } => true,
            _ => false,
        };

        if dismiss {
            EventResult::Handled(Response::Bool(true))
        } else {
            EventResult::Unhandled
        }
    }
}

/// Ends the interaction with `result` once `delay` seconds have passed.
///
/// Until then it keeps asking for a timeout at the remaining delay, so the
/// loop wakes exactly when the pause is over.
#[derive(Debug)]
pub struct PauseBehavior {
    delay: f64,
    result: Response,
}

impl PauseBehavior {
    pub fn new(delay: f64) -> Self {
        Self {
            delay,
            result: Response::Bool(false),
        }
    }

    pub fn with_result(mut self, result: Response) -> Self {
        self.result = result;
        self
    }

    pub fn delay(&self) -> f64 {
        self.delay
    }
}

impl Displayable for PauseBehavior {
    fn render(&self, _ctx: &mut RenderCtx<'_>, _width: f32, _height: f32, _st: f64, _at: f64) -> Render {
        Render::new(0.0, 0.0)
    }

    fn event(&self, ctx: &mut EventCtx<'_>, _ev: &Event, _x: f32, _y: f32, st: f64) -> EventResult {
        if st >= self.delay {
            return EventResult::Handled(self.result.clone());
        }
        ctx.timeout(self.delay - st);
        EventResult::Unhandled
    }
}
