//! Test doubles shared by the unit tests of this crate.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Duration;

use reverie_engine::coords::Vec2;
use reverie_engine::device::{
    DeviceError, DisplayMode, DrawBackend, HeadlessBackend, MouseState, Screenshot,
};
use reverie_engine::input::{Event, EventKind, EventSource};
use reverie_engine::render::Render;
use reverie_engine::time::{Clock, ManualClock};

use crate::displayable::{Displayable, EventCtx, EventResult, RenderCtx, Response};
use crate::placement::Placement;
use crate::scene::{SceneConfig, SceneLists};

/// Scene Lists over the default layers and a clock starting at zero.
pub fn scene_lists() -> (SceneLists, ManualClock) {
    let clock = ManualClock::new(0.0);
    let lists = SceneLists::new(Rc::new(SceneConfig::default()), Rc::new(clock.clone()));
    (lists, clock)
}

// ── ScriptedEvents ────────────────────────────────────────────────────────

/// Event source replaying timestamped events against a [`ManualClock`].
///
/// Waiting moves the clock forward: to the next scripted event if it falls
/// inside the wait, else by the full wait. Once the script runs out, short
/// waits still elapse (so timers fire) and long ones yield [`Event::Quit`].
pub struct ScriptedEvents {
    clock: ManualClock,
    script: VecDeque<(f64, Event)>,
    queue: VecDeque<Event>,
}

impl ScriptedEvents {
    pub fn new(clock: ManualClock, script: &[(f64, Event)]) -> Self {
        Self {
            clock,
            script: script.iter().cloned().collect(),
            queue: VecDeque::new(),
        }
    }

    fn pump(&mut self) {
        let now = self.clock.now();
        while self.script.front().is_some_and(|(t, _)| *t <= now) {
            if let Some((_, ev)) = self.script.pop_front() {
                self.queue.push_back(ev);
            }
        }
    }
}

impl EventSource for ScriptedEvents {
    fn peek(&mut self) -> Option<&Event> {
        self.pump();
        self.queue.front()
    }

    fn poll(&mut self) -> Option<Event> {
        self.pump();
        self.queue.pop_front()
    }

    fn wait(&mut self, timeout: Option<Duration>) -> Option<Event> {
        if let Some(ev) = self.poll() {
            return Some(ev);
        }

        let now = self.clock.now();
        let limit = timeout.map(|d| now + d.as_secs_f64());

        match self.script.front() {
            Some(&(t, _)) if limit.is_none_or(|l| t <= l) => {
                self.clock.set(t.max(now));
                self.poll()
            }
            Some(_) => {
                if let Some(l) = limit {
                    self.clock.set(l);
                }
                None
            }
            None => match timeout {
                Some(d) if d < Duration::from_secs(60) => {
                    self.clock.advance(d.as_secs_f64());
                    None
                }
                _ => Some(Event::Quit),
            },
        }
    }

    fn post(&mut self, ev: Event) {
        self.pump();
        self.queue.push_back(ev);
    }

    fn drain(&mut self, kind: EventKind) -> Vec<Event> {
        self.pump();
        let (taken, kept) = self.queue.drain(..).partition(|ev| ev.kind() == kind);
        self.queue = kept;
        taken.into()
    }

    fn has_pending(&mut self, ignore: &[EventKind]) -> bool {
        self.pump();
        self.queue.iter().any(|ev| !ignore.contains(&ev.kind()))
    }
}

// ── SharedBackend ─────────────────────────────────────────────────────────

/// A [`HeadlessBackend`] the test keeps a handle to after boxing it.
#[derive(Clone)]
pub struct SharedBackend(pub Rc<RefCell<HeadlessBackend>>);

impl SharedBackend {
    pub fn new() -> Self {
        Self(Rc::new(RefCell::new(HeadlessBackend::new("test"))))
    }

    pub fn frames(&self) -> u64 {
        self.0.borrow().frames()
    }

    pub fn resets(&self) -> u32 {
        self.0.borrow().resets()
    }

    pub fn mode(&self) -> Option<DisplayMode> {
        self.0.borrow().mode()
    }

    pub fn cursor(&self) -> MouseState {
        self.0.borrow().cursor().clone()
    }
}

impl DrawBackend for SharedBackend {
    fn name(&self) -> &str {
        "test"
    }

    fn set_mode(&mut self, mode: DisplayMode) -> Result<(), DeviceError> {
        self.0.borrow_mut().set_mode(mode)
    }

    fn reset(&mut self) {
        self.0.borrow_mut().reset();
    }

    fn draw_screen(&mut self, surface: &Render, overlay: bool) {
        self.0.borrow_mut().draw_screen(surface, overlay);
    }

    fn mouse_position(&self) -> Option<Vec2> {
        self.0.borrow().mouse_position()
    }

    fn mouse_event(&mut self, ev: &Event) -> Option<Vec2> {
        self.0.borrow_mut().mouse_event(ev)
    }

    fn set_mouse(&mut self, mouse: MouseState) {
        self.0.borrow_mut().set_mouse(mouse);
    }

    fn screenshot(&mut self, surface: &Render, overlay: bool) -> Screenshot {
        self.0.borrow_mut().screenshot(surface, overlay)
    }

    fn physical_size(&self) -> (u32, u32) {
        self.0.borrow().physical_size()
    }
}

// ── Probe ─────────────────────────────────────────────────────────────────

pub type Log = Rc<RefCell<Vec<String>>>;

type Reaction = Box<dyn Fn(&mut EventCtx<'_>, &Event, f64) -> EventResult>;

/// A 100x100 displayable that records how it is driven.
pub struct Probe {
    name: &'static str,
    consuming: bool,
    placement: Placement,
    reaction: Option<Reaction>,
    log: Option<Log>,
    rendered: RefCell<Vec<(f64, f64)>>,
    events: RefCell<Vec<(f32, f32)>>,
    shows: Cell<u32>,
    per_interacts: Cell<u32>,
}

impl Probe {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            consuming: false,
            placement: Placement::default(),
            reaction: None,
            log: None,
            rendered: RefCell::new(Vec::new()),
            events: RefCell::new(Vec::new()),
            shows: Cell::new(0),
            per_interacts: Cell::new(0),
        }
    }

    /// Ends the interaction on any event.
    pub fn consuming(mut self) -> Self {
        self.consuming = true;
        self
    }

    pub fn placed(mut self, placement: Placement) -> Self {
        self.placement = placement;
        self
    }

    pub fn reacting(
        mut self,
        f: impl Fn(&mut EventCtx<'_>, &Event, f64) -> EventResult + 'static,
    ) -> Self {
        self.reaction = Some(Box::new(f));
        self
    }

    /// Appends `render <name>` and `event <name> <kind>` lines to `log`.
    pub fn logging(mut self, log: &Log) -> Self {
        self.log = Some(log.clone());
        self
    }

    pub fn rendered_times(&self) -> Vec<(f64, f64)> {
        self.rendered.borrow().clone()
    }

    pub fn event_positions(&self) -> Vec<(f32, f32)> {
        self.events.borrow().clone()
    }

    pub fn shows(&self) -> u32 {
        self.shows.get()
    }

    pub fn per_interacts(&self) -> u32 {
        self.per_interacts.get()
    }

    fn note(&self, line: String) {
        if let Some(log) = &self.log {
            log.borrow_mut().push(line);
        }
    }
}

impl Displayable for Probe {
    fn render(&self, _ctx: &mut RenderCtx<'_>, _width: f32, _height: f32, st: f64, at: f64) -> Render {
        self.rendered.borrow_mut().push((st, at));
        self.note(format!("render {}", self.name));
        Render::new(100.0, 100.0)
    }

    fn event(&self, ctx: &mut EventCtx<'_>, ev: &Event, x: f32, y: f32, st: f64) -> EventResult {
        self.events.borrow_mut().push((x, y));
        self.note(format!("event {} {:?}", self.name, ev.kind()));

        match &self.reaction {
            Some(f) => f(ctx, ev, st),
            None if self.consuming => EventResult::Handled(Response::Bool(true)),
            None => EventResult::Unhandled,
        }
    }

    fn placement(&self) -> Placement {
        self.placement
    }

    fn show(&self) {
        self.shows.set(self.shows.get() + 1);
    }

    fn per_interact(&self) {
        self.per_interacts.set(self.per_interacts.get() + 1);
    }
}
