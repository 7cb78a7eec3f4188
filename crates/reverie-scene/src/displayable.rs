use std::any::Any;
use std::fmt;
use std::rc::Rc;

use reverie_engine::input::Event;
use reverie_engine::render::{RedrawQueue, Render};
use serde::{Deserialize, Serialize};

use crate::interact::Timeout;
use crate::placement::Placement;
use crate::widgets::Transform;

/// Shared handle to a node of the scene graph.
pub type DisplayableRef = Rc<dyn Displayable>;

// ── Identity ──────────────────────────────────────────────────────────────

/// Pointer identity of a displayable.
///
/// Two handles compare equal when they point at the same node. Used for
/// untagged scene-list lookups and as the focus owner id in render trees.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct DisplayableId(usize);

impl DisplayableId {
    pub fn of(d: &DisplayableRef) -> Self {
        Self(Rc::as_ptr(d) as *const () as usize)
    }

    pub fn of_ref(d: &dyn Displayable) -> Self {
        Self(d as *const dyn Displayable as *const () as usize)
    }

    pub fn from_raw(raw: usize) -> Self {
        Self(raw)
    }

    pub fn get(self) -> usize {
        self.0
    }
}

// ── Lifecycle enums ───────────────────────────────────────────────────────

/// Why an entry is leaving its layer. Also the prefix of its lifecycle tag.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum HideReason {
    Hide,
    Replaced,
}

impl HideReason {
    pub fn as_str(self) -> &'static str {
        match self {
            HideReason::Hide => "hide",
            HideReason::Replaced => "replaced",
        }
    }

    /// Parses the prefix of a lifecycle tag (`"hide$x"` → `Hide`).
    pub fn from_lifecycle_tag(tag: &str) -> Option<Self> {
        match tag.split_once('$')?.0 {
            "hide" => Some(HideReason::Hide),
            "replaced" => Some(HideReason::Replaced),
            _ => None,
        }
    }
}

impl fmt::Display for HideReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Event delivered to a transform when its entry is shown, replaced or hidden.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum TransformEvent {
    Show,
    Hide,
    Replace,
    Replaced,
}

impl From<HideReason> for TransformEvent {
    fn from(reason: HideReason) -> Self {
        match reason {
            HideReason::Hide => TransformEvent::Hide,
            HideReason::Replaced => TransformEvent::Replaced,
        }
    }
}

// ── Dispatch results ──────────────────────────────────────────────────────

/// Value an interaction returns to its caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Response {
    Bool(bool),
    Int(i64),
    Text(String),
}

impl Response {
    /// Truthiness used to decide whether a trans-pause was dismissed by input.
    pub fn is_truthy(&self) -> bool {
        match self {
            Response::Bool(b) => *b,
            Response::Int(i) => *i != 0,
            Response::Text(s) => !s.is_empty(),
        }
    }
}

/// Outcome of delivering one event to a displayable.
#[derive(Debug, Clone, PartialEq)]
pub enum EventResult {
    /// Ends the interaction with this value.
    Handled(Response),
    /// Swallowed, but the timeout must be re-checked: the loop re-posts a
    /// timer tick and keeps going.
    Ignored,
    /// Keep routing.
    Unhandled,
}

impl EventResult {
    #[inline]
    pub fn is_unhandled(&self) -> bool {
        matches!(self, EventResult::Unhandled)
    }
}

// ── Contexts ──────────────────────────────────────────────────────────────

/// Side channel available while rendering.
///
/// Rendering stays a function of its arguments; the only effect a displayable
/// may have is asking for another frame later.
pub struct RenderCtx<'a> {
    frame_time: f64,
    redraws: &'a mut RedrawQueue,
}

impl<'a> RenderCtx<'a> {
    pub fn new(frame_time: f64, redraws: &'a mut RedrawQueue) -> Self {
        Self {
            frame_time,
            redraws,
        }
    }

    /// Absolute time of the frame being drawn.
    #[inline]
    pub fn frame_time(&self) -> f64 {
        self.frame_time
    }

    /// Requests a redraw `delay` seconds after this frame.
    pub fn redraw(&mut self, delay: f64) {
        self.redraws.request(self.frame_time + delay.max(0.0));
    }
}

/// Side channel available while handling an event.
pub struct EventCtx<'a> {
    now: f64,
    timeout: &'a mut Timeout,
    redraws: &'a mut RedrawQueue,
    restart: &'a mut bool,
}

impl<'a> EventCtx<'a> {
    pub fn new(
        now: f64,
        timeout: &'a mut Timeout,
        redraws: &'a mut RedrawQueue,
        restart: &'a mut bool,
    ) -> Self {
        Self {
            now,
            timeout,
            redraws,
            restart,
        }
    }

    /// Time the event is being handled at.
    #[inline]
    pub fn now(&self) -> f64 {
        self.now
    }

    /// Asks for a timer event `offset` seconds from now. See [`Timeout::request`].
    pub fn timeout(&mut self, offset: f64) {
        self.timeout.request(self.now, offset);
    }

    pub fn redraw(&mut self, delay: f64) {
        self.redraws.request(self.now + delay.max(0.0));
    }

    /// Rebuilds the scene before the next event is handled.
    pub fn restart_interaction(&mut self) {
        *self.restart = true;
    }
}

// ── Displayable ───────────────────────────────────────────────────────────

/// A node of the scene graph.
///
/// `st` is the time since the node was shown, `at` the time since its
/// animation timebase started; both in seconds. Methods take `&self`:
/// per-node state that changes across frames lives in cells.
pub trait Displayable: Any {
    /// Renders into a box of at most `width` x `height`.
    fn render(&self, ctx: &mut RenderCtx<'_>, width: f32, height: f32, st: f64, at: f64) -> Render;

    /// Handles an event whose coordinates are already local to this node.
    fn event(&self, _ctx: &mut EventCtx<'_>, _ev: &Event, _x: f32, _y: f32, _st: f64) -> EventResult {
        EventResult::Unhandled
    }

    /// Children of this node. Holes are allowed.
    fn visit(&self) -> Vec<Option<DisplayableRef>> {
        Vec::new()
    }

    fn placement(&self) -> Placement {
        Placement::default()
    }

    fn focusable(&self) -> bool {
        false
    }

    /// Called when this node gains focus; `default` is true when focus was
    /// assigned without user input.
    fn focus(&self, _default: bool) {}

    fn unfocus(&self) {}

    /// Keyboard activation of a focused node.
    fn activate(&self) -> Option<Response> {
        None
    }

    /// Asks the node to leave. Returning a displayable keeps the slot
    /// occupied by it (e.g. a fade-out); `None` lets the entry go.
    fn hide(self: Rc<Self>, _st: f64, _at: f64, _reason: HideReason) -> Option<DisplayableRef> {
        None
    }

    /// Called once when the node is inserted into a scene list.
    fn show(&self) {}

    fn set_transform_event(&self, _event: Option<TransformEvent>) {}

    fn transform_event(&self) -> Option<TransformEvent> {
        None
    }

    /// Called on every node of the tree at the start of each interaction.
    fn per_interact(&self) {}

    /// Appends the names of images this node will need.
    fn predict(&self, _images: &mut Vec<String>) {}

    fn as_transform(&self) -> Option<&Transform> {
        None
    }

    /// Short name for logs and snapshots.
    fn kind(&self) -> &'static str {
        let name = std::any::type_name::<Self>();
        name.rsplit("::").next().unwrap_or(name)
    }
}

/// Calls `f` on `root` and every displayable reachable through `visit`,
/// parents before children.
pub fn visit_all(root: &DisplayableRef, f: &mut dyn FnMut(&DisplayableRef)) {
    let mut stack = vec![root.clone()];
    while let Some(d) = stack.pop() {
        f(&d);
        let children = d.visit();
        stack.extend(children.into_iter().rev().flatten());
    }
}
