use std::fmt;

use crate::coords::Vec2;

/// Keyboard key identifier.
///
/// Platform glue maps native key codes into these variants where possible;
/// anything else becomes `Key::Unknown` with the platform code.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Key {
    Escape,
    Enter,
    Tab,
    Backspace,
    Space,

    Insert,
    Delete,
    Home,
    End,
    PageUp,
    PageDown,

    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,

    Shift,
    Control,
    Alt,
    Meta,

    A, B, C, D, E, F, G, H, I, J, K, L, M,
    N, O, P, Q, R, S, T, U, V, W, X, Y, Z,

    Digit0, Digit1, Digit2, Digit3, Digit4,
    Digit5, Digit6, Digit7, Digit8, Digit9,

    F1, F2, F3, F4, F5, F6,
    F7, F8, F9, F10, F11, F12,

    Unknown(u32),
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Mouse button identifier.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    Back,
    Forward,
    Other(u16),
}

/// Modifier keys held while a key event was produced.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub fn any(&self) -> bool {
        self.shift || self.ctrl || self.alt || self.meta
    }
}

/// Window focus and visibility notifications.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum FocusChange {
    /// Input focus gained (`true`) or lost (`false`).
    Input(bool),
    /// Window restored (`true`) or minimized (`false`).
    Visible(bool),
}

/// Internal timers the interaction loop arms between passes.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum TimerKind {
    /// The explicit interaction timeout elapsed.
    Timeout,
    /// An animated displayable asked to be redrawn.
    Redraw,
}

/// Platform-agnostic event delivered to the interaction loop.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Quit,
    Resize { width: u32, height: u32 },
    MouseMove { x: f32, y: f32 },
    MouseDown { button: MouseButton, x: f32, y: f32 },
    MouseUp { button: MouseButton, x: f32, y: f32 },
    KeyDown { key: Key, modifiers: Modifiers, repeat: bool },
    KeyUp { key: Key, modifiers: Modifiers },
    Focus(FocusChange),
    Timer(TimerKind),
    /// Fixed-interval tick used for cursor animation and audio upkeep.
    Periodic,
}

/// Payload-free tag of an [`Event`], used to peek, drain, and coalesce.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum EventKind {
    Quit,
    Resize,
    MouseMove,
    MouseDown,
    MouseUp,
    KeyDown,
    KeyUp,
    Focus,
    Timer,
    Periodic,
}

impl Event {
    pub fn kind(&self) -> EventKind {
        match self {
            Event::Quit => EventKind::Quit,
            Event::Resize { .. } => EventKind::Resize,
            Event::MouseMove { .. } => EventKind::MouseMove,
            Event::MouseDown { .. } => EventKind::MouseDown,
            Event::MouseUp { .. } => EventKind::MouseUp,
            Event::KeyDown { .. } => EventKind::KeyDown,
            Event::KeyUp { .. } => EventKind::KeyUp,
            Event::Focus(_) => EventKind::Focus,
            Event::Timer(_) => EventKind::Timer,
            Event::Periodic => EventKind::Periodic,
        }
    }

    /// Pointer position carried by mouse events.
    pub fn position(&self) -> Option<Vec2> {
        match *self {
            Event::MouseMove { x, y }
            | Event::MouseDown { x, y, .. }
            | Event::MouseUp { x, y, .. } => Some(Vec2::new(x, y)),
            _ => None,
        }
    }

    /// True for events that count as mouse activity for cursor auto-hide.
    pub fn is_mouse(&self) -> bool {
        matches!(
            self.kind(),
            EventKind::MouseMove | EventKind::MouseDown | EventKind::MouseUp
        )
    }

    /// Returns the key if this is a key press.
    pub fn key_down(&self) -> Option<(Key, Modifiers)> {
        match *self {
            Event::KeyDown { key, modifiers, .. } => Some((key, modifiers)),
            _ => None,
        }
    }
}
