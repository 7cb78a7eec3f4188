use std::collections::HashMap;

use reverie_engine::coords::Vec2;
use reverie_engine::input::{Event, Key};
use reverie_engine::render::{FocusRegion, Render};

use crate::displayable::{DisplayableId, DisplayableRef, EventCtx, EventResult, visit_all};

use super::FocusSubsystem;

// ── FocusManager ──────────────────────────────────────────────────────────

/// Hover focus from the pointer, Tab/arrow cycling from the keyboard, and
/// Enter/Space activation.
#[derive(Default)]
pub struct FocusManager {
    candidates: HashMap<DisplayableId, DisplayableRef>,
    /// Focus owners in paint order, as of the last frame.
    registered: Vec<DisplayableId>,
    regions: Vec<FocusRegion>,
    focused: Option<DisplayableId>,
    /// Focus was last moved by the keyboard; the pointer leaving every
    /// region does not clear it.
    keyboard: bool,
}

impl FocusManager {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn is_focused(&self, id: DisplayableId) -> bool {
        self.focused == Some(id)
    }

    /// Focus owners in paint order.
    pub fn registered(&self) -> &[DisplayableId] {
        &self.registered
    }

    /// Moves focus to the next (or previous, if `reverse`) registered
    /// displayable. Returns true when focus changed.
    pub fn advance(&mut self, reverse: bool) -> bool {
        if self.registered.is_empty() {
            return false;
        }
        let n = self.registered.len();
        let next = match self.focused {
            None => self.registered[if reverse { n - 1 } else { 0 }],
            Some(current) => match self.registered.iter().position(|&x| x == current) {
                None => self.registered[0],
                Some(i) if reverse => self.registered[(i + n - 1) % n],
                Some(i) => self.registered[(i + 1) % n],
            },
        };
        self.set_focus(Some(next), false)
    }

    fn set_focus(&mut self, next: Option<DisplayableId>, default: bool) -> bool {
        if next == self.focused {
            return false;
        }

        if let Some(old) = self.focused.and_then(|id| self.candidates.get(&id)) {
            old.unfocus();
        }
        self.focused = next;
        if let Some(new) = next.and_then(|id| self.candidates.get(&id)) {
            new.focus(default);
        }

        log::trace!("focus -> {:?}", next.map(DisplayableId::get));
        true
    }

    fn owner_at(&self, x: f32, y: f32) -> Option<DisplayableId> {
        let p = Vec2::new(x, y);
        self.regions
            .iter()
            .rev()
            .find(|r| r.rect.contains(p))
            .map(|r| DisplayableId::from_raw(r.owner))
    }
}

impl FocusSubsystem for FocusManager {
    fn before_interact(&mut self, roots: &[DisplayableRef]) {
        self.candidates.clear();
        for root in roots {
            visit_all(root, &mut |d| {
                if d.focusable() {
                    self.candidates.insert(DisplayableId::of(d), d.clone());
                }
            });
        }

        if self.focused.is_some_and(|id| !self.candidates.contains_key(&id)) {
            self.focused = None;
            self.keyboard = false;
        }
    }

    fn take_focuses(&mut self, surface: &Render) {
        self.regions = surface
            .focus_regions()
            .into_iter()
            .filter(|r| self.candidates.contains_key(&DisplayableId::from_raw(r.owner)))
            .collect();

        self.registered.clear();
        for r in &self.regions {
            let id = DisplayableId::from_raw(r.owner);
            if !self.registered.contains(&id) {
                self.registered.push(id);
            }
        }
    }

    fn mouse_handler(
        &mut self,
        ctx: &mut EventCtx<'_>,
        ev: Option<&Event>,
        x: f32,
        y: f32,
        default: bool,
    ) -> EventResult {
        if ev.is_some_and(|ev| !ev.is_mouse()) {
            return EventResult::Unhandled;
        }

        let changed = match self.owner_at(x, y) {
            Some(owner) => {
                self.keyboard = false;
                self.set_focus(Some(owner), default)
            }
            None if !self.keyboard => self.set_focus(None, default),
            None => false,
        };

        if changed {
            ctx.redraw(0.0);
        }
        EventResult::Unhandled
    }

    fn key_handler(&mut self, ctx: &mut EventCtx<'_>, ev: &Event) -> EventResult {
        let Event::KeyDown {
            key,
            modifiers,
            repeat,
        } = *ev
        else {
            return EventResult::Unhandled;
        };

        let reverse = match key {
            Key::Tab => modifiers.shift,
            Key::ArrowUp | Key::ArrowLeft => true,
            Key::ArrowDown | Key::ArrowRight => false,
            Key::Enter | Key::Space if !repeat => {
                let Some(focused) = self.focused.and_then(|id| self.candidates.get(&id)) else {
                    return EventResult::Unhandled;
                };
                return match focused.activate() {
                    Some(rv) => EventResult::Handled(rv),
                    None => EventResult::Unhandled,
                };
            }
            _ => return EventResult::Unhandled,
        };

        if self.advance(reverse) {
            self.keyboard = true;
            ctx.redraw(0.0);
        }
        EventResult::Ignored
    }

    fn focused(&self) -> Option<DisplayableId> {
        self.focused
    }

    fn restore(&mut self, id: Option<DisplayableId>) {
        let id = id.filter(|id| self.candidates.contains_key(id));
        self.set_focus(id, true);
    }
}
