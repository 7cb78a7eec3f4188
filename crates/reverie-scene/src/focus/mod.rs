//! Mouse and keyboard focus.
//!
//! The interaction loop talks to focus through [`FocusSubsystem`]:
//!
//! 1. At the start of an interaction, [`FocusSubsystem::before_interact`]
//!    receives the focus roots and collects the focusable displayables.
//! 2. After every frame, [`FocusSubsystem::take_focuses`] reads the focus
//!    regions out of the rendered tree.
//! 3. Each event goes to [`FocusSubsystem::mouse_handler`] before the scene
//!    tree sees it, and to [`FocusSubsystem::key_handler`] after.

mod manager;

pub use manager::FocusManager;

use reverie_engine::input::Event;
use reverie_engine::render::Render;

use crate::displayable::{DisplayableId, DisplayableRef, EventCtx, EventResult};

pub trait FocusSubsystem {
    /// Collects focus candidates from the trees rooted at `roots`.
    fn before_interact(&mut self, roots: &[DisplayableRef]);

    /// Records where focusable displayables ended up in the latest frame.
    fn take_focuses(&mut self, surface: &Render);

    /// Updates hover focus for the pointer at `(x, y)`. `ev` is `None` when
    /// the loop re-checks focus without a new event. `default` marks focus
    /// changes not caused by the user.
    fn mouse_handler(
        &mut self,
        ctx: &mut EventCtx<'_>,
        ev: Option<&Event>,
        x: f32,
        y: f32,
        default: bool,
    ) -> EventResult;

    /// Keyboard navigation and activation of the focused displayable.
    fn key_handler(&mut self, ctx: &mut EventCtx<'_>, ev: &Event) -> EventResult;

    fn focused(&self) -> Option<DisplayableId>;

    /// Focuses `id` again if it is still a candidate.
    fn restore(&mut self, id: Option<DisplayableId>);

    /// Cursor kind requested by the focused displayable.
    fn mouse_cursor(&self) -> Option<String> {
        None
    }
}
