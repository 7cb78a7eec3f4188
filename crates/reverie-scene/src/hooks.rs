//! Collaborators the interaction loop calls out to.
//!
//! Image caching, autosave and audio live outside this crate. The loop only
//! needs the narrow contracts below; [`Hooks::default`] wires in no-ops.

use std::rc::Rc;

use crate::displayable::Response;
use crate::interact::Transition;
use crate::scene::{SceneError, SceneLists};

pub trait ImageCache {
    /// Start of an interaction.
    fn tick(&mut self) {}

    /// End of an interaction; background loading stops.
    fn end_tick(&mut self) {}

    /// Warms the cache for one image.
    fn preload(&mut self, name: &str);
}

pub trait Autosave {
    fn autosave(&mut self);
}

pub trait AudioStatus {
    /// A fullscreen movie owns the screen; prediction must not compete.
    fn movie_playing(&self) -> bool {
        false
    }

    fn periodic(&mut self) {}

    /// Start of an interaction.
    fn interact(&mut self) {}
}

#[derive(Debug, Default)]
pub struct NoCache;

impl ImageCache for NoCache {
    fn preload(&mut self, _name: &str) {}
}

#[derive(Debug, Default)]
pub struct Silence;

impl AudioStatus for Silence {}

pub type Callback = Box<dyn FnMut()>;

/// Adds displayables to Scene Lists (overlay functions, the empty window).
pub type SceneHook = Box<dyn FnMut(&mut SceneLists) -> Result<(), SceneError>>;

/// Runs on a quit request. A response ends the current interaction with it.
pub type QuitAction = Box<dyn FnMut() -> Option<Response>>;

/// Rewrites the transition of a `with` statement: `(transition, paired)`.
pub type WithCallback =
    Box<dyn FnMut(Option<Rc<dyn Transition>>, Option<Rc<dyn Transition>>) -> Option<Rc<dyn Transition>>>;

pub struct Hooks {
    pub image_cache: Box<dyn ImageCache>,
    pub autosave: Option<Box<dyn Autosave>>,
    pub audio: Box<dyn AudioStatus>,
    pub quit_action: Option<QuitAction>,
    pub with_callback: Option<WithCallback>,
    /// Shows a window when dialogue is due and none is up.
    pub empty_window: Option<SceneHook>,
    /// Build the overlay layer, every interaction.
    pub overlay_functions: Vec<SceneHook>,
    /// Like `overlay_functions`, only while a window is shown.
    pub window_overlay_functions: Vec<SceneHook>,
    /// Once per `interact` call.
    pub start_callbacks: Vec<Callback>,
    /// Once per cycle, including restarts.
    pub interact_callbacks: Vec<Callback>,
    pub periodic_callback: Option<Callback>,
}

impl Default for Hooks {
    fn default() -> Self {
        Self {
            image_cache: Box::new(NoCache),
            autosave: None,
            audio: Box::new(Silence),
            quit_action: None,
            with_callback: None,
            empty_window: None,
            overlay_functions: Vec::new(),
            window_overlay_functions: Vec::new(),
            start_callbacks: Vec::new(),
            interact_callbacks: Vec::new(),
            periodic_callback: None,
        }
    }
}
