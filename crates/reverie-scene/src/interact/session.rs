use std::rc::Rc;
use std::time::Duration;

use reverie_engine::coords::Vec2;
use reverie_engine::device::{
    DeviceError, DisplayMode, DrawBackend, MouseState, RendererKind, Screenshot,
    renderer_candidates, select_backend,
};
use reverie_engine::input::{Event, EventKind, EventSource, FocusChange, TimerKind};
use reverie_engine::render::{RedrawQueue, Render};
use reverie_engine::time::SharedClock;

use crate::displayable::{DisplayableRef, EventCtx, EventResult, RenderCtx, Response, visit_all};
use crate::focus::{FocusManager, FocusSubsystem};
use crate::hooks::Hooks;
use crate::predict::Prediction;
use crate::scene::{SceneError, SceneLists};
use crate::widgets::{Fixed, PauseBehavior, SayBehavior};

use super::{
    Context, InteractConfig, InteractError, Scene, ScreenshotHandoff, ScreenshotRequester,
    Timeout, Transition, TransitionCoordinator, TransitionScope,
};

/// Deadlines this close to now count as due.
const TIMER_SLOP: f64 = 0.001;

/// Pointer position reported while the window has no input focus.
const OFFSCREEN: Vec2 = Vec2::new(-1.0, -1.0);

// ── Options ───────────────────────────────────────────────────────────────

/// Per-call switches of [`Interface::interact`].
#[derive(Debug, Clone, PartialEq)]
pub struct InteractOptions {
    /// Discard transient content when the interaction ends.
    pub clear: bool,
    /// Do not run the empty-window hook.
    pub suppress_window: bool,
    pub show_mouse: bool,
    /// End when the root transition is over (or is dismissed).
    pub trans_pause: bool,
    pub suppress_overlay: bool,
    pub suppress_underlay: bool,
    /// Cursor kind looked up in [`InteractConfig::mouse`].
    pub mouse: String,
}

impl Default for InteractOptions {
    fn default() -> Self {
        Self {
            clear: true,
            suppress_window: false,
            show_mouse: true,
            trans_pause: false,
            suppress_overlay: false,
            suppress_underlay: false,
            mouse: "default".to_string(),
        }
    }
}

enum Cycle {
    Done(Option<Response>),
    Restart,
}

struct Built {
    root: DisplayableRef,
    focus_roots: Vec<DisplayableRef>,
    scene: Scene,
}

// ── Interface ─────────────────────────────────────────────────────────────

/// The interaction session: display, input, transitions and the state that
/// survives from one interaction to the next.
///
/// Created once at startup. Every [`interact`](Interface::interact) call
/// resets the per-interaction fields and leaves the rest alone.
pub struct Interface {
    config: InteractConfig,
    clock: SharedClock,
    backend: Box<dyn DrawBackend>,
    events: Box<dyn EventSource>,
    focus: Box<dyn FocusSubsystem>,
    hooks: Hooks,

    transitions: TransitionCoordinator,
    /// Scene of the last interaction; what the next transition starts from.
    old_scene: Option<Scene>,
    /// Set after a trans-pause was dismissed; later transitions are dropped
    /// until the next interaction starts.
    suppress_transition: bool,
    skipping: bool,

    restart: bool,
    force_redraw: bool,
    timeout: Timeout,
    redraws: RedrawQueue,
    event_time: f64,
    frame_time: Option<f64>,
    interact_time: Option<f64>,
    end_time: f64,
    next_periodic: Option<f64>,
    last_event: Option<Event>,
    frames: u64,
    ticks: u64,

    mouse: String,
    show_mouse: bool,
    mouse_visible: bool,
    mouse_event_time: f64,
    cursor: Option<MouseState>,

    window_focused: bool,
    minimized: bool,
    display_reset: bool,
    fullscreen: bool,
    mode_fullscreen: bool,
    last_resize: Option<(u32, u32)>,
    window_enabled: bool,
    quit_time: Option<f64>,

    surface: Option<Render>,
    screenshot: Option<Screenshot>,
    handoff: ScreenshotHandoff,

    preloads: Vec<String>,
    underlay: Vec<DisplayableRef>,
}

impl Interface {
    /// Wraps an already constructed backend and sets its initial mode.
    pub fn new(
        config: InteractConfig,
        clock: SharedClock,
        mut backend: Box<dyn DrawBackend>,
        events: Box<dyn EventSource>,
    ) -> Result<Self, InteractError> {
        let mode = config.display_mode();
        backend.set_mode(mode)?;
        log::info!(
            "renderer `{}` set mode {}x{} (fullscreen: {})",
            backend.name(),
            mode.width,
            mode.height,
            mode.fullscreen
        );
        Ok(Self::assemble(config, clock, backend, events))
    }

    /// Picks a renderer from the configured preference, falling back through
    /// the candidates until one sets the initial mode.
    pub fn with_renderer<F>(
        config: InteractConfig,
        clock: SharedClock,
        events: Box<dyn EventSource>,
        make: F,
    ) -> Result<Self, InteractError>
    where
        F: FnMut(RendererKind) -> Result<Box<dyn DrawBackend>, DeviceError>,
    {
        let pref = config.renderer_preference()?;
        let candidates = renderer_candidates(pref, config.safe_mode);
        let backend = select_backend(&candidates, config.display_mode(), make)?;
        Ok(Self::assemble(config, clock, backend, events))
    }

    fn assemble(
        mut config: InteractConfig,
        clock: SharedClock,
        backend: Box<dyn DrawBackend>,
        events: Box<dyn EventSource>,
    ) -> Self {
        if config.save_physical_size && !config.fullscreen {
            config.physical_size = Some(backend.physical_size());
        }
        let now = clock.now();
        let fullscreen = config.fullscreen;

        Self {
            config,
            clock,
            backend,
            events,
            focus: Box::new(FocusManager::new()),
            hooks: Hooks::default(),

            transitions: TransitionCoordinator::new(),
            old_scene: None,
            suppress_transition: false,
            skipping: false,

            restart: false,
            force_redraw: false,
            timeout: Timeout::default(),
            redraws: RedrawQueue::new(),
            event_time: now,
            frame_time: None,
            interact_time: None,
            end_time: now,
            next_periodic: None,
            last_event: None,
            frames: 0,
            ticks: 0,

            mouse: "default".to_string(),
            show_mouse: true,
            mouse_visible: true,
            mouse_event_time: now,
            cursor: None,

            window_focused: true,
            minimized: false,
            display_reset: false,
            fullscreen,
            mode_fullscreen: fullscreen,
            last_resize: None,
            window_enabled: false,
            quit_time: None,

            surface: None,
            screenshot: None,
            handoff: ScreenshotHandoff::new(),

            preloads: Vec::new(),
            underlay: Vec::new(),
        }
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn config(&self) -> &InteractConfig {
        &self.config
    }

    pub fn renderer_name(&self) -> &str {
        self.backend.name()
    }

    pub fn hooks_mut(&mut self) -> &mut Hooks {
        &mut self.hooks
    }

    pub fn set_focus_subsystem(&mut self, focus: Box<dyn FocusSubsystem>) {
        self.focus = focus;
    }

    /// Frames drawn since startup.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Periodic ticks seen since startup.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Fast-forward mode: transitions are skipped.
    pub fn set_skipping(&mut self, skipping: bool) {
        self.skipping = skipping;
    }

    /// Enables the empty-window hook.
    pub fn set_window(&mut self, enabled: bool) {
        self.window_enabled = enabled;
    }

    pub fn set_fullscreen(&mut self, fullscreen: bool) {
        self.fullscreen = fullscreen;
    }

    pub fn set_mouse_visible(&mut self, visible: bool) {
        self.mouse_visible = visible;
    }

    /// Image warmed before anything else at the start of the next interaction.
    pub fn add_preload(&mut self, name: impl Into<String>) {
        self.preloads.push(name.into());
    }

    /// Displayable placed under every layer of every interaction.
    pub fn add_underlay(&mut self, d: DisplayableRef) {
        self.underlay.push(d);
    }

    // ── Transitions ───────────────────────────────────────────────────────

    /// Queues a transition for the next interaction. Ignored after a
    /// dismissed trans-pause unless `force` is set.
    pub fn set_transition(
        &mut self,
        transition: Option<Rc<dyn Transition>>,
        scope: TransitionScope,
        force: bool,
    ) {
        if self.suppress_transition && !force {
            return;
        }
        self.transitions.set(scope, transition);
    }

    pub fn transition_pending(&self, scope: &TransitionScope) -> bool {
        self.transitions.is_pending(scope)
    }

    /// Records the current scene as the start of the next transition and
    /// discards interaction-local content, without interacting.
    pub fn with_none(&mut self, ctx: &mut Context) -> Result<(), InteractError> {
        self.show_window(ctx)?;
        self.compute_overlay(ctx)?;
        self.old_scene = Some(Scene::compute(&ctx.scene_lists)?);
        clear_overlay(&mut ctx.scene_lists)?;
        ctx.scene_lists.replace_transient()?;
        ctx.scene_lists.set_shown_window(false);
        Ok(())
    }

    /// Runs `transition` over the whole screen and waits for it to finish
    /// or be dismissed. Falls back to [`with_none`](Self::with_none) when
    /// there is nothing to run.
    pub fn do_with(
        &mut self,
        ctx: &mut Context,
        transition: Option<Rc<dyn Transition>>,
        paired: Option<Rc<dyn Transition>>,
        clear: bool,
    ) -> Result<Option<Response>, InteractError> {
        let transition = match &mut self.hooks.with_callback {
            Some(cb) => cb(transition, paired),
            None => transition,
        };

        match transition {
            Some(t) if !self.suppress_transition => {
                self.set_transition(Some(t), TransitionScope::Root, false);
                let opts = InteractOptions {
                    trans_pause: true,
                    suppress_overlay: !self.config.overlay_during_with,
                    mouse: "with".to_string(),
                    clear,
                    ..InteractOptions::default()
                };
                self.interact(ctx, opts)
            }
            _ => {
                self.with_none(ctx)?;
                Ok(None)
            }
        }
    }

    // ── Requests from displayables and game logic ─────────────────────────

    /// See [`Timeout::request`]; relative to the last event.
    pub fn timeout(&mut self, offset: f64) {
        self.timeout.request(self.event_time, offset);
    }

    pub fn restart_interaction(&mut self) {
        self.restart = true;
    }

    pub fn force_redraw(&mut self) {
        self.force_redraw = true;
    }

    /// True if a frame was drawn within the last `seconds`.
    pub fn drawn_since(&self, seconds: f64) -> bool {
        self.frame_time
            .is_some_and(|t| self.clock.now() - t <= seconds)
    }

    // ── Screenshots ───────────────────────────────────────────────────────

    /// Captures the last drawn frame and keeps it until
    /// [`lose_screenshot`](Self::lose_screenshot).
    pub fn take_screenshot(&mut self) -> Option<&Screenshot> {
        let surface = self.surface.as_ref()?;
        let shot = self
            .backend
            .screenshot(surface, self.hooks.audio.movie_playing());
        self.screenshot = Some(shot);
        self.screenshot.as_ref()
    }

    /// The kept screenshot, or a one-off capture when none is kept.
    pub fn get_screenshot(&mut self) -> Option<Screenshot> {
        if let Some(shot) = &self.screenshot {
            return Some(shot.clone());
        }
        let rv = self.take_screenshot().cloned();
        self.lose_screenshot();
        rv
    }

    pub fn lose_screenshot(&mut self) {
        self.screenshot = None;
    }

    /// Handle for requesting a frame from another thread.
    pub fn screenshot_requester(&self) -> ScreenshotRequester {
        self.handoff.requester()
    }

    pub fn screenshot_requested(&self) -> bool {
        self.handoff.is_requested()
    }

    /// Answers a pending background request with the current frame.
    pub fn serve_screenshot(&mut self) -> bool {
        let backend = &mut self.backend;
        let surface = self.surface.as_ref();
        let overlay = self.hooks.audio.movie_playing();
        self.handoff.serve(|| match surface {
            Some(s) => backend.screenshot(s, overlay),
            None => Screenshot::default(),
        })
    }

    // ── Display ───────────────────────────────────────────────────────────

    /// Sets the display mode. `None` uses the saved physical size; sizes
    /// below `min_window_size` fall back to the virtual size.
    pub fn set_mode(&mut self, physical_size: Option<(u32, u32)>) -> Result<(), InteractError> {
        let virtual_size = (self.config.width, self.config.height);
        let min = self.config.min_window_size;

        let (width, height) = match physical_size {
            Some((w, h)) if w >= min && h >= min => (w, h),
            Some((w, h)) => {
                log::debug!("window size {w}x{h} is below {min}; using the virtual size");
                virtual_size
            }
            None => self.config.physical_size.unwrap_or(virtual_size),
        };

        self.display_reset = false;
        let fullscreen = self.fullscreen;
        if let Err(err) = self.backend.set_mode(DisplayMode {
            width,
            height,
            fullscreen,
        }) {
            self.fullscreen = false;
            return Err(err.into());
        }
        self.mode_fullscreen = fullscreen;
        log::info!(
            "renderer `{}` set mode {width}x{height} (fullscreen: {fullscreen})",
            self.backend.name()
        );

        if self.config.save_physical_size && !fullscreen {
            self.config.physical_size = Some(self.backend.physical_size());
        }

        self.force_redraw = true;
        self.window_focused = true;
        self.minimized = false;
        Ok(())
    }

    /// What the pointer should look like right now.
    pub fn mouse_info(&self) -> MouseState {
        let now = self.clock.now();
        let idle = self
            .config
            .mouse_hide_time
            .is_some_and(|t| now - self.mouse_event_time > t);

        if idle || !self.mouse_visible || !self.show_mouse {
            return MouseState::Hidden;
        }
        if self.config.mouse.is_empty() {
            return MouseState::Hardware;
        }
        if !self.window_focused {
            return MouseState::Hidden;
        }

        let kind = self
            .focus
            .mouse_cursor()
            .unwrap_or_else(|| self.mouse.clone());
        let frames = self
            .config
            .mouse
            .get(&kind)
            .or_else(|| self.config.mouse.get("default"))
            .filter(|f| !f.is_empty());

        match frames {
            Some(frames) => {
                let frame = (self.ticks % frames.len() as u64) as usize;
                MouseState::Animated {
                    name: frames[frame].image.clone(),
                    frame,
                }
            }
            None => MouseState::Hardware,
        }
    }

    fn update_mouse(&mut self) {
        let state = self.mouse_info();
        if self.cursor.as_ref() != Some(&state) {
            self.backend.set_mouse(state.clone());
            self.cursor = Some(state);
        }
    }

    fn iconified(&mut self) {
        if self.minimized {
            return;
        }
        self.minimized = true;
        log::info!("window minimized");
    }

    fn restored(&mut self) {
        if !self.minimized {
            return;
        }
        self.minimized = false;
        log::info!("window restored");

        if self.config.reset_on_restore {
            self.display_reset = true;
        }
    }

    // ── Interaction ───────────────────────────────────────────────────────

    /// Shows the current scene of `ctx` and waits for a response.
    ///
    /// Returns `Ok(None)` when the interaction ends without one (a
    /// trans-pause with nothing to pause on).
    pub fn interact(
        &mut self,
        ctx: &mut Context,
        opts: InteractOptions,
    ) -> Result<Option<Response>, InteractError> {
        if ctx.interacting {
            return Err(InteractError::Reentrant);
        }
        ctx.interacting = true;
        log::debug!("interaction begins");

        let rv = self.run_interaction(ctx, &opts);

        ctx.interacting = false;
        let cleared = if opts.clear {
            ctx.scene_lists.replace_transient()
        } else {
            Ok(())
        };
        self.transitions.clear_ongoing();
        self.restart = true;
        ctx.scene_lists.set_shown_window(false);
        log::debug!("interaction ends");

        let rv = rv?;
        cleared?;
        Ok(rv)
    }

    fn run_interaction(
        &mut self,
        ctx: &mut Context,
        opts: &InteractOptions,
    ) -> Result<Option<Response>, InteractError> {
        if !opts.suppress_window {
            self.show_window(ctx)?;
        }

        let preloads = std::mem::take(&mut self.preloads);
        for cb in &mut self.hooks.start_callbacks {
            cb();
        }

        loop {
            match self.interact_core(ctx, opts, &preloads)? {
                Cycle::Done(rv) => return Ok(rv),
                Cycle::Restart => log::debug!("interaction restarts"),
            }
        }
    }

    fn show_window(&mut self, ctx: &mut Context) -> Result<(), InteractError> {
        if !self.window_enabled || ctx.scene_lists.shown_window() {
            return Ok(());
        }
        if let Some(hook) = &mut self.hooks.empty_window {
            hook(&mut ctx.scene_lists)?;
        }
        Ok(())
    }

    fn compute_overlay(&mut self, ctx: &mut Context) -> Result<(), InteractError> {
        for f in &mut self.hooks.overlay_functions {
            f(&mut ctx.scene_lists)?;
        }
        if ctx.scene_lists.shown_window() {
            for f in &mut self.hooks.window_overlay_functions {
                f(&mut ctx.scene_lists)?;
            }
        }
        Ok(())
    }

    /// One build-and-wait cycle. Cleanup runs on every exit path.
    fn interact_core(
        &mut self,
        ctx: &mut Context,
        opts: &InteractOptions,
        preloads: &[String],
    ) -> Result<Cycle, InteractError> {
        self.show_mouse = opts.show_mouse;
        let suppress = self.skipping;
        self.suppress_transition = false;

        self.transitions.begin(self.old_scene.as_ref(), suppress);

        if opts.trans_pause
            && (suppress
                || self.old_scene.is_none()
                || self.transitions.ongoing(&TransitionScope::Root).is_none())
        {
            log::debug!("no root transition to pause on");
            return Ok(Cycle::Done(None));
        }

        self.restart = false;
        self.mouse = opts.mouse.clone();
        let start = self.clock.now();
        self.end_time = start;

        for cb in &mut self.hooks.interact_callbacks {
            cb();
        }
        self.hooks.image_cache.tick();

        self.events
            .clear(&[EventKind::MouseMove, EventKind::Periodic, EventKind::Timer]);
        self.events.post(Event::Timer(TimerKind::Timeout));

        let rv = self.run_cycle(ctx, opts, preloads);

        let cleanup = clear_overlay(&mut ctx.scene_lists);
        self.hooks.image_cache.end_tick();
        self.timeout.clear();
        self.redraws.clear();
        ctx.scene_lists.set_focused(self.focus.focused());
        ctx.add_runtime(self.end_time - start);
        self.restart = true;

        let cycle = rv?;
        cleanup?;

        if let Cycle::Done(Some(r)) = &cycle {
            if opts.trans_pause && r.is_truthy() {
                self.suppress_transition = true;
            }
        }
        Ok(cycle)
    }

    fn build_root(&self, ctx: &Context, opts: &InteractOptions) -> Result<Built, InteractError> {
        let suppress = self.skipping;
        let mut root = Fixed::new();
        let mut focus_roots = Vec::new();

        if !opts.suppress_underlay {
            for d in &self.underlay {
                root.add(d.clone());
                focus_roots.push(d.clone());
            }
        }

        let scene = Scene::compute(&ctx.scene_lists)?;
        let config = ctx.scene_lists.config();

        let mut layers_root = Fixed::new();
        for layer in &config.layers {
            self.add_layer(&mut layers_root, &scene, layer, &mut focus_roots, suppress)?;
        }
        let layers_root: DisplayableRef = Rc::new(layers_root);

        match self
            .transitions
            .ongoing(&TransitionScope::Root)
            .filter(|_| !suppress)
        {
            Some(ongoing) => {
                let node = ongoing
                    .transition
                    .apply(ongoing.from.clone(), layers_root)
                    .ok_or_else(|| malformed(TransitionScope::Root, ongoing.transition.as_ref()))?;
                node.displayable.show();

                let start = ongoing.start_time;
                root.add_timed(node.displayable, start, start);

                if opts.trans_pause {
                    let say: DisplayableRef = Rc::new(SayBehavior::new());
                    root.add(say.clone());
                    focus_roots.push(say);

                    let pause: DisplayableRef = Rc::new(PauseBehavior::new(node.delay));
                    root.add_timed(pause.clone(), start, start);
                    focus_roots.push(pause);
                }
            }
            None => root.add(layers_root),
        }

        for layer in &config.top_layers {
            self.add_layer(&mut root, &scene, layer, &mut focus_roots, suppress)?;
        }

        Ok(Built {
            root: Rc::new(root),
            focus_roots,
            scene,
        })
    }

    /// Adds `layer` to `parent`, inside its ongoing transition if any.
    fn add_layer(
        &self,
        parent: &mut Fixed,
        scene: &Scene,
        layer: &str,
        focus_roots: &mut Vec<DisplayableRef>,
        suppress: bool,
    ) -> Result<(), InteractError> {
        let Some(d) = scene.layer(layer) else {
            return Ok(());
        };
        focus_roots.push(d.clone());

        let scope = TransitionScope::Layer(layer.to_string());
        match self.transitions.ongoing(&scope).filter(|_| !suppress) {
            Some(ongoing) => {
                let node = ongoing
                    .transition
                    .apply(ongoing.from.clone(), d)
                    .ok_or_else(|| malformed(scope.clone(), ongoing.transition.as_ref()))?;
                parent.add_timed(node.displayable, ongoing.start_time, ongoing.start_time);
            }
            None => parent.add(d),
        }
        Ok(())
    }

    /// Builds the tree, then alternates drawing and dispatching until a
    /// response or a restart.
    fn run_cycle(
        &mut self,
        ctx: &mut Context,
        opts: &InteractOptions,
        preloads: &[String],
    ) -> Result<Cycle, InteractError> {
        ctx.scene_lists.remove_hidden();
        if !opts.suppress_overlay {
            self.compute_overlay(ctx)?;
        }

        let Built {
            root,
            focus_roots,
            scene,
        } = self.build_root(ctx, opts)?;

        let mut prediction =
            Some(Prediction::new([root.clone()]).with_preloads(preloads.iter().cloned()));
        visit_all(&root, &mut |d| d.per_interact());
        self.old_scene = Some(scene);

        self.focus.before_interact(&focus_roots);
        if self.focus.focused().is_none() {
            self.focus.restore(ctx.scene_lists.focused());
        }

        self.hooks.audio.interact();
        self.redraws.process(self.clock.now());
        let mut needs_redraw = true;
        let mut first_pass = true;
        let mut did_autosave = false;
        self.interact_time = None;

        loop {
            if self.fullscreen != self.mode_fullscreen || self.display_reset {
                if self.display_reset {
                    self.backend.reset();
                }
                self.set_mode(self.last_resize)?;
                needs_redraw = true;
            }

            let queued = self.events.peek().is_some();
            if self.force_redraw
                || ((first_pass || !queued) && self.backend.should_redraw(needs_redraw, first_pass))
            {
                self.force_redraw = false;
                self.draw_frame(ctx, &root, first_pass);
                needs_redraw = false;
                first_pass = false;
            }

            self.update_mouse();

            if self.restart {
                return Ok(Cycle::Restart);
            }

            needs_redraw |= self.redraws.process(self.clock.now() + TIMER_SLOP);

            if let Some(p) = prediction.as_mut() {
                while !needs_redraw
                    && self.events.peek().is_none()
                    && !self.hooks.audio.movie_playing()
                {
                    if !p.step(self.hooks.image_cache.as_mut()) {
                        break;
                    }
                }
            }
            if prediction.as_ref().is_some_and(Prediction::is_done) {
                prediction = None;
            }

            if needs_redraw && self.events.peek().is_none() {
                continue;
            }

            if let Some(ev) = self.next_event(needs_redraw, &mut did_autosave) {
                if let Some(rv) = self.handle_event(&root, ev)? {
                    return Ok(Cycle::Done(Some(rv)));
                }
            }

            needs_redraw |= self.redraws.process(self.clock.now() + TIMER_SLOP);

            if self.restart {
                return Ok(Cycle::Restart);
            }
        }
    }

    fn draw_frame(&mut self, ctx: &mut Context, root: &DisplayableRef, first_pass: bool) {
        let now = self.clock.now();
        self.frame_time = Some(now);
        let interact_time = *self.interact_time.get_or_insert(now);

        let surface = {
            let mut rctx = RenderCtx::new(now, &mut self.redraws);
            root.render(
                &mut rctx,
                self.config.width as f32,
                self.config.height as f32,
                0.0,
                0.0,
            )
        };
        self.backend
            .draw_screen(&surface, self.hooks.audio.movie_playing());
        self.focus.take_focuses(&surface);
        self.surface = Some(surface);

        if first_pass {
            ctx.scene_lists.set_times(interact_time);
            self.transitions.latch(interact_time);

            if let Some(ev) = &self.last_event {
                let pos = self.backend.mouse_position().unwrap_or(OFFSCREEN);
                let mut ectx =
                    EventCtx::new(now, &mut self.timeout, &mut self.redraws, &mut self.restart);
                self.focus
                    .mouse_handler(&mut ectx, Some(ev), pos.x, pos.y, false);
            }
        }

        self.frames += 1;
    }

    /// Produces the next event: a due timer or periodic tick, else whatever
    /// the source delivers before the nearest deadline.
    fn next_event(&mut self, needs_redraw: bool, did_autosave: &mut bool) -> Option<Event> {
        let now = self.clock.now();
        let max_wait = self.config.max_wait;

        let redraw_in = match self.redraws.next_time() {
            Some(t) if !needs_redraw => (t - now).min(max_wait),
            _ => max_wait,
        };

        let timeout_in = match self.timeout.deadline() {
            Some(t) if t - now <= TIMER_SLOP => {
                self.timeout.clear();
                return Some(Event::Timer(TimerKind::Timeout));
            }
            Some(t) => (t - now).min(max_wait),
            None => max_wait,
        };

        let interval = self.config.periodic_interval;
        let periodic_in = if interval > 0.0 {
            let next = *self.next_periodic.get_or_insert(now + interval);
            if next - now <= TIMER_SLOP {
                self.next_periodic = Some(now + interval);
                return Some(Event::Periodic);
            }
            next - now
        } else {
            max_wait
        };

        let idle = self.config.autosave_idle;
        if !*did_autosave
            && !needs_redraw
            && self.events.peek().is_none()
            && redraw_in > idle
            && timeout_in > idle
        {
            if let Some(autosave) = &mut self.hooks.autosave {
                log::debug!("autosave");
                autosave.autosave();
            }
            *did_autosave = true;
        }

        if needs_redraw {
            return self.events.poll();
        }

        self.serve_screenshot();
        let wait = redraw_in.min(timeout_in).min(periodic_in).max(0.0);
        self.events.wait(Duration::try_from_secs_f64(wait).ok())
    }

    /// Handles one event. `Ok(Some(_))` ends the interaction.
    fn handle_event(
        &mut self,
        root: &DisplayableRef,
        ev: Event,
    ) -> Result<Option<Response>, InteractError> {
        let mut ev = ev;

        match &ev {
            Event::Timer(TimerKind::Redraw) => return Ok(None),
            Event::Timer(TimerKind::Timeout) => self.events.clear(&[EventKind::Timer]),
            Event::Periodic => {
                let extra = self.events.drain(EventKind::Periodic).len() as u64;
                self.ticks += 1 + extra;
                if let Some(cb) = &mut self.hooks.periodic_callback {
                    cb();
                }
                self.hooks.audio.periodic();
                return Ok(None);
            }
            Event::Quit => return self.quit_event(),
            Event::Resize { width, height } => {
                let (width, height) = match self.events.drain(EventKind::Resize).pop() {
                    Some(Event::Resize { width, height }) => (width, height),
                    _ => (*width, *height),
                };
                self.resize(width, height)?;
                return Ok(None);
            }
            _ => {}
        }

        if ev.is_mouse() {
            self.mouse_event_time = self.clock.now();
        }
        if ev.kind() == EventKind::MouseMove {
            if let Some(last) = self.events.drain(EventKind::MouseMove).pop() {
                ev = last;
            }
        }

        match &ev {
            Event::Focus(FocusChange::Input(gained)) => self.window_focused = *gained,
            Event::Focus(FocusChange::Visible(true)) => self.restored(),
            Event::Focus(FocusChange::Visible(false)) => self.iconified(),
            _ => {}
        }

        let pos = self
            .backend
            .mouse_event(&ev)
            .or_else(|| self.backend.mouse_position())
            .unwrap_or(OFFSCREEN);
        let (x, y) = if self.window_focused {
            (pos.x, pos.y)
        } else {
            (OFFSCREEN.x, OFFSCREEN.y)
        };

        let now = self.clock.now();
        self.event_time = now;
        self.end_time = now;
        log::trace!("dispatch {:?} at ({x}, {y})", ev.kind());

        let rv = {
            let mut ectx =
                EventCtx::new(now, &mut self.timeout, &mut self.redraws, &mut self.restart);
            let mut rv = self.focus.mouse_handler(&mut ectx, Some(&ev), x, y, false);
            if rv.is_unhandled() {
                rv = root.event(&mut ectx, &ev, x, y, 0.0);
            }
            if rv.is_unhandled() {
                rv = self.focus.key_handler(&mut ectx, &ev);
            }
            rv
        };
        self.last_event = Some(ev);

        match rv {
            EventResult::Handled(r) => Ok(Some(r)),
            EventResult::Ignored => {
                self.events.post(Event::Timer(TimerKind::Timeout));
                Ok(None)
            }
            EventResult::Unhandled => Ok(None),
        }
    }

    fn quit_event(&mut self) -> Result<Option<Response>, InteractError> {
        let now = self.clock.now();
        if self
            .quit_time
            .is_some_and(|t| now - t < self.config.quit_grace)
        {
            log::info!("quit requested twice; exiting");
            return Err(InteractError::Quit);
        }

        let Some(action) = &mut self.hooks.quit_action else {
            log::info!("quit requested");
            return Err(InteractError::Quit);
        };

        log::info!("quit requested; running the quit action");
        self.quit_time = Some(now);
        self.mouse_visible = true;
        Ok(action())
    }

    fn resize(&mut self, width: u32, height: u32) -> Result<(), InteractError> {
        if self.last_resize == Some((width, height)) {
            return Ok(());
        }
        self.last_resize = Some((width, height));
        self.set_mode(Some((width, height)))
    }
}

fn clear_overlay(lists: &mut SceneLists) -> Result<(), SceneError> {
    let layers = lists.config().overlay_layers.clone();
    for layer in &layers {
        lists.clear(layer, false)?;
    }
    Ok(())
}

fn malformed(scope: TransitionScope, transition: &dyn Transition) -> InteractError {
    let transition = transition.describe();
    log::error!("transition `{transition}` on {scope} did not produce a displayable");
    InteractError::MalformedTransition { scope, transition }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::displayable::DisplayableId;
    use crate::hooks::{Autosave, ImageCache};
    use crate::interact::{CursorFrame, TransitionNode};
    use crate::scene::ShowArgs;
    use crate::testing::{Log, Probe, ScriptedEvents, SharedBackend, scene_lists};
    use crate::widgets::{Button, Image, Null, Solid, TransformState};
    use reverie_engine::device::HeadlessBackend;
    use reverie_engine::input::{Key, Modifiers};
    use reverie_engine::render::Rgba;
    use reverie_engine::time::{Clock, ManualClock};
    use std::cell::{Cell, RefCell};
    use std::thread;

    struct Rig {
        iface: Interface,
        ctx: Context,
        clock: ManualClock,
        backend: SharedBackend,
    }

    fn config() -> InteractConfig {
        InteractConfig {
            width: 800,
            height: 600,
            periodic_interval: 0.0,
            ..InteractConfig::default()
        }
    }

    fn rig_with(config: InteractConfig, script: &[(f64, Event)]) -> Rig {
        let (lists, clock) = scene_lists();
        let backend = SharedBackend::new();
        let iface = Interface::new(
            config,
            Rc::new(clock.clone()),
            Box::new(backend.clone()),
            Box::new(ScriptedEvents::new(clock.clone(), script)),
        )
        .unwrap();
        Rig {
            iface,
            ctx: Context::new(lists),
            clock,
            backend,
        }
    }

    fn rig(script: &[(f64, Event)]) -> Rig {
        rig_with(config(), script)
    }

    fn key_event(key: Key) -> Event {
        Event::KeyDown {
            key,
            modifiers: Modifiers::default(),
            repeat: false,
        }
    }

    fn enter(at: f64) -> (f64, Event) {
        (at, key_event(Key::Enter))
    }

    fn is_timeout(ev: &Event) -> bool {
        matches!(ev, Event::Timer(TimerKind::Timeout))
    }

    /// Ends the interaction when Enter is pressed.
    fn until_enter(name: &'static str) -> Probe {
        Probe::new(name).reacting(|_, ev, _| match ev.key_down() {
            Some((Key::Enter, _)) => EventResult::Handled(Response::Bool(true)),
            _ => EventResult::Unhandled,
        })
    }

    fn show(rig: &mut Rig, layer: &str, tag: &str, d: DisplayableRef) {
        rig.ctx
            .scene_lists
            .add(layer, d, ShowArgs::tagged(tag))
            .unwrap();
    }

    fn interact(rig: &mut Rig) -> Result<Option<Response>, InteractError> {
        rig.iface.interact(&mut rig.ctx, InteractOptions::default())
    }

    struct Cut(f64);

    impl Transition for Cut {
        fn apply(&self, _old: DisplayableRef, new: DisplayableRef) -> Option<TransitionNode> {
            Some(TransitionNode {
                displayable: new,
                delay: self.0,
            })
        }
    }

    struct Broken;

    impl Transition for Broken {
        fn apply(&self, _old: DisplayableRef, _new: DisplayableRef) -> Option<TransitionNode> {
            None
        }

        fn describe(&self) -> String {
            "Broken".to_string()
        }
    }

    // ── Setup ─────────────────────────────────────────────────────────────

    #[test]
    fn new_sets_the_configured_mode_and_saves_the_size() {
        let rig = rig(&[]);
        assert_eq!(rig.backend.mode(), Some(DisplayMode::windowed(800, 600)));
        assert_eq!(rig.iface.config().physical_size, Some((800, 600)));
    }

    #[test]
    fn renderer_selection_falls_back_to_software() {
        let clock = ManualClock::new(0.0);
        let config = InteractConfig {
            renderer: "gl".into(),
            ..config()
        };
        let iface = Interface::with_renderer(
            config,
            Rc::new(clock.clone()),
            Box::new(ScriptedEvents::new(clock, &[])),
            |kind| {
                let backend = match kind {
                    RendererKind::Sw => HeadlessBackend::new("sw"),
                    other => HeadlessBackend::failing(other.as_str()),
                };
                Ok(Box::new(backend) as Box<dyn DrawBackend>)
            },
        )
        .unwrap();
        assert_eq!(iface.renderer_name(), "sw");
    }

    // ── Timeouts and dispatch ─────────────────────────────────────────────

    #[test]
    fn timeouts_converge_on_the_soonest_request() {
        let mut rig = rig(&[]);
        let calls = Rc::new(Cell::new(0));
        let c = calls.clone();
        let probe = Rc::new(Probe::new("p").reacting(move |ctx, ev, _| {
            if !is_timeout(ev) {
                return EventResult::Unhandled;
            }
            c.set(c.get() + 1);
            if c.get() == 1 {
                ctx.timeout(5.0);
                ctx.timeout(2.0);
                EventResult::Unhandled
            } else {
                EventResult::Handled(Response::Int((ctx.now() * 1000.0).round() as i64))
            }
        }));
        show(&mut rig, "master", "p", probe);

        assert_eq!(interact(&mut rig).unwrap(), Some(Response::Int(2000)));
        assert_eq!(calls.get(), 2);
        assert_eq!(rig.clock.now(), 2.0);
    }

    #[test]
    fn due_redraw_is_drawn_before_the_next_dispatch() {
        let mut rig = rig(&[enter(1.0)]);
        let log: Log = Rc::new(RefCell::new(Vec::new()));
        let probe = Rc::new(Probe::new("p").logging(&log).reacting(|ctx, ev, _| {
            if is_timeout(ev) {
                ctx.redraw(0.0);
                return EventResult::Unhandled;
            }
            match ev.key_down() {
                Some(_) => EventResult::Handled(Response::Bool(true)),
                None => EventResult::Unhandled,
            }
        }));
        show(&mut rig, "master", "p", probe);

        interact(&mut rig).unwrap();
        assert_eq!(
            *log.borrow(),
            vec!["render p", "event p Timer", "render p", "event p KeyDown"]
        );
    }

    #[test]
    fn ignored_event_re_posts_the_timer() {
        let mut rig = rig(&[]);
        let calls = Rc::new(Cell::new(0));
        let c = calls.clone();
        let probe = Rc::new(Probe::new("p").reacting(move |_, ev, _| {
            if !is_timeout(ev) {
                return EventResult::Unhandled;
            }
            c.set(c.get() + 1);
            match c.get() {
                1 => EventResult::Ignored,
                n => EventResult::Handled(Response::Int(n - 1)),
            }
        }));
        show(&mut rig, "master", "p", probe);

        assert_eq!(interact(&mut rig).unwrap(), Some(Response::Int(1)));
    }

    #[test]
    fn nested_interaction_is_refused() {
        let mut rig = rig(&[]);
        rig.ctx.interacting = true;
        assert!(matches!(interact(&mut rig), Err(InteractError::Reentrant)));
    }

    #[test]
    fn restart_rebuilds_the_tree() {
        let mut rig = rig(&[]);
        let calls = Rc::new(Cell::new(0));
        let c = calls.clone();
        let probe = Rc::new(Probe::new("p").reacting(move |ctx, ev, _| {
            if !is_timeout(ev) {
                return EventResult::Unhandled;
            }
            c.set(c.get() + 1);
            if c.get() == 1 {
                ctx.restart_interaction();
                EventResult::Unhandled
            } else {
                EventResult::Handled(Response::Bool(true))
            }
        }));
        show(&mut rig, "master", "p", probe.clone());

        assert_eq!(interact(&mut rig).unwrap(), Some(Response::Bool(true)));
        assert_eq!(probe.per_interacts(), 2);
    }

    // ── Scene lifecycle ───────────────────────────────────────────────────

    #[test]
    fn cleanup_clears_overlay_and_transient_and_counts_runtime() {
        let mut rig = rig(&[enter(1.5)]);
        let overlay = Rc::new(Probe::new("overlay"));
        let o = overlay.clone();
        rig.iface
            .hooks_mut()
            .overlay_functions
            .push(Box::new(move |sl: &mut SceneLists| {
                sl.add("overlay", o.clone(), ShowArgs::default())
            }));
        show(&mut rig, "transient", "menu", Rc::new(Null));
        show(&mut rig, "master", "p", Rc::new(until_enter("p")));

        assert_eq!(interact(&mut rig).unwrap(), Some(Response::Bool(true)));
        assert!(!overlay.rendered_times().is_empty());
        assert!(rig.ctx.scene_lists.entries("overlay").unwrap().is_empty());
        assert!(rig.ctx.scene_lists.entries("transient").unwrap().is_empty());
        assert!(!rig.ctx.is_interacting());
        assert_eq!(rig.ctx.runtime(), 1.5);
    }

    #[test]
    fn reshown_tag_keeps_its_running_animation() {
        let mut rig = rig(&[enter(1.0), enter(2.75)]);

        fn slide(state: &mut TransformState, _st: f64, at: f64) -> Option<f64> {
            state.xoffset = (at * 10.0) as f32;
            Some(0.5)
        }

        rig.ctx
            .scene_lists
            .add(
                "master",
                Rc::new(until_enter("first")),
                ShowArgs::tagged("eileen").atl(Rc::new(slide)),
            )
            .unwrap();
        interact(&mut rig).unwrap();

        show(&mut rig, "master", "eileen", Rc::new(until_enter("second")));
        interact(&mut rig).unwrap();

        let entries = rig.ctx.scene_lists.entries("master").unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].tag.as_deref(), Some("eileen"));

        let d = rig
            .ctx
            .scene_lists
            .get_displayable_by_tag("master", "eileen")
            .unwrap();
        assert_eq!(d.as_transform().unwrap().state().xoffset, 25.0);
    }

    #[test]
    fn focus_is_stored_in_the_scene_lists() {
        let mut rig = rig(&[(0.5, key_event(Key::Tab)), enter(1.0)]);
        let button = Rc::new(Button::new(
            Rc::new(Solid::sized(Rgba::WHITE, 100.0, 50.0)),
            Response::Text("b".into()),
        ));
        show(&mut rig, "master", "button", button.clone());
        show(&mut rig, "master", "p", Rc::new(until_enter("p")));

        assert_eq!(interact(&mut rig).unwrap(), Some(Response::Bool(true)));
        assert_eq!(
            rig.ctx.scene_lists.focused(),
            Some(DisplayableId::of_ref(button.as_ref()))
        );
    }

    #[test]
    fn empty_window_hook_runs_when_enabled() {
        let mut rig = rig(&[enter(1.0)]);
        let calls = Rc::new(Cell::new(0));
        let c = calls.clone();
        rig.iface.set_window(true);
        rig.iface.hooks_mut().empty_window = Some(Box::new(move |sl: &mut SceneLists| {
            c.set(c.get() + 1);
            sl.set_shown_window(true);
            Ok(())
        }));
        show(&mut rig, "master", "p", Rc::new(until_enter("p")));

        interact(&mut rig).unwrap();
        assert_eq!(calls.get(), 1);
        assert!(!rig.ctx.scene_lists.shown_window());
    }

    // ── Transitions ───────────────────────────────────────────────────────

    #[test]
    fn trans_pause_without_a_transition_returns_nothing() {
        let mut rig = rig(&[]);
        show(&mut rig, "master", "bg", Rc::new(Null));
        rig.iface.with_none(&mut rig.ctx).unwrap();

        let opts = InteractOptions {
            trans_pause: true,
            ..InteractOptions::default()
        };
        assert_eq!(rig.iface.interact(&mut rig.ctx, opts).unwrap(), None);
        assert_eq!(rig.iface.do_with(&mut rig.ctx, None, None, false).unwrap(), None);
    }

    #[test]
    fn trans_pause_ends_when_the_transition_does() {
        let mut rig = rig(&[]);
        show(&mut rig, "master", "bg", Rc::new(Null));
        rig.iface.with_none(&mut rig.ctx).unwrap();

        let rv = rig
            .iface
            .do_with(&mut rig.ctx, Some(Rc::new(Cut(1.0))), None, false)
            .unwrap();
        assert_eq!(rv, Some(Response::Bool(false)));
        assert_eq!(rig.clock.now(), 1.0);

        rig.iface
            .set_transition(Some(Rc::new(Cut(1.0))), TransitionScope::Root, false);
        assert!(rig.iface.transition_pending(&TransitionScope::Root));
    }

    #[test]
    fn dismissed_trans_pause_suppresses_later_transitions() {
        let mut rig = rig(&[enter(0.5)]);
        show(&mut rig, "master", "bg", Rc::new(Null));
        rig.iface.with_none(&mut rig.ctx).unwrap();

        let rv = rig
            .iface
            .do_with(&mut rig.ctx, Some(Rc::new(Cut(1.0))), None, false)
            .unwrap();
        assert_eq!(rv, Some(Response::Bool(true)));

        rig.iface
            .set_transition(Some(Rc::new(Cut(1.0))), TransitionScope::Root, false);
        assert!(!rig.iface.transition_pending(&TransitionScope::Root));

        rig.iface
            .set_transition(Some(Rc::new(Cut(1.0))), TransitionScope::Root, true);
        assert!(rig.iface.transition_pending(&TransitionScope::Root));
    }

    #[test]
    fn malformed_transition_fails_the_interaction() {
        let mut rig = rig(&[]);
        show(&mut rig, "master", "bg", Rc::new(Null));
        rig.iface.with_none(&mut rig.ctx).unwrap();
        rig.iface
            .set_transition(Some(Rc::new(Broken)), TransitionScope::Root, false);

        match interact(&mut rig) {
            Err(InteractError::MalformedTransition { scope, transition }) => {
                assert_eq!(scope, TransitionScope::Root);
                assert_eq!(transition, "Broken");
            }
            other => panic!("unexpected result: {other:?}"),
        }
        assert!(!rig.ctx.is_interacting());
    }

    // ── Quit ──────────────────────────────────────────────────────────────

    #[test]
    fn quit_without_an_action_ends_the_session() {
        let mut rig = rig(&[(0.5, Event::Quit)]);
        show(&mut rig, "master", "p", Rc::new(until_enter("p")));
        assert!(matches!(interact(&mut rig), Err(InteractError::Quit)));
    }

    #[test]
    fn second_quit_inside_the_grace_window_exits() {
        let mut rig = rig(&[(0.5, Event::Quit), (1.0, Event::Quit)]);
        let calls = Rc::new(Cell::new(0));
        let c = calls.clone();
        rig.iface.hooks_mut().quit_action = Some(Box::new(move || {
            c.set(c.get() + 1);
            None
        }));
        show(&mut rig, "master", "p", Rc::new(until_enter("p")));

        assert!(matches!(interact(&mut rig), Err(InteractError::Quit)));
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn quit_action_response_ends_the_interaction() {
        let mut rig = rig(&[(0.5, Event::Quit), (2.0, Event::Quit)]);
        let calls = Rc::new(Cell::new(0));
        let c = calls.clone();
        rig.iface.hooks_mut().quit_action = Some(Box::new(move || {
            c.set(c.get() + 1);
            (c.get() == 2).then(|| Response::Text("quit".into()))
        }));
        show(&mut rig, "master", "p", Rc::new(until_enter("p")));

        assert_eq!(
            interact(&mut rig).unwrap(),
            Some(Response::Text("quit".into()))
        );
        assert_eq!(calls.get(), 2);
    }

    // ── Window ────────────────────────────────────────────────────────────

    #[test]
    fn resize_sets_the_mode_and_ignores_tiny_windows() {
        let mut rig = rig(&[
            (0.1, Event::Resize { width: 1000, height: 700 }),
            enter(0.2),
            (0.3, Event::Resize { width: 100, height: 100 }),
            enter(0.4),
        ]);
        show(&mut rig, "master", "p", Rc::new(until_enter("p")));

        interact(&mut rig).unwrap();
        assert_eq!(rig.backend.mode(), Some(DisplayMode::windowed(1000, 700)));
        assert_eq!(rig.iface.config().physical_size, Some((1000, 700)));

        interact(&mut rig).unwrap();
        assert_eq!(rig.backend.mode(), Some(DisplayMode::windowed(800, 600)));
    }

    #[test]
    fn restore_resets_the_display_when_configured() {
        let config = InteractConfig {
            reset_on_restore: true,
            ..config()
        };
        let mut rig = rig_with(
            config,
            &[
                (0.1, Event::Focus(FocusChange::Visible(false))),
                (0.2, Event::Focus(FocusChange::Visible(true))),
                enter(0.3),
            ],
        );
        show(&mut rig, "master", "p", Rc::new(until_enter("p")));

        interact(&mut rig).unwrap();
        assert_eq!(rig.backend.resets(), 1);
    }

    #[test]
    fn idle_mouse_hides_until_it_moves() {
        let config = InteractConfig {
            mouse_hide_time: Some(1.0),
            ..config()
        };
        let mut rig = rig_with(
            config,
            &[
                (
                    2.0,
                    Event::KeyUp {
                        key: Key::A,
                        modifiers: Modifiers::default(),
                    },
                ),
                (2.5, Event::MouseMove { x: 5.0, y: 5.0 }),
                enter(3.0),
            ],
        );

        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = seen.clone();
        let backend = rig.backend.clone();
        let probe = Probe::new("p").reacting(move |_, ev, _| match ev {
            Event::MouseMove { .. } => {
                s.borrow_mut().push(backend.cursor());
                EventResult::Unhandled
            }
            Event::KeyDown { .. } => {
                s.borrow_mut().push(backend.cursor());
                EventResult::Handled(Response::Bool(true))
            }
            _ => EventResult::Unhandled,
        });
        show(&mut rig, "master", "p", Rc::new(probe));

        interact(&mut rig).unwrap();
        assert_eq!(*seen.borrow(), vec![MouseState::Hidden, MouseState::Hardware]);
    }

    #[test]
    fn animated_cursor_follows_periodic_ticks() {
        let frame = |image: &str| CursorFrame {
            image: image.to_string(),
            x: 0,
            y: 0,
        };
        let mut config = InteractConfig {
            periodic_interval: 0.05,
            ..config()
        };
        config
            .mouse
            .insert("default".into(), vec![frame("a"), frame("b"), frame("c")]);
        let mut rig = rig_with(config, &[enter(0.12)]);
        show(&mut rig, "master", "p", Rc::new(until_enter("p")));

        interact(&mut rig).unwrap();
        assert_eq!(rig.iface.ticks(), 2);
        assert_eq!(
            rig.backend.cursor(),
            MouseState::Animated {
                name: "c".into(),
                frame: 2
            }
        );
    }

    // ── Screenshots ───────────────────────────────────────────────────────

    #[test]
    fn screenshot_of_the_last_frame() {
        let mut rig = rig(&[enter(1.0)]);
        show(&mut rig, "master", "p", Rc::new(until_enter("p")));
        assert_eq!(rig.iface.take_screenshot(), None);

        interact(&mut rig).unwrap();
        let size = rig.iface.take_screenshot().map(|s| (s.width, s.height));
        assert_eq!(size, Some((800, 600)));

        rig.iface.lose_screenshot();
        assert!(rig.iface.get_screenshot().is_some());
    }

    #[test]
    fn background_screenshot_is_served_while_waiting() {
        let mut rig = rig(&[enter(1.0)]);
        show(&mut rig, "master", "p", Rc::new(until_enter("p")));

        let requester = rig.iface.screenshot_requester();
        let worker = thread::spawn(move || requester.request(Duration::from_secs(10)));
        while !rig.iface.screenshot_requested() {
            thread::yield_now();
        }

        interact(&mut rig).unwrap();
        let shot = worker.join().unwrap().unwrap();
        assert_eq!((shot.width, shot.height), (800, 600));
    }

    // ── Idle work ─────────────────────────────────────────────────────────

    #[test]
    fn autosave_runs_once_per_interaction() {
        struct Counter(Rc<Cell<u32>>);
        impl Autosave for Counter {
            fn autosave(&mut self) {
                self.0.set(self.0.get() + 1);
            }
        }

        let mut rig = rig(&[
            (
                1.0,
                Event::KeyUp {
                    key: Key::A,
                    modifiers: Modifiers::default(),
                },
            ),
            enter(2.0),
        ]);
        let saves = Rc::new(Cell::new(0));
        rig.iface.hooks_mut().autosave = Some(Box::new(Counter(saves.clone())));
        show(&mut rig, "master", "p", Rc::new(until_enter("p")));

        interact(&mut rig).unwrap();
        assert_eq!(saves.get(), 1);
    }

    #[test]
    fn preloads_come_before_predicted_images() {
        struct Recorder(Rc<RefCell<Vec<String>>>);
        impl ImageCache for Recorder {
            fn preload(&mut self, name: &str) {
                self.0.borrow_mut().push(name.to_string());
            }
        }

        let mut rig = rig(&[enter(1.0)]);
        let names = Rc::new(RefCell::new(Vec::new()));
        rig.iface.hooks_mut().image_cache = Box::new(Recorder(names.clone()));
        rig.iface.add_preload("logo");
        show(&mut rig, "master", "bg", Rc::new(Image::new("bg room", 800.0, 600.0)));
        show(&mut rig, "master", "p", Rc::new(until_enter("p")));

        interact(&mut rig).unwrap();
        assert_eq!(*names.borrow(), vec!["logo", "bg room"]);
    }

    #[test]
    fn drawn_since_tracks_the_last_frame() {
        let mut rig = rig(&[enter(1.0)]);
        show(&mut rig, "master", "p", Rc::new(until_enter("p")));
        assert!(!rig.iface.drawn_since(10.0));

        interact(&mut rig).unwrap();
        assert_eq!(rig.iface.frames(), 1);
        assert_eq!(rig.backend.frames(), 1);
        assert!(rig.iface.drawn_since(1.0));
        assert!(!rig.iface.drawn_since(0.5));
    }
}
