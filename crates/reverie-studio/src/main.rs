use std::rc::Rc;
use std::thread;
use std::time::Duration;

use anyhow::{Context as _, bail};
use reverie_engine::device::{DrawBackend, HeadlessBackend};
use reverie_engine::input::{Event, EventQueue, EventSender, Key, Modifiers};
use reverie_engine::logging::init_logging;
use reverie_engine::time::{SharedClock, SystemClock};
use reverie_scene::Response;
use reverie_scene::interact::{
    Context, EngineConfig, InteractOptions, Interface, ScreenshotRequester,
};
use reverie_scene::scene::{SceneLists, ShowArgs};
use reverie_scene::widgets::{Dissolve, Image, SayBehavior};

fn main() -> anyhow::Result<()> {
    let config = load_config()?;
    init_logging(config.logging());

    let queue = EventQueue::new();
    let sender = queue.sender();
    let clock: SharedClock = Rc::new(SystemClock::new());

    let mut iface = Interface::with_renderer(
        config.interact.clone(),
        clock.clone(),
        Box::new(queue),
        |kind| Ok(Box::new(HeadlessBackend::new(kind.as_str())) as Box<dyn DrawBackend>),
    )
    .context("no renderer could set the display mode")?;
    log::info!("studio running on `{}`", iface.renderer_name());

    iface.hooks_mut().quit_action = Some(Box::new(|| Some(Response::Text("quit".into()))));

    let lists = SceneLists::new(Rc::new(config.scene.clone()), clock);
    let mut ctx = Context::new(lists);

    let requester = iface.screenshot_requester().with_waker(sender.clone());
    let operator = thread::spawn(move || operate(sender, requester));

    // Dialogue: waits for Enter.
    ctx.scene_lists
        .add("master", Rc::new(Image::new("bg room", 1280.0, 720.0)), ShowArgs::tagged("bg"))?;
    ctx.scene_lists.add(
        "master",
        Rc::new(Image::new("eileen happy", 400.0, 600.0)),
        ShowArgs::tagged("eileen"),
    )?;
    say(&mut ctx)?;
    let rv = iface.interact(&mut ctx, InteractOptions::default())?;
    log::info!("dialogue ended with {rv:?}");

    // Expression change under a dissolve.
    ctx.scene_lists.add(
        "master",
        Rc::new(Image::new("eileen surprised", 400.0, 600.0)),
        ShowArgs::tagged("eileen"),
    )?;
    let rv = iface.do_with(&mut ctx, Some(Rc::new(Dissolve::new(0.3))), None, true)?;
    log::info!("dissolve ended with {rv:?}");

    // Waits for the quit request.
    say(&mut ctx)?;
    let rv = iface.interact(&mut ctx, InteractOptions::default())?;
    if rv != Some(Response::Text("quit".into())) {
        bail!("expected the quit action to end the session, got {rv:?}");
    }

    match operator.join() {
        Ok(Some((width, height))) => log::info!("background screenshot: {width}x{height}"),
        Ok(None) => log::warn!("background screenshot was not served"),
        Err(_) => bail!("operator thread panicked"),
    }

    log::info!(
        "{} frames, {:.2}s inside interactions",
        iface.frames(),
        ctx.runtime()
    );
    Ok(())
}

fn load_config() -> anyhow::Result<EngineConfig> {
    match std::env::args().nth(1) {
        Some(path) => {
            let text = std::fs::read_to_string(&path)
                .with_context(|| format!("reading config `{path}`"))?;
            EngineConfig::from_json_str(&text).with_context(|| format!("parsing config `{path}`"))
        }
        None => EngineConfig::from_json_str(include_str!("../studio.json"))
            .context("parsing the bundled config"),
    }
}

fn say(ctx: &mut Context) -> anyhow::Result<()> {
    ctx.scene_lists
        .add("transient", Rc::new(SayBehavior::new()), ShowArgs::tagged("say"))?;
    Ok(())
}

/// Stands in for the player: presses Enter, grabs a frame from off the
/// interaction thread, then closes the window.
fn operate(sender: EventSender, requester: ScreenshotRequester) -> Option<(u32, u32)> {
    thread::sleep(Duration::from_millis(300));
    sender.send(Event::KeyDown {
        key: Key::Enter,
        modifiers: Modifiers::default(),
        repeat: false,
    });

    thread::sleep(Duration::from_millis(600));
    let size = requester
        .request(Duration::from_secs(2))
        .map(|shot| (shot.width, shot.height));

    sender.send(Event::Quit);
    size
}
