use crate::coords::Vec2;
use crate::input::Event;
use crate::render::Render;

use super::DeviceError;

/// Requested window/screen configuration.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct DisplayMode {
    pub width: u32,
    pub height: u32,
    pub fullscreen: bool,
}

impl DisplayMode {
    pub fn windowed(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            fullscreen: false,
        }
    }
}

/// Raw captured frame: tightly packed RGBA8, row-major.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Screenshot {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl Screenshot {
    /// Pixel at `(x, y)`, or `None` when out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y * self.width + x) * 4) as usize;
        let px = self.pixels.get(i..i + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }
}

/// What the pointer should look like for the coming frame.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum MouseState {
    #[default]
    Hardware,
    Hidden,
    /// Software cursor `name`, animation frame `frame`.
    Animated { name: String, frame: usize },
}

/// The drawing backend the interaction loop renders through.
pub trait DrawBackend {
    fn name(&self) -> &str;

    fn set_mode(&mut self, mode: DisplayMode) -> Result<(), DeviceError>;

    /// Drops cached GPU/window state after the display was lost (restore from
    /// minimize on some platforms).
    fn reset(&mut self) {}

    /// Frame pacing policy. `needs_redraw` is the loop's own request.
    fn should_redraw(&mut self, needs_redraw: bool, first_pass: bool) -> bool {
        needs_redraw || first_pass
    }

    fn draw_screen(&mut self, surface: &Render, overlay: bool);

    /// Last known pointer position in virtual coordinates.
    fn mouse_position(&self) -> Option<Vec2>;

    /// Maps the position carried by `ev` into virtual coordinates. Returns
    /// `None` for events without a position.
    fn mouse_event(&mut self, ev: &Event) -> Option<Vec2>;

    fn set_mouse(&mut self, _mouse: MouseState) {}

    fn screenshot(&mut self, surface: &Render, overlay: bool) -> Screenshot;

    fn physical_size(&self) -> (u32, u32);
}
