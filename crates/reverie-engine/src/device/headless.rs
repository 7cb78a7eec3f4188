use crate::coords::{Rect, Vec2};
use crate::input::Event;
use crate::render::{Content, DrawList, Render};

use super::{DeviceError, DisplayMode, DrawBackend, MouseState, Screenshot};

/// Software backend that records frames instead of presenting them.
///
/// Screenshots rasterize solid fills only; images and text are left to real
/// renderers. Used by headless runs and tests.
#[derive(Debug)]
pub struct HeadlessBackend {
    name: String,
    fail_mode_set: bool,
    mode: Option<DisplayMode>,
    frames: u64,
    last_frame: Option<DrawList>,
    last_overlay: bool,
    mouse: Option<Vec2>,
    cursor: MouseState,
    resets: u32,
}

impl HeadlessBackend {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            fail_mode_set: false,
            mode: None,
            frames: 0,
            last_frame: None,
            last_overlay: false,
            mouse: None,
            cursor: MouseState::default(),
            resets: 0,
        }
    }

    /// A backend whose `set_mode` always fails, for exercising fallback.
    pub fn failing(name: &str) -> Self {
        Self {
            fail_mode_set: true,
            ..Self::new(name)
        }
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn last_frame(&self) -> Option<&DrawList> {
        self.last_frame.as_ref()
    }

    pub fn last_overlay(&self) -> bool {
        self.last_overlay
    }

    pub fn cursor(&self) -> &MouseState {
        &self.cursor
    }

    pub fn resets(&self) -> u32 {
        self.resets
    }

    pub fn mode(&self) -> Option<DisplayMode> {
        self.mode
    }
}

impl DrawBackend for HeadlessBackend {
    fn name(&self) -> &str {
        &self.name
    }

    fn set_mode(&mut self, mode: DisplayMode) -> Result<(), DeviceError> {
        if self.fail_mode_set {
            return Err(DeviceError::ModeSet {
                renderer: self.name.clone(),
                reason: "mode set disabled".into(),
            });
        }
        log::debug!("headless `{}` mode {}x{}", self.name, mode.width, mode.height);
        self.mode = Some(mode);
        Ok(())
    }

    fn reset(&mut self) {
        self.resets += 1;
        self.last_frame = None;
    }

    fn draw_screen(&mut self, surface: &Render, overlay: bool) {
        self.frames += 1;
        self.last_overlay = overlay;
        self.last_frame = Some(surface.flatten());
    }

    fn mouse_position(&self) -> Option<Vec2> {
        self.mouse
    }

    fn mouse_event(&mut self, ev: &Event) -> Option<Vec2> {
        let pos = ev.position()?;
        self.mouse = Some(pos);
        Some(pos)
    }

    fn set_mouse(&mut self, mouse: MouseState) {
        self.cursor = mouse;
    }

    fn screenshot(&mut self, surface: &Render, _overlay: bool) -> Screenshot {
        let (width, height) = match self.mode {
            Some(m) => (m.width, m.height),
            None => (surface.width.max(0.0) as u32, surface.height.max(0.0) as u32),
        };
        rasterize(&surface.flatten(), width, height)
    }

    fn physical_size(&self) -> (u32, u32) {
        self.mode.map(|m| (m.width, m.height)).unwrap_or((0, 0))
    }
}

fn rasterize(list: &DrawList, width: u32, height: u32) -> Screenshot {
    let mut pixels = vec![0u8; (width as usize) * (height as usize) * 4];
    let screen = Rect::from_size(width as f32, height as f32);

    for item in list.in_paint_order() {
        let Content::Solid(color) = item.cmd.content else {
            continue;
        };

        let mut area = match screen.intersect(item.cmd.rect) {
            Some(r) => r,
            None => continue,
        };
        if let Some(clip) = item.clip_rect {
            area = match area.intersect(clip) {
                Some(r) => r,
                None => continue,
            };
        }

        let alpha = (color.0[3] as f32 / 255.0) * item.cmd.alpha.clamp(0.0, 1.0);
        let x0 = area.origin.x.floor() as u32;
        let y0 = area.origin.y.floor() as u32;
        let x1 = (area.right().ceil() as u32).min(width);
        let y1 = (area.bottom().ceil() as u32).min(height);

        for y in y0..y1 {
            for x in x0..x1 {
                let i = ((y * width + x) * 4) as usize;
                for c in 0..3 {
                    let dst = pixels[i + c] as f32;
                    let src = color.0[c] as f32;
                    pixels[i + c] = (src * alpha + dst * (1.0 - alpha)).round() as u8;
                }
                let dst_a = pixels[i + 3] as f32 / 255.0;
                pixels[i + 3] = ((alpha + dst_a * (1.0 - alpha)) * 255.0).round() as u8;
            }
        }
    }

    Screenshot {
        width,
        height,
        pixels,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::Rgba;

    #[test]
    fn draw_screen_records_frames() {
        let mut b = HeadlessBackend::new("sw");
        let surface = Render::new(4.0, 4.0).with_content(Content::Solid(Rgba::WHITE));
        b.draw_screen(&surface, true);
        b.draw_screen(&surface, false);

        assert_eq!(b.frames(), 2);
        assert!(!b.last_overlay());
        assert_eq!(b.last_frame().map(|l| l.len()), Some(1));
    }

    #[test]
    fn screenshot_fills_solids() {
        let mut b = HeadlessBackend::new("sw");
        b.set_mode(DisplayMode::windowed(4, 4)).unwrap();

        let mut root = Render::new(4.0, 4.0).with_content(Content::Solid(Rgba::BLACK));
        root.blit(
            Render::new(2.0, 2.0).with_content(Content::Solid(Rgba::new(255, 0, 0, 255))),
            Vec2::new(2.0, 2.0),
        );

        let shot = b.screenshot(&root, false);
        assert_eq!(shot.pixels.len(), 4 * 4 * 4);
        assert_eq!(shot.pixel(0, 0), Some([0, 0, 0, 255]));
        assert_eq!(shot.pixel(3, 3), Some([255, 0, 0, 255]));
        assert_eq!(shot.pixel(4, 0), None);
    }

    #[test]
    fn half_alpha_blends_over_background() {
        let mut root = Render::new(1.0, 1.0).with_content(Content::Solid(Rgba::BLACK));
        let mut top = Render::new(1.0, 1.0).with_content(Content::Solid(Rgba::WHITE));
        top.alpha = 0.5;
        root.blit(top, Vec2::zero());

        let shot = HeadlessBackend::new("sw").screenshot(&root, false);
        assert_eq!(shot.pixel(0, 0), Some([128, 128, 128, 255]));
    }

    #[test]
    fn failing_backend_refuses_mode() {
        let mut b = HeadlessBackend::failing("gl");
        assert!(b.set_mode(DisplayMode::windowed(1, 1)).is_err());
        assert_eq!(b.physical_size(), (0, 0));
    }

    #[test]
    fn mouse_events_update_position() {
        let mut b = HeadlessBackend::new("sw");
        assert_eq!(b.mouse_event(&Event::Quit), None);
        assert_eq!(
            b.mouse_event(&Event::MouseMove { x: 3.0, y: 5.0 }),
            Some(Vec2::new(3.0, 5.0))
        );
        assert_eq!(b.mouse_position(), Some(Vec2::new(3.0, 5.0)));
    }
}
