//! Translation from winit window events into [`Event`]s.
//!
//! winit delivers button presses without a pointer position and tracks
//! modifiers as a separate event, so the translator keeps both between calls.

use winit::event::{ElementState, MouseButton as WinitMouseButton, WindowEvent};
use winit::keyboard::{KeyCode, ModifiersState, PhysicalKey};

use crate::coords::Vec2;
use crate::input::{Event, FocusChange, Key, Modifiers, MouseButton};

#[derive(Debug, Default)]
pub struct WinitTranslator {
    cursor: Vec2,
    modifiers: Modifiers,
}

impl WinitTranslator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last known pointer position, in physical pixels.
    pub fn cursor(&self) -> Vec2 {
        self.cursor
    }

    /// Returns `None` for window events the interaction loop has no use for.
    pub fn translate(&mut self, ev: &WindowEvent) -> Option<Event> {
        match ev {
            WindowEvent::CloseRequested => Some(Event::Quit),

            WindowEvent::Resized(size) => Some(Event::Resize {
                width: size.width,
                height: size.height,
            }),

            WindowEvent::CursorMoved { position, .. } => {
                self.cursor = Vec2::new(position.x as f32, position.y as f32);
                Some(Event::MouseMove {
                    x: self.cursor.x,
                    y: self.cursor.y,
                })
            }

            WindowEvent::MouseInput { state, button, .. } => {
                let button = map_mouse_button(*button);
                let Vec2 { x, y } = self.cursor;
                Some(match state {
                    ElementState::Pressed => Event::MouseDown { button, x, y },
                    ElementState::Released => Event::MouseUp { button, x, y },
                })
            }

            WindowEvent::ModifiersChanged(m) => {
                self.modifiers = map_modifiers(m.state());
                None
            }

            WindowEvent::KeyboardInput { event, .. } => {
                let key = map_key(event.physical_key);
                Some(match event.state {
                    ElementState::Pressed => Event::KeyDown {
                        key,
                        modifiers: self.modifiers,
                        repeat: event.repeat,
                    },
                    ElementState::Released => Event::KeyUp {
                        key,
                        modifiers: self.modifiers,
                    },
                })
            }

            WindowEvent::Focused(focused) => Some(Event::Focus(FocusChange::Input(*focused))),
            WindowEvent::Occluded(occluded) => {
                Some(Event::Focus(FocusChange::Visible(!*occluded)))
            }

            _ => None,
        }
    }
}

fn map_modifiers(m: ModifiersState) -> Modifiers {
    Modifiers {
        shift: m.shift_key(),
        ctrl: m.control_key(),
        alt: m.alt_key(),
        meta: m.super_key(),
    }
}

fn map_mouse_button(b: WinitMouseButton) -> MouseButton {
    match b {
        WinitMouseButton::Left => MouseButton::Left,
        WinitMouseButton::Right => MouseButton::Right,
        WinitMouseButton::Middle => MouseButton::Middle,
        WinitMouseButton::Back => MouseButton::Back,
        WinitMouseButton::Forward => MouseButton::Forward,
        WinitMouseButton::Other(v) => MouseButton::Other(v),
    }
}

/// Maps codes whose variant name is shared by both enums.
macro_rules! same_name {
    ($code:expr, [$($name:ident),* $(,)?], $fallback:expr) => {
        match $code {
            $(KeyCode::$name => Key::$name,)*
            _ => $fallback,
        }
    };
}

fn map_key(pk: PhysicalKey) -> Key {
    let code = match pk {
        PhysicalKey::Code(code) => code,
        PhysicalKey::Unidentified(_) => return Key::Unknown(0),
    };

    let letter = match code {
        KeyCode::KeyA => Some(Key::A),
        KeyCode::KeyB => Some(Key::B),
        KeyCode::KeyC => Some(Key::C),
        KeyCode::KeyD => Some(Key::D),
        KeyCode::KeyE => Some(Key::E),
        KeyCode::KeyF => Some(Key::F),
        KeyCode::KeyG => Some(Key::G),
        KeyCode::KeyH => Some(Key::H),
        KeyCode::KeyI => Some(Key::I),
        KeyCode::KeyJ => Some(Key::J),
        KeyCode::KeyK => Some(Key::K),
        KeyCode::KeyL => Some(Key::L),
        KeyCode::KeyM => Some(Key::M),
        KeyCode::KeyN => Some(Key::N),
        KeyCode::KeyO => Some(Key::O),
        KeyCode::KeyP => Some(Key::P),
        KeyCode::KeyQ => Some(Key::Q),
        KeyCode::KeyR => Some(Key::R),
        KeyCode::KeyS => Some(Key::S),
        KeyCode::KeyT => Some(Key::T),
        KeyCode::KeyU => Some(Key::U),
        KeyCode::KeyV => Some(Key::V),
        KeyCode::KeyW => Some(Key::W),
        KeyCode::KeyX => Some(Key::X),
        KeyCode::KeyY => Some(Key::Y),
        KeyCode::KeyZ => Some(Key::Z),
        _ => None,
    };
    if let Some(key) = letter {
        return key;
    }

    match code {
        KeyCode::ShiftLeft | KeyCode::ShiftRight => Key::Shift,
        KeyCode::ControlLeft | KeyCode::ControlRight => Key::Control,
        KeyCode::AltLeft | KeyCode::AltRight => Key::Alt,
        KeyCode::SuperLeft | KeyCode::SuperRight => Key::Meta,
        KeyCode::NumpadEnter => Key::Enter,
        other => same_name!(
            other,
            [
                Escape, Enter, Tab, Backspace, Space, Insert, Delete, Home, End, PageUp,
                PageDown, ArrowUp, ArrowDown, ArrowLeft, ArrowRight, Digit0, Digit1, Digit2,
                Digit3, Digit4, Digit5, Digit6, Digit7, Digit8, Digit9, F1, F2, F3, F4, F5,
                F6, F7, F8, F9, F10, F11, F12,
            ],
            Key::Unknown(other as u32)
        ),
    }
}
