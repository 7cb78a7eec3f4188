use std::fmt;
use std::str::FromStr;

use super::{DeviceError, DisplayMode, DrawBackend};

/// Environment variable overriding the configured renderer preference.
pub const RENDERER_ENV: &str = "REVERIE_RENDERER";

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum RendererKind {
    Gl,
    Angle,
    Sw,
}

impl RendererKind {
    pub fn as_str(self) -> &'static str {
        match self {
            RendererKind::Gl => "gl",
            RendererKind::Angle => "angle",
            RendererKind::Sw => "sw",
        }
    }
}

impl fmt::Display for RendererKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RendererKind {
    type Err = DeviceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gl" => Ok(RendererKind::Gl),
            "angle" => Ok(RendererKind::Angle),
            "sw" => Ok(RendererKind::Sw),
            _ => Err(DeviceError::UnknownRenderer(s.to_string())),
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum RendererPreference {
    #[default]
    Auto,
    Only(RendererKind),
}

impl FromStr for RendererPreference {
    type Err = DeviceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("auto") {
            return Ok(RendererPreference::Auto);
        }
        s.parse().map(RendererPreference::Only)
    }
}

impl RendererPreference {
    /// Applies the `REVERIE_RENDERER` override, if set and valid.
    pub fn with_env_override(self) -> Self {
        match std::env::var(RENDERER_ENV) {
            Ok(v) => match v.parse() {
                Ok(p) => p,
                Err(err) => {
                    log::warn!("ignoring {RENDERER_ENV}: {err}");
                    self
                }
            },
            Err(_) => self,
        }
    }
}

/// Renderers to try, in order.
pub fn renderer_candidates(pref: RendererPreference, safe_mode: bool) -> Vec<RendererKind> {
    if safe_mode {
        return vec![RendererKind::Sw];
    }

    match pref {
        RendererPreference::Auto if cfg!(windows) => {
            vec![RendererKind::Gl, RendererKind::Angle, RendererKind::Sw]
        }
        RendererPreference::Auto => vec![RendererKind::Gl, RendererKind::Sw],
        RendererPreference::Only(RendererKind::Sw) => vec![RendererKind::Sw],
        RendererPreference::Only(kind) => vec![kind, RendererKind::Sw],
    }
}

/// Creates and mode-sets the first candidate that works.
///
/// `make` builds a backend for a renderer kind; both construction and
/// `set_mode` failures move on to the next candidate.
pub fn select_backend<F>(
    candidates: &[RendererKind],
    mode: DisplayMode,
    mut make: F,
) -> Result<Box<dyn DrawBackend>, DeviceError>
where
    F: FnMut(RendererKind) -> Result<Box<dyn DrawBackend>, DeviceError>,
{
    let mut tried = Vec::with_capacity(candidates.len());

    for &kind in candidates {
        tried.push(kind.to_string());

        let attempt = make(kind).and_then(|mut backend| {
            backend.set_mode(mode)?;
            Ok(backend)
        });

        match attempt {
            Ok(backend) => {
                log::info!(
                    "renderer `{}` set mode {}x{} (fullscreen: {})",
                    kind,
                    mode.width,
                    mode.height,
                    mode.fullscreen
                );
                return Ok(backend);
            }
            Err(err) => log::warn!("renderer `{kind}` unavailable: {err}"),
        }
    }

    Err(DeviceError::NoRenderer { tried })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::HeadlessBackend;

    #[test]
    fn safe_mode_forces_software() {
        assert_eq!(
            renderer_candidates(RendererPreference::Only(RendererKind::Gl), true),
            vec![RendererKind::Sw]
        );
    }

    #[test]
    fn explicit_renderer_falls_back_to_software() {
        assert_eq!(
            renderer_candidates(RendererPreference::Only(RendererKind::Angle), false),
            vec![RendererKind::Angle, RendererKind::Sw]
        );
    }

    #[test]
    fn auto_always_ends_with_software() {
        let c = renderer_candidates(RendererPreference::Auto, false);
        assert_eq!(c.first(), Some(&RendererKind::Gl));
        assert_eq!(c.last(), Some(&RendererKind::Sw));
    }

    #[test]
    fn preference_parses() {
        assert_eq!("auto".parse::<RendererPreference>().unwrap(), RendererPreference::Auto);
        assert_eq!(
            " GL ".parse::<RendererPreference>().unwrap(),
            RendererPreference::Only(RendererKind::Gl)
        );
        assert!(matches!(
            "vulkan".parse::<RendererPreference>(),
            Err(DeviceError::UnknownRenderer(_))
        ));
    }

    #[test]
    fn select_skips_failing_candidates() {
        let mode = DisplayMode::windowed(320, 240);
        let backend = select_backend(&[RendererKind::Gl, RendererKind::Sw], mode, |kind| {
            let backend = match kind {
                RendererKind::Sw => HeadlessBackend::new("sw"),
                other => HeadlessBackend::failing(other.as_str()),
            };
            Ok(Box::new(backend) as Box<dyn DrawBackend>)
        })
        .unwrap();

        assert_eq!(backend.name(), "sw");
        assert_eq!(backend.physical_size(), (320, 240));
    }

    #[test]
    fn select_reports_every_tried_renderer() {
        let err = select_backend(
            &[RendererKind::Gl, RendererKind::Sw],
            DisplayMode::windowed(1, 1),
            |kind| Err(DeviceError::ModeSet {
                renderer: kind.to_string(),
                reason: "no driver".into(),
            }),
        )
        .err()
        .unwrap();

        match err {
            DeviceError::NoRenderer { tried } => assert_eq!(tried, vec!["gl", "sw"]),
            other => panic!("unexpected error: {other}"),
        }
    }
}
