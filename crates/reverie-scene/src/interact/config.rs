use std::collections::BTreeMap;

use reverie_engine::device::{DisplayMode, RendererPreference};
use reverie_engine::logging::LoggingConfig;
use serde::{Deserialize, Serialize};

use crate::scene::SceneConfig;

use super::InteractError;

/// One frame of an animated mouse cursor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CursorFrame {
    pub image: String,
    /// Hotspot inside the image.
    pub x: i32,
    pub y: i32,
}

/// Tunables of the interaction loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractConfig {
    /// Virtual screen size.
    pub width: u32,
    pub height: u32,
    /// A second quit request inside this window (seconds) exits immediately.
    pub quit_grace: f64,
    /// Hide the mouse after this long without mouse activity. `None` keeps it.
    pub mouse_hide_time: Option<f64>,
    /// Seconds between periodic ticks; `0` disables them.
    pub periodic_interval: f64,
    /// Upper bound on a single blocking wait, in seconds.
    pub max_wait: f64,
    /// Autosave once per interaction after this much input idleness.
    pub autosave_idle: f64,
    /// Keep overlays visible during `with` transitions.
    pub overlay_during_with: bool,
    /// Reset the display after restoring from minimize.
    pub reset_on_restore: bool,
    /// Resize events smaller than this are spurious.
    pub min_window_size: u32,
    /// `auto`, `gl`, `angle` or `sw`.
    pub renderer: String,
    pub safe_mode: bool,
    pub save_physical_size: bool,
    pub physical_size: Option<(u32, u32)>,
    pub fullscreen: bool,
    /// Animated cursors by mouse kind. Empty means the hardware cursor.
    pub mouse: BTreeMap<String, Vec<CursorFrame>>,
}

impl Default for InteractConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            quit_grace: 0.75,
            mouse_hide_time: Some(30.0),
            periodic_interval: 0.05,
            max_wait: 3600.0,
            autosave_idle: 0.25,
            overlay_during_with: true,
            reset_on_restore: cfg!(windows),
            min_window_size: 256,
            renderer: "auto".to_string(),
            safe_mode: false,
            save_physical_size: true,
            physical_size: None,
            fullscreen: false,
            mouse: BTreeMap::new(),
        }
    }
}

impl InteractConfig {
    /// Configured preference, overridden by `REVERIE_RENDERER` when set.
    pub fn renderer_preference(&self) -> Result<RendererPreference, InteractError> {
        let pref: RendererPreference = self.renderer.parse()?;
        Ok(pref.with_env_override())
    }

    /// Initial mode: the saved physical size if any, else the virtual size.
    pub fn display_mode(&self) -> DisplayMode {
        let (width, height) = self.physical_size.unwrap_or((self.width, self.height));
        DisplayMode {
            width,
            height,
            fullscreen: self.fullscreen,
        }
    }
}

/// Full configuration of an engine instance.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub scene: SceneConfig,
    pub interact: InteractConfig,
    /// `env_logger` filter string.
    pub log_filter: Option<String>,
}

impl EngineConfig {
    pub fn from_json_str(s: &str) -> Result<Self, InteractError> {
        let config: EngineConfig =
            serde_json::from_str(s).map_err(|e| InteractError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), InteractError> {
        for layer in self
            .scene
            .transient_layers
            .iter()
            .chain(self.scene.overlay_layers.iter())
            .chain(self.scene.layer_clipping.keys())
        {
            if !self.scene.has_layer(layer) {
                return Err(InteractError::Config(format!(
                    "layer `{layer}` is not in `layers` or `top_layers`"
                )));
            }
        }
        if self.interact.max_wait <= 0.0 {
            return Err(InteractError::Config("`max_wait` must be positive".into()));
        }
        Ok(())
    }

    pub fn logging(&self) -> LoggingConfig {
        LoggingConfig {
            env_filter: self.log_filter.clone(),
            ..LoggingConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_json_is_default() {
        assert_eq!(EngineConfig::from_json_str("{}").unwrap(), EngineConfig::default());
    }

    #[test]
    fn nested_fields_override() {
        let c = EngineConfig::from_json_str(
            r#"{ "interact": { "width": 800, "quit_grace": 1.5 }, "log_filter": "debug" }"#,
        )
        .unwrap();
        assert_eq!(c.interact.width, 800);
        assert_eq!(c.interact.height, 720);
        assert_eq!(c.interact.quit_grace, 1.5);
        assert_eq!(c.logging().env_filter.as_deref(), Some("debug"));
    }

    #[test]
    fn unknown_transient_layer_is_rejected() {
        let err = EngineConfig::from_json_str(r#"{ "scene": { "transient_layers": ["menus"] } }"#)
            .unwrap_err();
        assert!(matches!(err, InteractError::Config(_)));
    }

    #[test]
    fn malformed_json_is_a_config_error() {
        assert!(matches!(
            EngineConfig::from_json_str("{ nope"),
            Err(InteractError::Config(_))
        ));
    }

    #[test]
    fn bad_renderer_name_surfaces_as_device_error() {
        let c = InteractConfig {
            renderer: "vulkan".into(),
            ..InteractConfig::default()
        };
        assert!(matches!(c.renderer_preference(), Err(InteractError::Device(_))));
    }
}
