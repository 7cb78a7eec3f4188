use std::collections::BTreeMap;

use reverie_engine::coords::Rect;
use serde::{Deserialize, Serialize};

/// Layer layout shared by every Scene Lists instance of a session.
///
/// Fixed at startup; Scene Lists only ever read it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Layers composited bottom to top beneath any root transition.
    pub layers: Vec<String>,
    /// Layers drawn above the root transition.
    pub top_layers: Vec<String>,
    /// Layers emptied at the end of every interaction.
    pub transient_layers: Vec<String>,
    /// Layers rebuilt by overlay functions each interaction.
    pub overlay_layers: Vec<String>,
    /// Layers confined to a rectangle of the screen.
    pub layer_clipping: BTreeMap<String, Rect>,
    /// Re-showing a tag keeps its running transform, swapping only the child.
    pub keep_running_transform: bool,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            layers: ["master", "transient", "screens", "overlay"]
                .into_iter()
                .map(String::from)
                .collect(),
            top_layers: Vec::new(),
            transient_layers: vec!["transient".to_string()],
            overlay_layers: vec!["overlay".to_string()],
            layer_clipping: BTreeMap::new(),
            keep_running_transform: true,
        }
    }
}

impl SceneConfig {
    /// Regular layers followed by top layers.
    pub fn all_layers(&self) -> impl Iterator<Item = &String> {
        self.layers.iter().chain(self.top_layers.iter())
    }

    pub fn has_layer(&self, layer: &str) -> bool {
        self.all_layers().any(|l| l == layer)
    }
}
