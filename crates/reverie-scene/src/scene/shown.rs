use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::ImageName;

/// Which image name is showing under each tag, per layer.
///
/// Kept in step with the scene lists so script-level queries ("is eileen
/// happy showing?") do not have to walk displayables.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShownImages {
    shown: BTreeMap<String, BTreeMap<String, ImageName>>,
}

impl ShownImages {
    pub fn predict_show(&mut self, layer: &str, tag: &str, name: ImageName) {
        self.shown
            .entry(layer.to_string())
            .or_default()
            .insert(tag.to_string(), name);
    }

    pub fn predict_hide(&mut self, layer: &str, tag: &str) {
        if let Some(tags) = self.shown.get_mut(layer) {
            tags.remove(tag);
        }
    }

    /// Forgets everything on `layer`.
    pub fn predict_scene(&mut self, layer: &str) {
        self.shown.remove(layer);
    }

    pub fn get(&self, layer: &str, tag: &str) -> Option<&ImageName> {
        self.shown.get(layer)?.get(tag)
    }

    /// True when the image shown under `name[0]` starts with all of `name`.
    pub fn showing(&self, layer: &str, name: &[String]) -> bool {
        let Some(tag) = name.first() else {
            return false;
        };
        self.get(layer, tag)
            .is_some_and(|shown| shown.starts_with(name))
    }
}
