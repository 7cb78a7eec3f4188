use std::collections::BTreeMap;
use std::rc::Rc;

use crate::displayable::DisplayableRef;
use crate::scene::{SceneError, SceneLists};
use crate::widgets::Fixed;

/// The composed layers of one interaction.
///
/// Kept after the interaction ends as the source of the next transition.
#[derive(Clone, Default)]
pub struct Scene {
    layers: BTreeMap<String, DisplayableRef>,
    /// Layers under the root, bottom to top. Top layers are not included.
    root_order: Vec<String>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds every configured layer of `lists`.
    pub fn compute(lists: &SceneLists) -> Result<Self, SceneError> {
        let config = lists.config();
        let mut scene = Scene::new();
        for layer in &config.layers {
            scene.insert(layer, lists.make_layer(layer)?);
        }
        for layer in &config.top_layers {
            scene.insert_top(layer, lists.make_layer(layer)?);
        }
        Ok(scene)
    }

    /// Adds a layer that belongs under the root.
    pub fn insert(&mut self, layer: &str, d: DisplayableRef) {
        if self.layers.insert(layer.to_string(), d).is_none() {
            self.root_order.push(layer.to_string());
        }
    }

    pub fn insert_top(&mut self, layer: &str, d: DisplayableRef) {
        self.layers.insert(layer.to_string(), d);
    }

    pub fn layer(&self, layer: &str) -> Option<DisplayableRef> {
        self.layers.get(layer).cloned()
    }

    /// A fresh container holding the root layers in order.
    pub fn root(&self) -> DisplayableRef {
        let mut root = Fixed::new();
        for layer in &self.root_order {
            if let Some(d) = self.layers.get(layer) {
                root.add(d.clone());
            }
        }
        Rc::new(root)
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}
