use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{ImageName, ShownImages};

/// Serializable description of one entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntrySnapshot {
    pub tag: Option<String>,
    pub zorder: i32,
    pub show_time: Option<f64>,
    pub attr_time: Option<f64>,
    pub name: Option<ImageName>,
    /// Displayable kind, for diagnostics.
    pub kind: String,
}

/// Serializable description of a whole Scene Lists instance.
///
/// Displayables themselves stay with the live instance; persistence hooks
/// store this and rebuild the displayables from image names.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneSnapshot {
    pub layers: BTreeMap<String, Vec<EntrySnapshot>>,
    pub shown: ShownImages,
}
