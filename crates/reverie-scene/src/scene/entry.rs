use std::fmt;

use crate::displayable::{DisplayableId, DisplayableRef, HideReason};

/// Image name as its space-separated components, e.g. `["eileen", "happy"]`.
pub type ImageName = Vec<String>;

/// True for tags synthesized for exiting entries (`hide$x`, `replaced$x`).
pub fn is_lifecycle_tag(tag: &str) -> bool {
    HideReason::from_lifecycle_tag(tag).is_some()
}

/// One displayable on a layer.
///
/// Entries are never mutated in place; updates replace the whole value.
#[derive(Clone)]
pub struct SceneListEntry {
    pub tag: Option<String>,
    pub zorder: i32,
    /// When the entry was first drawn. `None` until the next interaction
    /// renders its first frame.
    pub show_time: Option<f64>,
    /// Start of the animation timebase; survives replacement of a tag.
    pub attr_time: Option<f64>,
    pub displayable: DisplayableRef,
    pub name: Option<ImageName>,
}

impl SceneListEntry {
    /// Elapsed `(show, attr)` time at `now`. Unlatched times count as `now`.
    pub fn elapsed(&self, now: f64) -> (f64, f64) {
        (
            now - self.show_time.unwrap_or(now),
            now - self.attr_time.unwrap_or(now),
        )
    }

    pub fn with_times(&self, time: f64) -> Self {
        Self {
            show_time: self.show_time.or(Some(time)),
            attr_time: self.attr_time.or(Some(time)),
            ..self.clone()
        }
    }

    pub fn id(&self) -> DisplayableId {
        DisplayableId::of(&self.displayable)
    }
}

impl fmt::Debug for SceneListEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SceneListEntry")
            .field("tag", &self.tag)
            .field("zorder", &self.zorder)
            .field("show_time", &self.show_time)
            .field("attr_time", &self.attr_time)
            .field("displayable", &self.displayable.kind())
            .field("name", &self.name)
            .finish()
    }
}
