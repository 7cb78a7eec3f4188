//! Scene Lists: what is shown on each layer.
//!
//! Each layer is an ordered list of [`SceneListEntry`] values sorted by
//! `zorder`. Tags name "the thing currently showing under this name"; an
//! entry that is leaving but still animating keeps a lifecycle tag
//! (`hide$tag`, `replaced$tag`) until its exit animation finishes.

mod config;
mod entry;
mod error;
mod lists;
mod shown;
mod snapshot;

pub use config::SceneConfig;
pub use entry::{ImageName, SceneListEntry, is_lifecycle_tag};
pub use error::SceneError;
pub use lists::{SceneLists, ShowArgs, TransformContinuity, WrapsTransform};
pub use shown::ShownImages;
pub use snapshot::{EntrySnapshot, SceneSnapshot};
