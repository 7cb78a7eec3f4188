//! Drawing-backend contract and renderer selection.
//!
//! The interaction core never rasterizes. It hands [`Render`] trees to a
//! [`DrawBackend`], chosen at mode-set time from an ordered list of renderer
//! candidates so a failing driver can fall back to software.
//!
//! [`Render`]: crate::render::Render

mod backend;
mod error;
mod headless;
mod select;

pub use backend::{DisplayMode, DrawBackend, MouseState, Screenshot};
pub use error::DeviceError;
pub use headless::HeadlessBackend;
pub use select::{RENDERER_ENV, RendererKind, RendererPreference, renderer_candidates, select_backend};
