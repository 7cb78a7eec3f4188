use reverie_engine::device::DeviceError;
use thiserror::Error;

use crate::scene::SceneError;

use super::TransitionScope;

#[derive(Debug, Error)]
pub enum InteractError {
    #[error("cannot start an interaction inside another one without a new context")]
    Reentrant,

    #[error("transition `{transition}` on {scope} did not produce a displayable")]
    MalformedTransition {
        scope: TransitionScope,
        transition: String,
    },

    #[error("quit requested")]
    Quit,

    #[error(transparent)]
    Scene(#[from] SceneError),

    #[error(transparent)]
    Device(#[from] DeviceError),

    #[error("invalid configuration: {0}")]
    Config(String),
}
