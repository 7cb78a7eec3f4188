use thiserror::Error;

#[derive(Debug, Error)]
pub enum DeviceError {
    #[error("renderer `{renderer}` failed to set mode: {reason}")]
    ModeSet { renderer: String, reason: String },

    #[error("no renderer could be initialized (tried: {})", .tried.join(", "))]
    NoRenderer { tried: Vec<String> },

    #[error("unknown renderer `{0}`")]
    UnknownRenderer(String),
}
