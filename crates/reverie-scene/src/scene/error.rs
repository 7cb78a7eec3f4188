use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SceneError {
    #[error("unknown layer `{0}`")]
    InvalidLayer(String),

    #[error("not a displayable: {0}")]
    InvalidDisplayable(String),

    #[error("tag `{0}` is reserved for exiting entries")]
    ReservedTag(String),
}
