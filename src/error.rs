use thiserror::Error;

/// Errors reported by the engine.
///
/// Unsupported requests (a counted repeat with several carets, resuming when
/// nothing was selected before) are not errors; those operations return `Ok(false)`.
/// The variants here are logic defects or bad input and must not be ignored.
#[derive(Debug, Error)]
pub enum Error {
    /// Something tried to pop the base frame of a mode stack.
    #[error("attempted to pop the base mode frame")]
    BaseFramePop,
    /// The host reported a view without any caret.
    #[error("editor has no carets")]
    NoCarets,
    #[error("invalid key notation `{0}`")]
    KeyNotation(String),
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
