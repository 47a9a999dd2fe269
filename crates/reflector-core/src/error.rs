//! Error types for reflector-rs.

use thiserror::Error;

/// The main error type for reflector operations.
#[derive(Error, Debug)]
pub enum ReflectorError {
    /// The offscreen reflection target could not be created.
    ///
    /// This is fatal for the reflector that requested it: the reflector is
    /// disabled afterwards.
    #[error("failed to allocate {width}x{height} reflection target: {reason}")]
    AllocationFailed {
        width: u32,
        height: u32,
        reason: String,
    },

    /// The reflector was disabled by an earlier allocation failure.
    #[error("reflector disabled after a failed render target allocation")]
    Disabled,

    /// Options failed validation.
    #[error("invalid reflector options: {0}")]
    InvalidOptions(String),

    /// Options could not be parsed.
    #[error("config error: {0}")]
    Config(#[from] serde_json::Error),
}

/// Error returned by [`Reflector::update_reflection`](crate::Reflector::update_reflection).
///
/// Errors raised by the scene render callback are carried unmodified in
/// [`UpdateError::Scene`].
#[derive(Error, Debug)]
pub enum UpdateError<E> {
    /// The reflector itself failed.
    #[error(transparent)]
    Reflector(#[from] ReflectorError),

    /// The scene render callback failed.
    #[error(transparent)]
    Scene(E),
}

impl<E> UpdateError<E> {
    /// Returns the scene error, if this is one.
    pub fn into_scene(self) -> Option<E> {
        match self {
            UpdateError::Scene(err) => Some(err),
            UpdateError::Reflector(_) => None,
        }
    }
}

/// A specialized Result type for reflector operations.
pub type Result<T> = std::result::Result<T, ReflectorError>;
