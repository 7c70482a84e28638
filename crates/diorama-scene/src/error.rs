//! Error types for scene operations.

use thiserror::Error;

/// Failures surfaced by scene, catalog and binding operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SceneError {
    /// Selection or deletion attempted while the scene holds no instances.
    #[error("scene is empty")]
    EmptyScene,

    /// The asset catalog could not resolve a model.
    #[error("failed to load asset '{id}': {reason}")]
    AssetLoad {
        /// Catalog identifier that was requested.
        id: String,
        /// Loader message.
        reason: String,
    },

    /// A malformed axis token in a key or axis mapping.
    #[error("invalid axis token '{0}'")]
    InvalidAxisToken(String),

    /// A model kind or sequence asset slot with nothing bound to it.
    #[error("no model kind bound at slot {0}")]
    UnknownModelKind(usize),

    /// Run requested for a sequence that is not defined.
    #[error("no animation sequence with index {0}")]
    UnknownSequence(usize),
}

/// Result type alias using [`SceneError`].
pub type Result<T> = std::result::Result<T, SceneError>;
