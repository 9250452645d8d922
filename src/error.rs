//! Error types for the session core.
//!
//! Loader and engine implementations return [`ChatError`]; the session maps
//! these to user-visible messages and keeps the session alive. Only the load
//! retry bound ends a session.

use thiserror::Error;

/// Errors surfaced at the loader/engine boundary.
#[derive(Error, Debug)]
pub enum ChatError {
    /// The loader could not produce a model from the given path
    #[error("error loading model {path}: {message}")]
    ModelLoad {
        /// Path the load was attempted from
        path: String,
        /// Loader-supplied failure text
        message: String,
    },

    /// The engine reported a failed prediction
    #[error("{0}")]
    Prediction(String),

    /// Anything unexpected caught at the engine boundary
    #[error("internal error: {0}")]
    Internal(String),
}

impl ChatError {
    /// Create a model load error
    pub fn model_load(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ModelLoad {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a prediction error carrying the engine's own message
    pub fn prediction(message: impl Into<String>) -> Self {
        Self::Prediction(message.into())
    }

    /// True when the error should be reported generically rather than with
    /// the engine's message.
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal(_))
    }
}

/// Result type for session operations
pub type Result<T> = std::result::Result<T, ChatError>;
