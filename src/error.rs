//! Animator error taxonomy.
//!
//! Every expected failure is recovered at the call boundary and returned as
//! an explicit variant; nothing in this crate panics for an expected
//! condition. The triggering layer owns user-visible rendering.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnimatorError {
    #[error("no animation named '{0}'")]
    NotFound(String),

    #[error("an animation named '{0}' already exists")]
    DuplicateName(String),

    #[error("actor '{0}' is not recording")]
    NotRecording(String),

    #[error("actor '{0}' is already recording on grid '{1}'")]
    AlreadyRecording(String, String),

    #[error("no frames recorded")]
    NoFramesRecorded,

    #[error("animation '{0}' is already playing")]
    AlreadyPlaying(String),

    #[error("animation '{0}' is not playing")]
    NotPlaying(String),

    #[error("grid '{0}' cannot be resolved")]
    UnresolvedGrid(String),

    #[error("animation record '{name}' is malformed: {reason}")]
    MalformedRecord { name: String, reason: String },

    #[error("storage error: {0}")]
    Storage(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, AnimatorError>;
