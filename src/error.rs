//! Named input errors raised before a clip reaches a task.

use thiserror::Error;

/// Input rejected by the runner or by a task that cannot work with it.
///
/// These travel inside `anyhow::Error`; callers that need to branch on the
/// kind can `downcast_ref::<InputError>()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("invalid sample rate {0}Hz (must be positive)")]
    InvalidSampleRate(u32),
    #[error("empty audio clip")]
    EmptyClip,
}
