use thiserror::Error;

/// Fatal errors raised before or outside the per-window solves.
///
/// Per-window infeasibility is not an error at this level: it is recorded as a
/// missing entry in the sweep result instead.
#[derive(Debug, Error)]
pub enum SizingError {
    #[error("window horizon {horizon} is invalid for a series of {len} samples")]
    HorizonOutOfRange { horizon: usize, len: usize },

    #[error("production series has {production} samples but usage series has {usage}")]
    SeriesLengthMismatch { production: usize, usage: usize },

    #[error("no window produced a usable solution")]
    NoScenarios,

    #[error("solver backend failed: {0}")]
    Engine(String),
}
