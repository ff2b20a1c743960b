use thiserror::Error;

/// Errors of [`DmcEnv`](crate::DmcEnv).
#[derive(Error, Debug, PartialEq)]
pub enum DmcEnvError {
    /// The task name is not of the form `<domain>_<task>`.
    #[error("invalid task name {0:?}, expected <domain>_<task>")]
    InvalidTaskName(String),

    /// `action_repeat` is zero.
    #[error("action_repeat must be at least 1")]
    InvalidActionRepeat,

    /// The action contains NaN or infinity.
    #[error("action contains non-finite values: {0:?}")]
    NonFiniteAction(Vec<f32>),

    /// Only `rgb_array` rendering is supported.
    #[error("unsupported render mode {0:?}, only 'rgb_array' is supported")]
    UnsupportedRenderMode(String),

    /// The state given to `reset_state` does not fit the physics.
    #[error("{name} has {actual} elements, physics expects {expected}")]
    StateShapeMismatch {
        /// `position` or `velocity`.
        name: &'static str,
        /// Size of the physics state.
        expected: usize,
        /// Size of the given state.
        actual: usize,
    },
}
