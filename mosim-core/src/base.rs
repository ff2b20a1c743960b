//! Core functionalities.
mod env;
mod replay_buffer;
mod step;
pub use env::Env;
pub use replay_buffer::{ExperienceBufferBase, ReplayBufferBase};
use std::fmt::Debug;
pub use step::{Info, Step, StepProcessor};

/// An observation of an environment.
///
/// Vectorized environments are not supported, so an object of this type
/// always represents a single observation.
pub trait Obs: Clone + Debug {}

/// An action of an environment.
pub trait Act: Clone + Debug {}
