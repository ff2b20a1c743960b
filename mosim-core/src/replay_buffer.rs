//! Episodic experience replay.
//!
//! [`EpisodicReplayBuffer`] keeps transitions grouped by episode in a ring of
//! fixed-size episode slots. Sampling draws transitions uniformly over all stored
//! transitions and translates the flat index into `(slot, step)` with a binary
//! search over cumulative episode lengths.
mod base;
mod batch;
mod config;
mod step_proc;
pub use base::EpisodicReplayBuffer;
pub use batch::{EpisodicBatch, Transition};
pub use config::EpisodicReplayBufferConfig;
pub use step_proc::{EpisodicStepProcessor, EpisodicStepProcessorConfig};
