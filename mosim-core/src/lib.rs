#![warn(missing_docs)]
//! Core interfaces of mosim.
//!
//! This crate provides the traits shared by environments and replay buffers
//! ([`Env`], [`Step`], [`StepProcessor`], [`ExperienceBufferBase`],
//! [`ReplayBufferBase`]), a key/value [`Record`](record::Record) emitted at every
//! environment step, and [`EpisodicReplayBuffer`](replay_buffer::EpisodicReplayBuffer),
//! a fixed-capacity buffer that stores transitions per episode.
//!
//! ```no_run
//! use mosim_core::{
//!     replay_buffer::{EpisodicReplayBuffer, EpisodicReplayBufferConfig, Transition},
//!     ExperienceBufferBase, ReplayBufferBase,
//! };
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = EpisodicReplayBufferConfig::default()
//!     .capacity(10_000)
//!     .max_episode_len(1_000)
//!     .state_dim(3)
//!     .action_dim(1);
//! let mut buffer = EpisodicReplayBuffer::build(&config)?;
//! buffer.push(Transition::new(
//!     vec![0.0, 0.1, 0.2],
//!     vec![0.5],
//!     1.0,
//!     vec![0.1, 0.2, 0.3],
//!     false,
//!     false,
//! ))?;
//! let batch = buffer.batch(32)?;
//! assert_eq!(batch.len(), 32);
//! # Ok(())
//! # }
//! ```
pub mod error;
pub mod record;
pub mod replay_buffer;

mod base;
pub use base::{
    Act, Env, ExperienceBufferBase, Info, Obs, ReplayBufferBase, Step, StepProcessor,
};
