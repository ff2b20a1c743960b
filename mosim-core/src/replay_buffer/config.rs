//! Configuration of [`EpisodicReplayBuffer`](super::EpisodicReplayBuffer).
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    default::Default,
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Configuration of [`EpisodicReplayBuffer`](super::EpisodicReplayBuffer).
///
/// The buffer holds `capacity / max_episode_len` episode slots, each of which
/// stores up to `max_episode_len` transitions.
///
/// ```rust
/// use mosim_core::replay_buffer::EpisodicReplayBufferConfig;
///
/// let config = EpisodicReplayBufferConfig::default()
///     .capacity(100_000)
///     .max_episode_len(1_000)
///     .state_dim(24)
///     .action_dim(6)
///     .gamma(0.99);
/// assert_eq!(config.max_episodes(), 100);
/// ```
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct EpisodicReplayBufferConfig {
    /// Maximum number of transitions in the buffer.
    pub capacity: usize,

    /// Dimension of states.
    pub state_dim: usize,

    /// Dimension of actions.
    pub action_dim: usize,

    /// Discount factor for n-step returns. The buffer only keeps it for consumers.
    pub gamma: f32,

    /// Maximum number of transitions in an episode.
    pub max_episode_len: usize,

    /// Seed of the random number generator used for sampling.
    pub seed: u64,

    /// Number of most recent actions kept for [`action_std`](super::EpisodicReplayBuffer::action_std).
    pub recent_actions: usize,
}

impl Default for EpisodicReplayBufferConfig {
    fn default() -> Self {
        Self {
            capacity: 1_000_000,
            state_dim: 1,
            action_dim: 1,
            gamma: 0.99,
            max_episode_len: 1000,
            seed: 42,
            recent_actions: 100,
        }
    }
}

impl EpisodicReplayBufferConfig {
    /// Sets the capacity of the replay buffer.
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Sets the dimension of states.
    pub fn state_dim(mut self, state_dim: usize) -> Self {
        self.state_dim = state_dim;
        self
    }

    /// Sets the dimension of actions.
    pub fn action_dim(mut self, action_dim: usize) -> Self {
        self.action_dim = action_dim;
        self
    }

    /// Sets the discount factor.
    pub fn gamma(mut self, gamma: f32) -> Self {
        self.gamma = gamma;
        self
    }

    /// Sets the maximum length of episodes.
    pub fn max_episode_len(mut self, max_episode_len: usize) -> Self {
        self.max_episode_len = max_episode_len;
        self
    }

    /// Sets the random seed for sampling.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Sets the number of recent actions kept in the buffer.
    pub fn recent_actions(mut self, recent_actions: usize) -> Self {
        self.recent_actions = recent_actions;
        self
    }

    /// Number of episode slots.
    pub fn max_episodes(&self) -> usize {
        if self.max_episode_len == 0 {
            0
        } else {
            self.capacity / self.max_episode_len
        }
    }

    /// Loads the configuration from a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves the configuration to a YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempdir::TempDir;

    #[test]
    fn test_serde_episodic_replay_buffer_config() -> Result<()> {
        let config = EpisodicReplayBufferConfig::default()
            .capacity(5000)
            .max_episode_len(500)
            .state_dim(17)
            .action_dim(6)
            .gamma(0.9)
            .seed(7);

        let dir = TempDir::new("episodic_replay_buffer_config")?;
        let path = dir.path().join("replay_buffer.yaml");
        config.save(&path)?;
        let config_ = EpisodicReplayBufferConfig::load(&path)?;
        assert_eq!(config, config_);
        Ok(())
    }

    #[test]
    fn test_max_episodes_is_integer_division() {
        let config = EpisodicReplayBufferConfig::default()
            .capacity(2500)
            .max_episode_len(1000);
        assert_eq!(config.max_episodes(), 2);

        let config = config.max_episode_len(0);
        assert_eq!(config.max_episodes(), 0);
    }
}
