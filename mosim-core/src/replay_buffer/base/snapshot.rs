//! Saving and loading the content of [`EpisodicReplayBuffer`].
use super::EpisodicReplayBuffer;
use crate::{error::MosimError, replay_buffer::EpisodicReplayBufferConfig};
use anyhow::Result;
use chrono::{DateTime, Local};
use log::{info, warn};
use ndarray::{Array2, Array3};
use serde::{Deserialize, Serialize};
use std::{
    fs::{self, File},
    io::{BufReader, BufWriter},
    path::Path,
};

#[derive(Serialize)]
struct SnapshotRef<'a> {
    saved_at: DateTime<Local>,
    config: &'a EpisodicReplayBufferConfig,
    states: &'a Array3<f32>,
    actions: &'a Array3<f32>,
    rewards: &'a Array2<f32>,
    dones: &'a Array2<i8>,
    ep_lens: &'a [usize],
    ep_pointer: usize,
    cur_episodes: usize,
    size: usize,
}

#[derive(Deserialize)]
struct Snapshot {
    saved_at: DateTime<Local>,
    config: EpisodicReplayBufferConfig,
    states: Array3<f32>,
    actions: Array3<f32>,
    rewards: Array2<f32>,
    dones: Array2<i8>,
    ep_lens: Vec<usize>,
    ep_pointer: usize,
    cur_episodes: usize,
    size: usize,
}

fn mismatch(what: &str, saved: usize, given: usize) -> MosimError {
    MosimError::SnapshotMismatch(format!("{}: saved {}, given {}", what, saved, given))
}

impl Snapshot {
    /// Checks that the cursors and episode lengths describe a consistent buffer.
    fn check_cursors(&self, max_episodes: usize, max_episode_len: usize) -> Result<(), MosimError> {
        if self.cur_episodes == 0 || self.cur_episodes > max_episodes {
            return Err(MosimError::SnapshotMismatch(format!(
                "cur_episodes {} out of 1..={}",
                self.cur_episodes, max_episodes
            )));
        }
        if self.ep_pointer >= self.cur_episodes {
            return Err(MosimError::SnapshotMismatch(format!(
                "ep_pointer {} out of 0..{}",
                self.ep_pointer, self.cur_episodes
            )));
        }
        if let Some(len) = self.ep_lens.iter().find(|&&len| len > max_episode_len) {
            return Err(MosimError::SnapshotMismatch(format!(
                "episode length {} exceeds {}",
                len, max_episode_len
            )));
        }
        let total = self.ep_lens[..self.cur_episodes].iter().sum::<usize>();
        if self.size != total || self.ep_lens[self.cur_episodes..].iter().any(|&len| len > 0) {
            return Err(MosimError::SnapshotMismatch(format!(
                "size {} does not match episode lengths {:?}",
                self.size, self.ep_lens
            )));
        }
        Ok(())
    }
}

impl EpisodicReplayBuffer {
    fn write_snapshot(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            if !dir.as_os_str().is_empty() {
                fs::create_dir_all(dir)?;
            }
        }
        let snapshot = SnapshotRef {
            saved_at: Local::now(),
            config: &self.config,
            states: &self.states,
            actions: &self.actions,
            rewards: &self.rewards,
            dones: &self.dones,
            ep_lens: &self.ep_lens,
            ep_pointer: self.ep_pointer,
            cur_episodes: self.cur_episodes,
            size: self.size,
        };
        let writer = BufWriter::new(File::create(path)?);
        bincode::serialize_into(writer, &snapshot)?;
        Ok(())
    }

    /// Saves the stored episodes to `path`, creating parent directories as needed.
    ///
    /// Recent actions and the state of the random number generator are not saved.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        match self.write_snapshot(path) {
            Ok(()) => {
                info!("Replay buffer saved to {:?}", path);
                Ok(())
            }
            Err(e) => {
                warn!("Failed to save replay buffer to {:?}: {}", path, e);
                Err(e)
            }
        }
    }

    /// Loads a buffer saved with [`EpisodicReplayBuffer::save`].
    ///
    /// Capacity, episode length and dimensions of `config` must match the saved
    /// buffer. The seed and the discount factor are taken from `config`.
    pub fn load(path: impl AsRef<Path>, config: &EpisodicReplayBufferConfig) -> Result<Self> {
        let path = path.as_ref();
        let rdr = BufReader::new(File::open(path)?);
        let snapshot: Snapshot = bincode::deserialize_from(rdr)?;

        let saved = &snapshot.config;
        if saved.capacity != config.capacity {
            return Err(mismatch("capacity", saved.capacity, config.capacity).into());
        }
        if saved.max_episode_len != config.max_episode_len {
            return Err(mismatch(
                "max_episode_len",
                saved.max_episode_len,
                config.max_episode_len,
            )
            .into());
        }
        if saved.state_dim != config.state_dim {
            return Err(mismatch("state_dim", saved.state_dim, config.state_dim).into());
        }
        if saved.action_dim != config.action_dim {
            return Err(mismatch("action_dim", saved.action_dim, config.action_dim).into());
        }

        let mut buffer = Self::new(config)?;
        if snapshot.ep_lens.len() != buffer.max_episodes
            || snapshot.states.dim() != buffer.states.dim()
            || snapshot.actions.dim() != buffer.actions.dim()
            || snapshot.rewards.dim() != buffer.rewards.dim()
            || snapshot.dones.dim() != buffer.dones.dim()
        {
            return Err(MosimError::SnapshotMismatch("corrupted array shapes".to_string()).into());
        }
        snapshot.check_cursors(buffer.max_episodes, config.max_episode_len)?;

        buffer.states = snapshot.states;
        buffer.actions = snapshot.actions;
        buffer.rewards = snapshot.rewards;
        buffer.dones = snapshot.dones;
        buffer.ep_lens = snapshot.ep_lens;
        buffer.ep_pointer = snapshot.ep_pointer;
        buffer.cur_episodes = snapshot.cur_episodes;
        buffer.size = snapshot.size;

        info!(
            "Replay buffer loaded from {:?} (saved at {}, {} transitions)",
            path, snapshot.saved_at, buffer.size
        );
        Ok(buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ReplayBufferBase;
    use tempdir::TempDir;

    fn config() -> EpisodicReplayBufferConfig {
        EpisodicReplayBufferConfig::default()
            .capacity(20)
            .max_episode_len(10)
            .state_dim(1)
            .action_dim(1)
    }

    /// Writes a snapshot of `buffer` with the cursors replaced.
    fn write_with_cursors(
        buffer: &EpisodicReplayBuffer,
        path: &Path,
        ep_lens: &[usize],
        ep_pointer: usize,
        cur_episodes: usize,
        size: usize,
    ) -> Result<()> {
        let snapshot = SnapshotRef {
            saved_at: Local::now(),
            config: &buffer.config,
            states: &buffer.states,
            actions: &buffer.actions,
            rewards: &buffer.rewards,
            dones: &buffer.dones,
            ep_lens,
            ep_pointer,
            cur_episodes,
            size,
        };
        bincode::serialize_into(BufWriter::new(File::create(path)?), &snapshot)?;
        Ok(())
    }

    fn load_err(path: &Path) -> Option<MosimError> {
        EpisodicReplayBuffer::load(path, &config())
            .err()
            .and_then(|e| e.downcast::<MosimError>().ok())
    }

    #[test]
    fn test_load_corrupted_cursors() -> Result<()> {
        let mut buffer = EpisodicReplayBuffer::build(&config())?;
        buffer.append(&[0.], &[0.], 1., true, &[1.], true)?;
        let dir = TempDir::new("snapshot")?;
        let path = dir.path().join("buffer.bin");

        write_with_cursors(&buffer, &path, &[1, 0], 1, 2, 1)?;
        let mut loaded = EpisodicReplayBuffer::load(&path, &config())?;
        assert_eq!(loaded.sample(4)?.len(), 4);

        let cases: &[(&[usize], usize, usize, usize)] = &[
            // Episode longer than a slot.
            (&[50, 0], 0, 1, 50),
            // Write cursor out of range.
            (&[1, 0], 7, 2, 1),
            (&[1, 0], 1, 1, 1),
            // No occupied slot, or more than available.
            (&[0, 0], 0, 0, 0),
            (&[1, 0], 1, 3, 1),
            // Size inconsistent with episode lengths.
            (&[1, 0], 1, 2, 5),
            (&[1, 2], 0, 1, 1),
        ];
        for &(ep_lens, ep_pointer, cur_episodes, size) in cases {
            write_with_cursors(&buffer, &path, ep_lens, ep_pointer, cur_episodes, size)?;
            assert!(matches!(
                load_err(&path),
                Some(MosimError::SnapshotMismatch(_))
            ));
        }
        Ok(())
    }
}
