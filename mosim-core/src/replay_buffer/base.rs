//! Episodic replay buffer.
//!
//! Transitions are stored in fixed-size episode slots. Slots are recycled in a ring:
//! closing an episode moves the write cursor to the next slot and discards
//! the episode previously stored there.
mod snapshot;
use super::{EpisodicBatch, EpisodicReplayBufferConfig, Transition};
use crate::{error::MosimError, ExperienceBufferBase, ReplayBufferBase};
use anyhow::Result;
use log::{debug, warn};
use ndarray::{s, Array1, Array2, Array3, ArrayView1, Axis};
use rand::{
    distributions::{Distribution, WeightedIndex},
    rngs::StdRng,
    Rng, SeedableRng,
};

/// Cumulative episode lengths over the occupied slots, in slot order.
fn episode_ends(ep_lens: &[usize]) -> Vec<usize> {
    ep_lens
        .iter()
        .scan(0, |acc, &len| {
            *acc += len;
            Some(*acc)
        })
        .collect()
}

/// Maps a flat index in `[0, ends.last())` to `(slot, step)`.
///
/// Empty slots never satisfy `end > ix` before a non-empty one does, so they are skipped.
fn to_episodic(ends: &[usize], ix: usize) -> (usize, usize) {
    let slot = ends.partition_point(|&end| end <= ix);
    let start = if slot == 0 { 0 } else { ends[slot - 1] };
    (slot, ix - start)
}

fn check_dim(name: &'static str, expected: usize, actual: usize) -> Result<(), MosimError> {
    if expected == actual {
        Ok(())
    } else {
        Err(MosimError::DimensionMismatch {
            name,
            expected,
            actual,
        })
    }
}

/// A replay buffer storing transitions per episode.
///
/// The buffer has `capacity / max_episode_len` slots. Each slot keeps
/// `max_episode_len + 1` states so that the next state of the last transition of
/// an episode is available when sampling.
pub struct EpisodicReplayBuffer {
    config: EpisodicReplayBufferConfig,

    max_episodes: usize,

    /// Slot of the episode being filled.
    ep_pointer: usize,

    /// Number of slots in use, including the one being filled.
    cur_episodes: usize,

    /// Number of stored transitions.
    size: usize,

    states: Array3<f32>,

    actions: Array3<f32>,

    rewards: Array2<f32>,

    dones: Array2<i8>,

    ep_lens: Vec<usize>,

    /// Ring of the most recent actions.
    recent_actions: Array2<f32>,

    n_recent_actions: usize,

    rng: StdRng,
}

impl EpisodicReplayBuffer {
    fn new(config: &EpisodicReplayBufferConfig) -> Result<Self, MosimError> {
        let max_episodes = config.max_episodes();
        if max_episodes == 0 {
            return Err(MosimError::CapacityTooSmall {
                capacity: config.capacity,
                max_episode_len: config.max_episode_len,
            });
        }
        let max_len = config.max_episode_len;

        Ok(Self {
            config: config.clone(),
            max_episodes,
            ep_pointer: 0,
            cur_episodes: 1,
            size: 0,
            states: Array3::zeros((max_episodes, max_len + 1, config.state_dim)),
            actions: Array3::zeros((max_episodes, max_len, config.action_dim)),
            rewards: Array2::zeros((max_episodes, max_len)),
            dones: Array2::zeros((max_episodes, max_len)),
            ep_lens: vec![0; max_episodes],
            recent_actions: Array2::zeros((config.recent_actions, config.action_dim)),
            n_recent_actions: 0,
            rng: StdRng::seed_from_u64(config.seed),
        })
    }

    /// Appends a transition to the episode being filled.
    ///
    /// * `done` - `true` only if the episode ended naturally.
    /// * `episode_done` - `true` if the episode ended for any reason. The episode is
    ///   closed after the transition is stored.
    ///
    /// Fails without modifying the buffer if a dimension does not match the
    /// configuration or the episode already holds `max_episode_len` transitions.
    pub fn append(
        &mut self,
        state: &[f32],
        action: &[f32],
        reward: f32,
        done: bool,
        next_state: &[f32],
        episode_done: bool,
    ) -> Result<()> {
        check_dim("state", self.config.state_dim, state.len())?;
        check_dim("action", self.config.action_dim, action.len())?;
        check_dim("next_state", self.config.state_dim, next_state.len())?;

        let p = self.ep_pointer;
        let t = self.ep_lens[p];
        if t >= self.config.max_episode_len {
            return Err(MosimError::EpisodeOverflow {
                slot: p,
                max_episode_len: self.config.max_episode_len,
            }
            .into());
        }

        self.states
            .slice_mut(s![p, t, ..])
            .assign(&ArrayView1::from(state));
        self.states
            .slice_mut(s![p, t + 1, ..])
            .assign(&ArrayView1::from(next_state));
        self.actions
            .slice_mut(s![p, t, ..])
            .assign(&ArrayView1::from(action));
        self.rewards[[p, t]] = reward;
        self.dones[[p, t]] = done as i8;
        self.push_recent_action(action);

        self.ep_lens[p] += 1;
        self.size += 1;

        if episode_done {
            self.inc_episode();
        }

        Ok(())
    }

    fn push_recent_action(&mut self, action: &[f32]) {
        let n = self.recent_actions.nrows();
        if n == 0 {
            return;
        }
        let i = self.n_recent_actions % n;
        self.recent_actions
            .row_mut(i)
            .assign(&ArrayView1::from(action));
        self.n_recent_actions += 1;
    }

    /// Moves the write cursor to the next slot and drops the episode stored there.
    fn inc_episode(&mut self) {
        debug!(
            "Close episode in slot {} with {} transitions",
            self.ep_pointer, self.ep_lens[self.ep_pointer]
        );
        self.ep_pointer = (self.ep_pointer + 1) % self.max_episodes;
        self.cur_episodes = (self.cur_episodes + 1).min(self.max_episodes);
        self.size -= self.ep_lens[self.ep_pointer];
        self.ep_lens[self.ep_pointer] = 0;
    }

    /// Closes the episode being filled, e.g., when a time limit is reached.
    ///
    /// Does nothing if the episode has no transition yet.
    pub fn end_episode(&mut self) {
        if self.ep_lens[self.ep_pointer] > 0 {
            self.inc_episode();
        }
    }

    /// Appends the transitions of an episode.
    ///
    /// Transitions after the first one with `done == true` are ignored. If no
    /// transition has `done == true`, the episode is closed after the last one.
    pub fn add_episode<I>(&mut self, episode: I) -> Result<()>
    where
        I: IntoIterator<Item = Transition>,
    {
        for tr in episode {
            let done = tr.done;
            self.append(&tr.state, &tr.action, tr.reward, done, &tr.next_state, done)?;
            if done {
                return Ok(());
            }
        }
        self.end_episode();
        Ok(())
    }

    /// Samples `batch_size` transitions uniformly with replacement.
    pub fn sample(&mut self, batch_size: usize) -> Result<EpisodicBatch> {
        if self.size == 0 {
            return Err(MosimError::EmptyBuffer.into());
        }

        let ends = episode_ends(&self.ep_lens[..self.cur_episodes]);
        debug_assert_eq!(ends.last().copied(), Some(self.size));
        let size = self.size;
        let ix_sample = (0..batch_size)
            .map(|_| to_episodic(&ends, self.rng.gen_range(0..size)))
            .collect::<Vec<_>>();

        let state_dim = self.config.state_dim;
        let action_dim = self.config.action_dim;
        let obs = Array2::from_shape_fn((batch_size, state_dim), |(i, j)| {
            let (e, t) = ix_sample[i];
            self.states[[e, t, j]]
        });
        let next_obs = Array2::from_shape_fn((batch_size, state_dim), |(i, j)| {
            let (e, t) = ix_sample[i];
            self.states[[e, t + 1, j]]
        });
        let act = Array2::from_shape_fn((batch_size, action_dim), |(i, j)| {
            let (e, t) = ix_sample[i];
            self.actions[[e, t, j]]
        });
        let reward = ix_sample
            .iter()
            .map(|&(e, t)| self.rewards[[e, t]])
            .collect();
        let done = ix_sample.iter().map(|&(e, t)| self.dones[[e, t]]).collect();

        Ok(EpisodicBatch {
            obs,
            act,
            reward,
            done,
            next_obs,
            ix_sample,
        })
    }

    /// Samples a stored state, favoring recent episodes.
    ///
    /// Episodes are weighted by `exp(recency * recent_bias)`, where recency grows
    /// linearly from 0 for the oldest episode to 1 for the newest one. The step is
    /// drawn uniformly within the chosen episode. Returns `None` if no episode
    /// holds a transition or `recent_bias` is not finite.
    pub fn sample_initial_state(&mut self, recent_bias: f32) -> Option<Vec<f32>> {
        if !recent_bias.is_finite() {
            warn!("recent_bias must be finite, got {}", recent_bias);
            return None;
        }
        let bias = recent_bias as f64;

        let n = self.cur_episodes;
        let oldest = if n == self.max_episodes {
            (self.ep_pointer + 1) % self.max_episodes
        } else {
            0
        };
        let (slots, logits): (Vec<usize>, Vec<f64>) = (0..n)
            .map(|k| {
                let slot = (oldest + k) % self.max_episodes;
                let recency = if n > 1 {
                    k as f64 / (n - 1) as f64
                } else {
                    0.0
                };
                (slot, recency * bias)
            })
            .filter(|(slot, _)| self.ep_lens[*slot] > 0)
            .unzip();

        if slots.is_empty() {
            warn!("No stored state to sample an initial state from");
            return None;
        }

        // Shifted so that the largest weight is 1.
        let max_logit = logits.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let weights = logits
            .iter()
            .map(|l| (l - max_logit).exp())
            .collect::<Vec<_>>();
        let dist = match WeightedIndex::new(&weights) {
            Ok(dist) => dist,
            Err(e) => {
                warn!("Failed to weight episodes with recent_bias={}: {}", recent_bias, e);
                return None;
            }
        };
        let slot = slots[dist.sample(&mut self.rng)];
        let step = self.rng.gen_range(0..self.ep_lens[slot]);

        Some(self.states.slice(s![slot, step, ..]).to_vec())
    }

    /// Returns the most recent actions, oldest first.
    pub fn recent_actions(&self) -> Array2<f32> {
        let n = self.recent_actions.nrows();
        if self.n_recent_actions <= n {
            self.recent_actions
                .slice(s![..self.n_recent_actions, ..])
                .to_owned()
        } else {
            let start = self.n_recent_actions % n;
            let ixs = (0..n).map(|k| (start + k) % n).collect::<Vec<_>>();
            self.recent_actions.select(Axis(0), &ixs)
        }
    }

    /// Per-dimension sample standard deviation of the most recent actions.
    ///
    /// Returns `None` if fewer than two actions have been stored.
    pub fn action_std(&self) -> Option<Array1<f32>> {
        let actions = self.recent_actions();
        if actions.nrows() < 2 {
            None
        } else {
            Some(actions.std_axis(Axis(0), 1.0))
        }
    }

    /// Number of slots in use, including the one being filled.
    pub fn num_episodes(&self) -> usize {
        self.cur_episodes
    }

    /// Length of the episode being filled.
    pub fn last_episode_len(&self) -> usize {
        self.ep_lens[self.ep_pointer]
    }

    /// Lengths of all episode slots.
    pub fn episode_lens(&self) -> &[usize] {
        &self.ep_lens
    }

    /// Discount factor given in the configuration.
    pub fn gamma(&self) -> f32 {
        self.config.gamma
    }

    /// Maximum number of transitions.
    pub fn capacity(&self) -> usize {
        self.config.capacity
    }

    /// Number of episode slots.
    pub fn max_episodes(&self) -> usize {
        self.max_episodes
    }

    /// Configuration of the buffer.
    pub fn config(&self) -> &EpisodicReplayBufferConfig {
        &self.config
    }
}

impl ExperienceBufferBase for EpisodicReplayBuffer {
    type Item = Transition;

    fn len(&self) -> usize {
        self.size
    }

    /// Appends the transition, closing the episode if `tr.episode_done` is `true`.
    fn push(&mut self, tr: Self::Item) -> Result<()> {
        self.append(
            &tr.state,
            &tr.action,
            tr.reward,
            tr.done,
            &tr.next_state,
            tr.episode_done,
        )
    }
}

impl ReplayBufferBase for EpisodicReplayBuffer {
    type Config = EpisodicReplayBufferConfig;
    type Batch = EpisodicBatch;

    fn build(config: &Self::Config) -> Result<Self> {
        Ok(Self::new(config)?)
    }

    fn batch(&mut self, size: usize) -> Result<Self::Batch> {
        self.sample(size)
    }
}
