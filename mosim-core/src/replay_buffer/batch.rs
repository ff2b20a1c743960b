//! Transitions pushed into and batches sampled from the buffer.
use ndarray::Array2;

/// A transition `(s_t, a_t, r_t, s_t+1)` with episode flags.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    /// State.
    pub state: Vec<f32>,

    /// Action.
    pub action: Vec<f32>,

    /// Reward.
    pub reward: f32,

    /// Next state.
    pub next_state: Vec<f32>,

    /// `true` only if the episode ended naturally.
    pub done: bool,

    /// `true` if the episode ended for any reason, including a time limit.
    pub episode_done: bool,
}

impl Transition {
    /// Constructs a transition.
    pub fn new(
        state: Vec<f32>,
        action: Vec<f32>,
        reward: f32,
        next_state: Vec<f32>,
        done: bool,
        episode_done: bool,
    ) -> Self {
        Self {
            state,
            action,
            reward,
            next_state,
            done,
            episode_done,
        }
    }
}

/// A batch of transitions sampled from
/// [`EpisodicReplayBuffer`](super::EpisodicReplayBuffer).
#[derive(Debug, Clone)]
pub struct EpisodicBatch {
    /// States, `(batch_size, state_dim)`.
    pub obs: Array2<f32>,

    /// Actions, `(batch_size, action_dim)`.
    pub act: Array2<f32>,

    /// Rewards.
    pub reward: Vec<f32>,

    /// Natural-termination flags.
    pub done: Vec<i8>,

    /// Next states, `(batch_size, state_dim)`.
    pub next_obs: Array2<f32>,

    /// `(episode slot, step)` of every sample.
    pub ix_sample: Vec<(usize, usize)>,
}

impl EpisodicBatch {
    /// Number of samples in the batch.
    pub fn len(&self) -> usize {
        self.reward.len()
    }

    /// Returns `true` if the batch has no sample.
    pub fn is_empty(&self) -> bool {
        self.reward.is_empty()
    }

    /// Unpacks the batch into `(obs, act, reward, done, next_obs)`.
    pub fn unpack(self) -> (Array2<f32>, Array2<f32>, Vec<f32>, Vec<i8>, Array2<f32>) {
        (self.obs, self.act, self.reward, self.done, self.next_obs)
    }
}
