//! Wrapper of control suite tasks.
use crate::{
    default_camera, parse_task_name, BoxSpace, ControlSuite, DmcEnvConfig, DmcEnvError,
    PyControlSuite, TimeStep,
};
use anyhow::Result;
use log::{info, trace, warn};
use mosim_core::{record::Record, Act, Env, Info, Obs, Step};
use ndarray::{Array3, ArrayD};
use serde::{de::DeserializeOwned, Serialize};
use std::{fmt::Debug, marker::PhantomData};

/// Information given at every step of the interaction with the environment.
#[derive(Debug, Clone, PartialEq)]
pub struct DmcInfo {
    /// Discount of the last time step, `None` at the first step.
    pub discount: Option<f32>,
}

impl Info for DmcInfo {}

/// Convert [`TimeStep`] to [`DmcEnv`]`::Obs` with a preprocessing.
pub trait DmcObsFilter<O: Obs> {
    /// Configuration.
    type Config: Clone + Debug + Default + Serialize + DeserializeOwned;

    /// Build filter.
    fn build(config: &Self::Config) -> Result<Self>
    where
        Self: Sized;

    /// Convert a time step into an observation with filtering.
    fn filt(&mut self, ts: &TimeStep) -> (O, Record);

    /// Called when resetting the environment.
    ///
    /// This method is useful for stateful filters.
    fn reset(&mut self, ts: &TimeStep) -> O {
        let (obs, _) = self.filt(ts);
        obs
    }

    /// Returns default configuration.
    fn default_config() -> Self::Config {
        Self::Config::default()
    }
}

/// Convert [`DmcEnv`]`::Act` to an array passed to the control suite.
pub trait DmcActFilter<A: Act> {
    /// Configuration.
    type Config: Clone + Debug + Default + Serialize + DeserializeOwned;

    /// Build filter.
    fn build(config: &Self::Config) -> Result<Self>
    where
        Self: Sized;

    /// Filter action and convert it to an array.
    fn filt(&mut self, act: A) -> (ArrayD<f32>, Record);

    /// Called when resetting the environment.
    ///
    /// This method is useful for stateful filters.
    fn reset(&mut self) {}

    /// Returns default configuration.
    fn default_config() -> Self::Config {
        Self::Config::default()
    }
}

/// A task of the DeepMind Control Suite.
///
/// `S` is the simulator backend, [`PyControlSuite`] by default.
#[derive(Debug)]
pub struct DmcEnv<O, A, OF, AF, S = PyControlSuite>
where
    O: Obs,
    A: Act,
    OF: DmcObsFilter<O>,
    AF: DmcActFilter<A>,
    S: ControlSuite,
{
    suite: S,

    domain: String,

    task: String,

    action_repeat: usize,

    /// `(height, width)` of rendered images.
    size: (usize, usize),

    camera: i64,

    count_steps: usize,

    max_steps: Option<usize>,

    obs_filter: OF,

    act_filter: AF,

    phantom: PhantomData<(O, A)>,
}

impl<O, A, OF, AF, S> DmcEnv<O, A, OF, AF, S>
where
    O: Obs,
    A: Act,
    OF: DmcObsFilter<O>,
    AF: DmcActFilter<A>,
    S: ControlSuite,
{
    /// Observation space. Every entry of the task is unbounded; scalar entries have shape `[1]`.
    pub fn observation_space(&self) -> Result<Vec<(String, BoxSpace)>> {
        Ok(self
            .suite
            .observation_spec()?
            .into_iter()
            .map(|(key, shape)| {
                let shape = if shape.is_empty() { vec![1] } else { shape };
                (key, BoxSpace::unbounded(shape))
            })
            .collect())
    }

    /// Action space given by the bounds of the task.
    pub fn action_space(&self) -> Result<BoxSpace> {
        self.suite.action_spec()
    }

    /// Range of rewards at a step.
    pub fn reward_range(&self) -> (f32, f32) {
        (f32::NEG_INFINITY, f32::INFINITY)
    }

    /// Renders the scene with the configured size and camera.
    ///
    /// `mode` must be `"rgb_array"`. The returned image has shape `(height, width, 3)`.
    pub fn render(&self, mode: &str) -> Result<Array3<u8>> {
        if mode != "rgb_array" {
            return Err(DmcEnvError::UnsupportedRenderMode(mode.to_string()).into());
        }
        let (height, width) = self.size;
        self.suite.render(height, width, self.camera)
    }

    /// Overwrites joint positions and velocities and returns the rendered scene.
    ///
    /// The observation filter is not involved; the next [`Env::step`] observes the new state.
    pub fn reset_state(&mut self, position: &[f64], velocity: &[f64]) -> Result<Array3<u8>> {
        self.suite.set_state(position, velocity)?;
        self.render("rgb_array")
    }

    /// Domain of the task, e.g., `walker`.
    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Name of the task in the domain, e.g., `walk`.
    pub fn task(&self) -> &str {
        &self.task
    }

    /// Camera used for rendering.
    pub fn camera(&self) -> i64 {
        self.camera
    }

    /// The underlying control suite.
    pub fn suite(&self) -> &S {
        &self.suite
    }
}

impl<O, A, OF, AF, S> Env for DmcEnv<O, A, OF, AF, S>
where
    O: Obs,
    A: Act,
    OF: DmcObsFilter<O>,
    AF: DmcActFilter<A>,
    S: ControlSuite,
{
    type Obs = O;
    type Act = A;
    type Info = DmcInfo;
    type Config = DmcEnvConfig<O, A, OF, AF>;

    /// Loads the task given by `config.name`.
    ///
    /// * `seed` - Seed of the random state of the task.
    fn build(config: &Self::Config, seed: i64) -> Result<Self> {
        let (domain, task) = parse_task_name(&config.name)?;
        if config.action_repeat == 0 {
            return Err(DmcEnvError::InvalidActionRepeat.into());
        }
        if let Some(mujoco_gl) = &config.mujoco_gl {
            match std::env::var("MUJOCO_GL") {
                Ok(current) if &current != mujoco_gl => warn!(
                    "Overriding MUJOCO_GL={} with {}, ignored if Python is already running",
                    current, mujoco_gl
                ),
                _ => {}
            }
            std::env::set_var("MUJOCO_GL", mujoco_gl);
        }

        let suite = S::load(&domain, &task, seed)?;
        let camera = config.camera.unwrap_or_else(|| default_camera(&domain));
        info!(
            "Loaded {}/{} (seed = {}, action_repeat = {}, camera = {})",
            domain, task, seed, config.action_repeat, camera
        );

        let obs_filter_config = config
            .obs_filter_config
            .clone()
            .unwrap_or_else(OF::default_config);
        let act_filter_config = config
            .act_filter_config
            .clone()
            .unwrap_or_else(AF::default_config);

        Ok(DmcEnv {
            suite,
            domain,
            task,
            action_repeat: config.action_repeat,
            size: config.size,
            camera,
            count_steps: 0,
            max_steps: config.max_steps,
            obs_filter: OF::build(&obs_filter_config)?,
            act_filter: AF::build(&act_filter_config)?,
            phantom: PhantomData,
        })
    }

    /// Applies the action `action_repeat` times, or until the episode ends.
    ///
    /// The reward is the sum of the rewards of these steps. The episode is reported
    /// as terminated if it ended with a zero discount and as truncated if it ended
    /// otherwise or `max_steps` was reached.
    fn step(&mut self, a: &A) -> Result<(Step<Self>, Record)> {
        trace!("DmcEnv::step()");

        let (act, record_a) = self.act_filter.filt(a.clone());
        if !act.iter().all(|x| x.is_finite()) {
            return Err(DmcEnvError::NonFiniteAction(act.iter().cloned().collect()).into());
        }

        let mut reward = 0f32;
        let mut ts = self.suite.step(&act)?;
        reward += ts.reward.unwrap_or(0.0);
        for _ in 1..self.action_repeat {
            if ts.last() {
                break;
            }
            ts = self.suite.step(&act)?;
            reward += ts.reward.unwrap_or(0.0);
        }

        let (obs, record_o) = self.obs_filter.filt(&ts);
        let is_terminated = ts.last() && ts.is_terminal();
        self.count_steps += 1;
        let time_limit = match self.max_steps {
            Some(max_steps) => self.count_steps >= max_steps,
            None => false,
        };
        let is_truncated = !is_terminated && (ts.last() || time_limit);

        let info = DmcInfo {
            discount: ts.discount,
        };
        let record = record_o
            .merge(record_a)
            .merge(Record::from_scalar("reward", reward));

        Ok((
            Step::new(obs, a.clone(), reward, is_terminated, is_truncated, info),
            record,
        ))
    }

    /// Resets the environment and returns the first observation of an episode.
    ///
    /// This method also resets the [`DmcObsFilter`] and [`DmcActFilter`].
    fn reset(&mut self) -> Result<O> {
        trace!("DmcEnv::reset()");
        self.act_filter.reset();
        self.count_steps = 0;
        let ts = self.suite.reset()?;
        Ok(self.obs_filter.reset(&ts))
    }

    /// Reloads the task with `ix` as the seed and resets it.
    fn reset_with_index(&mut self, ix: usize) -> Result<O> {
        self.suite = S::load(&self.domain, &self.task, ix as i64)?;
        self.reset()
    }
}
