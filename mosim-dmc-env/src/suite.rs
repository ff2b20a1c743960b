//! Interface to the control suite.
use crate::{BoxSpace, DmcEnvError};
use anyhow::Result;
use ndarray::{Array3, ArrayD};

/// Position of a [`TimeStep`] in an episode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepType {
    /// Returned by `reset`.
    First,
    /// Any step in the middle of an episode.
    Mid,
    /// The last step of an episode.
    Last,
}

/// A time step emitted by the control suite.
#[derive(Debug, Clone)]
pub struct TimeStep {
    /// Position in the episode.
    pub step_type: StepType,

    /// Reward, `None` at the first step.
    pub reward: Option<f32>,

    /// Discount, `None` at the first step. It is 0 when the episode terminated.
    pub discount: Option<f32>,

    /// Observation entries, in the order given by the suite.
    pub observation: Vec<(String, ArrayD<f32>)>,
}

impl TimeStep {
    /// `true` at the first step of an episode.
    pub fn first(&self) -> bool {
        self.step_type == StepType::First
    }

    /// `true` at the last step of an episode.
    pub fn last(&self) -> bool {
        self.step_type == StepType::Last
    }

    /// `true` if the episode ended with a zero discount.
    pub fn is_terminal(&self) -> bool {
        !self.first() && self.discount == Some(0.0)
    }

    /// Returns the observation entry of the given key.
    pub fn get(&self, key: &str) -> Option<&ArrayD<f32>> {
        self.observation
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }
}

/// A physics-based control task.
pub trait ControlSuite {
    /// Loads `task` of `domain`, seeding the task's random state with `seed`.
    fn load(domain: &str, task: &str, seed: i64) -> Result<Self>
    where
        Self: Sized;

    /// Starts a new episode.
    fn reset(&mut self) -> Result<TimeStep>;

    /// Advances the simulation by one control step.
    fn step(&mut self, action: &ArrayD<f32>) -> Result<TimeStep>;

    /// Keys and shapes of observation entries.
    fn observation_spec(&self) -> Result<Vec<(String, Vec<usize>)>>;

    /// Bounds of actions.
    fn action_spec(&self) -> Result<BoxSpace>;

    /// Renders the scene from the given camera into an RGB image of shape `(height, width, 3)`.
    fn render(&self, height: usize, width: usize, camera_id: i64) -> Result<Array3<u8>>;

    /// Overwrites joint positions and velocities and runs the after-reset hook of the physics.
    fn set_state(&mut self, position: &[f64], velocity: &[f64]) -> Result<()>;
}

/// Splits `<domain>_<task>` at the first underscore.
///
/// `cup` is the only domain whose name has multiple words and is mapped to `ball_in_cup`.
///
/// ```
/// use mosim_dmc_env::parse_task_name;
///
/// assert_eq!(
///     parse_task_name("walker_walk").unwrap(),
///     ("walker".to_string(), "walk".to_string())
/// );
/// assert_eq!(
///     parse_task_name("cup_catch").unwrap(),
///     ("ball_in_cup".to_string(), "catch".to_string())
/// );
/// ```
pub fn parse_task_name(name: &str) -> Result<(String, String), DmcEnvError> {
    match name.split_once('_') {
        Some((domain, task)) if !domain.is_empty() && !task.is_empty() => {
            let domain = match domain {
                "cup" => "ball_in_cup",
                d => d,
            };
            Ok((domain.to_string(), task.to_string()))
        }
        _ => Err(DmcEnvError::InvalidTaskName(name.to_string())),
    }
}

/// Camera used for rendering when none is configured.
pub fn default_camera(domain: &str) -> i64 {
    match domain {
        "quadruped" => 2,
        _ => 0,
    }
}
