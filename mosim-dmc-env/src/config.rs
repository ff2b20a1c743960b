//! Configuration of [`DmcEnv`](crate::DmcEnv).
use crate::{DmcActFilter, DmcObsFilter};
use anyhow::Result;
use mosim_core::{Act, Obs};
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    marker::PhantomData,
    path::Path,
};

#[derive(Serialize, Deserialize, Debug)]
#[serde(bound = "")]
/// Configuration of [`DmcEnv`](crate::DmcEnv).
pub struct DmcEnvConfig<O, A, OF, AF>
where
    O: Obs,
    A: Act,
    OF: DmcObsFilter<O>,
    AF: DmcActFilter<A>,
{
    /// Task name of the form `<domain>_<task>`.
    pub name: String,

    /// Number of times an action is applied at every step.
    pub action_repeat: usize,

    /// `(height, width)` of rendered images.
    pub size: (usize, usize),

    /// Camera for rendering. If `None`, it depends on the domain.
    pub camera: Option<i64>,

    /// Episodes are truncated after this number of steps.
    pub max_steps: Option<usize>,

    /// Rendering backend of MuJoCo, exported as `MUJOCO_GL` before loading a task.
    ///
    /// Python reads the environment once when it starts and `dm_control` reads
    /// `MUJOCO_GL` when imported, so only the value set before the first task is
    /// loaded in the process takes effect.
    pub mujoco_gl: Option<String>,

    /// Configuration of the observation filter. If `None`, the default is used.
    pub obs_filter_config: Option<OF::Config>,

    /// Configuration of the action filter. If `None`, the default is used.
    pub act_filter_config: Option<AF::Config>,

    #[serde(skip)]
    phantom: PhantomData<(O, A)>,
}

impl<O, A, OF, AF> Clone for DmcEnvConfig<O, A, OF, AF>
where
    O: Obs,
    A: Act,
    OF: DmcObsFilter<O>,
    AF: DmcActFilter<A>,
{
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            action_repeat: self.action_repeat,
            size: self.size,
            camera: self.camera,
            max_steps: self.max_steps,
            mujoco_gl: self.mujoco_gl.clone(),
            obs_filter_config: self.obs_filter_config.clone(),
            act_filter_config: self.act_filter_config.clone(),
            phantom: PhantomData,
        }
    }
}

impl<O, A, OF, AF> Default for DmcEnvConfig<O, A, OF, AF>
where
    O: Obs,
    A: Act,
    OF: DmcObsFilter<O>,
    AF: DmcActFilter<A>,
{
    fn default() -> Self {
        Self {
            name: "".to_string(),
            action_repeat: 1,
            size: (64, 64),
            camera: None,
            max_steps: None,
            mujoco_gl: None,
            obs_filter_config: None,
            act_filter_config: None,
            phantom: PhantomData,
        }
    }
}

impl<O, A, OF, AF> DmcEnvConfig<O, A, OF, AF>
where
    O: Obs,
    A: Act,
    OF: DmcObsFilter<O>,
    AF: DmcActFilter<A>,
{
    /// Set the name of the task, e.g., `walker_walk`.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the number of action repeats.
    pub fn action_repeat(mut self, v: usize) -> Self {
        self.action_repeat = v;
        self
    }

    /// Set `(height, width)` of rendered images.
    pub fn size(mut self, height: usize, width: usize) -> Self {
        self.size = (height, width);
        self
    }

    /// Set the camera for rendering.
    pub fn camera(mut self, v: Option<i64>) -> Self {
        self.camera = v;
        self
    }

    /// Set the maximum number of steps in an episode.
    pub fn max_steps(mut self, v: Option<usize>) -> Self {
        self.max_steps = v;
        self
    }

    /// Set the rendering backend of MuJoCo, e.g., `egl` or `osmesa`.
    pub fn mujoco_gl(mut self, v: Option<String>) -> Self {
        self.mujoco_gl = v;
        self
    }

    /// Set the observation filter config.
    pub fn obs_filter_config(mut self, obs_filter_config: OF::Config) -> Self {
        self.obs_filter_config = Some(obs_filter_config);
        self
    }

    /// Set the action filter config.
    pub fn act_filter_config(mut self, act_filter_config: AF::Config) -> Self {
        self.act_filter_config = Some(act_filter_config);
        self
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
