//! A wrapper of [DeepMind Control Suite](https://github.com/deepmind/dm_control) tasks on Python.
//!
//! [`DmcEnv`] loads a task with `dm_control.suite.load()` through [`PyO3`](https://github.com/PyO3/pyo3)
//! and exposes it as a [`mosim_core::Env`]. Tasks are named `<domain>_<task>`,
//! e.g., `walker_walk` or `cup_catch` (the `cup` domain stands for `ball_in_cup`).
//!
//! ## Observation
//!
//! A time step of the control suite carries a dict of arrays. [`DmcObsFilter`] converts
//! a [`TimeStep`] into the observation type `O` of the environment. The built-in
//! [`KeyObsFilter`] keeps the entries listed in its configuration (`position`, `velocity`
//! and `height` by default) and adds the flags `is_first` and `is_terminal` to build a
//! [`DmcObs`].
//!
//! ## Action
//!
//! [`DmcActFilter`] converts an action of type `A` into an [`ndarray::ArrayD`], which is
//! passed to the control suite. The built-in [`ContinuousActFilter`] accepts any
//! `A: Into<ArrayD<f32>>`, e.g., [`DmcAct`]. Actions are repeated `action_repeat` times
//! at every step and the rewards are summed up.
//!
//! ## Testing without Python
//!
//! The simulator is accessed through [`ControlSuite`]. [`PyControlSuite`] is the
//! implementation backed by `dm_control`; [`DmcEnv`] takes the suite as its last type
//! parameter, so other implementations can be plugged in.
mod act;
mod base;
mod config;
mod error;
mod obs;
mod py_suite;
mod space;
mod suite;
pub mod util;
pub use act::{ContinuousActFilter, ContinuousActFilterConfig, DmcAct};
pub use base::{DmcActFilter, DmcEnv, DmcInfo, DmcObsFilter};
pub use config::DmcEnvConfig;
pub use error::DmcEnvError;
pub use obs::{DmcObs, KeyObsFilter, KeyObsFilterConfig};
pub use py_suite::PyControlSuite;
pub use space::BoxSpace;
pub use suite::{default_camera, parse_task_name, ControlSuite, StepType, TimeStep};
