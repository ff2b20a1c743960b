//! Conversion of environment steps into [`Transition`]s.
use super::Transition;
use crate::{Env, Step, StepProcessor};
use anyhow::{anyhow, Result};
use std::{default::Default, marker::PhantomData};

/// Configuration of [`EpisodicStepProcessor`].
#[derive(Clone, Debug, Default)]
pub struct EpisodicStepProcessorConfig {}

/// Converts [`Step`]s of a non-vectorized environment into [`Transition`]s.
///
/// `done` of the transition is the termination flag of the step, while
/// `episode_done` is set when the episode either terminated or was truncated.
pub struct EpisodicStepProcessor<E: Env> {
    prev_obs: Option<Vec<f32>>,
    phantom: PhantomData<E>,
}

impl<E> StepProcessor<E> for EpisodicStepProcessor<E>
where
    E: Env,
    E::Obs: Into<Vec<f32>>,
    E::Act: Into<Vec<f32>>,
{
    type Config = EpisodicStepProcessorConfig;
    type Output = Transition;

    fn build(_config: &Self::Config) -> Self {
        Self {
            prev_obs: None,
            phantom: PhantomData,
        }
    }

    fn reset(&mut self, init_obs: E::Obs) {
        self.prev_obs = Some(init_obs.into());
    }

    /// Fails if [`StepProcessor::reset`] has not been called, or if the episode
    /// ended and the step does not carry the first observation of the next one.
    fn process(&mut self, step: Step<E>) -> Result<Transition> {
        let is_done = step.is_done();
        if is_done && step.init_obs.is_none() {
            return Err(anyhow!("Episode ended but init_obs is not set"));
        }
        let state = self
            .prev_obs
            .take()
            .ok_or_else(|| anyhow!("prev_obs is not set. Forgot to call reset()?"))?;

        let next_state: Vec<f32> = step.obs.into();
        self.prev_obs = match step.init_obs {
            Some(init_obs) if is_done => Some(init_obs.into()),
            _ => Some(next_state.clone()),
        };

        Ok(Transition {
            state,
            action: step.act.into(),
            reward: step.reward,
            next_state,
            done: step.is_terminated,
            episode_done: is_done,
        })
    }
}
