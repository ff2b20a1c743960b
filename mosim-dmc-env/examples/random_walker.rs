//! Runs a random policy on `walker_walk`, fills a replay buffer and saves it.
//!
//! Requires `dm_control` and MuJoCo in the Python environment.
use anyhow::Result;
use mosim_core::{
    replay_buffer::{
        EpisodicReplayBuffer, EpisodicReplayBufferConfig, EpisodicStepProcessor,
        EpisodicStepProcessorConfig,
    },
    Env as _, ExperienceBufferBase, ReplayBufferBase, StepProcessor,
};
use mosim_dmc_env::{
    util::save_frame, ContinuousActFilter, DmcAct, DmcEnv, DmcEnvConfig, DmcObs, KeyObsFilter,
};

type ObsFilter = KeyObsFilter<DmcObs>;
type ActFilter = ContinuousActFilter<DmcAct>;
type EnvConfig = DmcEnvConfig<DmcObs, DmcAct, ObsFilter, ActFilter>;
type Env = DmcEnv<DmcObs, DmcAct, ObsFilter, ActFilter>;

const N_EPISODES: usize = 3;
const MAX_STEPS: usize = 250;
const ACTION_REPEAT: usize = 2;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    fastrand::seed(42);

    let env_config = EnvConfig::default()
        .name("walker_walk")
        .action_repeat(ACTION_REPEAT)
        .max_steps(Some(MAX_STEPS))
        .mujoco_gl(Some("egl".to_string()));
    let mut env = Env::build(&env_config, 42)?;

    let state_dim = env
        .observation_space()?
        .iter()
        .filter(|(key, _)| ["position", "velocity", "height"].contains(&key.as_str()))
        .map(|(_, space)| space.len())
        .sum();
    let action_space = env.action_space()?;
    log::info!("state_dim = {}, action_dim = {}", state_dim, action_space.len());

    let buffer_config = EpisodicReplayBufferConfig::default()
        .capacity(N_EPISODES * MAX_STEPS)
        .max_episode_len(MAX_STEPS)
        .state_dim(state_dim)
        .action_dim(action_space.len());
    let mut buffer = EpisodicReplayBuffer::build(&buffer_config)?;
    let mut step_proc = EpisodicStepProcessor::<Env>::build(&EpisodicStepProcessorConfig::default());

    step_proc.reset(env.reset()?);
    std::fs::create_dir_all("random_walker")?;
    save_frame(&env.render("rgb_array")?, "random_walker/first_frame.png")?;

    let mut episode = 0;
    let mut episode_return = 0.0;
    while episode < N_EPISODES {
        let act: DmcAct = action_space
            .low
            .iter()
            .zip(action_space.high.iter())
            .map(|(lo, hi)| lo + (hi - lo) * fastrand::f32())
            .collect::<Vec<_>>()
            .into();
        let (step, _) = env.step_with_reset(&act)?;
        episode_return += step.reward;
        let is_done = step.is_done();
        buffer.push(step_proc.process(step)?)?;

        if is_done {
            log::info!("Episode {}: return = {}", episode, episode_return);
            episode += 1;
            episode_return = 0.0;
        }
    }

    let batch = buffer.batch(32)?;
    log::info!(
        "Sampled {} transitions from {} stored ones, action std = {:?}",
        batch.len(),
        buffer.len(),
        buffer.action_std()
    );
    buffer.save("random_walker/buffer.bin")?;

    Ok(())
}
