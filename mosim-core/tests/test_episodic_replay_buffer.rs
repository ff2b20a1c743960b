use anyhow::Result;
use mosim_core::{
    error::MosimError,
    record::Record,
    replay_buffer::{
        EpisodicReplayBuffer, EpisodicReplayBufferConfig, EpisodicStepProcessor,
        EpisodicStepProcessorConfig,
    },
    Act, Env, ExperienceBufferBase, Obs, ReplayBufferBase, Step, StepProcessor,
};
use tempdir::TempDir;

#[derive(Clone, Debug)]
struct LineObs(f32);

impl Obs for LineObs {}

impl From<LineObs> for Vec<f32> {
    fn from(obs: LineObs) -> Self {
        vec![obs.0]
    }
}

#[derive(Clone, Debug)]
struct LineAct(f32);

impl Act for LineAct {}

impl From<LineAct> for Vec<f32> {
    fn from(act: LineAct) -> Self {
        vec![act.0]
    }
}

#[derive(Clone)]
struct LineEnvConfig {
    goal: f32,
    time_limit: usize,
}

/// A point moving on a line. The episode terminates at `goal` and is truncated
/// after `time_limit` steps.
struct LineEnv {
    config: LineEnvConfig,
    pos: f32,
    t: usize,
}

impl Env for LineEnv {
    type Config = LineEnvConfig;
    type Obs = LineObs;
    type Act = LineAct;
    type Info = ();

    fn build(config: &Self::Config, _seed: i64) -> Result<Self> {
        Ok(Self {
            config: config.clone(),
            pos: 0.0,
            t: 0,
        })
    }

    fn step(&mut self, a: &Self::Act) -> Result<(Step<Self>, Record)> {
        self.pos += a.0;
        self.t += 1;
        let is_terminated = self.pos >= self.config.goal;
        let is_truncated = !is_terminated && self.t >= self.config.time_limit;
        let reward = if is_terminated { 1.0 } else { 0.0 };
        let step = Step::new(
            LineObs(self.pos),
            a.clone(),
            reward,
            is_terminated,
            is_truncated,
            (),
        );
        Ok((step, Record::from_scalar("reward", reward)))
    }

    fn reset(&mut self) -> Result<Self::Obs> {
        self.pos = 0.0;
        self.t = 0;
        Ok(LineObs(self.pos))
    }

    fn reset_with_index(&mut self, _ix: usize) -> Result<Self::Obs> {
        self.reset()
    }
}

fn buffer_config() -> EpisodicReplayBufferConfig {
    EpisodicReplayBufferConfig::default()
        .capacity(40)
        .max_episode_len(10)
        .state_dim(1)
        .action_dim(1)
        .seed(3)
}

fn collect(
    env: &mut LineEnv,
    buffer: &mut EpisodicReplayBuffer,
    act: f32,
    n_steps: usize,
) -> Result<()> {
    let mut step_proc =
        EpisodicStepProcessor::<LineEnv>::build(&EpisodicStepProcessorConfig::default());
    step_proc.reset(env.reset()?);
    for _ in 0..n_steps {
        let (step, _) = env.step_with_reset(&LineAct(act))?;
        buffer.push(step_proc.process(step)?)?;
    }
    Ok(())
}

#[test]
fn test_step_processor_terminated_episodes() -> Result<()> {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut env = LineEnv::build(
        &LineEnvConfig {
            goal: 3.0,
            time_limit: 100,
        },
        0,
    )?;
    let mut buffer = EpisodicReplayBuffer::build(&buffer_config())?;

    // Every episode terminates after 3 steps.
    collect(&mut env, &mut buffer, 1.0, 7)?;
    assert_eq!(buffer.episode_lens(), &[3, 3, 1, 0]);
    assert_eq!(buffer.len(), 7);

    let batch = buffer.batch(64)?;
    for i in 0..batch.len() {
        let (_, t) = batch.ix_sample[i];
        assert_eq!(batch.obs[[i, 0]], t as f32);
        assert_eq!(batch.next_obs[[i, 0]], (t + 1) as f32);
        let terminal = t == 2;
        assert_eq!(batch.done[i] == 1, terminal);
        assert_eq!(batch.reward[i], if terminal { 1.0 } else { 0.0 });
    }
    Ok(())
}

#[test]
fn test_step_processor_truncated_episodes() -> Result<()> {
    let mut env = LineEnv::build(
        &LineEnvConfig {
            goal: f32::INFINITY,
            time_limit: 4,
        },
        0,
    )?;
    let mut buffer = EpisodicReplayBuffer::build(&buffer_config())?;

    collect(&mut env, &mut buffer, 0.5, 8)?;
    assert_eq!(buffer.episode_lens(), &[4, 4, 0, 0]);
    assert_eq!(buffer.num_episodes(), 3);

    // Truncation closes episodes but is not a natural termination.
    let batch = buffer.batch(32)?;
    assert!(batch.done.iter().all(|&d| d == 0));
    Ok(())
}

#[test]
fn test_step_processor_without_reset() -> Result<()> {
    let mut env = LineEnv::build(
        &LineEnvConfig {
            goal: 3.0,
            time_limit: 100,
        },
        0,
    )?;
    let mut step_proc =
        EpisodicStepProcessor::<LineEnv>::build(&EpisodicStepProcessorConfig::default());
    let (step, _) = env.step(&LineAct(1.0))?;
    assert!(step_proc.process(step).is_err());
    Ok(())
}

#[test]
fn test_save_and_load() -> Result<()> {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut env = LineEnv::build(
        &LineEnvConfig {
            goal: 3.0,
            time_limit: 100,
        },
        0,
    )?;
    let config = buffer_config();
    let mut buffer = EpisodicReplayBuffer::build(&config)?;
    collect(&mut env, &mut buffer, 1.0, 20)?;

    let dir = TempDir::new("episodic_replay_buffer")?;
    let path = dir.path().join("nested").join("buffer.bin");
    buffer.save(&path)?;

    let mut loaded = EpisodicReplayBuffer::load(&path, &config)?;
    assert_eq!(loaded.len(), buffer.len());
    assert_eq!(loaded.num_episodes(), buffer.num_episodes());
    assert_eq!(loaded.episode_lens(), buffer.episode_lens());
    assert_eq!(loaded.last_episode_len(), buffer.last_episode_len());

    // Same seed, same content: identical batches.
    let b1 = buffer.batch(16)?;
    let b2 = loaded.batch(16)?;
    assert_eq!(b1.ix_sample, b2.ix_sample);
    assert_eq!(b1.obs, b2.obs);
    assert_eq!(b1.next_obs, b2.next_obs);
    Ok(())
}

#[test]
fn test_load_with_mismatched_config() -> Result<()> {
    let config = buffer_config();
    let buffer = EpisodicReplayBuffer::build(&config)?;
    let dir = TempDir::new("episodic_replay_buffer")?;
    let path = dir.path().join("buffer.bin");
    buffer.save(&path)?;

    let err = EpisodicReplayBuffer::load(&path, &config.clone().state_dim(2))
        .err()
        .unwrap();
    assert!(matches!(
        err.downcast_ref::<MosimError>(),
        Some(MosimError::SnapshotMismatch(_))
    ));
    Ok(())
}

#[test]
fn test_random_episode_lengths() -> Result<()> {
    fastrand::seed(42);
    let mut env = LineEnv::build(
        &LineEnvConfig {
            goal: 3.0,
            time_limit: 10,
        },
        0,
    )?;
    let mut buffer = EpisodicReplayBuffer::build(&buffer_config())?;
    let mut step_proc =
        EpisodicStepProcessor::<LineEnv>::build(&EpisodicStepProcessorConfig::default());
    step_proc.reset(env.reset()?);

    for _ in 0..200 {
        let (step, _) = env.step_with_reset(&LineAct(fastrand::f32()))?;
        buffer.push(step_proc.process(step)?)?;

        assert_eq!(buffer.len(), buffer.episode_lens().iter().sum::<usize>());
        assert!(buffer.len() <= buffer.capacity());
        assert!(buffer.num_episodes() <= buffer.max_episodes());
    }

    let batch = buffer.batch(128)?;
    for &(e, t) in batch.ix_sample.iter() {
        assert!(t < buffer.episode_lens()[e]);
    }
    Ok(())
}

#[test]
fn test_step_processor_keeps_state_on_error() -> Result<()> {
    let mut env = LineEnv::build(
        &LineEnvConfig {
            goal: 3.0,
            time_limit: 100,
        },
        0,
    )?;
    let mut step_proc =
        EpisodicStepProcessor::<LineEnv>::build(&EpisodicStepProcessorConfig::default());
    step_proc.reset(env.reset()?);

    // The episode ends, but `step` does not attach the next initial observation.
    let (step, _) = env.step(&LineAct(3.0))?;
    assert!(step.is_done());
    assert!(step_proc.process(step).is_err());

    let step = Step::new(LineObs(0.5), LineAct(0.5), 0.0, false, false, ());
    let tr = step_proc.process(step)?;
    assert_eq!(tr.state, vec![0.0]);
    assert_eq!(tr.next_state, vec![0.5]);
    Ok(())
}
