use anyhow::Result;
use deepq_core::{
    checkpoint::Checkpoints,
    record::{BufferedRecorder, NullRecorder, RecordValue},
    replay_buffer::ReplayBufferConfig,
    Env, EpisodePhase, ExplorationConfig, ObsComposer, QFunction, Step, TrainingConfig,
    TrainingLoop,
};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};
use tempdir::TempDir;

const NUM_ACTIONS: usize = 3;

/// Emits frames counting steps. The `i`-th episode gives `rewards[i % len]`
/// at every step and terminates after `episode_len` steps.
struct CountingEnv {
    rewards: Vec<f32>,
    episode_len: usize,
    n_episodes: usize,
    t: usize,
}

impl CountingEnv {
    fn new(rewards: Vec<f32>, episode_len: usize) -> Self {
        Self {
            rewards,
            episode_len,
            n_episodes: 0,
            t: 0,
        }
    }
}

impl Env for CountingEnv {
    type Frame = f32;

    fn init(&mut self) -> Result<()> {
        self.t = 0;
        self.n_episodes += 1;
        Ok(())
    }

    fn state(&self) -> Result<f32> {
        Ok(self.t as f32)
    }

    fn step(&mut self, act: usize) -> Result<Step<f32>> {
        assert!(act < NUM_ACTIONS);
        self.t += 1;
        let reward = self.rewards[(self.n_episodes - 1) % self.rewards.len()];
        Ok(Step::new(self.t as f32, reward, self.t >= self.episode_len))
    }
}

struct Concat;

impl ObsComposer<f32> for Concat {
    type Obs = Vec<f32>;

    fn compose(&self, frames: &[&f32]) -> Result<Vec<f32>> {
        Ok(frames.iter().map(|&&f| f).collect())
    }
}

/// Action values independent of the observation; each optimization step
/// moves the value of every taken action by one.
#[derive(Debug, Clone, PartialEq)]
struct StubQ {
    weights: Vec<f32>,
    n_train: usize,
}

impl StubQ {
    fn new(weights: Vec<f32>) -> Self {
        Self {
            weights,
            n_train: 0,
        }
    }
}

impl QFunction<Vec<f32>> for StubQ {
    type Params = Vec<f32>;

    fn predict(&self, obs: &[Vec<f32>]) -> Result<Vec<Vec<f32>>> {
        Ok(obs.iter().map(|_| self.weights.clone()).collect())
    }

    fn train_batch(&mut self, obs: &[Vec<f32>], act: &[usize], tgt: &[f32]) -> Result<f32> {
        assert_eq!(obs.len(), act.len());
        assert_eq!(obs.len(), tgt.len());
        self.n_train += 1;
        act.iter().for_each(|&a| self.weights[a] += 1.0);
        Ok(tgt.iter().sum::<f32>() / tgt.len() as f32)
    }

    fn params(&self) -> Result<Vec<f32>> {
        Ok(self.weights.clone())
    }

    fn set_params(&mut self, params: &Vec<f32>) -> Result<()> {
        self.weights = params.clone();
        Ok(())
    }

    fn save(&self, path: &Path) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self.weights)?.as_bytes())?;
        Ok(())
    }

    fn load(&mut self, path: &Path) -> Result<()> {
        let rdr = BufReader::new(File::open(path)?);
        self.weights = serde_yaml::from_reader(rdr)?;
        Ok(())
    }
}

type StubLoop = TrainingLoop<CountingEnv, Concat, StubQ>;

fn config() -> TrainingConfig {
    TrainingConfig::default()
        .batch_size(3)
        .max_steps_per_episode(100)
        .update_after_actions(4)
        .update_target_network(0)
        .replay_buffer(ReplayBufferConfig::default().capacity(1000))
        .explorer(
            ExplorationConfig::default()
                .num_actions(NUM_ACTIONS)
                .epsilon_random_frames(10)
                .epsilon_greedy_frames(1000),
        )
}

fn build(config: TrainingConfig, env: CountingEnv, dir: &TempDir) -> Result<StubLoop> {
    TrainingLoop::build(
        config,
        env,
        Concat,
        StubQ::new(vec![0.0, 0.5, 0.0]),
        StubQ::new(vec![1.0, 2.0, 3.0]),
        Checkpoints::new(dir.path(), "test", "yaml"),
    )
}

#[test]
fn test_stops_once_solved() -> Result<()> {
    let dir = TempDir::new("training_loop")?;
    let config = config().solved_threshold(5.0);
    let env = CountingEnv::new(vec![0.0, 0.0, 10.0], 2);
    let mut trainer = build(config, env, &dir)?;

    let summary = trainer.train(&mut NullRecorder::default())?;

    // Episode rewards are 0, 0 and 20, the running reward exceeds 5 only after the third
    assert_eq!(summary.episode_count, 3);
    assert_eq!(summary.frame_count, 6);
    assert!((summary.running_reward - 20.0 / 3.0).abs() < 1e-5);
    assert_eq!(trainer.phase(), EpisodePhase::Finished);
    Ok(())
}

#[test]
fn test_optimization_cadence() -> Result<()> {
    let dir = TempDir::new("training_loop")?;
    let env = CountingEnv::new(vec![1.0], usize::MAX);
    let mut trainer = build(config().max_steps_per_episode(20), env, &dir)?;
    assert_eq!(trainer.phase(), EpisodePhase::Resetting);

    let reward = trainer.run_episode(&mut NullRecorder::default())?;
    assert_eq!(reward, 20.0);
    assert_eq!(trainer.phase(), EpisodePhase::Finished);
    assert_eq!(trainer.state().frame_count, 20);
    assert_eq!(trainer.buffer().len(), 20);

    // Frames 4, 8, 12, 16 and 20, the buffer holds more than 3 transitions at each
    assert_eq!(trainer.online().n_train, 5);
    assert_eq!(trainer.target().n_train, 0);

    // With batch size 4, frame 4 is skipped as the buffer holds only 4 transitions
    let env = CountingEnv::new(vec![1.0], usize::MAX);
    let mut trainer = build(config().max_steps_per_episode(20).batch_size(4), env, &dir)?;
    trainer.run_episode(&mut NullRecorder::default())?;
    assert_eq!(trainer.online().n_train, 4);
    Ok(())
}

#[test]
fn test_training_waits_for_one_more_transition() -> Result<()> {
    let dir = TempDir::new("training_loop")?;
    let config = config()
        .batch_size(4)
        .update_after_actions(1)
        .max_steps_per_episode(4);
    let env = CountingEnv::new(vec![0.0], usize::MAX);
    let mut trainer = build(config, env, &dir)?;

    trainer.run_episode(&mut NullRecorder::default())?;
    assert_eq!(trainer.buffer().len(), 4);
    assert_eq!(trainer.online().n_train, 0);

    // The first step of the next episode makes the buffer ready
    trainer.run_episode(&mut NullRecorder::default())?;
    assert_eq!(trainer.buffer().len(), 8);
    assert_eq!(trainer.online().n_train, 4);
    Ok(())
}

#[test]
fn test_episode_ends_on_done() -> Result<()> {
    let dir = TempDir::new("training_loop")?;
    let env = CountingEnv::new(vec![2.0], 3);
    let mut trainer = build(config(), env, &dir)?;

    assert_eq!(trainer.run_episode(&mut NullRecorder::default())?, 6.0);
    assert_eq!(trainer.state().frame_count, 3);
    assert_eq!(trainer.state().episode_count, 1);

    let last = trainer.buffer().get(2).unwrap();
    assert!(last.is_done);
    assert_eq!(last.obs, vec![0.0, 0.0, 1.0, 2.0]);
    assert_eq!(last.next_obs, vec![0.0, 1.0, 2.0, 3.0]);
    Ok(())
}

#[test]
fn test_sync_copies_online_and_saves_checkpoints() -> Result<()> {
    let dir = TempDir::new("training_loop")?;
    let config = config()
        .batch_size(2)
        .update_after_actions(1)
        .update_target_network(5)
        .max_steps_per_episode(10);
    let env = CountingEnv::new(vec![1.0], usize::MAX);
    let mut trainer = build(config, env, &dir)?;
    let mut recorder = BufferedRecorder::new();

    trainer.run_episode(&mut recorder)?;

    // The last step is a sync, so the target equals the online network
    assert_eq!(trainer.target().weights, trainer.online().weights);
    assert_ne!(trainer.online().weights, vec![0.0, 0.5, 0.0]);

    let ckpt_dir = dir.path().join("test");
    assert!(ckpt_dir.join("5.yaml").is_file());
    assert!(ckpt_dir.join("10.yaml").is_file());

    let records = recorder.iter().collect::<Vec<_>>();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].get_count("frame_count")?, 5);
    assert_eq!(records[1].get_count("frame_count")?, 10);
    assert_eq!(records[1].get_count("episode_count")?, 0);
    assert_eq!(records[1].get_count("episodes_since_sync")?, 0);
    assert!(records[1].get_scalar("mean_loss").is_ok());
    assert!(records[1].get_scalar("epsilon")? < 1.0);
    assert!(matches!(
        records[1].get("datetime"),
        Some(RecordValue::DateTime(_))
    ));
    Ok(())
}

#[test]
fn test_resume() -> Result<()> {
    let dir = TempDir::new("training_loop")?;
    let ckpts = Checkpoints::new(dir.path(), "test", "yaml");
    ckpts.create_dir()?;
    StubQ::new(vec![7.0, 8.0, 9.0]).save(&ckpts.path(300))?;

    let env = CountingEnv::new(vec![0.0], 2);
    let mut trainer = build(config(), env, &dir)?;
    trainer.resume("300")?;

    assert_eq!(trainer.state().frame_count, 300);
    assert_eq!(trainer.online().weights, vec![7.0, 8.0, 9.0]);
    assert_eq!(trainer.target().weights, vec![7.0, 8.0, 9.0]);
    // 1.0 - 300 * (1.0 - 0.1) / 1000
    assert!((trainer.epsilon() - 0.73).abs() < 1e-9);

    trainer.run_episode(&mut NullRecorder::default())?;
    assert_eq!(trainer.state().frame_count, 302);

    assert!(trainer.resume("latest").is_err());
    assert!(trainer.resume("400").is_err());
    Ok(())
}

#[test]
fn test_same_seed_same_transitions() -> Result<()> {
    let dir = TempDir::new("training_loop")?;
    let run = |seed: u64| -> Result<Vec<usize>> {
        let env = CountingEnv::new(vec![1.0], usize::MAX);
        let mut trainer = build(config().seed(seed).max_steps_per_episode(50), env, &dir)?;
        trainer.run_episode(&mut NullRecorder::default())?;
        Ok((0..50)
            .map(|ix| trainer.buffer().get(ix).map(|tr| tr.act))
            .collect::<Option<Vec<_>>>()
            .unwrap())
    };

    assert_eq!(run(3)?, run(3)?);
    Ok(())
}
