//! Training loop.
mod config;
mod state;
use crate::{
    checkpoint::Checkpoints,
    record::Recorder,
    replay_buffer::{ReplayBuffer, Transition},
    Env, ExplorationSchedule, FrameStack, ObsComposer, QFunction, Synchronizer, TargetComputer,
    N_FRAMES,
};
use anyhow::Result;
pub use config::TrainingConfig;
use log::{debug, info, trace};
use rand::{rngs::StdRng, Rng, SeedableRng};
pub use state::TrainingState;

/// Phase of the current episode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EpisodePhase {
    /// The environment is reset and the frame stack is refilled.
    Resetting,

    /// Environment steps are taken until the episode terminates.
    Stepping,

    /// The episode reward has been recorded.
    Finished,
}

/// Counters at the end of training.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingSummary {
    /// Number of finished episodes.
    pub episode_count: usize,

    /// Number of environment steps.
    pub frame_count: usize,

    /// Running reward when training stopped.
    pub running_reward: f32,
}

/// Trains an action-value function with experience replay and a target network.
///
/// # Training loop
///
/// Each episode runs as follows:
///
/// 1. *Resetting*: the environment is initialized and its state is pushed
///    [`N_FRAMES`] times into the frame stack.
/// 2. *Stepping*: for at most `max_steps_per_episode` steps,
///     1. `frame_count += 1`,
///     2. an action is selected with [`ExplorationSchedule`],
///     3. the environment takes the action, the new frame is pushed into the
///        frame stack and the transition is pushed into the replay buffer,
///     4. if `frame_count % update_after_actions == 0` and the replay buffer
///        holds more than `batch_size` transitions, the online network takes
///        an optimization step on a sampled batch,
///     5. if `frame_count % update_target_network == 0`, [`Synchronizer`]
///        updates the target network and saves a checkpoint,
///     6. the episode ends early if the environment reports termination.
/// 3. *Finished*: the episode reward is recorded in [`TrainingState`].
///
/// Episodes are repeated until the running reward exceeds `solved_threshold`.
pub struct TrainingLoop<E, C, Q, R = StdRng>
where
    E: Env,
    C: ObsComposer<E::Frame>,
    Q: QFunction<C::Obs>,
    R: Rng,
{
    config: TrainingConfig,
    env: E,
    composer: C,
    online: Q,
    target: Q,
    buffer: ReplayBuffer<C::Obs>,
    explorer: ExplorationSchedule,
    target_computer: TargetComputer,
    synchronizer: Synchronizer,
    frames: FrameStack<E::Frame>,
    state: TrainingState,
    phase: EpisodePhase,
    rng: R,
}

impl<E, C, Q> TrainingLoop<E, C, Q, StdRng>
where
    E: Env,
    C: ObsComposer<E::Frame>,
    Q: QFunction<C::Obs>,
{
    /// Builds the training loop with a random number generator seeded by `config.seed`.
    pub fn build(
        config: TrainingConfig,
        env: E,
        composer: C,
        online: Q,
        target: Q,
        checkpoints: Checkpoints,
    ) -> Result<Self> {
        let rng = StdRng::seed_from_u64(config.seed);
        Self::build_with_rng(config, env, composer, online, target, checkpoints, rng)
    }
}

impl<E, C, Q, R> TrainingLoop<E, C, Q, R>
where
    E: Env,
    C: ObsComposer<E::Frame>,
    Q: QFunction<C::Obs>,
    R: Rng,
{
    /// Builds the training loop drawing all random numbers from `rng`.
    pub fn build_with_rng(
        config: TrainingConfig,
        env: E,
        composer: C,
        online: Q,
        target: Q,
        checkpoints: Checkpoints,
        rng: R,
    ) -> Result<Self> {
        config.validate()?;
        let buffer = ReplayBuffer::build(&config.replay_buffer)?;
        let explorer = ExplorationSchedule::build(config.explorer.clone())?;
        let target_computer = TargetComputer::new(config.gamma);
        let synchronizer = Synchronizer::new(config.update_target_network, checkpoints);
        let state = TrainingState::new(config.reward_window);

        Ok(Self {
            config,
            env,
            composer,
            online,
            target,
            buffer,
            explorer,
            target_computer,
            synchronizer,
            frames: FrameStack::new(),
            state,
            phase: EpisodePhase::Resetting,
            rng,
        })
    }

    /// Resumes from a checkpoint.
    ///
    /// Both networks load the same checkpoint. The frame count is recovered
    /// from the checkpoint identifier and epsilon is recomputed from it.
    pub fn resume(&mut self, checkpoint_id: &str) -> Result<()> {
        let (frame_count, path) = self.synchronizer.checkpoints().resolve(checkpoint_id)?;
        self.online.load(&path)?;
        self.target.load(&path)?;
        self.state = TrainingState::resumed(frame_count, self.config.reward_window);
        self.explorer.resume_at(frame_count);
        info!(
            "Resumed from {:?} at frame {}, epsilon {:.4}",
            path,
            frame_count,
            self.explorer.epsilon()
        );
        Ok(())
    }

    /// Returns the configuration.
    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    /// Returns the training state.
    pub fn state(&self) -> &TrainingState {
        &self.state
    }

    /// Returns the phase of the current episode.
    pub fn phase(&self) -> EpisodePhase {
        self.phase
    }

    /// Returns the current epsilon.
    pub fn epsilon(&self) -> f64 {
        self.explorer.epsilon()
    }

    /// Returns the replay buffer.
    pub fn buffer(&self) -> &ReplayBuffer<C::Obs> {
        &self.buffer
    }

    /// Returns the online network.
    pub fn online(&self) -> &Q {
        &self.online
    }

    /// Returns the target network.
    pub fn target(&self) -> &Q {
        &self.target
    }

    /// Resets the environment and refills the frame stack.
    fn reset_episode(&mut self) -> Result<C::Obs> {
        self.phase = EpisodePhase::Resetting;
        self.env.init()?;
        self.frames.clear();
        for _ in 0..N_FRAMES {
            self.frames.push(self.env.state()?);
        }
        self.frames.compose(&self.composer)
    }

    /// Takes an environment step and stores the transition.
    ///
    /// Returns the next observation, the reward and the termination flag.
    fn env_step(&mut self, obs: C::Obs, frame_count: usize) -> Result<(C::Obs, f32, bool)> {
        let act = self
            .explorer
            .select_action(&obs, frame_count, &self.online, &mut self.rng)?;
        let step = self.env.step(act)?;
        self.frames.push(step.obs);
        let next_obs = self.frames.compose(&self.composer)?;

        self.buffer.push(Transition::new(
            obs,
            act,
            step.reward,
            next_obs.clone(),
            step.is_done,
        ));

        Ok((next_obs, step.reward, step.is_done))
    }

    /// Performs an optimization step of the online network on a sampled batch.
    fn optimize(&mut self) -> Result<f32> {
        let batch = self.buffer.batch(self.config.batch_size, &mut self.rng)?;
        let tgt = self.target_computer.compute(&batch, &self.target)?;
        let loss = self.online.train_batch(&batch.obs, &batch.act, &tgt)?;
        self.synchronizer.record_loss(loss);
        trace!("frame {}, loss {}", self.state.frame_count, loss);
        Ok(loss)
    }

    /// Runs one episode and returns its reward.
    ///
    /// Progress records of target network synchronizations are written to `recorder`.
    pub fn run_episode(&mut self, recorder: &mut dyn Recorder) -> Result<f32> {
        let mut obs = self.reset_episode()?;
        self.phase = EpisodePhase::Stepping;
        let mut episode_reward = 0.0;

        for _ in 0..self.config.max_steps_per_episode {
            let frame_count = self.state.next_frame();
            let (next_obs, reward, is_done) = self.env_step(obs, frame_count)?;
            episode_reward += reward;

            let interval = self.config.update_after_actions;
            if interval > 0
                && frame_count % interval == 0
                && self.buffer.is_ready(self.config.batch_size)
            {
                self.optimize()?;
            }

            if self.synchronizer.is_due(frame_count) {
                let record = self.synchronizer.sync::<C::Obs, Q>(
                    &self.state,
                    self.explorer.epsilon(),
                    &self.online,
                    &mut self.target,
                )?;
                recorder.write(record);
            }

            obs = next_obs;
            if is_done {
                break;
            }
        }

        self.state.record_episode(episode_reward);
        self.phase = EpisodePhase::Finished;
        debug!(
            "episode {}: reward {}, running reward {:.2}, frame count {}",
            self.state.episode_count,
            episode_reward,
            self.state.running_reward,
            self.state.frame_count
        );

        Ok(episode_reward)
    }

    /// Runs episodes until the running reward exceeds `solved_threshold`.
    pub fn train(&mut self, recorder: &mut dyn Recorder) -> Result<TrainingSummary> {
        info!(
            "Start training from frame {}, epsilon {:.4}",
            self.state.frame_count,
            self.explorer.epsilon()
        );

        loop {
            self.run_episode(recorder)?;
            if self.state.is_solved(self.config.solved_threshold) {
                info!("Solved at episode {}!", self.state.episode_count);
                break;
            }
        }

        Ok(TrainingSummary {
            episode_count: self.state.episode_count,
            frame_count: self.state.frame_count,
            running_reward: self.state.running_reward,
        })
    }
}
