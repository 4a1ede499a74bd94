mod snake;
use anyhow::{ensure, Result};
use clap::Parser;
use deepq_candle::{
    cnn::{Cnn, CnnConfig},
    composer::FrameComposer,
    q_network::{QNetwork, QNetworkConfig},
};
use deepq_core::{checkpoint::Checkpoints, TrainingConfig, TrainingLoop, N_FRAMES};
use deepq_tensorboard::TensorboardRecorder;
use log::info;
use snake::{SnakeGame, FRAME_SIZE, NUM_ACTIONS};

/// Size of the grid of the snake game.
const GRID_SIZE: usize = 30;

/// Extension of checkpoint files.
const CHECKPOINT_EXT: &str = "safetensors";

/// Train a Deep Q-Learning agent on a snake game
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Name of the experiment, checkpoints are saved in `<MODEL_DIR>/<EXPERIMENT>`
    experiment: String,
    /// Checkpoint to resume from, e.g., 20000, 20000.safetensors or a path to a checkpoint file
    /// Checkpoint to resume from, e.g., 20000 or 20000.safetensors
    #[arg(long)]
    checkpoint: Option<String>,

    /// Root directory of checkpoints
    #[arg(long, default_value = "models")]
    model_dir: String,

    /// YAML file of the training configuration
    #[arg(long)]
    config: Option<String>,

    /// YAML file of the model configuration
    #[arg(long)]
    model_config: Option<String>,

    /// Print the configurations and exit
    #[arg(long, default_value_t = false)]
    show_config: bool,
}

mod config {
    use super::*;

    pub fn training_config(args: &Args) -> Result<TrainingConfig> {
        match &args.config {
            Some(path) => TrainingConfig::load(path),
            None => Ok(TrainingConfig::default()),
        }
    }

    pub fn model_config(args: &Args, num_actions: usize) -> Result<QNetworkConfig<CnnConfig>> {
        match &args.model_config {
            Some(path) => QNetworkConfig::load(path),
            None => Ok(QNetworkConfig::default().q_config(
                CnnConfig::default()
                    .in_channels(3 * N_FRAMES)
                    .image_size(FRAME_SIZE, FRAME_SIZE)
                    .out_dim(num_actions),
            )),
        }
    }

    /// Checks that the network fits the frames of the game.
    pub fn check(
        training_config: &TrainingConfig,
        model_config: &QNetworkConfig<CnnConfig>,
    ) -> Result<()> {
        let cnn = &model_config.q_config;
        ensure!(
            training_config.explorer.num_actions == NUM_ACTIONS && cnn.out_dim == NUM_ACTIONS,
            "the game has {} actions",
            NUM_ACTIONS
        );
        ensure!(
            cnn.in_channels == 3 * N_FRAMES && cnn.height == FRAME_SIZE && cnn.width == FRAME_SIZE,
            "the network input must be {} channels of {}x{}",
            3 * N_FRAMES,
            FRAME_SIZE,
            FRAME_SIZE
        );
        Ok(())
    }

    pub fn show_config(
        training_config: &TrainingConfig,
        model_config: &QNetworkConfig<CnnConfig>,
    ) -> Result<()> {
        println!("{}", serde_yaml::to_string(training_config)?);
        println!("{}", serde_yaml::to_string(model_config)?);
        Ok(())
    }
}

fn train(args: &Args) -> Result<()> {
    let training_config = config::training_config(args)?;
    let model_config = config::model_config(args, training_config.explorer.num_actions)?;
    if args.show_config {
        return config::show_config(&training_config, &model_config);
    }
    config::check(&training_config, &model_config)?;

    let checkpoints = Checkpoints::new(&args.model_dir, &args.experiment, CHECKPOINT_EXT);
    checkpoints.create_dir()?;
    training_config.save(checkpoints.dir().join("training.yaml"))?;
    model_config.save(checkpoints.dir().join("model.yaml"))?;

    let env = SnakeGame::new(GRID_SIZE, training_config.seed)?;
    let composer = FrameComposer::new(model_config.device.build()?);
    let online = QNetwork::<Cnn>::build(model_config.clone())?;
    let target = QNetwork::<Cnn>::build(model_config)?;
    let mut recorder = TensorboardRecorder::new(checkpoints.dir());
    let mut trainer =
        TrainingLoop::build(training_config, env, composer, online, target, checkpoints)?;

    if let Some(id) = &args.checkpoint {
        trainer.resume(id)?;
    }

    let summary = trainer.train(&mut recorder)?;
    info!(
        "Finished at frame {} after {} episodes, running reward {:.2}",
        summary.frame_count, summary.episode_count, summary.running_reward
    );

    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    train(&args)
}
