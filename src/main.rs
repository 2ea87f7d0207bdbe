//! ferrite-tract - CLI entry point
//!
//! Creates regression-model checkpoints and runs step-by-step tractography
//! with them on a subject's resampled DWI.

use clap::{Parser, Subcommand};
use log::info;
use std::path::{Path, PathBuf};

use ferrite_tract::init::UniformInitializer;
use ferrite_tract::model::ffnn_regression::HYPERPARAMS_FILE;
use ferrite_tract::neurotools::DEFAULT_SPHERE_DIRECTIONS;
use ferrite_tract::{
    resample_dwi, track, ActivationFunction, DwiVolumeManager, FfnnRegression, Hyperparameters,
    TractographyData, TrackingConfig,
};

#[derive(Parser)]
#[command(name = "ferrite-tract")]
#[command(version)]
#[command(about = "Feed-forward regression tractography on diffusion MRI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a freshly initialized model checkpoint
    Init {
        /// Checkpoint directory to write
        #[arg(short, long)]
        model: PathBuf,

        /// Hidden layer sizes, comma separated
        #[arg(long, value_delimiter = ',', default_value = "500")]
        hidden_sizes: Vec<usize>,

        /// Hidden layer activation
        #[arg(short, long, default_value = "tanh")]
        activation: ActivationFunction,

        /// Number of resampled DWI directions fed to the model
        #[arg(long, default_value_t = DEFAULT_SPHERE_DIRECTIONS)]
        input_size: usize,

        #[arg(long, default_value_t = 3)]
        output_size: usize,

        /// Weights initializer seed
        #[arg(long, default_value_t = 1234)]
        seed: u64,
    },

    /// Track streamlines from seed points
    Track {
        /// Checkpoint directory written by `init` or a trainer
        #[arg(short, long)]
        model: PathBuf,

        /// Subject file (JSON tractography data)
        #[arg(short, long)]
        subject: PathBuf,

        /// Seed point in voxel coordinates, `x,y,z`; may be repeated
        #[arg(long = "seed", required = true, value_parser = parse_point)]
        seeds: Vec<[f64; 3]>,

        #[arg(long, default_value_t = 500)]
        steps: usize,

        /// Step size in voxels
        #[arg(long, default_value_t = 0.5)]
        step_size: f64,

        /// Streamlines JSON output
        #[arg(short, long, default_value = "streamlines.json")]
        output: PathBuf,
    },
}

fn parse_point(s: &str) -> Result<[f64; 3], String> {
    let values: Vec<f64> = s
        .split(',')
        .map(|v| v.trim().parse::<f64>().map_err(|e| format!("{v:?}: {e}")))
        .collect::<Result<_, _>>()?;
    <[f64; 3]>::try_from(values).map_err(|v| format!("expected 3 coordinates, got {}", v.len()))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init {
            model,
            hidden_sizes,
            activation,
            input_size,
            output_size,
            seed,
        } => init_model(&model, hidden_sizes, activation, input_size, output_size, seed),

        Commands::Track {
            model,
            subject,
            seeds,
            steps,
            step_size,
            output,
        } => run_tracking(&model, &subject, &seeds, steps, step_size, &output),
    }
}

fn init_model(
    dir: &Path,
    hidden_sizes: Vec<usize>,
    activation: ActivationFunction,
    input_size: usize,
    output_size: usize,
    seed: u64,
) -> Result<(), Box<dyn std::error::Error>> {
    // No volumes are needed to build and save the parameters.
    let mut model = FfnnRegression::new(
        DwiVolumeManager::new(),
        input_size,
        hidden_sizes,
        output_size,
        activation,
    )?;
    model.initialize(&mut UniformInitializer::new(seed));
    model.save(dir)?;
    Ok(())
}

fn run_tracking(
    model_dir: &Path,
    subject: &Path,
    seeds: &[[f64; 3]],
    steps: usize,
    step_size: f64,
    output: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let hyperparameters = Hyperparameters::load_json(model_dir.join(HYPERPARAMS_FILE))?;

    info!("Loading {}...", subject.display());
    let data = TractographyData::load(subject)?;
    let volume = resample_dwi(
        &data.signal,
        &data.gradients.bvals,
        &data.gradients.bvecs,
        hyperparameters.input_size,
    )?;
    let [nx, ny, nz] = volume.spatial_dims();

    let mut manager = DwiVolumeManager::new();
    let subject_id = manager.register(volume)?;
    let model = FfnnRegression::load(model_dir, manager)?;

    let config = TrackingConfig {
        step_size,
        max_steps: steps,
        bounds: Some([nx, ny, nz].map(|n| n.saturating_sub(1) as f64)),
        ..Default::default()
    };
    let streamlines = track(model.make_sequence_generator(subject_id), seeds, Vec::new(), &config)?;

    let file = std::fs::File::create(output)?;
    serde_json::to_writer(std::io::BufWriter::new(file), &streamlines)?;
    info!("Wrote {} streamline(s) to {}", streamlines.len(), output.display());
    Ok(())
}
