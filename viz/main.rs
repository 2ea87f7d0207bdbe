/// viz-dwi
///
/// Plots the per-direction DWI signal of one or more subjects: for every
/// subject the resampled signal is averaged over its non-empty voxels and
/// drawn as a line with a shaded band of 0.1 standard deviations.
///
/// Run with:
///   cargo run --bin viz-dwi -- subject1.json subject2.json --output dwi.png

use clap::Parser;
use log::{info, warn};
use std::path::{Path, PathBuf};

use ferrite_tract::neurotools::{resample_dwi, TractographyData, DEFAULT_SPHERE_DIRECTIONS};
use ferrite_tract::viz::{ChannelStats, LinePlot, Series, PALETTE, STD_SCALE};

#[derive(Parser)]
#[command(name = "viz-dwi")]
#[command(about = "Script to visualize DWIs (histograms, etc).")]
struct Cli {
    /// File containing data (as generated by the streamline preprocessing).
    #[arg(required = true)]
    subjects: Vec<PathBuf>,

    /// Where to write the plot.
    #[arg(short, long, default_value = "viz_dwi.png")]
    output: PathBuf,

    /// Number of sphere directions the DWI is resampled onto.
    #[arg(long, default_value_t = DEFAULT_SPHERE_DIRECTIONS)]
    directions: usize,

    #[arg(long, default_value_t = 1024)]
    width: u32,

    #[arg(long, default_value_t = 600)]
    height: u32,
}

fn subject_id(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let mut plot = LinePlot::new(cli.width, cli.height);

    for subject_file in cli.subjects.iter().take(PALETTE.len()) {
        let id = subject_id(subject_file);
        info!("Loading {}...", id);
        let tracto_data = TractographyData::load(subject_file)?;

        let volume = resample_dwi(
            &tracto_data.signal,
            &tracto_data.gradients.bvals,
            &tracto_data.gradients.bvecs,
            cli.directions,
        )?;
        let stats = ChannelStats::over_nonzero_voxels(&volume, STD_SCALE)?;
        info!("{}: {} voxel(s) with signal", id, stats.n_voxels);

        plot.add(Series::from_stats(format!("mean {}", id), &stats));
    }
    if cli.subjects.len() > PALETTE.len() {
        warn!(
            "Ignoring {} subject file(s) beyond the first {}",
            cli.subjects.len() - PALETTE.len(),
            PALETTE.len()
        );
    }

    for (label, [r, g, b]) in plot.legend() {
        info!("{} -> #{:02x}{:02x}{:02x}", label, r, g, b);
    }

    plot.save(&cli.output)?;
    info!("Wrote {}", cli.output.display());
    Ok(())
}
