/// Command line interface for `conebeam` executable
#[derive(clap::Parser, Debug, Clone)]
#[clap(name = "conebeam", about = "Reconstruct a CT volume by distributed voxel-driven back-projection")]
pub (super) struct Cli {

    /// Number of voxels along each side of the (cubic) volume
    #[clap(short, long)]
    pub num_voxels: usize,

    /// Directory containing the CT data
    #[clap(short, long)]
    pub input: PathBuf,

    /// Where to write the reconstructed volume (not written if omitted)
    #[clap(short, long)]
    pub out: Option<PathBuf>,

    /// Number of cooperating processes, simulated as threads of this one
    #[clap(short, long, default_value = "1")]
    pub processes: usize,

    /// Maximum number of rayon threads per process
    #[clap(short = 'j', long)]
    pub threads: Option<usize>,

    /// Number of consecutive Z slices in each parallel task
    #[clap(long)]
    pub slices_per_task: Option<usize>,

    /// Spread leftover projections over the first processes, rather than giving
    /// them all to the last one
    #[clap(long)]
    pub balanced: bool,

    /// TOML file with detector and run parameters
    #[clap(short, long)]
    pub config: Option<PathBuf>,

    /// Show back-projection progress of the coordinator
    #[clap(long)]
    pub progress: bool,
}

// ----- Imports -----------------------------------------------------------------------------------------
use std::path::PathBuf;
