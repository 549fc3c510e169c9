//! Whole reconstruction run for one member of a process group.
//!
//! 1. Load the global geometry (collectively).
//!
//! 2. Load every projection in turn (collectively, so that the group stays in
//!    step), back-projecting only those assigned to this member.
//!
//! 3. Sum the members' partial volumes onto the coordinator, then wait for
//!    the whole group.
//!
//! 4. The coordinator writes the final volume and reports checksum and timings.

use std::fmt;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use group::ProcessGroup;
use indicatif::{ProgressBar, ProgressStyle};

use crate::backproject::back_project;
use crate::detector::Detector;
use crate::error::{Error, Result};
use crate::io::write_segment;
use crate::loader::{GlobalData, InputLayout, ProjectionData};
use crate::partition::{assigned, Partitioning};
use crate::volume::Volume;

/// Parameters of a reconstruction run, identical on every member
#[derive(Clone, Debug)]
pub struct Reconstruction {
    pub layout: InputLayout,
    /// Where the coordinator writes the final volume; nothing is written if `None`
    pub output: Option<PathBuf>,
    pub detector: Detector,
    pub partitioning: Partitioning,
    /// Size of each member's worker pool; rayon's default if `None`
    pub threads: Option<usize>,
    pub slices_per_task: usize,
    /// Show a progress bar on the coordinator
    pub progress: bool,
}

impl Reconstruction {

    pub fn new(input: impl Into<PathBuf>, n_voxels: usize) -> Self {
        Self {
            layout: InputLayout::new(input, n_voxels),
            output: None,
            detector: Detector::default(),
            partitioning: Partitioning::default(),
            threads: None,
            slices_per_task: 1,
            progress: false,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.layout.n_voxels() == 0 {
            return Err(Error::Config("number of voxels must be positive".into()))
        }
        if self.slices_per_task == 0 {
            return Err(Error::Config("slices per task must be positive".into()))
        }
        if self.threads == Some(0) {
            return Err(Error::Config("number of threads must be positive".into()))
        }
        self.detector.validate()
    }
}

/// Outcome of a run, produced on the coordinator only
#[derive(Clone, Debug)]
pub struct Report {
    pub volume: Volume,
    /// Sum of all voxels of the final volume
    pub checksum: f64,
    pub elapsed: Duration,
    /// Time this member spent loading data
    pub reading: Duration,
    pub writing: Duration,
    /// Time this member spent back-projecting
    pub computing: Duration,
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "checksum: {}"              , self.checksum)?;
        writeln!(f, "elapsed time: {} sec"      , self.elapsed  .as_secs_f64())?;
        writeln!(f, "reading time: {} sec"      , self.reading  .as_secs_f64())?;
        writeln!(f, "writing time: {} sec"      , self.writing  .as_secs_f64())?;
        write!  (f, "computation time: {} sec"  , self.computing.as_secs_f64())
    }
}

/// Run the reconstruction as one member of `group`.
///
/// Every member of the group must call this with the same `run`. Returns the
/// report on the coordinator and `None` on every other member.
pub fn reconstruct<G: ProcessGroup>(group: &G, run: &Reconstruction) -> Result<Option<Report>> {
    run.validate()?;
    let context = group.context();
    let Reconstruction { layout, output, detector, partitioning, threads, slices_per_task, progress } = run;

    let pool = rayon::ThreadPoolBuilder::new().num_threads(threads.unwrap_or(0)).build()?;

    let start = Instant::now();
    let mut reading   = Duration::ZERO;
    let mut computing = Duration::ZERO;

    let now = Instant::now();
    let global = GlobalData::load(group, layout)?;
    reading += now.elapsed();

    let mine = assigned(detector.projections, context, *partitioning);
    let bar = progress_bar(*progress && context.is_coordinator(), mine.len());
    let mut volume = Volume::zeros(layout.n_voxels());

    for id in 0..detector.projections {
        let now = Instant::now();
        let data = ProjectionData::load(group, id, layout, detector)?;
        reading += now.elapsed();
        if !mine.contains(&id) { continue }

        let now = Instant::now();
        pool.install(|| back_project(&mut volume, &global, &data, detector, *slices_per_task))?;
        computing += now.elapsed();
        bar.inc(1);
    }
    bar.finish_and_clear();

    let total = group.sum_reduce(volume.data)?;
    group.barrier()?;
    let Some(total) = total else { return Ok(None) };
    let volume = Volume::new(layout.n_voxels(), total)?;

    let now = Instant::now();
    if let Some(path) = output {
        write_segment(&volume.data, 0, path)?;
    }
    let writing = now.elapsed();

    Ok(Some(Report {
        checksum: volume.checksum(),
        volume,
        elapsed: start.elapsed(),
        reading,
        writing,
        computing,
    }))
}

fn progress_bar(show: bool, len: usize) -> ProgressBar {
    if !show { return ProgressBar::hidden() }
    let bar = ProgressBar::new(len as u64);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("Back-projecting: [{elapsed_precise}] {wide_bar} {pos}/{len} ({eta_precise})") {
        bar.set_style(style);
    }
    bar
}
