mod cli;
use cli::Cli;

fn main() -> Result<(), Box<dyn Error>> {

    let args = Cli::parse();
    let mut progress = Progress::new();

    let config = match &args.config {
        Some(path) => {
            progress.start(&format!("Reading config file {}", path.display()))?;
            let config = read_config_file(path)?;
            progress.done();
            config
        },
        None => Config::default(),
    };

    if args.processes == 0 {
        return Err(conebeam::Error::Config("number of processes must be positive".into()).into())
    }
    let run = reconstruction(&args, config);
    run.validate()?;

    let Detector { rows, columns, projections } = run.detector;
    progress.startln(&format!(
        "Reconstructing {n}×{n}×{n} voxels from {projections} projections of {rows}×{columns} pixels, using {s} process(es)",
        n = args.num_voxels, s = args.processes,
    ));

    let outcomes = if args.processes == 1 {
        vec![run_member(Solo, &run)]
    } else {
        ThreadGroup::run(args.processes, |member| run_member(member, &run))?
    };

    let mut report = None;
    let mut errors = vec![];
    for outcome in outcomes {
        match outcome {
            Ok(Some(r)) => report = Some(r),
            Ok(None)    => {},
            Err(e)      => errors.push(e),
        }
    }
    // Departures are consequences of a failure in another member
    errors.sort_by_key(|e| matches!(e, conebeam::Error::Group(GroupError::Departed { .. })));
    if let Some(error) = errors.into_iter().next() { return Err(error.into()) }

    if let Some(report) = report {
        println!("{report}");
        if let Some(out) = &args.out {
            println!("Reconstruction written to {}", out.display());
        }
    }
    progress.done_with_message("Finished");
    Ok(())
}

fn run_member<G: ProcessGroup>(group: G, run: &Reconstruction) -> conebeam::Result<Option<Report>> {
    let context = group.context();
    println!("CT reconstruction running as rank {} out of {}.", context.rank(), context.size());
    reconstruct(&group, run)
}

/// Combine command line and config file: the command line wins
fn reconstruction(args: &Cli, Config { detector, run }: Config) -> Reconstruction {
    Reconstruction {
        layout: InputLayout::new(&args.input, args.num_voxels),
        output: args.out.clone(),
        detector,
        partitioning: if args.balanced { Partitioning::Balanced } else { run.partition },
        threads: args.threads.or(run.threads),
        slices_per_task: args.slices_per_task.unwrap_or(run.slices_per_task),
        progress: args.progress,
    }
}

// ----- Imports -----------------------------------------------------------------------------------------
use std::error::Error;

use clap::Parser;
use group::{GroupError, ProcessGroup, Solo, ThreadGroup};

use conebeam::{
    reconstruct, Detector, Reconstruction, Report,
    config::{read_config_file, Config},
    loader::InputLayout,
    partition::Partitioning,
    utils::timing::Progress,
};
