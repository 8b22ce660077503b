use std::io::Write;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use densecut::fs::Instance;
use densecut::statistics::RunSummary;
use densecut::{
    IndexKind, append_dist_offset, cost_disconnected, cost_of_labeling, gaec_adj_matrix,
    gaec_flat_index, gaec_hnsw, gaec_incremental_nn, gaec_parallel_flat_index, gaec_parallel_hnsw,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "snake_case")]
enum Solver {
    AdjMatrix,
    FlatIndex,
    Hnsw,
    ParallelFlatIndex,
    ParallelHnsw,
    IncNnFlat,
    IncNnHnsw,
}

/// Dense multicut solvers
#[derive(Parser, Debug)]
#[command(name = "densecut")]
#[command(about = "Greedy additive edge contraction on dense similarity graphs", long_about = None)]
struct Args {
    /// Path to the dense multicut instance (whitespace text or .npy)
    #[arg(short, long)]
    file: PathBuf,

    /// Solver variant to run
    #[arg(short, long, value_enum)]
    solver: Solver,

    /// Number of nearest neighbours for the initial kNN graph. Only used
    /// by the inc_nn solvers
    #[arg(short = 'k', long = "knn", default_value_t = 10, value_parser = clap::value_parser!(u32).range(1..))]
    knn: u32,

    /// Constant subtracted from every pairwise edge weight
    #[arg(long, default_value_t = 0.0)]
    dist_offset: f32,

    /// Where to write the labeling, one label per line. Without this the
    /// labels go to stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print a JSON run summary to stdout
    #[arg(long)]
    summary: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let instance = Instance::load(&args.file)
        .with_context(|| format!("failed to load instance {}", args.file.display()))?;
    let Instance {
        mut features,
        nr_nodes: n,
        dim,
    } = instance;

    let mut d = dim;
    let mut track_dist_offset = false;
    if args.dist_offset != 0.0 {
        features = append_dist_offset(&features, args.dist_offset, n, d)
            .context("invalid dist offset")?;
        d += 1;
        track_dist_offset = true;
    }

    let features_for_summary = args.summary.then(|| features.clone());

    let started = Instant::now();
    let labels = match args.solver {
        Solver::AdjMatrix => gaec_adj_matrix(n, d, features, track_dist_offset),
        Solver::FlatIndex => gaec_flat_index(n, d, features, track_dist_offset),
        Solver::Hnsw => gaec_hnsw(n, d, features, track_dist_offset),
        Solver::ParallelFlatIndex => {
            gaec_parallel_flat_index(n, d, features, track_dist_offset)
        }
        Solver::ParallelHnsw => gaec_parallel_hnsw(n, d, features, track_dist_offset),
        Solver::IncNnFlat => gaec_incremental_nn(
            n,
            d,
            features,
            args.knn as usize,
            IndexKind::Flat,
            track_dist_offset,
        ),
        Solver::IncNnHnsw => gaec_incremental_nn(
            n,
            d,
            features,
            args.knn as usize,
            IndexKind::Hnsw,
            track_dist_offset,
        ),
    };
    let elapsed = started.elapsed();

    match &args.output {
        Some(path) => {
            let mut out = std::fs::File::create(path)
                .with_context(|| format!("cannot create output file {}", path.display()))?;
            for label in &labels {
                writeln!(out, "{label}")?;
            }
        }
        None => {
            let stdout = std::io::stdout();
            let mut out = stdout.lock();
            for label in &labels {
                writeln!(out, "{label}")?;
            }
        }
    }

    if args.summary {
        let features = features_for_summary.expect("cloned above when --summary is set");
        let mut distinct: Vec<usize> = labels.clone();
        distinct.sort_unstable();
        distinct.dedup();

        let solver_name = args
            .solver
            .to_possible_value()
            .expect("derived variants are never skipped")
            .get_name()
            .to_string();
        let summary = RunSummary {
            solver: solver_name,
            nr_nodes: n,
            dim,
            nr_clusters: distinct.len(),
            disconnected_cost: cost_disconnected(n, d, &features, track_dist_offset),
            multicut_cost: cost_of_labeling(n, d, &features, &labels, track_dist_offset),
            solve_ms: elapsed.as_millis(),
        };
        println!("{}", serde_json::to_string_pretty(&summary)?);
    }

    Ok(())
}
