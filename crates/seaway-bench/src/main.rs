//! seaway: CLI tool for building and querying sea-route graphs.
//!
//! Builds visibility graphs from coastline ring files, merges sharded
//! builds, routes between coordinates and prints graph diagnostics.
//! Useful for:
//!
//! - Generating the `default` and `meridian` graph files of a folder
//! - Splitting a large build across machines with `build-range`
//! - Checking routes and timing against a prebuilt graph
//!
//! # Usage
//!
//! ```text
//! cargo run --release --bin seaway -- build coast.json graphs/
//! cargo run --release --bin seaway -- build coast.json graphs/ --meridian
//! cargo run --release --bin seaway -- route graphs/ -- 10.0 54.5 -5.0 48.0
//! ```
//!
//! Logs go to stderr. `RUST_LOG` overrides the level chosen with `-v`.

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use seaway_graph::{
    BuildConfig, BuildDiagnostics, Clock, Coordinate, GraphVariant, InterpolateOptions,
    PathInterpolator, SearchOptions, VisGraph,
};
use seaway_io::{GraphFilePaths, GraphGenerator, JsonRingReader, load_graph, merge_graph_files};
use tracing_subscriber::EnvFilter;

/// Build, merge and query coast-aware routing graphs.
#[derive(Parser)]
#[command(name = "seaway", version)]
struct Cli {
    /// Raise log verbosity (`-v` debug, `-vv` trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Print results as JSON instead of a human-readable report.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build a full graph from a ring file into a graph folder.
    Build {
        /// JSON array of rings of `[lon, lat]` pairs.
        rings: PathBuf,

        /// Folder that receives the `default` or `meridian` file.
        out_folder: PathBuf,

        /// Build the meridian variant instead of the default graph.
        #[arg(long)]
        meridian: bool,

        #[command(flatten)]
        build: BuildArgs,
    },

    /// Build one shard of a graph for a later `merge`.
    BuildRange {
        /// JSON array of rings of `[lon, lat]` pairs.
        rings: PathBuf,

        /// Shard file to write.
        out_file: PathBuf,

        /// Index of this shard.
        #[arg(long)]
        split: usize,

        /// Total number of shards.
        #[arg(long, value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..))]
        splits: usize,

        /// Shuffle seed. Every shard of one graph must use the same seed.
        #[arg(long, default_value_t = 0)]
        seed: u64,

        /// Build the meridian variant.
        #[arg(long)]
        meridian: bool,

        #[command(flatten)]
        build: BuildArgs,
    },

    /// Merge shard files into one graph file.
    Merge {
        /// Merged graph file to write.
        out_file: PathBuf,

        /// Shard files to merge.
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Threads used to load the inputs.
        #[arg(long, default_value_t = 1)]
        load_threads: usize,
    },

    /// Route between two coordinates over a graph folder.
    Route {
        /// Folder holding `default` and optionally `meridian`.
        graph_folder: PathBuf,

        /// Origin longitude.
        #[arg(allow_negative_numbers = true)]
        lon1: f64,
        /// Origin latitude.
        #[arg(allow_negative_numbers = true)]
        lat1: f64,
        /// Destination longitude.
        #[arg(allow_negative_numbers = true)]
        lon2: f64,
        /// Destination latitude.
        #[arg(allow_negative_numbers = true)]
        lat2: f64,

        #[command(flatten)]
        route: RouteArgs,
    },

    /// Print diagnostics for a graph file.
    Stats {
        /// Graph file to inspect.
        graph_file: PathBuf,
    },
}

#[derive(Args)]
struct BuildArgs {
    /// Worker threads for the sweep.
    #[arg(long, default_value_t = BuildConfig::DEFAULT_WORKER_COUNT)]
    workers: usize,

    /// Vertices per sweep batch.
    #[arg(long, default_value_t = BuildConfig::DEFAULT_BATCH_SIZE)]
    batch_size: usize,

    /// Full build config as a JSON string.
    ///
    /// When provided, `--workers` and `--batch-size` are ignored.
    #[arg(long)]
    config_json: Option<String>,
}

#[derive(Args)]
struct RouteArgs {
    /// Stop expanding nodes farther than this from the origin.
    #[arg(long, default_value_t = SearchOptions::DEFAULT_DISTANCE_LIMIT)]
    limit: f64,

    /// Heuristic weighting; above 1.0 trades optimality for speed.
    #[arg(long, default_value_t = SearchOptions::DEFAULT_GREEDINESS)]
    greediness: f64,

    /// Move endpoints that lie on land to the nearest water first.
    #[arg(long)]
    correct_on_land: bool,

    /// How far past the coast a corrected endpoint is placed.
    #[arg(long, default_value_t = InterpolateOptions::DEFAULT_CLOSEST_POINT_LENGTH)]
    closest_point_length: f64,

    /// Full interpolation options as a JSON string.
    ///
    /// When provided, the other route flags are ignored.
    #[arg(long)]
    config_json: Option<String>,
}

impl BuildArgs {
    fn config(&self) -> anyhow::Result<BuildConfig> {
        if let Some(ref json) = self.config_json {
            return serde_json::from_str(json).context("parsing --config-json");
        }
        Ok(BuildConfig {
            worker_count: self.workers,
            batch_size: self.batch_size,
        })
    }
}

impl RouteArgs {
    fn options(&self) -> anyhow::Result<InterpolateOptions> {
        if let Some(ref json) = self.config_json {
            return serde_json::from_str(json).context("parsing --config-json");
        }
        Ok(InterpolateOptions {
            search: SearchOptions {
                distance_limit: self.limit,
                greediness: self.greediness,
            },
            correct_vertices_on_land: self.correct_on_land,
            closest_point_length: self.closest_point_length,
        })
    }
}

const fn variant(meridian: bool) -> GraphVariant {
    if meridian {
        GraphVariant::Meridian
    } else {
        GraphVariant::Default
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| level.into()))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    match &cli.command {
        Command::Build {
            rings,
            out_folder,
            meridian,
            build,
        } => {
            let generator = GraphGenerator::new(JsonRingReader, build.config()?);
            let generated = generator
                .generate(rings, out_folder, variant(*meridian), &StdClock)
                .with_context(|| format!("building graph from {}", rings.display()))?;
            eprintln!("Graph written to {}", generated.path.display());
            print_diagnostics(&generated.diagnostics, cli.json)
        }
        Command::BuildRange {
            rings,
            out_file,
            split,
            splits,
            seed,
            meridian,
            build,
        } => {
            let generator = GraphGenerator::new(JsonRingReader, build.config()?);
            let range = generator
                .generate_for_vertex_range(
                    rings,
                    out_file,
                    variant(*meridian),
                    *split,
                    *splits,
                    *seed,
                )
                .with_context(|| format!("building shard {split} of {splits}"))?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&range)?);
            } else {
                println!(
                    "Shard {split}/{splits}: vertices [{}, {}) written to {}",
                    range.start,
                    range.end,
                    out_file.display()
                );
            }
            Ok(())
        }
        Command::Merge {
            out_file,
            inputs,
            load_threads,
        } => {
            let merged = merge_graph_files(inputs, out_file, *load_threads)
                .with_context(|| format!("merging into {}", out_file.display()))?;
            eprintln!("Merged {} files into {}", inputs.len(), out_file.display());
            print_diagnostics(&BuildDiagnostics::measure(&merged, Duration::ZERO, 0), cli.json)
        }
        Command::Route {
            graph_folder,
            lon1,
            lat1,
            lon2,
            lat2,
            route,
        } => {
            let interpolator = load_interpolator(graph_folder)?;
            let from = Coordinate::new(*lon1, *lat1);
            let to = Coordinate::new(*lon2, *lat2);
            let path = interpolator.interpolate(from, to, &route.options()?)?;
            print_path(&path, cli.json)
        }
        Command::Stats { graph_file } => {
            let graph = load_graph(graph_file)
                .with_context(|| format!("loading {}", graph_file.display()))?;
            print_diagnostics(&BuildDiagnostics::measure(&graph, Duration::ZERO, 0), cli.json)
        }
    }
}

/// Load the default graph of `folder`, plus the meridian graph if the
/// folder has one.
fn load_interpolator(folder: &Path) -> anyhow::Result<PathInterpolator> {
    let paths = GraphFilePaths::new(folder);
    let default_path = paths.default_graph_path();
    let graph: VisGraph = load_graph(&default_path)
        .with_context(|| format!("loading {}", default_path.display()))?;
    let interpolator = PathInterpolator::new(graph);

    let meridian_path = paths.meridian_graph_path();
    if !meridian_path.exists() {
        tracing::info!("no meridian graph, routing on the default graph only");
        return Ok(interpolator);
    }
    let meridian = load_graph(&meridian_path)
        .with_context(|| format!("loading {}", meridian_path.display()))?;
    Ok(interpolator.with_meridian_graph(meridian))
}

fn print_diagnostics(diagnostics: &BuildDiagnostics, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(diagnostics)?);
    } else {
        println!("{}", diagnostics.report());
    }
    Ok(())
}

fn print_path(path: &[Coordinate], json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(path)?);
        return Ok(());
    }
    for c in path {
        println!("{:.6} {:.6}", c.longitude, c.latitude);
    }
    eprintln!(
        "{} points, {:.1} km",
        path.len(),
        seaway_graph::types::path_length(path) / 1000.0
    );
    Ok(())
}

/// [`Clock`] implementation backed by [`std::time::Instant`].
struct StdClock;

impl Clock for StdClock {
    type Instant = Instant;

    fn now(&self) -> Instant {
        Instant::now()
    }

    fn elapsed(&self, since: &Instant) -> Duration {
        since.elapsed()
    }
}
