//! Application entry point for the limb grove viewer.
//!
//! By default this opens an eframe window and hands all interaction to
//! [`Viewer`]. With `--headless` it runs a fixed number of ticks on the wall
//! clock and logs a summary line per tick.

mod viewer;

use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use sim_core::{config::SimConfig, rules::TickReport, simulation::Simulation};
use tracing::info;

use viewer::Viewer;

#[derive(Parser, Debug)]
#[command(name = "limb_grove", version, about = "Grows and displays groves of limb trees")]
struct Args {
    /// TOML configuration file. Built-in groves are used when absent.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Seed for the shared random generator. Overrides the file's seed.
    #[arg(long)]
    seed: Option<u64>,

    /// Run without a window.
    #[arg(long)]
    headless: bool,

    /// Ticks to run in headless mode.
    #[arg(long, default_value_t = 120)]
    ticks: u64,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let cfg = load_config(&args)?;

    if args.headless {
        run_headless(&cfg, args.ticks)
    } else {
        run_viewer(cfg)
    }
}

/// Reads the configuration file (or the defaults) and applies CLI overrides.
fn load_config(args: &Args) -> Result<SimConfig> {
    let mut cfg = match &args.config {
        Some(path) => SimConfig::from_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => SimConfig::default(),
    };
    if let Some(seed) = args.seed {
        cfg.seed = Some(seed);
    }
    Ok(cfg)
}

fn run_headless(cfg: &SimConfig, ticks: u64) -> Result<()> {
    let mut sim = Simulation::from_config(cfg).context("setting up simulation")?;
    info!(seed = sim.seed(), ticks, "running headless");

    sim.run_blocking(ticks, |sim, reports| {
        let (spawned, leaves) = summarize(reports);
        info!(
            tick = sim.ticks(),
            limbs = sim.limb_count(),
            spawned,
            leaves,
            "tick"
        );
    })?;

    info!(
        ticks = sim.ticks(),
        limbs = sim.limb_count(),
        "headless run finished"
    );
    Ok(())
}

fn run_viewer(cfg: SimConfig) -> Result<()> {
    let viewer = Viewer::new(cfg).context("setting up simulation")?;
    let options = eframe::NativeOptions::default();

    eframe::run_native(
        "Limb Grove",
        options,
        Box::new(|_cc| Ok(Box::new(viewer))),
    )
    .map_err(|e| anyhow!("viewer failed: {e}"))
}

/// Limbs spawned and leaves started over one tick, summed across groves.
fn summarize(reports: &[TickReport]) -> (usize, usize) {
    reports.iter().fold((0, 0), |(spawned, leaves), r| {
        (spawned + r.spawned.len(), leaves + r.leaves_started.len())
    })
}
