use anyhow::Result;
use clap::Parser;
use log::{debug, info, warn};
use std::path::{Path, PathBuf};
use std::time::Instant;

use ant_clustering::common::{SimulationConfig, WorldSnapshot};
use ant_clustering::output::{self, MetricsWriter};
use ant_clustering::run_sweep;

const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Sweeps interaction threshold and cooldown over many replicas of the ant sorting simulation.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// TOML configuration file (defaults to ./config.toml when present)
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long)]
    width: Option<i32>,
    #[arg(long)]
    length: Option<i32>,
    /// Number of ants per replica
    #[arg(long)]
    ants: Option<u32>,
    /// Replicas per parameter combination
    #[arg(long)]
    experiments: Option<u32>,
    #[arg(long)]
    iterations: Option<u32>,
    #[arg(long)]
    memory_size: Option<usize>,
    #[arg(long)]
    threshold_start: Option<u32>,
    #[arg(long)]
    threshold_end: Option<u32>,
    #[arg(long)]
    threshold_interval: Option<u32>,
    #[arg(long)]
    cooldown_start: Option<u32>,
    #[arg(long)]
    cooldown_end: Option<u32>,
    #[arg(long)]
    cooldown_interval: Option<u32>,
    #[arg(long)]
    prob_relu_low: Option<f64>,
    #[arg(long)]
    prob_relu_high: Option<f64>,
    /// Sample metrics every N iterations
    #[arg(long)]
    sample_interval: Option<u32>,
    /// Base seed for reproducible runs
    #[arg(long)]
    seed: Option<u64>,
    #[arg(long)]
    csv_filename: Option<String>,
}

impl Cli {
    /// Applies command-line overrides on top of the loaded configuration.
    fn apply(&self, config: &mut SimulationConfig) {
        macro_rules! set {
            ($field:expr, $value:expr) => {
                if let Some(v) = $value.clone() {
                    $field = v;
                }
            };
        }
        set!(config.grid.width, self.width);
        set!(config.grid.length, self.length);
        set!(config.agents.count, self.ants);
        set!(config.experiment.runs, self.experiments);
        set!(config.experiment.iterations, self.iterations);
        set!(config.agents.memory_size, self.memory_size);
        set!(config.sweep.threshold_start, self.threshold_start);
        set!(config.sweep.threshold_end, self.threshold_end);
        set!(config.sweep.threshold_interval, self.threshold_interval);
        set!(config.sweep.cooldown_start, self.cooldown_start);
        set!(config.sweep.cooldown_end, self.cooldown_end);
        set!(config.sweep.cooldown_interval, self.cooldown_interval);
        set!(config.behavior.prob_relu[0], self.prob_relu_low);
        set!(config.behavior.prob_relu[1], self.prob_relu_high);
        set!(config.experiment.sample_interval, self.sample_interval);
        set!(config.output.csv_filename, self.csv_filename);
        if self.seed.is_some() {
            config.experiment.seed = self.seed;
        }
    }
}

fn load_config(cli: &Cli) -> Result<SimulationConfig> {
    let mut config = match &cli.config {
        Some(path) => SimulationConfig::load(path)?,
        None if Path::new(DEFAULT_CONFIG_PATH).exists() => SimulationConfig::load(DEFAULT_CONFIG_PATH)?,
        None => {
            info!("No config file given and {} not found; using defaults.", DEFAULT_CONFIG_PATH);
            SimulationConfig::default()
        }
    };
    cli.apply(&mut config);
    config.validate()?;
    Ok(config)
}

fn print_parameters(config: &SimulationConfig) {
    info!("--- Simulation Parameters ---");
    info!("  Grid Dimensions: {}x{}", config.grid.width, config.grid.length);
    info!("  Number of Ants: {}", config.agents.count);
    info!("  Number of Experiments: {}", config.experiment.runs);
    info!("  Iterations per Experiment: {}", config.experiment.iterations);
    info!("  Ant Memory Size: {}", config.agents.memory_size);
    info!(
        "  Threshold Sweep: {} to {} (step {})",
        config.sweep.threshold_start, config.sweep.threshold_end, config.sweep.threshold_interval
    );
    info!(
        "  Cooldown Sweep: {} to {} (step {})",
        config.sweep.cooldown_start, config.sweep.cooldown_end, config.sweep.cooldown_interval
    );
    info!("  Pick/Drop Probability Range: [{}, {}]", config.behavior.prob_relu[0], config.behavior.prob_relu[1]);
    info!("  Output CSV: {}", config.output.csv_filename);
    debug!("Full configuration: {:#?}", config);
}

fn main() -> Result<()> {
    // Initialize the logger
    env_logger::init();

    info!("Starting ant clustering simulation...");
    let cli = Cli::parse();
    let config = load_config(&cli)?;
    print_parameters(&config);

    if config.sweep.threshold_start > config.agents.memory_size as u32 {
        warn!(
            "threshold_start ({}) exceeds memory_size ({}); no interaction can ever occur.",
            config.sweep.threshold_start, config.agents.memory_size
        );
    }

    // Header first, so an unwritable sink fails before any simulation work.
    let csv_path = PathBuf::from(&config.output.csv_filename);
    let mut metrics = MetricsWriter::create(&csv_path)?;

    if config.output.save_metadata {
        output::write_metadata(&output::sibling_path(&csv_path, "_metadata.json"), &config)?;
    }

    info!("Using {} Rayon threads.", rayon::current_num_threads());
    let start_time = Instant::now();

    let keep_snapshots = config.output.save_snapshots;
    let mut snapshots: Vec<WorldSnapshot> = Vec::new();
    let summary = run_sweep(&config, keep_snapshots, |outcomes| {
        // Single aggregator: replicas buffered their rows, append them in run order.
        for outcome in outcomes {
            metrics.append(&outcome.samples)?;
            if let Some(snapshot) = &outcome.final_snapshot {
                snapshots.push(snapshot.clone());
            }
        }
        Ok(())
    })?;

    let total_duration = start_time.elapsed();
    info!(
        "Simulation finished in {:.3} seconds: {} combinations, {} replicas, {} rows.",
        total_duration.as_secs_f64(),
        summary.combinations,
        summary.replicas,
        metrics.rows()
    );

    if keep_snapshots {
        let format = config.output.format.as_deref().unwrap_or("json");
        output::save_snapshots(&csv_path, format, &snapshots)?;
    } else {
        info!("Skipping saving snapshots as per config (save_snapshots is false).");
    }

    info!("Simulation complete. Data written to {}", csv_path.display());
    Ok(())
}
