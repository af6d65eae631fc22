use serde::{Deserialize, Serialize};
use anyhow::Result;
use crate::lattice::{ObjectType, NUM_DIRECTIONS};
use crate::sim_params::SimParams;
use std::path::Path;

/// Relative movement weights: straight on is most likely, turning around least likely.
pub const DEFAULT_DIRECTION_WEIGHTS: [f64; NUM_DIRECTIONS] = [12.0, 5.0, 2.0, 1.0, 0.1, 1.0, 2.0, 5.0];

// Lattice dimensions
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct GridConfig {
    #[serde(default = "default_grid_dim")]
    pub width: i32,
    #[serde(default = "default_grid_dim")]
    pub length: i32,
}

// Ant population
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct AgentConfig {
    #[serde(default = "default_ant_count")]
    pub count: u32,
    #[serde(default = "default_memory_size")]
    pub memory_size: usize,
    /// Keep the set of visited cells per ant. Costs memory on large runs.
    #[serde(default)]
    pub record_paths: bool,
}

// Movement model
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct MovementConfig {
    /// Eight non-negative weights, relative to the previous direction. Normalised on use.
    #[serde(default = "default_direction_weights")]
    pub direction_weights: Vec<f64>,
}

// Pick/drop behaviour
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct BehaviorConfig {
    /// Ramp bounds [a, b] mapping local same-type density to a probability.
    #[serde(default = "default_prob_relu")]
    pub prob_relu: [f64; 2],
}

// Initial object distribution, drawn independently for every cell
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct ObjectDistribution {
    #[serde(default = "default_object_prob")]
    pub food: f64,
    #[serde(default = "default_object_prob")]
    pub waste: f64,
    #[serde(default = "default_object_prob")]
    pub egg: f64,
    #[serde(default = "default_empty_prob")]
    pub empty: f64,
}

// Parameter sweep over interaction threshold and cooldown (inclusive ranges)
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct SweepConfig {
    #[serde(default)]
    pub threshold_start: u32,
    #[serde(default = "default_threshold_end")]
    pub threshold_end: u32,
    #[serde(default = "default_sweep_interval")]
    pub threshold_interval: u32,
    #[serde(default = "default_sweep_interval")]
    pub cooldown_start: u32,
    #[serde(default = "default_sweep_interval")]
    pub cooldown_end: u32,
    #[serde(default = "default_sweep_interval")]
    pub cooldown_interval: u32,
}

// Replica and iteration counts
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct ExperimentConfig {
    /// Independent replicas per parameter combination.
    #[serde(default = "default_runs")]
    pub runs: u32,
    #[serde(default = "default_iterations")]
    pub iterations: u32,
    /// Metrics are sampled on iterations divisible by this value.
    #[serde(default = "default_sample_interval")]
    pub sample_interval: u32,
    /// Base seed for every replica stream. Fresh entropy when absent.
    #[serde(default)]
    pub seed: Option<u64>,
}

// Output settings
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct OutputConfig {
    #[serde(default = "default_csv_filename")]
    pub csv_filename: String,
    #[serde(default = "default_true")]
    pub save_metadata: bool,
    /// Dump the final world state of every replica.
    #[serde(default)]
    pub save_snapshots: bool,
    pub format: Option<String>, // Snapshot format: "json", "bincode", "messagepack"
}

fn default_grid_dim() -> i32 { 100 }
fn default_ant_count() -> u32 { 500 }
fn default_memory_size() -> usize { 20 }
fn default_direction_weights() -> Vec<f64> { DEFAULT_DIRECTION_WEIGHTS.to_vec() }
fn default_prob_relu() -> [f64; 2] { [0.3, 0.7] }
fn default_object_prob() -> f64 { 0.05 }
fn default_empty_prob() -> f64 { 0.85 }
fn default_threshold_end() -> u32 { 20 }
fn default_sweep_interval() -> u32 { 5 }
fn default_runs() -> u32 { 5 }
fn default_iterations() -> u32 { 30001 }
fn default_sample_interval() -> u32 { 10000 }
fn default_csv_filename() -> String { "ground_data.csv".to_string() }
fn default_true() -> bool { true }

impl Default for GridConfig {
    fn default() -> Self {
        GridConfig { width: default_grid_dim(), length: default_grid_dim() }
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        AgentConfig {
            count: default_ant_count(),
            memory_size: default_memory_size(),
            record_paths: false,
        }
    }
}

impl Default for MovementConfig {
    fn default() -> Self {
        MovementConfig { direction_weights: default_direction_weights() }
    }
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        BehaviorConfig { prob_relu: default_prob_relu() }
    }
}

impl Default for ObjectDistribution {
    fn default() -> Self {
        ObjectDistribution {
            food: default_object_prob(),
            waste: default_object_prob(),
            egg: default_object_prob(),
            empty: default_empty_prob(),
        }
    }
}

impl Default for SweepConfig {
    fn default() -> Self {
        SweepConfig {
            threshold_start: 0,
            threshold_end: default_threshold_end(),
            threshold_interval: default_sweep_interval(),
            cooldown_start: default_sweep_interval(),
            cooldown_end: default_sweep_interval(),
            cooldown_interval: default_sweep_interval(),
        }
    }
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        ExperimentConfig {
            runs: default_runs(),
            iterations: default_iterations(),
            sample_interval: default_sample_interval(),
            seed: None,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        OutputConfig {
            csv_filename: default_csv_filename(),
            save_metadata: true,
            save_snapshots: false,
            format: None,
        }
    }
}

impl ObjectDistribution {
    /// Weighted outcomes in a fixed order; `None` is an empty cell.
    pub fn outcomes(&self) -> [(Option<ObjectType>, f64); 4] {
        [
            (Some(ObjectType::Food), self.food),
            (Some(ObjectType::Waste), self.waste),
            (Some(ObjectType::Egg), self.egg),
            (None, self.empty),
        ]
    }
}

// Main simulation configuration structure, loaded from a TOML file.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
pub struct SimulationConfig {
    #[serde(default)]
    pub grid: GridConfig,
    #[serde(default)]
    pub agents: AgentConfig,
    #[serde(default)]
    pub movement: MovementConfig,
    #[serde(default)]
    pub behavior: BehaviorConfig,
    #[serde(default)]
    pub objects: ObjectDistribution,
    #[serde(default)]
    pub sweep: SweepConfig,
    #[serde(default)]
    pub experiment: ExperimentConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

impl SimulationConfig {
    /// Loads the simulation configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_ref = path.as_ref();

        let config_str = std::fs::read_to_string(path_ref)
            .map_err(|e| anyhow::anyhow!("Failed to read config file '{}': {}", path_ref.display(), e))?;
        let config = Self::from_toml_str(&config_str)
            .map_err(|e| anyhow::anyhow!("Invalid config '{}': {}", path_ref.display(), e))?;
        Ok(config)
    }

    /// Parses and validates a configuration from TOML text.
    pub fn from_toml_str(config_str: &str) -> Result<Self> {
        let config: SimulationConfig = toml::from_str(config_str)
            .map_err(|e| anyhow::anyhow!("Failed to parse TOML: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks every value the simulation relies on.
    pub fn validate(&self) -> Result<()> {
        if self.grid.width <= 0 || self.grid.length <= 0 {
            anyhow::bail!(
                "grid dimensions must be positive (got {}x{}).",
                self.grid.width, self.grid.length
            );
        }
        if self.agents.memory_size == 0 {
            anyhow::bail!("memory_size must be at least 1.");
        }
        normalize_weights(&self.movement.direction_weights)?;

        let [low, high] = self.behavior.prob_relu;
        if !(0.0..=1.0).contains(&low) || !(0.0..=1.0).contains(&high) || low > high {
            anyhow::bail!("prob_relu must satisfy 0 <= low <= high <= 1 (got [{}, {}]).", low, high);
        }

        let outcomes = self.objects.outcomes();
        if outcomes.iter().any(|(_, p)| !p.is_finite() || *p < 0.0) {
            anyhow::bail!("object probabilities must be non-negative.");
        }
        if outcomes.iter().map(|(_, p)| p).sum::<f64>() <= 0.0 {
            anyhow::bail!("object probabilities must not all be zero.");
        }

        let s = &self.sweep;
        if s.threshold_interval == 0 || s.cooldown_interval == 0 {
            anyhow::bail!("sweep intervals must be greater than 0.");
        }
        if s.threshold_start > s.threshold_end {
            anyhow::bail!("threshold_start ({}) exceeds threshold_end ({}).", s.threshold_start, s.threshold_end);
        }
        if s.cooldown_start > s.cooldown_end {
            anyhow::bail!("cooldown_start ({}) exceeds cooldown_end ({}).", s.cooldown_start, s.cooldown_end);
        }

        if self.experiment.runs == 0 {
            anyhow::bail!("runs must be greater than 0.");
        }
        if self.experiment.iterations == 0 {
            anyhow::bail!("iterations must be greater than 0.");
        }
        if self.experiment.sample_interval == 0 {
            anyhow::bail!("sample_interval must be greater than 0.");
        }
        Ok(())
    }

    /// Every (cooldown, threshold) combination of the sweep, cooldown outermost.
    pub fn sweep_points(&self) -> Vec<(u32, u32)> {
        let s = &self.sweep;
        let cooldowns = (s.cooldown_start..=s.cooldown_end).step_by(s.cooldown_interval.max(1) as usize);
        cooldowns
            .flat_map(|cooldown| {
                (s.threshold_start..=s.threshold_end)
                    .step_by(s.threshold_interval.max(1) as usize)
                    .map(move |threshold| (cooldown, threshold))
            })
            .collect()
    }

    /// Converts the configuration into the runtime parameters of one sweep point.
    pub fn get_sim_params(&self, similarity_threshold: u32, interaction_cooldown: u32) -> Result<SimParams> {
        let direction_weights = normalize_weights(&self.movement.direction_weights)?;
        Ok(SimParams {
            width: self.grid.width,
            length: self.grid.length,
            direction_weights,
            relu_low: self.behavior.prob_relu[0],
            relu_high: self.behavior.prob_relu[1],
            similarity_threshold,
            interaction_cooldown,
            memory_size: self.agents.memory_size,
            record_paths: self.agents.record_paths,
        })
    }
}

/// Scales eight non-negative weights so they sum to 1.
pub fn normalize_weights(weights: &[f64]) -> Result<[f64; NUM_DIRECTIONS]> {
    if weights.len() != NUM_DIRECTIONS {
        anyhow::bail!("direction_weights needs {} entries, got {}.", NUM_DIRECTIONS, weights.len());
    }
    if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
        anyhow::bail!("direction_weights must be finite and non-negative.");
    }
    let sum: f64 = weights.iter().sum();
    if sum <= 0.0 {
        anyhow::bail!("direction_weights must not all be zero.");
    }
    let mut normalized = [0.0; NUM_DIRECTIONS];
    for (out, w) in normalized.iter_mut().zip(weights) {
        *out = w / sum;
    }
    Ok(normalized)
}
