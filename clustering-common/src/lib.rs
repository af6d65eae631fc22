pub mod config;
pub mod lattice;
pub mod sim_params;
pub mod snapshot;

// Re-export key types for easier use by dependent crates
pub use config::{SimulationConfig, GridConfig, AgentConfig, MovementConfig, BehaviorConfig, ObjectDistribution, SweepConfig, ExperimentConfig, OutputConfig, normalize_weights, DEFAULT_DIRECTION_WEIGHTS};
pub use lattice::{Direction, ObjectType, Position, DIRECTION_OFFSETS, NUM_DIRECTIONS};
pub use sim_params::SimParams;
pub use snapshot::{AntView, MetricSample, WorldSnapshot};
