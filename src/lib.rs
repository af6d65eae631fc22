//! Grid-based ant sorting simulation: ants wander a bounded lattice, pick up and drop typed
//! objects depending on the local density of their kind, and meet each other when their
//! memories agree. Many independent replicas run in parallel for parameter sweeps.

pub mod ant;
pub mod cluster;
pub mod error;
pub mod experiment;
pub mod grid;
pub mod output;
pub mod world;

pub use ant::{rotate_weights, Ant, DirectionSampler};
pub use error::{SimError, SimResult};
pub use experiment::{replica_seed, run_replica, run_sweep, ReplicaOutcome, ReplicaSpec, SweepSummary};
pub use grid::NeighborTable;
pub use output::{MetricsWriter, CSV_HEADER};
pub use world::{count_same_type_neighbors, relu_ramp, ObjectCounts, World};

// Shared lattice types and configuration
pub use clustering_common as common;
