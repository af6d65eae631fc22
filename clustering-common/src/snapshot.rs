use serde::{Serialize, Deserialize};
use crate::lattice::{ObjectType, Position};

/// One periodic sample of a replica: a row of the metrics CSV.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSample {
    #[serde(rename = "Cooldown")]
    pub cooldown: u32,
    #[serde(rename = "Threshold")]
    pub threshold: u32,
    /// 1-based replica number within its parameter combination.
    #[serde(rename = "Run")]
    pub run: u32,
    #[serde(rename = "Iteration")]
    pub iteration: u32,
    #[serde(rename = "ClusterSize")]
    pub average_cluster_size: f64,
    #[serde(rename = "InteractionCount")]
    pub interaction_count: u64,
}

/// Read-only view of one ant for rendering and dumps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AntView {
    pub position: Position,
    pub previous_direction: u8,
    pub carried: Option<ObjectType>,
    /// Memory as integer type codes, oldest first.
    pub memory: Vec<u8>,
    pub cooldown: u32,
}

/// A snapshot of the world state at a specific iteration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldSnapshot {
    pub iteration: u32,
    pub width: i32,
    pub length: i32,
    pub interaction_count: u64,
    pub average_cluster_size: f64,
    pub ants: Vec<AntView>,
    /// Occupied cells in row-major order.
    pub objects: Vec<(Position, ObjectType)>,
    // Sweep point and replica this snapshot came from; filled in by the driver.
    #[serde(default)]
    pub cooldown: u32,
    #[serde(default)]
    pub threshold: u32,
    #[serde(default)]
    pub run: u32,
}
