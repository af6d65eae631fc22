use clustering_common::Position;
use thiserror::Error;

/// Errors raised by the simulation core.
#[derive(Debug, Error)]
pub enum SimError {
    /// The lattice needs at least one cell in each dimension.
    #[error("invalid grid dimensions {width}x{length}: width and length must be positive")]
    InvalidDimensions { width: i32, length: i32 },
    /// Direction weights could not form a distribution.
    #[error("invalid direction weights: {0}")]
    InvalidWeights(String),
    /// Ramp bounds outside 0 <= a <= b <= 1.
    #[error("invalid ramp bounds [{low}, {high}]: expected 0 <= low <= high <= 1")]
    InvalidRamp { low: f64, high: f64 },
    /// Object placement probabilities could not form a distribution.
    #[error("invalid object distribution: {0}")]
    InvalidDistribution(String),
    #[error("memory size must be at least 1")]
    ZeroMemory,
    /// A position that is not a cell of the lattice.
    #[error("position ({}, {}) is outside the {width}x{length} grid", .position.x, .position.y)]
    PositionOutOfBounds { position: Position, width: i32, length: i32 },
}

pub type SimResult<T> = Result<T, SimError>;
