use ndarray::{Array1, Array2};

/// Canonical widened class code. Thematic channels arrive as 8-bit or
/// 32-bit integers depending on the product; every supported sample type
/// converts losslessly into this.
pub type ClassCode = i64;

/// 2D thematic raster channel (lines x pixels)
pub type ClassImage = Array2<i32>;

/// Flattened sample vector of a thematic channel
pub type ClassSamples = Array1<i32>;

/// Error types for layer comparison and tabulation
#[derive(Debug, thiserror::Error)]
pub enum CompareError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("input layers have different lengths: left has {left} samples, right has {right}")]
    ShapeMismatch { left: usize, right: usize },

    #[error("per-layer totals disagree after NoData filtering: left retained {left} samples, right retained {right}")]
    SumMismatch { left: u64, right: u64 },

    #[error("no valid samples left to tabulate ({removed} of {total} removed by NoData filtering)")]
    EmptyInput { total: usize, removed: usize },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("processing error: {0}")]
    Processing(String),
}

/// Result type for comparison operations
pub type CompareResult<T> = Result<T, CompareError>;
