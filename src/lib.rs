//! rastertab: A Fast, Modular Thematic Raster Cross-Tabulation Toolkit
//!
//! This library compares thematic classification rasters by unique-value
//! frequency analysis and dense contingency (confusion) matrices, and computes
//! the point-density statistics behind continuous-layer scatter plots.
//! Raster decoding stays with the upstream readers; the toolkit operates on
//! aligned in-memory sample arrays and serializes flat delimited reports.

pub mod types;
pub mod config;
pub mod core;
pub mod io;

// Re-export main types and functions for easier access
pub use types::{ClassCode, ClassImage, ClassSamples, CompareError, CompareResult};

pub use config::{CompareConfig, ScatterConfig};
pub use crate::core::{
    density_order, verify_totals, ComparisonProcessor, ContingencyMatrix, FrequencyTable,
    LayerComparison, LayerSummary, NoDataPolicy, PolyFit, SampleFilter, ScatterSeries,
    SiteBreakdown, SiteRow,
};
pub use io::{comparison_report, scatter_report, site_report, Report};
