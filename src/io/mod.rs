//! I/O modules for report serialization and delimited-table ingestion

pub mod report;
pub mod table;

pub use report::{comparison_report, scatter_report, site_report, Cell, Report};
pub use table::read_scatter_columns;
