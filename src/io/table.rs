use crate::config::ScatterConfig;
use crate::core::scatter::ScatterSeries;
use crate::types::{CompareError, CompareResult};
use std::path::Path;

/// Read two float columns from a comma-delimited text file.
///
/// Column indices in the configuration are 1-based, the way the batch
/// operators count channels. Parse failures name the offending record and
/// field instead of aborting with a bare error.
pub fn read_scatter_columns(path: &Path, config: &ScatterConfig) -> CompareResult<ScatterSeries> {
    config.validate()?;

    log::info!("reading scatter input from {}", path.display());

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(config.has_header)
        .trim(csv::Trim::All)
        .flexible(true)
        .from_path(path)?;

    let x_index = config.x_column - 1;
    let y_index = config.y_column - 1;

    let mut x = Vec::new();
    let mut y = Vec::new();
    for (record_no, record) in reader.records().enumerate() {
        let record = record?;
        x.push(parse_field(&record, x_index, record_no)?);
        y.push(parse_field(&record, y_index, record_no)?);
    }

    if x.is_empty() {
        return Err(CompareError::EmptyInput {
            total: 0,
            removed: 0,
        });
    }

    log::info!("read {} sample pairs", x.len());
    ScatterSeries::new(x, y)
}

fn parse_field(record: &csv::StringRecord, index: usize, record_no: usize) -> CompareResult<f64> {
    let field = record.get(index).ok_or_else(|| {
        CompareError::Processing(format!(
            "record {}: missing column {}",
            record_no + 1,
            index + 1
        ))
    })?;
    field.parse().map_err(|_| {
        CompareError::Processing(format!(
            "record {}: '{}' is not a number",
            record_no + 1,
            field
        ))
    })
}
