use crate::core::comparison::{LayerComparison, SiteBreakdown};
use crate::core::scatter::{PolyFit, SampleFilter};
use crate::types::CompareResult;
use std::fmt::Write as _;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// A single report value. Formatting is deferred to serialization so the
/// computation side never deals in strings.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Int(i64),
    Count(u64),
    /// Two-decimal fixed formatting (percentages)
    Float2(f64),
    /// Six-decimal fixed formatting (correlation and fit coefficients)
    Float6(f64),
}

impl Cell {
    pub fn text(value: &str) -> Self {
        Cell::Text(value.to_string())
    }

    fn render(&self, out: &mut String) {
        match self {
            Cell::Text(value) => out.push_str(value),
            Cell::Int(value) => {
                let _ = write!(out, "{}", value);
            }
            Cell::Count(value) => {
                let _ = write!(out, "{}", value);
            }
            Cell::Float2(value) => {
                let _ = write!(out, "{:.2}", value);
            }
            Cell::Float6(value) => {
                let _ = write!(out, "{:.6}", value);
            }
        }
    }
}

/// Flat semicolon-delimited report, assembled in memory and serialized once.
/// Identical inputs always serialize to identical bytes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Report {
    rows: Vec<Vec<Cell>>,
}

impl Report {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_row(&mut self, row: Vec<Cell>) {
        self.rows.push(row);
    }

    pub fn push_text(&mut self, text: &str) {
        self.rows.push(vec![Cell::text(text)]);
    }

    pub fn push_blank(&mut self) {
        self.rows.push(Vec::new());
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Serialize every row, cells joined by `;`, one row per line
    pub fn to_delimited(&self) -> String {
        let mut out = String::new();
        for row in &self.rows {
            for (i, cell) in row.iter().enumerate() {
                if i > 0 {
                    out.push(';');
                }
                cell.render(&mut out);
            }
            out.push('\n');
        }
        out
    }

    /// Write the serialized report to disk in one shot
    pub fn write_to(&self, path: &Path) -> CompareResult<()> {
        log::info!("writing report to {}", path.display());
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        writer.write_all(self.to_delimited().as_bytes())?;
        writer.flush()?;
        Ok(())
    }
}

/// Assemble the comparison report: NoData diagnostics, per-layer unique
/// values and frequencies, the cross-layer pixel-count verification figures,
/// then the dense contingency table with raw counts and row percentages.
pub fn comparison_report(comparison: &LayerComparison) -> Report {
    let mut report = Report::new();

    report.push_row(vec![
        Cell::text("Samples per layer"),
        Cell::Count(comparison.input_samples as u64),
    ]);
    report.push_row(vec![
        Cell::text("NoData samples (layer 1)"),
        Cell::Count(comparison.left_summary.nodata_samples as u64),
        Cell::Float2(comparison.left_summary.nodata_percentage()),
    ]);
    report.push_row(vec![
        Cell::text("NoData samples (layer 2)"),
        Cell::Count(comparison.right_summary.nodata_samples as u64),
        Cell::Float2(comparison.right_summary.nodata_percentage()),
    ]);
    report.push_blank();

    for (name, table) in [
        ("layer 1", &comparison.left_frequencies),
        ("layer 2", &comparison.right_frequencies),
    ] {
        let mut values = vec![Cell::Text(format!("Unique values ({})", name))];
        values.extend(table.codes().iter().map(|&c| Cell::Int(c)));
        report.push_row(values);

        let mut counts = vec![Cell::Text(format!("Frequencies ({})", name))];
        counts.extend(table.counts().iter().map(|&c| Cell::Count(c)));
        report.push_row(counts);
    }
    report.push_row(vec![
        Cell::text("Valid samples (layer 1)"),
        Cell::Count(comparison.left_frequencies.total()),
    ]);
    report.push_row(vec![
        Cell::text("Valid samples (layer 2)"),
        Cell::Count(comparison.right_frequencies.total()),
    ]);
    report.push_blank();

    let matrix = &comparison.matrix;

    let mut header = vec![Cell::text("class"), Cell::text("items")];
    header.extend(matrix.col_labels().iter().map(|&c| Cell::Int(c)));
    header.push(Cell::text("pct"));
    header.extend(matrix.col_labels().iter().map(|&c| Cell::Int(c)));
    report.push_row(header);

    for row in 0..matrix.n_rows() {
        let mut cells = vec![
            Cell::Int(matrix.row_labels()[row]),
            Cell::Count(matrix.row_total(row)),
        ];
        cells.extend(matrix.row(row).iter().map(|&c| Cell::Count(c)));
        cells.push(Cell::text("pct"));
        cells.extend(matrix.row_percentages(row).into_iter().map(Cell::Float2));
        report.push_row(cells);
    }

    report
}

/// Assemble the site report: one line per site ID with the number of
/// distinct classes, the class codes, then the counts
pub fn site_report(breakdown: &SiteBreakdown) -> Report {
    let mut report = Report::new();

    report.push_row(vec![
        Cell::text("Site IDs"),
        Cell::Count(breakdown.site_frequencies.len() as u64),
    ]);
    report.push_blank();

    for row in &breakdown.rows {
        let mut cells = vec![Cell::Int(row.site_id), Cell::Count(row.n_items() as u64)];
        cells.extend(row.classes.iter().map(|&(code, _)| Cell::Int(code)));
        cells.extend(row.classes.iter().map(|&(_, count)| Cell::Count(count)));
        report.push_row(cells);
    }

    report
}

/// Assemble the scatter-statistics report fed by the density pipeline
pub fn scatter_report(
    sample_count: usize,
    filter: Option<&SampleFilter>,
    correlation: f64,
    fit: Option<&PolyFit>,
) -> Report {
    let mut report = Report::new();

    report.push_row(vec![
        Cell::text("Samples analysed"),
        Cell::Count(sample_count as u64),
    ]);
    if let Some(filter) = filter {
        report.push_row(vec![
            Cell::text("NoData samples removed"),
            Cell::Count(filter.removed_samples as u64),
            Cell::Float2(filter.retained_percentage()),
        ]);
    }
    report.push_row(vec![
        Cell::text("Correlation coefficient"),
        Cell::Float6(correlation),
    ]);
    if let Some(fit) = fit {
        report.push_row(vec![
            Cell::text("Polynomial order"),
            Cell::Count(fit.order() as u64),
        ]);
        let mut coefficients = vec![Cell::text("Coefficients (highest order first)")];
        coefficients.extend(fit.coefficients.iter().map(|&c| Cell::Float6(c)));
        report.push_row(coefficients);
        report.push_row(vec![Cell::text("R squared"), Cell::Float6(fit.r_squared)]);
    }

    report
}
