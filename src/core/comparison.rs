use crate::config::CompareConfig;
use crate::core::contingency::ContingencyMatrix;
use crate::core::frequency::{verify_totals, FrequencyTable};
use crate::core::masking::{self, LayerSummary};
use crate::types::{ClassCode, CompareError, CompareResult};
use num_traits::PrimInt;
use std::time::Instant;

/// Full result of a two-layer comparison
#[derive(Debug, Clone)]
pub struct LayerComparison {
    pub left_summary: LayerSummary,
    pub right_summary: LayerSummary,
    pub left_frequencies: FrequencyTable,
    pub right_frequencies: FrequencyTable,
    pub matrix: ContingencyMatrix,
    /// Samples per layer before NoData filtering
    pub input_samples: usize,
}

impl LayerComparison {
    /// Samples that survived filtering and entered the matrix
    pub fn valid_samples(&self) -> u64 {
        self.matrix.grand_total()
    }
}

/// One line of a site-ID breakdown: the classes observed inside a site,
/// ascending, with their pixel counts. Classes absent from the site are not
/// listed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteRow {
    pub site_id: ClassCode,
    pub classes: Vec<(ClassCode, u64)>,
}

impl SiteRow {
    pub fn n_items(&self) -> usize {
        self.classes.len()
    }
}

/// Per-site class counts for a site-ID layer against a classification layer
#[derive(Debug, Clone)]
pub struct SiteBreakdown {
    /// Pixel count per site ID over the filtered input
    pub site_frequencies: FrequencyTable,
    pub rows: Vec<SiteRow>,
}

/// Batch comparison of two aligned thematic layers.
///
/// The processor runs the whole linear pipeline: NoData diagnostics,
/// filtering per the configured policy, independent frequency tabulation of
/// both layers, the cross-layer total verification, and the contingency
/// matrix itself.
pub struct ComparisonProcessor {
    config: CompareConfig,
}

impl ComparisonProcessor {
    /// Create a processor, rejecting inconsistent configuration up front
    pub fn new(config: CompareConfig) -> CompareResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &CompareConfig {
        &self.config
    }

    /// Compare two aligned categorical layers.
    ///
    /// Accepts any primitive integer sample type that widens losslessly into
    /// [`ClassCode`], so 8-bit classification channels and 32-bit site-ID
    /// channels go through the same path.
    pub fn compare<T>(&self, left: &[T], right: &[T]) -> CompareResult<LayerComparison>
    where
        T: PrimInt + Into<ClassCode>,
    {
        let started = Instant::now();
        let input_samples = left.len();

        log::info!(
            "comparing two thematic layers ({} samples, policy {:?})",
            input_samples,
            self.config.nodata_policy
        );

        let left_wide = widen(left);
        let right_wide = widen(right);

        let pair = masking::apply_policy(
            &left_wide,
            &right_wide,
            self.config.nodata_value,
            self.config.nodata_policy,
        )?;

        log::info!(
            "NoData samples: layer 1 {} ({}%), layer 2 {} ({}%)",
            pair.left_summary.nodata_samples,
            pair.left_summary.nodata_percentage(),
            pair.right_summary.nodata_samples,
            pair.right_summary.nodata_percentage()
        );

        let left_frequencies = FrequencyTable::from_samples(&pair.left);
        let right_frequencies = FrequencyTable::from_samples(&pair.right);
        verify_totals(&left_frequencies, &right_frequencies)?;

        if pair.left.is_empty() {
            return Err(CompareError::EmptyInput {
                total: input_samples,
                removed: input_samples,
            });
        }

        let matrix = ContingencyMatrix::build(&pair.left, &pair.right)?;

        log::info!(
            "comparison completed in {:.2} s ({} x {} classes, {} valid samples)",
            started.elapsed().as_secs_f64(),
            matrix.n_rows(),
            matrix.n_cols(),
            matrix.grand_total()
        );

        Ok(LayerComparison {
            left_summary: pair.left_summary,
            right_summary: pair.right_summary,
            left_frequencies,
            right_frequencies,
            matrix,
            input_samples,
        })
    }

    /// Count, for every site ID in the left layer, the classification codes
    /// of the right layer inside that site. Rows carry only the classes that
    /// actually occur, matching the sparse site reports of the batch tools.
    pub fn site_breakdown<T>(&self, sites: &[T], classes: &[T]) -> CompareResult<SiteBreakdown>
    where
        T: PrimInt + Into<ClassCode>,
    {
        let comparison = self.compare(sites, classes)?;

        let rows = (0..comparison.matrix.n_rows())
            .map(|row| SiteRow {
                site_id: comparison.matrix.row_labels()[row],
                classes: comparison.matrix.sparse_row(row),
            })
            .collect();

        Ok(SiteBreakdown {
            site_frequencies: comparison.left_frequencies,
            rows,
        })
    }
}

fn widen<T>(samples: &[T]) -> Vec<ClassCode>
where
    T: PrimInt + Into<ClassCode>,
{
    samples.iter().map(|&s| s.into()).collect()
}
