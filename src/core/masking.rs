use crate::types::{ClassCode, CompareError, CompareResult};
use serde::{Deserialize, Serialize};

/// NoData filtering applied to a layer pair before tabulation.
///
/// The historical batch tools only ever checked the first layer's sentinel
/// and dropped the matching indices from both layers. That behavior is kept
/// selectable as `FilterByLeft` rather than silently "fixed"; the symmetric
/// and per-layer alternatives are explicit modes of their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoDataPolicy {
    /// Keep every sample
    Keep,
    /// Drop indices where the left layer equals the sentinel; the right
    /// layer is filtered positionally, never against its own values
    FilterByLeft,
    /// Drop indices where either layer equals the sentinel
    FilterByUnion,
    /// Filter each layer against its own sentinel occurrences. The retained
    /// lengths can disagree when the NoData patterns are inconsistent, which
    /// the downstream total verification reports as a `SumMismatch`.
    FilterIndependent,
}

impl Default for NoDataPolicy {
    fn default() -> Self {
        NoDataPolicy::FilterByLeft
    }
}

/// Per-layer NoData diagnostics, computed on the unfiltered input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayerSummary {
    pub total_samples: usize,
    pub nodata_samples: usize,
}

impl LayerSummary {
    /// Samples that carry an actual observation
    pub fn valid_samples(&self) -> usize {
        self.total_samples - self.nodata_samples
    }

    /// NoData share of the layer, rounded to 2 decimals
    pub fn nodata_percentage(&self) -> f64 {
        if self.total_samples == 0 {
            return 0.0;
        }
        let pct = (self.nodata_samples as f64 / self.total_samples as f64) * 100.0;
        (pct * 100.0).round() / 100.0
    }
}

/// Outcome of NoData filtering on a layer pair
#[derive(Debug, Clone)]
pub struct MaskedPair {
    pub left: Vec<ClassCode>,
    pub right: Vec<ClassCode>,
    pub left_summary: LayerSummary,
    pub right_summary: LayerSummary,
}

fn summarize(samples: &[ClassCode], sentinel: Option<ClassCode>) -> LayerSummary {
    let nodata_samples = match sentinel {
        Some(nd) => samples.iter().filter(|&&s| s == nd).count(),
        None => 0,
    };
    LayerSummary {
        total_samples: samples.len(),
        nodata_samples,
    }
}

/// Apply a NoData policy to an aligned layer pair.
///
/// The summaries always report each layer's own sentinel occurrences over
/// the unfiltered input, regardless of the policy, so the diagnostics match
/// what the policy decides to remove only in the symmetric cases.
pub fn apply_policy(
    left: &[ClassCode],
    right: &[ClassCode],
    sentinel: Option<ClassCode>,
    policy: NoDataPolicy,
) -> CompareResult<MaskedPair> {
    if left.len() != right.len() {
        return Err(CompareError::ShapeMismatch {
            left: left.len(),
            right: right.len(),
        });
    }

    let left_summary = summarize(left, sentinel);
    let right_summary = summarize(right, sentinel);

    let nd = match (policy, sentinel) {
        (NoDataPolicy::Keep, _) => {
            return Ok(MaskedPair {
                left: left.to_vec(),
                right: right.to_vec(),
                left_summary,
                right_summary,
            });
        }
        (_, Some(nd)) => nd,
        (_, None) => {
            return Err(CompareError::InvalidConfig(format!(
                "NoData policy {:?} requires a nodata_value",
                policy
            )));
        }
    };

    let (filtered_left, filtered_right) = match policy {
        NoDataPolicy::Keep => unreachable!("handled above"),
        NoDataPolicy::FilterByLeft => left
            .iter()
            .zip(right.iter())
            .filter(|(&l, _)| l != nd)
            .map(|(&l, &r)| (l, r))
            .unzip(),
        NoDataPolicy::FilterByUnion => left
            .iter()
            .zip(right.iter())
            .filter(|(&l, &r)| l != nd && r != nd)
            .map(|(&l, &r)| (l, r))
            .unzip(),
        NoDataPolicy::FilterIndependent => {
            let fl: Vec<ClassCode> = left.iter().copied().filter(|&l| l != nd).collect();
            let fr: Vec<ClassCode> = right.iter().copied().filter(|&r| r != nd).collect();
            (fl, fr)
        }
    };

    log::debug!(
        "NoData filtering ({:?}, sentinel {}): left {} -> {}, right {} -> {}",
        policy,
        nd,
        left.len(),
        filtered_left.len(),
        right.len(),
        filtered_right.len()
    );

    Ok(MaskedPair {
        left: filtered_left,
        right: filtered_right,
        left_summary,
        right_summary,
    })
}
