use crate::core::masking::NoDataPolicy;
use crate::types::{ClassCode, CompareError, CompareResult};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration of a two-layer comparison run.
///
/// Every option is checked once by [`validate`](CompareConfig::validate)
/// before any data is touched; nothing is re-interpreted downstream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompareConfig {
    /// Sentinel marking invalid samples
    pub nodata_value: Option<ClassCode>,
    /// NoData filtering mode applied before tabulation
    #[serde(default)]
    pub nodata_policy: NoDataPolicy,
    /// Destination of the text report, when one is written
    #[serde(default)]
    pub output_path: Option<PathBuf>,
}

impl Default for CompareConfig {
    fn default() -> Self {
        // the historical batch defaults: sentinel 0, left-layer filtering
        Self {
            nodata_value: Some(0),
            nodata_policy: NoDataPolicy::FilterByLeft,
            output_path: None,
        }
    }
}

impl CompareConfig {
    pub fn validate(&self) -> CompareResult<()> {
        if self.nodata_policy != NoDataPolicy::Keep && self.nodata_value.is_none() {
            return Err(CompareError::InvalidConfig(format!(
                "nodata_policy {:?} requires a nodata_value",
                self.nodata_policy
            )));
        }
        Ok(())
    }
}

/// Configuration of the density-scatter statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScatterConfig {
    /// 1-based column of the X axis in the input table
    pub x_column: usize,
    /// 1-based column of the Y axis in the input table
    pub y_column: usize,
    /// Skip the first input line as a header
    #[serde(default)]
    pub has_header: bool,
    /// Sentinel removed from both axes before analysis
    #[serde(default)]
    pub nodata_value: Option<f64>,
    /// Decimate towards this point count before density estimation
    #[serde(default)]
    pub target_points: Option<usize>,
    /// Fit a regression polynomial of this order (1 to 5)
    #[serde(default)]
    pub regression_order: Option<usize>,
}

impl Default for ScatterConfig {
    fn default() -> Self {
        Self {
            x_column: 1,
            y_column: 2,
            has_header: false,
            nodata_value: None,
            target_points: None,
            regression_order: None,
        }
    }
}

impl ScatterConfig {
    pub fn validate(&self) -> CompareResult<()> {
        if self.x_column < 1 || self.y_column < 1 {
            return Err(CompareError::InvalidConfig(format!(
                "column indices are 1-based, got x={} y={}",
                self.x_column, self.y_column
            )));
        }
        if self.x_column == self.y_column {
            return Err(CompareError::InvalidConfig(format!(
                "x_column and y_column must differ, both are {}",
                self.x_column
            )));
        }
        if let Some(points) = self.target_points {
            if points < 2 {
                return Err(CompareError::InvalidConfig(format!(
                    "target_points must be at least 2, got {}",
                    points
                )));
            }
        }
        if let Some(order) = self.regression_order {
            if !(1..=5).contains(&order) {
                return Err(CompareError::InvalidConfig(format!(
                    "regression_order must be between 1 and 5, got {}",
                    order
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_compare_config_is_valid() {
        assert!(CompareConfig::default().validate().is_ok());
    }

    #[test]
    fn test_filtering_without_sentinel_is_rejected() {
        let config = CompareConfig {
            nodata_value: None,
            ..CompareConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(CompareError::InvalidConfig(_))
        ));

        let config = CompareConfig {
            nodata_value: None,
            nodata_policy: NoDataPolicy::Keep,
            output_path: None,
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_scatter_config_checks_columns_and_order() {
        assert!(ScatterConfig::default().validate().is_ok());

        let same_columns = ScatterConfig {
            x_column: 3,
            y_column: 3,
            ..ScatterConfig::default()
        };
        assert!(same_columns.validate().is_err());

        let zero_column = ScatterConfig {
            x_column: 0,
            ..ScatterConfig::default()
        };
        assert!(zero_column.validate().is_err());

        let bad_order = ScatterConfig {
            regression_order: Some(9),
            ..ScatterConfig::default()
        };
        assert!(bad_order.validate().is_err());

        let tiny_target = ScatterConfig {
            target_points: Some(1),
            ..ScatterConfig::default()
        };
        assert!(tiny_target.validate().is_err());
    }
}
