use crate::types::{CompareError, CompareResult};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Paired continuous samples feeding the density-scatter statistics
#[derive(Debug, Clone, PartialEq)]
pub struct ScatterSeries {
    x: Vec<f64>,
    y: Vec<f64>,
}

/// NoData removal bookkeeping for a scatter input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleFilter {
    pub original_samples: usize,
    pub removed_samples: usize,
}

impl SampleFilter {
    pub fn retained_samples(&self) -> usize {
        self.original_samples - self.removed_samples
    }

    /// Share of the original samples that survived, rounded to 2 decimals
    pub fn retained_percentage(&self) -> f64 {
        if self.original_samples == 0 {
            return 0.0;
        }
        let pct = (self.retained_samples() as f64 / self.original_samples as f64) * 100.0;
        (pct * 100.0).round() / 100.0
    }
}

/// Least-squares polynomial fit of a scatter series
#[derive(Debug, Clone)]
pub struct PolyFit {
    /// Coefficients, highest order first
    pub coefficients: Vec<f64>,
    /// Coefficient of determination against the fitted data
    pub r_squared: f64,
}

impl PolyFit {
    pub fn order(&self) -> usize {
        self.coefficients.len() - 1
    }

    /// Evaluate the fitted polynomial at `x` (Horner form)
    pub fn evaluate(&self, x: f64) -> f64 {
        self.coefficients.iter().fold(0.0, |acc, &c| acc * x + c)
    }
}

impl ScatterSeries {
    /// Pair two axis vectors of equal length
    pub fn new(x: Vec<f64>, y: Vec<f64>) -> CompareResult<Self> {
        if x.len() != y.len() {
            return Err(CompareError::ShapeMismatch {
                left: x.len(),
                right: y.len(),
            });
        }
        Ok(Self { x, y })
    }

    /// Remove a NoData sentinel from each axis independently.
    ///
    /// Each axis drops its own sentinel occurrences; if the two retained
    /// counts disagree the NoData patterns were inconsistent and no series
    /// is produced. Matching counts with differing drop positions pass — the
    /// caller is responsible for aligned NoData patterns.
    pub fn filter_nodata(
        x: &[f64],
        y: &[f64],
        nodata: f64,
    ) -> CompareResult<(Self, SampleFilter)> {
        if x.len() != y.len() {
            return Err(CompareError::ShapeMismatch {
                left: x.len(),
                right: y.len(),
            });
        }

        let fx: Vec<f64> = x.iter().copied().filter(|&v| v != nodata).collect();
        let fy: Vec<f64> = y.iter().copied().filter(|&v| v != nodata).collect();

        if fx.len() != fy.len() {
            return Err(CompareError::SumMismatch {
                left: fx.len() as u64,
                right: fy.len() as u64,
            });
        }

        let filter = SampleFilter {
            original_samples: x.len(),
            removed_samples: x.len() - fx.len(),
        };

        log::info!(
            "NoData removal: {} of {} samples removed ({}% retained)",
            filter.removed_samples,
            filter.original_samples,
            filter.retained_percentage()
        );

        Ok((Self { x: fx, y: fy }, filter))
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    pub fn x(&self) -> &[f64] {
        &self.x
    }

    pub fn y(&self) -> &[f64] {
        &self.y
    }

    /// Systematic decimation towards a target point count for rendering.
    ///
    /// Keeps every k-th sample where `k = round(n / target)`; returns the
    /// decimated series and the factor actually applied (1 = no reduction).
    pub fn decimate(&self, target_points: usize) -> (Self, usize) {
        if target_points == 0 || self.len() <= target_points {
            return (self.clone(), 1);
        }

        let factor = ((self.len() as f64 / target_points as f64).round() as usize).max(1);
        let x: Vec<f64> = self.x.iter().copied().step_by(factor).collect();
        let y: Vec<f64> = self.y.iter().copied().step_by(factor).collect();

        log::info!(
            "decimation factor {}: {} of {} points kept",
            factor,
            x.len(),
            self.len()
        );

        (Self { x, y }, factor)
    }

    /// Pearson correlation coefficient of the two axes
    pub fn correlation(&self) -> CompareResult<f64> {
        let n = self.len();
        if n < 2 {
            return Err(CompareError::Processing(format!(
                "correlation needs at least 2 samples, got {}",
                n
            )));
        }

        let mean_x = mean(&self.x);
        let mean_y = mean(&self.y);

        let mut cov = 0.0;
        let mut var_x = 0.0;
        let mut var_y = 0.0;
        for (&xi, &yi) in self.x.iter().zip(self.y.iter()) {
            let dx = xi - mean_x;
            let dy = yi - mean_y;
            cov += dx * dy;
            var_x += dx * dx;
            var_y += dy * dy;
        }

        if var_x == 0.0 || var_y == 0.0 {
            return Err(CompareError::Processing(
                "correlation is undefined for a zero-variance axis".to_string(),
            ));
        }

        Ok(cov / (var_x.sqrt() * var_y.sqrt()))
    }

    /// Least-squares polynomial fit via the normal equations.
    ///
    /// Coefficients come back highest order first. Orders 1 through 5 are
    /// supported, matching the regression-line options of the batch tools.
    pub fn polyfit(&self, order: usize) -> CompareResult<PolyFit> {
        if !(1..=5).contains(&order) {
            return Err(CompareError::InvalidConfig(format!(
                "polynomial order must be between 1 and 5, got {}",
                order
            )));
        }
        let n = self.len();
        if n <= order {
            return Err(CompareError::Processing(format!(
                "polynomial order {} needs more than {} samples, got {}",
                order, order, n
            )));
        }

        let terms = order + 1;

        // Power sums S_k = sum(x^k) for k = 0..2*order fill the Gram matrix
        let mut power_sums = vec![0.0f64; 2 * order + 1];
        let mut rhs = vec![0.0f64; terms];
        for (&xi, &yi) in self.x.iter().zip(self.y.iter()) {
            let mut xp = 1.0;
            for (k, sum) in power_sums.iter_mut().enumerate() {
                *sum += xp;
                if k < terms {
                    rhs[k] += yi * xp;
                }
                xp *= xi;
            }
        }

        let mut gram = vec![vec![0.0f64; terms]; terms];
        for (i, row) in gram.iter_mut().enumerate() {
            for (j, cell) in row.iter_mut().enumerate() {
                *cell = power_sums[i + j];
            }
        }

        let ascending = solve_linear_system(&mut gram, &mut rhs)?;
        let coefficients: Vec<f64> = ascending.into_iter().rev().collect();

        let fit = PolyFit {
            coefficients,
            r_squared: 0.0,
        };

        let mean_y = mean(&self.y);
        let mut ss_res = 0.0;
        let mut ss_tot = 0.0;
        for (&xi, &yi) in self.x.iter().zip(self.y.iter()) {
            let residual = yi - fit.evaluate(xi);
            ss_res += residual * residual;
            let dev = yi - mean_y;
            ss_tot += dev * dev;
        }

        let r_squared = if ss_tot == 0.0 {
            log::warn!("R² undefined for constant y values, reporting 0.0");
            0.0
        } else {
            1.0 - ss_res / ss_tot
        };

        Ok(PolyFit {
            r_squared,
            ..fit
        })
    }

    /// Gaussian kernel density estimate evaluated at every sample.
    ///
    /// Uses Scott's-rule bandwidth (`n^(-1/6)` for two dimensions) scaled by
    /// the per-axis standard deviation. Quadratic in the sample count, which
    /// is why the callers decimate first; the per-point sums are evaluated
    /// serially so the result does not depend on the thread count.
    pub fn point_density(&self) -> CompareResult<Vec<f64>> {
        let n = self.len();
        if n < 3 {
            return Err(CompareError::Processing(format!(
                "kernel density needs at least 3 samples, got {}",
                n
            )));
        }

        let std_x = sample_std(&self.x);
        let std_y = sample_std(&self.y);
        if std_x == 0.0 || std_y == 0.0 {
            return Err(CompareError::Processing(
                "kernel density is undefined for a zero-variance axis".to_string(),
            ));
        }

        let factor = (n as f64).powf(-1.0 / 6.0);
        let hx = std_x * factor;
        let hy = std_y * factor;
        let norm = 1.0 / (n as f64 * 2.0 * std::f64::consts::PI * hx * hy);

        let evaluate = |i: usize| -> f64 {
            let xi = self.x[i];
            let yi = self.y[i];
            let mut sum = 0.0;
            for (&xj, &yj) in self.x.iter().zip(self.y.iter()) {
                let dx = (xi - xj) / hx;
                let dy = (yi - yj) / hy;
                sum += (-0.5 * (dx * dx + dy * dy)).exp();
            }
            norm * sum
        };

        #[cfg(feature = "parallel")]
        let densities: Vec<f64> = (0..n).into_par_iter().map(evaluate).collect();
        #[cfg(not(feature = "parallel"))]
        let densities: Vec<f64> = (0..n).map(evaluate).collect();

        Ok(densities)
    }

    /// Reorder the series by a permutation from [`density_order`]
    pub fn reordered(&self, order: &[usize]) -> CompareResult<Self> {
        if order.len() != self.len() {
            return Err(CompareError::ShapeMismatch {
                left: order.len(),
                right: self.len(),
            });
        }
        let mut x = Vec::with_capacity(order.len());
        let mut y = Vec::with_capacity(order.len());
        for &i in order {
            match (self.x.get(i), self.y.get(i)) {
                (Some(&xi), Some(&yi)) => {
                    x.push(xi);
                    y.push(yi);
                }
                _ => {
                    return Err(CompareError::Processing(format!(
                        "reorder index {} out of range for {} samples",
                        i,
                        self.len()
                    )));
                }
            }
        }
        Ok(Self { x, y })
    }
}

/// Ascending-density permutation, so the densest points are drawn last
pub fn density_order(density: &[f64]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..density.len()).collect();
    order.sort_by(|&a, &b| density[a].total_cmp(&density[b]));
    order
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

fn sample_std(values: &[f64]) -> f64 {
    let n = values.len();
    let m = mean(values);
    let ss: f64 = values.iter().map(|&v| (v - m) * (v - m)).sum();
    (ss / (n - 1) as f64).sqrt()
}

/// Gaussian elimination with partial pivoting; consumes its inputs
fn solve_linear_system(matrix: &mut [Vec<f64>], rhs: &mut [f64]) -> CompareResult<Vec<f64>> {
    let n = rhs.len();

    for col in 0..n {
        let mut pivot_row = col;
        for row in (col + 1)..n {
            if matrix[row][col].abs() > matrix[pivot_row][col].abs() {
                pivot_row = row;
            }
        }
        if matrix[pivot_row][col].abs() < 1e-12 {
            return Err(CompareError::Processing(
                "singular normal equations, polynomial fit is underdetermined".to_string(),
            ));
        }
        matrix.swap(col, pivot_row);
        rhs.swap(col, pivot_row);

        for row in (col + 1)..n {
            let ratio = matrix[row][col] / matrix[col][col];
            for k in col..n {
                matrix[row][k] -= ratio * matrix[col][k];
            }
            rhs[row] -= ratio * rhs[col];
        }
    }

    let mut solution = vec![0.0f64; n];
    for col in (0..n).rev() {
        let mut acc = rhs[col];
        for k in (col + 1)..n {
            acc -= matrix[col][k] * solution[k];
        }
        solution[col] = acc / matrix[col][col];
    }

    Ok(solution)
}
