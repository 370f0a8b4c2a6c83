//! Serializable forms of bootstrap estimates

use serde::Serialize;
use stargrid_stats::bootstrap::Estimate;

/// Mean and asymmetric error bar of one bootstrapped quantity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EstimatePoint {
    pub mean: f64,
    pub lower_err: f64,
    pub upper_err: f64,
}

impl From<Estimate> for EstimatePoint {
    fn from(estimate: Estimate) -> Self {
        Self {
            mean: estimate.mean,
            lower_err: estimate.lower_err,
            upper_err: estimate.upper_err,
        }
    }
}

/// An estimate at a position of a series, counted from 1 (round, rank, ...).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub index: usize,
    pub mean: f64,
    pub lower_err: f64,
    pub upper_err: f64,
}

impl SeriesPoint {
    /// Numbers the defined estimates of a series from 1, leaving out the
    /// positions where no trial defined the statistic.
    #[must_use]
    pub fn from_series(estimates: &[Option<Estimate>]) -> Vec<Self> {
        estimates
            .iter()
            .enumerate()
            .filter_map(|(i, estimate)| {
                let estimate = estimate.as_ref()?;
                Some(Self {
                    index: i + 1,
                    mean: estimate.mean,
                    lower_err: estimate.lower_err,
                    upper_err: estimate.upper_err,
                })
            })
            .collect()
    }
}

/// Element-wise mean of rows of possibly different lengths.
///
/// A position no row reaches is `None`.
#[expect(clippy::cast_precision_loss)]
pub(crate) fn elementwise_mean<'a, I>(rows: I) -> Vec<Option<f64>>
where
    I: IntoIterator<Item = &'a [f64]>,
{
    let mut sums: Vec<(f64, usize)> = vec![];
    for row in rows {
        if sums.len() < row.len() {
            sums.resize(row.len(), (0.0, 0));
        }
        for ((sum, count), value) in sums.iter_mut().zip(row) {
            *sum += value;
            *count += 1;
        }
    }
    sums.into_iter()
        .map(|(sum, count)| (count > 0).then(|| sum / count as f64))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_elementwise_mean_ragged_rows() {
        let a = [1.0, 2.0, 3.0];
        let b = [3.0];
        let mean = elementwise_mean([&a[..], &b[..]]);
        assert_eq!(mean, vec![Some(2.0), Some(2.0), Some(3.0)]);
        assert!(elementwise_mean(std::iter::empty()).is_empty());
    }

    #[test]
    fn test_series_points_skip_undefined() {
        let estimate = Estimate {
            mean: 1.0,
            lower_err: 0.5,
            upper_err: 0.25,
            trials: 10,
        };
        let points = SeriesPoint::from_series(&[None, Some(estimate)]);
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].index, 2);
        assert_eq!(points[0].upper_err, 0.25);
    }
}
