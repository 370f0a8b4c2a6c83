//! Ordinary least-squares fit of a straight line.

/// Error returned when a line cannot be fitted to the given points.
#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum FitError {
    #[display("at least 2 points are required to fit a line, got {count}")]
    TooFewPoints { count: usize },
    #[display("all points share the same abscissa")]
    DegenerateAbscissa,
}

/// A fitted line `y = intercept + slope * x`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit {
    pub intercept: f64,
    pub slope: f64,
}

impl LinearFit {
    /// Fits a line through `(x, y)` points by minimizing the sum of squared
    /// residuals.
    ///
    /// # Examples
    ///
    /// ```
    /// # use stargrid_stats::regression::LinearFit;
    /// let fit = LinearFit::least_squares([(0.0, 1.0), (1.0, 3.0), (2.0, 5.0)]).unwrap();
    /// assert!((fit.intercept - 1.0).abs() < 1e-12);
    /// assert!((fit.slope - 2.0).abs() < 1e-12);
    /// ```
    #[expect(clippy::cast_precision_loss)]
    pub fn least_squares<I>(points: I) -> Result<Self, FitError>
    where
        I: IntoIterator<Item = (f64, f64)>,
    {
        let points = points.into_iter().collect::<Vec<_>>();
        if points.len() < 2 {
            return Err(FitError::TooFewPoints {
                count: points.len(),
            });
        }

        let n = points.len() as f64;
        let mean_x = points.iter().map(|(x, _)| x).sum::<f64>() / n;
        let mean_y = points.iter().map(|(_, y)| y).sum::<f64>() / n;
        let sxx = points
            .iter()
            .map(|(x, _)| (x - mean_x).powi(2))
            .sum::<f64>();
        let sxy = points
            .iter()
            .map(|(x, y)| (x - mean_x) * (y - mean_y))
            .sum::<f64>();

        if sxx <= f64::EPSILON * n * mean_x.abs().max(1.0) {
            return Err(FitError::DegenerateAbscissa);
        }

        let slope = sxy / sxx;
        Ok(Self {
            intercept: mean_y - slope * mean_x,
            slope,
        })
    }

    #[must_use]
    pub fn predict(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_point_fails() {
        assert_eq!(
            LinearFit::least_squares([(1.0, 1.0)]),
            Err(FitError::TooFewPoints { count: 1 })
        );
    }

    #[test]
    fn test_vertical_points_fail() {
        assert_eq!(
            LinearFit::least_squares([(2.0, 1.0), (2.0, 4.0)]),
            Err(FitError::DegenerateAbscissa)
        );
    }

    #[test]
    fn test_noisy_points() {
        let fit = LinearFit::least_squares([(0.0, 0.0), (1.0, 2.0), (2.0, 2.0)]).unwrap();
        assert!((fit.slope - 1.0).abs() < 1e-12);
        assert!((fit.intercept - 1.0 / 3.0).abs() < 1e-12);
        assert!((fit.predict(3.0) - 10.0 / 3.0).abs() < 1e-12);
    }
}
