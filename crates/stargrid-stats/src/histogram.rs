/// A probability density estimate evaluated on evenly spaced centres.
///
/// Each bin counts the values falling into a window of width `window`
/// centred on its centre (`centre - window / 2 < x <= centre + window / 2`)
/// and normalizes the count by `n * window`, so the densities integrate to
/// roughly one over the covered range. Windows may overlap; they must not
/// leave gaps between consecutive centres.
#[derive(Debug, Clone)]
pub struct DensityHistogram {
    /// The bins comprising the histogram, in ascending centre order.
    pub bins: Vec<DensityBin>,
}

/// A single bin of a [`DensityHistogram`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DensityBin {
    /// The centre of the window.
    pub center: f64,
    /// Number of values in the window divided by `n * window`.
    pub density: f64,
}

impl DensityHistogram {
    /// Creates a density histogram with `num_centers` centres spread evenly over
    /// `[min, max]`.
    ///
    /// An empty dataset yields densities of zero.
    ///
    /// # Panics
    ///
    /// Panics if fewer than two centres are requested or if the window is too
    /// narrow to cover the spacing between centres.
    ///
    /// # Examples
    ///
    /// ```
    /// # use stargrid_stats::histogram::DensityHistogram;
    /// let histogram = DensityHistogram::new(&[0.5, 0.5], 3, 0.0, 1.0, 0.5);
    /// assert_eq!(histogram.bins[1].center, 0.5);
    /// assert_eq!(histogram.bins[1].density, 2.0);
    /// assert_eq!(histogram.bins[0].density, 0.0);
    /// ```
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn new(values: &[f64], num_centers: usize, min: f64, max: f64, window: f64) -> Self {
        assert!(num_centers >= 2, "at least two centres are required");
        let spacing = (max - min) / (num_centers - 1) as f64;
        assert!(
            window >= spacing,
            "window {window} leaves gaps between centres spaced by {spacing}"
        );

        let half = window / 2.0;
        let norm = values.len() as f64 * window;
        let bins = (0..num_centers)
            .map(|i| {
                let center = min + spacing * i as f64;
                let count = values
                    .iter()
                    .filter(|&&x| center - half < x && x <= center + half)
                    .count();
                let density = if values.is_empty() {
                    0.0
                } else {
                    count as f64 / norm
                };
                DensityBin { center, density }
            })
            .collect();

        Self { bins }
    }

    /// Returns the bin densities in centre order.
    pub fn densities(&self) -> impl Iterator<Item = f64> + '_ {
        self.bins.iter().map(|bin| bin.density)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upper_edge_is_inclusive() {
        // 0.25 lies on the upper edge of the first window and the lower edge of the second
        let histogram = DensityHistogram::new(&[0.25], 3, 0.0, 1.0, 0.5);
        let densities = histogram.densities().collect::<Vec<_>>();
        assert_eq!(densities, vec![2.0, 0.0, 0.0]);
    }

    #[test]
    fn test_empty_values() {
        let histogram = DensityHistogram::new(&[], 25, 0.0, 1.0, 0.15);
        assert_eq!(histogram.bins.len(), 25);
        assert!(histogram.densities().all(|d| d == 0.0));
    }

    #[test]
    #[should_panic(expected = "leaves gaps")]
    fn test_window_too_narrow() {
        let _ = DensityHistogram::new(&[0.1], 3, 0.0, 1.0, 0.1);
    }
}
