//! Group-level bootstrap resampling with percentile error bars.
//!
//! The engine resamples whole *units* (for example every game played by one
//! group of players in one session) with replacement, never the items inside a
//! unit, so correlations within a unit survive the resampling.
//!
//! # Trial streams
//!
//! Each trial draws from its own `Pcg64` stream derived from the run seed and
//! the trial index. A run is therefore reproducible from its seed and gives
//! identical trials whatever number of worker threads is used.
//!
//! # Error bars
//!
//! [`Estimate`] reports the mean of the per-trial statistic together with the
//! distances from that mean to the 15.87th and 84.13th percentiles, which
//! bracket ±1σ for a normal distribution without assuming one.
//!
//! # Examples
//!
//! ```
//! use stargrid_stats::bootstrap::{Bootstrap, Estimate};
//!
//! let units = vec![vec![1.0, 3.0], vec![2.0], vec![4.0, 4.0, 4.0]];
//! let bootstrap = Bootstrap::new(200, 42).unwrap();
//! let trials = bootstrap
//!     .resample(&units, |items: &[&f64]| {
//!         Some(items.iter().copied().sum::<f64>() / items.len() as f64)
//!     })
//!     .unwrap();
//! let estimate = Estimate::from_trials(trials).unwrap();
//! assert!(estimate.mean > 1.0 && estimate.mean < 4.0);
//! ```

use std::{collections::BTreeMap, num::NonZeroUsize, thread};

use rand::{Rng as _, SeedableRng as _};
use rand_pcg::Pcg64;

use crate::percentiles::Percentiles;

/// Lower percentile of the reported interval (50 - 34.13).
pub const LOWER_PERCENTILE: f64 = 50.0 - 34.13;
/// Upper percentile of the reported interval (50 + 34.13).
pub const UPPER_PERCENTILE: f64 = 50.0 + 34.13;

const TRIAL_SEED_STEP: u64 = 0x9E37_79B9_7F4A_7C15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum BootstrapError {
    #[display("bootstrap requires at least one resampling unit")]
    EmptyUnits,
    #[display("bootstrap requires at least one replication")]
    ZeroReplications,
}

/// Configuration of a bootstrap run.
#[derive(Debug, Clone, Copy)]
pub struct Bootstrap {
    reps: usize,
    seed: u64,
    threads: NonZeroUsize,
}

impl Bootstrap {
    /// Creates a single-threaded bootstrap with `reps` trials.
    pub fn new(reps: usize, seed: u64) -> Result<Self, BootstrapError> {
        if reps == 0 {
            return Err(BootstrapError::ZeroReplications);
        }
        Ok(Self {
            reps,
            seed,
            threads: NonZeroUsize::MIN,
        })
    }

    /// Spreads the trials over `threads` workers.
    #[must_use]
    pub fn with_threads(mut self, threads: NonZeroUsize) -> Self {
        self.threads = threads;
        self
    }

    #[must_use]
    pub fn reps(&self) -> usize {
        self.reps
    }

    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Runs the trials and returns the statistic of each one, in trial order.
    ///
    /// Every trial draws `units.len()` unit indices uniformly with replacement,
    /// concatenates the items of the drawn units (keeping the order inside each
    /// unit) and applies `statistic` to the concatenation.
    pub fn resample<U, T, R, F>(&self, units: &[U], statistic: F) -> Result<Vec<R>, BootstrapError>
    where
        U: AsRef<[T]> + Sync,
        T: Sync,
        R: Send,
        F: Fn(&[&T]) -> R + Sync,
    {
        if units.is_empty() {
            return Err(BootstrapError::EmptyUnits);
        }

        log::debug!(
            "bootstrap: {} trials over {} units (seed {}, {} threads)",
            self.reps,
            units.len(),
            self.seed,
            self.threads
        );

        let chunk_len = self.reps.div_ceil(self.threads.get());
        let statistic = &statistic;
        let results = thread::scope(|s| {
            let handles = (0..self.reps)
                .step_by(chunk_len)
                .map(|start| {
                    let trials = start..usize::min(start + chunk_len, self.reps);
                    s.spawn(move || {
                        let mut sample = Vec::new();
                        trials
                            .map(|trial| {
                                let mut rng = self.trial_rng(trial);
                                sample.clear();
                                for _ in 0..units.len() {
                                    let idx = rng.random_range(0..units.len());
                                    sample.extend(units[idx].as_ref());
                                }
                                statistic(&sample)
                            })
                            .collect::<Vec<_>>()
                    })
                })
                .collect::<Vec<_>>();

            handles
                .into_iter()
                .flat_map(|handle| {
                    handle
                        .join()
                        .unwrap_or_else(|payload| std::panic::resume_unwind(payload))
                })
                .collect::<Vec<_>>()
        });

        Ok(results)
    }

    fn trial_rng(&self, trial: usize) -> Pcg64 {
        let trial = trial as u64;
        Pcg64::seed_from_u64(self.seed.wrapping_add(trial.wrapping_mul(TRIAL_SEED_STEP)))
    }
}

/// Point estimate and asymmetric error bar of a bootstrapped statistic.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Estimate {
    /// Mean of the statistic over the trials where it was defined.
    pub mean: f64,
    /// Distance from the mean to the 15.87th percentile.
    pub lower_err: f64,
    /// Distance from the mean to the 84.13th percentile.
    pub upper_err: f64,
    /// Number of trials where the statistic was defined.
    pub trials: usize,
}

impl Estimate {
    /// Summarizes per-trial values.
    ///
    /// `None` (and NaN) marks a trial in which the statistic was undefined, e.g.
    /// an empty bucket; such trials are left out of this estimate only.
    /// Returns `None` when no trial defined the statistic.
    #[expect(clippy::cast_precision_loss)]
    pub fn from_trials<I>(values: I) -> Option<Self>
    where
        I: IntoIterator<Item = Option<f64>>,
    {
        let mut defined = values
            .into_iter()
            .flatten()
            .filter(|v| !v.is_nan())
            .collect::<Vec<_>>();
        if defined.is_empty() {
            return None;
        }
        defined.sort_by(f64::total_cmp);

        let mean = defined.iter().sum::<f64>() / defined.len() as f64;
        let percentiles = Percentiles::from_sorted(&defined, &[LOWER_PERCENTILE, UPPER_PERCENTILE]);
        let lower = percentiles.get(LOWER_PERCENTILE)?;
        let upper = percentiles.get(UPPER_PERCENTILE)?;

        Some(Self {
            mean,
            lower_err: (lower - mean).abs(),
            upper_err: (upper - mean).abs(),
            trials: defined.len(),
        })
    }

    /// Summarizes per-trial arrays element by element.
    ///
    /// Arrays shorter than the longest one are treated as undefined past their end.
    pub fn series<S>(trials: &[S]) -> Vec<Option<Self>>
    where
        S: AsRef<[Option<f64>]>,
    {
        let len = trials
            .iter()
            .map(|trial| trial.as_ref().len())
            .max()
            .unwrap_or(0);
        (0..len)
            .map(|i| {
                Self::from_trials(
                    trials
                        .iter()
                        .map(|trial| trial.as_ref().get(i).copied().flatten()),
                )
            })
            .collect()
    }

    /// Summarizes per-trial keyed values; a key missing from a trial counts as
    /// undefined for that trial.
    pub fn keyed<K>(trials: &[BTreeMap<K, Option<f64>>]) -> BTreeMap<K, Option<Self>>
    where
        K: Ord + Clone,
    {
        let mut keys = trials
            .iter()
            .flat_map(BTreeMap::keys)
            .cloned()
            .collect::<Vec<_>>();
        keys.sort();
        keys.dedup();
        keys.into_iter()
            .map(|key| {
                let estimate =
                    Self::from_trials(trials.iter().map(|trial| trial.get(&key).copied().flatten()));
                (key, estimate)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mean_of(items: &[&f64]) -> Option<f64> {
        #[expect(clippy::cast_precision_loss)]
        let n = items.len() as f64;
        Some(items.iter().copied().sum::<f64>() / n)
    }

    #[test]
    fn test_zero_reps_rejected() {
        assert_eq!(
            Bootstrap::new(0, 1).unwrap_err(),
            BootstrapError::ZeroReplications
        );
    }

    #[test]
    fn test_empty_units_rejected() {
        let units: Vec<Vec<f64>> = vec![];
        let bootstrap = Bootstrap::new(10, 1).unwrap();
        assert_eq!(
            bootstrap.resample(&units, mean_of).unwrap_err(),
            BootstrapError::EmptyUnits
        );
    }

    #[test]
    fn test_constant_units_have_no_spread() {
        let units = vec![vec![3.5, 3.5], vec![3.5], vec![3.5, 3.5, 3.5]];
        let bootstrap = Bootstrap::new(500, 7).unwrap();
        let trials = bootstrap.resample(&units, mean_of).unwrap();
        assert_eq!(trials.len(), 500);
        let estimate = Estimate::from_trials(trials).unwrap();
        assert_eq!(estimate.mean, 3.5);
        assert_eq!(estimate.lower_err, 0.0);
        assert_eq!(estimate.upper_err, 0.0);
        assert_eq!(estimate.trials, 500);
    }

    #[test]
    fn test_unit_order_preserved_inside_sample() {
        let units = vec![vec![1, 2, 3]];
        let bootstrap = Bootstrap::new(5, 3).unwrap();
        let trials = bootstrap
            .resample(&units, |items: &[&i32]| {
                items.iter().map(|&&v| v).collect::<Vec<_>>()
            })
            .unwrap();
        assert!(trials.iter().all(|t| t == &[1, 2, 3]));
    }

    #[test]
    fn test_marginal_inclusion_probability() {
        let n = 5;
        let units = (0..n).map(|i| vec![i]).collect::<Vec<_>>();
        let bootstrap = Bootstrap::new(20_000, 11).unwrap();
        let trials = bootstrap
            .resample(&units, |items: &[&usize]| items.iter().any(|&&i| i == 0))
            .unwrap();
        #[expect(clippy::cast_precision_loss)]
        let observed = trials.iter().filter(|&&hit| hit).count() as f64 / trials.len() as f64;
        let expected = 1.0 - (1.0 - 1.0 / 5.0_f64).powi(5);
        assert!(
            (observed - expected).abs() < 0.02,
            "observed {observed}, expected {expected}"
        );
    }

    #[test]
    fn test_thread_count_does_not_change_trials() {
        let units = (0..17).map(|i| vec![f64::from(i)]).collect::<Vec<_>>();
        let single = Bootstrap::new(101, 99).unwrap();
        let multi = single.with_threads(NonZeroUsize::new(4).unwrap());
        assert_eq!(
            single.resample(&units, mean_of).unwrap(),
            multi.resample(&units, mean_of).unwrap()
        );
    }

    #[test]
    fn test_undefined_trials_are_skipped() {
        let estimate = Estimate::from_trials([Some(1.0), None, Some(f64::NAN), Some(3.0)]).unwrap();
        assert_eq!(estimate.trials, 2);
        assert_eq!(estimate.mean, 2.0);
        assert!(Estimate::from_trials([None, None]).is_none());
    }

    #[test]
    fn test_series_and_keyed() {
        let series = Estimate::series(&[vec![Some(1.0), Some(2.0)], vec![Some(3.0)]]);
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].unwrap().mean, 2.0);
        assert_eq!(series[1].unwrap().trials, 1);

        let trials = vec![
            BTreeMap::from([("a", Some(1.0)), ("b", None)]),
            BTreeMap::from([("a", Some(3.0))]),
        ];
        let keyed = Estimate::keyed(&trials);
        assert_eq!(keyed["a"].unwrap().mean, 2.0);
        assert!(keyed["b"].is_none());
    }
}
