//! Statistical utilities for the stargrid analysis toolkit.
//!
//! This crate provides the numeric building blocks used by the game analyses:
//!
//! - **Descriptive statistics**: mean, median, variance, standard deviation
//! - **Percentiles**: linearly interpolated percentile points
//! - **Density histograms**: sliding-window density estimates on fixed centres
//! - **Regression**: least-squares straight-line fits
//! - **Bootstrap**: group resampling with replacement and percentile error bars
//!
//! # Modules
//!
//! - [`descriptive`]: Descriptive statistics for summarizing datasets
//! - [`percentiles`]: Percentile computation and storage
//! - [`histogram`]: Density histograms
//! - [`regression`]: Linear least-squares fitting
//! - [`bootstrap`]: The bootstrap engine and its estimates
//!
//! # Examples
//!
//! ## Computing descriptive statistics
//!
//! ```
//! use stargrid_stats::descriptive::DescriptiveStats;
//!
//! let values = [1.0, 2.0, 3.0, 4.0, 5.0];
//! let stats = DescriptiveStats::new(values).unwrap();
//! assert_eq!(stats.mean, 3.0);
//! ```
//!
//! ## Bootstrapping a mean
//!
//! ```
//! use stargrid_stats::bootstrap::{Bootstrap, Estimate};
//!
//! // Two resampling units holding the same constant
//! let units = vec![vec![2.0, 2.0], vec![2.0]];
//! let trials = Bootstrap::new(100, 0)
//!     .unwrap()
//!     .resample(&units, |items: &[&f64]| Some(*items[0]))
//!     .unwrap();
//! let estimate = Estimate::from_trials(trials).unwrap();
//! assert_eq!((estimate.mean, estimate.lower_err, estimate.upper_err), (2.0, 0.0, 0.0));
//! ```

pub mod bootstrap;
pub mod descriptive;
pub mod histogram;
pub mod percentiles;
pub mod regression;
