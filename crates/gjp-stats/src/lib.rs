//! Statistical utilities for the forecast baseline analysis.
//!
//! This crate provides the small set of statistical tools the analysis needs:
//!
//! - **Descriptive statistics**: mean, median, variance, standard deviation and distinct counts
//! - **Correlation**: Pearson correlation over paired samples
//! - **Histogram generation**: fixed-domain frequency distributions
//!
//! # Modules
//!
//! - [`descriptive`]: Descriptive statistics for summarizing datasets
//! - [`correlation`]: Pearson correlation for paired observations
//! - [`histogram`]: Histogram construction for visualizing data distributions
//!
//! # Examples
//!
//! ## Computing descriptive statistics
//!
//! ```
//! use gjp_stats::descriptive::DescriptiveStats;
//!
//! let values = [0.1, 0.2, 0.3, 0.4, 0.5];
//! let stats = DescriptiveStats::new(values).unwrap();
//! assert_eq!(stats.median, 0.3);
//! ```
//!
//! ## Correlating two series
//!
//! ```
//! use gjp_stats::correlation::Correlation;
//!
//! let corr = Correlation::pearson([(0.2, 0.8), (0.4, 0.6), (0.6, 0.4)]);
//! assert!((corr.coefficient + 1.0).abs() < 1e-12);
//! ```
//!
//! ## Creating a histogram
//!
//! ```
//! use gjp_stats::histogram::Histogram;
//!
//! let values = [0.05, 0.15, 0.15, 0.95];
//! let histogram = Histogram::with_domain(values, 10, 0.0..1.0);
//! assert_eq!(histogram.bins[1].count, 2);
//! ```

pub mod correlation;
pub mod descriptive;
pub mod histogram;
