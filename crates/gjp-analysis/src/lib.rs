//! Baseline extraction and cross-question correlation for tournament forecasts
//!
//! This crate derives per-user baseline forecasts from a loaded
//! [`ForecastLog`](gjp_data::forecast::ForecastLog) and measures how users'
//! initial beliefs on different questions relate to each other.
//!
//! # Overview
//!
//! ## Baseline Workflow
//!
//! 1. **Filter** ([`ForecastLog::filter_studied`](gjp_data::forecast::ForecastLog::filter_studied)):
//!    Restrict the log to studied questions
//! 2. **Extract Baselines** ([`baseline::baselines`], [`baseline::baseline_p_a`]):
//!    Each user's chronologically earliest forecast per question and option
//! 3. **Aggregate** ([`baseline::aggregate_baselines`]): Mean, median and user
//!    count per question and option
//!
//! ## Correlation Workflow
//!
//! 1. **Select Questions** ([`correlation::select_candidate_questions`]): Drop
//!    sparse and constant questions
//! 2. **Correlate** ([`correlation::pairwise_correlation`]): Pearson coefficient
//!    for every question pair over the users who answered both
//! 3. **Rank** ([`correlation::unique_pairs`]): One row per unordered pair,
//!    strongest first
//!
//! # Examples
//!
//! ```no_run
//! use gjp_analysis::{baseline, correlation};
//! use gjp_data::{cache::DatasetCache, forecast::Years, paths::DataPaths};
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//!
//! let mut cache = DatasetCache::new(DataPaths::new("data"));
//! let catalog = cache.catalog()?;
//! let log = cache.forecasts(&Years::all())?.filter_studied(&catalog);
//!
//! let p_a = baseline::baseline_p_a(&log)?;
//! let criteria = correlation::CandidateCriteria {
//!     first_k: Some(50),
//!     ..Default::default()
//! };
//! let questions = correlation::select_candidate_questions(&p_a, &criteria);
//! let matrix = correlation::pairwise_correlation(&p_a, &questions)?;
//!
//! for pair in correlation::unique_pairs(&matrix).iter().take(10) {
//!     println!(
//!         "{} ~ {}: r={:+.3} (n={})",
//!         pair.ifp_id_x, pair.ifp_id_y, pair.corr, pair.n_users
//!     );
//! }
//! # Ok(())
//! # }
//! ```

pub mod baseline;
pub mod correlation;
pub mod error;
