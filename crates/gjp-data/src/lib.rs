//! Loading and validation of the Good Judgment Project tournament tables
//!
//! This crate turns the published tournament files into typed, validated
//! tables that the analysis layer can rely on.
//!
//! # Overview
//!
//! 1. **Resolve Files** ([`paths::DataPaths`]): Locate the question list and
//!    the yearly forecast partitions under a data root
//! 2. **Load Questions** ([`question::Catalog`]): One validated row per
//!    forecasting question, with the studied subset (non-voided binary
//!    questions) available via [`Catalog::filter_studied`](question::Catalog::filter_studied)
//! 3. **Load Forecasts** ([`forecast::ForecastLog`]): Every forecast event from
//!    the selected years, tracked together with the columns actually present
//! 4. **Reuse Loads** ([`cache::DatasetCache`]): Keep the most recent tables
//!    around so repeated queries avoid re-reading large files
//!
//! Validation is strict: a malformed row aborts the load with a
//! [`DataFormatError`](error::DataFormatError) that names the file and record.
//!
//! # Examples
//!
//! ```no_run
//! use gjp_data::{cache::DatasetCache, forecast::Years, paths::DataPaths};
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//!
//! let mut cache = DatasetCache::new(DataPaths::new("data"));
//! let catalog = cache.catalog()?;
//! let forecasts = cache.forecasts(&Years::all())?;
//! let studied = forecasts.filter_studied(&catalog);
//! println!("{} of {} forecasts are on studied questions", studied.len(), forecasts.len());
//! # Ok(())
//! # }
//! ```

use serde::Serialize;

pub mod cache;
pub mod error;
pub mod forecast;
pub mod paths;
pub mod question;
mod table;

/// One of the (up to five) answer options of a question.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, derive_more::Display,
)]
#[serde(rename_all = "lowercase")]
pub enum AnswerOption {
    #[display("a")]
    A,
    #[display("b")]
    B,
    #[display("c")]
    C,
    #[display("d")]
    D,
    #[display("e")]
    E,
}

impl AnswerOption {
    pub const ALL: [AnswerOption; 5] = [
        AnswerOption::A,
        AnswerOption::B,
        AnswerOption::C,
        AnswerOption::D,
        AnswerOption::E,
    ];

    /// Parses an option letter, ignoring case.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "a" | "A" => Some(Self::A),
            "b" | "B" => Some(Self::B),
            "c" | "C" => Some(Self::C),
            "d" | "D" => Some(Self::D),
            "e" | "E" => Some(Self::E),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_char(self) -> char {
        match self {
            Self::A => 'a',
            Self::B => 'b',
            Self::C => 'c',
            Self::D => 'd',
            Self::E => 'e',
        }
    }
}
