use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use gjp_data::{
    cache::DatasetCache,
    forecast::{ForecastLog, Year, Years},
    paths::DataPaths,
    question::Catalog,
};
use tracing_subscriber::EnvFilter;

use self::{
    baselines::{AggregateBaselinesArg, BaselinesArg},
    corr_pairs::CorrPairsArg,
    forecasts::ForecastsArg,
    plot::PlotArg,
    questions::QuestionsArg,
};
use crate::chart;

mod baselines;
mod corr_pairs;
mod forecasts;
mod plot;
mod questions;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    #[clap(flatten)]
    global: GlobalArg,

    /// Analysis to run
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Args)]
struct GlobalArg {
    /// Directory containing `dataverse_files/`
    #[arg(long, global = true, env = "GJP_DATA_DIR", default_value = "data")]
    data_dir: PathBuf,

    /// Root directory for chart output
    #[arg(
        long,
        global = true,
        env = "GJP_FIGURES_DIR",
        default_value = "reports/figures"
    )]
    figures_dir: PathBuf,

    /// Forecast years to load (comma-separated)
    #[arg(
        long,
        global = true,
        value_delimiter = ',',
        default_values_t = [1, 2, 3, 4],
        value_parser = clap::value_parser!(u8).range(1..=4),
    )]
    years: Vec<u8>,

    /// Log filter, e.g. `info` or `gjp_data=debug`
    #[arg(long, global = true, env = "GJP_LOG", default_value = "info")]
    log_level: String,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// List studied questions
    Questions(#[clap(flatten)] QuestionsArg),
    /// Summarize the forecast log
    Forecasts(#[clap(flatten)] ForecastsArg),
    /// Extract each user's earliest forecast per question
    Baselines(#[clap(flatten)] BaselinesArg),
    /// Mean and median baseline per question and option
    AggregateBaselines(#[clap(flatten)] AggregateBaselinesArg),
    /// Rank question pairs by correlation of baseline p(a)
    CorrPairs(#[clap(flatten)] CorrPairsArg),
    /// Write Vega-Lite chart specifications
    Plot(#[clap(flatten)] PlotArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&args.global.log_level))
        .with_writer(std::io::stderr)
        .init();

    let mut ctx = Context::new(&args.global)?;
    match &args.mode {
        Mode::Questions(arg) => questions::run(&mut ctx, arg)?,
        Mode::Forecasts(arg) => forecasts::run(&mut ctx, arg)?,
        Mode::Baselines(arg) => baselines::run(&mut ctx, arg)?,
        Mode::AggregateBaselines(arg) => baselines::run_aggregate(&mut ctx, arg)?,
        Mode::CorrPairs(arg) => corr_pairs::run(&mut ctx, arg)?,
        Mode::Plot(arg) => plot::run(&mut ctx, arg)?,
    }
    Ok(())
}

/// Loaded tables and output locations shared by every command.
pub(crate) struct Context {
    cache: DatasetCache,
    years: Years,
    figures_dir: PathBuf,
}

impl Context {
    fn new(arg: &GlobalArg) -> anyhow::Result<Self> {
        let years = arg
            .years
            .iter()
            .map(|&year| Year::new(year).with_context(|| format!("Invalid year: {year}")))
            .collect::<anyhow::Result<Vec<_>>>()?;
        let years = Years::new(years).context("At least one year must be selected")?;
        Ok(Self {
            cache: DatasetCache::new(DataPaths::new(&arg.data_dir)),
            years,
            figures_dir: arg.figures_dir.clone(),
        })
    }

    pub(crate) fn catalog(&mut self) -> anyhow::Result<Arc<Catalog>> {
        self.cache.catalog().with_context(|| {
            format!(
                "Failed to load questions from {}",
                self.cache.paths().questions_csv().display()
            )
        })
    }

    pub(crate) fn forecasts(&mut self) -> anyhow::Result<Arc<ForecastLog>> {
        let years = self.years.clone();
        self.cache.forecasts(&years).with_context(|| {
            format!(
                "Failed to load forecasts from {}",
                self.cache.paths().data_dir().display()
            )
        })
    }

    /// Forecasts on studied questions.
    pub(crate) fn studied_forecasts(&mut self) -> anyhow::Result<ForecastLog> {
        let catalog = self.catalog()?;
        Ok(self.forecasts()?.filter_studied(&catalog))
    }

    /// `<figures-dir>/gjp/<analysis>/[<subject>/]<name>.vl.json`
    pub(crate) fn figure_path(&self, analysis: &str, subject: Option<&str>, name: &str) -> PathBuf {
        let mut path = self.figures_dir.join("gjp").join(analysis);
        if let Some(subject) = subject {
            path.push(crate::util::path_component(subject));
        }
        path.join(format!("{name}.{}", chart::EXTENSION))
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory as _;

    use super::*;

    #[test]
    fn test_command_definition() {
        CommandArgs::command().debug_assert();
    }

    #[test]
    fn test_global_defaults() {
        let args = CommandArgs::try_parse_from(["gjp", "questions"]).unwrap();
        assert_eq!(args.global.years, [1, 2, 3, 4]);
        assert_eq!(args.global.figures_dir, PathBuf::from("reports/figures"));
    }

    #[test]
    fn test_years_are_range_checked() {
        assert!(CommandArgs::try_parse_from(["gjp", "--years", "1,5", "questions"]).is_err());
        let args = CommandArgs::try_parse_from(["gjp", "forecasts", "--years", "2,3"]).unwrap();
        assert_eq!(args.global.years, [2, 3]);
    }

    #[test]
    fn test_figure_path() {
        let args = CommandArgs::try_parse_from([
            "gjp",
            "--figures-dir",
            "out",
            "plot",
            "histogram",
            "--ifp",
            "1001-0",
        ])
        .unwrap();
        let ctx = Context::new(&args.global).unwrap();
        assert_eq!(
            ctx.figure_path("forecast_priors_hist", Some("1001-0"), "hist"),
            PathBuf::from("out/gjp/forecast_priors_hist/1001-0/hist.vl.json")
        );
    }
}
