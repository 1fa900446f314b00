//! Chart generation commands
//!
//! Each chart is written to `<figures-dir>/gjp/<analysis>/` as a Vega-Lite
//! specification; per-question and per-user charts get their own
//! subdirectory.

use clap::{Args, Subcommand};

use self::{
    correlation::{CorrMatrixArg, CorrTopKArg},
    histogram::HistogramArg,
    timeline::{IfpTimelineArg, UserTimelineArg},
};
use crate::command::Context;

mod correlation;
mod histogram;
mod timeline;

#[derive(Debug, Clone, Args)]
pub(crate) struct PlotArg {
    #[command(subcommand)]
    chart: Chart,
}

#[derive(Debug, Clone, Subcommand)]
enum Chart {
    /// Distribution of baseline probabilities on one question
    Histogram(#[clap(flatten)] HistogramArg),
    /// Correlation heat map of the first K candidate questions
    CorrMatrix(#[clap(flatten)] CorrMatrixArg),
    /// Strongest correlation partners of the most correlated questions
    CorrTopK(#[clap(flatten)] CorrTopKArg),
    /// Open periods of studied questions
    IfpTimeline(#[clap(flatten)] IfpTimelineArg),
    /// One user's baselines over time
    UserTimeline(#[clap(flatten)] UserTimelineArg),
}

pub(crate) fn run(ctx: &mut Context, arg: &PlotArg) -> anyhow::Result<()> {
    match &arg.chart {
        Chart::Histogram(arg) => histogram::run(ctx, arg),
        Chart::CorrMatrix(arg) => correlation::run_matrix(ctx, arg),
        Chart::CorrTopK(arg) => correlation::run_top_k(ctx, arg),
        Chart::IfpTimeline(arg) => timeline::run_ifp(ctx, arg),
        Chart::UserTimeline(arg) => timeline::run_user(ctx, arg),
    }
}
