use clap::Args;
use gjp_analysis::{
    baseline,
    correlation::{self, CorrelationMatrix},
};

use crate::{
    chart,
    command::{Context, corr_pairs::CandidateArg},
};

#[derive(Debug, Clone, Args)]
pub(crate) struct CorrMatrixArg {
    #[clap(flatten)]
    candidates: CandidateArg,

    /// Number of candidate questions on each axis
    #[arg(long, default_value_t = 15)]
    first_k: usize,
}

#[derive(Debug, Clone, Args)]
pub(crate) struct CorrTopKArg {
    #[clap(flatten)]
    candidates: CandidateArg,

    /// Use only the first K candidate questions
    #[arg(long)]
    first_k: Option<usize>,

    /// Number of questions shown as rows
    #[arg(long, default_value_t = 10)]
    n_rows: usize,

    /// Number of partner ranks per row
    #[arg(long, default_value_t = 10)]
    top_k: usize,
}

fn correlate(
    ctx: &mut Context,
    candidates: &CandidateArg,
    first_k: Option<usize>,
) -> anyhow::Result<CorrelationMatrix> {
    let log = ctx.studied_forecasts()?;
    let p_a = baseline::baseline_p_a(&log)?;
    let questions = correlation::select_candidate_questions(&p_a, &candidates.criteria(first_k));
    Ok(correlation::pairwise_correlation(&p_a, &questions)?)
}

pub(crate) fn run_matrix(ctx: &mut Context, arg: &CorrMatrixArg) -> anyhow::Result<()> {
    let matrix = correlate(ctx, &arg.candidates, Some(arg.first_k))?;
    let order = matrix.axis_order_by_r2();
    let title = format!(
        "Correlation of baseline p(a), {} questions",
        matrix.questions().len()
    );
    let spec = chart::correlation::corr_matrix(&title, &matrix, &order);
    chart::save(
        &spec,
        &ctx.figure_path("corr_matrix", None, &format!("first{}", arg.first_k)),
    )
}

pub(crate) fn run_top_k(ctx: &mut Context, arg: &CorrTopKArg) -> anyhow::Result<()> {
    let matrix = correlate(ctx, &arg.candidates, arg.first_k)?;
    let rows = matrix
        .axis_order_by_r2()
        .into_iter()
        .take(arg.n_rows)
        .collect::<Vec<_>>();
    let cells = matrix.top_per_question(arg.top_k);
    let title = format!("Top {} partners by r², {} questions", arg.top_k, rows.len());
    let spec = chart::correlation::corr_top_k(&title, &cells, &rows);
    chart::save(
        &spec,
        &ctx.figure_path(
            "corr_topk_rows",
            None,
            &format!("rows{}_top{}", arg.n_rows, arg.top_k),
        ),
    )
}
