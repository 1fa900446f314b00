use std::path::PathBuf;

use clap::Args;
use gjp_analysis::baseline::{self, BaselineAggregate, BaselineRecord};

use crate::{
    command::Context,
    table::{TableColumn, print_table},
    util::Output,
};

#[derive(Debug, Clone, Args)]
pub(crate) struct BaselinesArg {
    /// Only this question
    #[arg(long)]
    ifp: Option<String>,

    /// Only this user
    #[arg(long)]
    user: Option<String>,

    /// Only option "a", one row per question and user
    #[arg(long)]
    p_a: bool,

    /// Write JSON to this file instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Clone, Args)]
pub(crate) struct AggregateBaselinesArg {
    /// Write JSON to this file instead of printing a table
    #[arg(long)]
    output: Option<PathBuf>,
}

pub(crate) fn run(ctx: &mut Context, arg: &BaselinesArg) -> anyhow::Result<()> {
    let log = ctx.studied_forecasts()?;
    let keep = |ifp_id: &str, user_id: &str| {
        arg.ifp.as_deref().is_none_or(|id| id == ifp_id)
            && arg.user.as_deref().is_none_or(|id| id == user_id)
    };

    if arg.p_a {
        let rows = baseline::baseline_p_a(&log)?
            .into_iter()
            .filter(|b| keep(&b.ifp_id, &b.user_id))
            .collect::<Vec<_>>();
        tracing::info!(rows = rows.len(), "extracted option a baselines");
        Output::save_json(&rows, arg.output.as_deref())?;
    } else {
        let rows = baseline::baselines(&log)?
            .into_iter()
            .filter(|b| keep(&b.ifp_id, &b.user_id))
            .collect::<Vec<BaselineRecord>>();
        tracing::info!(rows = rows.len(), "extracted baselines");
        Output::save_json(&rows, arg.output.as_deref())?;
    }
    Ok(())
}

pub(crate) fn run_aggregate(ctx: &mut Context, arg: &AggregateBaselinesArg) -> anyhow::Result<()> {
    let log = ctx.studied_forecasts()?;
    let aggregates = baseline::aggregate_baselines(&log)?;

    if let Some(path) = &arg.output {
        Output::save_json(&aggregates, Some(path.as_path()))?;
        tracing::info!(
            path = %path.display(),
            rows = aggregates.len(),
            "saved baseline aggregates"
        );
        return Ok(());
    }

    println!("Baseline Aggregates");
    println!("===================\n");
    print_aggregates(&aggregates);
    Ok(())
}

fn print_aggregates(aggregates: &[BaselineAggregate]) {
    const COLUMNS: [TableColumn; 5] = [
        TableColumn::left("IFP", 8),
        TableColumn::left("Option", 6),
        TableColumn::right("Users", 8),
        TableColumn::right("Mean", 8),
        TableColumn::right("Median", 8),
    ];
    let rows = aggregates
        .iter()
        .map(|a| {
            vec![
                a.ifp_id.clone(),
                a.answer_option.to_string(),
                a.n_users.to_string(),
                format!("{:.3}", a.mean),
                format!("{:.3}", a.median),
            ]
        })
        .collect::<Vec<_>>();
    print_table(&COLUMNS, &rows);
}
