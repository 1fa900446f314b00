use std::collections::BTreeMap;

use clap::Args;
use gjp_analysis::baseline;
use gjp_stats::histogram::Histogram;

use crate::{chart, command::Context};

#[derive(Debug, Clone, Args)]
pub(crate) struct HistogramArg {
    /// Question id
    #[arg(long)]
    ifp: String,

    /// Number of bins over [0, 1]
    #[arg(long, default_value_t = 20)]
    max_bins: usize,
}

pub(crate) fn run(ctx: &mut Context, arg: &HistogramArg) -> anyhow::Result<()> {
    let catalog = ctx.catalog()?;
    let question = catalog
        .get(&arg.ifp)
        .filter(|q| q.is_studied())
        .ok_or_else(|| anyhow::anyhow!("Question {} is not a studied question", arg.ifp))?;
    let log = ctx.studied_forecasts()?;

    let mut values = BTreeMap::<_, Vec<f64>>::new();
    for record in baseline::baselines(&log)?
        .into_iter()
        .filter(|r| r.ifp_id == arg.ifp)
    {
        values.entry(record.answer_option).or_default().push(record.value);
    }
    if values.is_empty() {
        anyhow::bail!("No baselines for question {}", arg.ifp);
    }

    let n_users = values.values().map(Vec::len).max().unwrap_or_default();
    let histograms = values
        .into_iter()
        .map(|(option, values)| {
            let histogram = Histogram::with_domain(values, arg.max_bins, 0.0..1.0);
            (option, histogram)
        })
        .collect::<Vec<_>>();
    let title = format!("{} {} (n={n_users})", question.ifp_id, question.short_title);
    let spec = chart::histogram::prior_histogram(&title, &histograms);
    chart::save(
        &spec,
        &ctx.figure_path("forecast_priors_hist", Some(&arg.ifp), "baseline_hist"),
    )
}
