use std::{collections::BTreeSet, path::PathBuf};

use clap::{Args, ValueEnum};
use gjp_analysis::{
    baseline,
    correlation::{self, CandidateCriteria, CorrelationPair, SortBy},
};

use crate::{
    command::Context,
    table::{TableColumn, print_table},
    util::Output,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum SortByArg {
    /// Question id ascending
    IfpId,
    /// Number of baselines descending
    Count,
}

impl From<SortByArg> for SortBy {
    fn from(value: SortByArg) -> Self {
        match value {
            SortByArg::IfpId => SortBy::IfpId,
            SortByArg::Count => SortBy::Count,
        }
    }
}

/// Options selecting the questions that take part in a correlation
#[derive(Debug, Clone, Args)]
pub(crate) struct CandidateArg {
    /// Minimum number of baselines per question
    #[arg(long, default_value_t = 2)]
    pub min_n: usize,

    /// Minimum number of distinct baseline values per question
    #[arg(long, default_value_t = 2)]
    pub min_unique: usize,

    /// Order of candidate questions before truncation
    #[arg(long, value_enum, default_value_t = SortByArg::IfpId)]
    pub sort_by: SortByArg,
}

impl CandidateArg {
    pub(crate) fn criteria(&self, first_k: Option<usize>) -> CandidateCriteria {
        CandidateCriteria {
            min_n: self.min_n,
            min_unique: self.min_unique,
            sort_by: self.sort_by.into(),
            first_k,
        }
    }
}

#[derive(Debug, Clone, Args)]
pub(crate) struct CorrPairsArg {
    #[clap(flatten)]
    candidates: CandidateArg,

    /// Use only the first K candidate questions
    #[arg(long)]
    first_k: Option<usize>,

    /// Number of pairs to report
    #[arg(long, default_value_t = 20)]
    top_k: usize,

    /// Write all pairs as JSON to this file
    #[arg(long)]
    output: Option<PathBuf>,
}

pub(crate) fn run(ctx: &mut Context, arg: &CorrPairsArg) -> anyhow::Result<()> {
    let log = ctx.studied_forecasts()?;
    let p_a = baseline::baseline_p_a(&log)?;
    let questions =
        correlation::select_candidate_questions(&p_a, &arg.candidates.criteria(arg.first_k));
    let matrix = correlation::pairwise_correlation(&p_a, &questions)?;
    let pairs = correlation::unique_pairs(&matrix);

    if let Some(path) = &arg.output {
        Output::save_json(&pairs, Some(path.as_path()))?;
        tracing::info!(path = %path.display(), pairs = pairs.len(), "saved correlation pairs");
    }

    println!("Baseline Correlation Pairs");
    println!("==========================\n");
    println!(
        "  Questions: {}, users: {}, defined pairs: {}\n",
        questions.len(),
        p_a.iter()
            .filter(|b| questions.contains(&b.ifp_id))
            .map(|b| b.user_id.as_str())
            .collect::<BTreeSet<_>>()
            .len(),
        pairs.len(),
    );
    print_pairs(&pairs[..arg.top_k.min(pairs.len())]);
    Ok(())
}

fn print_pairs(pairs: &[CorrelationPair]) {
    const COLUMNS: [TableColumn; 5] = [
        TableColumn::left("IFP x", 8),
        TableColumn::left("IFP y", 8),
        TableColumn::right("r", 8),
        TableColumn::right("r2", 8),
        TableColumn::right("Users", 8),
    ];
    let rows = pairs
        .iter()
        .map(|p| {
            vec![
                p.ifp_id_x.clone(),
                p.ifp_id_y.clone(),
                format!("{:+.3}", p.corr),
                format!("{:.3}", p.r2),
                p.n_users.to_string(),
            ]
        })
        .collect::<Vec<_>>();
    print_table(&COLUMNS, &rows);
}
