use std::path::PathBuf;

use clap::Args;
use gjp_data::question::{Question, QuestionStatus};

use crate::{
    command::Context,
    table::{TableColumn, print_table},
    util::Output,
};

#[derive(Debug, Clone, Args)]
pub(crate) struct QuestionsArg {
    /// Include voided and non-binary questions
    #[arg(long)]
    all: bool,

    /// Write the questions as JSON to this file instead of printing a table
    #[arg(long)]
    output: Option<PathBuf>,
}

pub(crate) fn run(ctx: &mut Context, arg: &QuestionsArg) -> anyhow::Result<()> {
    let catalog = ctx.catalog()?;
    let questions = if arg.all {
        catalog.questions().iter().collect::<Vec<_>>()
    } else {
        catalog.simple()
    };

    if let Some(path) = &arg.output {
        Output::save_json(&questions, Some(path.as_path()))?;
        tracing::info!(path = %path.display(), questions = questions.len(), "saved questions");
        return Ok(());
    }

    let voided = catalog
        .questions()
        .iter()
        .filter(|q| q.status == QuestionStatus::Voided)
        .count();
    let non_binary = catalog
        .questions()
        .iter()
        .filter(|q| q.status != QuestionStatus::Voided && q.n_opts != 2)
        .count();

    println!("Question Catalog");
    println!("================\n");
    println!(
        "  Questions: {} total, {} voided, {} non-binary, {} studied\n",
        catalog.len(),
        voided,
        non_binary,
        catalog.len() - voided - non_binary,
    );
    print_questions(&questions);
    Ok(())
}

fn print_questions(questions: &[&Question]) {
    const COLUMNS: [TableColumn; 6] = [
        TableColumn::left("IFP", 8),
        TableColumn::left("Start", 10),
        TableColumn::left("Closed", 10),
        TableColumn::right("Opts", 4),
        TableColumn::left("Outcome", 7),
        TableColumn::left("Title", 48),
    ];
    let rows = questions
        .iter()
        .map(|q| {
            vec![
                q.ifp_id.clone(),
                q.date_start.to_string(),
                q.date_closed.map_or_else(|| "-".to_owned(), |d| d.to_string()),
                q.n_opts.to_string(),
                q.outcome.map_or_else(|| "-".to_owned(), |o| o.to_string()),
                q.short_title.clone(),
            ]
        })
        .collect::<Vec<_>>();
    print_table(&COLUMNS, &rows);
}
