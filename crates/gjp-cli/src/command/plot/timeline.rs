use clap::Args;
use gjp_analysis::baseline;

use crate::{chart, command::Context, util};

#[derive(Debug, Clone, Args)]
pub(crate) struct IfpTimelineArg {
    /// Only questions whose title contains this text (case-insensitive)
    #[arg(long)]
    title_contains: Option<String>,
}

#[derive(Debug, Clone, Args)]
pub(crate) struct UserTimelineArg {
    /// User id; defaults to a user at the 80th percentile of activity
    #[arg(long)]
    user: Option<String>,

    /// Only questions whose title contains this text (case-insensitive)
    #[arg(long)]
    title_contains: Option<String>,
}

pub(crate) fn run_ifp(ctx: &mut Context, arg: &IfpTimelineArg) -> anyhow::Result<()> {
    let catalog = ctx.catalog()?;
    let questions = catalog
        .simple()
        .into_iter()
        .filter(|q| util::title_matches(&q.short_title, arg.title_contains.as_deref()))
        .collect::<Vec<_>>();
    if questions.is_empty() {
        anyhow::bail!("No studied questions match the title filter");
    }
    let title = format!("Studied questions ({})", questions.len());
    let spec = chart::timeline::ifp_timeline(&title, &questions);
    chart::save(&spec, &ctx.figure_path("ifp_timeline", None, "questions"))
}

pub(crate) fn run_user(ctx: &mut Context, arg: &UserTimelineArg) -> anyhow::Result<()> {
    let catalog = ctx.catalog()?;
    let log = ctx.studied_forecasts()?;
    let records = baseline::baselines(&log)?;

    let user_id = match &arg.user {
        Some(user_id) => user_id.clone(),
        None => {
            let user_id = baseline::pick_representative_user(&records)
                .ok_or_else(|| anyhow::anyhow!("No baselines to pick a user from"))?;
            tracing::info!(user = %user_id, "picked representative user");
            user_id
        }
    };

    let summaries = baseline::summarize_user_baselines(&records, &catalog, &user_id)
        .into_iter()
        .filter(|s| util::title_matches(&s.short_title, arg.title_contains.as_deref()))
        .collect::<Vec<_>>();
    if summaries.is_empty() {
        anyhow::bail!("User {user_id} has no baselines on matching closed questions");
    }
    let correct = summaries.iter().filter(|s| s.is_correct == Some(true)).count();
    let title = format!(
        "User {user_id}: {correct} of {} baselines favored the outcome",
        summaries.len()
    );
    let spec = chart::timeline::user_timeline(&title, &summaries);
    chart::save(
        &spec,
        &ctx.figure_path("user_timeline", Some(&user_id), "baselines"),
    )
}
