use clap::Args;
use gjp_data::forecast::{Column, ForecastLog};

use crate::{
    command::Context,
    table::{TableColumn, print_table},
};

#[derive(Debug, Clone, Args)]
pub(crate) struct ForecastsArg {
    /// Number of most active users to list
    #[arg(long, default_value_t = 10)]
    top_users: usize,
}

pub(crate) fn run(ctx: &mut Context, arg: &ForecastsArg) -> anyhow::Result<()> {
    let catalog = ctx.catalog()?;
    let log = ctx.forecasts()?;
    let studied = log.filter_studied(&catalog);

    println!("Forecast Log Report");
    println!("===================\n");

    print_overview(&log, &studied);
    println!();

    print_years(&log);
    println!();

    print_top_users(&studied, arg.top_users);
    Ok(())
}

#[expect(clippy::cast_precision_loss)]
fn print_overview(log: &ForecastLog, studied: &ForecastLog) {
    let columns = log
        .schema()
        .columns()
        .map(Column::name)
        .collect::<Vec<_>>();
    println!("Overall Statistics:");
    println!("  Columns: {}", columns.join(", "));
    println!(
        "  Events: {} total, {} on studied questions ({:.1}%)",
        log.len(),
        studied.len(),
        100.0 * studied.len() as f64 / log.len().max(1) as f64,
    );
    println!(
        "  Users: {} total, {} on studied questions",
        log.unique_users(),
        studied.unique_users()
    );
    println!(
        "  Question/user pairs without a `new` event: {}",
        studied.pairs_without_new()
    );
}

fn print_years(log: &ForecastLog) {
    const COLUMNS: [TableColumn; 2] = [
        TableColumn::left("Year", 6),
        TableColumn::right("Events", 10),
    ];
    if !log.schema().contains(Column::Year) {
        println!("Events by Year: `year` column not available");
        return;
    }
    println!("Events by Year:");
    let rows = log
        .counts_by_year()
        .into_iter()
        .map(|(year, count)| vec![year.to_string(), count.to_string()])
        .collect::<Vec<_>>();
    print_table(&COLUMNS, &rows);
}

fn print_top_users(studied: &ForecastLog, top_users: usize) {
    const COLUMNS: [TableColumn; 2] = [
        TableColumn::left("User", 12),
        TableColumn::right("Forecasts", 10),
    ];
    println!("Most Active Users (studied questions):");
    let rows = studied
        .forecast_counts_by_user()
        .into_iter()
        .take(top_users)
        .map(|c| vec![c.user_id, c.count.to_string()])
        .collect::<Vec<_>>();
    print_table(&COLUMNS, &rows);
    if let Some(user_id) = studied.most_active_user_id() {
        println!("\n  Most active user: {user_id}");
    }
}
