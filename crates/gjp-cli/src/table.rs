//! Console table display
//!
//! Reports print their results as fixed-width tables so that columns line up
//! regardless of the command.

use std::fmt::Write as _;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Align {
    Left,
    Right,
}

/// A column of a console table
#[derive(Debug, Clone, Copy)]
pub(crate) struct TableColumn {
    pub header: &'static str,
    pub width: usize,
    pub align: Align,
}

impl TableColumn {
    pub(crate) const fn left(header: &'static str, width: usize) -> Self {
        Self {
            header,
            width,
            align: Align::Left,
        }
    }

    pub(crate) const fn right(header: &'static str, width: usize) -> Self {
        Self {
            header,
            width,
            align: Align::Right,
        }
    }
}

fn format_line<'a, I>(columns: &[TableColumn], cells: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let mut line = String::from(" ");
    for (column, cell) in columns.iter().zip(cells) {
        // Overlong cells are cut so later columns stay aligned.
        let cell = truncate(cell, column.width);
        let width = column.width;
        let _ = match column.align {
            Align::Left => write!(line, " {cell:<width$}"),
            Align::Right => write!(line, " {cell:>width$}"),
        };
    }
    line.trim_end().to_owned()
}

fn truncate(cell: &str, width: usize) -> &str {
    match cell.char_indices().nth(width) {
        Some((idx, _)) => &cell[..idx],
        None => cell,
    }
}

/// Print table header
fn print_table_header(columns: &[TableColumn]) {
    println!("{}", format_line(columns, columns.iter().map(|c| c.header)));
}

/// Print table separator line
fn print_table_separator(columns: &[TableColumn]) {
    let total_width = columns.iter().map(|c| c.width).sum::<usize>() + columns.len();
    println!("  {}", "-".repeat(total_width.saturating_sub(1)));
}

/// Print a formatted table
///
/// # Arguments
/// * `columns` - Column layout, in display order
/// * `rows` - Cell texts of each row, one per column
pub(crate) fn print_table(columns: &[TableColumn], rows: &[Vec<String>]) {
    print_table_header(columns);
    print_table_separator(columns);
    for row in rows {
        println!("{}", format_line(columns, row.iter().map(String::as_str)));
    }
}
