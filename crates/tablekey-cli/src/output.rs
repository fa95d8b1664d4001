//! Output formatting for check reports and key listings.

use colored::Colorize;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Color, ContentArrangement, Table};
use serde_json::json;
use tablekey_core::{
    KeyItem, Message, RangeCheck, RangeKind, Severity, Structure, TableStructure,
    UniqueKeyValidator, ValidationOutcome,
};

use crate::load::LoadStats;

/// Output format of the `check` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

/// Stable label of a range check result.
pub fn range_check_label(check: RangeCheck) -> &'static str {
    match check {
        RangeCheck::NotApplicable => "not_applicable",
        RangeCheck::Performed => "performed",
        RangeCheck::Replayed => "replayed",
        RangeCheck::Skipped => "skipped",
    }
}

/// Prints the result of a validation pass.
pub fn print_check(
    table_name: &str,
    stats: &LoadStats,
    outcome: &ValidationOutcome,
    format: OutputFormat,
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => {
            let report = json!({
                "table": table_name,
                "rows": stats.rows,
                "ignored_columns": stats.ignored_columns,
                "missing_columns": stats.missing_columns,
                "range_check": range_check_label(outcome.range_check),
                "errors": outcome.messages.contains_errors(),
                "messages": outcome.messages,
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        OutputFormat::Table => print_check_table(table_name, stats, outcome),
    }
    Ok(())
}

fn print_check_table(table_name: &str, stats: &LoadStats, outcome: &ValidationOutcome) {
    println!(
        "{} {} ({} rows)",
        "Checked".bold(),
        table_name.cyan(),
        stats.rows
    );

    match outcome.range_check {
        RangeCheck::Skipped => println!(
            "{}",
            "Range keys not checked on a table this large; rerun with --explicit.".yellow()
        ),
        RangeCheck::Replayed => println!("{}", "Range key results replayed from the last explicit check.".dimmed()),
        RangeCheck::NotApplicable | RangeCheck::Performed => {}
    }

    if outcome.messages.is_empty() {
        println!("{}", "No unique key violations.".green());
        return;
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(
        ["Row", "Unique key", "Code", "Message"]
            .iter()
            .map(|h| Cell::new(h).fg(Color::Cyan))
            .collect::<Vec<_>>(),
    );
    for message in &outcome.messages {
        table.add_row(message_cells(message));
    }
    println!("{table}");

    let count = outcome
        .messages
        .iter()
        .filter(|m| m.severity == Severity::Error)
        .count();
    println!("{}", format!("{count} error(s)").red().bold());
}

fn message_cells(message: &Message) -> Vec<Cell> {
    let row = message
        .row_index
        .map_or_else(|| "-".to_string(), |index| (index + 1).to_string());
    let code = match message.severity {
        Severity::Error => Cell::new(&message.code).fg(Color::Red),
        Severity::Warning => Cell::new(&message.code).fg(Color::Yellow),
        Severity::Info => Cell::new(&message.code),
    };
    vec![
        Cell::new(row),
        Cell::new(message.unique_key.as_deref().unwrap_or("-")),
        code,
        Cell::new(&message.text),
    ]
}

fn item_description(item: &KeyItem) -> (String, &'static str) {
    match item {
        KeyItem::Column { column } => (column.clone(), "column"),
        KeyItem::Range(range) => {
            let kind = match range.kind {
                RangeKind::TwoColumn => "two-column range",
                RangeKind::OneColumnFrom => "one-column range (from)",
                RangeKind::OneColumnTo => "one-column range (to)",
            };
            (format!("{} [{}]", range.name, range.columns().join(" .. ")), kind)
        }
    }
}

/// Prints the unique keys of a structure and the inputs of the range cost
/// estimate.
pub fn print_keys(structure: &Structure) {
    println!("{} {}", "Structure".bold(), structure.name.cyan());

    if structure.unique_keys().is_empty() {
        println!("{}", "No unique keys declared.".dimmed());
        return;
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(
        ["Unique key", "Item", "Kind", "Resolved"]
            .iter()
            .map(|h| Cell::new(h).fg(Color::Cyan))
            .collect::<Vec<_>>(),
    );
    for key in structure.unique_keys() {
        for item in &key.items {
            let (name, kind) = item_description(item);
            let resolved = item
                .columns()
                .iter()
                .all(|column| structure.column_index(column).is_some());
            let resolved = if resolved {
                Cell::new("yes").fg(Color::Green)
            } else {
                Cell::new("no").fg(Color::Red)
            };
            table.add_row(vec![Cell::new(&key.name), Cell::new(name), Cell::new(kind), resolved]);
        }
    }
    println!("{table}");

    println!(
        "Two-column range items: {}",
        UniqueKeyValidator::range_item_count(structure)
    );
}
