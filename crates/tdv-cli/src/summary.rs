use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{
    Attribute, Cell, CellAlignment, Color, ColumnConstraint, ContentArrangement, Table, Width,
};

use tdv_cli::logging::redact_value;
use tdv_cli::types::{BatchSummary, FileReport, FileStatus};

pub fn print_summary(summary: &BatchSummary) {
    if summary.dry_run {
        println!("Dry run: no files were moved or logged");
    }
    if summary.files.is_empty() && summary.skipped == 0 {
        println!("No files to process");
    }

    if !summary.files.is_empty() {
        let mut table = Table::new();
        table.set_header(vec![
            header_cell("File"),
            header_cell("Status"),
            header_cell("Records"),
            header_cell("Violations"),
            header_cell("Destination"),
        ]);
        apply_summary_table_style(&mut table);
        align_column(&mut table, 1, CellAlignment::Center);
        align_column(&mut table, 2, CellAlignment::Right);
        align_column(&mut table, 3, CellAlignment::Right);
        for file in &summary.files {
            table.add_row(vec![
                Cell::new(&file.file_name),
                status_cell(file.status),
                Cell::new(file.total_records),
                count_cell(file.violations.len(), Color::Red),
                destination_cell(file),
            ]);
        }
        println!("{table}");
    }

    print_violation_table(summary);

    let mut totals = Table::new();
    totals.set_header(vec![
        header_cell("Validated"),
        header_cell("Rejected"),
        header_cell("Errored"),
        header_cell("Skipped"),
    ]);
    apply_summary_table_style(&mut totals);
    totals.add_row(vec![
        count_cell(summary.validated, Color::Green),
        count_cell(summary.rejected, Color::Red),
        count_cell(summary.errored, Color::Yellow),
        count_cell(summary.skipped, Color::Yellow),
    ]);
    println!("{totals}");

    let errors: Vec<&FileReport> = summary
        .files
        .iter()
        .filter(|file| file.error.is_some())
        .collect();
    if !errors.is_empty() {
        eprintln!("Errors:");
        for file in errors {
            eprintln!(
                "- {}: {}",
                file.file_name,
                file.error.as_deref().unwrap_or_default()
            );
        }
    }
}

pub fn print_summary_json(summary: &BatchSummary) -> serde_json::Result<()> {
    println!("{}", serde_json::to_string_pretty(summary)?);
    Ok(())
}

fn print_violation_table(summary: &BatchSummary) {
    if let Some(table) = violation_table(summary) {
        println!();
        println!("Violations:");
        println!("{table}");
    }
}

/// Messages quote row values, so they are redacted unless `--log-data` is set.
fn violation_table(summary: &BatchSummary) -> Option<Table> {
    let rows: Vec<(&str, &tdv_model::Violation)> = summary
        .files
        .iter()
        .flat_map(|file| {
            file.violations
                .iter()
                .map(move |violation| (file.file_name.as_str(), violation))
        })
        .collect();
    if rows.is_empty() {
        return None;
    }

    let mut table = Table::new();
    table.set_header(vec![
        header_cell("File"),
        header_cell("Record"),
        header_cell("Field"),
        header_cell("Rule"),
        header_cell("Category"),
        header_cell("Message"),
    ]);
    apply_violation_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    for (file_name, violation) in rows {
        table.add_row(vec![
            Cell::new(file_name),
            violation
                .record_index
                .map(Cell::new)
                .unwrap_or_else(|| dim_cell("-")),
            violation
                .field_name
                .as_deref()
                .map(Cell::new)
                .unwrap_or_else(|| dim_cell("-")),
            Cell::new(violation.rule_code.as_str()).fg(Color::Red),
            Cell::new(violation.category.label()),
            Cell::new(redact_value(&violation.message)),
        ]);
    }
    Some(table)
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(140);
    if table.column_count() >= 5 {
        table.set_constraints(vec![
            ColumnConstraint::UpperBoundary(Width::Percentage(35)),
            ColumnConstraint::LowerBoundary(Width::Fixed(10)),
            ColumnConstraint::LowerBoundary(Width::Fixed(9)),
            ColumnConstraint::LowerBoundary(Width::Fixed(12)),
            ColumnConstraint::UpperBoundary(Width::Percentage(45)),
        ]);
    }
}

fn apply_violation_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::DynamicFullWidth)
        .set_width(180);
    if table.column_count() >= 6 {
        table.set_constraints(vec![
            ColumnConstraint::UpperBoundary(Width::Percentage(25)),
            ColumnConstraint::LowerBoundary(Width::Fixed(8)),
            ColumnConstraint::UpperBoundary(Width::Fixed(14)),
            ColumnConstraint::UpperBoundary(Width::Fixed(18)),
            ColumnConstraint::UpperBoundary(Width::Fixed(13)),
            ColumnConstraint::UpperBoundary(Width::Percentage(45)),
        ]);
    }
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn status_cell(status: FileStatus) -> Cell {
    match status {
        FileStatus::Archived => Cell::new("ARCHIVED")
            .fg(Color::Green)
            .add_attribute(Attribute::Bold),
        FileStatus::Rejected => Cell::new("REJECTED")
            .fg(Color::Red)
            .add_attribute(Attribute::Bold),
        FileStatus::Errored => Cell::new("ERROR").fg(Color::Yellow),
    }
}

fn destination_cell(file: &FileReport) -> Cell {
    match &file.destination {
        Some(path) => Cell::new(path.display()),
        None => dim_cell("-"),
    }
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
