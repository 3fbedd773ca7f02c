use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use curate_cli::types::{OutputStatus, TaskReport};

pub fn print_summary(report: &TaskReport) {
    println!("Task: {}", report.task);
    if report.dry_run {
        println!("Dry run: outputs written to {}", report.work_dir.display());
    }
    if report.outputs.is_empty() {
        println!("No outputs.");
        return;
    }
    println!("{}", summary_table(report));
}

fn summary_table(report: &TaskReport) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Output"),
        header_cell("Rows"),
        header_cell("Columns"),
        header_cell("Destination"),
        header_cell("Status"),
    ]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    align_column(&mut table, 2, CellAlignment::Right);

    let mut total_rows = 0usize;
    for output in &report.outputs {
        total_rows += output.rows;
        let destination = match &output.destination {
            Some(id) => Cell::new(id),
            None => dim_cell("-"),
        };
        let status = match &output.status {
            OutputStatus::Stored(id) => Cell::new(format!("stored {id}"))
                .fg(Color::Green)
                .add_attribute(Attribute::Bold),
            OutputStatus::Written(path) => Cell::new(path.display()).fg(Color::Yellow),
        };
        table.add_row(vec![
            Cell::new(&output.name),
            Cell::new(output.rows),
            Cell::new(output.columns),
            destination,
            status,
        ]);
    }
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        Cell::new(total_rows).add_attribute(Attribute::Bold),
        dim_cell("-"),
        dim_cell("-"),
        dim_cell(format!("{} outputs", report.outputs.len())),
    ]);
    table
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(140);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value.to_string()).add_attribute(Attribute::Dim)
}
