use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use crate::types::{CostReport, FeatureDecision, RunResult, SchemaReport};

pub fn print_run_summary(result: &RunResult) {
    println!("Input: {}", result.input.display());
    println!("Output: {}", result.output_dir.display());
    println!("Manifest: {}", result.manifest.display());
    let counts = &result.counts;
    println!(
        "Subjects: {}  Features: {}  States: {}  Distinct sequences: {}",
        counts.subjects, counts.features, counts.alphabet_size, counts.distinct_sequences
    );
    if !counts.dropped_features.is_empty() {
        println!("Dropped (missing values): {}", counts.dropped_features.join(", "));
    }
    println!("{}", cluster_table(result));
    if !result.profiles.is_empty() {
        println!();
        println!("Profiles:");
        println!("{}", profile_table(result));
    }
}

pub fn cluster_table(result: &RunResult) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Cluster"),
        header_cell("Subjects"),
        header_cell("Share"),
        header_cell("Silhouette"),
        header_cell("Medoid"),
    ]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Center);
    align_column(&mut table, 1, CellAlignment::Right);
    align_column(&mut table, 2, CellAlignment::Right);
    align_column(&mut table, 3, CellAlignment::Right);

    let total = result.counts.subjects.max(1);
    for cluster in &result.clusters {
        table.add_row(vec![
            Cell::new(cluster.cluster)
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            Cell::new(cluster.size),
            Cell::new(format!(
                "{:.1}%",
                100.0 * cluster.size as f64 / total as f64
            )),
            silhouette_cell(cluster.silhouette),
            Cell::new(&cluster.medoid),
        ]);
    }
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        Cell::new(result.counts.subjects).add_attribute(Attribute::Bold),
        dim_cell("100%"),
        silhouette_cell(result.average_silhouette).add_attribute(Attribute::Bold),
        dim_cell("-"),
    ]);
    table
}

pub fn profile_table(result: &RunResult) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Variable"),
        header_cell("Observed"),
        header_cell("Chi-square"),
        header_cell("df"),
        header_cell("Cramér's V"),
    ]);
    apply_table_style(&mut table);
    for column in 1..5 {
        align_column(&mut table, column, CellAlignment::Right);
    }
    for profile in &result.profiles {
        let observed = Cell::new(profile.table.observed());
        match profile.association {
            Some(association) => table.add_row(vec![
                Cell::new(&profile.table.variable),
                observed,
                Cell::new(format!("{:.3}", association.chi_square)),
                Cell::new(association.degrees_of_freedom),
                Cell::new(format!("{:.3}", association.cramers_v)),
            ]),
            None => table.add_row(vec![
                Cell::new(&profile.table.variable),
                observed,
                dim_cell("-"),
                dim_cell("-"),
                dim_cell("-"),
            ]),
        };
    }
    table
}

pub fn print_schema_report(report: &SchemaReport) {
    println!("Input: {}", report.input.display());
    println!("Subjects: {}", report.subjects);
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Feature"),
        header_cell("Kind"),
        header_cell("Distinct"),
        header_cell("Missing"),
        header_cell("Encoder"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Right);
    align_column(&mut table, 3, CellAlignment::Right);
    for row in &report.features {
        let (distinct, missing) = if row.in_table {
            (Cell::new(row.distinct), count_cell(row.missing, Color::Yellow))
        } else {
            (dim_cell("-"), dim_cell("-"))
        };
        table.add_row(vec![
            Cell::new(&row.name),
            Cell::new(&row.kind),
            distinct,
            missing,
            decision_cell(row.decision),
        ]);
    }
    println!("{table}");
    if !report.undeclared.is_empty() {
        println!("Columns not in schema: {}", report.undeclared.join(", "));
    }
}

pub fn print_cost_report(report: &CostReport) {
    println!("{}", cost_table(report));
    if !report.low_support.is_empty() {
        println!(
            "States without outgoing transitions (cost 2): {}",
            report.low_support.join(", ")
        );
    }
    if !report.metric {
        println!("Substitution costs violate the triangle inequality.");
    }
}

pub fn cost_table(report: &CostReport) -> Table {
    let mut table = Table::new();
    let mut header = vec![header_cell("State")];
    header.extend(report.labels.iter().map(|label| header_cell(label)));
    table.set_header(header);
    apply_table_style(&mut table);
    for column in 1..=report.labels.len() {
        align_column(&mut table, column, CellAlignment::Right);
    }
    for (label, row) in report.labels.iter().zip(&report.costs) {
        let mut cells = vec![Cell::new(label).add_attribute(Attribute::Bold)];
        cells.extend(row.iter().map(|cost| {
            if *cost == 0.0 {
                dim_cell("0")
            } else {
                Cell::new(format!("{cost:.3}"))
            }
        }));
        table.add_row(cells);
    }
    table
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn silhouette_cell(width: f64) -> Cell {
    let cell = Cell::new(format!("{width:.3}"));
    if width < 0.0 {
        cell.fg(Color::Red)
    } else if width < 0.25 {
        cell.fg(Color::Yellow)
    } else {
        cell.fg(Color::Green)
    }
}

fn decision_cell(decision: FeatureDecision) -> Cell {
    let cell = Cell::new(decision.as_str());
    match decision {
        FeatureDecision::Encoded => cell.fg(Color::Green).add_attribute(Attribute::Bold),
        FeatureDecision::DroppedMissing => cell.fg(Color::Yellow),
        FeatureDecision::Absent => cell.fg(Color::Red),
        FeatureDecision::NotSequenced => cell.fg(Color::DarkGrey),
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
