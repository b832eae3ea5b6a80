use std::borrow::Cow;
use std::fmt::Write as _;

use crate::{aggregate::Metric, analysis::AnalysisReport};

pub fn render_table(headers: &[String], rows: &[Vec<String>]) -> String {
    let mut widths = headers
        .iter()
        .map(|header| display_width(header).max(3))
        .collect::<Vec<_>>();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(display_width(cell));
        }
    }

    let mut output = String::new();
    let _ = writeln!(output, "{}", format_row(headers, &widths));
    let rule = widths
        .iter()
        .map(|width| "-".repeat(*width))
        .collect::<Vec<_>>();
    let _ = writeln!(output, "{}", format_row(&rule, &widths));
    for row in rows {
        let _ = writeln!(output, "{}", format_row(row, &widths));
    }
    output
}

pub fn print_table(headers: &[String], rows: &[Vec<String>]) {
    print!("{}", render_table(headers, rows));
}

/// Renders the per-column results of `report` with one row per column.
pub fn render_report(report: &AnalysisReport) -> String {
    let headers = ["column", "count", "sum", "average", "max"]
        .iter()
        .map(|header| header.to_string())
        .collect::<Vec<_>>();
    let rows = report
        .analysis
        .iter()
        .map(|column| {
            vec![
                column.column.clone(),
                column.count.to_string(),
                format_metric(column.sum),
                format_metric(column.average),
                format_metric(column.max),
            ]
        })
        .collect::<Vec<_>>();
    render_table(&headers, &rows)
}

pub fn format_metric(metric: Metric) -> String {
    match metric {
        Metric::Value(value) if value.fract() == 0.0 => format!("{value:.0}"),
        Metric::Value(value) => format!("{value:.2}"),
        Metric::Undeterminable => "-".to_string(),
    }
}

fn format_row(values: &[String], widths: &[usize]) -> String {
    let line = values
        .iter()
        .zip(widths)
        .map(|(value, width)| {
            let cell = sanitize_cell(value);
            let padding = width.saturating_sub(display_width(&cell));
            format!("{cell}{}", " ".repeat(padding))
        })
        .collect::<Vec<_>>()
        .join("  ");
    line.trim_end().to_string()
}

fn display_width(value: &str) -> usize {
    value.chars().count()
}

fn sanitize_cell(value: &str) -> Cow<'_, str> {
    if value.contains(['\n', '\r', '\t']) {
        Cow::Owned(value.replace(['\n', '\r', '\t'], " "))
    } else {
        Cow::Borrowed(value)
    }
}
