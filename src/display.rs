use std::io::Write;

use crate::colors::ColorScheme;
use crate::error::ExtractionError;
use crate::pipeline::context::ExtractionResult;
use crate::pipeline::ResultSink;
use crate::stats::StatValue;

const MIN_CELL_WIDTH: usize = 6;

/// Limits and styling for console rendering
#[derive(Debug, Clone)]
pub struct DisplayOptions {
    /// Maximum records (and groups) listed
    pub limit: usize,
    /// Maximum columns with a statistics block
    pub stats_columns: usize,
    pub use_colors: bool,
    pub width: usize,
}

impl Default for DisplayOptions {
    fn default() -> Self {
        DisplayOptions {
            limit: 20,
            stats_columns: 10,
            use_colors: false,
            width: 120,
        }
    }
}

pub struct ConsoleRenderer {
    options: DisplayOptions,
    colors: ColorScheme,
    output: Box<dyn Write>,
}

impl ConsoleRenderer {
    pub fn new(options: DisplayOptions, output: Box<dyn Write>) -> Self {
        let colors = ColorScheme::new(options.use_colors);
        ConsoleRenderer {
            options,
            colors,
            output,
        }
    }

    pub fn stdout(options: DisplayOptions) -> Self {
        Self::new(options, Box::new(std::io::stdout()))
    }
}

impl ResultSink for ConsoleRenderer {
    fn name(&self) -> &str {
        "console"
    }

    fn deliver(&mut self, result: &ExtractionResult) -> Result<(), ExtractionError> {
        render(&mut self.output, result, &self.options, &self.colors)?;
        self.output.flush()?;
        Ok(())
    }
}

/// Write a human-readable summary of the result
pub fn render<W: Write + ?Sized>(
    out: &mut W,
    result: &ExtractionResult,
    options: &DisplayOptions,
    colors: &ColorScheme,
) -> Result<(), ExtractionError> {
    writeln!(
        out,
        "{} {} records from {} lines ({}% efficiency) using {} pattern(s)",
        colors.paint(colors.heading, "Extracted"),
        colors.paint(colors.number, &result.records.len().to_string()),
        result.total_lines_processed(),
        result.processing_efficiency(),
        result.patterns_used.len()
    )?;

    let columns: Vec<&str> = result.columns.iter().map(String::as_str).collect();
    let painted: Vec<String> = columns
        .iter()
        .map(|c| colors.paint(colors.column, c))
        .collect();
    writeln!(out, "Columns ({}): {}", columns.len(), painted.join(", "))?;

    if !result.records.is_empty() {
        writeln!(out)?;
        render_records(out, result, &columns, options, colors)?;
    }

    if !columns.is_empty() && options.stats_columns > 0 {
        writeln!(out)?;
        render_statistics(out, result, &columns, options, colors)?;
    }

    if let Some(field) = &result.correlation_field {
        writeln!(out)?;
        render_groups(out, result, field, options, colors)?;
    }

    Ok(())
}

fn render_records<W: Write + ?Sized>(
    out: &mut W,
    result: &ExtractionResult,
    columns: &[&str],
    options: &DisplayOptions,
    colors: &ColorScheme,
) -> Result<(), ExtractionError> {
    let shown = result.records.len().min(options.limit);
    writeln!(
        out,
        "{}",
        colors.paint(
            colors.heading,
            &format!("Records (showing {} of {}):", shown, result.records.len())
        )
    )?;

    let mut headers = vec!["line", "pattern"];
    headers.extend(columns.iter().copied());

    let rows: Vec<Vec<String>> = result.records[..shown]
        .iter()
        .map(|record| {
            let mut row = vec![record.line_number.to_string(), record.pattern_index.to_string()];
            row.extend(
                columns
                    .iter()
                    .map(|c| record.fields.get(*c).cloned().unwrap_or_default()),
            );
            row
        })
        .collect();

    let widths = column_widths(&headers, &rows, options.width);

    let header_cells: Vec<String> = headers
        .iter()
        .zip(&widths)
        .map(|(h, w)| colors.paint(colors.column, &fit(h, *w)))
        .collect();
    writeln!(out, "  {}", header_cells.join("  "))?;

    for row in &rows {
        let cells: Vec<String> = row
            .iter()
            .zip(&widths)
            .enumerate()
            .map(|(i, (cell, w))| {
                let text = fit(cell, *w);
                if i < 2 {
                    colors.paint(colors.dim, &text)
                } else {
                    text
                }
            })
            .collect();
        writeln!(out, "  {}", cells.join("  ").trim_end())?;
    }
    Ok(())
}

fn render_statistics<W: Write + ?Sized>(
    out: &mut W,
    result: &ExtractionResult,
    columns: &[&str],
    options: &DisplayOptions,
    colors: &ColorScheme,
) -> Result<(), ExtractionError> {
    let shown = columns.len().min(options.stats_columns);
    writeln!(
        out,
        "{}",
        colors.paint(
            colors.heading,
            &format!("Column statistics (showing {} of {}):", shown, columns.len())
        )
    )?;

    for column in &columns[..shown] {
        let mut summary = Vec::new();
        let mut top = None;
        for (metric, value) in result.column_stats(column) {
            match value {
                StatValue::Frequencies(freq) => top = Some(freq),
                other => summary.push(format!(
                    "{}={}",
                    metric,
                    colors.paint(colors.number, &other.to_string())
                )),
            }
        }

        writeln!(
            out,
            "  {}: {}",
            colors.paint(colors.column, column),
            summary.join(" ")
        )?;
        if let Some(freq) = top.filter(|f| !f.is_empty()) {
            let entries: Vec<String> = freq
                .iter()
                .map(|(value, count)| format!("{} ({})", colors.paint(colors.value, value), count))
                .collect();
            writeln!(out, "    top: {}", entries.join(", "))?;
        }
    }
    Ok(())
}

fn render_groups<W: Write + ?Sized>(
    out: &mut W,
    result: &ExtractionResult,
    field: &str,
    options: &DisplayOptions,
    colors: &ColorScheme,
) -> Result<(), ExtractionError> {
    let shown = result.groups.len().min(options.limit);
    writeln!(
        out,
        "{}",
        colors.paint(
            colors.heading,
            &format!(
                "Correlation groups by {} (showing {} of {}):",
                field,
                shown,
                result.groups.len()
            )
        )
    )?;

    for group in &result.groups[..shown] {
        let lines: Vec<String> = group.line_numbers().iter().map(|n| n.to_string()).collect();
        let mut line = format!(
            "  {}  entries={}  lines={}",
            colors.paint(colors.value, &group.correlation_id),
            group.len(),
            colors.paint(colors.dim, &lines.join(","))
        );
        if let (Some(first), Some(last)) = (&group.earliest_timestamp, &group.latest_timestamp) {
            line.push_str(&format!(
                "  {} .. {}",
                colors.paint(colors.timestamp, first),
                colors.paint(colors.timestamp, last)
            ));
        }
        writeln!(out, "{}", line)?;
    }
    Ok(())
}

/// Natural width per column, shrunk evenly when the table is wider than the terminal
fn column_widths(headers: &[&str], rows: &[Vec<String>], max_width: usize) -> Vec<usize> {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let separators = 2 + 2 * widths.len().saturating_sub(1);
    let budget = max_width.saturating_sub(separators);
    let cap = (budget / widths.len().max(1)).max(MIN_CELL_WIDTH);
    if widths.iter().sum::<usize>() > budget {
        for width in &mut widths {
            *width = (*width).min(cap);
        }
    }
    widths
}

/// Pad or truncate to exactly `width` characters
fn fit(text: &str, width: usize) -> String {
    let len = text.chars().count();
    if len <= width {
        format!("{:<width$}", text, width = width)
    } else if width <= 3 {
        text.chars().take(width).collect()
    } else {
        let mut truncated: String = text.chars().take(width - 3).collect();
        truncated.push_str("...");
        truncated
    }
}
