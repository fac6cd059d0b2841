//! Table formatting utilities for CLI list commands
//!
//! Every list command builds [`TableRow`]s of typed [`CellValue`]s and hands
//! them to a [`TableFormatter`], which renders them as aligned columns, CSV,
//! markdown or bare IDs.
//!
//! # Text Wrapping
//!
//! The table formatter supports text wrapping for narrow terminals:
//! - Use `TableConfig::with_wrap(width)` to enable word-wrapped multi-line rows
//! - CSV and ID formats remain single-line for pipability

use chrono::{DateTime, Local, Utc};
use console::style;

use crate::cli::helpers::{escape_csv, format_peso, truncate_str};
use crate::cli::OutputFormat;
use crate::core::entity::{ReviewStatus, VerificationStatus};
use crate::entities::{ArticleStatus, DeliveryStatus};

/// Configuration for table output
#[derive(Debug, Clone)]
pub struct TableConfig {
    /// Maximum width for text columns before wrapping (None = truncate instead)
    pub wrap_width: Option<usize>,
    /// Show the footer line after the table
    pub show_summary: bool,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            wrap_width: None,
            show_summary: true,
        }
    }
}

impl TableConfig {
    /// Create config with text wrapping enabled at the specified width
    pub fn with_wrap(width: usize) -> Self {
        Self {
            wrap_width: Some(width),
            show_summary: true,
        }
    }

    /// Create config optimized for piping (no wrapping, no summary)
    pub fn for_pipe() -> Self {
        Self {
            wrap_width: None,
            show_summary: false,
        }
    }
}

/// Wrap text to fit within a maximum width, breaking at word boundaries
fn wrap_text(text: &str, max_width: usize) -> Vec<String> {
    if text.chars().count() <= max_width || max_width < 5 {
        return vec![text.to_string()];
    }

    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let word_len = word.chars().count();
        let current_len = current.chars().count();

        if !current.is_empty() && current_len + 1 + word_len <= max_width {
            current.push(' ');
            current.push_str(word);
            continue;
        }
        if !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }

        // Force-break words longer than a whole line
        let chars: Vec<char> = word.chars().collect();
        let mut chunks = chars.chunks(max_width).peekable();
        while let Some(chunk) = chunks.next() {
            let piece: String = chunk.iter().collect();
            if chunks.peek().is_some() {
                lines.push(piece);
            } else {
                current = piece;
            }
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

/// A typed cell value with semantic meaning for formatting
#[derive(Debug, Clone)]
pub enum CellValue {
    /// Backend record ID (cyan)
    Id(String),
    /// Plain text, truncated to the column width
    Text(String),
    /// Farmer/buyer/officer/harvest verification
    Verification(VerificationStatus),
    /// Sales report review
    Review(ReviewStatus),
    Delivery(DeliveryStatus),
    Article(ArticleStatus),
    /// Yes/no flag (yes=green, no=dim)
    Flag(bool),
    /// DateTime displayed as date only
    Date(Option<DateTime<Utc>>),
    /// DateTime displayed with time
    DateTime(Option<DateTime<Utc>>),
    Number(i64),
    /// Float value with precision
    Float(f64, usize),
    /// Peso amount
    Amount(f64),
    Empty,
}

impl CellValue {
    /// Format for TSV output (with colors if terminal)
    pub fn format_tsv(&self, width: usize) -> String {
        match self {
            CellValue::Id(id) => format!("{:<width$}", style(id).cyan(), width = width),
            CellValue::Text(s) => {
                let truncated = truncate_str(s, width.saturating_sub(2));
                format!("{:<width$}", truncated, width = width)
            }
            CellValue::Verification(status) => {
                let s = status.to_string();
                let styled = match status {
                    VerificationStatus::Pending => style(s).yellow(),
                    VerificationStatus::Verified => style(s).green(),
                    VerificationStatus::Rejected => style(s).red(),
                    VerificationStatus::Unknown => style(s).dim(),
                };
                format!("{:<width$}", styled, width = width)
            }
            CellValue::Review(status) => {
                let s = status.to_string();
                let styled = match status {
                    ReviewStatus::Pending => style(s).yellow(),
                    ReviewStatus::Approved => style(s).green(),
                    ReviewStatus::Rejected => style(s).red(),
                    ReviewStatus::Unknown => style(s).dim(),
                };
                format!("{:<width$}", styled, width = width)
            }
            CellValue::Delivery(status) => {
                let s = status.to_string();
                let styled = match status {
                    DeliveryStatus::Pending => style(s).yellow(),
                    DeliveryStatus::InTransit => style(s).cyan(),
                    DeliveryStatus::Delivered => style(s).green(),
                    DeliveryStatus::Cancelled => style(s).red().dim(),
                    DeliveryStatus::Unknown => style(s).dim(),
                };
                format!("{:<width$}", styled, width = width)
            }
            CellValue::Article(status) => {
                let s = status.to_string();
                let styled = match status {
                    ArticleStatus::Draft => style(s).dim(),
                    ArticleStatus::Published => style(s).green().bold(),
                    ArticleStatus::Unknown => style(s).dim(),
                };
                format!("{:<width$}", styled, width = width)
            }
            CellValue::Flag(on) => {
                let styled = if *on { style("yes").green() } else { style("no").dim() };
                format!("{:<width$}", styled, width = width)
            }
            CellValue::Date(_) | CellValue::DateTime(_) => {
                format!("{:<width$}", self.raw_or_dash(), width = width)
            }
            CellValue::Number(n) => format!("{:>width$}", n, width = width),
            CellValue::Float(f, precision) => {
                format!("{:>width$.prec$}", f, width = width, prec = precision)
            }
            CellValue::Amount(a) => format!("{:>width$}", format_peso(*a), width = width),
            CellValue::Empty => format!("{:<width$}", "-", width = width),
        }
    }

    /// Format for CSV output (RFC 4180, no colors)
    pub fn format_csv(&self) -> String {
        match self {
            CellValue::Id(s) | CellValue::Text(s) => escape_csv(s),
            CellValue::Amount(a) => format!("{:.2}", a),
            other => other.raw(),
        }
    }

    /// Format for Markdown output (no colors, escaped pipes)
    pub fn format_md(&self) -> String {
        let raw = match self {
            CellValue::Amount(a) => format_peso(*a),
            CellValue::Flag(true) => "**yes**".to_string(),
            other => other.raw_or_dash(),
        };
        raw.replace('|', "\\|")
    }

    /// Get raw string value (no formatting, for ID output)
    pub fn raw(&self) -> String {
        match self {
            CellValue::Id(s) | CellValue::Text(s) => s.clone(),
            CellValue::Verification(status) => status.to_string(),
            CellValue::Review(status) => status.to_string(),
            CellValue::Delivery(status) => status.to_string(),
            CellValue::Article(status) => status.to_string(),
            CellValue::Flag(on) => if *on { "yes" } else { "no" }.to_string(),
            CellValue::Date(dt) => dt
                .map(|d| d.with_timezone(&Local).format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            CellValue::DateTime(dt) => dt
                .map(|d| d.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_default(),
            CellValue::Number(n) => n.to_string(),
            CellValue::Float(f, precision) => format!("{:.prec$}", f, prec = precision),
            CellValue::Amount(a) => format!("{:.2}", a),
            CellValue::Empty => String::new(),
        }
    }

    fn raw_or_dash(&self) -> String {
        let raw = self.raw();
        if raw.is_empty() {
            "-".to_string()
        } else {
            raw
        }
    }

    /// Get the display width of this cell's content (for dynamic column sizing)
    pub fn display_width(&self) -> usize {
        match self {
            CellValue::Date(_) => 10,     // "YYYY-MM-DD"
            CellValue::DateTime(_) => 16, // "YYYY-MM-DD HH:MM"
            CellValue::Amount(a) => format_peso(*a).chars().count(),
            CellValue::Empty => 1,
            other => other.raw().chars().count(),
        }
    }
}

/// Column definition with header label and width
#[derive(Debug, Clone)]
pub struct ColumnDef {
    pub key: &'static str,
    pub header: &'static str,
    pub width: usize,
}

impl ColumnDef {
    pub const fn new(key: &'static str, header: &'static str, width: usize) -> Self {
        Self { key, header, width }
    }
}

/// A row of cell values for table output
pub struct TableRow {
    pub id: String,
    pub cells: Vec<(&'static str, CellValue)>,
}

impl TableRow {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            cells: Vec::new(),
        }
    }

    pub fn cell(mut self, key: &'static str, value: CellValue) -> Self {
        self.cells.push((key, value));
        self
    }

    pub fn get(&self, key: &str) -> Option<&CellValue> {
        self.cells.iter().find(|(k, _)| *k == key).map(|(_, v)| v)
    }
}

/// Table formatter that outputs rows in various formats
pub struct TableFormatter<'a> {
    columns: &'a [ColumnDef],
    entity_name: &'static str,
    footer: Option<String>,
    config: TableConfig,
}

impl<'a> TableFormatter<'a> {
    pub fn new(columns: &'a [ColumnDef], entity_name: &'static str) -> Self {
        Self {
            columns,
            entity_name,
            footer: None,
            config: TableConfig::default(),
        }
    }

    /// Extra text appended to the "N shown" line (e.g. page position)
    pub fn with_footer(mut self, footer: impl Into<String>) -> Self {
        self.footer = Some(footer.into());
        self
    }

    /// Configure the formatter with custom settings
    pub fn with_config(mut self, config: TableConfig) -> Self {
        self.config = config;
        self
    }

    /// Output rows in the specified format
    pub fn output<I>(&self, rows: I, format: OutputFormat)
    where
        I: IntoIterator<Item = TableRow>,
    {
        let rows: Vec<TableRow> = rows.into_iter().collect();

        match format {
            OutputFormat::Csv => self.output_csv(&rows),
            OutputFormat::Md => self.output_md(&rows),
            OutputFormat::Id => self.output_ids(&rows),
            _ => self.output_tsv(&rows),
        }
    }

    /// Calculate dynamic column widths based on actual content
    fn calculate_widths(&self, rows: &[TableRow]) -> Vec<usize> {
        self.columns
            .iter()
            .map(|col| {
                let max_content = rows
                    .iter()
                    .filter_map(|r| r.get(col.key))
                    .map(|v| v.display_width())
                    .max()
                    .unwrap_or(0);
                // +2 leaves room for the truncation buffer; capped at the defined width
                col.header.len().max(max_content.saturating_add(2)).min(col.width)
            })
            .collect()
    }

    fn output_tsv(&self, rows: &[TableRow]) {
        let widths = self.calculate_widths(rows);

        let header: Vec<String> = self
            .columns
            .iter()
            .zip(&widths)
            .map(|(col, w)| format!("{:<width$}", style(col.header).bold(), width = *w))
            .collect();
        println!("{}", header.join(" "));

        let total_width: usize = widths.iter().sum::<usize>() + widths.len().saturating_sub(1);
        println!("{}", "-".repeat(total_width));

        for row in rows {
            match self.config.wrap_width {
                Some(wrap) => self.output_tsv_row_wrapped(row, &widths, wrap),
                None => self.output_tsv_row_truncated(row, &widths),
            }
        }

        if self.config.show_summary {
            println!();
            let mut line = format!("{} {}(s) shown", style(rows.len()).cyan(), self.entity_name);
            if let Some(footer) = &self.footer {
                line.push_str(&format!(" {}", style(footer).dim()));
            }
            println!("{}", line);
        }
    }

    fn output_tsv_row_truncated(&self, row: &TableRow, widths: &[usize]) {
        let parts: Vec<String> = self
            .columns
            .iter()
            .zip(widths)
            .map(|(col, w)| match row.get(col.key) {
                Some(value) => value.format_tsv(*w),
                None => format!("{:<width$}", "-", width = *w),
            })
            .collect();
        println!("{}", parts.join(" "));
    }

    fn output_tsv_row_wrapped(&self, row: &TableRow, widths: &[usize], wrap_width: usize) {
        let wrapped: Vec<Vec<String>> = self
            .columns
            .iter()
            .zip(widths)
            .map(|(col, w)| match row.get(col.key) {
                // Only free text wraps
                Some(CellValue::Text(s)) => wrap_text(s, wrap_width.min(*w)),
                Some(value) => vec![value.raw_or_dash()],
                None => vec!["-".to_string()],
            })
            .collect();

        let max_lines = wrapped.iter().map(|c| c.len()).max().unwrap_or(1);
        for line_idx in 0..max_lines {
            let parts: Vec<String> = wrapped
                .iter()
                .zip(widths)
                .map(|(lines, w)| {
                    let content = lines.get(line_idx).map(|s| s.as_str()).unwrap_or("");
                    format!("{:<width$}", content, width = *w)
                })
                .collect();
            println!("{}", parts.join(" "));
        }

        if max_lines > 1 {
            println!();
        }
    }

    fn output_csv(&self, rows: &[TableRow]) {
        let headers: Vec<&str> = self.columns.iter().map(|c| c.key).collect();
        println!("{}", headers.join(","));

        for row in rows {
            let values: Vec<String> = self
                .columns
                .iter()
                .map(|col| row.get(col.key).map(|v| v.format_csv()).unwrap_or_default())
                .collect();
            println!("{}", values.join(","));
        }
    }

    fn output_md(&self, rows: &[TableRow]) {
        let headers: Vec<&str> = self.columns.iter().map(|c| c.header).collect();
        println!("| {} |", headers.join(" | "));
        let separators: Vec<&str> = headers.iter().map(|_| "---").collect();
        println!("|{}|", separators.join("|"));

        for row in rows {
            let values: Vec<String> = self
                .columns
                .iter()
                .map(|col| {
                    row.get(col.key)
                        .map(|v| v.format_md())
                        .unwrap_or_else(|| "-".to_string())
                })
                .collect();
            println!("| {} |", values.join(" | "));
        }
    }

    fn output_ids(&self, rows: &[TableRow]) {
        for row in rows {
            println!("{}", row.id);
        }
    }
}
