//! Terminal output: aligned text tables or raw JSON.

use anyhow::Result;
use serde::Serialize;

/// Column separator width
const COLUMN_GAP: usize = 2;

/// Placeholder for missing values
pub const EMPTY: &str = "-";

/// Chooses between human-readable tables and JSON for every command.
#[derive(Debug, Clone, Copy)]
pub struct Output {
    json: bool,
}

impl Output {
    pub fn new(json: bool) -> Self {
        Self { json }
    }

    /// Print `value` as pretty JSON when `--json` is set, otherwise call `render`.
    pub fn emit<T: Serialize + ?Sized>(&self, value: &T, render: impl FnOnce(&T)) -> Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(value)?);
        } else {
            render(value);
        }
        Ok(())
    }

    /// Status lines go to stderr so `--json` output stays parseable.
    pub fn note(&self, message: &str) {
        eprintln!("{}", message);
    }
}

/// Left-aligned text table sized to its widest cell.
#[derive(Debug, Default)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: &[&str]) -> Self {
        Self {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    pub fn row(&mut self, cells: Vec<String>) {
        self.rows.push(cells);
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn widths(&self) -> Vec<usize> {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.chars().count()).collect();
        for row in &self.rows {
            for (i, cell) in row.iter().enumerate() {
                let len = cell.chars().count();
                match widths.get_mut(i) {
                    Some(w) => *w = (*w).max(len),
                    None => widths.push(len),
                }
            }
        }
        widths
    }

    pub fn render(&self) -> String {
        let widths = self.widths();
        let mut out = String::new();
        push_line(&mut out, &self.headers, &widths);
        for row in &self.rows {
            push_line(&mut out, row, &widths);
        }
        out
    }

    /// Print the table, or `empty_message` when there are no rows
    pub fn print_or(&self, empty_message: &str) {
        if self.is_empty() {
            println!("{}", empty_message);
        } else {
            print!("{}", self.render());
        }
    }
}

fn push_line(out: &mut String, cells: &[String], widths: &[usize]) {
    let last = cells.len().saturating_sub(1);
    let mut line = String::new();
    for (i, cell) in cells.iter().enumerate() {
        line.push_str(cell);
        if i < last {
            let pad = widths[i] - cell.chars().count() + COLUMN_GAP;
            line.push_str(&" ".repeat(pad));
        }
    }
    out.push_str(line.trim_end());
    out.push('\n');
}

/// Print aligned `label: value` pairs
pub fn print_fields(fields: &[(&str, String)]) {
    let width = fields.iter().map(|(label, _)| label.chars().count()).max().unwrap_or(0);
    for (label, value) in fields {
        println!("{:<width$}  {}", format!("{}:", label), value, width = width + 1);
    }
}

pub fn fmt_score(value: Option<f64>) -> String {
    value.map(|v| format!("{:.3}", v)).unwrap_or_else(|| EMPTY.to_string())
}

/// Confidence in [0, 1] as a whole percentage
pub fn fmt_percent(value: f64) -> String {
    format!("{:.0}%", value * 100.0)
}

pub fn fmt_id(value: Option<i64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| EMPTY.to_string())
}
