//! Plain-text output: tables, record details, errors.

use std::io::{self, Write};

use crate::error::CliError;

/// Widest a cell may grow before it is truncated.
const MAX_CELL_WIDTH: usize = 40;

/// Column-aligned table with a header row and separator.
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: &[&str]) -> Self {
        Self {
            headers: headers.iter().map(|h| (*h).to_string()).collect(),
            rows: Vec::new(),
        }
    }

    pub fn push(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    pub fn write_to(&self, out: &mut impl Write) -> io::Result<()> {
        let widths = self.widths();

        writeln!(out, "{}", build_row(&self.headers, &widths))?;
        writeln!(out, "{}", build_separator(&widths))?;
        for row in &self.rows {
            writeln!(out, "{}", build_row(row, &widths))?;
        }
        Ok(())
    }

    fn widths(&self) -> Vec<usize> {
        let mut widths: Vec<usize> = self
            .headers
            .iter()
            .map(|h| h.chars().count().min(MAX_CELL_WIDTH))
            .collect();
        for row in &self.rows {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.chars().count().min(MAX_CELL_WIDTH));
            }
        }
        widths
    }
}

fn build_separator(widths: &[usize]) -> String {
    widths
        .iter()
        .map(|w| "-".repeat(*w))
        .collect::<Vec<_>>()
        .join("-+-")
}

fn build_row(cells: &[String], widths: &[usize]) -> String {
    let line = widths
        .iter()
        .enumerate()
        .map(|(i, &w)| {
            let cell = truncate(cells.get(i).map_or("", String::as_str), w);
            if is_numeric_like(&cell) {
                format!("{cell:>w$}")
            } else {
                format!("{cell:<w$}")
            }
        })
        .collect::<Vec<_>>()
        .join(" | ");
    line.trim_end().to_string()
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let kept: String = s.chars().take(max.saturating_sub(1)).collect();
    format!("{kept}…")
}

fn is_numeric_like(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit() || c == '.' || c == '-')
        && s.chars().any(|c| c.is_ascii_digit())
}

/// `label: value` lines for a single record.
pub fn write_details(out: &mut impl Write, headers: &[&str], cells: &[String]) -> io::Result<()> {
    let width = headers.iter().map(|h| h.len()).max().unwrap_or(0);
    for (header, cell) in headers.iter().zip(cells) {
        writeln!(out, "{header:>width$}: {cell}")?;
    }
    Ok(())
}

/// Write a line to stdout.
pub fn line(text: impl std::fmt::Display) -> io::Result<()> {
    writeln!(io::stdout().lock(), "{text}")
}

/// Report a failed command on stderr.
pub fn error(err: &CliError) {
    // Nothing sensible remains to be done if stderr is gone.
    let _ = writeln!(io::stderr().lock(), "error: {}", err.user_message());
}

/// Cell text for an optional value.
pub fn opt<T: std::fmt::Display>(value: Option<&T>) -> String {
    value.map_or_else(|| "-".to_string(), ToString::to_string)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_table_alignment() {
        let mut table = Table::new(&["ID", "Name", "Amount"]);
        table.push(vec!["1".into(), "Maria".into(), "12.50".into()]);
        table.push(vec!["10".into(), "Jo".into(), "100.00".into()]);

        let mut out = Vec::new();
        table.write_to(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert_eq!(
            text,
            "ID | Name  | Amount\n\
             ---+-------+-------\n\
             \x201 | Maria |  12.50\n\
             10 | Jo    | 100.00\n"
        );
    }

    #[test]
    fn test_truncate_long_cells() {
        let long = "x".repeat(60);
        let cut = truncate(&long, MAX_CELL_WIDTH);
        assert_eq!(cut.chars().count(), MAX_CELL_WIDTH);
        assert!(cut.ends_with('…'));
    }

    #[test]
    fn test_details() {
        let mut out = Vec::new();
        write_details(&mut out, &["ID", "Title"], &["4".into(), "Bake sale".into()]).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "   ID: 4\nTitle: Bake sale\n");
    }

    #[test]
    fn test_opt_cell() {
        assert_eq!(opt::<String>(None), "-");
        assert_eq!(opt(Some(&"North".to_string())), "North");
    }
}
