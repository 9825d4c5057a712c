//! Output formatting for the CLI.

use std::time::Duration;

use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use market_commerce::Money;

/// Terminal output, styled for humans or silenced for `--json`.
#[derive(Clone)]
pub struct Output {
    verbose: bool,
    json: bool,
}

impl Output {
    /// Create a new output handler.
    pub fn new(verbose: bool, json: bool) -> Self {
        Self { verbose, json }
    }

    /// Human-readable lines are suppressed in JSON mode.
    fn human(&self) -> bool {
        !self.json
    }

    pub fn info(&self, msg: &str) {
        if self.human() {
            println!("{} {}", style("ℹ").blue(), msg);
        }
    }

    pub fn success(&self, msg: &str) {
        if self.human() {
            println!("{} {}", style("✓").green(), msg);
        }
    }

    pub fn warn(&self, msg: &str) {
        if self.human() {
            eprintln!("{} {}", style("⚠").yellow(), msg);
        }
    }

    /// Errors are printed in JSON mode too, as `{"error": ...}`.
    pub fn error(&self, msg: &str) {
        if self.human() {
            eprintln!("{} {}", style("✗").red(), style(msg).red());
        } else {
            eprintln!("{}", serde_json::json!({ "error": msg }));
        }
    }

    /// Only shown with `--verbose`.
    pub fn debug(&self, msg: &str) {
        if self.verbose && self.human() {
            eprintln!("{} {}", style("→").dim(), style(msg).dim());
        }
    }

    pub fn header(&self, msg: &str) {
        if self.human() {
            println!("\n{}", style(msg).bold().underlined());
        }
    }

    /// Pretty-print `value` as JSON regardless of mode.
    pub fn json<T: serde::Serialize>(&self, value: &T) {
        if let Ok(text) = serde_json::to_string_pretty(value) {
            println!("{}", text);
        }
    }

    pub fn kv(&self, key: &str, value: &str) {
        if self.human() {
            println!("  {}: {}", style(key).dim(), value);
        }
    }

    pub fn list_item(&self, item: &str) {
        if self.human() {
            println!("  {} {}", style("•").dim(), item);
        }
    }

    pub fn table_row(&self, cols: &[&str], widths: &[usize]) {
        if self.human() {
            println!("  {}", format_row(cols, widths));
        }
    }

    /// A steady spinner; hidden in JSON mode.
    pub fn spinner(&self, msg: &str) -> ProgressBar {
        if !self.human() {
            return ProgressBar::hidden();
        }

        let pb = ProgressBar::new_spinner();
        if let Ok(template) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
            pb.set_style(template);
        }
        pb.set_message(msg.to_string());
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    }

    pub fn is_json(&self) -> bool {
        self.json
    }
}

/// Pad each column to its width and join with two spaces.
pub fn format_row(cols: &[&str], widths: &[usize]) -> String {
    cols.iter()
        .zip(widths.iter())
        .map(|(col, width)| format!("{:width$}", col, width = width))
        .collect::<Vec<_>>()
        .join("  ")
        .trim_end()
        .to_string()
}

/// Format a minor-unit amount, highlighting the fee column.
pub fn fee_cell(fee: &Money) -> String {
    if fee.is_zero() {
        style(fee.display()).dim().to_string()
    } else {
        style(fee.display()).yellow().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_row_pads_columns() {
        assert_eq!(format_row(&["2", "Seller A"], &[4, 10]), "2     Seller A");
        assert_eq!(format_row(&["10", "x"], &[1, 1]), "10  x");
    }
}
