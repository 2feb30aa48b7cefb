//! Progress reporting for table loads
//!
//! Progress messages always go through `tracing`; the `indicatif` bar is an
//! optional terminal view of the same counters.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

/// Progress display for one table load
pub struct TableProgress {
    bar: ProgressBar,
}

impl TableProgress {
    /// Create a visible progress bar
    ///
    /// # Arguments
    /// * `table` - Table being loaded, shown as the bar prefix
    /// * `total_records` - Number of data records in the source
    pub fn new(table: &str, total_records: u64) -> Self {
        let bar = ProgressBar::new(total_records);
        let style = ProgressStyle::with_template(
            "{spinner:.green} {prefix:<16} [{elapsed_precise}] {bar:40.cyan/blue} {pos:>9}/{len:9} ({eta})",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▓▒░  ");
        bar.set_style(style);
        bar.set_prefix(table.to_string());
        bar.enable_steady_tick(Duration::from_millis(100));

        Self { bar }
    }

    /// A progress reporter that draws nothing
    pub fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
        }
    }

    /// Update the number of records inserted
    pub fn set_position(&self, inserted: u64) {
        self.bar.set_position(inserted);
    }

    /// Finish with success message
    pub fn finish_success(&self, msg: &str) {
        self.bar.finish_with_message(format!("✓ {}", msg));
    }

    /// Finish with error message
    pub fn finish_error(&self, msg: &str) {
        self.bar.abandon_with_message(format!("✗ {}", msg));
    }
}

/// Percentage of `done` over `total`, zero for an empty total
pub fn percent(done: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        done as f64 / total as f64 * 100.0
    }
}

/// Format a number with thousand separators
pub fn format_number(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result.chars().rev().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(100), "100");
        assert_eq!(format_number(1000), "1,000");
        assert_eq!(format_number(1000000), "1,000,000");
    }

    #[test]
    fn test_percent() {
        assert_eq!(percent(0, 0), 0.0);
        assert_eq!(percent(0, 10), 0.0);
        assert_eq!(percent(5, 20), 25.0);
    }

    #[test]
    fn test_hidden_progress_accepts_updates() {
        let progress = TableProgress::hidden();
        progress.set_position(10);
        progress.finish_success("done");
    }
}
