/*!
 * Console reporting for flatmd
 *
 * Formats the end-of-run statistics as a table using the tabled library.
 */

use std::time::Duration;

use tabled::{
    settings::{object::Columns, Alignment, Modify, Padding, Style},
    Table, Tabled,
};

use crate::utils::{estimate_tokens, format_file_size};

/// Statistics for one flatten run
#[derive(Debug, Clone, Default)]
pub struct FlattenReport {
    /// Primary output file path
    pub output_file: String,
    /// Time taken for the whole run
    pub duration: Duration,
    /// Number of files rendered into the output
    pub files_processed: usize,
    /// Number of files skipped (errors, size limit)
    pub files_skipped: usize,
    /// Number of directories scanned
    pub directories: usize,
    /// Total bytes of rendered content
    pub total_bytes: u64,
    /// Number of output parts written
    pub parts_written: usize,
}

/// Report generator for flatten results
pub struct Reporter;

impl Reporter {
    pub fn new() -> Self {
        Self
    }

    fn format_count(&self, num: usize) -> String {
        if num >= 1_000_000 {
            format!("{:.1}M", num as f64 / 1_000_000.0)
        } else if num >= 1_000 {
            format!("{:.1}K", num as f64 / 1_000.0)
        } else {
            num.to_string()
        }
    }

    /// Generate the console table for a report
    pub fn generate_report(&self, report: &FlattenReport) -> String {
        #[derive(Tabled)]
        struct SummaryRow {
            #[tabled(rename = "Metric")]
            key: String,

            #[tabled(rename = "Value")]
            value: String,
        }

        let mut rows = vec![
            SummaryRow {
                key: "📂 Output File".to_string(),
                value: report.output_file.clone(),
            },
            SummaryRow {
                key: "⏱️ Process Time".to_string(),
                value: format!("{:.4?}", report.duration),
            },
            SummaryRow {
                key: "📄 Files Flattened".to_string(),
                value: self.format_count(report.files_processed),
            },
            SummaryRow {
                key: "📁 Directories".to_string(),
                value: self.format_count(report.directories),
            },
            SummaryRow {
                key: "📏 Content Size".to_string(),
                value: format_file_size(report.total_bytes),
            },
            SummaryRow {
                key: "📦 LLM Tokens".to_string(),
                value: format!(
                    "{} tokens (estimated)",
                    self.format_count(estimate_tokens(report.total_bytes) as usize)
                ),
            },
        ];

        if report.files_skipped > 0 {
            rows.push(SummaryRow {
                key: "⚠️ Files Skipped".to_string(),
                value: self.format_count(report.files_skipped),
            });
        }
        if report.parts_written > 1 {
            rows.push(SummaryRow {
                key: "🗂️ Output Parts".to_string(),
                value: report.parts_written.to_string(),
            });
        }

        let mut table = Table::new(rows);
        table
            .with(Style::rounded())
            .with(Padding::new(1, 1, 0, 0))
            .with(Modify::new(Columns::new(..)).with(Alignment::left()));

        format!("✅  FLATTEN COMPLETE\n{}", table)
    }

    /// Print the report to stdout
    pub fn print_report(&self, report: &FlattenReport) {
        println!("\n{}", self.generate_report(report));
    }
}

impl Default for Reporter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_includes_counts_and_estimate() {
        let report = FlattenReport {
            output_file: "demo_flattened.md".to_string(),
            duration: Duration::from_millis(1234),
            files_processed: 1500,
            files_skipped: 2,
            directories: 12,
            total_bytes: 8000,
            parts_written: 1,
        };

        let out = Reporter::new().generate_report(&report);
        assert!(out.contains("demo_flattened.md"));
        assert!(out.contains("1.5K"));
        assert!(out.contains("2.0K tokens (estimated)"));
        assert!(out.contains("Files Skipped"));
        assert!(!out.contains("Output Parts"));
    }

    #[test]
    fn parts_row_appears_only_when_rotated() {
        let report = FlattenReport {
            parts_written: 3,
            ..Default::default()
        };
        let out = Reporter::new().generate_report(&report);
        assert!(out.contains("Output Parts"));
    }
}
