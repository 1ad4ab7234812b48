// End-of-run summary

use crate::export::ExportOutcome;
use harvester_scanner::ProductRecord;
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlSummary {
    pub total_records: usize,
    pub with_specs: usize,
    pub unique_links: usize,
    pub files_written: Vec<String>,
}

impl CrawlSummary {
    pub fn from_run(records: &[ProductRecord], outcomes: &[ExportOutcome]) -> Self {
        let unique_links = records
            .iter()
            .filter(|r| !r.link.is_empty())
            .map(|r| r.link.as_str())
            .collect::<HashSet<_>>()
            .len();

        let files_written = outcomes
            .iter()
            .filter_map(|outcome| match outcome {
                ExportOutcome::Written { path, .. } => Some(path.display().to_string()),
                ExportOutcome::Skipped => None,
            })
            .collect();

        Self {
            total_records: records.len(),
            with_specs: records.iter().filter(|r| r.specs.is_some()).count(),
            unique_links,
            files_written,
        }
    }

    /// Records whose link already appeared earlier in the run.
    pub fn duplicate_links(&self, records: &[ProductRecord]) -> usize {
        let linked = records.iter().filter(|r| !r.link.is_empty()).count();
        linked - self.unique_links
    }
}

/// Generate a plain-text summary of a finished run
pub fn generate_crawl_summary(records: &[ProductRecord], outcomes: &[ExportOutcome]) -> String {
    let summary = CrawlSummary::from_run(records, outcomes);

    let mut report = String::new();
    report.push_str("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n\n");
    report.push_str("# Summary:\n");
    report.push_str(&format!("  Records scraped: {}\n", summary.total_records));
    report.push_str(&format!("  With specs: {}\n", summary.with_specs));
    report.push_str(&format!("  Unique links: {}\n", summary.unique_links));

    let duplicates = summary.duplicate_links(records);
    if duplicates > 0 {
        report.push_str(&format!("  Repeated links: {} (kept as-is)\n", duplicates));
    }

    report.push_str("\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n\n");

    if summary.files_written.is_empty() {
        report.push_str("  No files written\n");
    } else {
        report.push_str("## Files\n");
        for path in &summary.files_written {
            report.push_str(&format!("  {}\n", path));
        }
    }

    report
}
