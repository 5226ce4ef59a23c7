//! Crawl statistics
//!
//! Counters collected by the traversal and a formatted printout for the
//! end of a run.

use std::time::Duration;

/// Crawl statistics summary
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlStatistics {
    /// Total number of accepted records
    pub total_records: u64,

    /// Records fetched at the top level
    pub top_level_records: u64,

    /// Records fetched as replies
    pub reply_records: u64,

    /// Pages fetched successfully
    pub pages_fetched: u64,

    /// Pages abandoned after all attempts failed
    pub failed_fetches: u64,

    /// Extra fetch attempts made
    pub retries: u64,

    /// Cool-downs taken
    pub cooldowns: u64,

    /// Wall-clock duration of the traversal
    pub elapsed: Duration,
}

impl CrawlStatistics {
    /// Records accepted per second of traversal
    pub fn records_per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs == 0.0 {
            return 0.0;
        }
        self.total_records as f64 / secs
    }
}

/// Formats statistics as a plain-text report
pub fn format_statistics(stats: &CrawlStatistics) -> String {
    let mut out = String::new();

    out.push_str("=== Crawl Statistics ===\n\n");

    out.push_str("Records:\n");
    out.push_str(&format!("  Total: {}\n", stats.total_records));
    out.push_str(&format!("  Top-level comments: {}\n", stats.top_level_records));
    out.push_str(&format!("  Replies: {}\n", stats.reply_records));
    out.push('\n');

    out.push_str("Requests:\n");
    out.push_str(&format!("  Pages fetched: {}\n", stats.pages_fetched));
    out.push_str(&format!("  Failed pages: {}\n", stats.failed_fetches));
    out.push_str(&format!("  Retries: {}\n", stats.retries));
    out.push_str(&format!("  Cool-downs: {}\n", stats.cooldowns));
    out.push('\n');

    out.push_str(&format!(
        "Elapsed: {:.1}s ({:.2} records/sec)\n",
        stats.elapsed.as_secs_f64(),
        stats.records_per_second()
    ));

    out
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &CrawlStatistics) {
    print!("{}", format_statistics(stats));
}
