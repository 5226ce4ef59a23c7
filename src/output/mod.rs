//! Output module for exporting crawl results
//!
//! This module handles:
//! - Serializing records to CSV
//! - Saving exports through an [`ExportSink`]
//! - Recording and printing crawl statistics

mod csv_export;
pub mod stats;
mod traits;

pub use csv_export::{export_filename, serialize_records, BOM};
pub use stats::{format_statistics, print_statistics, CrawlStatistics};
pub use traits::{DirectorySink, ExportError, ExportFile, ExportResult, ExportSink};
