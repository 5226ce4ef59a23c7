//! Crawler module for comment fetching and traversal
//!
//! This module contains the core crawling logic, including:
//! - Fetching comment pages and author metadata
//! - Depth-first traversal with cool-downs and retries
//! - Session lifecycle with pause, resume and cancel
//! - Events reported to the front-end

mod events;
mod fetcher;
mod session;
mod traversal;

#[cfg(test)]
mod test_support;

pub use events::{batch_percent, EventEmitter, SessionEvent, Severity};
pub use fetcher::{build_http_client, HttpFetcher, PageFetcher, PageRequest};
pub use session::{SessionController, SessionHandle};
pub use traversal::{CrawlSession, Traversal, TraversalOutcome, TraversalSettings};
