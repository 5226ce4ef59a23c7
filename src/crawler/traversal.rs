//! Depth-first comment traversal
//!
//! Walks the top-level comment pages of a post and, for every top-level
//! comment with replies, the complete reply pagination of that comment
//! before moving on to its next sibling.
//!
//! The walk uses an explicit stack of frames instead of recursion. Each
//! frame is one comment level (the post, or one top-level comment's
//! replies) with its current cursor and the unprocessed rest of its page.
//! Only the top frame is ever advanced, which keeps the visiting order
//! depth-first.

use crate::comment::{FetchLevel, NormalizedRecord, RawComment, RawCommentPage, RecordExtractor};
use crate::config::CrawlerConfig;
use crate::crawler::events::{batch_percent, EventEmitter};
use crate::crawler::fetcher::{PageFetcher, PageRequest};
use crate::output::CrawlStatistics;
use crate::state::{CrawlControl, Gate};
use crate::url::PostReference;
use crate::CrawlerError;
use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Rate limiting and retry settings for a traversal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraversalSettings {
    /// Accepted records between cool-downs
    pub cooldown_interval: u64,

    /// Length of each cool-down
    pub cooldown: Duration,

    /// Extra attempts for a failed page fetch
    pub max_retries: u32,

    /// Delay between fetch attempts
    pub retry_delay: Duration,
}

impl From<&CrawlerConfig> for TraversalSettings {
    fn from(config: &CrawlerConfig) -> Self {
        Self {
            cooldown_interval: config.cooldown_interval,
            cooldown: config.cooldown(),
            max_retries: config.max_retries,
            retry_delay: config.retry_delay(),
        }
    }
}

impl Default for TraversalSettings {
    fn default() -> Self {
        Self::from(&CrawlerConfig::default())
    }
}

/// Records and counters accumulated by one run
///
/// Owned by whoever drives the traversal and reset at the start of every run.
#[derive(Debug, Clone, Default)]
pub struct CrawlSession {
    records: Vec<NormalizedRecord>,
    count: u64,
    last_cooldown_at: u64,
    stats: CrawlStatistics,
}

impl CrawlSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[NormalizedRecord] {
        &self.records
    }

    /// Number of accepted records (equals the last sequence number)
    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn stats(&self) -> &CrawlStatistics {
        &self.stats
    }
}

/// How a traversal ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraversalOutcome {
    /// Every reachable page was visited (failed branches are skipped, not fatal)
    Completed,
    /// Cancellation was observed at a checkpoint
    Cancelled,
}

/// One comment level on the traversal stack
#[derive(Debug)]
struct Frame {
    request: PageRequest,
    /// Unprocessed comments of the current page; `None` until fetched
    pending: Option<VecDeque<RawComment>>,
    next_cursor: Option<u64>,
}

impl Frame {
    fn new(request: PageRequest) -> Self {
        Self {
            request,
            pending: None,
            next_cursor: None,
        }
    }
}

/// Id to request replies for, matching the comment id written to the record
fn reply_target(raw: &RawComment) -> Option<u64> {
    raw.id_string().parse().ok().filter(|id| *id != 0)
}

/// The traversal controller
pub struct Traversal<'a, F: PageFetcher + ?Sized> {
    fetcher: &'a F,
    extractor: &'a RecordExtractor,
    settings: &'a TraversalSettings,
    control: &'a CrawlControl,
    events: &'a EventEmitter,
}

impl<'a, F: PageFetcher + ?Sized> Traversal<'a, F> {
    pub fn new(
        fetcher: &'a F,
        extractor: &'a RecordExtractor,
        settings: &'a TraversalSettings,
        control: &'a CrawlControl,
        events: &'a EventEmitter,
    ) -> Self {
        Self {
            fetcher,
            extractor,
            settings,
            control,
            events,
        }
    }

    /// Walks every comment of `post`, appending records to `session`
    pub async fn run(&self, post: &PostReference, session: &mut CrawlSession) -> TraversalOutcome {
        let started = Instant::now();
        let mut stack = vec![Frame::new(PageRequest::first_page(
            post.author_id.clone(),
            post.post_id,
            FetchLevel::TopLevel,
        ))];

        let outcome = loop {
            let Some(frame) = stack.last_mut() else {
                break TraversalOutcome::Completed;
            };

            if frame.pending.is_none() {
                if self.control.is_cancelled() {
                    break TraversalOutcome::Cancelled;
                }

                let fetched = self.fetch_with_retry(&frame.request, &mut session.stats).await;
                match fetched {
                    Ok(page) => {
                        frame.next_cursor = page.next_cursor();
                        frame.pending = Some(page.comments.into());
                    }
                    Err(e) => {
                        // Only this level's pagination chain ends; the parent carries on
                        session.stats.failed_fetches += 1;
                        tracing::error!("Abandoning branch {}: {}", frame.request.target_id, e);
                        self.events.error(format!("Failed to fetch comments: {}", e));
                        stack.pop();
                        continue;
                    }
                }
            }

            let Some(raw) = frame.pending.as_mut().and_then(VecDeque::pop_front) else {
                self.events
                    .info(format!("Total comments crawled so far: {}", session.count));

                match frame.next_cursor.take() {
                    Some(cursor) if !self.control.is_cancelled() => {
                        frame.request.cursor = Some(cursor);
                        frame.pending = None;
                    }
                    _ => {
                        stack.pop();
                    }
                }
                continue;
            };

            if self.control.is_cancelled() {
                break TraversalOutcome::Cancelled;
            }
            if self.control.wait_if_paused().await == Gate::Cancelled {
                break TraversalOutcome::Cancelled;
            }

            let level = frame.request.level;
            let author_id = frame.request.author_id.clone();

            self.accept(&raw, level, session);
            self.cool_down_if_due(session).await;

            if level == FetchLevel::TopLevel && raw.total_number > 0 {
                match reply_target(&raw) {
                    Some(target_id) => stack.push(Frame::new(PageRequest::first_page(
                        author_id,
                        target_id,
                        FetchLevel::Reply,
                    ))),
                    None => {
                        tracing::warn!(
                            "Comment '{}' has no numeric id, skipping replies",
                            raw.id_string()
                        );
                        self.events.warning(format!(
                            "Skipping replies of comment '{}': no usable id",
                            raw.id_string()
                        ));
                    }
                }
            }
        };

        session.stats.elapsed = started.elapsed();
        outcome
    }

    /// Assigns the next sequence number and stores the record
    fn accept(&self, raw: &RawComment, level: FetchLevel, session: &mut CrawlSession) {
        session.count += 1;
        let record = self.extractor.extract(raw, level, session.count);
        session.records.push(record);

        session.stats.total_records += 1;
        match level {
            FetchLevel::TopLevel => session.stats.top_level_records += 1,
            FetchLevel::Reply => session.stats.reply_records += 1,
        }

        self.events.progress(
            session.count,
            batch_percent(session.count, self.settings.cooldown_interval),
        );
    }

    /// Sleeps once every `cooldown_interval` accepted records
    async fn cool_down_if_due(&self, session: &mut CrawlSession) {
        let count = session.count;
        let interval = self.settings.cooldown_interval.max(1);
        if count == 0 || count % interval != 0 || count == session.last_cooldown_at {
            return;
        }

        session.last_cooldown_at = count;
        session.stats.cooldowns += 1;

        tracing::warn!(
            "Crawled {} comments, cooling down for {:?}",
            count,
            self.settings.cooldown
        );
        self.events.warning(format!(
            "Crawled {} comments, waiting {}s to avoid rate limiting...",
            count,
            self.settings.cooldown.as_secs()
        ));

        tokio::time::sleep(self.settings.cooldown).await;

        self.events.info("Cool-down finished, resuming");
    }

    async fn fetch_with_retry(
        &self,
        request: &PageRequest,
        stats: &mut CrawlStatistics,
    ) -> Result<RawCommentPage, CrawlerError> {
        let mut attempt = 0;
        loop {
            match self.fetcher.fetch_page(request).await {
                Ok(page) => {
                    stats.pages_fetched += 1;
                    return Ok(page);
                }
                Err(e) if attempt < self.settings.max_retries => {
                    attempt += 1;
                    stats.retries += 1;
                    tracing::warn!(
                        "Fetch of {} failed (attempt {}/{}): {}",
                        request.target_id,
                        attempt,
                        self.settings.max_retries + 1,
                        e
                    );
                    tokio::time::sleep(self.settings.retry_delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
