//! Session controller
//!
//! Owns one crawl at a time: parses the post URL, looks up the author, drives
//! the [`Traversal`] and keeps the collected records around for export. The
//! front-end talks to a running session through a cloneable
//! [`SessionHandle`].

use crate::comment::{NormalizedRecord, RecordExtractor};
use crate::config::Config;
use crate::crawler::events::{EventEmitter, Severity};
use crate::crawler::fetcher::PageFetcher;
use crate::crawler::traversal::{CrawlSession, Traversal, TraversalOutcome, TraversalSettings};
use crate::output::{
    export_filename, serialize_records, CrawlStatistics, ExportError, ExportFile, ExportSink,
};
use crate::state::{CrawlControl, SessionState};
use crate::url::{parse_post_url, PostReference};
use crate::{CrawlerError, Result};
use chrono::Utc;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::watch;

/// Cloneable control surface for a session
///
/// Pause and cancel requests only flip flags; the traversal observes them at
/// its next checkpoint.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    control: CrawlControl,
    state: Arc<watch::Sender<SessionState>>,
    events: EventEmitter,
}

impl SessionHandle {
    fn new(events: EventEmitter) -> Self {
        let (state, _) = watch::channel(SessionState::Idle);
        Self {
            control: CrawlControl::new(),
            state: Arc::new(state),
            events,
        }
    }

    pub fn state(&self) -> SessionState {
        *self.state.borrow()
    }

    /// Receiver notified on every state change
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// Pauses a running session or resumes a paused one
    ///
    /// Returns the new state. Any other state is rejected with
    /// [`CrawlerError::InvalidTransition`].
    pub fn toggle_pause(&self) -> Result<SessionState> {
        let mut outcome = Err(CrawlerError::InvalidTransition {
            from: SessionState::Idle,
            to: SessionState::Paused,
        });

        self.state.send_if_modified(|current| {
            let next = match *current {
                SessionState::Running => {
                    self.control.pause();
                    SessionState::Paused
                }
                SessionState::Paused => {
                    self.control.resume();
                    SessionState::Running
                }
                other => {
                    outcome = Err(CrawlerError::InvalidTransition {
                        from: other,
                        to: SessionState::Paused,
                    });
                    return false;
                }
            };
            *current = next;
            outcome = Ok(next);
            true
        });

        if let Ok(state) = &outcome {
            self.events.state(*state);
            if *state == SessionState::Paused {
                tracing::info!("Crawl paused");
                self.events.warning("Crawl paused");
            } else {
                tracing::info!("Crawl resumed");
                self.events.info("Crawl resumed");
            }
        }
        outcome
    }

    /// Requests cancellation of the active session
    pub fn cancel(&self) -> Result<()> {
        let current = self.state();
        if !current.is_active() {
            return Err(CrawlerError::InvalidTransition {
                from: current,
                to: SessionState::Cancelled,
            });
        }

        self.control.cancel();
        tracing::info!("Cancellation requested");
        self.events.warning("Stopping crawl...");
        Ok(())
    }

    fn transition(&self, to: SessionState) -> Result<()> {
        let mut outcome = Ok(());
        self.state.send_if_modified(|current| {
            if current.can_transition_to(to) {
                *current = to;
                true
            } else {
                outcome = Err(CrawlerError::InvalidTransition { from: *current, to });
                false
            }
        });

        if outcome.is_ok() {
            tracing::debug!("Session state -> {}", to);
            self.events.state(to);
        }
        outcome
    }
}

/// Drives crawl sessions against a [`PageFetcher`]
pub struct SessionController<F: PageFetcher> {
    fetcher: F,
    extractor: RecordExtractor,
    settings: TraversalSettings,
    fallback_name: String,
    handle: SessionHandle,
    session: CrawlSession,
    post: Option<PostReference>,
    author_name: Option<String>,
}

impl<F: PageFetcher> SessionController<F> {
    pub fn new(fetcher: F, config: &Config, events: EventEmitter) -> Self {
        Self {
            fetcher,
            extractor: RecordExtractor::new(config.output.timestamp_format.clone()),
            settings: TraversalSettings::from(&config.crawler),
            fallback_name: config.output.fallback_name.clone(),
            handle: SessionHandle::new(events),
            session: CrawlSession::new(),
            post: None,
            author_name: None,
        }
    }

    pub fn handle(&self) -> SessionHandle {
        self.handle.clone()
    }

    pub fn state(&self) -> SessionState {
        self.handle.state()
    }

    /// Records of the current or most recent run
    pub fn records(&self) -> &[NormalizedRecord] {
        self.session.records()
    }

    pub fn stats(&self) -> &CrawlStatistics {
        self.session.stats()
    }

    pub fn author_name(&self) -> Option<&str> {
        self.author_name.as_deref()
    }

    pub fn post(&self) -> Option<&PostReference> {
        self.post.as_ref()
    }

    /// Runs a full crawl of the post at `url`
    ///
    /// Resolves once the traversal has finished, returning
    /// [`SessionState::Completed`] or [`SessionState::Cancelled`]. A bad URL
    /// or a failed author lookup moves the session to
    /// [`SessionState::Failed`] and is returned as an error. Starting while
    /// another run is active fails with [`CrawlerError::SessionActive`].
    pub async fn start(&mut self, url: &str) -> Result<SessionState> {
        if !self.state().can_start() {
            return Err(CrawlerError::SessionActive);
        }

        self.handle.control.reset();
        self.session = CrawlSession::new();
        self.post = None;
        self.author_name = None;
        self.handle.transition(SessionState::Running)?;

        let events = self.handle.events.clone();
        events.info("Starting crawl...");
        tracing::info!("Starting crawl of {}", url);

        let post = match parse_post_url(url) {
            Ok(post) => post,
            Err(e) => {
                self.fail(format!("Invalid post URL: {}", e))?;
                return Err(e.into());
            }
        };

        let author_name = match self.fetcher.lookup_author_name(&post.author_id).await {
            Ok(name) => name,
            Err(e) => {
                self.fail(format!("Failed to look up post author: {}", e))?;
                return Err(e);
            }
        };

        tracing::info!(
            "Crawling post {} by {} (uid {})",
            post.post_id,
            author_name,
            post.author_id
        );
        events.info(format!("Author: {}", author_name));
        events.info(format!("uid: {}", post.author_id));
        events.info(format!("mid: {}", post.post_id));
        self.author_name = Some(author_name);

        let traversal = Traversal::new(
            &self.fetcher,
            &self.extractor,
            &self.settings,
            &self.handle.control,
            &events,
        );
        let outcome = traversal.run(&post, &mut self.session).await;
        self.post = Some(post);

        let count = self.session.count();
        let final_state = match outcome {
            TraversalOutcome::Completed => {
                events.progress(count, 100);
                events.log(
                    Severity::Success,
                    format!("Crawl finished, {} comments collected", count),
                );
                tracing::info!("Crawl completed with {} records", count);
                SessionState::Completed
            }
            TraversalOutcome::Cancelled => {
                events.warning(format!("Crawl cancelled, {} comments collected", count));
                tracing::warn!("Crawl cancelled after {} records", count);
                SessionState::Cancelled
            }
        };

        self.handle.transition(final_state)?;
        Ok(final_state)
    }

    /// Moves an abandoned active session to [`SessionState::Cancelled`]
    ///
    /// Needed when the future returned by [`start`](Self::start) was dropped
    /// before it resolved. Records collected so far stay available.
    pub fn force_stop(&mut self) -> Result<()> {
        let current = self.state();
        if !current.is_active() {
            return Ok(());
        }

        self.handle.control.cancel();
        tracing::warn!("Force-stopping {} session", current);
        self.handle.transition(SessionState::Cancelled)
    }

    /// Serializes the collected records into a named CSV file
    pub fn export(&self) -> Result<ExportFile> {
        let records = self.session.records();
        if records.is_empty() {
            self.handle.events.error("No comments to export");
            return Err(ExportError::Empty.into());
        }

        let bytes = serialize_records(records)?;
        let filename = export_filename(
            self.author_name.as_deref(),
            &self.fallback_name,
            Utc::now().date_naive(),
        );

        Ok(ExportFile { filename, bytes })
    }

    /// Exports the collected records through `sink`
    pub fn export_to(&self, sink: &dyn ExportSink) -> Result<PathBuf> {
        let file = self.export()?;
        let path = sink.save(&file.bytes, &file.filename)?;

        tracing::info!("Exported {} records to {}", self.session.count(), path.display());
        self.handle.events.log(
            Severity::Success,
            format!("Exported {} comments to {}", self.session.count(), path.display()),
        );
        Ok(path)
    }

    fn fail(&self, message: String) -> Result<()> {
        tracing::error!("{}", message);
        self.handle.events.error(message);
        self.handle.transition(SessionState::Failed)
    }
}
