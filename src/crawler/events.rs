//! Session events consumed by the front-end
//!
//! The traversal and session controller report progress, log lines and state
//! changes through an [`EventEmitter`]. Events are fire-and-forget: a closed
//! or missing receiver never affects the crawl.

use crate::state::SessionState;
use std::fmt;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

/// Severity of a log event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Info => "info",
            Self::Success => "success",
            Self::Warning => "warning",
            Self::Error => "error",
        };
        write!(f, "{}", label)
    }
}

/// Event emitted during a session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// A record was accepted
    Progress {
        /// Records accepted so far
        count: u64,
        /// Position within the current cool-down batch, 0..=100
        percent: u8,
    },

    /// A human-readable log line
    Log { message: String, severity: Severity },

    /// The session moved to a new state
    StateChanged(SessionState),
}

/// Sending half of the event stream
#[derive(Debug, Clone, Default)]
pub struct EventEmitter {
    sender: Option<UnboundedSender<SessionEvent>>,
}

impl EventEmitter {
    /// Creates an emitter and the receiver the front-end reads from
    pub fn channel() -> (Self, UnboundedReceiver<SessionEvent>) {
        let (sender, receiver) = unbounded_channel();
        (
            Self {
                sender: Some(sender),
            },
            receiver,
        )
    }

    /// Creates an emitter that drops every event
    pub fn disabled() -> Self {
        Self { sender: None }
    }

    pub fn emit(&self, event: SessionEvent) {
        if let Some(sender) = &self.sender {
            let _ = sender.send(event);
        }
    }

    pub fn log(&self, severity: Severity, message: impl Into<String>) {
        self.emit(SessionEvent::Log {
            message: message.into(),
            severity,
        });
    }

    pub fn info(&self, message: impl Into<String>) {
        self.log(Severity::Info, message);
    }

    pub fn warning(&self, message: impl Into<String>) {
        self.log(Severity::Warning, message);
    }

    pub fn error(&self, message: impl Into<String>) {
        self.log(Severity::Error, message);
    }

    pub fn progress(&self, count: u64, percent: u8) {
        self.emit(SessionEvent::Progress { count, percent });
    }

    pub fn state(&self, state: SessionState) {
        self.emit(SessionEvent::StateChanged(state));
    }
}

/// Position of `count` within its cool-down batch, as a percentage
pub fn batch_percent(count: u64, batch: u64) -> u8 {
    if batch == 0 {
        return 0;
    }
    ((count % batch) * 100 / batch).min(100) as u8
}
