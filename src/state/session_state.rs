/// Session state definitions for the crawl lifecycle
///
/// `Idle → Running ⇄ Paused → {Completed, Failed, Cancelled}`; a terminal
/// session may be started again.
use std::fmt;

/// Represents the current state of a crawl session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SessionState {
    // ===== Initial State =====
    /// No run has been started yet
    #[default]
    Idle,

    // ===== Active States =====
    /// Traversal is fetching and accepting comments
    Running,

    /// Traversal is suspended at the pause gate (or will be at the next comment)
    Paused,

    // ===== Terminal States =====
    /// Traversal walked every reachable page
    Completed,

    /// The session could not start (bad URL or author lookup failure)
    Failed,

    /// The operator cancelled the run; partial results are kept
    Cancelled,
}

impl SessionState {
    /// Returns true if a traversal is in progress
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Running | Self::Paused)
    }

    /// Returns true if the run has ended
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled)
    }

    /// Returns true if a new run may be started from this state
    pub fn can_start(&self) -> bool {
        !self.is_active()
    }

    /// Checks whether moving to `next` is a legal transition
    pub fn can_transition_to(&self, next: SessionState) -> bool {
        use SessionState::*;

        match (self, next) {
            (Idle, Running) => true,
            (Running, Paused) | (Paused, Running) => true,
            (Running, Completed) | (Running, Cancelled) | (Running, Failed) => true,
            (Paused, Cancelled) | (Paused, Completed) | (Paused, Failed) => true,
            (Completed | Failed | Cancelled, Running) => true,
            _ => false,
        }
    }

    /// Short lowercase name used in logs
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Paused => "paused",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Returns all possible session states
    pub fn all_states() -> Vec<Self> {
        vec![
            Self::Idle,
            Self::Running,
            Self::Paused,
            Self::Completed,
            Self::Failed,
            Self::Cancelled,
        ]
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
