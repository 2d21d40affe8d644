//! Application Lifecycle Management
//!
//! Host applications are registered under a name, run any number of relay
//! sessions, and are stopped when unregistered.
//!
//! # Lifecycle State Machine
//!
//! ```text
//!     +-------------+
//!     | Registered  |  (idle, accepting calls)
//!     +------+------+
//!            |  ^
//!  start()   |  |  last session ends
//!            v  |
//!     +------+------+
//!     |   Running   |  (one or more sessions active)
//!     +------+------+
//!            |
//!            v  stop()
//!     +------+------+
//!     |   Stopped   |  (new calls refused)
//!     +-------------+
//! ```

use async_trait::async_trait;
use std::time::Instant;

use crate::core::leg::CallLeg;
use crate::core::relay::RelayOutcome;

/// Application lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    /// Registered and idle
    Registered,

    /// At least one session is active
    Running,

    /// Unregistered; new invocations are refused
    Stopped,
}

impl std::fmt::Display for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AppState::Registered => write!(f, "registered"),
            AppState::Running => write!(f, "running"),
            AppState::Stopped => write!(f, "stopped"),
        }
    }
}

impl AppState {
    /// Check if a new session may start
    pub fn can_start(&self) -> bool {
        matches!(self, AppState::Registered | AppState::Running)
    }

    /// Check if the application can be stopped
    pub fn can_stop(&self) -> bool {
        !matches!(self, AppState::Stopped)
    }
}

/// An application the host invokes once per call.
#[async_trait]
pub trait HostApplication: Send + Sync {
    /// Name the application is registered under
    fn name(&self) -> &str;

    fn state(&self) -> AppState;

    /// Run the application against one call leg.
    ///
    /// `args` is the raw argument string supplied by the dial plan. Returns
    /// `0` on success and `-1` on failure.
    async fn start(&self, args: &str, leg: Box<dyn CallLeg>) -> i32;

    /// Refuse further invocations. Sessions already running are not
    /// interrupted.
    fn stop(&self);
}

/// Lifecycle bookkeeping for one application
#[derive(Debug)]
pub struct AppEntry {
    /// Current state
    pub state: AppState,

    /// Time when the application was registered
    pub registered_at: Instant,

    /// Time of the last session start or finish
    pub last_active: Instant,

    /// Sessions currently running
    pub active_sessions: u32,

    /// Sessions that finished with status `0`
    pub succeeded: u64,

    /// Sessions that failed or never started
    pub failed: u64,

    /// Outcome of the last completed relay, if any
    pub last_outcome: Option<RelayOutcome>,

    /// Last error message (if any)
    pub last_error: Option<String>,
}

impl AppEntry {
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            state: AppState::Registered,
            registered_at: now,
            last_active: now,
            active_sessions: 0,
            succeeded: 0,
            failed: 0,
            last_outcome: None,
            last_error: None,
        }
    }

    /// Record a session start. Returns `false` if the application is stopped.
    pub fn begin_session(&mut self) -> bool {
        if !self.state.can_start() {
            return false;
        }
        self.last_active = Instant::now();
        self.active_sessions += 1;
        self.transition(AppState::Running);
        true
    }

    /// Record a completed relay session
    pub fn finish_session(&mut self, outcome: RelayOutcome) {
        if outcome.is_success() {
            self.succeeded += 1;
        } else {
            self.failed += 1;
        }
        self.last_outcome = Some(outcome);
        self.end_session();
    }

    /// Record a session that failed before the relay started
    pub fn abort_session(&mut self, error: impl Into<String>) {
        self.failed += 1;
        self.last_error = Some(error.into());
        self.end_session();
    }

    /// Record an invocation refused without starting a session
    pub fn record_refused(&mut self, error: impl Into<String>) {
        self.failed += 1;
        self.last_error = Some(error.into());
    }

    fn end_session(&mut self) {
        self.last_active = Instant::now();
        self.active_sessions = self.active_sessions.saturating_sub(1);
        if self.active_sessions == 0 && self.state == AppState::Running {
            self.transition(AppState::Registered);
        }
    }

    /// Transition to a new state
    pub fn transition(&mut self, new_state: AppState) {
        if self.state != new_state {
            tracing::debug!(
                from = %self.state,
                to = %new_state,
                "Application state transition"
            );
        }
        self.state = new_state;
    }

    /// Get uptime since registration
    pub fn uptime(&self) -> std::time::Duration {
        self.registered_at.elapsed()
    }
}

impl Default for AppEntry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_state_display() {
        assert_eq!(format!("{}", AppState::Running), "running");
        assert_eq!(format!("{}", AppState::Stopped), "stopped");
    }

    #[test]
    fn test_app_state_transitions() {
        assert!(AppState::Registered.can_start());
        assert!(AppState::Running.can_start());
        assert!(!AppState::Stopped.can_start());
        assert!(AppState::Running.can_stop());
        assert!(!AppState::Stopped.can_stop());
    }

    #[test]
    fn test_app_entry_sessions() {
        let mut entry = AppEntry::new();
        assert_eq!(entry.state, AppState::Registered);

        assert!(entry.begin_session());
        assert!(entry.begin_session());
        assert_eq!(entry.state, AppState::Running);
        assert_eq!(entry.active_sessions, 2);

        entry.finish_session(RelayOutcome::UserHangupDigit);
        assert_eq!(entry.state, AppState::Running);

        entry.abort_session("connect failed");
        assert_eq!(entry.state, AppState::Registered);
        assert_eq!(entry.succeeded, 1);
        assert_eq!(entry.failed, 1);
        assert_eq!(entry.last_outcome, Some(RelayOutcome::UserHangupDigit));
        assert!(entry.last_error.as_ref().unwrap().contains("connect failed"));
    }

    #[test]
    fn test_stopped_entry_refuses_sessions() {
        let mut entry = AppEntry::new();
        entry.transition(AppState::Stopped);

        assert!(!entry.begin_session());
        assert_eq!(entry.active_sessions, 0);
    }

    #[test]
    fn test_session_finishing_after_stop_keeps_stopped() {
        let mut entry = AppEntry::new();
        assert!(entry.begin_session());
        entry.transition(AppState::Stopped);

        entry.finish_session(RelayOutcome::CallEnded);
        assert_eq!(entry.state, AppState::Stopped);
        assert_eq!(entry.failed, 1);
    }
}
