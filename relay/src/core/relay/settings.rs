//! Relay loop settings.

use std::fmt;
use std::time::Duration;

use crate::core::leg::DEFAULT_HANGUP_DIGIT;

/// Default capacity of the channels between the two pipelined tasks.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 64;

/// How the two directions of the relay are scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RelayMode {
    /// One sequential loop: each audio frame from the call leg is forwarded
    /// and followed by exactly one transport read.
    #[default]
    LockStep,
    /// A transport task and a call leg loop joined by bounded channels, so
    /// transport audio is delivered even while the call leg is silent.
    Pipelined,
}

impl RelayMode {
    #[inline]
    pub fn as_str(&self) -> &'static str {
        match self {
            RelayMode::LockStep => "lock-step",
            RelayMode::Pipelined => "pipelined",
        }
    }

    /// Parse a mode name, accepting `lock-step`, `lockstep`, `lock_step` and
    /// `pipelined` in any case.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "lock-step" | "lockstep" | "lock_step" => Some(RelayMode::LockStep),
            "pipelined" => Some(RelayMode::Pipelined),
            _ => None,
        }
    }
}

impl fmt::Display for RelayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Settings for one relay session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelaySettings {
    /// DTMF digit that ends the session successfully
    pub hangup_digit: char,
    pub mode: RelayMode,
    /// Upper bound on a single transport read. `None` waits forever.
    pub read_timeout: Option<Duration>,
    /// Consecutive forward failures tolerated before giving up.
    /// `None` tolerates any number.
    pub max_forward_failures: Option<u32>,
    /// Capacity of each pipelined channel
    pub channel_capacity: usize,
}

impl Default for RelaySettings {
    fn default() -> Self {
        Self {
            hangup_digit: DEFAULT_HANGUP_DIGIT,
            mode: RelayMode::default(),
            read_timeout: None,
            max_forward_failures: None,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

impl RelaySettings {
    pub fn with_mode(mut self, mode: RelayMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_hangup_digit(mut self, digit: char) -> Self {
        self.hangup_digit = digit;
        self
    }

    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = Some(timeout);
        self
    }

    pub fn with_max_forward_failures(mut self, limit: u32) -> Self {
        self.max_forward_failures = Some(limit);
        self
    }

    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_original_behavior() {
        let settings = RelaySettings::default();
        assert_eq!(settings.hangup_digit, '#');
        assert_eq!(settings.mode, RelayMode::LockStep);
        assert_eq!(settings.read_timeout, None);
        assert_eq!(settings.max_forward_failures, None);
        assert_eq!(settings.channel_capacity, DEFAULT_CHANNEL_CAPACITY);
    }

    #[test]
    fn test_mode_parse() {
        assert_eq!(RelayMode::parse("lock-step"), Some(RelayMode::LockStep));
        assert_eq!(RelayMode::parse("LockStep"), Some(RelayMode::LockStep));
        assert_eq!(RelayMode::parse("lock_step"), Some(RelayMode::LockStep));
        assert_eq!(RelayMode::parse(" Pipelined "), Some(RelayMode::Pipelined));
        assert_eq!(RelayMode::parse("parallel"), None);
    }

    #[test]
    fn test_mode_display_round_trips_through_parse() {
        for mode in [RelayMode::LockStep, RelayMode::Pipelined] {
            assert_eq!(RelayMode::parse(&mode.to_string()), Some(mode));
        }
    }
}
