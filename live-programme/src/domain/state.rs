//! Per-streamer observation state machine used by the activity tracker.

use serde::{Deserialize, Serialize};

/// Last observed live state of a streamer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ObservedState {
    /// Never observed since the tracker started.
    #[default]
    Unknown,
    Offline,
    Live,
}

impl ObservedState {
    pub fn from_live(is_live: bool) -> Self {
        if is_live { Self::Live } else { Self::Offline }
    }

    pub fn is_live(&self) -> bool {
        matches!(self, Self::Live)
    }

    /// Apply an observation.
    ///
    /// Returns the next state and whether this observation started a new
    /// live session. Only `Unknown | Offline -> Live` starts a session.
    pub fn observe(self, is_live: bool) -> (Self, bool) {
        let next = Self::from_live(is_live);
        let went_live = next == Self::Live && self != Self::Live;
        (next, went_live)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "UNKNOWN",
            Self::Offline => "OFFLINE",
            Self::Live => "LIVE",
        }
    }
}

impl std::fmt::Display for ObservedState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_entering_live_starts_session() {
        assert_eq!(ObservedState::Unknown.observe(true), (ObservedState::Live, true));
        assert_eq!(ObservedState::Offline.observe(true), (ObservedState::Live, true));
        assert_eq!(ObservedState::Live.observe(true), (ObservedState::Live, false));
        assert_eq!(ObservedState::Live.observe(false), (ObservedState::Offline, false));
        assert_eq!(ObservedState::Unknown.observe(false), (ObservedState::Offline, false));
    }

    #[test]
    fn test_cycle_counts_sessions() {
        let observations = [true, false, true, false, true];
        let mut state = ObservedState::default();
        let mut sessions = 0;
        for is_live in observations {
            let (next, went_live) = state.observe(is_live);
            state = next;
            sessions += went_live as usize;
        }
        assert_eq!(sessions, 3);
        assert_eq!(state, ObservedState::Live);
    }
}
