/// Term state definitions for tracking a prefix through the crawl
///
/// A term moves `Idle -> Probed -> Fetching -> Merged -> (Refining) -> Done`,
/// with shortcuts straight to `Done` when the probe fails or matches nothing.
use crate::SweepError;
use std::fmt;

/// Represents the current state of one prefix's crawl
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TermState {
    /// Nothing has been requested yet
    Idle,

    /// The count probe returned and was parsed
    Probed,

    /// Block requests are in flight
    Fetching,

    /// All block results have been folded into the term's set
    Merged,

    /// Longer prefixes are being crawled because the window saturated
    Refining,

    /// The term's symbol set is final
    Done,
}

impl TermState {
    /// Returns true if no further work will happen for the term
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done)
    }

    /// Returns true if moving from `self` to `next` is a legal step
    pub fn can_transition_to(&self, next: TermState) -> bool {
        matches!(
            (self, next),
            (Self::Idle, Self::Probed)
                | (Self::Idle, Self::Done)
                | (Self::Probed, Self::Fetching)
                | (Self::Probed, Self::Done)
                | (Self::Fetching, Self::Merged)
                | (Self::Merged, Self::Refining)
                | (Self::Merged, Self::Done)
                | (Self::Refining, Self::Done)
        )
    }

    /// Moves to `next`, rejecting steps the state machine does not allow
    pub fn transition(&mut self, next: TermState) -> Result<(), SweepError> {
        if !self.can_transition_to(next) {
            return Err(SweepError::InvalidTransition {
                from: *self,
                to: next,
            });
        }
        *self = next;
        Ok(())
    }

    /// Short lowercase name used in logs and reports
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Probed => "probed",
            Self::Fetching => "fetching",
            Self::Merged => "merged",
            Self::Refining => "refining",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for TermState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_path_with_refinement() {
        let mut state = TermState::Idle;
        for next in [
            TermState::Probed,
            TermState::Fetching,
            TermState::Merged,
            TermState::Refining,
            TermState::Done,
        ] {
            state.transition(next).unwrap();
        }
        assert!(state.is_terminal());
    }

    #[test]
    fn test_shortcuts_to_done() {
        assert!(TermState::Idle.can_transition_to(TermState::Done));
        assert!(TermState::Probed.can_transition_to(TermState::Done));
        assert!(TermState::Merged.can_transition_to(TermState::Done));
    }

    #[test]
    fn test_invalid_transitions() {
        let mut state = TermState::Idle;
        let err = state.transition(TermState::Fetching).unwrap_err();
        assert!(matches!(
            err,
            SweepError::InvalidTransition {
                from: TermState::Idle,
                to: TermState::Fetching
            }
        ));
        assert_eq!(state, TermState::Idle);

        assert!(!TermState::Fetching.can_transition_to(TermState::Done));
        assert!(!TermState::Done.can_transition_to(TermState::Idle));
        assert!(!TermState::Refining.can_transition_to(TermState::Merged));
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", TermState::Idle), "idle");
        assert_eq!(format!("{}", TermState::Refining), "refining");
        assert!(!TermState::Merged.is_terminal());
    }
}
