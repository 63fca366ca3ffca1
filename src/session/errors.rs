//! Session errors: wiring bugs the state machine refuses to absorb
//!
//! Detects:
//! - Events delivered in a stage that has no transition for them
//! - Finishing a run that was never started
//! - Reading results before both runs are finished
//!
//! None of these are caused by user input. A mistyped email is a mistake
//! counted in the metrics, not an error raised here.

use super::state::Stage;
use crate::tasks::PresentationStyle;
use thiserror::Error;

/// Result alias for session transitions
pub type SessionResult<T> = std::result::Result<T, SessionError>;

/// Programmer/integration errors raised by the session core
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// The current stage has no transition for this event
    #[error("invalid transition: `{event}` is not accepted in stage `{stage}`")]
    InvalidTransition { stage: Stage, event: &'static str },

    /// `finish_run` was called for a style that never started a run
    #[error("no run was started for the {0} interface")]
    NoActiveRun(PresentationStyle),

    /// `start_run` was called while another run is still timing
    #[error("cannot start the {requested} run while the {running} run is in progress")]
    RunInProgress {
        running: PresentationStyle,
        requested: PresentationStyle,
    },

    /// A completion was reported for a style other than the active one
    #[error("completion reported for {reported} while the {active} run is active")]
    StyleMismatch {
        active: PresentationStyle,
        reported: PresentationStyle,
    },
}

impl SessionError {
    /// Shorthand used by the transition functions
    pub fn invalid(stage: Stage, event: &'static str) -> Self {
        SessionError::InvalidTransition { stage, event }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_transition_message_names_stage_and_event() {
        let err = SessionError::invalid(Stage::Intro, "complete");
        assert_eq!(
            err.to_string(),
            "invalid transition: `complete` is not accepted in stage `intro`"
        );
    }

    #[test]
    fn test_no_active_run_message() {
        let err = SessionError::NoActiveRun(PresentationStyle::Good);
        assert_eq!(err.to_string(), "no run was started for the good interface");
    }
}
