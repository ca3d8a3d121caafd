//! Pipeline run state machine
//!
//! ```text
//! Idle -> Fetching -> Processing -> Exporting -> Summarizing -> Done
//!            |                          |
//!            +--------> Aborted <-------+
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::ContractError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineState {
    #[default]
    Idle,
    Fetching,
    Processing,
    Exporting,
    Summarizing,
    Done,
    Aborted,
}

impl PipelineState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Fetching => "fetching",
            Self::Processing => "processing",
            Self::Exporting => "exporting",
            Self::Summarizing => "summarizing",
            Self::Done => "done",
            Self::Aborted => "aborted",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Aborted)
    }

    pub fn can_transition_to(&self, next: PipelineState) -> bool {
        use PipelineState::*;
        matches!(
            (self, next),
            (Idle, Fetching)
                | (Fetching, Processing)
                | (Fetching, Aborted)
                | (Processing, Exporting)
                | (Exporting, Summarizing)
                | (Exporting, Aborted)
                | (Summarizing, Done)
        )
    }

    /// Checked transition
    pub fn transition(self, next: PipelineState) -> Result<PipelineState, ContractError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(ContractError::InvalidTransition {
                from: self.to_string(),
                to: next.to_string(),
            })
        }
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path() {
        let mut state = PipelineState::Idle;
        for next in [
            PipelineState::Fetching,
            PipelineState::Processing,
            PipelineState::Exporting,
            PipelineState::Summarizing,
            PipelineState::Done,
        ] {
            state = state.transition(next).unwrap();
        }
        assert!(state.is_terminal());
    }

    #[test]
    fn test_abort_only_from_fetching_or_exporting() {
        assert!(PipelineState::Fetching.can_transition_to(PipelineState::Aborted));
        assert!(PipelineState::Exporting.can_transition_to(PipelineState::Aborted));
        assert!(!PipelineState::Processing.can_transition_to(PipelineState::Aborted));
        assert!(!PipelineState::Summarizing.can_transition_to(PipelineState::Aborted));
    }

    #[test]
    fn test_invalid_transition_error() {
        let err = PipelineState::Idle
            .transition(PipelineState::Done)
            .unwrap_err();
        assert!(err.to_string().contains("idle -> done"), "got: {err}");
    }
}
