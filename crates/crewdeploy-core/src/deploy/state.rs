//! State machine for a single deployment attempt.
//!
//! ```text
//! Building ──ValidationPassed──► Validated ──RequestSent──► AwaitingPrimary
//!    │                                                        │      │
//!    └──ValidationFailed──► Failed             Accepted ◄─────┘      └──Rejected──► AwaitingFallback
//!                                                 │                                   │       │
//!                                                 ▼                          Accepted │       │ Rejected
//!                                             Succeeded ◄─────────────────────────────┘       ▼
//!                                                                                           Failed
//! ```

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeploymentState {
    Building,
    Validated,
    AwaitingPrimary,
    AwaitingFallback,
    Succeeded,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeploymentEvent {
    ValidationPassed,
    ValidationFailed,
    RequestSent,
    /// HTTP 200 or 201
    Accepted,
    /// Any other status, or no response at all
    Rejected,
}

impl DeploymentState {
    /// The state reached from `self` on `event`, or `None` if the
    /// transition is not allowed.
    pub fn next(self, event: DeploymentEvent) -> Option<Self> {
        use DeploymentEvent as E;
        use DeploymentState as S;
        match (self, event) {
            (S::Building, E::ValidationPassed) => Some(S::Validated),
            (S::Building, E::ValidationFailed) => Some(S::Failed),
            (S::Validated, E::RequestSent) => Some(S::AwaitingPrimary),
            (S::AwaitingPrimary, E::Accepted) => Some(S::Succeeded),
            (S::AwaitingPrimary, E::Rejected) => Some(S::AwaitingFallback),
            (S::AwaitingFallback, E::Accepted) => Some(S::Succeeded),
            (S::AwaitingFallback, E::Rejected) => Some(S::Failed),
            _ => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, DeploymentState::Succeeded | DeploymentState::Failed)
    }
}

/// Records every state visited, starting at `Building`.
#[derive(Debug, Clone)]
pub struct StateTrail {
    states: Vec<DeploymentState>,
}

impl StateTrail {
    pub fn new() -> Self {
        Self {
            states: vec![DeploymentState::Building],
        }
    }

    pub fn current(&self) -> DeploymentState {
        self.states
            .last()
            .copied()
            .unwrap_or(DeploymentState::Building)
    }

    /// Apply `event`. An illegal transition is logged and ends in `Failed`.
    pub fn advance(&mut self, event: DeploymentEvent) -> DeploymentState {
        let current = self.current();
        let next = current.next(event).unwrap_or_else(|| {
            tracing::error!(
                "[DeploymentState] Illegal transition from {:?} on {:?}",
                current,
                event
            );
            DeploymentState::Failed
        });
        self.states.push(next);
        next
    }

    pub fn into_states(self) -> Vec<DeploymentState> {
        self.states
    }
}

impl Default for StateTrail {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use DeploymentEvent as E;
    use DeploymentState as S;

    #[test]
    fn test_happy_path() {
        let mut trail = StateTrail::new();
        trail.advance(E::ValidationPassed);
        trail.advance(E::RequestSent);
        assert_eq!(trail.advance(E::Accepted), S::Succeeded);
        assert_eq!(
            trail.into_states(),
            vec![S::Building, S::Validated, S::AwaitingPrimary, S::Succeeded]
        );
    }

    #[test]
    fn test_fallback_then_failure() {
        let mut trail = StateTrail::new();
        trail.advance(E::ValidationPassed);
        trail.advance(E::RequestSent);
        assert_eq!(trail.advance(E::Rejected), S::AwaitingFallback);
        assert_eq!(trail.advance(E::Rejected), S::Failed);
        assert!(trail.current().is_terminal());
    }

    #[test]
    fn test_validation_failure_is_terminal() {
        assert_eq!(S::Building.next(E::ValidationFailed), Some(S::Failed));
        assert_eq!(S::Failed.next(E::RequestSent), None);
        assert_eq!(S::Succeeded.next(E::Rejected), None);
    }

    #[test]
    fn test_no_third_attempt_state() {
        // Nothing leads out of Failed, so a third request has no state.
        assert_eq!(S::Failed.next(E::Rejected), None);
        assert_eq!(S::Validated.next(E::Accepted), None);
    }

    #[test]
    fn test_illegal_transition_fails() {
        let mut trail = StateTrail::new();
        assert_eq!(trail.advance(E::Accepted), S::Failed);
    }
}
