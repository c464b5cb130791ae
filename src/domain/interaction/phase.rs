//! Session phase state machine.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::StateMachine;

/// Where an interaction session is in its lifecycle.
///
/// `Idle → Collecting → Resolving → Resolved`, with `Idle → Resolving`
/// for single-step experiments. Rewinding steps back: `Collecting → Idle`
/// when the first choice is dropped, and `Resolved → Collecting` (or
/// `Idle` for single-step experiments) when a resolved session reopens.
/// `Resolving` is never left except by resolving or a reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    #[default]
    Idle,
    Collecting,
    Resolving,
    Resolved,
}

impl Phase {
    /// Returns true while the session still accepts choices.
    pub fn accepts_choices(&self) -> bool {
        matches!(self, Phase::Idle | Phase::Collecting)
    }
}

impl StateMachine for Phase {
    fn can_transition_to(&self, target: &Self) -> bool {
        use Phase::*;
        matches!(
            (self, target),
            (Idle, Collecting)
                | (Idle, Resolving)
                | (Collecting, Idle)
                | (Collecting, Resolving)
                | (Resolving, Resolved)
                | (Resolved, Collecting)
                | (Resolved, Idle)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use Phase::*;
        match self {
            Idle => vec![Collecting, Resolving],
            Collecting => vec![Idle, Resolving],
            Resolving => vec![Resolved],
            Resolved => vec![Collecting, Idle],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_phase_is_terminal() {
        for phase in [Phase::Idle, Phase::Collecting, Phase::Resolving, Phase::Resolved] {
            assert!(!phase.is_terminal());
        }
    }

    #[test]
    fn resolved_reopens_only_by_rewinding() {
        assert_eq!(Phase::Resolved.transition_to(Phase::Collecting), Ok(Phase::Collecting));
        assert_eq!(Phase::Resolved.transition_to(Phase::Idle), Ok(Phase::Idle));
        assert!(Phase::Resolved.transition_to(Phase::Resolving).is_err());
    }

    #[test]
    fn resolving_cannot_be_rewound() {
        assert!(Phase::Resolving.transition_to(Phase::Collecting).is_err());
        assert!(Phase::Resolving.transition_to(Phase::Idle).is_err());
    }

    #[test]
    fn cannot_skip_resolving() {
        assert!(Phase::Collecting.transition_to(Phase::Resolved).is_err());
        assert!(Phase::Idle.transition_to(Phase::Resolved).is_err());
    }

    #[test]
    fn single_step_experiments_go_straight_to_resolving() {
        assert_eq!(Phase::Idle.transition_to(Phase::Resolving), Ok(Phase::Resolving));
    }

    #[test]
    fn can_transition_to_is_consistent_with_valid_transitions() {
        for phase in [Phase::Idle, Phase::Collecting, Phase::Resolving, Phase::Resolved] {
            for target in phase.valid_transitions() {
                assert!(phase.can_transition_to(&target));
            }
        }
    }

    #[test]
    fn phase_serializes_snake_case() {
        assert_eq!(serde_json::to_string(&Phase::Resolving).unwrap(), "\"resolving\"");
    }
}
