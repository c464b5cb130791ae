//! InteractionSession aggregate - one run through an experiment.

use std::collections::BTreeMap;

use crate::domain::foundation::{ExperimentId, SessionId, StateMachine, Timestamp, ValidationError};
use crate::domain::reveal::StageId;

use super::{Choice, ChoiceDomain, ChoiceSequence, Classification, InteractionError, OptionIndex, Phase};

/// One visitor's pass through an experiment.
///
/// Owned exclusively by the active view. Choices are appended in step
/// order and never edited in place; `rewind_last` and `reset` are the only
/// ways back.
#[derive(Debug, Clone)]
pub struct InteractionSession {
    id: SessionId,
    experiment: ExperimentId,
    domain: ChoiceDomain,
    step_count: usize,
    choices: ChoiceSequence,
    phase: Phase,
    classification: Option<Classification>,
    started_at: Timestamp,
    resolved_at: Option<Timestamp>,
    revealed_at: BTreeMap<StageId, Timestamp>,
}

impl InteractionSession {
    /// Starts a new idle session.
    pub fn new(
        experiment: ExperimentId,
        domain: ChoiceDomain,
        step_count: usize,
    ) -> Result<Self, InteractionError> {
        if step_count == 0 {
            return Err(ValidationError::out_of_range("step_count", 1, i32::MAX, 0).into());
        }
        Ok(Self {
            id: SessionId::new(),
            experiment,
            domain,
            step_count,
            choices: ChoiceSequence::new(),
            phase: Phase::Idle,
            classification: None,
            started_at: Timestamp::now(),
            resolved_at: None,
            revealed_at: BTreeMap::new(),
        })
    }

    // Accessors

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn experiment(&self) -> &ExperimentId {
        &self.experiment
    }

    pub fn domain(&self) -> &ChoiceDomain {
        &self.domain
    }

    pub fn step_count(&self) -> usize {
        self.step_count
    }

    pub fn choices(&self) -> &ChoiceSequence {
        &self.choices
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn classification(&self) -> Option<&Classification> {
        self.classification.as_ref()
    }

    pub fn started_at(&self) -> &Timestamp {
        &self.started_at
    }

    pub fn resolved_at(&self) -> Option<&Timestamp> {
        self.resolved_at.as_ref()
    }

    pub fn revealed_at(&self, stage: &StageId) -> Option<&Timestamp> {
        self.revealed_at.get(stage)
    }

    /// Index of the step the next choice answers.
    pub fn current_step(&self) -> usize {
        self.choices.len()
    }

    /// Returns true once every step has a recorded choice.
    pub fn is_complete(&self) -> bool {
        self.choices.len() == self.step_count
    }

    // Commands

    /// Records the choice for the current step.
    pub fn record_choice(&mut self, option: OptionIndex) -> Result<Choice, InteractionError> {
        let step = self.current_step();
        self.record_choice_at(step, option)
    }

    /// Records a choice for an explicit step, which must be the current one.
    pub fn record_choice_at(
        &mut self,
        step: usize,
        option: OptionIndex,
    ) -> Result<Choice, InteractionError> {
        if !self.phase.accepts_choices() {
            return Err(ValidationError::invalid_format(
                "state_transition",
                format!("Cannot record a choice while {:?}", self.phase),
            )
            .into());
        }
        if self.is_complete() {
            return Err(InteractionError::SequenceFull {
                steps: self.step_count,
            });
        }
        let expected = self.current_step();
        if step != expected {
            return Err(InteractionError::StepOutOfOrder {
                expected,
                actual: step,
            });
        }
        let option = self.domain.check(option)?;

        if self.phase == Phase::Idle && self.step_count > 1 {
            self.phase = self.phase.transition_to(Phase::Collecting)?;
        }
        self.choices.push(option);
        Ok(Choice { step, option })
    }

    /// Moves a complete session into `Resolving`.
    pub fn begin_resolving(&mut self) -> Result<(), InteractionError> {
        if !self.is_complete() {
            return Err(InteractionError::SequenceIncomplete {
                recorded: self.choices.len(),
                steps: self.step_count,
            });
        }
        self.phase = self.phase.transition_to(Phase::Resolving)?;
        Ok(())
    }

    /// Stores the final classification and moves into `Resolved`.
    pub fn resolve(&mut self, classification: Classification) -> Result<(), InteractionError> {
        self.phase = self.phase.transition_to(Phase::Resolved)?;
        self.classification = Some(classification);
        self.resolved_at = Some(Timestamp::now());
        Ok(())
    }

    /// Records when a reveal stage became visible.
    ///
    /// The first timestamp wins; stages never un-reveal within a session.
    pub fn mark_stage_revealed(&mut self, stage: StageId, at: Timestamp) {
        self.revealed_at.entry(stage).or_insert(at);
    }

    /// Drops the last choice and reopens the session for input.
    ///
    /// Any classification and reveal progress is discarded. Reopening a
    /// `Resolved` session also assigns a fresh id, so the next completion
    /// counts as a new session. Fails while `Resolving`.
    pub fn rewind_last(&mut self) -> Result<Option<Choice>, InteractionError> {
        let Some(last) = self.choices.last() else {
            return Ok(None);
        };

        let target = if self.choices.len() == 1 {
            Phase::Idle
        } else {
            Phase::Collecting
        };
        let reopening = self.phase == Phase::Resolved;
        if self.phase != target {
            self.phase = self.phase.transition_to(target)?;
        }

        self.choices.pop();
        self.classification = None;
        self.resolved_at = None;
        self.revealed_at.clear();
        if reopening {
            self.id = SessionId::new();
        }
        Ok(Some(last))
    }

    /// Discards all progress and starts over under a fresh id.
    ///
    /// Returns the previous id so callers can invalidate anything keyed by it.
    pub fn reset(&mut self) -> SessionId {
        let previous = self.id;
        self.id = SessionId::new();
        self.choices.clear();
        self.phase = Phase::Idle;
        self.classification = None;
        self.started_at = Timestamp::now();
        self.resolved_at = None;
        self.revealed_at.clear();
        previous
    }
}
