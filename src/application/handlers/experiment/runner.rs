//! ExperimentRunner - drives one session through an experiment.
//!
//! Control flow per submitted choice:
//! 1. `OutcomeResolver` turns the requested option into the actual one
//! 2. The actual option is recorded on the `InteractionSession`
//! 3. On the final step the session is classified, stats and counters are
//!    persisted, and the reveal timeline is triggered
//!
//! The alternate outcome is computed on demand once the session is resolved.
//! Time is passed in explicitly as elapsed time since an arbitrary origin;
//! `RevealDriver` is the tokio-backed alternative for hosts that want the
//! stages pushed to them.

use std::time::Duration;

use crate::domain::counterfactual::{AlternateOutcome, AlternateOutcomeExplorer};
use crate::domain::experiments::ExperimentDefinition;
use crate::domain::foundation::{Percentage, SessionId, Timestamp, ValidationError};
use crate::domain::interaction::{
    Choice, Classification, InteractionError, InteractionSession, OptionIndex, OutcomeLabel, Phase,
};
use crate::domain::outcome::{OutcomeResolver, Resolution};
use crate::domain::reveal::{RevealScheduler, StageId, StageRevealed};
use crate::domain::stats::CappedCount;
use crate::ports::{RandomSource, StorageKey, StorageScopes};

use crate::application::handlers::stats::{CappedCounter, DerivedStatsStore};

/// Result of submitting one choice.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmitOutcome {
    /// The choice as recorded, i.e. with the actual option.
    pub choice: Choice,
    pub resolution: Resolution,
    /// Present when this choice completed the session.
    pub completion: Option<Completion>,
}

/// What a completed session produced.
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub classification: Classification,
    /// Share of completions with the same label, including this one.
    pub percentage: Option<Percentage>,
    /// Counter value after this completion, when the experiment keeps one.
    pub count: Option<CappedCount>,
}

/// Owns one `InteractionSession` and the components acting on it.
pub struct ExperimentRunner {
    definition: ExperimentDefinition,
    session: InteractionSession,
    resolver: OutcomeResolver,
    explorer: AlternateOutcomeExplorer,
    reveal: RevealScheduler,
    alternate_reveal: RevealScheduler,
    stats: Option<DerivedStatsStore>,
    counter: Option<CappedCounter>,
    random: Box<dyn RandomSource>,
    alternate: Option<AlternateOutcome>,
}

impl ExperimentRunner {
    /// Creates a runner with a fresh session.
    ///
    /// Persistence keys from the definition are placed under `namespace` in
    /// the persistent scope.
    pub fn new(
        definition: ExperimentDefinition,
        scopes: &StorageScopes,
        namespace: &str,
        random: Box<dyn RandomSource>,
    ) -> Result<Self, InteractionError> {
        let keys = definition.keys();

        let stats = match &keys.stats {
            Some(name) => Some(DerivedStatsStore::new(
                scopes.persistent.clone(),
                StorageKey::namespaced(namespace, name)?,
            )),
            None => None,
        };

        let counter = match &keys.counter {
            Some(name) => {
                let counter = CappedCounter::new(
                    scopes.persistent.clone(),
                    StorageKey::namespaced(namespace, name)?,
                );
                Some(match &keys.last_outcome {
                    Some(last) => {
                        counter.with_last_value_key(StorageKey::namespaced(namespace, last)?)
                    }
                    None => counter,
                })
            }
            None => None,
        };

        Ok(Self {
            session: definition.new_session()?,
            resolver: definition.resolver(),
            explorer: definition.explorer(),
            reveal: RevealScheduler::new(definition.reveal().clone()),
            alternate_reveal: RevealScheduler::new(definition.alternate_reveal().clone()),
            definition,
            stats,
            counter,
            random,
            alternate: None,
        })
    }

    // Accessors

    pub fn definition(&self) -> &ExperimentDefinition {
        &self.definition
    }

    pub fn session(&self) -> &InteractionSession {
        &self.session
    }

    pub fn stats(&self) -> Option<&DerivedStatsStore> {
        self.stats.as_ref()
    }

    pub fn counter(&self) -> Option<&CappedCounter> {
        self.counter.as_ref()
    }

    /// The alternate outcome, once `explore_alternate` has run.
    pub fn alternate(&self) -> Option<&AlternateOutcome> {
        self.alternate.as_ref()
    }

    /// Whether `stage` is visible on either timeline.
    pub fn is_visible(&self, stage: &StageId) -> bool {
        let id = self.session.id();
        self.reveal.is_visible(id, stage) || self.alternate_reveal.is_visible(id, stage)
    }

    /// Visible stages, main timeline first.
    pub fn visible_stages(&self) -> Vec<StageId> {
        let id = self.session.id();
        self.reveal
            .visible_stages(id)
            .iter()
            .chain(self.alternate_reveal.visible_stages(id))
            .cloned()
            .collect()
    }

    /// Earliest pending reveal across both timelines.
    pub fn next_due(&self) -> Option<Duration> {
        match (self.reveal.next_due(), self.alternate_reveal.next_due()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    // Commands

    /// Resolves and records the choice for the current step.
    pub async fn submit(
        &mut self,
        requested: OptionIndex,
        now: Duration,
    ) -> Result<SubmitOutcome, InteractionError> {
        if !self.session.phase().accepts_choices() {
            return Err(ValidationError::invalid_format(
                "state_transition",
                format!("Cannot submit a choice while {:?}", self.session.phase()),
            )
            .into());
        }

        let resolution = self.resolver.resolve_with(requested, self.random.as_mut())?;
        let choice = self.session.record_choice(resolution.actual)?;

        tracing::debug!(
            session_id = %self.session.id(),
            experiment = %self.definition.id(),
            step = choice.step,
            requested = resolution.requested.value(),
            actual = resolution.actual.value(),
            diverged = resolution.diverged,
            "Choice recorded"
        );

        let completion = if self.session.is_complete() {
            Some(self.complete(resolution.actual, now).await?)
        } else {
            None
        };

        Ok(SubmitOutcome {
            choice,
            resolution,
            completion,
        })
    }

    /// `submit` by option key.
    pub async fn submit_key(
        &mut self,
        key: &str,
        now: Duration,
    ) -> Result<SubmitOutcome, InteractionError> {
        let option = self.session.domain().index_of(key)?;
        self.submit(option, now).await
    }

    async fn complete(
        &mut self,
        last_actual: OptionIndex,
        now: Duration,
    ) -> Result<Completion, InteractionError> {
        self.session.begin_resolving()?;
        let classification = self.definition.classifier().classify(self.session.choices());
        self.session.resolve(classification.clone())?;

        let label = &classification.label;
        let percentage = match &self.stats {
            Some(stats) => stats
                .record_completion(label)
                .await
                .and_then(|updated| updated.percentage_for(label.as_str())),
            None => None,
        };

        let count = match &self.counter {
            Some(counter) => {
                let last = self.session.domain().key(last_actual)?;
                counter.bump(Some(last)).await
            }
            None => None,
        };

        self.reveal.trigger(*self.session.id(), now);

        tracing::debug!(
            session_id = %self.session.id(),
            experiment = %self.definition.id(),
            label = %label,
            percentage = ?percentage.map(|p| p.value()),
            "Session resolved"
        );

        Ok(Completion {
            classification,
            percentage,
            count,
        })
    }

    /// Fires reveal stages due at or before `now` and stamps them on the
    /// session. Stages from both timelines come back ordered by due time.
    pub fn advance_to(&mut self, now: Duration) -> Vec<StageRevealed> {
        let current = *self.session.id();
        let mut revealed = self.reveal.advance_to(now);
        revealed.extend(self.alternate_reveal.advance_to(now));
        revealed.sort_by_key(|r| r.due);

        revealed.retain(|r| r.session == current);
        for r in &revealed {
            self.session.mark_stage_revealed(r.stage.clone(), Timestamp::now());
            tracing::debug!(session_id = %current, stage = %r.stage, "Stage revealed");
        }
        revealed
    }

    /// Computes the single-flip alternate outcome and triggers its reveal.
    ///
    /// Only valid once the session is resolved.
    pub fn explore_alternate(
        &mut self,
        now: Duration,
    ) -> Result<Option<AlternateOutcome>, InteractionError> {
        let current = match (self.session.phase(), self.session.classification()) {
            (Phase::Resolved, Some(classification)) => classification.label.clone(),
            (phase, _) => {
                return Err(ValidationError::invalid_format(
                    "state_transition",
                    format!("Cannot explore alternates while {:?}", phase),
                )
                .into())
            }
        };

        let alternate = self
            .explorer
            .find_first_divergent_flip(self.session.choices(), &current)?;

        if let Some(alt) = &alternate {
            tracing::debug!(
                session_id = %self.session.id(),
                step = alt.step_number(),
                alternate = %alt.alternate_label(),
                changed = alt.changed,
                "Alternate outcome computed"
            );
            self.alternate_reveal.trigger(*self.session.id(), now);
        }

        self.alternate = alternate.clone();
        Ok(alternate)
    }

    /// Drops the last choice, cancelling any reveal in flight.
    ///
    /// Rewinding a resolved session moves it to a fresh id, so completing
    /// it again records stats and bumps counters as a new session.
    pub fn rewind(&mut self) -> Result<Option<Choice>, InteractionError> {
        if self.session.phase() == Phase::Resolving {
            return Err(ValidationError::invalid_format(
                "state_transition",
                "Cannot rewind while resolving",
            )
            .into());
        }
        self.cancel_reveals();
        self.alternate = None;
        let previous = *self.session.id();
        let dropped = self.session.rewind_last()?;
        if *self.session.id() != previous {
            tracing::debug!(
                previous_session_id = %previous,
                session_id = %self.session.id(),
                "Resolved session reopened"
            );
        }
        Ok(dropped)
    }

    /// Starts over with a fresh session id.
    ///
    /// Pending stages of the old session are cancelled and can never fire.
    pub fn reset(&mut self) -> SessionId {
        self.cancel_reveals();
        self.alternate = None;
        let previous = self.session.reset();
        tracing::debug!(
            previous_session_id = %previous,
            session_id = %self.session.id(),
            "Session reset"
        );
        previous
    }

    fn cancel_reveals(&mut self) {
        let id = *self.session.id();
        self.reveal.cancel(&id);
        self.alternate_reveal.cancel(&id);
    }

    /// Current share of completions with `label`.
    pub async fn percentage_for(&self, label: &OutcomeLabel) -> Option<Percentage> {
        self.stats.as_ref()?.percentage_for(label).await
    }
}

impl std::fmt::Debug for ExperimentRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExperimentRunner")
            .field("experiment", self.definition.id())
            .field("session", &self.session)
            .field("alternate", &self.alternate)
            .finish_non_exhaustive()
    }
}
