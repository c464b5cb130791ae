//! RevealScheduler - timed, monotonic, cancellable stage disclosure.
//!
//! The scheduler runs on an explicit timeline: callers pass "now" as the
//! elapsed time since an arbitrary origin. Real-time drivers and tests feed
//! it the same way, so sequencing is identical under both.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

use crate::domain::foundation::{SessionId, StateMachine};

use super::{RevealTimeline, StageId, TimerArena};

/// Reveal progress of one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RevealState {
    #[default]
    Idle,
    Scheduled,
    Complete,
}

impl StateMachine for RevealState {
    fn can_transition_to(&self, target: &Self) -> bool {
        use RevealState::*;
        matches!(
            (self, target),
            (Idle, Scheduled) | (Idle, Complete) | (Scheduled, Complete)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use RevealState::*;
        match self {
            Idle => vec![Scheduled, Complete],
            Scheduled => vec![Complete],
            Complete => vec![],
        }
    }
}

/// A stage that just became visible.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageRevealed {
    pub session: SessionId,
    pub stage: StageId,
    /// When the stage was due on the scheduler's timeline.
    pub due: Duration,
}

#[derive(Debug, Clone)]
struct SessionReveal {
    state: RevealState,
    triggered_at: Duration,
    visible: Vec<StageId>,
    remaining: usize,
}

/// Drives one reveal timeline for any number of sessions.
///
/// Every stage of a trigger becomes visible exactly once, no earlier than its
/// delay after the trigger, and stays visible until the session is cancelled.
#[derive(Debug, Clone)]
pub struct RevealScheduler {
    timeline: RevealTimeline,
    arena: TimerArena<SessionId, StageId>,
    sessions: HashMap<SessionId, SessionReveal>,
}

impl RevealScheduler {
    pub fn new(timeline: RevealTimeline) -> Self {
        Self {
            timeline,
            arena: TimerArena::new(),
            sessions: HashMap::new(),
        }
    }

    pub fn timeline(&self) -> &RevealTimeline {
        &self.timeline
    }

    /// Enters `Scheduled` for `session`, arming one timer per stage.
    ///
    /// Re-triggering cancels whatever the session had pending first.
    pub fn trigger(&mut self, session: SessionId, now: Duration) -> RevealState {
        self.cancel(&session);

        let state = if self.timeline.is_empty() {
            RevealState::Complete
        } else {
            RevealState::Scheduled
        };

        for entry in self.timeline.stages() {
            self.arena
                .arm(session, now.saturating_add(entry.delay), entry.stage.clone());
        }

        self.sessions.insert(
            session,
            SessionReveal {
                state,
                triggered_at: now,
                visible: Vec::with_capacity(self.timeline.len()),
                remaining: self.timeline.len(),
            },
        );

        tracing::debug!(
            session_id = %session,
            stages = self.timeline.len(),
            "Reveal scheduled"
        );
        state
    }

    /// Fires every timer due at or before `now` and returns the stages that
    /// became visible, in firing order.
    pub fn advance_to(&mut self, now: Duration) -> Vec<StageRevealed> {
        let mut revealed = Vec::new();

        for fired in self.arena.fire_due(now) {
            let Some(progress) = self.sessions.get_mut(&fired.owner) else {
                continue;
            };
            progress.visible.push(fired.payload.clone());
            progress.remaining = progress.remaining.saturating_sub(1);
            if progress.remaining == 0 {
                progress.state = RevealState::Complete;
            }
            revealed.push(StageRevealed {
                session: fired.owner,
                stage: fired.payload,
                due: fired.due,
            });
        }

        revealed
    }

    /// Invalidates every pending timer of `session` and clears its progress.
    ///
    /// Returns true if the session had anything scheduled or visible.
    pub fn cancel(&mut self, session: &SessionId) -> bool {
        let dropped = self.arena.cancel_owner(session);
        let known = self.sessions.remove(session).is_some();
        if dropped > 0 {
            tracing::debug!(session_id = %session, dropped, "Reveal cancelled");
        }
        known || dropped > 0
    }

    pub fn state(&self, session: &SessionId) -> RevealState {
        self.sessions
            .get(session)
            .map(|s| s.state)
            .unwrap_or_default()
    }

    pub fn is_visible(&self, session: &SessionId, stage: &StageId) -> bool {
        self.sessions
            .get(session)
            .map(|s| s.visible.contains(stage))
            .unwrap_or(false)
    }

    /// Visible stages of `session` in the order they appeared.
    pub fn visible_stages(&self, session: &SessionId) -> &[StageId] {
        self.sessions
            .get(session)
            .map(|s| s.visible.as_slice())
            .unwrap_or(&[])
    }

    /// When `session` was last triggered.
    pub fn triggered_at(&self, session: &SessionId) -> Option<Duration> {
        self.sessions.get(session).map(|s| s.triggered_at)
    }

    /// Earliest pending due time across all sessions.
    pub fn next_due(&self) -> Option<Duration> {
        self.arena.next_due()
    }

    pub fn pending_for(&self, session: &SessionId) -> usize {
        self.arena.pending_for(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    fn stage(id: &str) -> StageId {
        StageId::new(id).unwrap()
    }

    fn scheduler() -> RevealScheduler {
        RevealScheduler::new(RevealTimeline::from_millis([(100, "a"), (300, "b")]).unwrap())
    }

    #[test]
    fn stage_visibility_follows_delays() {
        let mut s = scheduler();
        let session = SessionId::new();
        assert_eq!(s.trigger(session, ms(0)), RevealState::Scheduled);

        let revealed = s.advance_to(ms(150));
        assert_eq!(revealed.len(), 1);
        assert!(s.is_visible(&session, &stage("a")));
        assert!(!s.is_visible(&session, &stage("b")));
        assert_eq!(s.state(&session), RevealState::Scheduled);

        s.advance_to(ms(350));
        assert!(s.is_visible(&session, &stage("a")));
        assert!(s.is_visible(&session, &stage("b")));
        assert_eq!(s.state(&session), RevealState::Complete);
    }

    #[test]
    fn trigger_near_end_of_time_saturates() {
        let mut s = scheduler();
        let session = SessionId::new();
        s.trigger(session, Duration::MAX);

        assert_eq!(s.next_due(), Some(Duration::MAX));
        assert_eq!(s.advance_to(Duration::MAX).len(), 2);
        assert_eq!(s.state(&session), RevealState::Complete);
    }

    #[test]
    fn cancel_before_first_stage_prevents_all_reveals() {
        let mut s = scheduler();
        let session = SessionId::new();
        s.trigger(session, ms(0));
        s.advance_to(ms(50));

        assert!(s.cancel(&session));

        assert!(s.advance_to(ms(10_000)).is_empty());
        assert!(!s.is_visible(&session, &stage("a")));
        assert!(!s.is_visible(&session, &stage("b")));
        assert_eq!(s.state(&session), RevealState::Idle);
    }

    #[test]
    fn each_stage_is_revealed_exactly_once() {
        let mut s = scheduler();
        let session = SessionId::new();
        s.trigger(session, ms(0));

        let mut all = Vec::new();
        for t in (0..=1_000).step_by(25) {
            all.extend(s.advance_to(ms(t)));
        }
        let ids: Vec<_> = all.iter().map(|r| r.stage.as_str().to_string()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(s.visible_stages(&session), &[stage("a"), stage("b")]);
    }

    #[test]
    fn delays_are_relative_to_trigger_time() {
        let mut s = scheduler();
        let session = SessionId::new();
        s.trigger(session, ms(1_000));

        assert!(s.advance_to(ms(1_099)).is_empty());
        let revealed = s.advance_to(ms(1_100));
        assert_eq!(revealed[0].due, ms(1_100));
        assert_eq!(s.triggered_at(&session), Some(ms(1_000)));
    }

    #[test]
    fn retrigger_cancels_previous_timers() {
        let mut s = scheduler();
        let session = SessionId::new();
        s.trigger(session, ms(0));
        s.trigger(session, ms(200));

        assert_eq!(s.pending_for(&session), 2);
        // the first trigger's "a" at 100 must not fire
        assert!(s.advance_to(ms(250)).is_empty());
        assert_eq!(s.advance_to(ms(300)).len(), 1);
    }

    #[test]
    fn equal_delays_fire_in_declaration_order() {
        let timeline =
            RevealTimeline::from_millis([(100, "first"), (100, "second"), (100, "third")]).unwrap();
        let mut s = RevealScheduler::new(timeline);
        let session = SessionId::new();
        s.trigger(session, ms(0));

        let order: Vec<_> = s
            .advance_to(ms(100))
            .into_iter()
            .map(|r| r.stage.as_str().to_string())
            .collect();
        assert_eq!(order, vec!["first", "second", "third"]);
    }

    #[test]
    fn sessions_are_isolated() {
        let mut s = scheduler();
        let one = SessionId::new();
        let two = SessionId::new();
        s.trigger(one, ms(0));
        s.trigger(two, ms(0));

        s.cancel(&one);
        let revealed = s.advance_to(ms(400));

        assert!(revealed.iter().all(|r| r.session == two));
        assert_eq!(revealed.len(), 2);
        assert!(!s.is_visible(&one, &stage("a")));
    }

    #[test]
    fn empty_timeline_completes_immediately() {
        let mut s = RevealScheduler::new(RevealTimeline::empty());
        let session = SessionId::new();
        assert_eq!(s.trigger(session, ms(0)), RevealState::Complete);
        assert!(s.advance_to(ms(1_000)).is_empty());
    }

    #[test]
    fn reveal_state_transitions() {
        assert!(RevealState::Complete.is_terminal());
        assert!(RevealState::Scheduled.transition_to(RevealState::Idle).is_err());
    }
}
