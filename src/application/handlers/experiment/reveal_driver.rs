//! RevealDriver - runs a reveal timeline on tokio time.
//!
//! A background task owns a `RevealScheduler` triggered at spawn time and
//! sleeps until each pending due time, forwarding newly visible stages over
//! an mpsc channel. Cancelling or dropping the driver aborts the task, so no
//! stage of a cancelled trigger is ever delivered.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};

use crate::domain::foundation::SessionId;
use crate::domain::reveal::{RevealScheduler, RevealTimeline, StageRevealed};

/// Handle to a running reveal.
#[derive(Debug)]
pub struct RevealDriver {
    session: SessionId,
    handle: JoinHandle<()>,
}

impl RevealDriver {
    /// Triggers `timeline` for `session` now and starts firing its stages.
    ///
    /// The receiver yields each stage once, in timeline order, and closes
    /// after the last stage or when the driver is cancelled.
    pub fn spawn(
        session: SessionId,
        timeline: RevealTimeline,
    ) -> (Self, mpsc::Receiver<StageRevealed>) {
        let (tx, rx) = mpsc::channel(timeline.len().max(1));

        let handle = tokio::spawn(async move {
            let origin = Instant::now();
            let mut scheduler = RevealScheduler::new(timeline);
            scheduler.trigger(session, Duration::ZERO);

            while let Some(due) = scheduler.next_due() {
                time::sleep_until(origin + due).await;
                for revealed in scheduler.advance_to(origin.elapsed().max(due)) {
                    if tx.send(revealed).await.is_err() {
                        tracing::debug!(session_id = %session, "Reveal receiver dropped");
                        return;
                    }
                }
            }
        });

        (Self { session, handle }, rx)
    }

    pub fn session(&self) -> &SessionId {
        &self.session
    }

    /// True once every stage has been delivered or the driver was cancelled.
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Stops the reveal; pending stages are never delivered.
    pub fn cancel(&self) {
        if !self.handle.is_finished() {
            tracing::debug!(session_id = %self.session, "Reveal driver cancelled");
        }
        self.handle.abort();
    }
}

impl Drop for RevealDriver {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
