//! Reveal module - staged, timed disclosure after a session resolves.
//!
//! - `RevealTimeline` - validated `(delay, stage)` list
//! - `TimerArena` - pending timers keyed by session, FIFO on equal due times
//! - `RevealScheduler` - per-session `Idle → Scheduled → Complete` driver

mod scheduler;
mod timeline;
mod timer_arena;

pub use scheduler::{RevealScheduler, RevealState, StageRevealed};
pub use timeline::{RevealStage, RevealTimeline, StageId};
pub use timer_arena::{FiredTimer, TimerArena, TimerId};
