//! Random source adapters.
//!
//! - `SeededRandomSource` - `StdRng`, seeded or from entropy
//! - `ScriptedRandomSource` - replays fixed draws (tests)

mod scripted;
mod seeded;

pub use scripted::ScriptedRandomSource;
pub use seeded::SeededRandomSource;
