//! Reveal timeline - ordered, delayed disclosure stages.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::time::Duration;

use crate::domain::foundation::ValidationError;
use crate::domain::interaction::InteractionError;

/// Identifier of one unit of progressively disclosed content.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StageId(String);

impl StageId {
    pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(ValidationError::empty_field("stage_id"));
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for StageId {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<StageId> for String {
    fn from(id: StageId) -> Self {
        id.0
    }
}

/// A stage and its delay relative to the reveal trigger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevealStage {
    #[serde(rename = "delay_ms", with = "duration_millis")]
    pub delay: Duration,
    pub stage: StageId,
}

/// Ordered list of reveal stages.
///
/// Delays never decrease along the list; stages sharing a delay fire in
/// declaration order. Stage ids are unique.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<RevealStage>", into = "Vec<RevealStage>")]
pub struct RevealTimeline {
    stages: Vec<RevealStage>,
}

impl RevealTimeline {
    /// A timeline with no stages; triggering it completes immediately.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn new(stages: Vec<RevealStage>) -> Result<Self, InteractionError> {
        let mut seen = HashSet::new();
        let mut previous = Duration::ZERO;
        for entry in &stages {
            if entry.delay < previous {
                return Err(InteractionError::invalid_timeline(format!(
                    "stage '{}' at {}ms is declared after a stage at {}ms",
                    entry.stage,
                    entry.delay.as_millis(),
                    previous.as_millis()
                )));
            }
            if !seen.insert(entry.stage.clone()) {
                return Err(InteractionError::invalid_timeline(format!(
                    "stage '{}' appears more than once",
                    entry.stage
                )));
            }
            previous = entry.delay;
        }
        Ok(Self { stages })
    }

    /// Builds a timeline from `(delay_ms, stage)` pairs.
    pub fn from_millis<'a, I>(entries: I) -> Result<Self, InteractionError>
    where
        I: IntoIterator<Item = (u64, &'a str)>,
    {
        let stages = entries
            .into_iter()
            .map(|(ms, id)| {
                Ok(RevealStage {
                    delay: Duration::from_millis(ms),
                    stage: StageId::new(id)?,
                })
            })
            .collect::<Result<Vec<_>, ValidationError>>()?;
        Self::new(stages)
    }

    pub fn stages(&self) -> &[RevealStage] {
        &self.stages
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Delay of the last stage, i.e. how long a full reveal takes.
    pub fn total_duration(&self) -> Duration {
        self.stages.last().map(|s| s.delay).unwrap_or_default()
    }
}

impl TryFrom<Vec<RevealStage>> for RevealTimeline {
    type Error = InteractionError;

    fn try_from(value: Vec<RevealStage>) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<RevealTimeline> for Vec<RevealStage> {
    fn from(timeline: RevealTimeline) -> Self {
        timeline.stages
    }
}

mod duration_millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeline_accepts_increasing_delays() {
        let t = RevealTimeline::from_millis([(100, "a"), (300, "b")]).unwrap();
        assert_eq!(t.len(), 2);
        assert_eq!(t.total_duration(), Duration::from_millis(300));
    }

    #[test]
    fn timeline_accepts_equal_delays() {
        assert!(RevealTimeline::from_millis([(100, "a"), (100, "b")]).is_ok());
    }

    #[test]
    fn timeline_rejects_decreasing_delays() {
        let result = RevealTimeline::from_millis([(300, "a"), (100, "b")]);
        assert!(matches!(result, Err(InteractionError::InvalidTimeline(_))));
    }

    #[test]
    fn timeline_rejects_duplicate_stage() {
        let result = RevealTimeline::from_millis([(100, "a"), (200, "a")]);
        assert!(matches!(result, Err(InteractionError::InvalidTimeline(_))));
    }

    #[test]
    fn timeline_rejects_blank_stage_id() {
        let result = RevealTimeline::from_millis([(100, " ")]);
        assert!(matches!(result, Err(InteractionError::Validation(_))));
    }

    #[test]
    fn timeline_deserializes_from_config_shape() {
        let json = r#"[{"delay_ms":900,"stage":"numbers"},{"delay_ms":1700,"stage":"comparison"}]"#;
        let t: RevealTimeline = serde_json::from_str(json).unwrap();
        assert_eq!(t.stages()[1].stage.as_str(), "comparison");
        assert_eq!(t.stages()[0].delay, Duration::from_millis(900));
    }

    #[test]
    fn timeline_deserialization_validates_order() {
        let json = r#"[{"delay_ms":900,"stage":"a"},{"delay_ms":100,"stage":"b"}]"#;
        assert!(serde_json::from_str::<RevealTimeline>(json).is_err());
    }
}
