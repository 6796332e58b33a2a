use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::JobDataMap;

/// A single firing rule for a job.
///
/// Exactly one of a non-empty `cron` or a future `fire_time` must be set for
/// the descriptor to translate. When both are present the cron rule wins.
/// Triggers are named after their job, never by the caller.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerDescriptor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cron: Option<String>,
    /// Local wall-clock time of a one-shot firing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fire_time: Option<NaiveDateTime>,
    #[serde(default)]
    pub data: JobDataMap,
}

impl TriggerDescriptor {
    pub fn cron(expression: impl Into<String>) -> Self {
        Self {
            cron: Some(expression.into()),
            ..Self::default()
        }
    }

    pub fn once(fire_time: NaiveDateTime) -> Self {
        Self {
            fire_time: Some(fire_time),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_data(mut self, data: JobDataMap) -> Self {
        self.data = data;
        self
    }
}
