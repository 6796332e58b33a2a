use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{not_blank, JobDataMap, TriggerDescriptor};

/// Declarative description of a job and the triggers that fire it.
///
/// `(group, name)` is the job identity inside the engine. On the wire the
/// implementation reference is `type` and the trigger list is `triggers`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct JobDescriptor {
    /// Registered job type, see [`crate::jobs::job_registry::JobRegistry`].
    #[serde(rename = "type", default)]
    #[validate(custom(function = "not_blank"))]
    pub job_type: String,
    #[serde(default)]
    #[validate(custom(function = "not_blank"))]
    pub name: String,
    #[serde(default)]
    pub group: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub data: JobDataMap,
    #[serde(rename = "triggers", default)]
    pub trigger_descriptors: Vec<TriggerDescriptor>,
}

impl JobDescriptor {
    pub fn new(
        job_type: impl Into<String>,
        group: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            job_type: job_type.into(),
            name: name.into(),
            group: group.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn with_data(mut self, data: JobDataMap) -> Self {
        self.data = data;
        self
    }

    #[must_use]
    pub fn with_trigger(mut self, trigger: TriggerDescriptor) -> Self {
        self.trigger_descriptors.push(trigger);
        self
    }
}
