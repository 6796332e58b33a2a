use crate::descriptor::JobDataMap;

use super::JobKey;

/// Engine-side job definition.
#[derive(Debug, Clone, PartialEq)]
pub struct JobDetail {
    pub key: JobKey,
    pub description: Option<String>,
    /// Registered job type the engine executes when a trigger fires.
    pub job_type: String,
    /// Durable jobs stay stored after their last trigger is gone.
    pub durable: bool,
    pub data: JobDataMap,
}

impl JobDetail {
    /// Builder seeded with this job's current state.
    pub fn to_builder(&self) -> JobBuilder {
        JobBuilder {
            key: Some(self.key.clone()),
            description: self.description.clone(),
            job_type: self.job_type.clone(),
            durable: self.durable,
            data: self.data.clone(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct JobBuilder {
    key: Option<JobKey>,
    description: Option<String>,
    job_type: String,
    durable: bool,
    data: JobDataMap,
}

impl JobBuilder {
    pub fn new(job_type: impl Into<String>) -> Self {
        Self {
            job_type: job_type.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_identity(mut self, key: JobKey) -> Self {
        self.key = Some(key);
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description;
        self
    }

    /// Merge `data` into the payload collected so far, overwriting on key collision.
    #[must_use]
    pub fn using_job_data(mut self, data: JobDataMap) -> Self {
        self.data.extend(data);
        self
    }

    #[must_use]
    pub fn store_durably(mut self, durable: bool) -> Self {
        self.durable = durable;
        self
    }

    /// A builder without identity gets a random name in the default group.
    pub fn build(self) -> JobDetail {
        JobDetail {
            key: self
                .key
                .unwrap_or_else(|| JobKey::new(uuid::Uuid::new_v4().to_string(), "")),
            description: self.description,
            job_type: self.job_type,
            durable: self.durable,
            data: self.data,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn data(value: serde_json::Value) -> JobDataMap {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_using_job_data_merges_and_overwrites() {
        let job = JobBuilder::new("echo")
            .with_identity(JobKey::new("n", "g"))
            .using_job_data(data(json!({ "a": 1, "b": 2 })))
            .using_job_data(data(json!({ "b": 3, "c": 4 })))
            .build();

        assert_eq!(job.data, data(json!({ "a": 1, "b": 3, "c": 4 })));
    }

    #[test]
    fn test_to_builder_preserves_state() {
        let job = JobBuilder::new("echo")
            .with_identity(JobKey::new("n", "g"))
            .with_description(Some("desc".to_string()))
            .using_job_data(data(json!({ "a": 1 })))
            .store_durably(true)
            .build();

        let rebuilt = job.to_builder().build();

        assert_eq!(rebuilt, job);
    }

    #[test]
    fn test_build_without_identity_generates_name() {
        let job = JobBuilder::new("echo").build();
        assert!(!job.key.name.is_empty());
        assert_eq!(job.key.group, super::super::DEFAULT_GROUP);
    }
}
