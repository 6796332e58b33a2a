use std::sync::Arc;

use crate::{
    descriptor::job_descriptor::JobDescriptor,
    engine::{JobBuilder, JobDetail, JobKey, Trigger},
    jobs::job_registry::JobRegistry,
};

use super::{TranslationError, TriggerTranslator};

/// Turns job descriptors into durable engine job definitions.
#[derive(Clone)]
pub struct JobTranslator {
    registry: Arc<JobRegistry>,
}

impl JobTranslator {
    pub fn new(registry: Arc<JobRegistry>) -> Self {
        Self { registry }
    }

    pub fn build_job_detail(&self, job: &JobDescriptor) -> Result<JobDetail, TranslationError> {
        let job_type = self
            .registry
            .resolve(&job.job_type)
            .ok_or_else(|| TranslationError::JobTypeNotFound(job.job_type.clone()))?;

        Ok(JobBuilder::new(job_type)
            .with_identity(JobKey::new(job.name.clone(), job.group.clone()))
            .with_description(job.description.clone())
            .using_job_data(job.data.clone())
            .store_durably(true)
            .build())
    }

    /// Rebuilds the identity and triggers of a stored job. Type, description
    /// and payload are left empty.
    pub fn build_descriptor(job: &JobDetail, triggers: &[Trigger]) -> JobDescriptor {
        JobDescriptor {
            name: job.key.name.clone(),
            group: job.key.group.clone(),
            trigger_descriptors: triggers
                .iter()
                .map(TriggerTranslator::build_descriptor)
                .collect(),
            ..JobDescriptor::default()
        }
    }
}
