use std::sync::Arc;

use tracing::{error, info, warn};

use crate::{
    descriptor::job_descriptor::JobDescriptor,
    engine::{JobDetail, JobKey, SchedulingEngine, Trigger},
    jobs::job_registry::JobRegistry,
    translate::{JobTranslator, TriggerTranslator},
};

use super::ScheduleError;

/// Job lifecycle operations on top of a [`SchedulingEngine`].
///
/// Creation and replacement report failures to the caller. Update, delete,
/// pause and resume only log them.
#[derive(Clone)]
pub struct JobService {
    engine: Arc<dyn SchedulingEngine>,
    jobs: JobTranslator,
    triggers: TriggerTranslator,
}

impl JobService {
    pub fn new(engine: Arc<dyn SchedulingEngine>, registry: Arc<JobRegistry>) -> Self {
        Self {
            triggers: TriggerTranslator::new(engine.clone()),
            jobs: JobTranslator::new(registry),
            engine,
        }
    }

    fn translate(
        &self,
        descriptor: &JobDescriptor,
    ) -> Result<(JobDetail, Vec<Trigger>), ScheduleError> {
        let job = self.jobs.build_job_detail(descriptor)?;
        let triggers = self.triggers.build_triggers(descriptor)?;
        Ok((job, triggers))
    }

    async fn schedule(
        &self,
        job: JobDetail,
        triggers: Vec<Trigger>,
        replace: bool,
    ) -> Result<(), ScheduleError> {
        let key = job.key.clone();
        self.engine
            .schedule_job(job, triggers, replace)
            .await
            .map_err(|source| {
                error!("Could not schedule job with key: {}, error: {}", key, source);
                ScheduleError::Scheduling { key, source }
            })
    }

    pub async fn create_job(&self, descriptor: &JobDescriptor) -> Result<(), ScheduleError> {
        let (job, triggers) = self.translate(descriptor)?;
        let key = job.key.clone();

        info!("Scheduling job with key: {}", key);
        self.schedule(job, triggers, false).await?;
        info!("Job with key: {} scheduled", key);

        Ok(())
    }

    /// Creates the job, or merges the descriptor payload into the stored job
    /// when the key is taken. Triggers of an existing job are left alone.
    pub async fn create_and_update_job_if_already_exists(
        &self,
        descriptor: &JobDescriptor,
    ) -> Result<(), ScheduleError> {
        let (job, triggers) = self.translate(descriptor)?;
        let key = job.key.clone();

        info!("Scheduling job with key: {}", key);

        let existing = self
            .engine
            .get_job_detail(&key)
            .await
            .map_err(|source| ScheduleError::Scheduling {
                key: key.clone(),
                source,
            })?;

        match existing {
            Some(existing) => {
                let mut updated = existing;
                updated.data.extend(descriptor.data.clone());

                self.engine
                    .add_job(updated, true, true)
                    .await
                    .map_err(|source| ScheduleError::Scheduling {
                        key: key.clone(),
                        source,
                    })?;
                info!("Existing job with key: {} updated", key);
            }
            None => {
                self.schedule(job, triggers, false).await?;
                info!("Job with key: {} scheduled", key);
            }
        }

        Ok(())
    }

    /// Schedules the job fresh, deleting a job with the same key first.
    pub async fn create_job_deleting_existing_job(
        &self,
        descriptor: &JobDescriptor,
    ) -> Result<(), ScheduleError> {
        let (job, triggers) = self.translate(descriptor)?;
        let key = job.key.clone();

        info!("Scheduling job with key: {}", key);

        let scheduling_error = |source| ScheduleError::Scheduling {
            key: key.clone(),
            source,
        };

        if self
            .engine
            .get_job_detail(&key)
            .await
            .map_err(scheduling_error)?
            .is_some()
        {
            self.engine
                .delete_job(&key)
                .await
                .map_err(scheduling_error)?;
            info!(
                "Existing job with key: {} removed before scheduling the new one",
                key
            );
        }

        self.schedule(job, triggers, false).await?;
        info!("Job with key: {} scheduled", key);

        Ok(())
    }

    /// Merges the descriptor payload into the stored job. Triggers stay as they are.
    pub async fn update_job(&self, group: &str, name: &str, descriptor: &JobDescriptor) {
        let key = JobKey::new(name, group);

        let existing = match self.engine.get_job_detail(&key).await {
            Ok(Some(existing)) => existing,
            Ok(None) => {
                warn!("Could not find job with key: {} to update", key);
                return;
            }
            Err(e) => {
                error!("Could not find job with key: {} to update: {}", key, e);
                return;
            }
        };

        let updated = existing
            .to_builder()
            .using_job_data(descriptor.data.clone())
            .store_durably(true)
            .build();

        match self.engine.add_job(updated, true, false).await {
            Ok(()) => info!("Updated job with key: {}", key),
            Err(e) => error!("Could not update job with key: {}: {}", key, e),
        }
    }

    /// Replaces the job under `group`/`name` and its whole trigger set.
    /// Returns the descriptor with the identity forced onto it.
    pub async fn replace_job(
        &self,
        group: &str,
        name: &str,
        mut descriptor: JobDescriptor,
    ) -> Result<JobDescriptor, ScheduleError> {
        descriptor.group = group.to_string();
        descriptor.name = name.to_string();

        let (job, triggers) = self.translate(&descriptor)?;
        let key = job.key.clone();

        info!("Replacing job with key: {}", key);
        self.schedule(job, triggers, true).await?;
        info!("Job with key: {} saved", key);

        Ok(descriptor)
    }

    pub async fn delete_job(&self, group: &str, name: &str) {
        let key = JobKey::new(name, group);
        match self.engine.delete_job(&key).await {
            Ok(_) => info!("Deleted job with key: {}", key),
            Err(e) => error!("Could not delete job with key: {}: {}", key, e),
        }
    }

    pub async fn pause_job(&self, group: &str, name: &str) {
        let key = JobKey::new(name, group);
        match self.engine.pause_job(&key).await {
            Ok(()) => info!("Paused job with key: {}", key),
            Err(e) => error!("Could not pause job with key: {}: {}", key, e),
        }
    }

    pub async fn resume_job(&self, group: &str, name: &str) {
        let key = JobKey::new(name, group);
        match self.engine.resume_job(&key).await {
            Ok(()) => info!("Resumed job with key: {}", key),
            Err(e) => error!("Could not resume job with key: {}: {}", key, e),
        }
    }

    pub async fn find_job(&self, group: &str, name: &str) -> Option<JobDescriptor> {
        let key = JobKey::new(name, group);

        let found = match self.engine.get_job_detail(&key).await {
            Ok(Some(job)) => match self.engine.get_triggers_of_job(&key).await {
                Ok(triggers) => Some(JobTranslator::build_descriptor(&job, &triggers)),
                Err(e) => {
                    error!("Could not find job with key: {}, error: {}", key, e);
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                error!("Could not find job with key: {}, error: {}", key, e);
                None
            }
        };

        if found.is_none() {
            warn!("Could not find job with key: {}", key);
        }

        found
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Local, NaiveDateTime, Timelike as _};
    use serde_json::json;

    use super::*;
    use crate::{
        descriptor::{trigger_descriptor::TriggerDescriptor, JobDataMap},
        engine::EngineError,
        jobs::{echo::EchoJob, Job as _},
        tests::setup_test::test_service,
        translate::TranslationError,
    };

    fn data(value: serde_json::Value) -> JobDataMap {
        value.as_object().cloned().unwrap()
    }

    fn future() -> NaiveDateTime {
        (Local::now().naive_local() + Duration::hours(1))
            .with_nanosecond(0)
            .unwrap()
    }

    fn descriptor(group: &str, name: &str) -> JobDescriptor {
        JobDescriptor::new(EchoJob::name(), group, name)
            .with_data(data(json!({ "key": "value", "key2": "value2" })))
            .with_trigger(TriggerDescriptor::cron("0 0 * * * *"))
    }

    #[tokio::test]
    async fn test_create_and_find_round_trip() {
        let (service, _) = test_service();
        let fire_time = future();
        let descriptor = JobDescriptor::new(EchoJob::name(), "g1", "n1")
            .with_data(data(json!({ "key": "value" })))
            .with_trigger(TriggerDescriptor::once(fire_time));

        service.create_job(&descriptor).await.unwrap();
        let found = service.find_job("g1", "n1").await.unwrap();

        assert_eq!(found.name, "n1");
        assert_eq!(found.group, "g1");
        assert_eq!(found.trigger_descriptors.len(), 1);
        assert_eq!(found.trigger_descriptors[0].fire_time, Some(fire_time));
        assert_eq!(found.trigger_descriptors[0].cron, None);
    }

    #[tokio::test]
    async fn test_unsupported_trigger_leaves_engine_untouched() {
        let (service, engine) = test_service();
        let descriptor =
            JobDescriptor::new(EchoJob::name(), "g1", "n1").with_trigger(TriggerDescriptor::default());

        let result = service.create_job(&descriptor).await;

        assert!(matches!(
            result,
            Err(ScheduleError::Translation(
                TranslationError::UnsupportedTriggerDescriptor
            ))
        ));
        assert_eq!(engine.job_count().await, 0);
    }

    #[tokio::test]
    async fn test_invalid_cron_leaves_engine_untouched() {
        let (service, engine) = test_service();
        let descriptor = JobDescriptor::new(EchoJob::name(), "g1", "n1")
            .with_trigger(TriggerDescriptor::cron("* * *"));

        let result = service.create_job(&descriptor).await;

        assert!(matches!(
            result,
            Err(ScheduleError::Translation(
                TranslationError::InvalidCronExpression(_)
            ))
        ));
        assert_eq!(engine.job_count().await, 0);
    }

    #[tokio::test]
    async fn test_unknown_job_type_is_rejected() {
        let (service, engine) = test_service();
        let descriptor = JobDescriptor::new("com.example.Missing", "g1", "n1")
            .with_trigger(TriggerDescriptor::cron("0 0 * * * *"));

        let result = service.create_job(&descriptor).await;

        assert!(matches!(
            result,
            Err(ScheduleError::Translation(TranslationError::JobTypeNotFound(_)))
        ));
        assert_eq!(engine.job_count().await, 0);
    }

    #[tokio::test]
    async fn test_create_twice_conflicts() {
        let (service, engine) = test_service();

        service.create_job(&descriptor("g1", "n1")).await.unwrap();
        let result = service.create_job(&descriptor("g1", "n1")).await;

        assert!(matches!(
            result,
            Err(ScheduleError::Scheduling {
                source: EngineError::JobAlreadyExists(_),
                ..
            })
        ));
        assert_eq!(engine.job_count().await, 1);
    }

    #[tokio::test]
    async fn test_create_deleting_existing_twice_leaves_one_job() {
        let (service, engine) = test_service();

        service
            .create_job_deleting_existing_job(&descriptor("g1", "n1"))
            .await
            .unwrap();
        service
            .create_job_deleting_existing_job(&descriptor("g1", "n1"))
            .await
            .unwrap();

        assert_eq!(engine.job_count().await, 1);
        let found = service.find_job("g1", "n1").await.unwrap();
        assert_eq!(found.trigger_descriptors.len(), 1);
    }

    #[tokio::test]
    async fn test_create_and_update_merges_payload_and_keeps_triggers() {
        let (service, engine) = test_service();
        service.create_job(&descriptor("g1", "n1")).await.unwrap();

        let update = JobDescriptor::new(EchoJob::name(), "g1", "n1")
            .with_data(data(json!({ "key": "changed", "extra": 1 })))
            .with_trigger(TriggerDescriptor::cron("0 30 * * * *"));
        service
            .create_and_update_job_if_already_exists(&update)
            .await
            .unwrap();

        let job = engine
            .get_job_detail(&JobKey::new("n1", "g1"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(job.data["key"], json!("changed"));
        assert_eq!(job.data["key2"], json!("value2"));
        assert_eq!(job.data["extra"], json!(1));

        let found = service.find_job("g1", "n1").await.unwrap();
        assert_eq!(found.trigger_descriptors.len(), 1);
        assert_eq!(
            found.trigger_descriptors[0].cron.as_deref(),
            Some("0 0 * * * *")
        );
    }

    #[tokio::test]
    async fn test_create_and_update_schedules_when_absent() {
        let (service, engine) = test_service();

        service
            .create_and_update_job_if_already_exists(&descriptor("g1", "n1"))
            .await
            .unwrap();

        assert_eq!(engine.job_count().await, 1);
        assert!(service.find_job("g1", "n1").await.is_some());
    }

    #[tokio::test]
    async fn test_update_job_merges_payload() {
        let (service, engine) = test_service();
        service.create_job(&descriptor("g1", "n1")).await.unwrap();

        let update = JobDescriptor::new(EchoJob::name(), "g1", "n1")
            .with_data(data(json!({ "key": "updated" })));
        service.update_job("g1", "n1", &update).await;

        let job = engine
            .get_job_detail(&JobKey::new("n1", "g1"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(job.data["key"], json!("updated"));
        assert_eq!(job.data["key2"], json!("value2"));
        assert!(job.durable);
        assert_eq!(
            engine
                .get_triggers_of_job(&JobKey::new("n1", "g1"))
                .await
                .unwrap()
                .len(),
            1
        );
    }

    #[tokio::test]
    async fn test_update_missing_job_is_noop() {
        let (service, engine) = test_service();

        service
            .update_job("g1", "missing", &descriptor("g1", "missing"))
            .await;

        assert_eq!(engine.job_count().await, 0);
    }

    #[tokio::test]
    async fn test_replace_job_swaps_triggers_and_forces_identity() {
        let (service, _) = test_service();
        service.create_job(&descriptor("g1", "n1")).await.unwrap();

        let replacement = JobDescriptor::new(EchoJob::name(), "other", "ignored")
            .with_trigger(TriggerDescriptor::cron("0 15 * * * *"))
            .with_trigger(TriggerDescriptor::once(future()));
        let returned = service
            .replace_job("g1", "n1", replacement)
            .await
            .unwrap();

        assert_eq!(returned.group, "g1");
        assert_eq!(returned.name, "n1");

        let found = service.find_job("g1", "n1").await.unwrap();
        assert_eq!(found.trigger_descriptors.len(), 2);
        assert!(found
            .trigger_descriptors
            .iter()
            .any(|t| t.cron.as_deref() == Some("0 15 * * * *")));
        assert!(found
            .trigger_descriptors
            .iter()
            .all(|t| t.cron.as_deref() != Some("0 0 * * * *")));
        assert!(service.find_job("other", "ignored").await.is_none());
    }

    fn two_trigger_job(group: &str, name: &str) -> JobDescriptor {
        JobDescriptor::new(EchoJob::name(), group, name)
            .with_trigger(TriggerDescriptor::cron("0 0 * * * *"))
            .with_trigger(TriggerDescriptor::cron("0 30 * * * *"))
    }

    #[tokio::test]
    async fn test_similar_job_name_does_not_clash_with_later_triggers() {
        let (service, engine) = test_service();
        service.create_job(&two_trigger_job("g", "report")).await.unwrap();

        service.create_job(&descriptor("g", "report-1")).await.unwrap();

        assert_eq!(engine.job_count().await, 2);
        assert_eq!(
            engine
                .get_triggers_of_job(&JobKey::new("report", "g"))
                .await
                .unwrap()
                .len(),
            2
        );
    }

    #[tokio::test]
    async fn test_replace_leaves_other_jobs_triggers_alone() {
        let (service, engine) = test_service();
        service.create_job(&two_trigger_job("g", "report")).await.unwrap();

        service
            .replace_job("g", "report-1", descriptor("g", "report-1"))
            .await
            .unwrap();

        assert_eq!(
            engine
                .get_triggers_of_job(&JobKey::new("report", "g"))
                .await
                .unwrap()
                .len(),
            2
        );
        assert_eq!(
            service
                .find_job("g", "report")
                .await
                .unwrap()
                .trigger_descriptors
                .len(),
            2
        );
    }

    #[tokio::test]
    async fn test_replace_job_creates_when_absent() {
        let (service, engine) = test_service();

        service
            .replace_job("g1", "n1", descriptor("x", "y"))
            .await
            .unwrap();

        assert_eq!(engine.job_count().await, 1);
    }

    #[tokio::test]
    async fn test_delete_then_find_is_absent() {
        let (service, engine) = test_service();
        service.create_job(&descriptor("g1", "n1")).await.unwrap();

        service.delete_job("g1", "n1").await;

        assert!(service.find_job("g1", "n1").await.is_none());
        assert_eq!(engine.job_count().await, 0);
    }

    #[tokio::test]
    async fn test_operations_on_absent_keys_are_silent() {
        let (service, engine) = test_service();

        service.delete_job("g1", "missing").await;
        service.pause_job("g1", "missing").await;
        service.resume_job("g1", "missing").await;

        assert!(service.find_job("g1", "missing").await.is_none());
        assert_eq!(engine.job_count().await, 0);
    }

    #[tokio::test]
    async fn test_pause_and_resume_keep_job_findable() {
        let (service, _) = test_service();
        service.create_job(&descriptor("g1", "n1")).await.unwrap();

        service.pause_job("g1", "n1").await;
        assert!(service.find_job("g1", "n1").await.is_some());

        service.resume_job("g1", "n1").await;
        assert!(service.find_job("g1", "n1").await.is_some());
    }

    #[tokio::test]
    async fn test_n1_g1_scenario() {
        let (service, engine) = test_service();
        let descriptor = JobDescriptor::new(EchoJob::name(), "g1", "n1")
            .with_data(data(json!({ "key": "value", "key2": "value2" })))
            .with_trigger(
                TriggerDescriptor::cron("0 */5 * * * *")
                    .with_data(data(json!({ "tKey": "tdata" }))),
            );

        service.create_job(&descriptor).await.unwrap();

        let triggers = engine
            .get_triggers_of_job(&JobKey::new("n1", "g1"))
            .await
            .unwrap();
        assert_eq!(triggers.len(), 1);
        assert_eq!(triggers[0].key, JobKey::new("n1", "g1"));
        assert_eq!(triggers[0].data["tKey"], json!("tdata"));
        assert_eq!(triggers[0].data["cron"], json!("0 */5 * * * *"));

        let found = service.find_job("g1", "n1").await.unwrap();
        assert_eq!(
            found.trigger_descriptors[0].cron.as_deref(),
            Some("0 */5 * * * *")
        );
    }
}
