use chrono::{DateTime, Local};

use crate::{
    descriptor::JobDataMap,
    engine::{JobDetail, JobKey, Trigger, TriggerKey},
};

/// Everything a job gets to see about one firing.
#[derive(Debug, Clone)]
pub struct JobExecutionContext {
    pub job_key: JobKey,
    pub trigger_key: TriggerKey,
    pub job_type: String,
    pub job_description: Option<String>,
    /// When the trigger was due.
    pub scheduled_fire_time: DateTime<Local>,
    /// When the engine actually fired it.
    pub fire_time: DateTime<Local>,
    /// Job payload overlaid with the trigger payload; trigger keys win.
    pub merged_data: JobDataMap,
}

impl JobExecutionContext {
    pub fn new(
        job: &JobDetail,
        trigger: &Trigger,
        scheduled_fire_time: DateTime<Local>,
        fire_time: DateTime<Local>,
    ) -> Self {
        let mut merged_data = job.data.clone();
        merged_data.extend(trigger.data.clone());

        Self {
            job_key: job.key.clone(),
            trigger_key: trigger.key.clone(),
            job_type: job.job_type.clone(),
            job_description: job.description.clone(),
            scheduled_fire_time,
            fire_time,
            merged_data,
        }
    }
}
