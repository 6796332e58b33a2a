use chrono::{Local, TimeDelta};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;
use validator::Validate;

use crate::{
    config::MailScheduleConfig,
    descriptor::{not_blank, JobDataMap, JobDescriptor, TriggerDescriptor},
    engine::JobKey,
    jobs::{send_email::SendEmail, Job as _},
};

use super::{JobService, ScheduleError};

const DESCRIPTION: &str = "Schedule send email.";

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct MailRequest {
    #[validate(custom(function = "not_blank"))]
    pub to_email: String,
    #[validate(custom(function = "not_blank"))]
    pub subject: String,
    #[validate(custom(function = "not_blank"))]
    pub message: String,
}

/// Schedules an email to go out once after the configured delay.
#[derive(Clone)]
pub struct MailService {
    jobs: JobService,
    config: MailScheduleConfig,
}

impl MailService {
    pub fn new(jobs: JobService, config: MailScheduleConfig) -> Self {
        Self { jobs, config }
    }

    /// Returns the key of the one-shot job that will send the email.
    pub async fn send_email(&self, request: &MailRequest) -> Result<JobKey, ScheduleError> {
        request.validate()?;

        let descriptor = self.build_descriptor(request)?;
        let key = JobKey::new(descriptor.name.clone(), descriptor.group.clone());
        self.jobs.create_job(&descriptor).await?;

        Ok(key)
    }

    fn build_descriptor(&self, request: &MailRequest) -> Result<JobDescriptor, ScheduleError> {
        let mut data = JobDataMap::new();
        data.insert("toEmail".to_string(), Value::String(request.to_email.clone()));
        data.insert("subject".to_string(), Value::String(request.subject.clone()));
        data.insert("message".to_string(), Value::String(request.message.clone()));

        let delay_seconds = self.config.delay_seconds;
        let fire_time = i64::try_from(delay_seconds)
            .ok()
            .and_then(TimeDelta::try_seconds)
            .and_then(|delay| Local::now().naive_local().checked_add_signed(delay))
            .ok_or(ScheduleError::DelayOutOfRange(delay_seconds))?;

        Ok(JobDescriptor::new(
            SendEmail::name(),
            self.config.group.clone(),
            format!("mailTo:{}{}", request.to_email, Uuid::new_v4()),
        )
        .with_description(DESCRIPTION)
        .with_data(data)
        .with_trigger(TriggerDescriptor::once(fire_time)))
    }
}
