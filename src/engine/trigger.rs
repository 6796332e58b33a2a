use std::str::FromStr;

use chrono::{DateTime, Local};

use crate::descriptor::JobDataMap;

use super::{EngineError, JobKey, TriggerKey};

/// What the engine does with a trigger whose fire time passed unnoticed
/// for longer than the misfire threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MisfirePolicy {
    /// Fire once immediately, then continue with the next future slot.
    FireAndProceed,
    /// Fire at the next available opportunity keeping the fire count as is.
    RescheduleNextWithExistingCount,
}

#[derive(Debug, Clone)]
pub enum TriggerSchedule {
    /// Recurring schedule evaluated in the host's local timezone.
    Cron {
        expression: String,
        schedule: Box<cron::Schedule>,
    },
    /// Single firing at `start_at`.
    Once { start_at: DateTime<Local> },
}

#[derive(Debug, Clone)]
pub struct Trigger {
    pub key: TriggerKey,
    pub job_key: JobKey,
    pub schedule: TriggerSchedule,
    pub misfire_policy: MisfirePolicy,
    /// Trigger-level payload, overlaid on the job payload when firing.
    pub data: JobDataMap,
}

impl Trigger {
    pub fn cron(
        key: TriggerKey,
        job_key: JobKey,
        expression: &str,
        data: JobDataMap,
    ) -> Result<Self, EngineError> {
        let schedule = cron::Schedule::from_str(expression)
            .map_err(|e| EngineError::InvalidTrigger(format!("{expression}: {e}")))?;

        Ok(Self {
            key,
            job_key,
            schedule: TriggerSchedule::Cron {
                expression: expression.to_string(),
                schedule: Box::new(schedule),
            },
            misfire_policy: MisfirePolicy::FireAndProceed,
            data,
        })
    }

    pub fn once(
        key: TriggerKey,
        job_key: JobKey,
        start_at: DateTime<Local>,
        data: JobDataMap,
    ) -> Self {
        Self {
            key,
            job_key,
            schedule: TriggerSchedule::Once { start_at },
            misfire_policy: MisfirePolicy::RescheduleNextWithExistingCount,
            data,
        }
    }

    #[must_use]
    pub fn with_misfire_policy(mut self, misfire_policy: MisfirePolicy) -> Self {
        self.misfire_policy = misfire_policy;
        self
    }

    pub fn cron_expression(&self) -> Option<&str> {
        match &self.schedule {
            TriggerSchedule::Cron { expression, .. } => Some(expression),
            TriggerSchedule::Once { .. } => None,
        }
    }

    /// Fire time when the trigger is first stored at `now`.
    pub fn first_fire_time(&self, now: DateTime<Local>) -> Option<DateTime<Local>> {
        match &self.schedule {
            TriggerSchedule::Cron { schedule, .. } => schedule.after(&now).next(),
            TriggerSchedule::Once { start_at } => Some(*start_at),
        }
    }

    /// Fire time following a firing that happened at `after`. `None` retires the trigger.
    pub fn fire_time_after(&self, after: DateTime<Local>) -> Option<DateTime<Local>> {
        match &self.schedule {
            TriggerSchedule::Cron { schedule, .. } => schedule.after(&after).next(),
            TriggerSchedule::Once { .. } => None,
        }
    }

    /// Fire time to use once this trigger is found misfired at `now`.
    pub fn misfired_fire_time(&self, now: DateTime<Local>) -> Option<DateTime<Local>> {
        match self.misfire_policy {
            // Next future slot comes from fire_time_after once this catch-up firing is done.
            MisfirePolicy::FireAndProceed => Some(now),
            MisfirePolicy::RescheduleNextWithExistingCount => match &self.schedule {
                TriggerSchedule::Once { .. } => Some(now),
                TriggerSchedule::Cron { schedule, .. } => schedule.after(&now).next(),
            },
        }
    }
}
