use std::{collections::HashSet, sync::Arc};

use chrono::{Local, NaiveDateTime, TimeZone as _};
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use crate::{
    descriptor::{job_descriptor::JobDescriptor, trigger_descriptor::TriggerDescriptor},
    engine::{JobKey, MisfirePolicy, SchedulingEngine, Trigger, TriggerKey},
};

use super::{TranslationError, CRON_KEY, FIRE_TIME_KEY};

/// Turns trigger descriptors into engine triggers.
///
/// A cron rule becomes a recurring trigger that fires once and proceeds on
/// misfire. A future fire time becomes a one-shot trigger that is rescheduled
/// to the next opportunity on misfire. Triggers share the job's group.
#[derive(Clone)]
pub struct TriggerTranslator {
    engine: Arc<dyn SchedulingEngine>,
}

impl TriggerTranslator {
    pub fn new(engine: Arc<dyn SchedulingEngine>) -> Self {
        Self { engine }
    }

    /// Translates every trigger of `job`. Triggers whose key repeats an
    /// earlier one are dropped.
    pub fn build_triggers(&self, job: &JobDescriptor) -> Result<Vec<Trigger>, TranslationError> {
        let mut seen = HashSet::new();
        let mut triggers = Vec::with_capacity(job.trigger_descriptors.len());

        for (index, descriptor) in job.trigger_descriptors.iter().enumerate() {
            let trigger = self.translate(job, descriptor, index)?;
            if seen.insert(trigger.key.clone()) {
                triggers.push(trigger);
            } else {
                debug!("Dropping duplicate trigger {} of job {}", trigger.key, job.name);
            }
        }

        Ok(triggers)
    }

    pub fn build_trigger(
        &self,
        job: &JobDescriptor,
        descriptor: &TriggerDescriptor,
    ) -> Result<Trigger, TranslationError> {
        self.translate(job, descriptor, 0)
    }

    /// Reads the cron expression and fire time back from the trigger payload.
    pub fn build_descriptor(trigger: &Trigger) -> TriggerDescriptor {
        let cron = trigger
            .data
            .get(CRON_KEY)
            .and_then(Value::as_str)
            .map(str::to_string);
        let fire_time = trigger
            .data
            .get(FIRE_TIME_KEY)
            .and_then(Value::as_str)
            .and_then(|value| value.parse::<NaiveDateTime>().ok());

        TriggerDescriptor {
            cron,
            fire_time,
            ..TriggerDescriptor::default()
        }
    }

    fn translate(
        &self,
        job: &JobDescriptor,
        descriptor: &TriggerDescriptor,
        index: usize,
    ) -> Result<Trigger, TranslationError> {
        let key = trigger_key(job, index);
        let job_key = JobKey::new(job.name.clone(), job.group.clone());

        if let Some(expression) = descriptor.cron.as_deref().filter(|c| !c.is_empty()) {
            if !self.engine.cron_expression_is_valid(expression) {
                return Err(TranslationError::InvalidCronExpression(
                    expression.to_string(),
                ));
            }

            let mut data = descriptor.data.clone();
            data.insert(CRON_KEY.to_string(), Value::String(expression.to_string()));

            let trigger = Trigger::cron(key, job_key, expression, data)
                .map_err(|_| TranslationError::InvalidCronExpression(expression.to_string()))?;
            return Ok(trigger.with_misfire_policy(MisfirePolicy::FireAndProceed));
        }

        if let Some(fire_time) = descriptor
            .fire_time
            .filter(|fire_time| *fire_time > Local::now().naive_local())
        {
            let start_at = Local
                .from_local_datetime(&fire_time)
                .earliest()
                .ok_or(TranslationError::UnsupportedTriggerDescriptor)?;

            let mut data = descriptor.data.clone();
            data.insert(
                FIRE_TIME_KEY.to_string(),
                Value::String(fire_time.format("%Y-%m-%dT%H:%M:%S%.f").to_string()),
            );

            return Ok(Trigger::once(key, job_key, start_at, data)
                .with_misfire_policy(MisfirePolicy::RescheduleNextWithExistingCount));
        }

        Err(TranslationError::UnsupportedTriggerDescriptor)
    }
}

/// The first trigger carries the job name. Later ones, and every trigger of a
/// job with a blank name, get a random name so they can never collide with the
/// triggers of another job.
fn trigger_key(job: &JobDescriptor, index: usize) -> TriggerKey {
    let name = if index == 0 && !job.name.trim().is_empty() {
        job.name.clone()
    } else {
        Uuid::new_v4().to_string()
    };

    TriggerKey::new(name, job.group.clone())
}
