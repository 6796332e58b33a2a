use std::{collections::BTreeMap, str::FromStr, sync::Arc};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Local};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::{
    app::App,
    config::EngineConfig,
    jobs::{execution_context::JobExecutionContext, job_registry::JobRegistry},
};

use super::{
    runtime::{self, RuntimeHandle},
    EngineError, JobDetail, JobKey, SchedulingEngine, Trigger, TriggerKey,
};

struct JobEntry {
    detail: JobDetail,
    paused: bool,
}

struct TriggerEntry {
    trigger: Trigger,
    next_fire_time: Option<DateTime<Local>>,
    paused: bool,
    times_fired: u64,
}

#[derive(Default)]
pub(super) struct Store {
    jobs: BTreeMap<JobKey, JobEntry>,
    triggers: BTreeMap<TriggerKey, TriggerEntry>,
}

impl Store {
    fn trigger_keys_of(&self, job_key: &JobKey) -> Vec<TriggerKey> {
        self.triggers
            .iter()
            .filter(|(_, entry)| &entry.trigger.job_key == job_key)
            .map(|(key, _)| key.clone())
            .collect()
    }

    fn remove_triggers_of(&mut self, job_key: &JobKey) {
        for key in self.trigger_keys_of(job_key) {
            self.triggers.remove(&key);
        }
    }

    fn insert_trigger(&mut self, trigger: Trigger, paused: bool, now: DateTime<Local>) {
        let next_fire_time = trigger.first_fire_time(now);
        self.triggers.insert(
            trigger.key.clone(),
            TriggerEntry {
                trigger,
                next_fire_time,
                paused,
                times_fired: 0,
            },
        );
    }

    /// Claim up to `capacity` due triggers, advancing or retiring each one.
    pub(super) fn acquire_due(
        &mut self,
        now: DateTime<Local>,
        capacity: usize,
        misfire_threshold: Duration,
    ) -> Vec<JobExecutionContext> {
        let mut due: Vec<(DateTime<Local>, TriggerKey)> = self
            .triggers
            .iter()
            .filter(|(_, entry)| !entry.paused)
            .filter_map(|(key, entry)| {
                entry
                    .next_fire_time
                    .filter(|fire_time| *fire_time <= now)
                    .map(|fire_time| (fire_time, key.clone()))
            })
            .collect();
        due.sort();
        due.truncate(capacity);

        let mut firings = Vec::with_capacity(due.len());

        for (scheduled_fire_time, trigger_key) in due {
            let Some(entry) = self.triggers.get_mut(&trigger_key) else {
                continue;
            };

            let Some(job) = self.jobs.get(&entry.trigger.job_key) else {
                warn!(
                    "Trigger {} points at missing job {}, dropping it",
                    trigger_key, entry.trigger.job_key
                );
                self.triggers.remove(&trigger_key);
                continue;
            };

            if now - scheduled_fire_time > misfire_threshold {
                warn!(
                    "⏰ Trigger {} misfired (was due {}), applying {:?}",
                    trigger_key, scheduled_fire_time, entry.trigger.misfire_policy
                );
            }

            firings.push(JobExecutionContext::new(
                &job.detail,
                &entry.trigger,
                scheduled_fire_time,
                now,
            ));

            entry.times_fired += 1;
            entry.next_fire_time = entry.trigger.fire_time_after(now);

            if entry.next_fire_time.is_none() {
                debug!(
                    "Trigger {} completed after {} firing(s)",
                    trigger_key, entry.times_fired
                );
                let job_key = entry.trigger.job_key.clone();
                self.triggers.remove(&trigger_key);
                self.remove_job_if_orphaned(&job_key);
            }
        }

        firings
    }

    fn remove_job_if_orphaned(&mut self, job_key: &JobKey) {
        let orphaned = self
            .jobs
            .get(job_key)
            .is_some_and(|job| !job.detail.durable)
            && self.trigger_keys_of(job_key).is_empty();

        if orphaned {
            self.jobs.remove(job_key);
        }
    }
}

/// In-process scheduling engine.
///
/// Jobs and triggers live in memory for the lifetime of the process. Triggers
/// only fire between [`MemoryEngine::start`] and [`MemoryEngine::shutdown`];
/// the store itself is usable before start, which is what the tests rely on.
pub struct MemoryEngine {
    store: Arc<Mutex<Store>>,
    config: EngineConfig,
    runtime: Mutex<Option<RuntimeHandle>>,
}

impl Default for MemoryEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl MemoryEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            store: Arc::new(Mutex::new(Store::default())),
            config,
            runtime: Mutex::new(None),
        }
    }

    /// Start firing triggers. Jobs execute on tokio tasks with access to `app`.
    pub async fn start(&self, registry: Arc<JobRegistry>, app: App) -> Result<(), EngineError> {
        let mut runtime = self.runtime.lock().await;
        if runtime.is_some() {
            return Err(EngineError::AlreadyStarted);
        }

        *runtime = Some(runtime::spawn(
            self.store.clone(),
            self.config.clone(),
            registry,
            app,
        ));
        Ok(())
    }

    /// Stop firing triggers and wait for running jobs as configured.
    pub async fn shutdown(&self) -> Result<(), EngineError> {
        let handle = self
            .runtime
            .lock()
            .await
            .take()
            .ok_or(EngineError::NotStarted)?;

        info!("⏰ Scheduler shutting down");
        handle.stop().await;
        info!("⏰ Scheduler stopped");
        Ok(())
    }

    pub async fn is_started(&self) -> bool {
        self.runtime.lock().await.is_some()
    }

    /// Claim the triggers due at `now` without executing them.
    pub async fn acquire_due(&self, now: DateTime<Local>) -> Vec<JobExecutionContext> {
        self.store
            .lock()
            .await
            .acquire_due(now, usize::MAX, self.config.misfire_threshold())
    }

    pub async fn job_count(&self) -> usize {
        self.store.lock().await.jobs.len()
    }
}

fn ensure_schedulable(
    job: &JobDetail,
    triggers: &[Trigger],
    now: DateTime<Local>,
) -> Result<(), EngineError> {
    if triggers.is_empty() && !job.durable {
        return Err(EngineError::NonDurableJobWithoutTrigger(job.key.clone()));
    }

    for trigger in triggers {
        if trigger.job_key != job.key {
            return Err(EngineError::InvalidTrigger(format!(
                "trigger {} references job {} but is scheduled with job {}",
                trigger.key, trigger.job_key, job.key
            )));
        }
        if trigger.first_fire_time(now).is_none() {
            return Err(EngineError::InvalidTrigger(format!(
                "trigger {} will never fire",
                trigger.key
            )));
        }
    }

    Ok(())
}

#[async_trait]
impl SchedulingEngine for MemoryEngine {
    async fn schedule_job(
        &self,
        job: JobDetail,
        triggers: Vec<Trigger>,
        replace: bool,
    ) -> Result<(), EngineError> {
        let now = Local::now();
        ensure_schedulable(&job, &triggers, now)?;

        let mut store = self.store.lock().await;

        if !replace && store.jobs.contains_key(&job.key) {
            return Err(EngineError::JobAlreadyExists(job.key));
        }

        // Replacing only ever takes over triggers of the job being replaced.
        if let Some(trigger) = triggers.iter().find(|t| {
            store
                .triggers
                .get(&t.key)
                .is_some_and(|entry| !replace || entry.trigger.job_key != job.key)
        }) {
            return Err(EngineError::TriggerAlreadyExists(trigger.key.clone()));
        }

        let paused = store.jobs.get(&job.key).is_some_and(|entry| entry.paused);
        store.remove_triggers_of(&job.key);

        for trigger in triggers {
            store.insert_trigger(trigger, paused, now);
        }
        debug!("Stored job {} (replace: {})", job.key, replace);
        store.jobs.insert(
            job.key.clone(),
            JobEntry {
                detail: job,
                paused,
            },
        );

        Ok(())
    }

    async fn get_job_detail(&self, key: &JobKey) -> Result<Option<JobDetail>, EngineError> {
        Ok(self
            .store
            .lock()
            .await
            .jobs
            .get(key)
            .map(|entry| entry.detail.clone()))
    }

    async fn add_job(
        &self,
        job: JobDetail,
        replace: bool,
        store_non_durable_while_awaiting_scheduling: bool,
    ) -> Result<(), EngineError> {
        if !job.durable && !store_non_durable_while_awaiting_scheduling {
            return Err(EngineError::NonDurableJobWithoutTrigger(job.key));
        }

        let mut store = self.store.lock().await;

        let paused = match store.jobs.get(&job.key) {
            Some(_) if !replace => return Err(EngineError::JobAlreadyExists(job.key)),
            Some(existing) => existing.paused,
            None => false,
        };

        store.jobs.insert(
            job.key.clone(),
            JobEntry {
                detail: job,
                paused,
            },
        );
        Ok(())
    }

    async fn delete_job(&self, key: &JobKey) -> Result<bool, EngineError> {
        let mut store = self.store.lock().await;
        store.remove_triggers_of(key);
        Ok(store.jobs.remove(key).is_some())
    }

    async fn pause_job(&self, key: &JobKey) -> Result<(), EngineError> {
        let mut store = self.store.lock().await;
        let Some(job) = store.jobs.get_mut(key) else {
            return Ok(());
        };
        job.paused = true;

        for entry in store.triggers.values_mut() {
            if &entry.trigger.job_key == key {
                entry.paused = true;
            }
        }
        Ok(())
    }

    async fn resume_job(&self, key: &JobKey) -> Result<(), EngineError> {
        let now = Local::now();
        let threshold = self.config.misfire_threshold();
        let mut store = self.store.lock().await;
        let Some(job) = store.jobs.get_mut(key) else {
            return Ok(());
        };
        job.paused = false;

        for entry in store.triggers.values_mut() {
            if &entry.trigger.job_key != key {
                continue;
            }
            entry.paused = false;

            if let Some(next_fire_time) = entry.next_fire_time {
                if now - next_fire_time > threshold {
                    debug!(
                        "Trigger {} misfired while paused, applying {:?}",
                        entry.trigger.key, entry.trigger.misfire_policy
                    );
                    entry.next_fire_time = entry.trigger.misfired_fire_time(now);
                }
            }
        }
        Ok(())
    }

    async fn get_triggers_of_job(&self, key: &JobKey) -> Result<Vec<Trigger>, EngineError> {
        Ok(self
            .store
            .lock()
            .await
            .triggers
            .values()
            .filter(|entry| &entry.trigger.job_key == key)
            .map(|entry| entry.trigger.clone())
            .collect())
    }

    fn cron_expression_is_valid(&self, expression: &str) -> bool {
        cron::Schedule::from_str(expression).is_ok()
    }
}
