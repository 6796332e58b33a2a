//! Scheduling engine interface and primitives.
//!
//! The orchestration layer only talks to [`SchedulingEngine`]. [`memory::MemoryEngine`]
//! is the in-process implementation used by the `serve` command and the tests.

pub mod job_detail;
pub mod memory;
mod runtime;
pub mod trigger;

use std::fmt::{self, Display};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use job_detail::{JobBuilder, JobDetail};
pub use trigger::{MisfirePolicy, Trigger, TriggerSchedule};

/// Group used when a key is created with an empty group.
pub const DEFAULT_GROUP: &str = "DEFAULT";

/// `(name, group)` identity of a job or trigger.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Key {
    pub name: String,
    pub group: String,
}

pub type JobKey = Key;
pub type TriggerKey = Key;

impl Key {
    pub fn new(name: impl Into<String>, group: impl Into<String>) -> Self {
        let group = group.into();
        Self {
            name: name.into(),
            group: if group.is_empty() {
                DEFAULT_GROUP.to_string()
            } else {
                group
            },
        }
    }
}

impl Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.group, self.name)
    }
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Unable to store job {0}: a job with this identification already exists")]
    JobAlreadyExists(JobKey),
    #[error("Unable to store trigger {0}: a trigger with this identification already exists")]
    TriggerAlreadyExists(TriggerKey),
    #[error("Invalid trigger: {0}")]
    InvalidTrigger(String),
    #[error("Job {0} is not durable and has no trigger to be stored with")]
    NonDurableJobWithoutTrigger(JobKey),
    #[error("Scheduler is already started")]
    AlreadyStarted,
    #[error("Scheduler is not started")]
    NotStarted,
}

/// Operations the orchestration layer consumes from a scheduling engine.
///
/// Every call is atomic with respect to the engine's own store; nothing above
/// this trait holds locks.
#[async_trait]
pub trait SchedulingEngine: Send + Sync {
    /// Store a job together with its triggers. With `replace` an existing job
    /// with the same key is overwritten and its previous triggers dropped.
    async fn schedule_job(
        &self,
        job: JobDetail,
        triggers: Vec<Trigger>,
        replace: bool,
    ) -> Result<(), EngineError>;

    async fn get_job_detail(&self, key: &JobKey) -> Result<Option<JobDetail>, EngineError>;

    /// Store a job definition without touching any trigger.
    async fn add_job(
        &self,
        job: JobDetail,
        replace: bool,
        store_non_durable_while_awaiting_scheduling: bool,
    ) -> Result<(), EngineError>;

    /// Remove a job and all its triggers. Returns whether the job existed.
    async fn delete_job(&self, key: &JobKey) -> Result<bool, EngineError>;

    async fn pause_job(&self, key: &JobKey) -> Result<(), EngineError>;

    async fn resume_job(&self, key: &JobKey) -> Result<(), EngineError>;

    async fn get_triggers_of_job(&self, key: &JobKey) -> Result<Vec<Trigger>, EngineError>;

    fn cron_expression_is_valid(&self, expression: &str) -> bool;
}
