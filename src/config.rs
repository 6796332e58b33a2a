use chrono::TimeDelta;
use serde::{Deserialize, Deserializer, Serialize};

use lettre::message::Mailbox;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub tracing: TracingConfig,
    #[serde(default)]
    pub engine: EngineConfig,
    pub email: EmailConfig,
    #[serde(default)]
    pub mail: MailScheduleConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum EmailConfig {
    /// Mock mailer that captures emails for testing
    Mock,
    /// Real SMTP configuration for sending emails
    Smtp {
        host: String,
        port: u16,
        #[serde(deserialize_with = "deserialize_mailbox")]
        sender: Mailbox,
        username: Option<String>,
        password: Option<String>,
        #[serde(default = "default_use_tls")]
        use_tls: bool,
    },
}

fn deserialize_mailbox<'de, D>(deserializer: D) -> Result<Mailbox, D::Error>
where
    D: Deserializer<'de>,
{
    let s: String = Deserialize::deserialize(deserializer)?;
    s.parse().map_err(serde::de::Error::custom)
}

fn default_use_tls() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TracingConfig {
    pub log_level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// How often the firing loop looks for due triggers, in milliseconds (default: 500)
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,
    /// Maximum number of jobs executing at the same time (default: 10)
    #[serde(default = "default_worker_count")]
    pub worker_count: usize,
    /// Job execution timeout in seconds (default: 300)
    #[serde(default = "default_job_timeout")]
    pub job_timeout_seconds: u64,
    /// How late a firing may be before it counts as misfired, in seconds (default: 60)
    #[serde(default = "default_misfire_threshold")]
    pub misfire_threshold_seconds: u64,
    /// Let running jobs finish when the engine shuts down (default: true)
    #[serde(default = "default_wait_for_jobs")]
    pub wait_for_jobs_on_shutdown: bool,
    /// Upper bound on the shutdown wait, in seconds (default: 30)
    #[serde(default = "default_shutdown_timeout")]
    pub shutdown_timeout_seconds: u64,
}

impl EngineConfig {
    /// Saturates at `TimeDelta::MAX` for thresholds chrono cannot represent.
    pub fn misfire_threshold(&self) -> TimeDelta {
        i64::try_from(self.misfire_threshold_seconds)
            .ok()
            .and_then(TimeDelta::try_seconds)
            .unwrap_or(TimeDelta::MAX)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval(),
            worker_count: default_worker_count(),
            job_timeout_seconds: default_job_timeout(),
            misfire_threshold_seconds: default_misfire_threshold(),
            wait_for_jobs_on_shutdown: default_wait_for_jobs(),
            shutdown_timeout_seconds: default_shutdown_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailScheduleConfig {
    /// Group the scheduled mail jobs are stored under (default: "email")
    #[serde(default = "default_mail_group")]
    pub group: String,
    /// Delay between the request and the send, in seconds (default: 30)
    #[serde(default = "default_mail_delay")]
    pub delay_seconds: u64,
}

impl Default for MailScheduleConfig {
    fn default() -> Self {
        Self {
            group: default_mail_group(),
            delay_seconds: default_mail_delay(),
        }
    }
}

const fn default_poll_interval() -> u64 {
    500
}

const fn default_worker_count() -> usize {
    10
}

const fn default_job_timeout() -> u64 {
    300 // 5 minutes
}

const fn default_misfire_threshold() -> u64 {
    60
}

const fn default_wait_for_jobs() -> bool {
    true
}

const fn default_shutdown_timeout() -> u64 {
    30
}

fn default_mail_group() -> String {
    "email".to_string()
}

const fn default_mail_delay() -> u64 {
    30
}
