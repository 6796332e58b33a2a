//! Descriptor to engine primitive translation, and back.

pub mod job_translator;
pub mod trigger_translator;

use thiserror::Error;

pub use job_translator::JobTranslator;
pub use trigger_translator::TriggerTranslator;

/// Payload key holding the cron expression of a recurring trigger.
pub const CRON_KEY: &str = "cron";
/// Payload key holding the local fire time of a one-shot trigger.
pub const FIRE_TIME_KEY: &str = "fireTime";

#[derive(Debug, Error)]
pub enum TranslationError {
    #[error("No job implementation registered for type: {0}")]
    JobTypeNotFound(String),
    #[error("Invalid cron expression: {0}")]
    InvalidCronExpression(String),
    #[error("Trigger descriptor needs a cron expression or a fire time in the future")]
    UnsupportedTriggerDescriptor,
}
