pub mod job_service;
pub mod mail_service;

use thiserror::Error;
use validator::ValidationErrors;

use crate::{
    engine::{EngineError, JobKey},
    translate::TranslationError,
};

pub use job_service::JobService;
pub use mail_service::{MailRequest, MailService};

#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error(transparent)]
    Translation(#[from] TranslationError),
    /// The engine refused the request, e.g. the key is already taken.
    #[error("Could not schedule job with key {key}: {source}")]
    Scheduling {
        key: JobKey,
        #[source]
        source: EngineError,
    },
    #[error("A delay of {0}s puts the fire time out of range")]
    DelayOutOfRange(u64),
    #[error("Invalid request: {0}")]
    InvalidRequest(#[from] ValidationErrors),
}
