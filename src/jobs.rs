pub mod echo;
pub mod execution_context;
pub mod job_registry;
pub mod job_result;
pub mod send_email;

use crate::{app::App, descriptor::JobDataMap};
use execution_context::JobExecutionContext;
use serde::de::DeserializeOwned;
use std::future::Future;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum JobError {
    #[error("{0}")]
    ExecutionFailed(String),
    #[error("Invalid job payload: {0}")]
    InvalidPayload(String),
}

/// An executable job implementation.
///
/// Implementations are registered by [`Job::name`] in a
/// [`job_registry::JobRegistry`]; that name is what descriptors put in `type`.
/// `Arguments` is deserialized from the merged job and trigger payload right
/// before `execute` runs.
pub trait Job: Send + Sync {
    type Arguments: DeserializeOwned + Send + Sync;

    fn execute(
        app: &App,
        context: &JobExecutionContext,
        arguments: Self::Arguments,
    ) -> impl Future<Output = Result<(), JobError>> + Send;

    fn name() -> &'static str;

    fn log(context: &JobExecutionContext) {
        info!(
            "Processing job with key: {}, description: {}",
            context.job_key,
            context.job_description.as_deref().unwrap_or_default()
        );
    }

    fn job_data_map(context: &JobExecutionContext) -> &JobDataMap {
        &context.merged_data
    }
}
