use std::future::Future;
use std::pin::Pin;
use std::{collections::HashMap, sync::Arc};

use crate::app::App;

use super::{execution_context::JobExecutionContext, job_result::JobResult, Job, JobError};

/// Type alias for job executor function to reduce type complexity
type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;
type JobExecutor = Arc<
    dyn Fn(&App, JobExecutionContext) -> BoxFuture<'static, Result<(), JobError>> + Send + Sync,
>;

/// Maps job type identifiers to their executors.
///
/// Populated once at process start and shared read-only afterwards. Looking up
/// an unknown type is a configuration error, never retried.
#[derive(Clone)]
pub struct JobRegistry {
    jobs: HashMap<&'static str, JobExecutor>,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self {
            jobs: HashMap::new(),
        }
    }

    pub fn register_job<J: Job + 'static>(&mut self) {
        let executor: JobExecutor = Arc::new(|app: &App, context: JobExecutionContext| {
            let app = app.clone();
            let future: BoxFuture<'static, Result<(), JobError>> = Box::pin(async move {
                let arguments: J::Arguments = serde_json::from_value(serde_json::Value::Object(
                    context.merged_data.clone(),
                ))
                .map_err(|e| JobError::InvalidPayload(e.to_string()))?;
                J::execute(&app, &context, arguments).await
            });
            future
        });

        self.jobs.insert(J::name(), executor);
    }

    #[must_use]
    pub fn with_job<J: Job + 'static>(mut self) -> Self {
        self.register_job::<J>();
        self
    }

    /// Registered identifier matching `job_type`, if any.
    pub fn resolve(&self, job_type: &str) -> Option<&'static str> {
        self.jobs.get_key_value(job_type).map(|(name, _)| *name)
    }

    pub fn job_names(&self) -> impl Iterator<Item = &&'static str> {
        self.jobs.keys()
    }

    pub async fn execute(&self, app: &App, context: JobExecutionContext) -> JobResult {
        if let Some(executor) = self.jobs.get(context.job_type.as_str()) {
            match executor(app, context).await {
                Ok(()) => JobResult::Completed,
                Err(e) => JobResult::Failed(e),
            }
        } else {
            JobResult::Failed(JobError::ExecutionFailed(format!(
                "No job registered for job type: {}",
                context.job_type
            )))
        }
    }
}

impl Default for JobRegistry {
    fn default() -> Self {
        Self::new()
    }
}
