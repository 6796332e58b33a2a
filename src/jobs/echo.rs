use tracing::info;

use crate::{app::App, descriptor::JobDataMap};

use super::{execution_context::JobExecutionContext, Job, JobError};

/// Logs its payload. Handy for checking that a descriptor fires as expected.
pub struct EchoJob;

impl Job for EchoJob {
    type Arguments = JobDataMap;

    async fn execute(
        _app: &App,
        context: &JobExecutionContext,
        _arguments: Self::Arguments,
    ) -> Result<(), JobError> {
        Self::log(context);
        info!(
            "Echo job fired by {} with data: {}",
            context.trigger_key,
            serde_json::Value::Object(Self::job_data_map(context).clone())
        );
        Ok(())
    }

    fn name() -> &'static str {
        "echo"
    }
}
