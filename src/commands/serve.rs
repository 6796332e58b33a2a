use std::{path::PathBuf, sync::Arc};

use tracing::{error, info, warn};
use validator::Validate as _;

use crate::{
    app::App,
    config::Config,
    descriptor::{load_descriptors, JobDescriptor},
    engine::memory::MemoryEngine,
    environment::Environment,
    jobs::job_registry::JobRegistry,
    mailer::Mailer,
    service::JobService,
};

use super::CommandError;

pub async fn handle_serve_command(
    environment: Environment,
    config: Config,
    job_registry: JobRegistry,
    job_schedule: Vec<JobDescriptor>,
    descriptors: Option<PathBuf>,
) -> Result<(), CommandError> {
    let mut schedule = job_schedule;
    if let Some(path) = descriptors {
        let loaded = load_descriptors(&path)?;
        info!("📄 Loaded {} descriptor(s) from {}", loaded.len(), path.display());
        schedule.extend(loaded);
    }

    let mailer = Mailer::from_config(&config.email)?;

    let app = App {
        config: config.clone(),
        environment,
        mailer,
    };

    let registry = Arc::new(job_registry);
    let engine = Arc::new(MemoryEngine::new(config.engine.clone()));
    engine.start(registry.clone(), app).await?;

    let service = JobService::new(engine.clone(), registry);
    register_schedule(&service, &schedule).await;

    info!("🚀 Scheduler running in {} environment, press Ctrl-C to stop", environment);
    tokio::signal::ctrl_c().await?;
    info!("🛑 Shutdown requested");

    engine.shutdown().await?;
    Ok(())
}

/// Schedules boot-time descriptors, replacing jobs left over under the same key.
async fn register_schedule(service: &JobService, schedule: &[JobDescriptor]) {
    for descriptor in schedule {
        if let Err(e) = descriptor.validate() {
            warn!("⚠️ Skipping invalid descriptor {}: {}", descriptor.name, e);
            continue;
        }

        if let Err(e) = service.create_job_deleting_existing_job(descriptor).await {
            error!("❌ Could not schedule {}.{}: {}", descriptor.group, descriptor.name, e);
        }
    }
}
