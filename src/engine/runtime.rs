use std::{sync::Arc, time::Instant};

use chrono::Local;
use tokio::{
    sync::{watch, Mutex},
    task::{JoinHandle, JoinSet},
    time::{interval, timeout, Duration, MissedTickBehavior},
};
use tracing::{debug, error, info, warn};

use crate::{
    app::App,
    config::EngineConfig,
    jobs::{execution_context::JobExecutionContext, job_registry::JobRegistry, job_result::JobResult},
};

use super::memory::Store;

/// Handle on the firing loop spawned by [`spawn`].
pub(super) struct RuntimeHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl RuntimeHandle {
    pub(super) async fn stop(self) {
        // The loop may already be gone, in which case there is nobody to notify.
        let _ = self.shutdown.send(true);

        if let Err(e) = self.task.await {
            error!("💥 Scheduler loop ended abnormally: {}", e);
        }
    }
}

pub(super) fn spawn(
    store: Arc<Mutex<Store>>,
    config: EngineConfig,
    registry: Arc<JobRegistry>,
    app: App,
) -> RuntimeHandle {
    let (shutdown, shutdown_receiver) = watch::channel(false);

    let task = tokio::spawn(run(store, config, registry, app, shutdown_receiver));

    RuntimeHandle { shutdown, task }
}

async fn run(
    store: Arc<Mutex<Store>>,
    config: EngineConfig,
    registry: Arc<JobRegistry>,
    app: App,
    mut shutdown: watch::Receiver<bool>,
) {
    info!(
        "⏰ Scheduler started: polling every {}ms with {} worker(s)",
        config.poll_interval_ms, config.worker_count
    );

    let mut running = JoinSet::new();
    let mut ticker = interval(Duration::from_millis(config.poll_interval_ms.max(1)));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = shutdown.changed() => break,
            _ = ticker.tick() => {
                fire_due_triggers(&store, &config, &registry, &app, &mut running).await;
            }
        }
    }

    drain(running, &config).await;
}

async fn fire_due_triggers(
    store: &Mutex<Store>,
    config: &EngineConfig,
    registry: &Arc<JobRegistry>,
    app: &App,
    running: &mut JoinSet<()>,
) {
    while let Some(result) = running.try_join_next() {
        if let Err(e) = result {
            error!("💥 Job task panicked: {}", e);
        }
    }

    let capacity = config.worker_count.saturating_sub(running.len());
    if capacity == 0 {
        debug!("All {} workers busy, postponing due triggers", config.worker_count);
        return;
    }

    let firings = store
        .lock()
        .await
        .acquire_due(Local::now(), capacity, config.misfire_threshold());

    for context in firings {
        let registry = registry.clone();
        let app = app.clone();
        let job_timeout = Duration::from_secs(config.job_timeout_seconds);

        running.spawn(async move {
            execute_job(&registry, &app, context, job_timeout).await;
        });
    }
}

async fn execute_job(
    registry: &JobRegistry,
    app: &App,
    context: JobExecutionContext,
    job_timeout: Duration,
) {
    let job_key = context.job_key.clone();
    let trigger_key = context.trigger_key.clone();
    let job_type = context.job_type.clone();

    debug!("🔧 Firing {}({}) via trigger {}", job_type, job_key, trigger_key);

    let start_time = Instant::now();
    let result = timeout(job_timeout, registry.execute(app, context))
        .await
        .unwrap_or(JobResult::TimedOut);
    let duration = start_time.elapsed();

    if result.is_completed() {
        info!("✅ Job {}({}) {} in {:?}", job_type, job_key, result, duration);
    } else {
        error!("❌ Job {}({}) {} after {:?}", job_type, job_key, result, duration);
    }
}

async fn drain(mut running: JoinSet<()>, config: &EngineConfig) {
    if running.is_empty() {
        return;
    }

    if !config.wait_for_jobs_on_shutdown {
        warn!("Aborting {} running job(s)", running.len());
        running.abort_all();
        return;
    }

    info!("Waiting for {} running job(s) to finish", running.len());
    let wait = async { while running.join_next().await.is_some() {} };

    if timeout(Duration::from_secs(config.shutdown_timeout_seconds), wait)
        .await
        .is_err()
    {
        warn!(
            "Running jobs did not finish within {}s, aborting them",
            config.shutdown_timeout_seconds
        );
        running.abort_all();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::Local;
    use serde_json::json;

    use crate::{
        engine::{
            memory::MemoryEngine, EngineError, JobBuilder, JobKey, SchedulingEngine as _, Trigger,
            TriggerKey,
        },
        jobs::{send_email::SendEmail, Job as _},
        tests::setup_test::{test_app, test_config, test_registry},
    };

    #[tokio::test]
    async fn test_started_engine_fires_due_job() {
        let app = test_app();
        let engine = MemoryEngine::new(test_config().engine);
        engine
            .start(Arc::new(test_registry()), app.clone())
            .await
            .unwrap();

        let job_key = JobKey::new("mailTo:a@x.com", "email");
        let job = JobBuilder::new(SendEmail::name())
            .with_identity(job_key.clone())
            .using_job_data(
                json!({ "toEmail": "a@x.com", "subject": "s", "message": "m" })
                    .as_object()
                    .cloned()
                    .unwrap(),
            )
            .store_durably(true)
            .build();
        let trigger = Trigger::once(
            TriggerKey::new("mailTo:a@x.com", "email"),
            job_key.clone(),
            Local::now(),
            Default::default(),
        );
        engine.schedule_job(job, vec![trigger], false).await.unwrap();

        tokio::time::sleep(std::time::Duration::from_millis(300)).await;
        engine.shutdown().await.unwrap();

        assert_eq!(app.mailer.messages().unwrap().len(), 1);
        assert!(engine.get_job_detail(&job_key).await.unwrap().is_some());
        assert!(engine.get_triggers_of_job(&job_key).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_lifecycle_errors() {
        let engine = MemoryEngine::new(test_config().engine);

        assert!(matches!(
            engine.shutdown().await,
            Err(EngineError::NotStarted)
        ));

        engine
            .start(Arc::new(test_registry()), test_app())
            .await
            .unwrap();
        assert!(engine.is_started().await);
        assert!(matches!(
            engine.start(Arc::new(test_registry()), test_app()).await,
            Err(EngineError::AlreadyStarted)
        ));

        engine.shutdown().await.unwrap();
        assert!(!engine.is_started().await);
    }
}
