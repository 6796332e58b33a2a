use std::process::ExitCode;

use timekeeper::{
    app_info::AppInfo,
    boot::{boot, BootConfig},
    jobs::{echo::EchoJob, job_registry::JobRegistry, send_email::SendEmail},
};

#[tokio::main]
async fn main() -> ExitCode {
    let job_registry = JobRegistry::new()
        .with_job::<EchoJob>()
        .with_job::<SendEmail>();

    let config = BootConfig::new(AppInfo::scheduler_core(), job_registry, Vec::new());

    match boot(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("❌ {e}");
            ExitCode::FAILURE
        }
    }
}
