use std::env;

use crate::{app_info::AppInfo, jobs::job_registry::JobRegistry};

pub fn print_version_info(app: AppInfo, job_registry: &JobRegistry) {
    let core = AppInfo::scheduler_core();

    let git_hash = option_env!("GIT_HASH").unwrap_or("unknown");
    let rustc_version = option_env!("RUSTC_VERSION").unwrap_or("unknown");

    println!("📦 {app}");
    if !app.description.is_empty() {
        println!("📝 {}", app.description);
    }

    if app.name != core.name {
        println!("⏰ Scheduled by {core}");
    }

    let mut job_types: Vec<_> = job_registry.job_names().copied().collect();
    job_types.sort_unstable();

    println!();
    println!("🔧 Registered job types:");
    if job_types.is_empty() {
        println!("  (none)");
    }
    for job_type in job_types {
        println!("  • {job_type}");
    }

    println!();
    println!("🔨 Build: {git_hash} (rustc {rustc_version})");
    println!("💻 Runtime: {} / {}", env::consts::OS, env::consts::ARCH);
}
