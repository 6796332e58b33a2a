use std::{path::Path, sync::Arc};

use validator::Validate as _;

use crate::{
    descriptor::{load_descriptors, JobDescriptor},
    engine::memory::MemoryEngine,
    jobs::job_registry::JobRegistry,
    translate::{JobTranslator, TriggerTranslator},
};

use super::CommandError;

pub fn handle_check_command(path: &Path, job_registry: JobRegistry) -> Result<(), CommandError> {
    let descriptors = load_descriptors(path)?;

    // Only used for cron validation, never started.
    let jobs = JobTranslator::new(Arc::new(job_registry));
    let triggers = TriggerTranslator::new(Arc::new(MemoryEngine::default()));

    let mut failures = 0;
    for descriptor in &descriptors {
        match check_descriptor(&jobs, &triggers, descriptor) {
            Ok(count) => println!(
                "✅ {}.{}: {} trigger(s)",
                descriptor.group, descriptor.name, count
            ),
            Err(reason) => {
                failures += 1;
                println!("❌ {}.{}: {}", descriptor.group, descriptor.name, reason);
            }
        }
    }

    println!();
    println!(
        "📋 {} descriptor(s) checked, {} failed",
        descriptors.len(),
        failures
    );

    if failures > 0 {
        return Err(CommandError::CheckFailed(failures));
    }
    Ok(())
}

fn check_descriptor(
    jobs: &JobTranslator,
    triggers: &TriggerTranslator,
    descriptor: &JobDescriptor,
) -> Result<usize, String> {
    descriptor.validate().map_err(|e| e.to_string())?;
    jobs.build_job_detail(descriptor).map_err(|e| e.to_string())?;
    let built = triggers
        .build_triggers(descriptor)
        .map_err(|e| e.to_string())?;
    Ok(built.len())
}
