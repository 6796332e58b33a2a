use std::{env, str::FromStr as _};

use clap::Parser as _;
use config_rs::Config as ConfigRs;
use tracing::{debug, trace};

use crate::{
    app_info::AppInfo,
    cli::{Cli, Commands},
    commands::{check, serve, version, CommandError},
    config::Config,
    descriptor::JobDescriptor,
    environment::Environment,
    jobs::job_registry::JobRegistry,
    setup_tracing::setup_tracing_for_command,
};

const ENVIRONMENT_VARIABLE: &str = "APP_ENVIRONMENT";

/// Everything an application hands over to get a scheduler process:
/// its metadata, the jobs it implements and the jobs to schedule on startup.
pub struct BootConfig {
    pub app_info: AppInfo,
    pub job_registry: JobRegistry,
    pub job_schedule: Vec<JobDescriptor>,
}

impl BootConfig {
    #[must_use]
    pub const fn new(
        app_info: AppInfo,
        job_registry: JobRegistry,
        job_schedule: Vec<JobDescriptor>,
    ) -> Self {
        Self {
            app_info,
            job_registry,
            job_schedule,
        }
    }
}

pub async fn boot(config: BootConfig) -> Result<(), CommandError> {
    let cli = Cli::parse();

    if matches!(cli.command, Some(Commands::Version)) {
        version::print_version_info(config.app_info, &config.job_registry);
        return Ok(());
    }

    if let Some(Commands::Check { path }) = &cli.command {
        setup_tracing_for_command(&cli.command, "warn");
        return check::handle_check_command(path, config.job_registry);
    }

    let environment = set_environment();
    let app_config = read_config(&environment)?;

    setup_tracing_for_command(&cli.command, &app_config.tracing.log_level);

    debug!("Environment set to: {:?}", environment);
    trace!("Configuration loaded: {:?}", app_config);

    let descriptors = match cli.command {
        Some(Commands::Serve { descriptors }) => descriptors,
        _ => None,
    };

    serve::handle_serve_command(
        environment,
        app_config,
        config.job_registry,
        config.job_schedule,
        descriptors,
    )
    .await
}

#[must_use]
pub fn set_environment() -> Environment {
    env::var(ENVIRONMENT_VARIABLE)
        .ok()
        .and_then(|s| Environment::from_str(&s).ok())
        .unwrap_or_default()
}

pub fn read_config(environment: &Environment) -> Result<Config, config_rs::ConfigError> {
    let config_file_name = format!("config/{environment}");

    trace!("Reading configuration from: {}", config_file_name);

    ConfigRs::builder()
        .add_source(config_rs::File::with_name(&config_file_name))
        .add_source(config_rs::Environment::with_prefix("APP").separator("__"))
        .build()?
        .try_deserialize()
}
