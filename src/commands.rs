pub mod check;
pub mod serve;
pub mod version;

use thiserror::Error;

use crate::{descriptor::DescriptorFileError, engine::EngineError};

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Configuration error: {0}")]
    Config(#[from] config_rs::ConfigError),
    #[error("Failed to create mailer transport: {0}")]
    Mailer(#[from] lettre::transport::smtp::Error),
    #[error(transparent)]
    Descriptors(#[from] DescriptorFileError),
    #[error("Scheduler error: {0}")]
    Engine(#[from] EngineError),
    #[error("Failed to listen for shutdown signal: {0}")]
    Signal(#[from] std::io::Error),
    #[error("{0} descriptor(s) failed the check")]
    CheckFailed(usize),
}
