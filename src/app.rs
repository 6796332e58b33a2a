use crate::{config::Config, environment::Environment, mailer::Mailer};

/// Shared, cheaply cloneable state handed to every job execution.
#[derive(Clone, Debug)]
pub struct App {
    pub config: Config,
    pub environment: Environment,
    pub mailer: Mailer,
}
