use std::fmt::{Display, Formatter, Result};

use crate::jobs::JobError;

pub enum JobResult {
    Completed,
    Failed(JobError),
    TimedOut,
}

impl JobResult {
    pub const fn is_completed(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

impl Display for JobResult {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            Self::Completed => write!(f, "completed"),
            Self::Failed(e) => write!(f, "error: {e}"),
            Self::TimedOut => write!(f, "timed out"),
        }
    }
}
