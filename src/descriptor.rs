//! Caller-facing job and trigger descriptors.
//!
//! Descriptors are plain data exchanged with whatever sits in front of the
//! scheduler (a JSON file, an HTTP layer, an internal producer). They are
//! translated into engine primitives by [`crate::translate`] and never kept
//! around afterwards; the engine is the system of record.

pub mod job_descriptor;
pub mod trigger_descriptor;

use std::{fs, io, path::Path};

use thiserror::Error;
use validator::ValidationError;

pub use job_descriptor::JobDescriptor;
pub use trigger_descriptor::TriggerDescriptor;

/// Dynamic payload attached to jobs and triggers.
///
/// Values are arbitrary JSON so the payload survives the wire format losslessly.
pub type JobDataMap = serde_json::Map<String, serde_json::Value>;

#[derive(Debug, Error)]
pub enum DescriptorFileError {
    #[error("Failed to read descriptor file: {0}")]
    Io(#[from] io::Error),
    #[error("Failed to parse descriptor file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Load a JSON array of job descriptors from disk.
pub fn load_descriptors(path: &Path) -> Result<Vec<JobDescriptor>, DescriptorFileError> {
    let contents = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}

pub(crate) fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}
