//! Task identifiers.
//!
//! A task id embeds the job key and instance it was created for, followed by
//! a ULID so ids created for the same instance stay unique and sort by
//! creation time:
//!
//! ```text
//! www-data-prod-hello-0-01HV2Z3K9Q8R7C6Y5X4W3V2T1S
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use ulid::Ulid;

use super::job::JobKey;

/// Identifier of a scheduled task.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Build the id of `instance_id` of `job`, made unique by `ulid`.
    pub fn for_instance(job: &JobKey, instance_id: u32, ulid: Ulid) -> Self {
        Self(format!(
            "{}-{}-{}-{}-{}",
            job.role(),
            job.environment(),
            job.name(),
            instance_id,
            ulid
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for TaskId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}
