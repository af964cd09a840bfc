//! Errors raised by the domain model and the stores.

use thiserror::Error;

use super::ids::TaskId;
use super::job::JobKey;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StorageError {
    #[error("invalid job key '{0}': expected role/environment/name made of [A-Za-z0-9_.-]")]
    InvalidJobKey(String),

    #[error("job {0} has no cron schedule and cannot be stored as a cron job")]
    NotACronJob(JobKey),

    #[error("job {key} rejected: {reason}")]
    InvalidJob { key: JobKey, reason: String },

    #[error("task id {0} appears more than once in the same batch")]
    DuplicateTaskId(TaskId),

    #[error("mutation must not change the task id ({from} -> {to})")]
    TaskIdChanged { from: TaskId, to: TaskId },

    #[error("unknown schedule status '{name}' (valid: {valid})")]
    UnknownStatus { name: String, valid: String },
}
