//! Job keys and cron job configurations.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::errors::StorageError;
use super::task::TaskConfig;

/// Fully qualified name of a job: `role/environment/name`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct JobKey {
    role: String,
    environment: String,
    name: String,
}

fn is_valid_component(s: &str) -> bool {
    !s.is_empty()
        && s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
}

impl JobKey {
    pub fn new(
        role: impl Into<String>,
        environment: impl Into<String>,
        name: impl Into<String>,
    ) -> Result<Self, StorageError> {
        let key = Self {
            role: role.into(),
            environment: environment.into(),
            name: name.into(),
        };
        if [&key.role, &key.environment, &key.name]
            .iter()
            .all(|c| is_valid_component(c))
        {
            Ok(key)
        } else {
            Err(StorageError::InvalidJobKey(key.to_string()))
        }
    }

    pub fn role(&self) -> &str {
        &self.role
    }

    pub fn environment(&self) -> &str {
        &self.environment
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for JobKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.role, self.environment, self.name)
    }
}

impl FromStr for JobKey {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split('/').collect();
        match parts.as_slice() {
            [role, environment, name] => JobKey::new(*role, *environment, *name),
            _ => Err(StorageError::InvalidJobKey(s.to_string())),
        }
    }
}

/// What to do when a cron run fires while the previous run is still active.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CronCollisionPolicy {
    /// Kill the running instances and start the new run.
    #[default]
    KillExisting,
    /// Skip the new run.
    CancelNew,
    /// Let both runs proceed.
    RunOverlap,
}

/// A job accepted by the scheduler, as held by the cron job store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobConfiguration {
    pub key: JobKey,
    pub owner: String,
    pub cron_schedule: Option<String>,
    #[serde(default)]
    pub cron_collision_policy: CronCollisionPolicy,
    pub task_config: TaskConfig,
    pub instance_count: u32,
}

impl JobConfiguration {
    /// Check the shape the cron job store requires before accepting a job.
    pub fn validate_cron(&self) -> Result<(), StorageError> {
        let has_schedule = self
            .cron_schedule
            .as_deref()
            .is_some_and(|s| !s.trim().is_empty());
        if !has_schedule {
            return Err(StorageError::NotACronJob(self.key.clone()));
        }
        if self.instance_count == 0 {
            return Err(StorageError::InvalidJob {
                key: self.key.clone(),
                reason: "instance_count must be at least 1".to_string(),
            });
        }
        if self.task_config.job != self.key {
            return Err(StorageError::InvalidJob {
                key: self.key.clone(),
                reason: format!("task config belongs to {}", self.task_config.job),
            });
        }
        Ok(())
    }
}
