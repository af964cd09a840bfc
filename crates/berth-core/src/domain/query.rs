//! Task queries.
//!
//! A query is a conjunction of optional filters. A filter that is present but
//! empty (e.g. `task_scoped([])`) matches no task.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::ids::TaskId;
use super::job::JobKey;
use super::status::ScheduleStatus;
use super::task::ScheduledTask;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskQuery {
    role: Option<String>,
    environment: Option<String>,
    job_name: Option<String>,
    task_ids: Option<BTreeSet<TaskId>>,
    statuses: Option<BTreeSet<ScheduleStatus>>,
    instance_ids: Option<BTreeSet<u32>>,
    slave_hosts: Option<BTreeSet<String>>,
}

impl TaskQuery {
    /// Matches every task.
    pub fn unscoped() -> Self {
        Self::default()
    }

    pub fn task_scoped(ids: impl IntoIterator<Item = TaskId>) -> Self {
        Self {
            task_ids: Some(ids.into_iter().collect()),
            ..Self::default()
        }
    }

    pub fn role_scoped(role: impl Into<String>) -> Self {
        Self {
            role: Some(role.into()),
            ..Self::default()
        }
    }

    pub fn env_scoped(role: impl Into<String>, environment: impl Into<String>) -> Self {
        Self {
            environment: Some(environment.into()),
            ..Self::role_scoped(role)
        }
    }

    pub fn job_scoped(job: &JobKey) -> Self {
        Self {
            job_name: Some(job.name().to_string()),
            ..Self::env_scoped(job.role(), job.environment())
        }
    }

    pub fn instance_scoped(job: &JobKey, instances: impl IntoIterator<Item = u32>) -> Self {
        Self {
            instance_ids: Some(instances.into_iter().collect()),
            ..Self::job_scoped(job)
        }
    }

    pub fn slave_scoped(hosts: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            slave_hosts: Some(hosts.into_iter().map(Into::into).collect()),
            ..Self::default()
        }
    }

    pub fn by_status(mut self, statuses: impl IntoIterator<Item = ScheduleStatus>) -> Self {
        self.statuses = Some(statuses.into_iter().collect());
        self
    }

    pub fn active(self) -> Self {
        self.by_status(ScheduleStatus::active_states())
    }

    pub fn live(self) -> Self {
        self.by_status(ScheduleStatus::live_states())
    }

    pub fn terminal(self) -> Self {
        self.by_status(ScheduleStatus::terminal_states())
    }

    pub fn task_ids(&self) -> Option<&BTreeSet<TaskId>> {
        self.task_ids.as_ref()
    }

    pub fn slave_hosts(&self) -> Option<&BTreeSet<String>> {
        self.slave_hosts.as_ref()
    }

    /// The job this query is scoped to, if role, environment and name are all set.
    pub fn job_key(&self) -> Option<JobKey> {
        match (&self.role, &self.environment, &self.job_name) {
            (Some(role), Some(env), Some(name)) => JobKey::new(role, env, name).ok(),
            _ => None,
        }
    }

    pub fn matches(&self, task: &ScheduledTask) -> bool {
        let job = task.job_key();
        fn allows<T: Ord>(filter: &Option<BTreeSet<T>>, value: &T) -> bool {
            filter.as_ref().is_none_or(|set| set.contains(value))
        }

        self.role.as_deref().is_none_or(|r| r == job.role())
            && self
                .environment
                .as_deref()
                .is_none_or(|e| e == job.environment())
            && self.job_name.as_deref().is_none_or(|n| n == job.name())
            && allows(&self.task_ids, task.task_id())
            && allows(&self.statuses, &task.status)
            && allows(&self.instance_ids, &task.instance_id())
            && self.slave_hosts.as_ref().is_none_or(|hosts| {
                task.slave_host().is_some_and(|host| hosts.contains(host))
            })
    }
}
