//! Scheduled tasks: what to run, where it was assigned, and its history.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::TaskId;
use super::job::JobKey;
use super::status::ScheduleStatus;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Resources {
    pub cpus: f64,
    pub ram_mb: u64,
    pub disk_mb: u64,
}

/// Description of what a task runs, shared by all instances of a job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskConfig {
    pub job: JobKey,
    pub owner_user: String,
    #[serde(default)]
    pub is_service: bool,
    #[serde(default)]
    pub production: bool,
    #[serde(default)]
    pub priority: i32,
    #[serde(default)]
    pub max_task_failures: u32,
    pub resources: Resources,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

/// A task instance together with the machine it was assigned to, if any.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignedTask {
    pub task_id: TaskId,
    pub slave_id: Option<String>,
    pub slave_host: Option<String>,
    pub instance_id: u32,
    pub task: TaskConfig,
    #[serde(default)]
    pub assigned_ports: BTreeMap<String, u16>,
}

impl AssignedTask {
    /// An unassigned instance of `task`.
    pub fn unassigned(task_id: TaskId, instance_id: u32, task: TaskConfig) -> Self {
        Self {
            task_id,
            slave_id: None,
            slave_host: None,
            instance_id,
            task,
            assigned_ports: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskEvent {
    pub timestamp: DateTime<Utc>,
    pub status: ScheduleStatus,
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledTask {
    pub assigned_task: AssignedTask,
    pub status: ScheduleStatus,
    pub failure_count: u32,
    /// Oldest first.
    pub task_events: Vec<TaskEvent>,
    pub ancestor_id: Option<TaskId>,
}

impl ScheduledTask {
    /// A new task in `Pending`, with the creation recorded as its first event.
    pub fn pending(assigned_task: AssignedTask, now: DateTime<Utc>) -> Self {
        Self {
            assigned_task,
            status: ScheduleStatus::Pending,
            failure_count: 0,
            task_events: vec![TaskEvent {
                timestamp: now,
                status: ScheduleStatus::Pending,
                message: None,
            }],
            ancestor_id: None,
        }
    }

    pub fn task_id(&self) -> &TaskId {
        &self.assigned_task.task_id
    }

    pub fn job_key(&self) -> &JobKey {
        &self.assigned_task.task.job
    }

    pub fn instance_id(&self) -> u32 {
        self.assigned_task.instance_id
    }

    pub fn slave_host(&self) -> Option<&str> {
        self.assigned_task.slave_host.as_deref()
    }

    /// Move to `status` and record the change.
    pub fn transition(
        &mut self,
        status: ScheduleStatus,
        message: Option<String>,
        at: DateTime<Utc>,
    ) {
        if status == ScheduleStatus::Failed {
            self.failure_count += 1;
        }
        self.status = status;
        self.task_events.push(TaskEvent {
            timestamp: at,
            status,
            message,
        });
    }

    /// Assign to a machine and move to `Assigned`.
    pub fn assign(
        &mut self,
        slave_id: impl Into<String>,
        slave_host: impl Into<String>,
        at: DateTime<Utc>,
    ) {
        self.assigned_task.slave_id = Some(slave_id.into());
        self.assigned_task.slave_host = Some(slave_host.into());
        self.transition(ScheduleStatus::Assigned, None, at);
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::{epoch, pending_task};
    use super::*;

    fn job() -> JobKey {
        JobKey::new("www-data", "prod", "hello").unwrap()
    }

    #[test]
    fn new_task_starts_pending_with_one_event() {
        let task = pending_task(&job(), 0);
        assert_eq!(task.status, ScheduleStatus::Pending);
        assert_eq!(task.task_events.len(), 1);
        assert_eq!(task.task_events[0].status, ScheduleStatus::Pending);
        assert_eq!(task.job_key(), &job());
    }

    #[test]
    fn transitions_append_events_in_order() {
        let mut task = pending_task(&job(), 0);
        task.assign("slave-1", "host-a", epoch());
        task.transition(ScheduleStatus::Running, None, epoch());

        let statuses: Vec<_> = task.task_events.iter().map(|e| e.status).collect();
        assert_eq!(
            statuses,
            vec![
                ScheduleStatus::Pending,
                ScheduleStatus::Assigned,
                ScheduleStatus::Running
            ]
        );
        assert_eq!(task.slave_host(), Some("host-a"));
    }

    #[test]
    fn failing_counts_failures() {
        let mut task = pending_task(&job(), 0);
        task.transition(ScheduleStatus::Failed, Some("exit 1".to_string()), epoch());
        assert_eq!(task.failure_count, 1);
        assert_eq!(
            task.task_events.last().and_then(|e| e.message.as_deref()),
            Some("exit 1")
        );
    }
}
