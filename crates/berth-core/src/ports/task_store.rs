//! TaskStore port - タスク状態の正本（source of truth）
//!
//! # 設計原則
//! - 読み取り（`TaskStore`）と書き込み（`MutableTaskStore`）を分離
//! - task id は不変。mutation で id を変えることはできない
//!
//! # 実装
//! - **MemTaskStore**: インメモリ実装（job / host の二次インデックス付き）

use std::collections::BTreeSet;

use async_trait::async_trait;

use crate::domain::{JobKey, ScheduledTask, StorageError, TaskConfig, TaskId, TaskQuery};

/// A change applied to a stored task. Receives the current task and returns
/// its replacement.
pub type TaskMutation = Box<dyn FnOnce(&ScheduledTask) -> ScheduledTask + Send>;

#[async_trait]
pub trait TaskStore: Send + Sync {
    async fn fetch_task(&self, task_id: &TaskId) -> Option<ScheduledTask>;

    /// Tasks matching `query`, ordered by task id.
    async fn fetch_tasks(&self, query: &TaskQuery) -> Vec<ScheduledTask>;

    /// Keys of all jobs with at least one stored task.
    async fn job_keys(&self) -> BTreeSet<JobKey>;
}

#[async_trait]
pub trait MutableTaskStore: TaskStore {
    /// Insert or replace tasks. A batch naming the same task id twice is
    /// rejected before anything is written.
    async fn save_tasks(&self, tasks: Vec<ScheduledTask>) -> Result<(), StorageError>;

    async fn delete_all_tasks(&self);

    /// Returns the number of tasks removed.
    async fn delete_tasks(&self, task_ids: &[TaskId]) -> usize;

    /// Apply `mutation` to the stored task. `Ok(None)` if no such task.
    async fn mutate_task(
        &self,
        task_id: &TaskId,
        mutation: TaskMutation,
    ) -> Result<Option<ScheduledTask>, StorageError>;

    /// Replace the config of a stored task without recording an event.
    /// Returns whether the task existed.
    async fn unsafe_modify_in_place(&self, task_id: &TaskId, config: TaskConfig) -> bool;
}
