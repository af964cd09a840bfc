//! In-memory task store.
//!
//! Design:
//! - `tasks` is the single source of truth.
//! - `by_job` and `by_host` are secondary indices holding TaskIds only.
//! - Invariant: every stored task appears in exactly the index entries its
//!   job key and slave host name, and indices hold no empty sets.

use std::collections::hash_map::Entry;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::hash::Hash;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::domain::{JobKey, ScheduledTask, StorageError, TaskConfig, TaskId, TaskQuery};
use crate::ports::{MutableTaskStore, TaskMutation, TaskStore};

pub const DEFAULT_SLOW_QUERY_THRESHOLD: Duration = Duration::from_millis(25);

fn index_insert<K: Eq + Hash>(index: &mut HashMap<K, HashSet<TaskId>>, key: K, id: &TaskId) {
    index.entry(key).or_default().insert(id.clone());
}

fn index_remove<K: Eq + Hash>(index: &mut HashMap<K, HashSet<TaskId>>, key: K, id: &TaskId) {
    if let Entry::Occupied(mut e) = index.entry(key) {
        e.get_mut().remove(id);
        if e.get().is_empty() {
            e.remove_entry();
        }
    }
}

#[derive(Default)]
struct MemTaskStoreState {
    tasks: HashMap<TaskId, ScheduledTask>,
    by_job: HashMap<JobKey, HashSet<TaskId>>,
    by_host: HashMap<String, HashSet<TaskId>>,
}

impl MemTaskStoreState {
    fn index(&mut self, task: &ScheduledTask) {
        index_insert(&mut self.by_job, task.job_key().clone(), task.task_id());
        if let Some(host) = task.slave_host() {
            index_insert(&mut self.by_host, host.to_string(), task.task_id());
        }
    }

    fn unindex(&mut self, task: &ScheduledTask) {
        index_remove(&mut self.by_job, task.job_key().clone(), task.task_id());
        if let Some(host) = task.slave_host() {
            index_remove(&mut self.by_host, host.to_string(), task.task_id());
        }
    }

    /// Store `task`, replacing any task with the same id.
    fn put(&mut self, task: ScheduledTask) {
        if let Some(previous) = self.tasks.remove(task.task_id()) {
            self.unindex(&previous);
        }
        self.index(&task);
        self.tasks.insert(task.task_id().clone(), task);
    }

    fn remove(&mut self, task_id: &TaskId) -> Option<ScheduledTask> {
        let task = self.tasks.remove(task_id)?;
        self.unindex(&task);
        Some(task)
    }

    fn lookup<'a, 'b>(
        &'a self,
        ids: impl IntoIterator<Item = &'b TaskId>,
    ) -> Vec<&'a ScheduledTask> {
        ids.into_iter().filter_map(|id| self.tasks.get(id)).collect()
    }

    /// Tasks that may match `query`, taken from the narrowest index available.
    fn candidates(&self, query: &TaskQuery) -> Vec<&ScheduledTask> {
        if let Some(ids) = query.task_ids() {
            return self.lookup(ids);
        }
        if let Some(job) = query.job_key() {
            return self
                .by_job
                .get(&job)
                .map(|ids| self.lookup(ids))
                .unwrap_or_default();
        }
        if let Some(hosts) = query.slave_hosts() {
            return hosts
                .iter()
                .filter_map(|host| self.by_host.get(host))
                .flat_map(|ids| self.lookup(ids))
                .collect();
        }
        self.tasks.values().collect()
    }

    fn query(&self, query: &TaskQuery) -> Vec<ScheduledTask> {
        let mut matched: Vec<ScheduledTask> = self
            .candidates(query)
            .into_iter()
            .filter(|task| query.matches(task))
            .cloned()
            .collect();
        matched.sort_by(|a, b| a.task_id().cmp(b.task_id()));
        matched
    }
}

/// In-memory task store with job and host indices.
pub struct MemTaskStore {
    state: RwLock<MemTaskStoreState>,
    slow_query_threshold: Duration,
}

impl MemTaskStore {
    pub fn new() -> Self {
        Self::with_slow_query_threshold(DEFAULT_SLOW_QUERY_THRESHOLD)
    }

    /// Queries slower than `threshold` are logged.
    pub fn with_slow_query_threshold(threshold: Duration) -> Self {
        Self {
            state: RwLock::new(MemTaskStoreState::default()),
            slow_query_threshold: threshold,
        }
    }

    pub async fn len(&self) -> usize {
        self.state.read().await.tasks.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl Default for MemTaskStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TaskStore for MemTaskStore {
    async fn fetch_task(&self, task_id: &TaskId) -> Option<ScheduledTask> {
        self.state.read().await.tasks.get(task_id).cloned()
    }

    async fn fetch_tasks(&self, query: &TaskQuery) -> Vec<ScheduledTask> {
        let started = Instant::now();
        let result = self.state.read().await.query(query);
        let elapsed = started.elapsed();
        if elapsed > self.slow_query_threshold {
            warn!(
                ?query,
                elapsed_ms = elapsed.as_millis() as u64,
                matched = result.len(),
                "slow task query"
            );
        }
        result
    }

    async fn job_keys(&self) -> BTreeSet<JobKey> {
        self.state.read().await.by_job.keys().cloned().collect()
    }
}

#[async_trait]
impl MutableTaskStore for MemTaskStore {
    async fn save_tasks(&self, tasks: Vec<ScheduledTask>) -> Result<(), StorageError> {
        let mut seen = HashSet::with_capacity(tasks.len());
        for task in &tasks {
            if !seen.insert(task.task_id()) {
                return Err(StorageError::DuplicateTaskId(task.task_id().clone()));
            }
        }

        let count = tasks.len();
        let mut state = self.state.write().await;
        for task in tasks {
            state.put(task);
        }
        debug!(count, total = state.tasks.len(), "saved tasks");
        Ok(())
    }

    async fn delete_all_tasks(&self) {
        let mut state = self.state.write().await;
        debug!(count = state.tasks.len(), "deleting all tasks");
        *state = MemTaskStoreState::default();
    }

    async fn delete_tasks(&self, task_ids: &[TaskId]) -> usize {
        let mut state = self.state.write().await;
        let removed = task_ids
            .iter()
            .filter(|id| state.remove(id).is_some())
            .count();
        debug!(requested = task_ids.len(), removed, "deleted tasks");
        removed
    }

    async fn mutate_task(
        &self,
        task_id: &TaskId,
        mutation: TaskMutation,
    ) -> Result<Option<ScheduledTask>, StorageError> {
        let mut state = self.state.write().await;
        let Some(current) = state.tasks.get(task_id) else {
            return Ok(None);
        };

        let mutated = mutation(current);
        if mutated.task_id() != task_id {
            return Err(StorageError::TaskIdChanged {
                from: task_id.clone(),
                to: mutated.task_id().clone(),
            });
        }

        debug!(task = %task_id, status = %mutated.status, "mutated task");
        state.put(mutated.clone());
        Ok(Some(mutated))
    }

    async fn unsafe_modify_in_place(&self, task_id: &TaskId, config: TaskConfig) -> bool {
        let mut state = self.state.write().await;
        let Some(mut task) = state.tasks.get(task_id).cloned() else {
            return false;
        };
        task.assigned_task.task = config;
        state.put(task);
        debug!(task = %task_id, "replaced task config in place");
        true
    }
}
