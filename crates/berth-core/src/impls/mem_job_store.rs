//! MemJobStore - インメモリの cron ジョブストア

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use crate::domain::{JobConfiguration, JobKey, StorageError};
use crate::ports::{CronJobStore, MutableCronJobStore};

/// Cron jobs keyed by job key. The map is ordered so `fetch_jobs` is stable.
#[derive(Default)]
pub struct MemJobStore {
    jobs: RwLock<BTreeMap<JobKey, JobConfiguration>>,
}

impl MemJobStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CronJobStore for MemJobStore {
    async fn fetch_jobs(&self) -> Vec<JobConfiguration> {
        self.jobs.read().await.values().cloned().collect()
    }

    async fn fetch_job(&self, key: &JobKey) -> Option<JobConfiguration> {
        self.jobs.read().await.get(key).cloned()
    }
}

#[async_trait]
impl MutableCronJobStore for MemJobStore {
    async fn save_accepted_job(&self, job: JobConfiguration) -> Result<(), StorageError> {
        job.validate_cron()?;
        let key = job.key.clone();
        let replaced = self.jobs.write().await.insert(key.clone(), job).is_some();
        debug!(job = %key, replaced, "saved cron job");
        Ok(())
    }

    async fn remove_job(&self, key: &JobKey) -> bool {
        let removed = self.jobs.write().await.remove(key).is_some();
        debug!(job = %key, removed, "removed cron job");
        removed
    }

    async fn delete_jobs(&self) {
        let mut jobs = self.jobs.write().await;
        debug!(count = jobs.len(), "deleting all cron jobs");
        jobs.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::CronCollisionPolicy;
    use crate::domain::task::test_support::task_config;

    fn cron_job(name: &str) -> JobConfiguration {
        let key = JobKey::new("ops", "prod", name).unwrap();
        JobConfiguration {
            task_config: task_config(&key),
            key,
            owner: "ops".to_string(),
            cron_schedule: Some("0 3 * * *".to_string()),
            cron_collision_policy: CronCollisionPolicy::KillExisting,
            instance_count: 1,
        }
    }

    #[tokio::test]
    async fn save_and_fetch() {
        let store = MemJobStore::new();
        let job = cron_job("backup");

        store.save_accepted_job(job.clone()).await.unwrap();

        assert_eq!(store.fetch_job(&job.key).await, Some(job.clone()));
        assert_eq!(store.fetch_jobs().await, vec![job]);
    }

    #[tokio::test]
    async fn save_replaces_existing_job() {
        let store = MemJobStore::new();
        let mut job = cron_job("backup");
        store.save_accepted_job(job.clone()).await.unwrap();

        job.cron_schedule = Some("@hourly".to_string());
        job.cron_collision_policy = CronCollisionPolicy::CancelNew;
        store.save_accepted_job(job.clone()).await.unwrap();

        let jobs = store.fetch_jobs().await;
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].cron_schedule.as_deref(), Some("@hourly"));
        assert_eq!(jobs[0].cron_collision_policy, CronCollisionPolicy::CancelNew);
    }

    #[tokio::test]
    async fn rejects_job_without_schedule() {
        let store = MemJobStore::new();
        let mut job = cron_job("backup");
        job.cron_schedule = None;

        let result = store.save_accepted_job(job.clone()).await;

        assert_eq!(result, Err(StorageError::NotACronJob(job.key.clone())));
        assert!(store.fetch_jobs().await.is_empty());
    }

    #[tokio::test]
    async fn fetch_jobs_is_ordered_by_key() {
        let store = MemJobStore::new();
        for name in ["zeta", "alpha", "mid"] {
            store.save_accepted_job(cron_job(name)).await.unwrap();
        }

        let names: Vec<String> = store
            .fetch_jobs()
            .await
            .into_iter()
            .map(|j| j.key.name().to_string())
            .collect();
        assert_eq!(names, vec!["alpha", "mid", "zeta"]);
    }

    #[tokio::test]
    async fn remove_and_delete() {
        let store = MemJobStore::new();
        let a = cron_job("a");
        let b = cron_job("b");
        store.save_accepted_job(a.clone()).await.unwrap();
        store.save_accepted_job(b.clone()).await.unwrap();

        assert!(store.remove_job(&a.key).await);
        assert!(!store.remove_job(&a.key).await);
        assert_eq!(store.fetch_job(&a.key).await, None);

        store.delete_jobs().await;
        assert!(store.fetch_jobs().await.is_empty());
    }
}
