//! CronJobStore port - cron ジョブ設定の保存先
//!
//! 読み取り専用の `CronJobStore` と、書き込みを加えた `MutableCronJobStore` に分かれる。
//!
//! # 実装
//! - **MemJobStore**: インメモリ実装（impls::mem_job_store）

use async_trait::async_trait;

use crate::domain::{JobConfiguration, JobKey, StorageError};

/// Read side of the cron job store.
#[async_trait]
pub trait CronJobStore: Send + Sync {
    /// All stored cron jobs, ordered by key.
    async fn fetch_jobs(&self) -> Vec<JobConfiguration>;

    async fn fetch_job(&self, key: &JobKey) -> Option<JobConfiguration>;
}

#[async_trait]
pub trait MutableCronJobStore: CronJobStore {
    /// Insert or replace the job stored under `job.key`.
    async fn save_accepted_job(&self, job: JobConfiguration) -> Result<(), StorageError>;

    /// Returns whether a job was removed.
    async fn remove_job(&self, key: &JobKey) -> bool;

    async fn delete_jobs(&self);
}
