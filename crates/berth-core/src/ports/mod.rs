//! Ports - 抽象化レイヤー
//!
//! ストア・時刻・ID 生成・外部コマンドへのインターフェースを定義し、
//! 実装の詳細は impls に置く。

pub mod clock;
pub mod command_runner;
pub mod cron_job_store;
pub mod id_generator;
pub mod key_factory;
pub mod task_store;

pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::command_runner::{CommandError, CommandRunner};
pub use self::cron_job_store::{CronJobStore, MutableCronJobStore};
pub use self::id_generator::{IdGenerator, UlidGenerator};
pub use self::key_factory::{Capability, KeyFactory, StoreKey};
pub use self::task_store::{MutableTaskStore, TaskMutation, TaskStore};
