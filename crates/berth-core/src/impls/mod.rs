//! Impls - ports の実装
//!
//! - **MemJobStore** / **MemTaskStore**: インメモリのストア
//! - **PlainKeyFactory** / **QualifiedKeyFactory**: 代替キーの生成
//! - **SystemCommandRunner**: 実プロセスを起動する CommandRunner

pub mod key_factory;
pub mod mem_job_store;
pub mod mem_task_store;
pub mod system_runner;

pub use self::key_factory::{PlainKeyFactory, QualifiedKeyFactory};
pub use self::mem_job_store::MemJobStore;
pub use self::mem_task_store::MemTaskStore;
pub use self::system_runner::SystemCommandRunner;
