//! Domain model: job keys, tasks, statuses, queries and their errors.

pub mod errors;
pub mod ids;
pub mod job;
pub mod query;
pub mod status;
pub mod task;

pub use errors::StorageError;
pub use ids::TaskId;
pub use job::{CronCollisionPolicy, JobConfiguration, JobKey};
pub use query::TaskQuery;
pub use status::ScheduleStatus;
pub use task::{AssignedTask, Resources, ScheduledTask, TaskConfig, TaskEvent};
