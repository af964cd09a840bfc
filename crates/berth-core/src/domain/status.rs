//! Schedule status of a task and the status sets used to query by lifecycle.
//!
//! State transitions (happy path):
//! - Init -> Pending -> Assigned -> Starting -> Running -> Finished
//!
//! Other transitions pass through Throttled, Preempting, Restarting,
//! Draining and Killing, and end in Failed, Killed or Lost.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::errors::StorageError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScheduleStatus {
    Init,
    Throttled,
    Pending,
    Assigned,
    Starting,
    Running,
    Finished,
    Preempting,
    Restarting,
    Draining,
    Failed,
    Killed,
    Killing,
    Lost,
}

impl ScheduleStatus {
    pub const ALL: [ScheduleStatus; 14] = [
        ScheduleStatus::Init,
        ScheduleStatus::Throttled,
        ScheduleStatus::Pending,
        ScheduleStatus::Assigned,
        ScheduleStatus::Starting,
        ScheduleStatus::Running,
        ScheduleStatus::Finished,
        ScheduleStatus::Preempting,
        ScheduleStatus::Restarting,
        ScheduleStatus::Draining,
        ScheduleStatus::Failed,
        ScheduleStatus::Killed,
        ScheduleStatus::Killing,
        ScheduleStatus::Lost,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ScheduleStatus::Init => "INIT",
            ScheduleStatus::Throttled => "THROTTLED",
            ScheduleStatus::Pending => "PENDING",
            ScheduleStatus::Assigned => "ASSIGNED",
            ScheduleStatus::Starting => "STARTING",
            ScheduleStatus::Running => "RUNNING",
            ScheduleStatus::Finished => "FINISHED",
            ScheduleStatus::Preempting => "PREEMPTING",
            ScheduleStatus::Restarting => "RESTARTING",
            ScheduleStatus::Draining => "DRAINING",
            ScheduleStatus::Failed => "FAILED",
            ScheduleStatus::Killed => "KILLED",
            ScheduleStatus::Killing => "KILLING",
            ScheduleStatus::Lost => "LOST",
        }
    }

    /// No further transitions.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            ScheduleStatus::Finished
                | ScheduleStatus::Failed
                | ScheduleStatus::Killed
                | ScheduleStatus::Lost
        )
    }

    /// Known to the scheduler and not yet terminal.
    pub fn is_active(self) -> bool {
        !self.is_terminal() && self != ScheduleStatus::Init
    }

    /// Occupying resources on a machine.
    pub fn is_live(self) -> bool {
        matches!(
            self,
            ScheduleStatus::Starting
                | ScheduleStatus::Running
                | ScheduleStatus::Preempting
                | ScheduleStatus::Restarting
                | ScheduleStatus::Draining
                | ScheduleStatus::Killing
        )
    }

    pub fn terminal_states() -> BTreeSet<ScheduleStatus> {
        Self::ALL.into_iter().filter(|s| s.is_terminal()).collect()
    }

    pub fn active_states() -> BTreeSet<ScheduleStatus> {
        Self::ALL.into_iter().filter(|s| s.is_active()).collect()
    }

    pub fn live_states() -> BTreeSet<ScheduleStatus> {
        Self::ALL.into_iter().filter(|s| s.is_live()).collect()
    }
}

impl fmt::Display for ScheduleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScheduleStatus {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| StorageError::UnknownStatus {
                name: s.to_string(),
                valid: Self::ALL
                    .iter()
                    .map(|status| status.as_str())
                    .collect::<Vec<_>>()
                    .join(", "),
            })
    }
}
