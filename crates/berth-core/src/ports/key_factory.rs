//! KeyFactory port - 代替キーの生成
//!
//! ストアは能力（Capability）ごとの主キーに加えて、KeyFactory が作る代替キーでも登録される。

use std::fmt;

use serde::{Deserialize, Serialize};

/// A kind of store the registration table can hand out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// `MutableCronJobStore`
    CronJobStore,
    /// `MutableTaskStore`
    TaskStore,
}

impl Capability {
    pub fn as_str(self) -> &'static str {
        match self {
            Capability::CronJobStore => "cron_job_store",
            Capability::TaskStore => "task_store",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lookup key in the registration table.
///
/// The primary key of a capability has no qualifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StoreKey {
    capability: Capability,
    qualifier: Option<String>,
}

impl StoreKey {
    pub fn primary(capability: Capability) -> Self {
        Self {
            capability,
            qualifier: None,
        }
    }

    pub fn qualified(capability: Capability, qualifier: impl Into<String>) -> Self {
        Self {
            capability,
            qualifier: Some(qualifier.into()),
        }
    }

    pub fn capability(&self) -> Capability {
        self.capability
    }

    pub fn qualifier(&self) -> Option<&str> {
        self.qualifier.as_deref()
    }
}

impl fmt::Display for StoreKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.qualifier {
            Some(q) => write!(f, "{}@{}", self.capability, q),
            None => write!(f, "{}", self.capability),
        }
    }
}

/// KeyFactory は capability から代替キーを導出する
pub trait KeyFactory: Send + Sync {
    fn create(&self, capability: Capability) -> StoreKey;
}
