//! StoreRegistry - ストアの登録表
//!
//! - `StoreKey` → `Registration`（実装名 + 型付きのストア）
//! - 型付きアクセサで取り出すので、能力の取り違えはキー単位で検出される
//! - Arc による共有所有権（同じキーは常に同じインスタンス）

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::ports::{Capability, MutableCronJobStore, MutableTaskStore, StoreKey};

/// A store instance, tagged with the capability it provides.
#[derive(Clone)]
pub enum BoundStore {
    CronJobs(Arc<dyn MutableCronJobStore>),
    Tasks(Arc<dyn MutableTaskStore>),
}

impl BoundStore {
    pub fn capability(&self) -> Capability {
        match self {
            BoundStore::CronJobs(_) => Capability::CronJobStore,
            BoundStore::Tasks(_) => Capability::TaskStore,
        }
    }

    fn same_instance(&self, other: &BoundStore) -> bool {
        match (self, other) {
            (BoundStore::CronJobs(a), BoundStore::CronJobs(b)) => Arc::ptr_eq(a, b),
            (BoundStore::Tasks(a), BoundStore::Tasks(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for BoundStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BoundStore({})", self.capability())
    }
}

#[derive(Debug, Clone)]
pub struct Registration {
    pub key: StoreKey,
    /// Name of the concrete type, for listings.
    pub implementation: &'static str,
    pub store: BoundStore,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("key '{key}' is already bound to {existing}")]
    AlreadyBound {
        key: StoreKey,
        existing: &'static str,
    },

    #[error("key '{key}' cannot hold a {provided} binding")]
    CapabilityMismatch { key: StoreKey, provided: Capability },

    #[error("nothing is bound to key '{0}'")]
    NotBound(StoreKey),
}

/// Registration table from keys to store instances.
///
/// Built during initialization (mutable), then only read.
#[derive(Default)]
pub struct StoreRegistry {
    bindings: HashMap<StoreKey, Registration>,
}

impl StoreRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `store` under `key`.
    ///
    /// Binding the identical instance to a key twice is a no-op; binding a
    /// different instance to an occupied key is an error.
    pub fn bind(
        &mut self,
        key: StoreKey,
        implementation: &'static str,
        store: BoundStore,
    ) -> Result<(), RegistryError> {
        if key.capability() != store.capability() {
            return Err(RegistryError::CapabilityMismatch {
                key,
                provided: store.capability(),
            });
        }
        if let Some(existing) = self.bindings.get(&key) {
            if existing.store.same_instance(&store) {
                debug!(%key, implementation, "identical binding already present");
                return Ok(());
            }
            return Err(RegistryError::AlreadyBound {
                key,
                existing: existing.implementation,
            });
        }

        debug!(%key, implementation, "bound store");
        self.bindings.insert(
            key.clone(),
            Registration {
                key,
                implementation,
                store,
            },
        );
        Ok(())
    }

    pub fn bind_cron_job_store(
        &mut self,
        key: StoreKey,
        implementation: &'static str,
        store: Arc<dyn MutableCronJobStore>,
    ) -> Result<(), RegistryError> {
        self.bind(key, implementation, BoundStore::CronJobs(store))
    }

    pub fn bind_task_store(
        &mut self,
        key: StoreKey,
        implementation: &'static str,
        store: Arc<dyn MutableTaskStore>,
    ) -> Result<(), RegistryError> {
        self.bind(key, implementation, BoundStore::Tasks(store))
    }

    pub fn get(&self, key: &StoreKey) -> Option<&Registration> {
        self.bindings.get(key)
    }

    pub fn contains(&self, key: &StoreKey) -> bool {
        self.bindings.contains_key(key)
    }

    pub fn cron_job_store(
        &self,
        key: &StoreKey,
    ) -> Result<Arc<dyn MutableCronJobStore>, RegistryError> {
        match self.resolve(key, Capability::CronJobStore)? {
            BoundStore::CronJobs(store) => Ok(Arc::clone(store)),
            BoundStore::Tasks(_) => Err(RegistryError::CapabilityMismatch {
                key: key.clone(),
                provided: Capability::TaskStore,
            }),
        }
    }

    pub fn task_store(&self, key: &StoreKey) -> Result<Arc<dyn MutableTaskStore>, RegistryError> {
        match self.resolve(key, Capability::TaskStore)? {
            BoundStore::Tasks(store) => Ok(Arc::clone(store)),
            BoundStore::CronJobs(_) => Err(RegistryError::CapabilityMismatch {
                key: key.clone(),
                provided: Capability::CronJobStore,
            }),
        }
    }

    fn resolve(&self, key: &StoreKey, wanted: Capability) -> Result<&BoundStore, RegistryError> {
        if key.capability() != wanted {
            return Err(RegistryError::CapabilityMismatch {
                key: key.clone(),
                provided: wanted,
            });
        }
        self.bindings
            .get(key)
            .map(|registration| &registration.store)
            .ok_or_else(|| RegistryError::NotBound(key.clone()))
    }

    /// All registrations, ordered by key.
    pub fn registrations(&self) -> Vec<&Registration> {
        let mut registrations: Vec<&Registration> = self.bindings.values().collect();
        registrations.sort_by(|a, b| a.key.cmp(&b.key));
        registrations
    }

    pub fn registered_keys(&self) -> Vec<StoreKey> {
        self.registrations()
            .into_iter()
            .map(|registration| registration.key.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}
