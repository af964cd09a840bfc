//! StorageBuilder - ストア群の構築とワイヤリング
//!
//! # Fail-fast 設計
//! - install() でモジュールを登録
//! - expect_bindings() で必要なキーを宣言
//! - build() 時に全モジュールを configure し、「期待集合 ⊆ 登録済み集合」をチェック

use std::sync::Arc;

use tracing::info;

use crate::app::module::StoresModule;
use crate::app::registry::{Registration, RegistryError, StoreRegistry};
use crate::ports::{Capability, MutableCronJobStore, MutableTaskStore, StoreKey};

/// Errors raised while assembling stores.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum BuildError {
    #[error("a key factory is required to build the stores module")]
    MissingKeyFactory,

    #[error("missing bindings: {0:?}. These keys were expected but not bound.")]
    MissingBindings(Vec<StoreKey>),

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// # 使用例
/// ```ignore
/// let storage = StorageBuilder::new()
///     .install(InMemStoresModule::new(Arc::new(PlainKeyFactory)))
///     .expect_bindings(Storage::primary_keys())
///     .build()?;
/// let tasks = storage.task_store()?;
/// ```
#[derive(Default)]
pub struct StorageBuilder {
    modules: Vec<Box<dyn StoresModule>>,
    expected: Vec<StoreKey>,
}

impl StorageBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn install(mut self, module: impl StoresModule + 'static) -> Self {
        self.modules.push(Box::new(module));
        self
    }

    pub fn expect_bindings(mut self, keys: impl IntoIterator<Item = StoreKey>) -> Self {
        self.expected.extend(keys);
        self
    }

    pub fn build(self) -> Result<Storage, BuildError> {
        let mut registry = StoreRegistry::new();
        for module in &self.modules {
            module.configure(&mut registry)?;
        }

        let missing: Vec<StoreKey> = self
            .expected
            .into_iter()
            .filter(|key| !registry.contains(key))
            .collect();
        if !missing.is_empty() {
            return Err(BuildError::MissingBindings(missing));
        }

        info!(
            modules = self.modules.len(),
            bindings = registry.len(),
            "storage ready"
        );
        Ok(Storage { registry })
    }
}

/// Assembled stores. Cheap to share behind an `Arc`; every accessor hands out
/// a clone of the one bound instance.
pub struct Storage {
    registry: StoreRegistry,
}

impl Storage {
    /// Primary keys of every capability.
    pub fn primary_keys() -> [StoreKey; 2] {
        [
            StoreKey::primary(Capability::CronJobStore),
            StoreKey::primary(Capability::TaskStore),
        ]
    }

    pub fn cron_job_store(&self) -> Result<Arc<dyn MutableCronJobStore>, RegistryError> {
        self.registry
            .cron_job_store(&StoreKey::primary(Capability::CronJobStore))
    }

    pub fn task_store(&self) -> Result<Arc<dyn MutableTaskStore>, RegistryError> {
        self.registry
            .task_store(&StoreKey::primary(Capability::TaskStore))
    }

    pub fn registry(&self) -> &StoreRegistry {
        &self.registry
    }

    pub fn registrations(&self) -> Vec<&Registration> {
        self.registry.registrations()
    }
}
