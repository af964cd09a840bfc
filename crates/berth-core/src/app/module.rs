//! Stores modules - ストア群を登録表へ組み込む単位
//!
//! # Fail-fast 設計
//! - 必要な協力者（KeyFactory）が欠けていれば構築時にエラー
//! - configure() は各ストアを一度だけ生成し、主キーと代替キーの両方に同じ Arc を登録

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::app::builder::BuildError;
use crate::app::registry::{RegistryError, StoreRegistry};
use crate::impls::mem_task_store::DEFAULT_SLOW_QUERY_THRESHOLD;
use crate::impls::{MemJobStore, MemTaskStore};
use crate::ports::{Capability, KeyFactory, MutableCronJobStore, MutableTaskStore, StoreKey};

/// A unit of wiring that contributes bindings to a registry.
pub trait StoresModule: Send + Sync {
    fn name(&self) -> &'static str;

    fn configure(&self, registry: &mut StoreRegistry) -> Result<(), RegistryError>;
}

/// Binds the in-memory cron job and task stores.
pub struct InMemStoresModule {
    key_factory: Arc<dyn KeyFactory>,
    slow_query_threshold: Duration,
}

impl InMemStoresModule {
    pub fn new(key_factory: Arc<dyn KeyFactory>) -> Self {
        Self {
            key_factory,
            slow_query_threshold: DEFAULT_SLOW_QUERY_THRESHOLD,
        }
    }

    pub fn builder() -> InMemStoresModuleBuilder {
        InMemStoresModuleBuilder::default()
    }

    /// Keys a store of `capability` is bound under: primary first.
    fn keys_for(&self, capability: Capability) -> [StoreKey; 2] {
        [
            StoreKey::primary(capability),
            self.key_factory.create(capability),
        ]
    }
}

impl StoresModule for InMemStoresModule {
    fn name(&self) -> &'static str {
        "in_mem_stores"
    }

    fn configure(&self, registry: &mut StoreRegistry) -> Result<(), RegistryError> {
        let jobs: Arc<dyn MutableCronJobStore> = Arc::new(MemJobStore::new());
        for key in self.keys_for(Capability::CronJobStore) {
            registry.bind_cron_job_store(key, "MemJobStore", Arc::clone(&jobs))?;
        }

        let tasks: Arc<dyn MutableTaskStore> = Arc::new(MemTaskStore::with_slow_query_threshold(
            self.slow_query_threshold,
        ));
        for key in self.keys_for(Capability::TaskStore) {
            registry.bind_task_store(key, "MemTaskStore", Arc::clone(&tasks))?;
        }

        info!(module = self.name(), bindings = registry.len(), "configured stores");
        Ok(())
    }
}

/// Builder for [`InMemStoresModule`]. `build()` fails if no key factory was given.
#[derive(Default)]
pub struct InMemStoresModuleBuilder {
    key_factory: Option<Arc<dyn KeyFactory>>,
    slow_query_threshold: Option<Duration>,
}

impl InMemStoresModuleBuilder {
    pub fn key_factory(mut self, key_factory: Arc<dyn KeyFactory>) -> Self {
        self.key_factory = Some(key_factory);
        self
    }

    pub fn slow_query_threshold(mut self, threshold: Duration) -> Self {
        self.slow_query_threshold = Some(threshold);
        self
    }

    pub fn build(self) -> Result<InMemStoresModule, BuildError> {
        let key_factory = self.key_factory.ok_or(BuildError::MissingKeyFactory)?;
        let mut module = InMemStoresModule::new(key_factory);
        if let Some(threshold) = self.slow_query_threshold {
            module.slow_query_threshold = threshold;
        }
        Ok(module)
    }
}
