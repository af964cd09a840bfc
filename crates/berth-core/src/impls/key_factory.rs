//! KeyFactory implementations.

use crate::ports::{Capability, KeyFactory, StoreKey};

/// The alternate key is the primary key itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainKeyFactory;

impl KeyFactory for PlainKeyFactory {
    fn create(&self, capability: Capability) -> StoreKey {
        StoreKey::primary(capability)
    }
}

/// Qualifies every capability with the same name, e.g. `task_store@in_mem`.
#[derive(Debug, Clone)]
pub struct QualifiedKeyFactory {
    qualifier: String,
}

impl QualifiedKeyFactory {
    pub fn new(qualifier: impl Into<String>) -> Self {
        Self {
            qualifier: qualifier.into(),
        }
    }
}

impl KeyFactory for QualifiedKeyFactory {
    fn create(&self, capability: Capability) -> StoreKey {
        StoreKey::qualified(capability, self.qualifier.clone())
    }
}
