// Copyright (c) 2026 cogmesh contributors
// SPDX-License-Identifier: AGPL-3.0

//! Tenant → [`AtomStore`] registry.
//!
//! Constructed once at the composition root and shared as
//! `Arc<AtomStoreRegistry>`. Stores are created lazily on first reference and
//! live until removed.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

use crate::config::AtomStoreConfig;
use crate::domain::tenant::TenantId;
use crate::infrastructure::atom_store::AtomStore;

#[derive(Debug, Default)]
pub struct AtomStoreRegistry {
    config: AtomStoreConfig,
    stores: Mutex<HashMap<TenantId, Arc<AtomStore>>>,
}

impl AtomStoreRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry whose stores are all created with `config`.
    pub fn with_config(config: AtomStoreConfig) -> Self {
        Self {
            config,
            stores: Mutex::new(HashMap::new()),
        }
    }

    pub fn get_or_create(&self, tenant_id: &TenantId) -> Arc<AtomStore> {
        let mut stores = self.stores.lock();
        if let Some(store) = stores.get(tenant_id) {
            return Arc::clone(store);
        }

        let store = Arc::new(AtomStore::with_config(tenant_id.clone(), self.config.clone()));
        stores.insert(tenant_id.clone(), Arc::clone(&store));
        info!(tenant = %tenant_id, "Created atom store");
        store
    }

    pub fn get(&self, tenant_id: &TenantId) -> Option<Arc<AtomStore>> {
        self.stores.lock().get(tenant_id).cloned()
    }

    /// Drop the registry's handle to a tenant's store. Agents still holding the
    /// store keep it alive until they are dropped.
    pub fn remove(&self, tenant_id: &TenantId) -> bool {
        let removed = self.stores.lock().remove(tenant_id).is_some();
        if removed {
            info!(tenant = %tenant_id, "Removed atom store");
        }
        removed
    }

    pub fn tenant_ids(&self) -> Vec<TenantId> {
        self.stores.lock().keys().cloned().collect()
    }

    pub fn count(&self) -> usize {
        self.stores.lock().len()
    }
}
