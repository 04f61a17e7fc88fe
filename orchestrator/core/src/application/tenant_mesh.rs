// Copyright (c) 2026 cogmesh contributors
// SPDX-License-Identifier: AGPL-3.0
//! Tenant Mesh - Application Layer
//!
//! Pairs each tenant with one sandbox from the injected [`SandboxProvider`]
//! and with its `AtomStore` from the shared registry. Removing a tenant
//! disposes its sandbox but leaves the store registered, so agents holding
//! the store keep working.
//!
//! Sandbox disposal is async, so [`TenantMesh::shutdown`] must be awaited
//! before the mesh is dropped. Dropping a mesh that still holds tenants only
//! logs the leak.

use cogmesh_atomspace::{AtomStore, AtomStoreRegistry, TenantId};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use crate::application::orchestrator::Orchestrator;
use crate::domain::sandbox::{Sandbox, SandboxConfig, SandboxError, SandboxProvider};

/// Everything the mesh holds for one tenant.
pub struct TenantEnvironment {
    tenant_id: TenantId,
    config: SandboxConfig,
    sandbox: Box<dyn Sandbox>,
    atomspace: Arc<AtomStore>,
}

impl TenantEnvironment {
    pub fn tenant_id(&self) -> &TenantId {
        &self.tenant_id
    }

    pub fn config(&self) -> &SandboxConfig {
        &self.config
    }

    pub fn sandbox(&self) -> &dyn Sandbox {
        self.sandbox.as_ref()
    }

    pub fn atomspace(&self) -> &Arc<AtomStore> {
        &self.atomspace
    }
}

impl std::fmt::Debug for TenantEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TenantEnvironment")
            .field("tenant_id", &self.tenant_id)
            .field("config", &self.config)
            .field("atoms", &self.atomspace.size())
            .finish()
    }
}

pub struct TenantMesh {
    provider: Arc<dyn SandboxProvider>,
    registry: Arc<AtomStoreRegistry>,
    // Async lock: sandbox creation is awaited while the slot is reserved.
    tenants: Mutex<BTreeMap<TenantId, Arc<TenantEnvironment>>>,
    orchestrator: RwLock<Option<Arc<Orchestrator>>>,
}

impl TenantMesh {
    pub fn new(provider: Arc<dyn SandboxProvider>, registry: Arc<AtomStoreRegistry>) -> Self {
        Self {
            provider,
            registry,
            tenants: Mutex::new(BTreeMap::new()),
            orchestrator: RwLock::new(None),
        }
    }

    /// Create the tenant's sandbox and resolve its store. An existing
    /// environment is returned as is, ignoring `config`.
    pub async fn create_tenant(
        &self,
        tenant_id: &TenantId,
        config: SandboxConfig,
    ) -> Result<Arc<TenantEnvironment>, SandboxError> {
        let mut tenants = self.tenants.lock().await;
        if let Some(existing) = tenants.get(tenant_id) {
            return Ok(Arc::clone(existing));
        }

        let sandbox = self.provider.create(tenant_id, &config).await?;
        let environment = Arc::new(TenantEnvironment {
            tenant_id: tenant_id.clone(),
            config,
            sandbox,
            atomspace: self.registry.get_or_create(tenant_id),
        });
        tenants.insert(tenant_id.clone(), Arc::clone(&environment));

        info!(tenant = %tenant_id, "Created tenant environment");
        Ok(environment)
    }

    pub async fn get_tenant(&self, tenant_id: &TenantId) -> Option<Arc<TenantEnvironment>> {
        self.tenants.lock().await.get(tenant_id).cloned()
    }

    /// Dispose the tenant's sandbox. Returns `Ok(false)` if the tenant was
    /// unknown. The environment is removed even when disposal fails.
    pub async fn remove_tenant(&self, tenant_id: &TenantId) -> Result<bool, SandboxError> {
        let Some(environment) = self.tenants.lock().await.remove(tenant_id) else {
            return Ok(false);
        };

        environment.sandbox.dispose().await?;
        info!(tenant = %tenant_id, "Removed tenant environment");
        Ok(true)
    }

    pub async fn tenant_ids(&self) -> Vec<TenantId> {
        self.tenants.lock().await.keys().cloned().collect()
    }

    pub async fn tenant_count(&self) -> usize {
        self.tenants.lock().await.len()
    }

    pub fn set_orchestrator(&self, orchestrator: Arc<Orchestrator>) {
        *self.orchestrator.write() = Some(orchestrator);
    }

    pub fn orchestrator(&self) -> Option<Arc<Orchestrator>> {
        self.orchestrator.read().clone()
    }

    /// Dispose every remaining sandbox. Failures are logged and do not stop
    /// the remaining disposals.
    pub async fn shutdown(&self) {
        let environments = std::mem::take(&mut *self.tenants.lock().await);
        for (tenant_id, environment) in environments {
            if let Err(e) = environment.sandbox.dispose().await {
                error!(tenant = %tenant_id, "Sandbox disposal failed: {}", e);
            }
        }
        info!("Tenant mesh shut down");
    }
}

impl Drop for TenantMesh {
    fn drop(&mut self) {
        let remaining = self.tenants.get_mut().len();
        if remaining > 0 {
            warn!(remaining, "Tenant mesh dropped without shutdown; sandboxes were not disposed");
        }
    }
}
