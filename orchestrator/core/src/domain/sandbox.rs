// Copyright (c) 2026 cogmesh contributors
// SPDX-License-Identifier: AGPL-3.0

//! Seam to the per-tenant execution sandbox layer.
//!
//! Sandboxes are provided by an external collaborator. The core only relies on
//! a 1:1 tenant ↔ sandbox association and on disposal being independent of
//! the tenant's `AtomStore` and of the orchestrator.

use async_trait::async_trait;
use cogmesh_atomspace::TenantId;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Resource limits and feature flags for a tenant sandbox.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SandboxConfig {
    /// Heap ceiling in bytes; 0 means the provider default
    #[serde(default)]
    pub heap_size_limit: u64,

    #[serde(default = "default_true")]
    pub enable_wasm: bool,

    #[serde(default)]
    pub enable_inspector: bool,
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            heap_size_limit: 0,
            enable_wasm: true,
            enable_inspector: false,
        }
    }
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Error)]
pub enum SandboxError {
    #[error("Failed to create sandbox for tenant {tenant_id}: {reason}")]
    CreationFailed { tenant_id: TenantId, reason: String },

    #[error("Failed to dispose sandbox for tenant {tenant_id}: {reason}")]
    DisposalFailed { tenant_id: TenantId, reason: String },
}

/// An isolated runtime environment owned by one tenant.
#[async_trait]
pub trait Sandbox: Send + Sync {
    fn tenant_id(&self) -> &TenantId;

    /// Release the sandbox. Called exactly once by the tenant mesh.
    async fn dispose(&self) -> Result<(), SandboxError>;
}

#[async_trait]
pub trait SandboxProvider: Send + Sync {
    async fn create(
        &self,
        tenant_id: &TenantId,
        config: &SandboxConfig,
    ) -> Result<Box<dyn Sandbox>, SandboxError>;
}
