// Copyright (c) 2026 cogmesh contributors
// SPDX-License-Identifier: AGPL-3.0

pub mod agent_factory;
pub mod orchestrator;
pub mod tenant_mesh;

// Re-export services for convenience
pub use agent_factory::{AgentCreator, AgentFactory};
pub use orchestrator::{Orchestrator, OrchestratorError};
pub use tenant_mesh::{TenantEnvironment, TenantMesh};
