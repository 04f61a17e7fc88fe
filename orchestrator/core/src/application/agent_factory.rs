// Copyright (c) 2026 cogmesh contributors
// SPDX-License-Identifier: AGPL-3.0
//! Agent Factory - Application Layer
//!
//! Maps agent type tags to constructors so hosts can create agents by name.
//! The factory resolves the tenant's `AtomStore` through the injected
//! registry and hands the constructor a ready [`AgentCore`].

use cogmesh_atomspace::{AtomStoreRegistry, TenantId};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

use crate::domain::agent::{Agent, AgentCore, AgentId};

/// Builds an agent around a prepared core.
pub type AgentCreator = Arc<dyn Fn(AgentCore) -> Arc<dyn Agent> + Send + Sync>;

pub struct AgentFactory {
    registry: Arc<AtomStoreRegistry>,
    creators: RwLock<HashMap<String, AgentCreator>>,
}

impl AgentFactory {
    pub fn new(registry: Arc<AtomStoreRegistry>) -> Self {
        Self {
            registry,
            creators: RwLock::new(HashMap::new()),
        }
    }

    pub fn registry(&self) -> &Arc<AtomStoreRegistry> {
        &self.registry
    }

    /// Register a constructor for `type_tag`, replacing any previous one.
    pub fn register_agent_type<F>(&self, type_tag: impl Into<String>, creator: F)
    where
        F: Fn(AgentCore) -> Arc<dyn Agent> + Send + Sync + 'static,
    {
        let type_tag = type_tag.into();
        debug!(type_tag = %type_tag, "Registering agent type");
        self.creators.write().insert(type_tag, Arc::new(creator));
    }

    /// Returns `None` for unknown tags. The tenant's store is created on
    /// first use.
    pub fn create_agent(
        &self,
        type_tag: &str,
        agent_id: impl Into<AgentId>,
        tenant_id: &TenantId,
    ) -> Option<Arc<dyn Agent>> {
        let creator = self.creators.read().get(type_tag).cloned()?;
        let core = AgentCore::from_registry(agent_id, tenant_id, &self.registry);
        Some(creator(core))
    }

    pub fn is_registered(&self, type_tag: &str) -> bool {
        self.creators.read().contains_key(type_tag)
    }

    /// Registered tags, sorted.
    pub fn registered_types(&self) -> Vec<String> {
        let mut types: Vec<String> = self.creators.read().keys().cloned().collect();
        types.sort();
        types
    }
}
