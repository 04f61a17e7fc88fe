// Copyright (c) 2026 cogmesh contributors
// SPDX-License-Identifier: AGPL-3.0
//! # Agent Domain
//!
//! The capability trait every agent variant implements, plus the shared
//! [`AgentCore`] each variant embeds.
//!
//! ## Lifecycle
//!
//! ```text
//! Idle ──dispatch──▶ Running ──execute Ok──▶ Idle
//!                       │
//!                       └──execute Err / panic──▶ Failed   (terminal)
//!
//! any state ──shutdown──▶ Completed                          (terminal)
//! ```
//!
//! `Paused` is reserved; nothing transitions into it.

use async_trait::async_trait;
use cogmesh_atomspace::{AtomStore, AtomStoreRegistry, TenantId};
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::warn;

use crate::domain::message::{AgentMessage, MessageSink};

/// Caller-chosen agent identifier, unique within one orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgentId(String);

impl AgentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for AgentId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for AgentId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The lifecycle state of an agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentState {
    /// Eligible for dispatch
    Idle,
    /// `execute` in flight
    Running,
    /// Reserved for cooperative suspension
    Paused,
    /// Shut down
    Completed,
    /// `execute` failed; never dispatched again
    Failed,
}

impl AgentState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, AgentState::Completed | AgentState::Failed)
    }
}

/// Failure reported by an agent's `execute`.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("Execution failed: {0}")]
    ExecutionFailed(String),

    #[error("Agent panicked: {0}")]
    Panicked(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MessagingError {
    #[error("Agent {0} is not bound to an orchestrator")]
    Unbound(AgentId),
}

/// State shared by every agent variant: identity, tenant store, lifecycle
/// state, and the orchestrator binding used for outbound messages.
///
/// The tenant is taken from the store, so an agent can never be bound to a
/// store of another tenant.
pub struct AgentCore {
    id: AgentId,
    tenant_id: TenantId,
    atomspace: Arc<AtomStore>,
    state: Mutex<AgentState>,
    sink: RwLock<Option<Arc<dyn MessageSink>>>,
}

impl AgentCore {
    pub fn new(id: impl Into<AgentId>, atomspace: Arc<AtomStore>) -> Self {
        Self {
            id: id.into(),
            tenant_id: atomspace.tenant_id().clone(),
            atomspace,
            state: Mutex::new(AgentState::Idle),
            sink: RwLock::new(None),
        }
    }

    /// Resolve (or lazily create) the tenant's store through `registry`.
    pub fn from_registry(
        id: impl Into<AgentId>,
        tenant_id: &TenantId,
        registry: &AtomStoreRegistry,
    ) -> Self {
        Self::new(id, registry.get_or_create(tenant_id))
    }

    pub fn id(&self) -> &AgentId {
        &self.id
    }

    pub fn tenant_id(&self) -> &TenantId {
        &self.tenant_id
    }

    pub fn atomspace(&self) -> &Arc<AtomStore> {
        &self.atomspace
    }

    pub fn state(&self) -> AgentState {
        *self.state.lock()
    }

    pub fn set_state(&self, state: AgentState) {
        *self.state.lock() = state;
    }

    /// Idle → Running. Returns `false`, leaving the state untouched, if the
    /// agent was not idle.
    pub(crate) fn try_begin_run(&self) -> bool {
        let mut state = self.state.lock();
        if *state != AgentState::Idle {
            return false;
        }
        *state = AgentState::Running;
        true
    }

    /// Running → `next`. A state changed while running (e.g. a concurrent
    /// shutdown) is kept.
    pub(crate) fn finish_run(&self, next: AgentState) {
        let mut state = self.state.lock();
        if *state == AgentState::Running {
            *state = next;
        }
    }

    pub(crate) fn bind(&self, sink: Arc<dyn MessageSink>) {
        *self.sink.write() = Some(sink);
    }

    pub fn is_bound(&self) -> bool {
        self.sink.read().is_some()
    }

    /// Enqueue a message to `to` on the bound orchestrator.
    ///
    /// Unbound agents drop the message with a warning; use
    /// [`AgentCore::try_send_message`] to observe that case.
    pub fn send_message(&self, to: impl Into<AgentId>, message_type: &str, payload: &str) {
        if let Err(err) = self.try_send_message(to, message_type, payload) {
            warn!(agent_id = %self.id, message_type, "Dropping outbound message: {}", err);
        }
    }

    pub fn try_send_message(
        &self,
        to: impl Into<AgentId>,
        message_type: &str,
        payload: &str,
    ) -> Result<(), MessagingError> {
        let sink = self.sink.read().clone();
        let sink = sink.ok_or_else(|| MessagingError::Unbound(self.id.clone()))?;
        sink.route(AgentMessage::new(self.id.clone(), to.into(), message_type, payload));
        Ok(())
    }
}

impl fmt::Debug for AgentCore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AgentCore")
            .field("id", &self.id)
            .field("tenant_id", &self.tenant_id)
            .field("state", &self.state())
            .field("bound", &self.is_bound())
            .finish()
    }
}

/// Capability set of an autonomous agent.
///
/// Implementors embed an [`AgentCore`] and expose it through [`Agent::core`].
/// Methods take `&self`; variants keep their own mutable state behind
/// interior mutability since the orchestrator and the constructing caller
/// share the agent.
#[async_trait]
pub trait Agent: Send + Sync {
    fn core(&self) -> &AgentCore;

    /// Called once on registration. Returning `false` rejects the
    /// registration.
    async fn initialize(&self) -> bool {
        self.core().set_state(AgentState::Idle);
        true
    }

    /// One unit of work. Must return promptly: shutdown of the orchestrator
    /// waits for an in-flight `execute`.
    async fn execute(&self) -> Result<(), AgentError>;

    async fn shutdown(&self) {
        self.core().set_state(AgentState::Completed);
    }

    async fn on_message(&self, _message: AgentMessage) {}

    fn id(&self) -> &AgentId {
        self.core().id()
    }

    fn tenant_id(&self) -> &TenantId {
        self.core().tenant_id()
    }

    fn state(&self) -> AgentState {
        self.core().state()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cogmesh_atomspace::AtomType;

    struct RecordingSink(Mutex<Vec<AgentMessage>>);

    impl MessageSink for RecordingSink {
        fn route(&self, message: AgentMessage) {
            self.0.lock().push(message);
        }
    }

    struct NoopAgent {
        core: AgentCore,
    }

    #[async_trait]
    impl Agent for NoopAgent {
        fn core(&self) -> &AgentCore {
            &self.core
        }

        async fn execute(&self) -> Result<(), AgentError> {
            self.core.atomspace().add_node(AtomType::ConceptNode, "noop");
            Ok(())
        }
    }

    fn core(id: &str, tenant: &str) -> AgentCore {
        AgentCore::new(id, Arc::new(AtomStore::new(TenantId::new(tenant))))
    }

    #[test]
    fn test_core_takes_tenant_from_store() {
        let registry = AtomStoreRegistry::new();
        let core = AgentCore::from_registry("agent1", &TenantId::new("tenant1"), &registry);

        assert_eq!(core.id().as_str(), "agent1");
        assert_eq!(core.tenant_id().as_str(), "tenant1");
        assert_eq!(core.atomspace().tenant_id().as_str(), "tenant1");
        assert_eq!(core.state(), AgentState::Idle);
        assert_eq!(registry.count(), 1);
    }

    #[test]
    fn test_unbound_send_is_reported() {
        let core = core("agent1", "tenant1");

        assert!(!core.is_bound());
        assert_eq!(
            core.try_send_message("agent2", "greet", "hi"),
            Err(MessagingError::Unbound(AgentId::new("agent1")))
        );
        // Silent variant must not panic.
        core.send_message("agent2", "greet", "hi");
    }

    #[test]
    fn test_bound_send_routes_to_sink() {
        let core = core("agent1", "tenant1");
        let sink = Arc::new(RecordingSink(Mutex::new(Vec::new())));
        core.bind(sink.clone());

        core.send_message("agent2", "greet", "hi");

        let routed = sink.0.lock();
        assert_eq!(routed.len(), 1);
        assert_eq!(routed[0].from.as_str(), "agent1");
        assert_eq!(routed[0].to.as_str(), "agent2");
        assert_eq!(routed[0].message_type, "greet");
        assert_eq!(routed[0].payload, "hi");
    }

    #[test]
    fn test_run_transitions() {
        let core = core("agent1", "tenant1");

        assert!(core.try_begin_run());
        assert_eq!(core.state(), AgentState::Running);
        assert!(!core.try_begin_run());

        core.finish_run(AgentState::Idle);
        assert_eq!(core.state(), AgentState::Idle);

        assert!(core.try_begin_run());
        core.set_state(AgentState::Completed);
        core.finish_run(AgentState::Idle);
        assert_eq!(core.state(), AgentState::Completed);
    }

    #[tokio::test]
    async fn test_default_lifecycle_hooks() {
        let agent = NoopAgent {
            core: core("agent1", "tenant1"),
        };

        assert!(agent.initialize().await);
        assert_eq!(agent.state(), AgentState::Idle);

        agent.execute().await.unwrap();
        assert_eq!(agent.core().atomspace().size(), 1);

        agent.shutdown().await;
        assert_eq!(agent.state(), AgentState::Completed);
        assert!(agent.state().is_terminal());
    }
}
