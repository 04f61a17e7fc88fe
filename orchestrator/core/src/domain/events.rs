// Copyright (c) 2026 cogmesh contributors
// SPDX-License-Identifier: AGPL-3.0

use chrono::{DateTime, Utc};
use cogmesh_atomspace::TenantId;
use serde::{Deserialize, Serialize};

use crate::domain::agent::AgentId;

/// Orchestrator lifecycle and dispatch events, published on the event bus.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OrchestratorEvent {
    OrchestratorStarted {
        started_at: DateTime<Utc>,
    },
    OrchestratorStopped {
        stopped_at: DateTime<Utc>,
    },
    AgentRegistered {
        agent_id: AgentId,
        tenant_id: TenantId,
        registered_at: DateTime<Utc>,
    },
    AgentUnregistered {
        agent_id: AgentId,
        unregistered_at: DateTime<Utc>,
    },
    AgentDispatched {
        agent_id: AgentId,
        dispatched_at: DateTime<Utc>,
    },
    AgentCompleted {
        agent_id: AgentId,
        completed_at: DateTime<Utc>,
    },
    AgentFailed {
        agent_id: AgentId,
        reason: String,
        failed_at: DateTime<Utc>,
    },
    /// A message addressed to an unregistered agent was discarded.
    MessageDropped {
        from: AgentId,
        to: AgentId,
        message_type: String,
        dropped_at: DateTime<Utc>,
    },
}

impl OrchestratorEvent {
    /// The agent an event concerns. For dropped messages this is the
    /// intended recipient.
    pub fn agent_id(&self) -> Option<&AgentId> {
        match self {
            OrchestratorEvent::OrchestratorStarted { .. }
            | OrchestratorEvent::OrchestratorStopped { .. } => None,
            OrchestratorEvent::AgentRegistered { agent_id, .. }
            | OrchestratorEvent::AgentUnregistered { agent_id, .. }
            | OrchestratorEvent::AgentDispatched { agent_id, .. }
            | OrchestratorEvent::AgentCompleted { agent_id, .. }
            | OrchestratorEvent::AgentFailed { agent_id, .. } => Some(agent_id),
            OrchestratorEvent::MessageDropped { to, .. } => Some(to),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serializes_with_type_tag() {
        let event = OrchestratorEvent::AgentFailed {
            agent_id: AgentId::new("agent1"),
            reason: "boom".to_string(),
            failed_at: Utc::now(),
        };

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "agent_failed");
        assert_eq!(json["agent_id"], "agent1");
        assert_eq!(event.agent_id(), Some(&AgentId::new("agent1")));
    }
}
