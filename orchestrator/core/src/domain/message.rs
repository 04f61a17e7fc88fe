// Copyright (c) 2026 cogmesh contributors
// SPDX-License-Identifier: AGPL-3.0

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::agent::AgentId;

/// Immutable inter-agent message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentMessage {
    pub from: AgentId,
    pub to: AgentId,
    #[serde(rename = "type")]
    pub message_type: String,
    pub payload: String,
    pub timestamp: DateTime<Utc>,
}

impl AgentMessage {
    /// Build a message stamped with the current wall-clock time.
    pub fn new(
        from: AgentId,
        to: AgentId,
        message_type: impl Into<String>,
        payload: impl Into<String>,
    ) -> Self {
        Self {
            from,
            to,
            message_type: message_type.into(),
            payload: payload.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Destination for outbound agent messages.
///
/// Implemented by the orchestrator's dispatch queues; an agent holds one once
/// it has been registered.
pub trait MessageSink: Send + Sync {
    fn route(&self, message: AgentMessage);
}
