// Copyright (c) 2026 cogmesh contributors
// SPDX-License-Identifier: AGPL-3.0

//! FIFO message and schedule queues shared by the orchestrator and its bound
//! agents.
//!
//! Both queues sit behind one mutex, separate from the agent registry lock, so
//! enumerating agents never stalls message routing.

use metrics::counter;
use parking_lot::Mutex;
use std::collections::VecDeque;

use crate::domain::agent::AgentId;
use crate::domain::message::{AgentMessage, MessageSink};

#[derive(Debug, Default)]
struct QueueState {
    messages: VecDeque<AgentMessage>,
    scheduled: VecDeque<AgentId>,
}

#[derive(Debug, Default)]
pub struct DispatchQueues {
    state: Mutex<QueueState>,
}

impl DispatchQueues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_message(&self, message: AgentMessage) {
        self.state.lock().messages.push_back(message);
        counter!("cogmesh_messages_routed_total").increment(1);
    }

    /// Enqueue a batch under a single lock acquisition, preserving order.
    pub fn push_messages(&self, messages: Vec<AgentMessage>) {
        let count = messages.len() as u64;
        self.state.lock().messages.extend(messages);
        counter!("cogmesh_messages_routed_total").increment(count);
    }

    /// Take every queued message, oldest first.
    pub fn drain_messages(&self) -> Vec<AgentMessage> {
        self.state.lock().messages.drain(..).collect()
    }

    pub fn schedule(&self, agent_id: AgentId) {
        self.state.lock().scheduled.push_back(agent_id);
    }

    pub fn pop_scheduled(&self) -> Option<AgentId> {
        self.state.lock().scheduled.pop_front()
    }

    pub fn pending_messages(&self) -> usize {
        self.state.lock().messages.len()
    }

    pub fn pending_schedules(&self) -> usize {
        self.state.lock().scheduled.len()
    }
}

impl MessageSink for DispatchQueues {
    fn route(&self, message: AgentMessage) {
        self.push_message(message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(to: &str, payload: &str) -> AgentMessage {
        AgentMessage::new(AgentId::new("sender"), AgentId::new(to), "test", payload)
    }

    #[test]
    fn test_messages_drain_in_fifo_order() {
        let queues = DispatchQueues::new();
        queues.push_message(message("a", "1"));
        queues.push_messages(vec![message("b", "2"), message("c", "3")]);
        assert_eq!(queues.pending_messages(), 3);

        let drained: Vec<String> = queues.drain_messages().into_iter().map(|m| m.payload).collect();
        assert_eq!(drained, vec!["1", "2", "3"]);
        assert_eq!(queues.pending_messages(), 0);
    }

    #[test]
    fn test_schedule_pops_one_at_a_time() {
        let queues = DispatchQueues::new();
        queues.schedule(AgentId::new("a"));
        queues.schedule(AgentId::new("b"));

        assert_eq!(queues.pending_schedules(), 2);
        assert_eq!(queues.pop_scheduled(), Some(AgentId::new("a")));
        assert_eq!(queues.pop_scheduled(), Some(AgentId::new("b")));
        assert_eq!(queues.pop_scheduled(), None);
    }
}
