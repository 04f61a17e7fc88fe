// Copyright (c) 2026 cogmesh contributors
// SPDX-License-Identifier: AGPL-3.0
//! # Agent Orchestrator
//!
//! Owns the agent registry and the dispatch queues, and drives a single
//! background worker that delivers messages and executes scheduled agents.
//!
//! ## Worker Loop
//!
//! Each iteration:
//!
//! 1. Drain the whole message queue, release the queue lock, then deliver each
//!    message to its recipient's `on_message`. Messages for unknown ids are
//!    dropped.
//! 2. Pop at most one scheduled id. If it names a registered, idle agent,
//!    run `execute` (Idle → Running → Idle | Failed). Anything else is skipped.
//! 3. Sleep for the configured poll interval.
//!
//! ## Locking
//!
//! | Lock | Guards |
//! |------|--------|
//! | `agents` | agent registry |
//! | `DispatchQueues` | message queue + schedule queue |
//! | `worker` (async) | start/stop lifecycle |
//!
//! The registry and queue locks are never nested and never held across an
//! `.await`.
//!
//! ## Registration
//!
//! An agent becomes visible in the registry before its `initialize` hook
//! runs, so duplicate ids are rejected atomically. The worker does not touch
//! it until `initialize` has returned: delivery and dispatch wait on the
//! agent's readiness signal. A registration abandoned mid-`initialize`
//! leaves the agent registered but permanently skipped.

use chrono::Utc;
use cogmesh_atomspace::TenantId;
use futures::FutureExt;
use metrics::counter;
use parking_lot::RwLock;
use std::any::Any;
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::domain::agent::{Agent, AgentError, AgentId, AgentState};
use crate::domain::config::OrchestratorConfig;
use crate::domain::events::OrchestratorEvent;
use crate::domain::message::{AgentMessage, MessageSink};
use crate::infrastructure::dispatch_queue::DispatchQueues;
use crate::infrastructure::event_bus::{EventBus, EventReceiver};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum OrchestratorError {
    #[error("Agent {0} is already registered")]
    AlreadyRegistered(AgentId),

    #[error("Agent {0} rejected initialization")]
    InitializationRejected(AgentId),

    #[error("Agent {0} not found")]
    AgentNotFound(AgentId),
}

struct Worker {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

/// Registry entry. `ready` flips to `true` once `initialize` has returned.
struct Registration {
    agent: Arc<dyn Agent>,
    ready: watch::Receiver<bool>,
}

/// State shared between the orchestrator handle and its worker task.
struct Shared {
    agents: RwLock<BTreeMap<AgentId, Registration>>,
    queues: Arc<DispatchQueues>,
    events: EventBus,
}

impl Shared {
    fn agent(&self, agent_id: &AgentId) -> Option<Arc<dyn Agent>> {
        self.agents
            .read()
            .get(agent_id)
            .map(|registration| Arc::clone(&registration.agent))
    }

    /// Look up an agent for the worker, waiting out an in-flight
    /// `initialize`. Returns `None` for unknown agents and for registrations
    /// abandoned before `initialize` returned.
    async fn ready_agent(&self, agent_id: &AgentId) -> Option<Arc<dyn Agent>> {
        let (agent, mut ready) = {
            let agents = self.agents.read();
            let registration = agents.get(agent_id)?;
            (Arc::clone(&registration.agent), registration.ready.clone())
        };

        let initialized = ready.wait_for(|ready| *ready).await.is_ok();
        if !initialized {
            debug!(agent_id = %agent_id, "Agent registration was abandoned during initialize");
            return None;
        }
        Some(agent)
    }

    async fn deliver_pending(&self) {
        let messages = self.queues.drain_messages();
        for message in messages {
            match self.ready_agent(&message.to).await {
                Some(agent) => self.deliver(agent, message).await,
                None => self.drop_message(message),
            }
        }
    }

    async fn deliver(&self, agent: Arc<dyn Agent>, message: AgentMessage) {
        debug!(
            from = %message.from,
            to = %message.to,
            message_type = %message.message_type,
            "Delivering message"
        );

        if let Err(panic) = AssertUnwindSafe(agent.on_message(message)).catch_unwind().await {
            error!(agent_id = %agent.id(), "on_message panicked: {}", panic_message(&*panic));
        }
        counter!("cogmesh_messages_delivered_total").increment(1);
    }

    fn drop_message(&self, message: AgentMessage) {
        debug!(
            from = %message.from,
            to = %message.to,
            message_type = %message.message_type,
            "Dropping message for unregistered agent"
        );
        counter!("cogmesh_messages_dropped_total").increment(1);
        self.events.publish(OrchestratorEvent::MessageDropped {
            from: message.from,
            to: message.to,
            message_type: message.message_type,
            dropped_at: Utc::now(),
        });
    }

    async fn dispatch_next(&self) {
        let Some(agent_id) = self.queues.pop_scheduled() else {
            return;
        };

        let Some(agent) = self.ready_agent(&agent_id).await else {
            debug!(agent_id = %agent_id, "Skipping dispatch of unregistered agent");
            return;
        };

        if !agent.core().try_begin_run() {
            debug!(agent_id = %agent_id, state = ?agent.state(), "Skipping dispatch of non-idle agent");
            return;
        }

        debug!(agent_id = %agent_id, "Dispatching agent");
        counter!("cogmesh_agent_dispatches_total").increment(1);
        self.events.publish(OrchestratorEvent::AgentDispatched {
            agent_id: agent_id.clone(),
            dispatched_at: Utc::now(),
        });

        let outcome = match AssertUnwindSafe(agent.execute()).catch_unwind().await {
            Ok(result) => result,
            Err(panic) => Err(AgentError::Panicked(panic_message(&*panic))),
        };

        match outcome {
            Ok(()) => {
                agent.core().finish_run(AgentState::Idle);
                self.events.publish(OrchestratorEvent::AgentCompleted {
                    agent_id,
                    completed_at: Utc::now(),
                });
            }
            Err(err) => {
                agent.core().finish_run(AgentState::Failed);
                error!(agent_id = %agent_id, "Agent execution failed: {}", err);
                counter!("cogmesh_agent_failures_total").increment(1);
                self.events.publish(OrchestratorEvent::AgentFailed {
                    agent_id,
                    reason: err.to_string(),
                    failed_at: Utc::now(),
                });
            }
        }
    }
}

async fn run_loop(shared: Arc<Shared>, poll_interval: Duration, cancel: CancellationToken) {
    while !cancel.is_cancelled() {
        shared.deliver_pending().await;
        shared.dispatch_next().await;

        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = tokio::time::sleep(poll_interval) => {}
        }
    }
    debug!("Orchestrator worker exited");
}

async fn join_worker(handle: &mut JoinHandle<()>) {
    if let Err(e) = handle.await {
        error!("Orchestrator worker terminated abnormally: {}", e);
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

/// Scheduler and message router for a set of agents.
///
/// All methods may be called concurrently from any task. `start` must be
/// called from within a tokio runtime.
pub struct Orchestrator {
    config: OrchestratorConfig,
    shared: Arc<Shared>,
    worker: tokio::sync::Mutex<Option<Worker>>,
    running: AtomicBool,
}

impl Orchestrator {
    /// Zero values in `config` are replaced by their defaults (see
    /// [`OrchestratorConfig::normalized`]).
    pub fn new(config: OrchestratorConfig) -> Self {
        let config = config.normalized();
        let events = EventBus::new(config.event_capacity);
        Self {
            config,
            shared: Arc::new(Shared {
                agents: RwLock::new(BTreeMap::new()),
                queues: Arc::new(DispatchQueues::new()),
                events,
            }),
            worker: tokio::sync::Mutex::new(None),
            running: AtomicBool::new(false),
        }
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Register an agent, bind it to this orchestrator, and run its
    /// `initialize` hook.
    ///
    /// The worker neither delivers to nor dispatches the agent until
    /// `initialize` has returned. An agent whose `initialize` returns `false`
    /// stays registered; the rejection is reported as
    /// [`OrchestratorError::InitializationRejected`].
    pub async fn register_agent(&self, agent: Arc<dyn Agent>) -> Result<(), OrchestratorError> {
        let agent_id = agent.id().clone();
        let (ready_tx, ready) = watch::channel(false);

        {
            let mut agents = self.shared.agents.write();
            match agents.entry(agent_id.clone()) {
                Entry::Occupied(_) => return Err(OrchestratorError::AlreadyRegistered(agent_id)),
                Entry::Vacant(slot) => {
                    let sink: Arc<dyn MessageSink> = self.shared.queues.clone();
                    agent.core().bind(sink);
                    slot.insert(Registration {
                        agent: Arc::clone(&agent),
                        ready,
                    });
                }
            }
        }

        let accepted = agent.initialize().await;
        ready_tx.send_replace(true);

        if !accepted {
            warn!(agent_id = %agent_id, "Agent rejected initialization");
            return Err(OrchestratorError::InitializationRejected(agent_id));
        }

        info!(agent_id = %agent_id, tenant = %agent.tenant_id(), "Registered agent");
        self.shared.events.publish(OrchestratorEvent::AgentRegistered {
            agent_id,
            tenant_id: agent.tenant_id().clone(),
            registered_at: Utc::now(),
        });
        Ok(())
    }

    /// Remove an agent from the registry and run its `shutdown` hook.
    pub async fn unregister_agent(&self, agent_id: &AgentId) -> Result<(), OrchestratorError> {
        let Registration { agent, .. } = self
            .shared
            .agents
            .write()
            .remove(agent_id)
            .ok_or_else(|| OrchestratorError::AgentNotFound(agent_id.clone()))?;

        agent.shutdown().await;

        info!(agent_id = %agent_id, "Unregistered agent");
        self.shared.events.publish(OrchestratorEvent::AgentUnregistered {
            agent_id: agent_id.clone(),
            unregistered_at: Utc::now(),
        });
        Ok(())
    }

    pub fn get_agent(&self, agent_id: &AgentId) -> Option<Arc<dyn Agent>> {
        self.shared.agent(agent_id)
    }

    pub fn agents_by_tenant(&self, tenant_id: &TenantId) -> Vec<Arc<dyn Agent>> {
        self.shared
            .agents
            .read()
            .values()
            .filter(|registration| registration.agent.tenant_id() == tenant_id)
            .map(|registration| Arc::clone(&registration.agent))
            .collect()
    }

    pub fn agent_ids(&self) -> Vec<AgentId> {
        self.shared.agents.read().keys().cloned().collect()
    }

    pub fn agent_count(&self) -> usize {
        self.shared.agents.read().len()
    }

    /// Launch the worker. No-op if already running.
    pub async fn start(&self) {
        let mut worker = self.worker.lock().await;
        if let Some(previous) = worker.as_mut() {
            if !previous.cancel.is_cancelled() {
                return;
            }
            // An interrupted stop left a cancelled worker behind; finish
            // joining it so two loops never overlap.
            join_worker(&mut previous.handle).await;
            *worker = None;
        }

        let cancel = CancellationToken::new();
        let handle = tokio::spawn(run_loop(
            Arc::clone(&self.shared),
            self.config.poll_interval,
            cancel.clone(),
        ));
        *worker = Some(Worker { cancel, handle });
        self.running.store(true, Ordering::SeqCst);

        info!(poll_interval = ?self.config.poll_interval, "Orchestrator started");
        self.shared.events.publish(OrchestratorEvent::OrchestratorStarted {
            started_at: Utc::now(),
        });
    }

    /// Signal the worker to exit and wait until it has. An in-flight
    /// `execute` is allowed to finish. No-op if not running.
    ///
    /// The worker handle stays recorded until the join completes, so a stop
    /// dropped mid-await is finished by the next `stop` or `start`.
    pub async fn stop(&self) {
        let mut worker = self.worker.lock().await;
        let Some(current) = worker.as_mut() else {
            return;
        };

        current.cancel.cancel();
        self.running.store(false, Ordering::SeqCst);
        join_worker(&mut current.handle).await;
        *worker = None;

        info!("Orchestrator stopped");
        self.shared.events.publish(OrchestratorEvent::OrchestratorStopped {
            stopped_at: Utc::now(),
        });
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Queue an agent for one execution. Existence is checked at dispatch.
    pub fn schedule_agent(&self, agent_id: impl Into<AgentId>) {
        self.shared.queues.schedule(agent_id.into());
    }

    pub fn route_message(&self, message: AgentMessage) {
        self.shared.queues.push_message(message);
    }

    /// Send one message to every registered agent except `from`.
    pub fn broadcast_message(&self, from: &AgentId, message_type: &str, payload: &str) {
        let recipients: Vec<AgentId> = self
            .shared
            .agents
            .read()
            .keys()
            .filter(|id| *id != from)
            .cloned()
            .collect();

        let messages = recipients
            .into_iter()
            .map(|to| AgentMessage::new(from.clone(), to, message_type, payload))
            .collect();
        self.shared.queues.push_messages(messages);
    }

    pub fn pending_messages(&self) -> usize {
        self.shared.queues.pending_messages()
    }

    pub fn pending_schedules(&self) -> usize {
        self.shared.queues.pending_schedules()
    }

    pub fn events(&self) -> &EventBus {
        &self.shared.events
    }

    pub fn subscribe(&self) -> EventReceiver {
        self.shared.events.subscribe()
    }
}

impl Default for Orchestrator {
    fn default() -> Self {
        Self::new(OrchestratorConfig::default())
    }
}

impl Drop for Orchestrator {
    fn drop(&mut self) {
        if let Some(worker) = self.worker.get_mut().take() {
            worker.cancel.cancel();
        }
    }
}
