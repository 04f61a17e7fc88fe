// Copyright (c) 2026 cogmesh contributors
// SPDX-License-Identifier: AGPL-3.0
//! # `cogmesh-orchestrator-core`
//!
//! Agent runtime on top of `cogmesh-atomspace`: the [`Agent`] capability
//! trait, inter-agent messaging, the [`AgentFactory`], the background
//! [`Orchestrator`], and the per-tenant [`TenantMesh`].
//!
//! # Architecture
//!
//! - **domain**: agent trait and state machine, messages, events, config, sandbox seam
//! - **application**: orchestrator, factory, tenant mesh
//! - **infrastructure**: dispatch queues, event bus, tracing setup

pub mod application;
pub mod domain;
pub mod infrastructure;

pub use application::*;
pub use domain::agent::{Agent, AgentCore, AgentError, AgentId, AgentState, MessagingError};
pub use domain::config::{CogmeshConfig, LogFormat, LoggingConfig, OrchestratorConfig};
pub use domain::events::OrchestratorEvent;
pub use domain::message::{AgentMessage, MessageSink};
pub use domain::sandbox::{Sandbox, SandboxConfig, SandboxError, SandboxProvider};
pub use infrastructure::event_bus::{AgentEventReceiver, EventBus, EventBusError, EventReceiver};
pub use infrastructure::telemetry::init_tracing;
