// Copyright (c) 2026 cogmesh contributors
// SPDX-License-Identifier: AGPL-3.0
//! # Domain Layer
//!
//! Agent capability trait, messages, events, configuration, and the sandbox
//! seam. No background tasks live here.
//!
//! | Module | Key Types |
//! |--------|-----------|
//! | [`agent`] | `Agent`, `AgentCore`, `AgentId`, `AgentState`, `AgentError` |
//! | [`message`] | `AgentMessage`, `MessageSink` |
//! | [`events`] | `OrchestratorEvent` |
//! | [`config`] | `CogmeshConfig`, `OrchestratorConfig`, `LoggingConfig` |
//! | [`sandbox`] | `Sandbox`, `SandboxProvider`, `SandboxConfig` |

pub mod agent;
pub mod config;
pub mod events;
pub mod message;
pub mod sandbox;
