// Copyright (c) 2026 cogmesh contributors
// SPDX-License-Identifier: AGPL-3.0
//! # Infrastructure Layer
//!
//! - [`dispatch_queue`]: FIFO message and schedule queues
//! - [`event_bus`]: tokio broadcast fan-out of `OrchestratorEvent`s
//! - [`telemetry`]: tracing subscriber installation

pub mod dispatch_queue;
pub mod event_bus;
pub mod telemetry;
