// Copyright (c) 2026 cogmesh contributors
// SPDX-License-Identifier: AGPL-3.0
//! # `cogmesh-atomspace`: Tenant Knowledge Graph
//!
//! A per-tenant hypergraph of **atoms** (nodes and links) with three indices
//! kept in lockstep: by id, by name, and by type.
//!
//! ## Crate Layout
//!
//! | Module | Layer | Contents |
//! |--------|-------|----------|
//! | [`domain`] | Domain | `Atom`, `AtomId`, `AtomType`, `TruthValue`, `TenantId` |
//! | [`infrastructure`] | Infrastructure | `AtomStore`, `AtomStoreRegistry` |
//! | [`config`] | Configuration | `AtomStoreConfig`, `NameIndexPolicy` |
//!
//! ## Key Concepts
//!
//! - **Arena storage**: links hold [`AtomId`]s, not owning handles, so cyclic
//!   graphs need no reference counting tricks.
//! - **Dangling references**: removing an atom never cascades; readers of a
//!   link's outgoing set must tolerate ids that no longer resolve.
//! - **Isolation**: each tenant's store has its own lock. Stores of different
//!   tenants never contend.

pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::{AtomStoreConfig, NameIndexPolicy};
pub use domain::*;
pub use infrastructure::*;
