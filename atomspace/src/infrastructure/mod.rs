// Copyright (c) 2026 cogmesh contributors
// SPDX-License-Identifier: AGPL-3.0
//! # AtomSpace Infrastructure
//!
//! Concurrent containers built on the domain types.
//!
//! - [`atom_store`]: `AtomStore`, one per tenant, single exclusive lock.
//! - [`registry`]: `AtomStoreRegistry`, lazy tenant → store map.

pub mod atom_store;
pub mod registry;

pub use atom_store::AtomStore;
pub use registry::AtomStoreRegistry;
