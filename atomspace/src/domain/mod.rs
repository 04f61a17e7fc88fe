// Copyright (c) 2026 cogmesh contributors
// SPDX-License-Identifier: AGPL-3.0
//! # AtomSpace Domain Layer
//!
//! Pure value types for the knowledge graph. No locking, no I/O.
//!
//! | Module | Key Types |
//! |--------|-----------|
//! | [`atom`] | `Atom`, `AtomId`, `AtomType`, `AtomBody`, `TruthValue` |
//! | [`tenant`] | `TenantId` |

pub mod atom;
pub mod tenant;

pub use atom::*;
pub use tenant::*;
