// Copyright (c) 2026 cogmesh contributors
// SPDX-License-Identifier: AGPL-3.0

//! In-memory, tenant-scoped atom store.
//!
//! All atoms of one tenant live in a single arena keyed by [`AtomId`]. Two
//! secondary indices (by name, by type) point back into the arena. Every
//! operation, scans included, runs under one exclusive lock so the three
//! indices are never observed out of step with each other.

use parking_lot::Mutex;
use std::collections::HashMap;
use tracing::debug;

use crate::config::{AtomStoreConfig, NameIndexPolicy};
use crate::domain::atom::{Atom, AtomBody, AtomId, AtomType, TruthValue};
use crate::domain::tenant::TenantId;

#[derive(Debug, Default)]
struct Indices {
    by_id: HashMap<AtomId, Atom>,
    by_name: HashMap<String, AtomId>,
    /// Buckets keep insertion order.
    by_type: HashMap<AtomType, Vec<AtomId>>,
}

impl Indices {
    fn insert(&mut self, atom: Atom, claim_name: bool) {
        let id = atom.id;
        if claim_name {
            self.by_name.insert(atom.name.clone(), id);
        }
        self.by_type.entry(atom.atom_type).or_default().push(id);
        self.by_id.insert(id, atom);
    }

    fn remove(&mut self, id: AtomId) -> Option<Atom> {
        let atom = self.by_id.remove(&id)?;

        // Only drop the name entry if it still belongs to this atom; a later
        // link may have taken the name over.
        if self.by_name.get(&atom.name) == Some(&id) {
            self.by_name.remove(&atom.name);
        }

        if let Some(bucket) = self.by_type.get_mut(&atom.atom_type) {
            if let Some(pos) = bucket.iter().position(|candidate| *candidate == id) {
                bucket.remove(pos);
            }
            if bucket.is_empty() {
                self.by_type.remove(&atom.atom_type);
            }
        }

        Some(atom)
    }

    fn clear(&mut self) {
        self.by_id.clear();
        self.by_name.clear();
        self.by_type.clear();
    }
}

/// Knowledge graph owned by exactly one tenant.
#[derive(Debug)]
pub struct AtomStore {
    tenant_id: TenantId,
    config: AtomStoreConfig,
    inner: Mutex<Indices>,
}

impl AtomStore {
    pub fn new(tenant_id: TenantId) -> Self {
        Self::with_config(tenant_id, AtomStoreConfig::default())
    }

    pub fn with_config(tenant_id: TenantId, config: AtomStoreConfig) -> Self {
        Self {
            tenant_id,
            config,
            inner: Mutex::new(Indices::default()),
        }
    }

    pub fn tenant_id(&self) -> &TenantId {
        &self.tenant_id
    }

    pub fn config(&self) -> &AtomStoreConfig {
        &self.config
    }

    /// Add a node, or return the node already registered under `name`.
    ///
    /// Deduplication only applies when the name index entry is a node. If the
    /// name is currently held by a link, a fresh node is created; it takes the
    /// name over under [`NameIndexPolicy::LastWriteWins`] and leaves the link
    /// in place under [`NameIndexPolicy::FirstWriteWins`].
    pub fn add_node(&self, atom_type: AtomType, name: &str) -> Atom {
        let mut guard = self.inner.lock();
        let inner = &mut *guard;

        let holder = inner.by_name.get(name).and_then(|id| inner.by_id.get(id));
        if let Some(existing) = holder {
            if existing.is_node() {
                return existing.clone();
            }
        }

        let claim_name = match self.config.name_index_policy {
            NameIndexPolicy::LastWriteWins => true,
            NameIndexPolicy::FirstWriteWins => holder.is_none(),
        };

        let node = Atom::node(atom_type, name);
        inner.insert(node.clone(), claim_name);
        node
    }

    /// Add a link. Links are never deduplicated.
    ///
    /// Name index handling follows the store's [`NameIndexPolicy`].
    pub fn add_link(&self, atom_type: AtomType, name: &str, outgoing: Vec<AtomId>) -> Atom {
        let mut guard = self.inner.lock();
        let inner = &mut *guard;

        let claim_name = match self.config.name_index_policy {
            NameIndexPolicy::LastWriteWins => true,
            NameIndexPolicy::FirstWriteWins => !inner.by_name.contains_key(name),
        };

        let link = Atom::link(atom_type, name, outgoing);
        inner.insert(link.clone(), claim_name);
        link
    }

    pub fn get_atom(&self, id: AtomId) -> Option<Atom> {
        self.inner.lock().by_id.get(&id).cloned()
    }

    pub fn get_atom_by_name(&self, name: &str) -> Option<Atom> {
        let inner = self.inner.lock();
        inner.by_name.get(name).and_then(|id| inner.by_id.get(id)).cloned()
    }

    /// Snapshot of all atoms of `atom_type`, in insertion order.
    pub fn get_atoms_by_type(&self, atom_type: AtomType) -> Vec<Atom> {
        let inner = self.inner.lock();
        inner
            .by_type
            .get(&atom_type)
            .map(|bucket| bucket.iter().filter_map(|id| inner.by_id.get(id)).cloned().collect())
            .unwrap_or_default()
    }

    /// Remove an atom from all indices. Links that reference it are left
    /// untouched.
    pub fn remove_atom(&self, id: AtomId) -> bool {
        let removed = self.inner.lock().remove(id);
        if let Some(atom) = &removed {
            debug!(tenant = %self.tenant_id, atom_id = %atom.id, name = %atom.name, "Removed atom");
        }
        removed.is_some()
    }

    /// Replace the truth value of a stored atom.
    pub fn set_truth_value(&self, id: AtomId, truth_value: TruthValue) -> bool {
        match self.inner.lock().by_id.get_mut(&id) {
            Some(atom) => {
                atom.truth_value = truth_value;
                true
            }
            None => false,
        }
    }

    /// Targets of a link that still exist, in outgoing order. Returns an empty
    /// vector for nodes and unknown ids.
    pub fn resolve_outgoing(&self, id: AtomId) -> Vec<Atom> {
        let inner = self.inner.lock();
        match inner.by_id.get(&id).map(|atom| &atom.body) {
            Some(AtomBody::Link { outgoing }) => outgoing
                .iter()
                .filter_map(|target| inner.by_id.get(target))
                .cloned()
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Full scan. Result order follows the id index and is unspecified.
    pub fn query<F>(&self, predicate: F) -> Vec<Atom>
    where
        F: Fn(&Atom) -> bool,
    {
        let inner = self.inner.lock();
        inner.by_id.values().filter(|atom| predicate(atom)).cloned().collect()
    }

    pub fn clear(&self) {
        self.inner.lock().clear();
        debug!(tenant = %self.tenant_id, "Cleared atom store");
    }

    pub fn size(&self) -> usize {
        self.inner.lock().by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> AtomStore {
        AtomStore::new(TenantId::new("tenant-a"))
    }

    #[test]
    fn test_add_node_dedupes_by_name() {
        let store = store();
        let first = store.add_node(AtomType::ConceptNode, "cat");
        let second = store.add_node(AtomType::ConceptNode, "cat");

        assert_eq!(first.id, second.id);
        assert_eq!(store.size(), 1);
    }

    #[test]
    fn test_add_link_takes_over_name() {
        let store = store();
        let node = store.add_node(AtomType::ConceptNode, "X");
        let a = store.add_node(AtomType::ConceptNode, "a");
        let link = store.add_link(AtomType::InheritanceLink, "X", vec![a.id, node.id]);

        assert_eq!(store.get_atom_by_name("X").unwrap().id, link.id);
        assert_eq!(store.get_atom(node.id).unwrap().id, node.id);
        assert_eq!(store.get_atoms_by_type(AtomType::ConceptNode).len(), 2);
    }

    #[test]
    fn test_first_write_wins_keeps_original_name_holder() {
        let store = AtomStore::with_config(
            TenantId::new("tenant-a"),
            AtomStoreConfig {
                name_index_policy: NameIndexPolicy::FirstWriteWins,
            },
        );
        let node = store.add_node(AtomType::ConceptNode, "X");
        let link = store.add_link(AtomType::InheritanceLink, "X", vec![node.id]);

        assert_eq!(store.get_atom_by_name("X").unwrap().id, node.id);
        assert!(store.get_atom(link.id).is_some());
    }

    #[test]
    fn test_add_node_after_link_holds_name_creates_new_node() {
        let store = store();
        let original = store.add_node(AtomType::ConceptNode, "X");
        let link = store.add_link(AtomType::SimilarityLink, "X", vec![original.id]);
        let fresh = store.add_node(AtomType::ConceptNode, "X");

        assert_ne!(fresh.id, original.id);
        assert_ne!(fresh.id, link.id);
        assert_eq!(store.get_atom_by_name("X").unwrap().id, fresh.id);
        assert_eq!(store.size(), 3);
    }

    #[test]
    fn test_remove_atom_clears_all_indices() {
        let store = store();
        let node = store.add_node(AtomType::PredicateNode, "likes");

        assert!(store.remove_atom(node.id));
        assert!(store.get_atom(node.id).is_none());
        assert!(store.get_atom_by_name("likes").is_none());
        assert!(store.get_atoms_by_type(AtomType::PredicateNode).is_empty());
        assert!(!store.remove_atom(node.id));
    }

    #[test]
    fn test_removing_shadowed_atom_keeps_new_name_holder() {
        let store = store();
        let node = store.add_node(AtomType::ConceptNode, "X");
        let link = store.add_link(AtomType::InheritanceLink, "X", vec![node.id]);

        assert!(store.remove_atom(node.id));
        assert_eq!(store.get_atom_by_name("X").unwrap().id, link.id);
    }

    #[test]
    fn test_resolve_outgoing_skips_dangling_targets() {
        let store = store();
        let a = store.add_node(AtomType::ConceptNode, "a");
        let b = store.add_node(AtomType::ConceptNode, "b");
        let link = store.add_link(AtomType::InheritanceLink, "a->b", vec![a.id, b.id]);

        store.remove_atom(a.id);

        let targets = store.resolve_outgoing(link.id);
        assert_eq!(targets.len(), 1);
        assert_eq!(targets[0].id, b.id);
        assert_eq!(store.get_atom(link.id).unwrap().outgoing(), &[a.id, b.id]);
    }

    #[test]
    fn test_set_truth_value() {
        let store = store();
        let node = store.add_node(AtomType::ConceptNode, "cat");

        assert!(store.set_truth_value(node.id, TruthValue::new(0.9, 0.8)));
        let tv = store.get_atom(node.id).unwrap().truth_value;
        assert_eq!(tv, TruthValue::new(0.9, 0.8));

        assert!(!store.set_truth_value(AtomId(u64::MAX), TruthValue::default()));
    }

    #[test]
    fn test_stored_truth_value_stays_in_unit_range() {
        let store = store();
        let node = store.add_node(AtomType::ConceptNode, "cat");

        let wild: TruthValue =
            serde_json::from_str(r#"{"strength": 5.0, "confidence": -3.0}"#).unwrap();
        assert!(store.set_truth_value(node.id, wild));
        let tv = store.get_atom(node.id).unwrap().truth_value;
        assert_eq!((tv.strength(), tv.confidence()), (1.0, 0.0));

        store.set_truth_value(node.id, TruthValue::new(f64::INFINITY, f64::NAN));
        let tv = store.get_atom(node.id).unwrap().truth_value;
        assert_eq!((tv.strength(), tv.confidence()), (1.0, 0.0));
    }

    #[test]
    fn test_first_write_wins_node_does_not_take_name_from_link() {
        let store = AtomStore::with_config(
            TenantId::new("tenant-a"),
            AtomStoreConfig {
                name_index_policy: NameIndexPolicy::FirstWriteWins,
            },
        );
        let link = store.add_link(AtomType::InheritanceLink, "X", vec![]);
        let node = store.add_node(AtomType::ConceptNode, "X");

        assert_ne!(node.id, link.id);
        assert_eq!(store.get_atom_by_name("X").unwrap().id, link.id);
        assert!(store.get_atom(node.id).is_some());
        assert_eq!(store.get_atoms_by_type(AtomType::ConceptNode).len(), 1);
        assert_eq!(store.size(), 2);
    }

    #[test]
    fn test_query_and_clear() {
        let store = store();
        store.add_node(AtomType::ConceptNode, "cat");
        store.add_node(AtomType::ConceptNode, "dog");
        store.add_node(AtomType::PredicateNode, "likes");

        let concepts = store.query(|atom| atom.atom_type == AtomType::ConceptNode);
        assert_eq!(concepts.len(), 2);

        store.clear();
        assert!(store.is_empty());
        assert!(store.get_atom_by_name("cat").is_none());
        assert!(store.get_atoms_by_type(AtomType::ConceptNode).is_empty());
    }
}
