// Copyright (c) 2026 cogmesh contributors
// SPDX-License-Identifier: AGPL-3.0

//! Atom entities for the tenant knowledge graph.
//!
//! An [`Atom`] is either a leaf **node** or a **link** over other atoms. Links
//! refer to their targets by [`AtomId`] rather than by owning handle, so the
//! graph may contain cycles without creating ownership cycles.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_ATOM_ID: AtomicU64 = AtomicU64::new(1);

/// Process-wide unique atom identifier. Ids increase monotonically and are
/// never reused, even across stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AtomId(pub u64);

impl AtomId {
    /// Allocate the next id from the process-wide counter.
    pub(crate) fn next() -> Self {
        Self(NEXT_ATOM_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for AtomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Type tag of an atom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AtomType {
    /// Untyped node
    Node,
    /// Untyped link
    Link,
    ConceptNode,
    PredicateNode,
    VariableNode,
    /// Evaluation of a predicate over arguments
    EvaluationLink,
    /// Inheritance relationship (child, parent)
    InheritanceLink,
    SimilarityLink,
    /// Execution context
    ExecutionLink,
}

impl AtomType {
    /// Whether this tag names a node kind. Informational only: the node/link
    /// distinction of a stored atom is carried by its [`AtomBody`].
    pub fn is_node_type(&self) -> bool {
        matches!(
            self,
            AtomType::Node | AtomType::ConceptNode | AtomType::PredicateNode | AtomType::VariableNode
        )
    }

    pub fn is_link_type(&self) -> bool {
        !self.is_node_type()
    }
}

/// Probabilistic certainty attached to an atom.
///
/// Both components always lie in [0, 1]; every constructor, including
/// deserialization, clamps.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawTruthValue")]
pub struct TruthValue {
    strength: f64,
    confidence: f64,
}

#[derive(Deserialize)]
struct RawTruthValue {
    strength: f64,
    confidence: f64,
}

impl From<RawTruthValue> for TruthValue {
    fn from(raw: RawTruthValue) -> Self {
        Self::new(raw.strength, raw.confidence)
    }
}

impl TruthValue {
    /// Build a truth value, clamping both components into [0, 1].
    /// NaN components collapse to 0.
    pub fn new(strength: f64, confidence: f64) -> Self {
        Self {
            strength: clamp_unit(strength),
            confidence: clamp_unit(confidence),
        }
    }

    /// Probability in [0, 1]
    pub fn strength(&self) -> f64 {
        self.strength
    }

    /// Confidence in [0, 1]
    pub fn confidence(&self) -> f64 {
        self.confidence
    }
}

impl Default for TruthValue {
    fn default() -> Self {
        Self {
            strength: 1.0,
            confidence: 1.0,
        }
    }
}

fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Node or link payload of an atom.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AtomBody {
    Node,
    /// Ordered targets, fixed at construction. Targets may have been removed
    /// from the store since; readers must tolerate dangling ids.
    Link { outgoing: Vec<AtomId> },
}

/// A snapshot of an atom stored in an `AtomStore`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Atom {
    pub id: AtomId,
    pub atom_type: AtomType,
    pub name: String,
    pub truth_value: TruthValue,
    pub body: AtomBody,
}

impl Atom {
    pub(crate) fn node(atom_type: AtomType, name: impl Into<String>) -> Self {
        Self {
            id: AtomId::next(),
            atom_type,
            name: name.into(),
            truth_value: TruthValue::default(),
            body: AtomBody::Node,
        }
    }

    pub(crate) fn link(atom_type: AtomType, name: impl Into<String>, outgoing: Vec<AtomId>) -> Self {
        Self {
            id: AtomId::next(),
            atom_type,
            name: name.into(),
            truth_value: TruthValue::default(),
            body: AtomBody::Link { outgoing },
        }
    }

    pub fn is_node(&self) -> bool {
        matches!(self.body, AtomBody::Node)
    }

    pub fn is_link(&self) -> bool {
        matches!(self.body, AtomBody::Link { .. })
    }

    /// Outgoing set of a link; empty for nodes.
    pub fn outgoing(&self) -> &[AtomId] {
        match &self.body {
            AtomBody::Node => &[],
            AtomBody::Link { outgoing } => outgoing,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_atom_ids_increase_monotonically() {
        let a = Atom::node(AtomType::ConceptNode, "a");
        let b = Atom::node(AtomType::ConceptNode, "b");
        let c = Atom::link(AtomType::InheritanceLink, "c", vec![a.id, b.id]);

        assert!(a.id < b.id);
        assert!(b.id < c.id);
    }

    #[test]
    fn test_truth_value_defaults_to_certain() {
        let tv = TruthValue::default();
        assert_eq!(tv.strength, 1.0);
        assert_eq!(tv.confidence, 1.0);
    }

    #[test]
    fn test_truth_value_is_clamped() {
        let tv = TruthValue::new(1.7, -0.2);
        assert_eq!(tv.strength, 1.0);
        assert_eq!(tv.confidence, 0.0);

        let tv = TruthValue::new(f64::NAN, 0.4);
        assert_eq!(tv.strength, 0.0);
        assert_eq!(tv.confidence, 0.4);
    }

    #[test]
    fn test_deserialized_truth_value_is_clamped() {
        let tv: TruthValue = serde_json::from_str(r#"{"strength": 5.0, "confidence": -3.0}"#).unwrap();
        assert_eq!(tv.strength(), 1.0);
        assert_eq!(tv.confidence(), 0.0);
    }

    #[test]
    fn test_node_and_link_bodies() {
        let node = Atom::node(AtomType::PredicateNode, "likes");
        assert!(node.is_node());
        assert!(!node.is_link());
        assert!(node.outgoing().is_empty());

        let link = Atom::link(AtomType::EvaluationLink, "eval", vec![node.id]);
        assert!(link.is_link());
        assert_eq!(link.outgoing(), &[node.id]);
    }

    #[test]
    fn test_atom_type_kinds() {
        assert!(AtomType::ConceptNode.is_node_type());
        assert!(AtomType::VariableNode.is_node_type());
        assert!(AtomType::SimilarityLink.is_link_type());
        assert!(!AtomType::Link.is_node_type());
    }

    #[test]
    fn test_atom_type_serializes_screaming_snake_case() {
        let json = serde_json::to_string(&AtomType::InheritanceLink).unwrap();
        assert_eq!(json, "\"INHERITANCE_LINK\"");
    }
}
