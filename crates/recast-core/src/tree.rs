//! The tree contract every recast node family implements.
//!
//! # Node Identity
//!
//! [`TreeId`] provides stable identity for tree nodes. Identity is assigned
//! randomly at construction and preserved across `with_*` edits, so the
//! engine can tell "the same logical node, possibly rewritten" from "a
//! different node". Two trees that are structurally identical but carry
//! different ids are *not* interchangeable: identity is the unit used for
//! scope matching and for detecting already-transformed subtrees.

use std::fmt;

use serde::Serialize;
use uuid::Uuid;

use crate::marker::Markers;

/// A stable, random identifier for a tree node.
///
/// Ids persist across `with_*` edits; a freshly constructed node gets a
/// fresh id. Equality of ids answers "is this the same logical node",
/// independent of structural equality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TreeId(Uuid);

impl TreeId {
    /// Generate a fresh random id.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for TreeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The minimal capability surface the generic engine operates over.
///
/// Every node family exposes a stable identity, a [`Markers`] collection,
/// and an identity-preserving markers transformer. Nodes never mutate a
/// field in place; `with_*` transformers return a new node with exactly one
/// field changed and the identity preserved.
///
/// `PartialEq` is structural equality (value equality for consumers);
/// [`Tree::id`] comparison is identity equality (what the engine uses for
/// scope checks).
pub trait Tree: Clone + PartialEq + 'static {
    /// The node's stable identity.
    fn id(&self) -> TreeId;

    /// The node's marker collection.
    fn markers(&self) -> &Markers;

    /// Replace the marker collection, preserving identity.
    fn with_markers(self, markers: Markers) -> Self;

    /// Identity test against another node, regardless of its family.
    ///
    /// This is the check scope-targeted visitors use to recognize the node
    /// they were constructed for.
    fn is_scope<T: Tree>(&self, other: &T) -> bool {
        self.id() == other.id()
    }
}
