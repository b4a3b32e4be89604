//! The recipe contract: a named, stateless transformation.
//!
//! A recipe is a visitor factory. All state lives in the visitor instances
//! it produces; the orchestration loop asks for a fresh visitor per pass,
//! which is what makes re-running a recipe over an already-transformed tree
//! safe and cheap.

use crate::tree::Tree;
use crate::visitor::TreeVisitor;

/// A named transformation over one node family.
pub trait Recipe<N: Tree> {
    /// Stable machine-readable name, used in run reports and logs.
    fn name(&self) -> &str;

    /// One-line human description.
    fn description(&self) -> &str {
        ""
    }

    /// Produce a fresh visitor for one pass. Called once per pass; the
    /// returned visitor is never reused across trees.
    fn visitor(&self) -> Box<dyn TreeVisitor<Node = N>>;

    /// Optional applicability probe, run once per tree per recipe.
    ///
    /// The recipe applies to a tree iff the probe's output differs from its
    /// input; a probe that only adds markers therefore counts as "applies".
    /// `None` means the recipe applies to every tree.
    fn applicable_test(&self) -> Option<Box<dyn TreeVisitor<Node = N>>> {
        None
    }
}
