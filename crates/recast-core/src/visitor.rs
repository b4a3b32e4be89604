//! The visitor contract and per-run execution context.
//!
//! A [`TreeVisitor`] receives an owned node and returns a node: the same
//! value when nothing changed, a rewritten one when something did. The
//! engine never sees inside nodes; language crates route [`TreeVisitor::visit`]
//! into their own typed walkers and reassemble parents only when a child
//! actually changed.
//!
//! [`Execution`] travels down every visit of a run. It owns the deferred
//! visitor queue: a visitor that discovers work requiring a separate
//! whole-tree pass enqueues it with [`Execution::do_after_visit`], and the
//! orchestration loop drains the queue after the current pass completes.

use std::any::Any;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

use crate::cursor::{Cursor, MissingAncestorError};
use crate::tree::Tree;

/// Pre-visit control flow: keep descending or skip the subtree.
///
/// Either way the (possibly rewritten) node is carried along, so a visitor
/// can both edit a node and declare its children off-limits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Descend<T> {
    /// Visit the node's children.
    Children(T),
    /// Do not descend; the node is taken as-is.
    Skip(T),
}

impl<T> Descend<T> {
    /// The carried node, regardless of the control decision.
    pub fn into_inner(self) -> T {
        match self {
            Descend::Children(t) | Descend::Skip(t) => t,
        }
    }
}

/// Failure of a single visit pass.
///
/// These are captured by the orchestration loop per (source, recipe) pair;
/// they never abort a whole run.
#[derive(Debug, Clone, thiserror::Error)]
pub enum VisitError {
    /// A visitor required an enclosing node the cursor did not have.
    #[error(transparent)]
    MissingAncestor(#[from] MissingAncestorError),

    /// A recipe-level precondition failed mid-pass.
    #[error("recipe {recipe}: {message}")]
    Recipe {
        /// Name of the recipe whose visitor failed.
        recipe: String,
        /// What went wrong.
        message: String,
    },

    /// Any other visit failure.
    #[error("{0}")]
    Adhoc(String),
}

impl VisitError {
    /// Convenience constructor for ad-hoc failures.
    pub fn adhoc(message: impl Into<String>) -> Self {
        VisitError::Adhoc(message.into())
    }
}

/// Result alias used throughout the visit path.
pub type VisitResult<T> = Result<T, VisitError>;

/// A tree transformation pass.
///
/// Implementations must uphold no-op propagation: when a visit changes
/// nothing it returns the value it was given, so callers can detect "no
/// change" structurally and re-running a converged visitor is free.
pub trait TreeVisitor {
    /// The node family this visitor operates on.
    type Node: Tree;

    /// Cheap per-source gate, checked once before any node is visited.
    ///
    /// A source that is not acceptable is returned unchanged without
    /// per-node work.
    fn is_acceptable(&self, _source: &Self::Node) -> bool {
        true
    }

    /// Visit one node at a cursor position.
    fn visit(
        &mut self,
        tree: Self::Node,
        cursor: &Rc<Cursor>,
        exec: &mut Execution<Self::Node>,
    ) -> VisitResult<Self::Node>;

    /// Top-level entry: gate on [`TreeVisitor::is_acceptable`], then visit
    /// under a fresh root cursor.
    ///
    /// Cursors never survive past this call; every pass starts from an
    /// empty path and empty message stores.
    fn visit_root(
        &mut self,
        tree: Self::Node,
        exec: &mut Execution<Self::Node>,
    ) -> VisitResult<Self::Node> {
        if !self.is_acceptable(&tree) {
            return Ok(tree);
        }
        let root = Cursor::root();
        self.visit(tree, &root, exec)
    }

    /// Entry for positions where a node may be absent. `None` passes
    /// through untouched.
    fn visit_optional(
        &mut self,
        tree: Option<Self::Node>,
        cursor: &Rc<Cursor>,
        exec: &mut Execution<Self::Node>,
    ) -> VisitResult<Option<Self::Node>> {
        match tree {
            Some(t) => self.visit(t, cursor, exec).map(Some),
            None => Ok(None),
        }
    }
}

/// Context for one orchestrated run, threaded through every visit.
pub struct Execution<N: Tree> {
    cycle: usize,
    after_visits: VecDeque<Box<dyn TreeVisitor<Node = N>>>,
    messages: HashMap<String, Rc<dyn Any>>,
}

impl<N: Tree> Execution<N> {
    /// A fresh context at cycle 1.
    pub fn new() -> Self {
        Self {
            cycle: 1,
            after_visits: VecDeque::new(),
            messages: HashMap::new(),
        }
    }

    /// The current orchestration cycle, 1-based.
    pub fn cycle(&self) -> usize {
        self.cycle
    }

    pub(crate) fn set_cycle(&mut self, cycle: usize) {
        self.cycle = cycle;
    }

    /// Enqueue a visitor to run as an additional whole-tree pass after the
    /// current pass completes. FIFO: visitors run in the order enqueued,
    /// each over the full result of its predecessors, each with a fresh
    /// cursor.
    pub fn do_after_visit(&mut self, visitor: Box<dyn TreeVisitor<Node = N>>) {
        self.after_visits.push_back(visitor);
    }

    /// Whether any deferred visitors are pending.
    pub fn has_after_visits(&self) -> bool {
        !self.after_visits.is_empty()
    }

    /// Drain the deferred queue in FIFO order.
    ///
    /// Owned by the orchestration loop; a deferred visitor may itself
    /// enqueue more, which land in the next drain.
    pub fn take_after_visits(&mut self) -> Vec<Box<dyn TreeVisitor<Node = N>>> {
        self.after_visits.drain(..).collect()
    }

    /// Store a run-scoped message, visible to every visit of the run.
    pub fn put_message<V: Any>(&mut self, key: impl Into<String>, value: V) {
        self.messages.insert(key.into(), Rc::new(value));
    }

    /// A run-scoped message, if present and of type `V`.
    pub fn get_message<V: Any + Clone>(&self, key: &str) -> Option<V> {
        self.messages
            .get(key)
            .and_then(|v| v.downcast_ref::<V>())
            .cloned()
    }
}

impl<N: Tree> Default for Execution<N> {
    fn default() -> Self {
        Self::new()
    }
}
