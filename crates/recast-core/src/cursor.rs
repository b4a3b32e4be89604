//! The cursor: a visitor's position in the tree during one pass.
//!
//! A [`Cursor`] is an immutable linked list of frames, one frame per node on
//! the path from the root to the node currently being visited. Frames are
//! shared via `Rc`; descending into a child allocates one new frame and
//! leaves every ancestor frame untouched, so sibling subtrees can never
//! observe each other's positions.
//!
//! Each frame also carries a message store scoped to that frame. Messages
//! are the sanctioned way for a visit of a parent to leave state for visits
//! of its descendants within the same pass; they never outlive the pass
//! because the root cursor is rebuilt for every top-level visit.

use std::any::Any;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::tree::{Tree, TreeId};

/// Error for cursor positions that require an ancestor that is not there.
#[derive(Debug, Clone, thiserror::Error)]
#[error("cursor at {at} has no parent frame")]
pub struct MissingAncestorError {
    /// Rendering of the frame the lookup started from.
    pub at: String,
}

enum CursorValue {
    Root,
    Node {
        id: TreeId,
        node: Rc<dyn Any>,
    },
}

/// One frame of the visit path, linked to its parent frame.
pub struct Cursor {
    parent: Option<Rc<Cursor>>,
    value: CursorValue,
    messages: RefCell<HashMap<String, Rc<dyn Any>>>,
}

impl Cursor {
    /// The sentinel frame above the top-level node of a pass.
    pub fn root() -> Rc<Self> {
        Rc::new(Self {
            parent: None,
            value: CursorValue::Root,
            messages: RefCell::new(HashMap::new()),
        })
    }

    /// Push a frame for `node`, keeping `self` as the parent.
    pub fn descend<T: Tree>(self: &Rc<Self>, node: &T) -> Rc<Cursor> {
        Rc::new(Cursor {
            parent: Some(Rc::clone(self)),
            value: CursorValue::Node {
                id: node.id(),
                node: Rc::new(node.clone()),
            },
            messages: RefCell::new(HashMap::new()),
        })
    }

    /// Whether this is the sentinel root frame.
    pub fn is_root(&self) -> bool {
        matches!(self.value, CursorValue::Root)
    }

    /// The node held by this frame, if it is of type `T`.
    pub fn node<T: Tree>(&self) -> Option<&T> {
        match &self.value {
            CursorValue::Root => None,
            CursorValue::Node { node, .. } => node.downcast_ref::<T>(),
        }
    }

    /// The id of the node held by this frame.
    pub fn node_id(&self) -> Option<TreeId> {
        match &self.value {
            CursorValue::Root => None,
            CursorValue::Node { id, .. } => Some(*id),
        }
    }

    /// The parent frame, if any.
    pub fn parent(&self) -> Option<&Rc<Cursor>> {
        self.parent.as_ref()
    }

    /// The parent frame, failing fast when the position has none.
    ///
    /// Visitors that semantically require an enclosing node (a tag being
    /// removed from its parent's content, say) use this instead of silently
    /// doing nothing at the root.
    pub fn parent_or_err(&self) -> Result<&Rc<Cursor>, MissingAncestorError> {
        self.parent.as_ref().ok_or_else(|| MissingAncestorError {
            at: self.path(),
        })
    }

    /// The nearest frame, starting at this one, holding a node of type `T`.
    ///
    /// Returns a clone; the cursor keeps only pass-scoped copies.
    pub fn first_enclosing<T: Tree>(&self) -> Option<T> {
        self.first_enclosing_where(|_| true)
    }

    /// Like [`Cursor::first_enclosing`] with an extra predicate on the node.
    pub fn first_enclosing_where<T: Tree>(&self, mut pred: impl FnMut(&T) -> bool) -> Option<T> {
        let mut frame = Some(self);
        while let Some(f) = frame {
            if let Some(node) = f.node::<T>() {
                if pred(node) {
                    return Some(node.clone());
                }
            }
            frame = f.parent.as_deref();
        }
        None
    }

    /// Store a message on this frame, visible to this frame's subtree.
    pub fn put_message<V: Any>(&self, key: impl Into<String>, value: V) {
        self.messages
            .borrow_mut()
            .insert(key.into(), Rc::new(value));
    }

    /// A message stored on this frame only.
    ///
    /// Returns a clone so the borrow of the store never escapes.
    pub fn get_message<V: Any + Clone>(&self, key: &str) -> Option<V> {
        self.messages
            .borrow()
            .get(key)
            .and_then(|v| v.downcast_ref::<V>())
            .cloned()
    }

    /// The nearest message for `key`, walking upward from this frame.
    pub fn nearest_message<V: Any + Clone>(&self, key: &str) -> Option<V> {
        let mut frame = Some(self);
        while let Some(f) = frame {
            if let Some(v) = f.get_message::<V>(key) {
                return Some(v);
            }
            frame = f.parent.as_deref();
        }
        None
    }

    /// Root-to-current rendering of the frame ids, for diagnostics.
    pub fn path(&self) -> String {
        let mut ids = Vec::new();
        let mut frame = Some(self);
        while let Some(f) = frame {
            match &f.value {
                CursorValue::Root => ids.push("root".to_string()),
                CursorValue::Node { id, .. } => ids.push(id.to_string()),
            }
            frame = f.parent.as_deref();
        }
        ids.reverse();
        ids.join(" > ")
    }
}

impl fmt::Debug for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cursor").field("path", &self.path()).finish()
    }
}
