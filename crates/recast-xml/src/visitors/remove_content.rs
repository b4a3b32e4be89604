//! Delete one specific node from its parent's content.

use std::rc::Rc;
use std::sync::Arc;

use recast_core::{flat_map, Cursor, Execution, Transform, TreeId, VisitResult};

use crate::tree::{Tag, Xml};
use crate::visitor::{walk_tag, XmlVisitor};
use crate::xml_tree_visitor;

/// Removes the scope node (and its whole subtree, prefix included) from
/// the content list of its parent. Identity-scoped like the other edit
/// visitors; a document containing no node with the scope id passes
/// through unchanged.
pub struct RemoveContentVisitor {
    scope_id: TreeId,
}

impl RemoveContentVisitor {
    pub fn new(scope: &Arc<Tag>) -> Self {
        Self { scope_id: scope.id }
    }
}

impl XmlVisitor for RemoveContentVisitor {
    fn visit_tag(
        &mut self,
        tag: Arc<Tag>,
        cursor: &Rc<Cursor>,
        exec: &mut Execution<Xml>,
    ) -> VisitResult<Arc<Tag>> {
        let tag = walk_tag(self, tag, cursor, exec)?;
        let holds_scope = tag
            .children()
            .any(|c| c.id == self.scope_id);
        if !holds_scope {
            return Ok(tag);
        }
        let content = tag.content.clone().unwrap_or_default();
        let scope_id = self.scope_id;
        let content = flat_map(content, |_, c| match &c {
            Xml::Tag(t) if t.id == scope_id => Transform::Remove,
            _ => Transform::Keep(c),
        });
        Ok(tag.with_content(Some(content)))
    }
}

xml_tree_visitor!(RemoveContentVisitor);
