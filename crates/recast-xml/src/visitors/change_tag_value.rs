//! Replace the text value of one specific tag.

use std::rc::Rc;
use std::sync::Arc;

use recast_core::{Cursor, Execution, TreeId, VisitResult};

use crate::tree::{CharData, Closing, Tag, Xml};
use crate::visitor::{walk_tag, XmlVisitor};
use crate::xml_tree_visitor;

/// Sets the text content of the tag it was scoped to, preserving the
/// whitespace that surrounded the previous value. A self-closing scope is
/// expanded to an open/close pair.
///
/// The scope is an identity match: only the one tag this visitor was built
/// for is touched, never other tags with the same name.
pub struct ChangeTagValueVisitor {
    scope_id: TreeId,
    value: String,
}

impl ChangeTagValueVisitor {
    pub fn new(scope: &Arc<Tag>, value: impl Into<String>) -> Self {
        Self::for_id(scope.id, value)
    }

    /// Scope by id alone; used when the visitor outlives the tag value it
    /// was derived from (deferred passes).
    pub fn for_id(scope_id: TreeId, value: impl Into<String>) -> Self {
        Self {
            scope_id,
            value: value.into(),
        }
    }
}

impl XmlVisitor for ChangeTagValueVisitor {
    fn visit_tag(
        &mut self,
        tag: Arc<Tag>,
        cursor: &Rc<Cursor>,
        exec: &mut Execution<Xml>,
    ) -> VisitResult<Arc<Tag>> {
        let tag = walk_tag(self, tag, cursor, exec)?;
        if tag.id != self.scope_id {
            return Ok(tag);
        }

        let mut lead = String::new();
        let mut trail = String::new();
        let mut existing: Option<Arc<CharData>> = None;
        if let Some([Xml::CharData(c)]) = tag.content.as_deref() {
            let text = &c.text;
            let trimmed = text.trim();
            if trimmed == self.value {
                return Ok(tag);
            }
            if !trimmed.is_empty() {
                let start = text.len() - text.trim_start().len();
                let end = text.trim_end().len();
                lead = text[..start].to_string();
                trail = text[end..].to_string();
            }
            existing = Some(Arc::clone(c));
        }

        let text = format!("{lead}{}{trail}", self.value);
        let char_data = match existing {
            Some(c) => c.with_text(text),
            None => Arc::new(CharData::new(text)),
        };

        let mut next = (*tag).clone();
        next.content = Some(vec![Xml::CharData(char_data)]);
        if next.closing.is_none() {
            next.before_tag_delimiter.clear();
            next.closing = Some(Closing::new(&next.name));
        }
        Ok(Arc::new(next))
    }
}

xml_tree_visitor!(ChangeTagValueVisitor);
