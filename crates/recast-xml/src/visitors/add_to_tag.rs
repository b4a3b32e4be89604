//! Insert a child element into one specific tag.

use std::cmp::Ordering;
use std::rc::Rc;
use std::sync::Arc;

use recast_core::{Cursor, Execution, TreeId, VisitResult};

use crate::format::{child_indent, line_indent, reindent};
use crate::tree::{Closing, Tag, Xml};
use crate::visitor::{walk_tag, XmlVisitor};
use crate::xml_tree_visitor;

/// Appends `tag_to_add` to the content of the scope tag.
///
/// A self-closing scope gets a synthesized closing tag first. The inserted
/// subtree is re-indented for its position; nothing outside it is
/// reformatted. With an ordering, the child is inserted before the first
/// existing child that should follow it; without one it goes last.
///
/// Adding is idempotent: when the scope already contains a child with the
/// same shape, the tree is returned unchanged.
pub struct AddToTagVisitor {
    scope_id: TreeId,
    tag_to_add: Arc<Tag>,
    ordering: Option<Box<dyn Fn(&Tag, &Tag) -> Ordering>>,
}

impl AddToTagVisitor {
    pub fn new(scope: &Arc<Tag>, tag_to_add: Arc<Tag>) -> Self {
        Self {
            scope_id: scope.id,
            tag_to_add,
            ordering: None,
        }
    }

    /// Keep the scope's children sorted under `ordering`.
    pub fn with_ordering(mut self, ordering: impl Fn(&Tag, &Tag) -> Ordering + 'static) -> Self {
        self.ordering = Some(Box::new(ordering));
        self
    }
}

impl XmlVisitor for AddToTagVisitor {
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
        if tag.children().any(|c| same_shape(c, &self.tag_to_add)) {
            return Ok(tag);
        }

        let added = Xml::Tag(reindent(&self.tag_to_add, &child_indent(&tag)));

        let mut next = (*tag).clone();
        let mut content = next.content.take().unwrap_or_default();
        let at = match &self.ordering {
            Some(cmp) => content
                .iter()
                .position(|c| match c {
                    Xml::Tag(existing) => {
                        cmp(&self.tag_to_add, existing) == Ordering::Less
                    }
                    _ => false,
                })
                .unwrap_or(content.len()),
            None => content.len(),
        };
        content.insert(at, added);
        next.content = Some(content);
        if next.closing.is_none() {
            next.before_tag_delimiter.clear();
            next.closing = Some(Closing {
                id: TreeId::random(),
                prefix: format!("\n{}", line_indent(&next.prefix)),
                name: next.name.clone(),
                before_tag_delimiter: String::new(),
            });
        }
        Ok(Arc::new(next))
    }
}

xml_tree_visitor!(AddToTagVisitor);

/// Same name, same value, same child shapes. Identity and formatting are
/// ignored.
fn same_shape(a: &Tag, b: &Tag) -> bool {
    a.name == b.name
        && a.value() == b.value()
        && a.children().count() == b.children().count()
        && a.children()
            .zip(b.children())
            .all(|(ca, cb)| same_shape(ca, cb))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use recast_core::TreeVisitor;

    fn root_tag(doc: &Xml) -> Arc<Tag> {
        Arc::clone(doc.as_document().unwrap().root.as_tag().unwrap())
    }

    #[test]
    fn appends_with_sibling_indentation() {
        let doc = parse(
            "pom.xml",
            "<dependency>\n  <groupId>g</groupId>\n</dependency>\n",
        )
        .unwrap();
        let scope = root_tag(&doc);
        let add = Tag::build("<version>1.0</version>").unwrap();
        let mut exec = Execution::new();
        let out = AddToTagVisitor::new(&scope, add)
            .visit_root(doc, &mut exec)
            .unwrap();
        assert_eq!(
            out.print(),
            "<dependency>\n  <groupId>g</groupId>\n  <version>1.0</version>\n</dependency>\n"
        );
    }

    #[test]
    fn synthesizes_a_closing_for_a_self_closing_scope() {
        let doc = parse("pom.xml", "<project>\n  <dependencies/>\n</project>\n").unwrap();
        let scope = Arc::clone(root_tag(&doc).child("dependencies").unwrap());
        let add = Tag::build("<dependency><groupId>g</groupId></dependency>").unwrap();
        let mut exec = Execution::new();
        let out = AddToTagVisitor::new(&scope, add)
            .visit_root(doc, &mut exec)
            .unwrap();
        assert_eq!(
            out.print(),
            "<project>\n  <dependencies>\n      <dependency>\n          <groupId>g</groupId>\n      </dependency>\n  </dependencies>\n</project>\n"
        );
    }

    #[test]
    fn ordering_places_the_child_before_its_successor() {
        let doc = parse(
            "pom.xml",
            "<deps>\n  <a/>\n  <c/>\n</deps>\n",
        )
        .unwrap();
        let scope = root_tag(&doc);
        let add = Tag::build("<b/>").unwrap();
        let mut exec = Execution::new();
        let out = AddToTagVisitor::new(&scope, add)
            .with_ordering(|l, r| l.name.cmp(&r.name))
            .visit_root(doc, &mut exec)
            .unwrap();
        assert_eq!(out.print(), "<deps>\n  <a/>\n  <b/>\n  <c/>\n</deps>\n");
    }

    #[test]
    fn adding_an_existing_child_is_a_no_op() {
        let doc = parse(
            "pom.xml",
            "<dependency>\n  <version>1.0</version>\n</dependency>\n",
        )
        .unwrap();
        let scope = root_tag(&doc);
        let add = Tag::build("<version>1.0</version>").unwrap();
        let mut exec = Execution::new();
        let out = AddToTagVisitor::new(&scope, add)
            .visit_root(doc.clone(), &mut exec)
            .unwrap();
        assert!(out.ptr_eq(&doc));
    }
}
