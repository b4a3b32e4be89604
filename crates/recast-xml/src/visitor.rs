//! Double dispatch over XML nodes.
//!
//! [`XmlVisitor`] has one method per node kind. Every default visits the
//! node's children and reassembles the parent only when a child actually
//! came back as a different allocation; an untouched subtree flows through
//! as the very same `Arc` at every level. That is the no-op propagation
//! contract: an overriding method that changes nothing must return the node
//! it was given.
//!
//! [`walk`] performs the dispatch and pushes one cursor frame per node.
//! The [`xml_tree_visitor!`] macro generates the [`recast_core::TreeVisitor`]
//! bridge impl that lets a concrete `XmlVisitor` ride the generic engine
//! (recipes, deferred queues, the scheduler).

use std::rc::Rc;
use std::sync::Arc;

use recast_core::{Cursor, Descend, Execution, VisitResult};

use crate::tree::{Attribute, CharData, Comment, Document, Prolog, Tag, Xml};

/// Per-kind visit methods with child-walking defaults.
pub trait XmlVisitor {
    /// Runs before dispatch; return [`Descend::Skip`] to leave the subtree
    /// unvisited.
    fn pre_visit(
        &mut self,
        xml: Xml,
        _cursor: &Rc<Cursor>,
        _exec: &mut Execution<Xml>,
    ) -> VisitResult<Descend<Xml>> {
        Ok(Descend::Children(xml))
    }

    /// Runs after dispatch, on the (possibly rewritten) node.
    fn post_visit(
        &mut self,
        xml: Xml,
        _cursor: &Rc<Cursor>,
        _exec: &mut Execution<Xml>,
    ) -> VisitResult<Xml> {
        Ok(xml)
    }

    fn visit_document(
        &mut self,
        document: Arc<Document>,
        cursor: &Rc<Cursor>,
        exec: &mut Execution<Xml>,
    ) -> VisitResult<Arc<Document>> {
        walk_document(self, document, cursor, exec)
    }

    fn visit_prolog(
        &mut self,
        prolog: Arc<Prolog>,
        _cursor: &Rc<Cursor>,
        _exec: &mut Execution<Xml>,
    ) -> VisitResult<Arc<Prolog>> {
        Ok(prolog)
    }

    fn visit_tag(
        &mut self,
        tag: Arc<Tag>,
        cursor: &Rc<Cursor>,
        exec: &mut Execution<Xml>,
    ) -> VisitResult<Arc<Tag>> {
        walk_tag(self, tag, cursor, exec)
    }

    fn visit_attribute(
        &mut self,
        attribute: Arc<Attribute>,
        _cursor: &Rc<Cursor>,
        _exec: &mut Execution<Xml>,
    ) -> VisitResult<Arc<Attribute>> {
        Ok(attribute)
    }

    fn visit_char_data(
        &mut self,
        char_data: Arc<CharData>,
        _cursor: &Rc<Cursor>,
        _exec: &mut Execution<Xml>,
    ) -> VisitResult<Arc<CharData>> {
        Ok(char_data)
    }

    fn visit_comment(
        &mut self,
        comment: Arc<Comment>,
        _cursor: &Rc<Cursor>,
        _exec: &mut Execution<Xml>,
    ) -> VisitResult<Arc<Comment>> {
        Ok(comment)
    }
}

/// Dispatch one node: push a cursor frame, run `pre_visit`, the per-kind
/// method, then `post_visit`.
pub fn walk<V: XmlVisitor + ?Sized>(
    visitor: &mut V,
    xml: Xml,
    cursor: &Rc<Cursor>,
    exec: &mut Execution<Xml>,
) -> VisitResult<Xml> {
    let frame = cursor.descend(&xml);
    let xml = match visitor.pre_visit(xml, &frame, exec)? {
        Descend::Skip(x) => x,
        Descend::Children(x) => match x {
            Xml::Document(d) => Xml::Document(visitor.visit_document(d, &frame, exec)?),
            Xml::Prolog(p) => Xml::Prolog(visitor.visit_prolog(p, &frame, exec)?),
            Xml::Tag(t) => Xml::Tag(visitor.visit_tag(t, &frame, exec)?),
            Xml::Attribute(a) => Xml::Attribute(visitor.visit_attribute(a, &frame, exec)?),
            Xml::CharData(c) => Xml::CharData(visitor.visit_char_data(c, &frame, exec)?),
            Xml::Comment(c) => Xml::Comment(visitor.visit_comment(c, &frame, exec)?),
        },
    };
    visitor.post_visit(xml, &frame, exec)
}

/// Default document traversal: prolog, then the root element.
pub fn walk_document<V: XmlVisitor + ?Sized>(
    visitor: &mut V,
    document: Arc<Document>,
    cursor: &Rc<Cursor>,
    exec: &mut Execution<Xml>,
) -> VisitResult<Arc<Document>> {
    let prolog = match &document.prolog {
        Some(p) => Some(walk(visitor, p.clone(), cursor, exec)?),
        None => None,
    };
    let root = walk(visitor, document.root.clone(), cursor, exec)?;
    Ok(document.with_prolog(prolog).with_root(root))
}

/// Default tag traversal: attributes in order, then content in order.
pub fn walk_tag<V: XmlVisitor + ?Sized>(
    visitor: &mut V,
    tag: Arc<Tag>,
    cursor: &Rc<Cursor>,
    exec: &mut Execution<Xml>,
) -> VisitResult<Arc<Tag>> {
    let mut out = Arc::clone(&tag);
    if let Some(attributes) = visit_list(visitor, &tag.attributes, cursor, exec)? {
        out = out.with_attributes(attributes);
    }
    if let Some(content) = &tag.content {
        if let Some(content) = visit_list(visitor, content, cursor, exec)? {
            out = out.with_content(Some(content));
        }
    }
    Ok(out)
}

/// Visit each element of a child list. Returns `None` when every child came
/// back as the same allocation, so callers keep the original buffer.
fn visit_list<V: XmlVisitor + ?Sized>(
    visitor: &mut V,
    ls: &[Xml],
    cursor: &Rc<Cursor>,
    exec: &mut Execution<Xml>,
) -> VisitResult<Option<Vec<Xml>>> {
    let mut out: Option<Vec<Xml>> = None;
    for (i, item) in ls.iter().enumerate() {
        let visited = walk(visitor, item.clone(), cursor, exec)?;
        match out.as_mut() {
            Some(v) => v.push(visited),
            None if !visited.ptr_eq(item) => {
                let mut v = ls[..i].to_vec();
                v.push(visited);
                out = Some(v);
            }
            None => {}
        }
    }
    Ok(out)
}

/// Generate the [`recast_core::TreeVisitor`] impl routing `visit` through
/// [`walk`]. The second form installs a per-source `is_acceptable` gate;
/// the predicate receives `&self` and the source node.
#[macro_export]
macro_rules! xml_tree_visitor {
    ($ty:ty) => {
        impl ::recast_core::TreeVisitor for $ty {
            type Node = $crate::Xml;

            fn visit(
                &mut self,
                tree: $crate::Xml,
                cursor: &::std::rc::Rc<::recast_core::Cursor>,
                exec: &mut ::recast_core::Execution<$crate::Xml>,
            ) -> ::recast_core::VisitResult<$crate::Xml> {
                $crate::visitor::walk(self, tree, cursor, exec)
            }
        }
    };
    ($ty:ty, acceptable = $pred:expr) => {
        impl ::recast_core::TreeVisitor for $ty {
            type Node = $crate::Xml;

            fn is_acceptable(&self, source: &$crate::Xml) -> bool {
                let pred = $pred;
                pred(self, source)
            }

            fn visit(
                &mut self,
                tree: $crate::Xml,
                cursor: &::std::rc::Rc<::recast_core::Cursor>,
                exec: &mut ::recast_core::Execution<$crate::Xml>,
            ) -> ::recast_core::VisitResult<$crate::Xml> {
                $crate::visitor::walk(self, tree, cursor, exec)
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use recast_core::TreeVisitor;

    fn parse_xml(input: &str) -> Xml {
        parse("test.xml", input).unwrap()
    }

    /// Rewrites the text of every `<version>` tag.
    struct SetVersionText {
        value: &'static str,
    }

    impl XmlVisitor for SetVersionText {
        fn visit_char_data(
            &mut self,
            char_data: Arc<CharData>,
            cursor: &Rc<Cursor>,
            _exec: &mut Execution<Xml>,
        ) -> VisitResult<Arc<CharData>> {
            let in_version = cursor
                .parent()
                .and_then(|p| p.node::<Xml>())
                .and_then(Xml::as_tag)
                .is_some_and(|t| t.name == "version");
            if in_version {
                return Ok(char_data.with_text(self.value.to_string()));
            }
            Ok(char_data)
        }
    }

    xml_tree_visitor!(SetVersionText);

    /// Never descends into tags named `skip`.
    struct SkipTagged;

    impl XmlVisitor for SkipTagged {
        fn pre_visit(
            &mut self,
            xml: Xml,
            _cursor: &Rc<Cursor>,
            _exec: &mut Execution<Xml>,
        ) -> VisitResult<Descend<Xml>> {
            if xml.as_tag().is_some_and(|t| t.name == "skip") {
                return Ok(Descend::Skip(xml));
            }
            Ok(Descend::Children(xml))
        }

        fn visit_char_data(
            &mut self,
            char_data: Arc<CharData>,
            _cursor: &Rc<Cursor>,
            _exec: &mut Execution<Xml>,
        ) -> VisitResult<Arc<CharData>> {
            Ok(char_data.with_text(char_data.text.to_uppercase()))
        }
    }

    xml_tree_visitor!(SkipTagged);

    mod no_op_propagation {
        use super::*;

        #[test]
        fn unchanged_tree_keeps_its_allocation() {
            let doc = parse_xml("<project><name>x</name></project>");
            let mut exec = Execution::new();
            let out = SetVersionText { value: "2.0" }
                .visit_root(doc.clone(), &mut exec)
                .unwrap();
            assert!(out.ptr_eq(&doc));
        }

        #[test]
        fn untouched_siblings_keep_their_allocations() {
            let doc =
                parse_xml("<project><version>1.0</version><name>x</name></project>");
            let mut exec = Execution::new();
            let out = SetVersionText { value: "2.0" }
                .visit_root(doc.clone(), &mut exec)
                .unwrap();
            assert!(!out.ptr_eq(&doc));

            let before = doc.as_document().unwrap().root.as_tag().unwrap();
            let after = out.as_document().unwrap().root.as_tag().unwrap();
            let before_children = before.content.as_ref().unwrap();
            let after_children = after.content.as_ref().unwrap();
            assert!(!after_children[0].ptr_eq(&before_children[0]));
            assert!(after_children[1].ptr_eq(&before_children[1]));
        }

        #[test]
        fn second_run_is_a_no_op() {
            let doc = parse_xml("<project><version>1.0</version></project>");
            let mut exec = Execution::new();
            let mut visitor = SetVersionText { value: "2.0" };
            let once = visitor.visit_root(doc, &mut exec).unwrap();
            let twice = visitor.visit_root(once.clone(), &mut exec).unwrap();
            assert!(twice.ptr_eq(&once));
        }
    }

    mod dispatch {
        use super::*;

        #[test]
        fn edit_is_reflected_in_print() {
            let doc = parse_xml("<project>\n  <version>1.0</version>\n</project>\n");
            let mut exec = Execution::new();
            let out = SetVersionText { value: "2.0" }
                .visit_root(doc, &mut exec)
                .unwrap();
            assert_eq!(out.print(), "<project>\n  <version>2.0</version>\n</project>\n");
        }

        #[test]
        fn pre_visit_skip_shields_the_subtree() {
            let doc = parse_xml("<a><skip>low</skip><b>low</b></a>");
            let mut exec = Execution::new();
            let out = SkipTagged.visit_root(doc, &mut exec).unwrap();
            assert_eq!(out.print(), "<a><skip>low</skip><b>LOW</b></a>");
        }
    }
}
