//! Applicability gate on the document's source path.

use std::rc::Rc;
use std::sync::Arc;

use globset::{Glob, GlobMatcher};
use recast_core::{Cursor, Execution, VisitResult};

use crate::tree::{Document, Xml};
use crate::visitor::XmlVisitor;
use crate::xml_tree_visitor;

/// Marks a document whose source path matches a glob. Used as a recipe's
/// applicability probe: "probe output differs from input" then means "this
/// file is in scope".
pub struct HasSourcePath {
    matcher: GlobMatcher,
}

impl HasSourcePath {
    /// `pattern` is a glob over the document's source path, e.g.
    /// `**/pom.xml`.
    pub fn new(pattern: &str) -> Result<Self, globset::Error> {
        Ok(Self {
            matcher: Glob::new(pattern)?.compile_matcher(),
        })
    }
}

impl XmlVisitor for HasSourcePath {
    fn visit_document(
        &mut self,
        document: Arc<Document>,
        _cursor: &Rc<Cursor>,
        _exec: &mut Execution<Xml>,
    ) -> VisitResult<Arc<Document>> {
        // document-level only; no descent needed
        if self.matcher.is_match(&document.source_path) {
            let markers = document.markers.clone().search_result();
            return Ok(document.with_markers(markers));
        }
        Ok(document)
    }
}

xml_tree_visitor!(HasSourcePath);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use recast_core::{Tree, TreeVisitor};

    #[test]
    fn matching_path_is_marked() {
        let doc = parse("module/pom.xml", "<project/>").unwrap();
        let mut exec = Execution::new();
        let out = HasSourcePath::new("**/pom.xml")
            .unwrap()
            .visit_root(doc.clone(), &mut exec)
            .unwrap();
        assert!(out.markers().is_search_result());
        assert_ne!(out, doc);
    }

    #[test]
    fn non_matching_path_passes_through_unchanged() {
        let doc = parse("settings.xml", "<settings/>").unwrap();
        let mut exec = Execution::new();
        let out = HasSourcePath::new("**/pom.xml")
            .unwrap()
            .visit_root(doc.clone(), &mut exec)
            .unwrap();
        assert!(out.ptr_eq(&doc));
    }

    #[test]
    fn marking_twice_adds_one_marker() {
        let doc = parse("pom.xml", "<project/>").unwrap();
        let mut exec = Execution::new();
        let mut gate = HasSourcePath::new("pom.xml").unwrap();
        let once = gate.visit_root(doc, &mut exec).unwrap();
        let twice = gate.visit_root(once.clone(), &mut exec).unwrap();
        assert!(twice.ptr_eq(&once));
        assert_eq!(twice.markers().entries().len(), 1);
    }

    #[test]
    fn invalid_glob_is_an_error() {
        assert!(HasSourcePath::new("a{b").is_err());
    }
}
