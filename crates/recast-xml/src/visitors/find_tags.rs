//! Mark tags matching an absolute element path.

use std::rc::Rc;
use std::sync::Arc;

use recast_core::{Cursor, Execution, VisitResult};

use crate::tree::{Tag, Xml};
use crate::visitor::{walk_tag, XmlVisitor};
use crate::xml_tree_visitor;

/// Pure search: tags whose root-to-self name path equals the configured
/// path get a `SearchResult` marker. Shape is never changed, so a document
/// this visitor "changes" differs only in markers.
pub struct FindTagsVisitor {
    path: Vec<String>,
}

impl FindTagsVisitor {
    /// `path` is slash-separated from the root element, e.g.
    /// `/project/dependencies/dependency`. The leading slash is optional.
    pub fn new(path: &str) -> Self {
        Self {
            path: path
                .trim_matches('/')
                .split('/')
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect(),
        }
    }

    fn matches(&self, cursor: &Cursor) -> bool {
        // names from the current tag up to the root, compared against the
        // configured path reversed
        let mut expected = self.path.iter().rev();
        let mut frame = Some(cursor);
        while let Some(f) = frame {
            if let Some(Xml::Tag(t)) = f.node::<Xml>() {
                match expected.next() {
                    Some(name) if *name == t.name => {}
                    _ => return false,
                }
            }
            frame = f.parent().map(|p| p.as_ref());
        }
        expected.next().is_none()
    }
}

impl XmlVisitor for FindTagsVisitor {
    fn visit_tag(
        &mut self,
        tag: Arc<Tag>,
        cursor: &Rc<Cursor>,
        exec: &mut Execution<Xml>,
    ) -> VisitResult<Arc<Tag>> {
        let tag = walk_tag(self, tag, cursor, exec)?;
        if self.matches(cursor) {
            let markers = tag.markers.clone().search_result();
            return Ok(tag.with_markers(markers));
        }
        Ok(tag)
    }
}

xml_tree_visitor!(FindTagsVisitor);
