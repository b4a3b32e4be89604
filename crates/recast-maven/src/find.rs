//! Locate declarations of a dependency.

use std::rc::Rc;
use std::sync::Arc;

use recast_core::{Cursor, Execution, Recipe, TreeVisitor, VisitResult};
use recast_xml::visitor::{walk_tag, XmlVisitor};
use recast_xml::{xml_tree_visitor, Tag, Xml};

/// Marks every `<dependency>` declaring the given coordinates with a
/// search result. The tree text never changes; results travel as markers.
pub struct FindDependency {
    group_id: String,
    artifact_id: String,
}

impl FindDependency {
    pub fn new(group_id: impl Into<String>, artifact_id: impl Into<String>) -> Self {
        Self {
            group_id: group_id.into(),
            artifact_id: artifact_id.into(),
        }
    }
}

impl Recipe<Xml> for FindDependency {
    fn name(&self) -> &str {
        "find-dependency"
    }

    fn description(&self) -> &str {
        "Mark declarations of a Maven dependency"
    }

    fn visitor(&self) -> Box<dyn TreeVisitor<Node = Xml>> {
        Box::new(FindDependencyVisitor {
            group_id: self.group_id.clone(),
            artifact_id: self.artifact_id.clone(),
        })
    }
}

struct FindDependencyVisitor {
    group_id: String,
    artifact_id: String,
}

impl XmlVisitor for FindDependencyVisitor {
    fn visit_tag(
        &mut self,
        tag: Arc<Tag>,
        cursor: &Rc<Cursor>,
        exec: &mut Execution<Xml>,
    ) -> VisitResult<Arc<Tag>> {
        let tag = walk_tag(self, tag, cursor, exec)?;
        if tag.name != "dependency" {
            return Ok(tag);
        }
        let coordinate = |name: &str| tag.child(name).and_then(|t| t.value());
        if coordinate("groupId").as_deref() != Some(&self.group_id)
            || coordinate("artifactId").as_deref() != Some(&self.artifact_id)
        {
            return Ok(tag);
        }
        let marked = tag
            .markers
            .clone()
            .search_result_with(format!("{}:{}", self.group_id, self.artifact_id));
        Ok(tag.with_markers(marked))
    }
}

xml_tree_visitor!(FindDependencyVisitor);
