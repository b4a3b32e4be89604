//! Upgrade a dependency's declared version.

use std::rc::Rc;
use std::sync::Arc;

use recast_core::semver::VersionComparator;
use recast_core::{Cursor, Execution, Recipe, TreeVisitor, VisitResult};
use recast_xml::visitor::{walk_tag, XmlVisitor};
use recast_xml::{xml_tree_visitor, ChangeTagValueVisitor, HasSourcePath, Tag, Xml};
use tracing::debug;

/// Where candidate versions come from. Repository access is outside this
/// crate; tests and callers supply an implementation (an in-memory table,
/// a metadata file reader, a cache).
pub trait VersionMetadata {
    fn available_versions(&self, group_id: &str, artifact_id: &str) -> Vec<String>;
}

/// Rewrites `<version>` of every dependency matching the coordinates to
/// the best acceptable candidate, as judged by the comparator. Dependencies
/// already at the best version, and versions expressed through property
/// references, are left alone.
pub struct UpgradeDependencyVersion {
    group_id: String,
    artifact_id: String,
    comparator: Arc<dyn VersionComparator>,
    metadata: Arc<dyn VersionMetadata>,
}

impl UpgradeDependencyVersion {
    pub fn new(
        group_id: impl Into<String>,
        artifact_id: impl Into<String>,
        comparator: Arc<dyn VersionComparator>,
        metadata: Arc<dyn VersionMetadata>,
    ) -> Self {
        Self {
            group_id: group_id.into(),
            artifact_id: artifact_id.into(),
            comparator,
            metadata,
        }
    }
}

impl Recipe<Xml> for UpgradeDependencyVersion {
    fn name(&self) -> &str {
        "upgrade-dependency-version"
    }

    fn description(&self) -> &str {
        "Upgrade a Maven dependency to the newest acceptable version"
    }

    fn visitor(&self) -> Box<dyn TreeVisitor<Node = Xml>> {
        Box::new(UpgradeDependencyVersionVisitor {
            group_id: self.group_id.clone(),
            artifact_id: self.artifact_id.clone(),
            comparator: Arc::clone(&self.comparator),
            metadata: Arc::clone(&self.metadata),
        })
    }

    fn applicable_test(&self) -> Option<Box<dyn TreeVisitor<Node = Xml>>> {
        HasSourcePath::new("**/pom.xml")
            .ok()
            .map(|gate| Box::new(gate) as Box<dyn TreeVisitor<Node = Xml>>)
    }
}

struct UpgradeDependencyVersionVisitor {
    group_id: String,
    artifact_id: String,
    comparator: Arc<dyn VersionComparator>,
    metadata: Arc<dyn VersionMetadata>,
}

impl UpgradeDependencyVersionVisitor {
    fn matches(&self, dependency: &Tag) -> bool {
        let coordinate = |name: &str| dependency.child(name).and_then(|t| t.value());
        coordinate("groupId").as_deref() == Some(&self.group_id)
            && coordinate("artifactId").as_deref() == Some(&self.artifact_id)
    }
}

impl XmlVisitor for UpgradeDependencyVersionVisitor {
    fn visit_tag(
        &mut self,
        tag: Arc<Tag>,
        cursor: &Rc<Cursor>,
        exec: &mut Execution<Xml>,
    ) -> VisitResult<Arc<Tag>> {
        let tag = walk_tag(self, tag, cursor, exec)?;
        if tag.name != "dependency" || !self.matches(&tag) {
            return Ok(tag);
        }
        let Some(version_tag) = tag.child("version") else {
            return Ok(tag);
        };
        let Some(current) = version_tag.value() else {
            return Ok(tag);
        };
        if current.starts_with("${") {
            // property reference; the literal is defined elsewhere
            return Ok(tag);
        }

        let available = self
            .metadata
            .available_versions(&self.group_id, &self.artifact_id);
        if let Some(upgrade) = self.comparator.upgrade(&current, &available) {
            debug!(
                group = %self.group_id,
                artifact = %self.artifact_id,
                from = %current,
                to = %upgrade,
                "scheduling dependency upgrade"
            );
            exec.do_after_visit(Box::new(ChangeTagValueVisitor::for_id(
                version_tag.id,
                upgrade,
            )));
        }
        Ok(tag)
    }
}

xml_tree_visitor!(
    UpgradeDependencyVersionVisitor,
    acceptable = |_: &UpgradeDependencyVersionVisitor, source: &Xml| {
        source
            .as_document()
            .is_some_and(|d| d.source_path.ends_with("pom.xml"))
    }
);
