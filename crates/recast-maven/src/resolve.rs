//! Read a parsed POM document into the interned model.

use std::collections::BTreeMap;

use recast_core::Tree;
use recast_xml::{Tag, Xml};
use tracing::debug;

use crate::pom::{self, Dependency, Gav, MavenResolution, Pom, PomId};

/// Failure to read a model out of a document.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ResolveError {
    /// The node is not an XML document.
    #[error("expected an xml document")]
    NotADocument,

    /// The root element is not `<project>`.
    #[error("expected a <project> root, found <{0}>")]
    NotAProject(String),

    /// A POM must declare its own artifactId; a missing one is malformed
    /// input, not an inheritable coordinate.
    #[error("pom is missing <artifactId>")]
    MissingArtifactId,
}

/// Resolve the document into the process-wide arena and return it with a
/// [`MavenResolution`] marker carrying the interned id.
///
/// A document already carrying a resolution is returned as-is.
pub fn resolve_pom(doc: Xml) -> Result<(Xml, PomId), ResolveError> {
    let Some(document) = doc.as_document() else {
        return Err(ResolveError::NotADocument);
    };
    if let Some(existing) = document.markers.find_first::<MavenResolution>() {
        let id = existing.pom;
        return Ok((doc, id));
    }

    let Some(project) = document.root.as_tag() else {
        return Err(ResolveError::NotADocument);
    };
    if project.name != "project" {
        return Err(ResolveError::NotAProject(project.name.clone()));
    }

    let parent = project.child("parent").map(|p| {
        let parent_pom = Pom {
            gav: read_gav(p)?,
            packaging: Some("pom".to_string()),
            parent: None,
            dependencies: Vec::new(),
            properties: BTreeMap::new(),
        };
        Ok(pom::global().intern(parent_pom))
    });
    let parent = match parent {
        Some(r) => Some(r?),
        None => None,
    };

    let model = Pom {
        gav: read_gav(project)?,
        packaging: project.child("packaging").and_then(|t| t.value()),
        parent,
        dependencies: read_dependencies(project)?,
        properties: read_properties(project),
    };
    debug!(
        group = model.gav.group_id.as_deref().unwrap_or(""),
        artifact = %model.gav.artifact_id,
        "resolved pom"
    );
    let id = pom::global().intern(model);

    let markers = document.markers.clone().add(MavenResolution { pom: id });
    Ok((doc.with_markers(markers), id))
}

fn read_gav(tag: &Tag) -> Result<Gav, ResolveError> {
    let artifact_id = tag
        .child("artifactId")
        .and_then(|t| t.value())
        .ok_or(ResolveError::MissingArtifactId)?;
    Ok(Gav {
        group_id: tag.child("groupId").and_then(|t| t.value()),
        artifact_id,
        version: tag.child("version").and_then(|t| t.value()),
    })
}

fn read_dependencies(project: &Tag) -> Result<Vec<Dependency>, ResolveError> {
    let Some(dependencies) = project.child("dependencies") else {
        return Ok(Vec::new());
    };
    dependencies
        .children()
        .filter(|t| t.name == "dependency")
        .map(|t| {
            Ok(Dependency {
                gav: read_gav(t)?,
                scope: t.child("scope").and_then(|s| s.value()),
                classifier: t.child("classifier").and_then(|c| c.value()),
            })
        })
        .collect()
}

fn read_properties(project: &Tag) -> BTreeMap<String, String> {
    project
        .child("properties")
        .map(|props| {
            props
                .children()
                .filter_map(|p| p.value().map(|v| (p.name.clone(), v)))
                .collect()
        })
        .unwrap_or_default()
}
