//! Markers: side-channel annotations attached to tree nodes.
//!
//! A [`Marker`] is an opaque typed record carried by a node's [`Markers`]
//! collection, independent of the node's semantic fields. Markers carry
//! cross-cutting concerns: search-result flags, language tags, resolved
//! model caches. The collection is immutable; adding a marker produces a new
//! `Markers` value and, transitively, a new node.
//!
//! The built-in [`SearchResult`] marker is how "find" recipes report
//! matches: a find visitor only ever adds markers and never changes node
//! shape, which lets the orchestration loop report "matched but nothing
//! restructured" as a distinct outcome.

use std::any::Any;
use std::fmt::Debug;
use std::sync::Arc;

use crate::tree::TreeId;

/// An opaque typed annotation attached to a node.
///
/// Implementors supply `as_any` for downcasting and `eq_dyn` for equality
/// across `dyn Marker` values (used by [`Markers`] equality, which in turn
/// feeds tree structural equality — adding a marker makes the owning tree
/// compare unequal).
pub trait Marker: Any + Debug + Send + Sync {
    /// Downcast access to the concrete marker type.
    fn as_any(&self) -> &dyn Any;

    /// Equality against another marker of any concrete type.
    fn eq_dyn(&self, other: &dyn Marker) -> bool;
}

/// An ordered, immutable collection of markers.
#[derive(Debug, Clone)]
pub struct Markers {
    id: TreeId,
    markers: Vec<Arc<dyn Marker>>,
}

impl Markers {
    /// An empty marker collection with a fresh identity.
    pub fn empty() -> Self {
        Self {
            id: TreeId::random(),
            markers: Vec::new(),
        }
    }

    /// The collection's own identity.
    pub fn id(&self) -> TreeId {
        self.id
    }

    /// The markers, in insertion order.
    pub fn entries(&self) -> &[Arc<dyn Marker>] {
        &self.markers
    }

    /// Append a marker, producing a new collection.
    pub fn add(mut self, marker: impl Marker) -> Self {
        self.markers.push(Arc::new(marker));
        self
    }

    /// The first marker downcastable to `M`, if any.
    pub fn find_first<M: Marker>(&self) -> Option<&M> {
        self.markers
            .iter()
            .find_map(|m| m.as_any().downcast_ref::<M>())
    }

    /// All markers downcastable to `M`, in insertion order.
    pub fn find_all<M: Marker>(&self) -> impl Iterator<Item = &M> {
        self.markers
            .iter()
            .filter_map(|m| m.as_any().downcast_ref::<M>())
    }

    /// Whether any [`SearchResult`] marker is present.
    pub fn is_search_result(&self) -> bool {
        self.find_first::<SearchResult>().is_some()
    }

    /// Append an undescribed [`SearchResult`], unless an equal one is
    /// already present (replace-don't-duplicate).
    pub fn search_result(self) -> Self {
        self.add_search_result(None)
    }

    /// Append a described [`SearchResult`], unless an equal one is already
    /// present.
    pub fn search_result_with(self, description: impl Into<String>) -> Self {
        self.add_search_result(Some(description.into()))
    }

    fn add_search_result(self, description: Option<String>) -> Self {
        let duplicate = self
            .markers
            .iter()
            .filter_map(|m| m.as_any().downcast_ref::<SearchResult>())
            .any(|s| s.description == description);
        if duplicate {
            self
        } else {
            self.add(SearchResult {
                id: TreeId::random(),
                description,
            })
        }
    }
}

impl PartialEq for Markers {
    /// Content equality: same marker count and pairwise-equal markers.
    ///
    /// The collection's own id is deliberately excluded so that two
    /// independently built empty collections compare equal.
    fn eq(&self, other: &Self) -> bool {
        self.markers.len() == other.markers.len()
            && self
                .markers
                .iter()
                .zip(&other.markers)
                .all(|(a, b)| a.eq_dyn(b.as_ref()))
    }
}

impl Eq for Markers {}

/// The built-in search-result marker.
#[derive(Debug, Clone)]
pub struct SearchResult {
    id: TreeId,
    description: Option<String>,
}

impl SearchResult {
    /// Create a search result with an optional description.
    pub fn new(description: Option<String>) -> Self {
        Self {
            id: TreeId::random(),
            description,
        }
    }

    /// The marker's own identity.
    pub fn id(&self) -> TreeId {
        self.id
    }

    /// The optional human-readable description of the match.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

impl PartialEq for SearchResult {
    /// Two search results are equal when their descriptions match; the
    /// marker's own id is ignored (it only exists for provenance).
    fn eq(&self, other: &Self) -> bool {
        self.description == other.description
    }
}

impl Eq for SearchResult {}

impl Marker for SearchResult {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn eq_dyn(&self, other: &dyn Marker) -> bool {
        other
            .as_any()
            .downcast_ref::<SearchResult>()
            .is_some_and(|o| self == o)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct LanguageTag(&'static str);

    impl Marker for LanguageTag {
        fn as_any(&self) -> &dyn Any {
            self
        }

        fn eq_dyn(&self, other: &dyn Marker) -> bool {
            other
                .as_any()
                .downcast_ref::<LanguageTag>()
                .is_some_and(|o| self == o)
        }
    }

    #[test]
    fn empty_collections_compare_equal() {
        assert_eq!(Markers::empty(), Markers::empty());
    }

    #[test]
    fn adding_a_marker_changes_equality() {
        let empty = Markers::empty();
        let marked = Markers::empty().search_result();
        assert_ne!(empty, marked);
    }

    #[test]
    fn find_first_by_type() {
        let markers = Markers::empty()
            .add(LanguageTag("xml"))
            .search_result_with("match");
        assert_eq!(markers.find_first::<LanguageTag>(), Some(&LanguageTag("xml")));
        assert_eq!(
            markers.find_first::<SearchResult>().and_then(|s| s.description()),
            Some("match")
        );
    }

    #[test]
    fn search_result_does_not_duplicate() {
        let markers = Markers::empty()
            .search_result_with("match")
            .search_result_with("match");
        assert_eq!(markers.entries().len(), 1);
    }

    #[test]
    fn search_results_with_distinct_descriptions_accumulate() {
        let markers = Markers::empty()
            .search_result_with("first")
            .search_result_with("second");
        assert_eq!(markers.entries().len(), 2);
        assert!(markers.is_search_result());
    }

    #[test]
    fn marker_equality_is_per_type() {
        let a = Markers::empty().add(LanguageTag("xml"));
        let b = Markers::empty().search_result();
        assert_ne!(a, b);
    }
}
