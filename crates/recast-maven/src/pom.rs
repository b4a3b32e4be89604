//! The interned POM model.
//!
//! Resolved POMs are flyweights: structurally equal models intern to the
//! same [`PomId`] and share one allocation, so ten modules inheriting the
//! same parent POM hold ten references to one record. Parent links are
//! arena indices, never direct references, which keeps the graph acyclic
//! and droppable in one sweep.

use std::any::Any;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};

use once_cell::sync::Lazy;
use recast_core::Marker;

/// Maven coordinates. `artifact_id` is the one coordinate a POM must state
/// for itself; group and version may be inherited from the parent.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Gav {
    pub group_id: Option<String>,
    pub artifact_id: String,
    pub version: Option<String>,
}

/// One declared dependency.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Dependency {
    pub gav: Gav,
    pub scope: Option<String>,
    pub classifier: Option<String>,
}

/// A resolved project model.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Pom {
    pub gav: Gav,
    pub packaging: Option<String>,
    /// Arena index of the parent POM, if any.
    pub parent: Option<PomId>,
    pub dependencies: Vec<Dependency>,
    pub properties: BTreeMap<String, String>,
}

impl Pom {
    /// Property lookup along the parent chain: nearest declaration wins.
    pub fn property(&self, arena: &PomArena, key: &str) -> Option<String> {
        if let Some(v) = self.properties.get(key) {
            return Some(v.clone());
        }
        self.parent
            .and_then(|p| arena.get(p))
            .and_then(|p| p.property(arena, key))
    }
}

/// Index of an interned [`Pom`]. Valid until [`clear_caches`] empties the
/// arena it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PomId(u32);

/// The flyweight store.
#[derive(Debug, Default)]
pub struct PomArena {
    poms: Vec<Arc<Pom>>,
    index: HashMap<Arc<Pom>, PomId>,
}

impl PomArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern a model: a structurally equal POM returns the existing id
    /// and allocation.
    pub fn intern(&mut self, pom: Pom) -> PomId {
        if let Some(id) = self.index.get(&pom) {
            return *id;
        }
        let id = PomId(self.poms.len() as u32);
        let pom = Arc::new(pom);
        self.poms.push(Arc::clone(&pom));
        self.index.insert(pom, id);
        id
    }

    pub fn get(&self, id: PomId) -> Option<Arc<Pom>> {
        self.poms.get(id.0 as usize).map(Arc::clone)
    }

    pub fn len(&self) -> usize {
        self.poms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.poms.is_empty()
    }

    pub fn clear(&mut self) {
        self.poms.clear();
        self.index.clear();
    }
}

static GLOBAL: Lazy<Mutex<PomArena>> = Lazy::new(|| Mutex::new(PomArena::new()));

/// The process-wide arena. One lock guards intern and lookup; a poisoned
/// lock is recovered, since the arena holds only plain data.
pub fn global() -> MutexGuard<'static, PomArena> {
    GLOBAL.lock().unwrap_or_else(|e| e.into_inner())
}

/// Empty the process-wide arena. Outstanding [`PomId`]s from before the
/// clear no longer resolve.
pub fn clear_caches() {
    global().clear();
}

/// Marker attaching a resolved model to the document it was read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MavenResolution {
    pub pom: PomId,
}

impl Marker for MavenResolution {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn eq_dyn(&self, other: &dyn Marker) -> bool {
        other
            .as_any()
            .downcast_ref::<MavenResolution>()
            .is_some_and(|o| self == o)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gav(g: &str, a: &str, v: &str) -> Gav {
        Gav {
            group_id: Some(g.to_string()),
            artifact_id: a.to_string(),
            version: Some(v.to_string()),
        }
    }

    fn pom(g: &str, a: &str, v: &str) -> Pom {
        Pom {
            gav: gav(g, a, v),
            packaging: None,
            parent: None,
            dependencies: Vec::new(),
            properties: BTreeMap::new(),
        }
    }

    mod interning {
        use super::*;

        #[test]
        fn equal_models_share_one_allocation() {
            let mut arena = PomArena::new();
            let a = arena.intern(pom("g", "a", "1"));
            let b = arena.intern(pom("g", "a", "1"));
            assert_eq!(a, b);
            assert_eq!(arena.len(), 1);
            assert!(Arc::ptr_eq(
                &arena.get(a).unwrap(),
                &arena.get(b).unwrap()
            ));
        }

        #[test]
        fn distinct_models_get_distinct_ids() {
            let mut arena = PomArena::new();
            let a = arena.intern(pom("g", "a", "1"));
            let b = arena.intern(pom("g", "a", "2"));
            assert_ne!(a, b);
            assert_eq!(arena.len(), 2);
        }

        #[test]
        fn clear_empties_the_arena() {
            let mut arena = PomArena::new();
            let id = arena.intern(pom("g", "a", "1"));
            arena.clear();
            assert!(arena.is_empty());
            assert!(arena.get(id).is_none());
            // re-interning starts over
            let again = arena.intern(pom("g", "a", "1"));
            assert_eq!(arena.get(again).unwrap().gav.artifact_id, "a");
        }
    }

    mod parent_chain {
        use super::*;

        #[test]
        fn property_lookup_walks_parents_nearest_first() {
            let mut arena = PomArena::new();
            let mut grandparent = pom("g", "grandparent", "1");
            grandparent
                .properties
                .insert("guava.version".to_string(), "28.0-jre".to_string());
            grandparent
                .properties
                .insert("junit.version".to_string(), "4.12".to_string());
            let gp = arena.intern(grandparent);

            let mut parent = pom("g", "parent", "1");
            parent.parent = Some(gp);
            parent
                .properties
                .insert("guava.version".to_string(), "29.0-jre".to_string());
            let p = arena.intern(parent);

            let mut child = pom("g", "child", "1");
            child.parent = Some(p);
            let c = arena.intern(child);

            let child = arena.get(c).unwrap();
            assert_eq!(
                child.property(&arena, "guava.version").as_deref(),
                Some("29.0-jre")
            );
            assert_eq!(
                child.property(&arena, "junit.version").as_deref(),
                Some("4.12")
            );
            assert_eq!(child.property(&arena, "missing"), None);
        }
    }
}
