//! Language-agnostic engine for format-preserving source transformation.
//!
//! This crate provides the infrastructure shared by every recast language
//! family:
//! - The [`Tree`] contract: immutable, identity-bearing nodes with a
//!   side-channel [`Markers`] collection.
//! - [`Cursor`]: the parent-chain path and scoped message store used during
//!   one visitor pass.
//! - The [`TreeVisitor`] contract and [`Execution`] context, including the
//!   deferred-visitor queue behind [`Execution::do_after_visit`].
//! - List utilities ([`flat_map`], [`map`]) with copy-on-write no-op
//!   propagation.
//! - [`Recipe`] and [`RecipeRun`]: the orchestration loop that drives
//!   visitor passes to a fixed point.
//! - [`semver`]: the version comparator used by dependency-upgrade recipes.
//!
//! Language crates (such as `recast-xml`) supply the concrete node kinds and
//! the double-dispatch walkers; this crate never inspects node shapes beyond
//! identity and markers.
//!
//! # No-op propagation
//!
//! The load-bearing contract throughout: a visitor that changes nothing must
//! return the value it was given, at every level of the tree, so that
//! ancestor reassembly can detect "nothing below changed" and re-running a
//! converged pass is free.

pub mod cursor;
pub mod list_utils;
pub mod marker;
pub mod recipe;
pub mod scheduler;
pub mod semver;
pub mod tree;
pub mod visitor;

pub use cursor::{Cursor, MissingAncestorError};
pub use list_utils::{flat_map, map, Transform};
pub use marker::{Marker, Markers, SearchResult};
pub use recipe::Recipe;
pub use scheduler::{RecipeRun, RunReport, RunResult, SourceChange, SourceError};
pub use tree::{Tree, TreeId};
pub use visitor::{Descend, Execution, TreeVisitor, VisitError, VisitResult};
