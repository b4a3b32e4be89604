//! Maven POM support: an interned project model read from parsed XML, and
//! recipes that find and upgrade dependency declarations while preserving
//! every byte of untouched formatting.

pub mod find;
pub mod pom;
pub mod resolve;
pub mod upgrade;

pub use find::FindDependency;
pub use pom::{clear_caches, Dependency, Gav, MavenResolution, Pom, PomArena, PomId};
pub use resolve::{resolve_pom, ResolveError};
pub use upgrade::{UpgradeDependencyVersion, VersionMetadata};
