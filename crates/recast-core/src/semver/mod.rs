//! Version selection for dependency-upgrade recipes.
//!
//! A [`VersionComparator`] decides which candidate versions are acceptable
//! upgrades and how they order. The only built-in selector is
//! [`LatestRelease`]: newest stable release, optionally gated on a metadata
//! suffix such as `-jre`.

use std::cmp::Ordering;
use std::fmt::Debug;

mod latest_release;

pub use latest_release::{normalize_version, LatestRelease};

/// Construction failures for version comparators.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SemverError {
    /// The selector string names no known comparator.
    #[error("unknown version selector {0:?}")]
    UnknownSelector(String),

    /// The metadata pattern is not a valid regular expression.
    #[error("invalid metadata pattern {pattern:?}: {message}")]
    InvalidMetadataPattern {
        /// The offending pattern.
        pattern: String,
        /// The regex engine's complaint.
        message: String,
    },
}

/// Orders versions and filters upgrade candidates.
pub trait VersionComparator: Debug {
    /// Whether `version` is an acceptable candidate relative to the
    /// currently used version.
    fn is_valid(&self, current_version: &str, version: &str) -> bool;

    /// Total order over two candidate versions.
    fn compare(&self, current_version: &str, v1: &str, v2: &str) -> Ordering;

    /// The best valid candidate strictly newer than `current_version`,
    /// or `None` when nothing qualifies.
    fn upgrade(&self, current_version: &str, available: &[String]) -> Option<String> {
        let mut best: Option<&str> = None;
        for candidate in available {
            if !self.is_valid(current_version, candidate) {
                continue;
            }
            best = match best {
                Some(b) if self.compare(current_version, candidate, b) != Ordering::Greater => {
                    Some(b)
                }
                _ => Some(candidate),
            };
        }
        best.filter(|b| self.compare(current_version, b, current_version) == Ordering::Greater)
            .map(String::from)
    }
}

/// Build a comparator from a selector string.
///
/// Only `latest.release` (case-insensitive) is recognized.
pub fn build(
    selector: &str,
    metadata_pattern: Option<&str>,
) -> Result<Box<dyn VersionComparator>, SemverError> {
    if selector.eq_ignore_ascii_case("latest.release") {
        Ok(Box::new(LatestRelease::new(metadata_pattern)?))
    } else {
        Err(SemverError::UnknownSelector(selector.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_accepts_latest_release_case_insensitively() {
        assert!(build("latest.release", None).is_ok());
        assert!(build("Latest.Release", None).is_ok());
    }

    #[test]
    fn build_rejects_unknown_selectors() {
        let err = build("latest.patch", None).unwrap_err();
        assert!(matches!(err, SemverError::UnknownSelector(_)));
    }

    #[test]
    fn build_rejects_malformed_metadata_patterns() {
        let err = build("latest.release", Some("(")).unwrap_err();
        assert!(matches!(err, SemverError::InvalidMetadataPattern { .. }));
    }
}
