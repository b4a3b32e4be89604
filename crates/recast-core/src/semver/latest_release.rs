//! The `latest.release` comparator.
//!
//! Accepts stable releases only (no `-SNAPSHOT`, no alpha/beta/milestone/rc
//! endings), optionally gated on a metadata suffix pattern such as `-jre`.
//! Versions are normalized to at least three numeric groups before
//! comparison, so `29.0` and `29.0.0` order as equals.

use std::cmp::Ordering;

use once_cell::sync::Lazy;
use regex::Regex;

use super::{SemverError, VersionComparator};

/// Up to four dot-separated numeric groups, then an optional metadata
/// suffix. The suffix group keeps its leading `-`/`+` separator.
static RELEASE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d+)(?:\.(\d+))?(?:\.(\d+))?(?:\.(\d+))?([-+].+)?$").expect("valid regex")
});

/// Endings that mark a version as pre-release. Checked against the raw
/// version string, before normalization.
static PRE_RELEASE_ENDING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)[.\-](a|alpha|b|beta|m|milestone|rc|cr|preview|snapshot)\d*$")
        .expect("valid regex")
});

/// Newest-stable-release version selection.
#[derive(Debug, Clone)]
pub struct LatestRelease {
    metadata_pattern: Option<String>,
    metadata_regex: Option<Regex>,
}

impl LatestRelease {
    /// A comparator that optionally requires the metadata suffix to match
    /// `metadata_pattern` in full (the pattern sees the leading separator,
    /// so `-jre` matches the suffix of `29.0-jre`).
    pub fn new(metadata_pattern: Option<&str>) -> Result<Self, SemverError> {
        let metadata_regex = match metadata_pattern {
            Some(p) => Some(Regex::new(&format!("^(?:{p})$")).map_err(|e| {
                SemverError::InvalidMetadataPattern {
                    pattern: p.to_string(),
                    message: e.to_string(),
                }
            })?),
            None => None,
        };
        Ok(Self {
            metadata_pattern: metadata_pattern.map(String::from),
            metadata_regex,
        })
    }
}

/// Normalize a version string for comparison.
///
/// Strips a `.RELEASE`, `.FINAL` or `.Final` suffix, then right-pads the
/// numeric head with `.0` groups until it has at least three, leaving any
/// `-`/`+` metadata suffix in place. Idempotent: normalizing a normalized
/// version is the identity.
pub fn normalize_version(version: &str) -> String {
    let stripped = version
        .strip_suffix(".RELEASE")
        .or_else(|| version.strip_suffix(".FINAL"))
        .or_else(|| version.strip_suffix(".Final"))
        .unwrap_or(version);
    let (head, meta) = split_metadata(stripped);
    let mut head = head.to_string();
    let mut dots = head.matches('.').count();
    while dots < 2 {
        head.push_str(".0");
        dots += 1;
    }
    head + meta
}

/// Split at the first `-`/`+`, keeping the separator with the metadata.
fn split_metadata(version: &str) -> (&str, &str) {
    match version.find(['-', '+']) {
        Some(idx) => version.split_at(idx),
        None => (version, ""),
    }
}

/// Pad the numeric head with `.0` groups until it has `target` groups.
fn pad_groups(version: &str, target: usize) -> String {
    let (head, meta) = split_metadata(version);
    let mut head = head.to_string();
    let mut groups = head.split('.').count();
    while groups < target {
        head.push_str(".0");
        groups += 1;
    }
    head + meta
}

fn group_count(version: &str) -> usize {
    split_metadata(version).0.split('.').count()
}

impl LatestRelease {
    /// The normalized string with the configured metadata pattern text
    /// removed, used for the lexicographic tie-break. Each operand is
    /// stripped with its own text (literal removal, not regex).
    fn strip_metadata_literal(&self, normalized: &str) -> String {
        match &self.metadata_pattern {
            Some(p) => normalized.replace(p.as_str(), ""),
            None => normalized.to_string(),
        }
    }
}

impl VersionComparator for LatestRelease {
    fn is_valid(&self, _current_version: &str, version: &str) -> bool {
        let normalized = normalize_version(version);
        let Some(caps) = RELEASE_PATTERN.captures(&normalized) else {
            return false;
        };
        if PRE_RELEASE_ENDING.is_match(version) {
            return false;
        }
        match (&self.metadata_regex, caps.get(5)) {
            (None, meta) => meta.is_none(),
            (Some(re), Some(meta)) => re.is_match(meta.as_str()),
            (Some(_), None) => false,
        }
    }

    fn compare(&self, _current_version: &str, v1: &str, v2: &str) -> Ordering {
        let nv1 = normalize_version(v1);
        let nv2 = normalize_version(v2);
        let groups = group_count(&nv1).max(group_count(&nv2));
        let nv1 = pad_groups(&nv1, groups);
        let nv2 = pad_groups(&nv2, groups);

        let (Some(c1), Some(c2)) = (
            RELEASE_PATTERN.captures(&nv1),
            RELEASE_PATTERN.captures(&nv2),
        ) else {
            // non-numeric versions order as opaque strings
            return nv1.cmp(&nv2);
        };

        for i in 1..=4 {
            match (c1.get(i), c2.get(i)) {
                (Some(g1), Some(g2)) => {
                    // the pattern guarantees digits; clamp on overflow
                    let n1 = g1.as_str().parse::<u64>().unwrap_or(u64::MAX);
                    let n2 = g2.as_str().parse::<u64>().unwrap_or(u64::MAX);
                    match n1.cmp(&n2) {
                        Ordering::Equal => {}
                        other => return other,
                    }
                }
                (None, Some(_)) => return Ordering::Less,
                (Some(_), None) => return Ordering::Greater,
                (None, None) => break,
            }
        }

        // all numeric groups equal: lexicographic tie-break with the
        // metadata pattern literal removed from each operand
        self.strip_metadata_literal(&nv1)
            .cmp(&self.strip_metadata_literal(&nv2))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn latest(pattern: Option<&str>) -> LatestRelease {
        LatestRelease::new(pattern).unwrap()
    }

    mod normalization {
        use super::*;

        #[test]
        fn strips_release_suffix_and_pads() {
            assert_eq!(normalize_version("1.0.RELEASE"), "1.0.0");
            assert_eq!(normalize_version("1.0.0.RELEASE"), "1.0.0");
            assert_eq!(normalize_version("2.0.FINAL"), "2.0.0");
            assert_eq!(normalize_version("2.0.0.Final"), "2.0.0");
        }

        #[test]
        fn pads_to_three_numeric_groups() {
            assert_eq!(normalize_version("29"), "29.0.0");
            assert_eq!(normalize_version("29.0"), "29.0.0");
            assert_eq!(normalize_version("29.0.1"), "29.0.1");
            assert_eq!(normalize_version("1.2.3.4"), "1.2.3.4");
        }

        #[test]
        fn padding_precedes_the_metadata_suffix() {
            assert_eq!(normalize_version("29-jre"), "29.0.0-jre");
            assert_eq!(normalize_version("29.0-jre"), "29.0.0-jre");
            assert_eq!(normalize_version("1.0+build7"), "1.0.0+build7");
        }

        #[test]
        fn is_idempotent() {
            for v in ["1.0.RELEASE", "29.0-jre", "2.0.FINAL", "1.2.3.4", "7"] {
                let once = normalize_version(v);
                assert_eq!(normalize_version(&once), once, "input {v:?}");
            }
        }
    }

    mod validity {
        use super::*;

        #[test]
        fn plain_releases_are_valid() {
            let lr = latest(None);
            assert!(lr.is_valid("1.0", "2.0"));
            assert!(lr.is_valid("1.0", "2.0.1"));
            assert!(lr.is_valid("1.0", "1.2.3.4"));
            assert!(lr.is_valid("1.0", "1.0.0.RELEASE"));
        }

        #[test]
        fn pre_release_endings_are_invalid() {
            let lr = latest(None);
            assert!(!lr.is_valid("1.0", "2.0-SNAPSHOT"));
            assert!(!lr.is_valid("1.0", "2.0.0-rc1"));
            assert!(!lr.is_valid("1.0", "1.0.0.M1"));
            assert!(!lr.is_valid("1.0", "3.0.0-beta2"));
            assert!(!lr.is_valid("1.0", "3.0.0.alpha"));
        }

        #[test]
        fn metadata_requires_a_configured_pattern() {
            assert!(!latest(None).is_valid("1.0", "29.0-jre"));
            assert!(latest(Some("-jre")).is_valid("1.0", "29.0-jre"));
        }

        #[test]
        fn metadata_pattern_must_match_in_full() {
            let lr = latest(Some("-jre"));
            assert!(!lr.is_valid("1.0", "29.0-android"));
            assert!(!lr.is_valid("1.0", "29.0"));
        }

        #[test]
        fn five_numeric_groups_are_invalid() {
            assert!(!latest(None).is_valid("1.0", "1.2.3.4.5"));
        }

        #[test]
        fn non_numeric_versions_are_invalid() {
            assert!(!latest(None).is_valid("1.0", "trunk"));
        }
    }

    mod ordering {
        use super::*;

        #[test]
        fn numeric_not_lexicographic() {
            let lr = latest(None);
            assert_eq!(lr.compare("0", "1.10", "1.9"), Ordering::Greater);
            assert_eq!(lr.compare("0", "2.0", "1.9"), Ordering::Greater);
            assert_eq!(lr.compare("0", "10.0.0", "9.0.0"), Ordering::Greater);
        }

        #[test]
        fn short_and_padded_forms_are_equal() {
            let lr = latest(None);
            assert_eq!(lr.compare("0", "29.0", "29.0.0"), Ordering::Equal);
            assert_eq!(lr.compare("0", "1.0.RELEASE", "1.0.0"), Ordering::Equal);
        }

        #[test]
        fn fourth_group_breaks_ties() {
            let lr = latest(None);
            assert_eq!(lr.compare("0", "1.2.3.4", "1.2.3"), Ordering::Greater);
            assert_eq!(lr.compare("0", "1.2.3.4", "1.2.3.5"), Ordering::Less);
        }

        #[test]
        fn metadata_pattern_literal_is_stripped_for_ties() {
            let lr = latest(Some("-jre"));
            assert_eq!(lr.compare("0", "29.0-jre", "29.0.0-jre"), Ordering::Equal);
            assert_eq!(lr.compare("0", "30.0-jre", "29.0-jre"), Ordering::Greater);
        }

        #[test]
        fn dated_snapshot_suffixes_order_as_strings() {
            let lr = latest(None);
            assert_eq!(
                lr.compare(
                    "0",
                    "1.0.0-20230102.120000-1",
                    "1.0.0-20230101.120000-1"
                ),
                Ordering::Greater
            );
        }
    }

    mod upgrade {
        use super::*;

        fn versions(vs: &[&str]) -> Vec<String> {
            vs.iter().map(|v| v.to_string()).collect()
        }

        #[test]
        fn picks_the_newest_valid_candidate() {
            let lr = latest(None);
            let available = versions(&["1.9", "2.0", "2.1-SNAPSHOT", "1.10"]);
            assert_eq!(lr.upgrade("1.9", &available).as_deref(), Some("2.0"));
        }

        #[test]
        fn respects_the_metadata_gate() {
            let lr = latest(Some("-jre"));
            let available = versions(&[
                "28.0-jre",
                "29.0-jre",
                "30.0-jre",
                "30.1-android",
                "31.0",
            ]);
            assert_eq!(
                lr.upgrade("29.0-jre", &available).as_deref(),
                Some("30.0-jre")
            );
        }

        #[test]
        fn no_newer_candidate_means_none() {
            let lr = latest(None);
            let available = versions(&["1.0", "1.5", "2.0"]);
            assert_eq!(lr.upgrade("2.0", &available), None);
            assert_eq!(lr.upgrade("3.0", &available), None);
        }

        #[test]
        fn empty_availability_means_none() {
            assert_eq!(latest(None).upgrade("1.0", &[]), None);
        }
    }
}
