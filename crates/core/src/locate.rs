//! Finding the one artifact directory a build produced
//!
//! A directory is a candidate when its last path segment ends with the
//! artifact suffix and, below the build root, the output marker segment
//! (`bin`) appears at or before both the configuration and the platform
//! segments. Segments are compared after splitting the path relative to the
//! root, so host path separators and the location of the root itself never
//! influence the match.
//!
//! When several candidates match, two rules remove the uninteresting ones:
//!
//! 1. a candidate nested inside another candidate is dropped;
//! 2. a candidate whose name also appears as a directory nested inside a
//!    different candidate is dropped (an app embedded in another app).

use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

use crate::config::HarnessConfig;
use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactLocator {
    suffix: String,
    marker: String,
}

impl Default for ArtifactLocator {
    fn default() -> Self {
        Self::new(".app", "bin")
    }
}

impl ArtifactLocator {
    pub fn new(suffix: impl Into<String>, marker: impl Into<String>) -> Self {
        Self {
            suffix: suffix.into(),
            marker: marker.into(),
        }
    }

    pub fn from_config(config: &HarnessConfig) -> Self {
        Self::new(&config.artifact_suffix, &config.output_marker)
    }

    /// Candidate predicate over the path segments below the build root
    pub fn is_candidate(&self, segments: &[&str], platform: Option<&str>, configuration: &str) -> bool {
        let Some(last) = segments.last() else {
            return false;
        };
        if !last.ends_with(self.suffix.as_str()) {
            return false;
        }
        let Some(marker_idx) = segments.iter().position(|s| *s == self.marker) else {
            return false;
        };
        let follows_marker = |name: &str| {
            segments
                .iter()
                .rposition(|s| *s == name)
                .is_some_and(|idx| marker_idx <= idx)
        };

        if !follows_marker(configuration) {
            return false;
        }
        match platform {
            Some(platform) if !platform.is_empty() => follows_marker(platform),
            _ => true,
        }
    }

    /// Find the single artifact directory below `root`
    pub fn locate(&self, root: &Path, platform: Option<&str>, configuration: &str) -> Result<PathBuf> {
        let directories = list_directories(root)?;
        let candidates: Vec<PathBuf> = directories
            .iter()
            .filter(|dir| {
                let segments = segments(root, dir);
                let segments: Vec<&str> = segments.iter().map(String::as_str).collect();
                self.is_candidate(&segments, platform, configuration)
            })
            .cloned()
            .collect();
        debug!(
            "{} candidate artifact directories among {} below {}",
            candidates.len(),
            directories.len(),
            root.display()
        );

        let mut survivors = candidates;
        if survivors.len() > 1 {
            survivors = disambiguate(&survivors, &directories);
            debug!("{} candidates left after disambiguation", survivors.len());
        }

        match survivors.len() {
            0 => Err(Error::NoArtifact { seen: directories }),
            1 => Ok(survivors.remove(0)),
            _ => Err(Error::AmbiguousArtifact {
                candidates: survivors,
            }),
        }
    }
}

/// Drop nested and embedded candidates. Both rules look at the full candidate
/// set, so the result does not depend on candidate order.
///
/// A candidate's own directory does not count as nested inside itself. Two
/// same-named candidates in unrelated locations therefore both survive and
/// the lookup reports them as ambiguous, rather than dropping both and
/// reporting that no artifact was found.
pub fn disambiguate(candidates: &[PathBuf], directories: &[PathBuf]) -> Vec<PathBuf> {
    candidates
        .iter()
        .filter(|candidate| {
            let nested = candidates
                .iter()
                .any(|other| other != *candidate && candidate.starts_with(other));
            if nested {
                return false;
            }

            let name = candidate.file_name();
            let embedded = candidates.iter().filter(|other| other != candidate).any(|other| {
                directories
                    .iter()
                    .any(|dir| dir != other && dir.starts_with(other) && dir.file_name() == name)
            });
            !embedded
        })
        .cloned()
        .collect()
}

/// Every directory below `root`, in a stable order
fn list_directories(root: &Path) -> Result<Vec<PathBuf>> {
    let mut directories = Vec::new();
    for entry in WalkDir::new(root)
        .min_depth(1)
        .follow_links(false)
        .sort_by_file_name()
    {
        let entry = entry.map_err(io::Error::from)?;
        if entry.file_type().is_dir() {
            directories.push(entry.into_path());
        }
    }
    Ok(directories)
}

fn segments(root: &Path, dir: &Path) -> Vec<String> {
    dir.strip_prefix(root)
        .unwrap_or(dir)
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn tree(dirs: &[&str]) -> TempDir {
        let temp_dir = TempDir::new().unwrap();
        for dir in dirs {
            fs::create_dir_all(temp_dir.path().join(dir)).unwrap();
        }
        temp_dir
    }

    fn locator() -> ArtifactLocator {
        ArtifactLocator::default()
    }

    #[test]
    fn test_predicate_basic() {
        let l = locator();
        assert!(l.is_candidate(&["Foo", "bin", "Debug", "Foo.app"], None, "Debug"));
        assert!(l.is_candidate(&["bin", "iPhone", "Debug", "Foo.app"], Some("iPhone"), "Debug"));
        assert!(l.is_candidate(&["bin", "Debug", "x", "iPhone", "Foo.app"], Some("iPhone"), "Debug"));
        assert!(l.is_candidate(&["bin", "Debug", "Foo.app"], Some(""), "Debug"));
    }

    #[test]
    fn test_predicate_rejections() {
        let l = locator();
        // wrong suffix
        assert!(!l.is_candidate(&["bin", "Debug", "Foo.appex"], None, "Debug"));
        assert!(!l.is_candidate(&["bin", "Debug", "Foo.app", "Contents"], None, "Debug"));
        // missing segments
        assert!(!l.is_candidate(&["obj", "Debug", "Foo.app"], None, "Debug"));
        assert!(!l.is_candidate(&["bin", "Release", "Foo.app"], None, "Debug"));
        assert!(!l.is_candidate(&["bin", "Debug", "Foo.app"], Some("iPhone"), "Debug"));
        // configuration before the marker
        assert!(!l.is_candidate(&["Debug", "bin", "Foo.app"], None, "Debug"));
        assert!(!l.is_candidate(&["iPhone", "bin", "Debug", "Foo.app"], Some("iPhone"), "Debug"));
        assert!(!l.is_candidate(&[], None, "Debug"));
    }

    #[test]
    fn test_predicate_only_relative_order_matters() {
        let l = locator();
        assert!(l.is_candidate(&["Debug", "bin", "Debug", "Foo.app"], None, "Debug"));
        assert!(l.is_candidate(&["bin", "a", "b", "Debug", "c", "Foo.app"], None, "Debug"));
    }

    #[test]
    fn test_single_candidate() {
        let temp_dir = tree(&["Foo/bin/Debug/Foo.app/Contents", "Foo/obj/Debug/Foo.app"]);
        let found = locator().locate(temp_dir.path(), None, "Debug").unwrap();
        assert_eq!(found, temp_dir.path().join("Foo/bin/Debug/Foo.app"));
    }

    #[test]
    fn test_nested_duplicate_is_dropped() {
        let temp_dir = tree(&["Foo/bin/Debug/Foo.app/Sub/Foo.app"]);
        let found = locator().locate(temp_dir.path(), None, "Debug").unwrap();
        assert_eq!(found, temp_dir.path().join("Foo/bin/Debug/Foo.app"));
    }

    #[test]
    fn test_embedded_app_is_dropped() {
        let temp_dir = tree(&[
            "Host/bin/Debug/Host.app/Watch/Ext.app",
            "Ext/bin/Debug/Ext.app",
        ]);
        let found = locator().locate(temp_dir.path(), None, "Debug").unwrap();
        assert_eq!(found, temp_dir.path().join("Host/bin/Debug/Host.app"));
    }

    #[test]
    fn test_unrelated_candidates_are_ambiguous() {
        let temp_dir = tree(&["A/bin/Debug/A.app", "B/bin/Debug/B.app"]);
        let err = locator().locate(temp_dir.path(), None, "Debug").unwrap_err();
        match err {
            Error::AmbiguousArtifact { candidates } => assert_eq!(
                candidates,
                [
                    temp_dir.path().join("A/bin/Debug/A.app"),
                    temp_dir.path().join("B/bin/Debug/B.app"),
                ]
            ),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_same_name_in_unrelated_locations_is_ambiguous() {
        // Neither copy is nested inside the other, so neither is dropped.
        let temp_dir = tree(&["A/bin/Debug/Foo.app", "B/bin/Debug/Foo.app"]);
        let err = locator().locate(temp_dir.path(), None, "Debug").unwrap_err();
        assert!(err.to_string().starts_with("More than one app directory found:"));
        assert!(matches!(err, Error::AmbiguousArtifact { candidates } if candidates.len() == 2));
    }

    #[test]
    fn test_no_candidate_lists_everything_seen() {
        let temp_dir = tree(&["Foo/bin/Release/Foo.app"]);
        let err = locator().locate(temp_dir.path(), None, "Debug").unwrap_err();
        match err {
            Error::NoArtifact { seen } => assert_eq!(seen.len(), 4),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_platform_filter() {
        let temp_dir = tree(&[
            "Foo/bin/iPhone/Debug/Foo.app",
            "Foo/bin/iPhoneSimulator/Debug/Foo.app",
        ]);
        let found = locator()
            .locate(temp_dir.path(), Some("iPhoneSimulator"), "Debug")
            .unwrap();
        assert_eq!(found, temp_dir.path().join("Foo/bin/iPhoneSimulator/Debug/Foo.app"));
    }

    #[test]
    fn test_root_location_does_not_matter() {
        let temp_dir = tree(&["bin/Debug/work/Foo/obj/Foo.app"]);
        let root = temp_dir.path().join("bin/Debug/work");
        assert!(matches!(
            locator().locate(&root, None, "Debug"),
            Err(Error::NoArtifact { .. })
        ));
    }

    #[test]
    fn test_repeated_lookups_agree() {
        let temp_dir = tree(&[
            "Foo/bin/Debug/Foo.app/PlugIns/Foo.app",
            "Foo/bin/Debug/Other.txt",
        ]);
        let first = locator().locate(temp_dir.path(), None, "Debug").unwrap();
        for _ in 0..5 {
            assert_eq!(locator().locate(temp_dir.path(), None, "Debug").unwrap(), first);
        }
    }

    #[test]
    fn test_disambiguate_ignores_candidate_order() {
        let a = PathBuf::from("/r/Host/bin/Debug/Host.app");
        let nested = PathBuf::from("/r/Host/bin/Debug/Host.app/Watch/Ext.app");
        let b = PathBuf::from("/r/Ext/bin/Debug/Ext.app");
        let dirs = vec![a.clone(), PathBuf::from("/r/Host/bin/Debug/Host.app/Watch"), nested.clone(), b.clone()];

        let forward = disambiguate(&[a.clone(), nested.clone(), b.clone()], &dirs);
        let backward = disambiguate(&[b, nested, a.clone()], &dirs);
        assert_eq!(forward, [a.clone()]);
        assert_eq!(backward, [a]);
    }
}
