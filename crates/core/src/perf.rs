//! Artifact measurement and the `perf-data` report

use std::fmt;
use std::io;
use std::path::{Component, Path, PathBuf};
use std::time::Duration;

use walkdir::WalkDir;

use crate::error::Result;
use crate::process::format_elapsed;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildResult {
    Success,
    Failed,
}

impl fmt::Display for BuildResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildResult::Success => f.write_str("success"),
            BuildResult::Failed => f.write_str("failed"),
        }
    }
}

/// One file inside the artifact, named relative to the artifact's parent directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub name: String,
    pub size: u64,
}

/// Every file of a located artifact, sorted by name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactMeasurement {
    pub artifact: PathBuf,
    pub files: Vec<FileEntry>,
}

impl ArtifactMeasurement {
    pub fn total_size(&self) -> u64 {
        self.files.iter().map(|f| f.size).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildReport {
    pub test_name: String,
    pub platform: Option<String>,
    pub configuration: String,
    pub result: BuildResult,
    /// Compile stage duration; only set on success
    pub duration: Option<Duration>,
    pub artifact: Option<ArtifactMeasurement>,
}

impl BuildReport {
    pub fn failed(
        test_name: impl Into<String>,
        platform: Option<&str>,
        configuration: impl Into<String>,
    ) -> Self {
        Self {
            test_name: test_name.into(),
            platform: platform.map(str::to_string),
            configuration: configuration.into(),
            result: BuildResult::Failed,
            duration: None,
            artifact: None,
        }
    }

    pub fn succeeded(
        test_name: impl Into<String>,
        platform: Option<&str>,
        configuration: impl Into<String>,
        duration: Duration,
        artifact: ArtifactMeasurement,
    ) -> Self {
        Self {
            result: BuildResult::Success,
            duration: Some(duration),
            artifact: Some(artifact),
            ..Self::failed(test_name, platform, configuration)
        }
    }

    pub fn files(&self) -> &[FileEntry] {
        self.artifact
            .as_ref()
            .map(|a| a.files.as_slice())
            .unwrap_or_default()
    }

    pub fn total_size(&self) -> u64 {
        self.artifact.as_ref().map_or(0, ArtifactMeasurement::total_size)
    }
}

/// List every file below `artifact` with its size
pub fn measure(artifact: &Path) -> Result<ArtifactMeasurement> {
    let base = artifact.parent().unwrap_or(artifact);
    let mut files = Vec::new();

    for entry in WalkDir::new(artifact).follow_links(false) {
        let entry = entry.map_err(io::Error::from)?;
        if !entry.file_type().is_file() {
            continue;
        }
        let size = entry.metadata().map_err(io::Error::from)?.len();
        let relative = entry.path().strip_prefix(base).unwrap_or(entry.path());
        files.push(FileEntry {
            name: slash_path(relative),
            size,
        });
    }

    files.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(ArtifactMeasurement {
        artifact: artifact.to_path_buf(),
        files,
    })
}

fn slash_path(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// 100-nanosecond ticks
pub fn ticks(duration: Duration) -> u128 {
    duration.as_nanos() / 100
}

/// Render reports as an indented `perf-data` document
pub fn to_xml(reports: &[BuildReport]) -> String {
    let mut xml = String::new();
    xml.push_str(r#"<?xml version="1.0" encoding="utf-8" standalone="yes"?>"#);
    xml.push('\n');
    xml.push_str("<perf-data>\n");

    for report in reports {
        let mut attrs = vec![
            ("name", report.test_name.clone()),
            ("result", report.result.to_string()),
        ];
        if let Some(platform) = &report.platform {
            attrs.push(("platform", platform.clone()));
        }
        attrs.push(("configuration", report.configuration.clone()));

        let success = report.result == BuildResult::Success;
        if success {
            let duration = report.duration.unwrap_or_default();
            attrs.push(("duration", ticks(duration).to_string()));
            attrs.push(("duration-formatted", format_elapsed(duration)));
            attrs.push(("total-size", report.total_size().to_string()));
        }

        let files = if success { report.files() } else { &[] };
        if files.is_empty() {
            xml.push_str(&format!("  <test{} />\n", attributes(&attrs)));
            continue;
        }

        xml.push_str(&format!("  <test{}>\n", attributes(&attrs)));
        for file in files {
            let file_attrs = [("name", file.name.clone()), ("size", file.size.to_string())];
            xml.push_str(&format!("    <file{} />\n", attributes(&file_attrs)));
        }
        xml.push_str("  </test>\n");
    }

    xml.push_str("</perf-data>\n");
    xml
}

fn attributes(attrs: &[(&str, String)]) -> String {
    attrs
        .iter()
        .map(|(key, value)| format!(r#" {key}="{}""#, escape(value)))
        .collect()
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
