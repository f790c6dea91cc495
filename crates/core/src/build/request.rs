use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::process::EnvValue;

/// What to build and how to name it in the report
#[derive(Debug, Clone)]
pub struct BuildRequest {
    pub project: PathBuf,
    pub platform: Option<String>,
    pub configuration: String,
    pub target: Option<String>,
    pub env: BTreeMap<String, EnvValue>,
    pub test_name: String,
}

impl BuildRequest {
    /// A request named after the project file's stem
    pub fn new(project: impl Into<PathBuf>, configuration: impl Into<String>) -> Self {
        let project = project.into();
        let test_name = project
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            project,
            platform: None,
            configuration: configuration.into(),
            target: None,
            env: BTreeMap::new(),
            test_name,
        }
    }

    pub fn with_platform(mut self, platform: impl Into<String>) -> Self {
        let platform = platform.into();
        self.platform = (!platform.is_empty()).then_some(platform);
        self
    }

    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        let target = target.into();
        self.target = (!target.is_empty()).then_some(target);
        self
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), EnvValue::Set(value.into()));
        self
    }

    pub fn without_env(mut self, key: impl Into<String>) -> Self {
        self.env.insert(key.into(), EnvValue::Unset);
        self
    }

    pub fn with_test_name(mut self, name: impl Into<String>) -> Self {
        self.test_name = name.into();
        self
    }

    pub fn platform(&self) -> Option<&str> {
        self.platform.as_deref()
    }

    /// Name used for the performance report file
    pub fn subject(&self) -> String {
        self.project
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "build".to_string())
    }

    /// Arguments for the compiler/linker driver
    pub fn compile_args(&self) -> Vec<String> {
        let mut args = vec!["/verbosity:diag".to_string()];
        if let Some(platform) = &self.platform {
            args.push(format!("/p:Platform={platform}"));
        }
        if !self.configuration.is_empty() {
            args.push(format!("/p:Configuration={}", self.configuration));
        }
        args.push(path_arg(&self.project));
        if let Some(target) = &self.target {
            args.push(format!("/t:{target}"));
        }
        args
    }
}

pub(crate) fn path_arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compile_args_full() {
        let request = BuildRequest::new("/samples/Foo/Foo.sln", "Release")
            .with_platform("iPhone")
            .with_target("Build");
        assert_eq!(
            request.compile_args(),
            [
                "/verbosity:diag",
                "/p:Platform=iPhone",
                "/p:Configuration=Release",
                "/samples/Foo/Foo.sln",
                "/t:Build",
            ]
        );
    }

    #[test]
    fn test_compile_args_minimal() {
        let request = BuildRequest::new("Foo.csproj", "")
            .with_platform("")
            .with_target("");
        assert_eq!(request.compile_args(), ["/verbosity:diag", "Foo.csproj"]);
        assert_eq!(request.platform(), None);
    }

    #[test]
    fn test_names() {
        let request = BuildRequest::new("/samples/Foo/Foo.sln", "Debug");
        assert_eq!(request.test_name, "Foo");
        assert_eq!(request.subject(), "Foo");
        let request = request.with_test_name("Samples.Build(Foo)");
        assert_eq!(request.test_name, "Samples.Build(Foo)");
    }
}
