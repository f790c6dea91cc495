use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// An environment override applied on top of the inherited environment
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvValue {
    Set(String),
    /// Remove the variable from the child's environment
    Unset,
}

/// Everything needed to launch one external process
#[derive(Debug, Clone)]
pub struct ExecutionRequest {
    program: PathBuf,
    args: Vec<String>,
    working_dir: Option<PathBuf>,
    env: BTreeMap<String, EnvValue>,
    timeout: Duration,
}

impl ExecutionRequest {
    pub fn new(program: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            working_dir: None,
            env: BTreeMap::new(),
            timeout,
        }
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
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

    /// Apply a batch of overrides; later entries replace earlier ones
    pub fn with_env_overrides<'a, I>(mut self, overrides: I) -> Self
    where
        I: IntoIterator<Item = (&'a String, &'a EnvValue)>,
    {
        for (key, value) in overrides {
            self.env.insert(key.clone(), value.clone());
        }
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// The file name of the program, used to name its execution log
    pub fn program_name(&self) -> String {
        self.program
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.program.to_string_lossy().into_owned())
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn working_dir(&self) -> Option<&Path> {
        self.working_dir.as_deref()
    }

    pub fn env(&self) -> &BTreeMap<String, EnvValue> {
        &self.env
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Shell-like rendering for log messages
    pub fn to_shell_command(&self) -> String {
        let mut cmd = self.program.to_string_lossy().into_owned();
        for arg in &self.args {
            cmd.push(' ');
            if arg.contains(' ') {
                cmd.push_str(&format!("'{arg}'"));
            } else {
                cmd.push_str(arg);
            }
        }
        cmd
    }
}
