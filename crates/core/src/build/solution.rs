use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::request::path_arg;
use crate::error::{Error, Result};

/// Which solutions to restore, and where the build output tree lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestorePlan {
    pub solutions: Vec<PathBuf>,
    pub solution_dir: PathBuf,
    /// True when the solutions were found by walking upward from a project
    pub discovered: bool,
}

impl RestorePlan {
    /// Arguments for the restore tool, one invocation per solution
    pub fn restore_args(&self, solution: &Path) -> Vec<String> {
        let mut args = vec![
            "restore".to_string(),
            path_arg(solution),
            "-Verbosity".to_string(),
            "detailed".to_string(),
        ];
        if self.discovered {
            args.push("-SolutionDir".to_string());
            args.push(path_arg(&self.solution_dir));
        }
        args
    }
}

/// A solution file is restored as given; anything else triggers an upward
/// search for the nearest directory holding at least one solution.
pub fn plan_restore(project: &Path, extension: &str) -> Result<RestorePlan> {
    if has_extension(project, extension) {
        return Ok(RestorePlan {
            solutions: vec![project.to_path_buf()],
            solution_dir: parent_dir(project),
            discovered: false,
        });
    }

    let start = if project.is_dir() {
        project.to_path_buf()
    } else {
        parent_dir(project)
    };
    // A relative start would run out of parents at "" instead of "/".
    let start = std::path::absolute(&start)?;

    let mut current = Some(start.as_path());
    while let Some(dir) = current.filter(|dir| !dir.as_os_str().is_empty()) {
        let solutions = solutions_in(dir, extension)?;
        if !solutions.is_empty() {
            debug!("Found {} solution(s) in {}", solutions.len(), dir.display());
            return Ok(RestorePlan {
                solutions,
                solution_dir: dir.to_path_buf(),
                discovered: true,
            });
        }
        current = dir.parent();
    }

    Err(Error::NoSolutionFound(start))
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension().is_some_and(|ext| ext == extension)
}

fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

fn solutions_in(dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    let mut solutions = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && has_extension(&path, extension) {
            solutions.push(path);
        }
    }
    solutions.sort();
    Ok(solutions)
}
