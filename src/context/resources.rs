//! Filesystem view of a component.

use crate::error::CollaboratorFault;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Read-only access to the files of a component.
///
/// Paths crossing this interface are relative to [`base_dir`](Self::base_dir)
/// and always use `/` as the separator.
pub trait ResourceRoot: Send + Sync {
    fn base_dir(&self) -> &Path;

    /// Lists regular files under `dir` whose file name matches the glob
    /// `name_pattern`, sorted by path string.
    ///
    /// A `dir` that does not exist lists as empty.
    fn list_files(
        &self,
        dir: &str,
        name_pattern: &str,
        recursive: bool,
    ) -> Result<Vec<String>, CollaboratorFault>;

    fn read_lines(&self, path: &str) -> Result<Vec<String>, CollaboratorFault>;
}

/// [`ResourceRoot`] backed by a local directory.
#[derive(Debug, Clone)]
pub struct FsRoot {
    base: PathBuf,
}

impl FsRoot {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        FsRoot { base: base.into() }
    }

    fn resolve(&self, relative: &str) -> PathBuf {
        let trimmed = relative.trim_matches('/');
        if trimmed.is_empty() || trimmed == "." {
            self.base.clone()
        } else {
            self.base.join(trimmed)
        }
    }
}

impl ResourceRoot for FsRoot {
    fn base_dir(&self) -> &Path {
        &self.base
    }

    fn list_files(
        &self,
        dir: &str,
        name_pattern: &str,
        recursive: bool,
    ) -> Result<Vec<String>, CollaboratorFault> {
        let pattern =
            glob::Pattern::new(name_pattern).map_err(|e| CollaboratorFault::NamePattern {
                pattern: name_pattern.to_string(),
                reason: e.to_string(),
            })?;
        let start = self.resolve(dir);
        if !start.is_dir() {
            return Ok(vec![]);
        }

        let mut walker = WalkDir::new(&start).follow_links(false);
        if !recursive {
            walker = walker.max_depth(1);
        }

        let mut files = Vec::new();
        for entry in walker {
            let entry = entry.map_err(|source| CollaboratorFault::Walk {
                path: start.clone(),
                source,
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy();
            if !pattern.matches(&name) {
                continue;
            }
            if let Ok(relative) = entry.path().strip_prefix(&self.base) {
                files.push(to_slash(relative));
            }
        }
        files.sort();
        Ok(files)
    }

    fn read_lines(&self, path: &str) -> Result<Vec<String>, CollaboratorFault> {
        let full = self.resolve(path);
        let content = std::fs::read_to_string(&full)
            .map_err(|source| CollaboratorFault::Io { path: full, source })?;
        Ok(content
            .lines()
            .map(|l| l.trim_end_matches('\r').to_string())
            .collect())
    }
}

fn to_slash(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
