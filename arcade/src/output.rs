//! Output directory of a run.
//!
//! Outputs stay inside the project tree. A requested directory elsewhere is
//! replaced by `<project>/out`.
use anyhow::{Context, Result};
use std::{
    env, fs,
    path::{Component, Path, PathBuf},
};

/// Name of the default output directory in the project.
pub const DEFAULT_OUT_DIR: &str = "out";

/// Resolved output directory.
#[derive(Debug, Clone, PartialEq)]
pub struct SaveDir {
    /// Directory where the outputs are written.
    pub path: PathBuf,

    /// Requested directory that was outside the project, if any.
    pub rejected: Option<PathBuf>,
}

/// Removes `.` and `..` components without touching the filesystem.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for c in path.components() {
        match c {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            c => out.push(c.as_os_str()),
        }
    }
    out
}

fn absolute(path: &Path, cwd: &Path) -> PathBuf {
    match path.is_absolute() {
        true => normalize(path),
        false => normalize(&cwd.join(path)),
    }
}

/// Resolves the output directory relative to `cwd`.
///
/// Without a request the default `<project>/out` is used. A request is accepted
/// only if it is the project directory or lies below it.
pub fn resolve_save_dir_in(project_dir: &Path, requested: Option<&Path>, cwd: &Path) -> SaveDir {
    let project_dir = absolute(project_dir, cwd);
    let default = project_dir.join(DEFAULT_OUT_DIR);

    match requested.map(|p| absolute(p, cwd)) {
        None => SaveDir {
            path: default,
            rejected: None,
        },
        Some(path) if path.starts_with(&project_dir) => SaveDir {
            path,
            rejected: None,
        },
        Some(path) => SaveDir {
            path: default,
            rejected: Some(path),
        },
    }
}

/// Resolves the output directory relative to the current directory and creates it.
pub fn resolve_save_dir(project_dir: &Path, requested: Option<&Path>) -> Result<SaveDir> {
    let cwd = env::current_dir()?;
    let save_dir = resolve_save_dir_in(project_dir, requested, &cwd);
    fs::create_dir_all(&save_dir.path)
        .with_context(|| format!("Failed to create {:?}", save_dir.path))?;
    Ok(save_dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempdir::TempDir;

    #[test]
    fn default_is_out_in_project() {
        let dir = resolve_save_dir_in(Path::new("proj"), None, Path::new("/work"));
        assert_eq!(dir.path, PathBuf::from("/work/proj/out"));
        assert_eq!(dir.rejected, None);
    }

    #[test]
    fn requested_dir_inside_project_is_kept() {
        let dir = resolve_save_dir_in(
            Path::new("/work/proj"),
            Some(Path::new("/work/proj/runs/./a")),
            Path::new("/"),
        );
        assert_eq!(dir.path, PathBuf::from("/work/proj/runs/a"));
        assert_eq!(dir.rejected, None);

        let dir = resolve_save_dir_in(Path::new("."), Some(Path::new("runs")), Path::new("/work"));
        assert_eq!(dir.path, PathBuf::from("/work/runs"));
    }

    #[test]
    fn requested_dir_outside_project_falls_back() {
        let dir = resolve_save_dir_in(
            Path::new("/work/proj"),
            Some(Path::new("/work/proj/../elsewhere")),
            Path::new("/"),
        );
        assert_eq!(dir.path, PathBuf::from("/work/proj/out"));
        assert_eq!(dir.rejected, Some(PathBuf::from("/work/elsewhere")));

        // A sibling sharing the name prefix is not inside the project
        let dir = resolve_save_dir_in(
            Path::new("/work/proj"),
            Some(Path::new("/work/project2")),
            Path::new("/"),
        );
        assert_eq!(dir.rejected, Some(PathBuf::from("/work/project2")));
    }

    #[test]
    fn save_dir_is_created() -> Result<()> {
        let tmp = TempDir::new("save_dir")?;
        let requested = tmp.path().join("runs/1");
        let dir = resolve_save_dir(tmp.path(), Some(&requested))?;
        assert_eq!(dir.path, normalize(&requested));
        assert!(dir.path.is_dir());
        Ok(())
    }
}
