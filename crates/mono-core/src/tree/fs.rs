use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use walkdir::WalkDir;

use super::Tree;

/// Tree backed by a real directory. Reads and writes go straight through;
/// deleting a file prunes directories it leaves empty so a relocated project
/// does not strand its old layout.
#[derive(Clone, Debug)]
pub struct FsTree {
    root: PathBuf,
}

impl FsTree {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, path: &Utf8Path) -> PathBuf {
        self.root.join(path.as_std_path())
    }

    fn prune_empty_dirs(&self, from: &Path) {
        let mut dir = from.to_path_buf();
        while dir != self.root {
            let Ok(mut entries) = fs_err::read_dir(&dir) else {
                break;
            };
            if entries.next().is_some() {
                break;
            }
            if fs_err::remove_dir(&dir).is_err() {
                break;
            }
            let Some(parent) = dir.parent() else {
                break;
            };
            dir = parent.to_path_buf();
        }
    }
}

impl Tree for FsTree {
    fn files(&self) -> Vec<Utf8PathBuf> {
        let mut files = Vec::new();
        let walker = WalkDir::new(&self.root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| entry.file_name() != ".git");
        for entry in walker.flatten() {
            if !entry.file_type().is_file() {
                continue;
            }
            let rel = entry
                .path()
                .strip_prefix(&self.root)
                .unwrap_or_else(|_| entry.path());
            match Utf8Path::from_path(rel) {
                Some(rel) => files.push(rel.to_path_buf()),
                None => {
                    tracing::debug!(path = %rel.display(), "skipping non-utf8 path");
                }
            }
        }
        files
    }

    fn exists(&self, path: &Utf8Path) -> bool {
        self.resolve(path).is_file()
    }

    fn read(&self, path: &Utf8Path) -> Result<String> {
        fs_err::read_to_string(self.resolve(path)).with_context(|| format!("failed to read {path}"))
    }

    fn write(&mut self, path: &Utf8Path, contents: &str) -> Result<()> {
        let full = self.resolve(path);
        if let Some(parent) = full.parent() {
            fs_err::create_dir_all(parent)?;
        }
        fs_err::write(full, contents).with_context(|| format!("failed to write {path}"))
    }

    fn delete(&mut self, path: &Utf8Path) -> Result<()> {
        let full = self.resolve(path);
        fs_err::remove_file(&full).with_context(|| format!("failed to delete {path}"))?;
        if let Some(parent) = full.parent() {
            self.prune_empty_dirs(parent);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_reads_and_writes_relative_files() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let mut tree = FsTree::new(dir.path());
        tree.write(Utf8Path::new("src/index.ts"), "export {};\n")?;
        tree.write(Utf8Path::new("project.json"), "{}\n")?;

        assert!(tree.exists(Utf8Path::new("src/index.ts")));
        assert_eq!(tree.read(Utf8Path::new("src/index.ts"))?, "export {};\n");
        let files: Vec<_> = tree.files().iter().map(ToString::to_string).collect();
        assert_eq!(files, ["project.json", "src/index.ts"]);
        Ok(())
    }

    #[test]
    fn delete_prunes_emptied_directories() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let mut tree = FsTree::new(dir.path());
        tree.write(Utf8Path::new("src/lib/deep.ts"), "")?;
        tree.delete(Utf8Path::new("src/lib/deep.ts"))?;
        assert!(!dir.path().join("src").exists());
        assert!(dir.path().exists());
        Ok(())
    }

    #[test]
    fn git_dir_is_invisible() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let mut tree = FsTree::new(dir.path());
        tree.write(Utf8Path::new(".git/config"), "")?;
        tree.write(Utf8Path::new("README.md"), "")?;
        let files: Vec<_> = tree.files().iter().map(ToString::to_string).collect();
        assert_eq!(files, ["README.md"]);
        Ok(())
    }
}
