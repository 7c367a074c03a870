use anyhow::{anyhow, Result};
use camino::{Utf8Path, Utf8PathBuf};
use indexmap::IndexMap;
use mono_domain::paths::normalize;

use super::Tree;

/// In-memory tree keyed by normalized path, in insertion order. The test
/// vehicle for the engine, and a convenient staging area for callers that
/// want to inspect a conversion before touching disk.
#[derive(Clone, Debug, Default)]
pub struct MemoryTree {
    files: IndexMap<Utf8PathBuf, String>,
}

impl MemoryTree {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a tree from `(path, contents)` pairs.
    #[must_use]
    pub fn with_files(entries: &[(&str, &str)]) -> Self {
        let mut tree = Self::new();
        for (path, contents) in entries {
            tree.files
                .insert(normalize(Utf8Path::new(path)), (*contents).to_string());
        }
        tree
    }
}

impl Tree for MemoryTree {
    fn files(&self) -> Vec<Utf8PathBuf> {
        self.files.keys().cloned().collect()
    }

    fn exists(&self, path: &Utf8Path) -> bool {
        self.files.contains_key(&normalize(path))
    }

    fn read(&self, path: &Utf8Path) -> Result<String> {
        self.files
            .get(&normalize(path))
            .cloned()
            .ok_or_else(|| anyhow!("{path} not found"))
    }

    fn write(&mut self, path: &Utf8Path, contents: &str) -> Result<()> {
        self.files.insert(normalize(path), contents.to_string());
        Ok(())
    }

    fn delete(&mut self, path: &Utf8Path) -> Result<()> {
        self.files
            .shift_remove(&normalize(path))
            .map(|_| ())
            .ok_or_else(|| anyhow!("{path} not found"))
    }
}
