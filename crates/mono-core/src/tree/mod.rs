//! The file-tree interface the engine operates against, plus the two stock
//! implementations: an in-memory tree for tests and callers that stage
//! changes, and a directory-backed tree for real workspaces.

mod fs;
mod memory;

pub use fs::FsTree;
pub use memory::MemoryTree;

use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use serde_json::Value;

/// Read/write access to a workspace's files. Paths are relative to the
/// workspace root, `/`-separated, UTF-8. Directories are implicit; only files
/// exist.
pub trait Tree {
    /// Every file currently in the tree, in a stable order.
    fn files(&self) -> Vec<Utf8PathBuf>;

    fn exists(&self, path: &Utf8Path) -> bool;

    fn read(&self, path: &Utf8Path) -> Result<String>;

    fn write(&mut self, path: &Utf8Path, contents: &str) -> Result<()>;

    fn delete(&mut self, path: &Utf8Path) -> Result<()>;
}

pub fn read_json(tree: &dyn Tree, path: &Utf8Path) -> Result<Value> {
    let contents = tree.read(path)?;
    serde_json::from_str(&contents).with_context(|| format!("failed to parse {path}"))
}

pub fn write_json(tree: &mut dyn Tree, path: &Utf8Path, value: &Value) -> Result<()> {
    tree.write(path, &render_json(value))
}

/// Two-space indentation with a trailing newline, matching how workspace
/// config files are conventionally formatted.
pub fn render_json(value: &Value) -> String {
    let mut rendered = serde_json::to_string_pretty(value).unwrap_or_else(|_| "null".to_string());
    rendered.push('\n');
    rendered
}
