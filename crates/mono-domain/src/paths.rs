use camino::{Utf8Component, Utf8Path, Utf8PathBuf};

/// Strips `.` components from a tree path. The workspace root itself
/// normalizes to `.`.
pub fn normalize(path: &Utf8Path) -> Utf8PathBuf {
    let mut out = Utf8PathBuf::new();
    for component in path.components() {
        match component {
            Utf8Component::CurDir => {}
            other => out.push(other.as_str()),
        }
    }
    if out.as_str().is_empty() {
        Utf8PathBuf::from(".")
    } else {
        out
    }
}

/// Whether `path` sits at or below `root`. `root == "."` covers every
/// relative path that does not escape the workspace.
pub fn is_under(path: &Utf8Path, root: &Utf8Path) -> bool {
    let path = normalize(path);
    if path.is_absolute() || path.starts_with("..") {
        return false;
    }
    let root = normalize(root);
    if root.as_str() == "." {
        return true;
    }
    path.starts_with(&root)
}

/// Substitutes the `old_root` prefix of `path` with `new_root`, preserving the
/// remainder. Returns `None` when `path` does not live under `old_root`.
pub fn rebase(path: &Utf8Path, old_root: &Utf8Path, new_root: &Utf8Path) -> Option<Utf8PathBuf> {
    if !is_under(path, old_root) {
        return None;
    }
    let path = normalize(path);
    let old_root = normalize(old_root);
    let rel = if old_root.as_str() == "." {
        path.as_path()
    } else {
        path.strip_prefix(&old_root).ok()?
    };
    let new_root = normalize(new_root);
    if rel.as_str() == "." {
        Some(new_root)
    } else if new_root.as_str() == "." {
        Some(rel.to_path_buf())
    } else {
        Some(new_root.join(rel))
    }
}

/// The `../..`-style prefix that climbs from `project_root` back up to the
/// workspace root. Used when a relocated artifact must keep referencing a
/// workspace-root file.
pub fn ascent_to_root(project_root: &Utf8Path) -> Utf8PathBuf {
    let root = normalize(project_root);
    if root.as_str() == "." {
        return Utf8PathBuf::from(".");
    }
    let depth = root.components().count();
    let mut out = Utf8PathBuf::new();
    for _ in 0..depth {
        out.push("..");
    }
    out
}
