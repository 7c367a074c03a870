//! Post-move updates to workspace-root metadata so whole-workspace tooling
//! finds the project at its new location. Strictly additive/corrective:
//! existing entries for other projects are never touched or removed.

use camino::Utf8Path;
use serde_json::Value;

use crate::report::{MovedProject, Warning};
use crate::tree::{read_json, write_json, Tree};

const WORKSPACE_MANIFEST: &str = "workspace.json";
const PACKAGE_MANIFEST: &str = "package.json";

/// Points the `workspace.json` project entry at the new root and widens the
/// `package.json` workspaces globs with the destination directory. Both files
/// are optional; malformed ones are skipped with a warning.
pub fn update_workspace_metadata(
    tree: &mut dyn Tree,
    moved: &MovedProject,
    dest_dir: &str,
) -> Vec<Warning> {
    let mut warnings = Vec::new();
    if let Err(err) = update_project_entry(tree, moved) {
        warnings.push(Warning::artifact(
            WORKSPACE_MANIFEST,
            format!("left unchanged: {err:#}"),
        ));
    }
    if let Err(err) = update_workspace_globs(tree, dest_dir) {
        warnings.push(Warning::artifact(
            PACKAGE_MANIFEST,
            format!("left unchanged: {err:#}"),
        ));
    }
    warnings
}

fn update_project_entry(tree: &mut dyn Tree, moved: &MovedProject) -> anyhow::Result<()> {
    let path = Utf8Path::new(WORKSPACE_MANIFEST);
    if !tree.exists(path) {
        return Ok(());
    }
    let mut doc = read_json(tree, path)?;
    let Some(projects) = doc.get_mut("projects").and_then(Value::as_object_mut) else {
        return Ok(());
    };
    projects.insert(
        moved.name.clone(),
        Value::String(moved.new_root.to_string()),
    );
    write_json(tree, path, &doc)
}

fn update_workspace_globs(tree: &mut dyn Tree, dest_dir: &str) -> anyhow::Result<()> {
    let path = Utf8Path::new(PACKAGE_MANIFEST);
    if !tree.exists(path) {
        return Ok(());
    }
    let mut doc = read_json(tree, path)?;
    // Only widen an existing workspaces declaration; inventing one would
    // change how the package manager treats the repository.
    let Some(globs) = doc.get_mut("workspaces").and_then(Value::as_array_mut) else {
        return Ok(());
    };
    let glob = format!("{dest_dir}/*");
    if !globs.iter().any(|entry| entry.as_str() == Some(glob.as_str())) {
        globs.push(Value::String(glob));
    }
    write_json(tree, path, &doc)
}
