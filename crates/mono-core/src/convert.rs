//! The conversion pass: resolve the root project, classify ownership, compute
//! every relocation and rewrite in memory, then commit against the tree in a
//! single apply step. A failure before the commit leaves the tree exactly as
//! it was.

use std::collections::HashMap;

use anyhow::Result;
use camino::{Utf8Path, Utf8PathBuf};
use mono_domain::config::{kind_for_path, shareable_specs, ConfigKind, KindSpec};
use mono_domain::paths::rebase;
use mono_domain::project::{parse_manifest, ProjectDescriptor, ProjectType, PROJECT_MANIFEST};
use rayon::prelude::*;
use serde_json::Value;

use crate::classify::{owned_paths, OwnershipRules};
use crate::extract::extract_base;
use crate::report::{ConversionReport, MovedProject, Warning};
use crate::rewrite::rewrite_fields;
use crate::tree::{render_json, Tree};
use crate::workspace_meta::update_workspace_metadata;

/// Options for one conversion pass. The directory names decide where the
/// root project lands; the rules decide what it takes along.
#[derive(Clone, Debug)]
pub struct ConvertOptions {
    pub apps_dir: String,
    pub libs_dir: String,
    pub rules: OwnershipRules,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            apps_dir: "apps".to_string(),
            libs_dir: "libs".to_string(),
            rules: OwnershipRules::default(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    /// The computed destination already holds another project. Raised before
    /// any mutation.
    #[error("destination `{dest}` already contains project `{existing}`")]
    DestinationConflict {
        dest: Utf8PathBuf,
        existing: String,
    },
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Reads every project manifest in the tree. Manifests that fail to parse
/// are skipped with a warning; their files are treated as workspace-global.
pub fn discover_projects(tree: &dyn Tree) -> (Vec<ProjectDescriptor>, Vec<Warning>) {
    let mut projects = Vec::new();
    let mut warnings = Vec::new();
    for path in tree.files() {
        if path.file_name() != Some(PROJECT_MANIFEST) {
            continue;
        }
        let parsed = tree.read(&path).and_then(|contents| parse_manifest(&contents));
        match parsed {
            Ok(manifest) => {
                let root = path.parent().unwrap_or_else(|| Utf8Path::new("."));
                projects.push(ProjectDescriptor::new(root, manifest));
            }
            Err(err) => {
                warnings.push(Warning::artifact(&path, format!("skipped: {err:#}")));
            }
        }
    }
    (projects, warnings)
}

/// Relocates the root project (if any) into `{appsDir|libsDir}/{name}`,
/// rewriting its configuration artifacts, extracting shared base configs,
/// and updating workspace metadata. Returns what moved plus any recoverable
/// warnings; fatal conditions abort with the tree untouched.
pub fn convert(
    tree: &mut dyn Tree,
    options: &ConvertOptions,
) -> Result<ConversionReport, ConvertError> {
    let (projects, mut warnings) = discover_projects(tree);
    let Some(root) = projects.iter().find(|project| project.is_root()).cloned() else {
        tracing::debug!("no root project; nothing to convert");
        emit(&warnings);
        return Ok(ConversionReport {
            moved: None,
            warnings,
        });
    };

    let dest_dir = match root.manifest.project_type {
        ProjectType::Application => options.apps_dir.as_str(),
        ProjectType::Library => options.libs_dir.as_str(),
    };
    let new_root = Utf8PathBuf::from(format!("{dest_dir}/{}", root.manifest.name));

    let dest_manifest = new_root.join(PROJECT_MANIFEST);
    if tree.exists(&dest_manifest) {
        let existing = tree
            .read(&dest_manifest)
            .ok()
            .and_then(|contents| parse_manifest(&contents).ok())
            .map_or_else(|| "unknown".to_string(), |manifest| manifest.name);
        return Err(ConvertError::DestinationConflict {
            dest: new_root,
            existing,
        });
    }

    let owned = owned_paths(tree, &projects, &root, &options.rules);
    let old_root = Utf8PathBuf::from(".");

    // Compute phase: read everything up front, then plan each owned file
    // independently. Nothing below touches the tree until the commit.
    let sources = owned
        .iter()
        .map(|path| tree.read(path).map(|contents| (path.clone(), contents)))
        .collect::<Result<Vec<_>>>()?;
    let bases = read_existing_bases(tree, &mut warnings);

    let planned: Vec<PlannedFile> = sources
        .par_iter()
        .map(|(path, contents)| plan_file(path, contents, &old_root, &new_root, &bases))
        .collect();

    let mut writes = Vec::new();
    let mut deletes = Vec::new();
    for plan in planned {
        warnings.extend(plan.warnings);
        writes.extend(plan.writes);
        deletes.extend(plan.deletes);
    }

    // Commit phase: new content lands before old paths disappear.
    for (path, contents) in &writes {
        tree.write(path, contents)?;
    }
    for path in &deletes {
        tree.delete(path)?;
    }

    let moved = MovedProject {
        name: root.manifest.name.clone(),
        old_root,
        new_root,
    };
    warnings.extend(update_workspace_metadata(tree, &moved, dest_dir));

    emit(&warnings);
    tracing::info!(project = %moved.name, new_root = %moved.new_root, "relocated root project");
    Ok(ConversionReport {
        moved: Some(moved),
        warnings,
    })
}

enum BaseState {
    Absent,
    Present(Value),
    Malformed,
}

fn read_existing_bases(
    tree: &dyn Tree,
    warnings: &mut Vec<Warning>,
) -> HashMap<ConfigKind, BaseState> {
    let mut bases = HashMap::new();
    for spec in shareable_specs() {
        let Some(sharing) = spec.sharing else {
            continue;
        };
        let path = Utf8Path::new(sharing.base_filename);
        let state = if tree.exists(path) {
            let parsed = tree
                .read(path)
                .ok()
                .and_then(|contents| serde_json::from_str(&contents).ok());
            match parsed {
                Some(value) => BaseState::Present(value),
                None => {
                    warnings.push(Warning::artifact(
                        path,
                        "existing base could not be parsed; extraction skipped for this kind",
                    ));
                    BaseState::Malformed
                }
            }
        } else {
            BaseState::Absent
        };
        bases.insert(spec.kind, state);
    }
    bases
}

struct PlannedFile {
    writes: Vec<(Utf8PathBuf, String)>,
    deletes: Vec<Utf8PathBuf>,
    warnings: Vec<Warning>,
}

impl PlannedFile {
    fn moved(old: &Utf8Path, writes: Vec<(Utf8PathBuf, String)>, warnings: Vec<Warning>) -> Self {
        Self {
            writes,
            deletes: vec![old.to_path_buf()],
            warnings,
        }
    }

    fn verbatim(
        old: &Utf8Path,
        new_path: Utf8PathBuf,
        contents: &str,
        warnings: Vec<Warning>,
    ) -> Self {
        Self::moved(old, vec![(new_path, contents.to_string())], warnings)
    }
}

fn plan_file(
    path: &Utf8Path,
    contents: &str,
    old_root: &Utf8Path,
    new_root: &Utf8Path,
    bases: &HashMap<ConfigKind, BaseState>,
) -> PlannedFile {
    let mut warnings = Vec::new();
    let Some(new_path) = rebase(path, old_root, new_root) else {
        // The classifier only yields paths under the root; keep a stray one
        // where it is rather than guessing a destination.
        return PlannedFile {
            writes: Vec::new(),
            deletes: Vec::new(),
            warnings: vec![Warning::artifact(path, "outside the project root, left in place")],
        };
    };

    let Some(spec) = kind_for_path(path) else {
        return PlannedFile::verbatim(path, new_path, contents, warnings);
    };
    if !spec.structured {
        return PlannedFile::verbatim(path, new_path, contents, warnings);
    }

    let mut doc: Value = match serde_json::from_str(contents) {
        Ok(doc) => doc,
        Err(err) => {
            warnings.push(Warning::artifact(
                path,
                format!("failed to parse ({err}); relocated unchanged"),
            ));
            return PlannedFile::verbatim(path, new_path, contents, warnings);
        }
    };

    warnings.extend(rewrite_fields(spec, &mut doc, old_root, new_root, path));

    if spec.kind == ConfigKind::Manifest {
        if let Some(map) = doc.as_object_mut() {
            map.insert("root".to_string(), Value::String(new_root.to_string()));
        }
    }

    if let Some(writes) = plan_extraction(spec, path, &doc, new_root, bases, &mut warnings) {
        return PlannedFile::moved(path, writes, warnings);
    }

    PlannedFile::moved(path, vec![(new_path, render_json(&doc))], warnings)
}

/// For the root-level artifact of a shareable kind, splits it into base +
/// override. Returns `None` when the artifact is not eligible (wrong file,
/// unsplittable content, or a malformed pre-existing base).
fn plan_extraction(
    spec: &KindSpec,
    path: &Utf8Path,
    doc: &Value,
    new_root: &Utf8Path,
    bases: &HashMap<ConfigKind, BaseState>,
    warnings: &mut Vec<Warning>,
) -> Option<Vec<(Utf8PathBuf, String)>> {
    let sharing = spec.sharing?;
    if path != Utf8Path::new(spec.filename) {
        return None;
    }
    let existing = match bases.get(&spec.kind) {
        Some(BaseState::Present(value)) => Some(value),
        Some(BaseState::Absent) => None,
        // Already warned while reading; relocate without splitting.
        Some(BaseState::Malformed) | None => return None,
    };
    let Some(extracted) = extract_base(&sharing, doc, existing, new_root) else {
        warnings.push(Warning::artifact(path, "not a JSON object; relocated unsplit"));
        return None;
    };
    Some(vec![
        (
            Utf8PathBuf::from(sharing.base_filename),
            render_json(&extracted.base),
        ),
        (new_root.join(spec.filename), render_json(&extracted.overlay)),
    ])
}

fn emit(warnings: &[Warning]) {
    for warning in warnings {
        tracing::warn!(%warning, "conversion warning");
    }
}
