//! Ownership classification. A declarative rule set decides which paths the
//! root project may take with it when it moves; everything the rules cannot
//! positively attribute stays where it is.

use camino::{Utf8Path, Utf8PathBuf};
use indexmap::IndexSet;
use mono_domain::config::path_option_keys;
use mono_domain::paths::{is_under, normalize};
use mono_domain::project::ProjectDescriptor;
use serde_json::Value;

use crate::tree::Tree;

/// Workspace infrastructure that is never moved, whatever the ownership
/// heuristics say. Entries ending in `/` deny a whole directory.
pub const DEFAULT_DENYLIST: &[&str] = &[
    ".git/",
    ".gitignore",
    ".gitattributes",
    ".editorconfig",
    ".prettierrc",
    ".prettierignore",
    "README.md",
    "LICENSE",
    "CHANGELOG.md",
    "package.json",
    "package-lock.json",
    "yarn.lock",
    "pnpm-lock.yaml",
    "workspace.json",
    "node_modules/",
    "tools/",
    ".github/",
    ".vscode/",
    "tsconfig.base.json",
    ".eslintrc.base.json",
    "jest.preset.json",
];

/// Per-project filenames attributed to a project when found directly at its
/// root.
pub const DEFAULT_CONVENTIONAL: &[&str] = &[
    "project.json",
    "tsconfig.json",
    "tsconfig.app.json",
    "tsconfig.lib.json",
    "tsconfig.spec.json",
    ".eslintrc.json",
    "jest.config.json",
    "webpack.config.js",
    "vite.config.ts",
    "index.html",
    ".babelrc",
];

#[derive(Clone, Debug)]
pub struct OwnershipRules {
    pub denylist: Vec<String>,
    pub conventional: Vec<String>,
}

impl Default for OwnershipRules {
    fn default() -> Self {
        Self {
            denylist: DEFAULT_DENYLIST.iter().map(ToString::to_string).collect(),
            conventional: DEFAULT_CONVENTIONAL
                .iter()
                .map(ToString::to_string)
                .collect(),
        }
    }
}

impl OwnershipRules {
    pub fn is_denied(&self, path: &Utf8Path) -> bool {
        self.denylist.iter().any(|entry| {
            if let Some(prefix) = entry.strip_suffix('/') {
                is_under(path, Utf8Path::new(prefix))
            } else {
                path == Utf8Path::new(entry)
            }
        })
    }
}

/// Paths the root project owns, in tree order. Rules apply in fixed
/// precedence: denylist, then other projects' roots (both exclude), then
/// explicit target references, conventional filenames, and the `sourceRoot`
/// prefix (all attribute). Anything unmatched is workspace-global.
pub fn owned_paths(
    tree: &dyn Tree,
    projects: &[ProjectDescriptor],
    root: &ProjectDescriptor,
    rules: &OwnershipRules,
) -> IndexSet<Utf8PathBuf> {
    let referenced = referenced_paths(root);
    let conventional: IndexSet<Utf8PathBuf> = rules
        .conventional
        .iter()
        .map(|name| project_file(&root.root, name))
        .collect();
    let nested_roots: Vec<Utf8PathBuf> = projects
        .iter()
        .filter(|project| !project.is_root())
        .map(|project| project.root.clone())
        .collect();
    let source_root = root.manifest.source_root.as_deref().map(normalize);

    let mut owned = IndexSet::new();
    for path in tree.files() {
        let path = normalize(&path);
        if rules.is_denied(&path) {
            continue;
        }
        if nested_roots.iter().any(|other| is_under(&path, other)) {
            continue;
        }
        let attributed = referenced.contains(&path)
            || conventional.contains(&path)
            || source_root
                .as_deref()
                .is_some_and(|src| is_under(&path, src));
        if attributed {
            owned.insert(path);
        }
    }
    owned
}

fn referenced_paths(project: &ProjectDescriptor) -> IndexSet<Utf8PathBuf> {
    let mut referenced = IndexSet::new();
    for target in project.manifest.targets.values() {
        for key in path_option_keys() {
            if let Some(Value::String(value)) = target.options.get(key) {
                referenced.insert(normalize(Utf8Path::new(value)));
            }
        }
    }
    referenced
}

fn project_file(root: &Utf8Path, name: &str) -> Utf8PathBuf {
    if root.as_str() == "." {
        Utf8PathBuf::from(name)
    } else {
        root.join(name)
    }
}
