use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::{Display, EnumString};

use crate::paths::normalize;

pub const PROJECT_MANIFEST: &str = "project.json";

/// Decides which top-level directory a relocated project lands in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum ProjectType {
    #[serde(rename = "application")]
    Application,
    #[default]
    #[serde(rename = "library")]
    Library,
}

/// One runnable target of a project. Only a fixed set of option keys is
/// path-typed (see [`crate::config::path_option_keys`]); everything else is an
/// opaque scalar the engine never interprets.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TargetConfig {
    pub executor: String,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub options: IndexMap<String, Value>,
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

/// Parsed `project.json`. Unknown fields ride along in `extra` so a manifest
/// survives a read/modify/write cycle without losing anything.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectManifest {
    pub name: String,
    #[serde(default)]
    pub project_type: ProjectType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root: Option<Utf8PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_root: Option<Utf8PathBuf>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub targets: IndexMap<String, TargetConfig>,
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

/// A project as discovered in the tree: its manifest plus the directory the
/// manifest was read from. The directory is authoritative; a stale `root`
/// field inside the manifest never overrides it.
#[derive(Clone, Debug)]
pub struct ProjectDescriptor {
    pub root: Utf8PathBuf,
    pub manifest: ProjectManifest,
}

impl ProjectDescriptor {
    pub fn new(root: impl AsRef<Utf8Path>, manifest: ProjectManifest) -> Self {
        Self {
            root: normalize(root.as_ref()),
            manifest,
        }
    }

    /// A root project sits directly at the workspace root.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.root.as_str() == "."
    }

    #[must_use]
    pub fn manifest_path(&self) -> Utf8PathBuf {
        if self.is_root() {
            Utf8PathBuf::from(PROJECT_MANIFEST)
        } else {
            self.root.join(PROJECT_MANIFEST)
        }
    }
}

pub fn parse_manifest(contents: &str) -> Result<ProjectManifest> {
    serde_json::from_str(contents).context("failed to parse project manifest")
}

pub fn render_manifest(manifest: &ProjectManifest) -> Result<String> {
    let rendered = serde_json::to_string_pretty(manifest)?;
    Ok(format!("{rendered}\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const MANIFEST: &str = r#"{
  "name": "my-lib",
  "projectType": "library",
  "sourceRoot": "src",
  "targets": {
    "build": {
      "executor": "@nx/js:tsc",
      "options": {
        "main": "src/index.ts",
        "tsConfig": "tsconfig.lib.json"
      },
      "configurations": {
        "production": { "optimization": true }
      }
    }
  },
  "tags": ["scope:shared"]
}"#;

    #[test]
    fn parses_targets_and_keeps_unknown_fields() -> Result<()> {
        let manifest = parse_manifest(MANIFEST)?;
        assert_eq!(manifest.name, "my-lib");
        assert_eq!(manifest.project_type, ProjectType::Library);
        assert_eq!(manifest.source_root.as_deref(), Some(Utf8Path::new("src")));
        let build = &manifest.targets["build"];
        assert_eq!(build.executor, "@nx/js:tsc");
        assert_eq!(build.options["main"], "src/index.ts");
        assert!(build.extra.contains_key("configurations"));
        assert!(manifest.extra.contains_key("tags"));
        Ok(())
    }

    #[test]
    fn render_round_trips_extra_fields() -> Result<()> {
        let manifest = parse_manifest(MANIFEST)?;
        let rendered = render_manifest(&manifest)?;
        let reparsed = parse_manifest(&rendered)?;
        assert_eq!(reparsed.extra["tags"], serde_json::json!(["scope:shared"]));
        assert!(reparsed.targets["build"].extra.contains_key("configurations"));
        Ok(())
    }

    #[test]
    fn project_type_defaults_to_library() -> Result<()> {
        let manifest = parse_manifest(r#"{ "name": "bare" }"#)?;
        assert_eq!(manifest.project_type, ProjectType::Library);
        assert_eq!(manifest.project_type.to_string(), "library");
        Ok(())
    }

    #[test]
    fn descriptor_roots_are_normalized() {
        let manifest = parse_manifest(r#"{ "name": "demo", "projectType": "application" }"#)
            .expect("manifest");
        let root = ProjectDescriptor::new("./", manifest.clone());
        assert!(root.is_root());
        assert_eq!(root.manifest_path(), PROJECT_MANIFEST);

        let nested = ProjectDescriptor::new("inner/my-lib", manifest);
        assert!(!nested.is_root());
        assert_eq!(nested.manifest_path(), "inner/my-lib/project.json");
    }
}
