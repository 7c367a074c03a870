//! The per-format strategy tables. Each configuration kind declares its
//! project-level filename, which of its fields carry paths (and what those
//! paths are relative to), and whether the kind can be split into a
//! workspace-root base file. Supporting a new format means adding a table
//! entry, not new control flow.

use camino::Utf8Path;
use strum::{Display, EnumString};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "kebab-case")]
pub enum ConfigKind {
    Manifest,
    Compiler,
    Lint,
    TestRunner,
    Bundler,
}

/// What a path-bearing field is resolved against.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Relativity {
    /// Resolved from the workspace root; must be remapped when the project
    /// moves (`sourceRoot`, target entry points).
    WorkspaceRelative,
    /// Resolved from the file that contains it; stays valid after a move
    /// because the file relocates together with everything it references.
    FileRelative,
}

#[derive(Clone, Copy, Debug)]
pub struct FieldSpec {
    /// Dotted selector into the JSON document. `*` matches every value of an
    /// object, a `[]` suffix on a segment matches every element of an array.
    pub selector: &'static str,
    pub relativity: Relativity,
}

#[derive(Clone, Copy, Debug)]
pub struct SharingSpec {
    /// Base artifact created (or merged into) at the workspace root.
    pub base_filename: &'static str,
    /// Field in the project-local override that points back at the base.
    pub extends_key: &'static str,
    /// Some formats (eslint) expect the extends relation as an array.
    pub extends_as_array: bool,
    /// Top-level fields that are workspace-wide defaults rather than
    /// project-specific settings.
    pub shared_fields: &'static [&'static str],
}

#[derive(Clone, Copy, Debug)]
pub struct KindSpec {
    pub kind: ConfigKind,
    /// Canonical filename at a project root.
    pub filename: &'static str,
    /// Structured kinds are parsed and rewritten as JSON; the rest relocate
    /// verbatim.
    pub structured: bool,
    pub fields: &'static [FieldSpec],
    pub sharing: Option<SharingSpec>,
}

const fn workspace(selector: &'static str) -> FieldSpec {
    FieldSpec {
        selector,
        relativity: Relativity::WorkspaceRelative,
    }
}

const fn file(selector: &'static str) -> FieldSpec {
    FieldSpec {
        selector,
        relativity: Relativity::FileRelative,
    }
}

const MANIFEST_FIELDS: &[FieldSpec] = &[
    workspace("sourceRoot"),
    workspace("targets.*.options.main"),
    workspace("targets.*.options.index"),
    workspace("targets.*.options.tsConfig"),
    workspace("targets.*.options.webpackConfig"),
    workspace("targets.*.options.jestConfig"),
    workspace("targets.*.options.outputPath"),
    workspace("targets.*.options.polyfills"),
];

const COMPILER_FIELDS: &[FieldSpec] = &[
    file("extends"),
    file("files"),
    file("include"),
    file("exclude"),
    file("references[].path"),
    file("compilerOptions.outDir"),
    file("compilerOptions.rootDir"),
];

const LINT_FIELDS: &[FieldSpec] = &[file("extends"), file("ignorePatterns")];

const TEST_RUNNER_FIELDS: &[FieldSpec] = &[
    file("preset"),
    file("setupFiles"),
    file("coverageDirectory"),
];

pub static KIND_SPECS: &[KindSpec] = &[
    KindSpec {
        kind: ConfigKind::Manifest,
        filename: "project.json",
        structured: true,
        fields: MANIFEST_FIELDS,
        sharing: None,
    },
    KindSpec {
        kind: ConfigKind::Compiler,
        filename: "tsconfig.json",
        structured: true,
        fields: COMPILER_FIELDS,
        sharing: Some(SharingSpec {
            base_filename: "tsconfig.base.json",
            extends_key: "extends",
            extends_as_array: false,
            shared_fields: &["compileOnSave", "compilerOptions"],
        }),
    },
    KindSpec {
        kind: ConfigKind::Lint,
        filename: ".eslintrc.json",
        structured: true,
        fields: LINT_FIELDS,
        sharing: Some(SharingSpec {
            base_filename: ".eslintrc.base.json",
            extends_key: "extends",
            extends_as_array: true,
            shared_fields: &[
                "root",
                "env",
                "parser",
                "parserOptions",
                "plugins",
                "settings",
                "rules",
                "extends",
            ],
        }),
    },
    KindSpec {
        kind: ConfigKind::TestRunner,
        filename: "jest.config.json",
        structured: true,
        fields: TEST_RUNNER_FIELDS,
        sharing: Some(SharingSpec {
            base_filename: "jest.preset.json",
            extends_key: "preset",
            extends_as_array: false,
            shared_fields: &[
                "testEnvironment",
                "transform",
                "moduleFileExtensions",
                "coverageReporters",
            ],
        }),
    },
    KindSpec {
        kind: ConfigKind::Bundler,
        filename: "webpack.config.js",
        structured: false,
        fields: &[],
        sharing: None,
    },
];

pub fn spec_for(kind: ConfigKind) -> &'static KindSpec {
    KIND_SPECS
        .iter()
        .find(|spec| spec.kind == kind)
        .expect("every kind has a table entry")
}

/// Kinds that can be split into a workspace-root base plus a project-local
/// override.
pub fn shareable_specs() -> impl Iterator<Item = &'static KindSpec> {
    KIND_SPECS.iter().filter(|spec| spec.sharing.is_some())
}

/// Target option keys whose values are paths, derived from the manifest field
/// table so the classifier and the rewriter agree on a single source.
pub fn path_option_keys() -> impl Iterator<Item = &'static str> {
    MANIFEST_FIELDS
        .iter()
        .filter_map(|field| field.selector.strip_prefix("targets.*.options."))
}

/// Maps a tree path to the configuration kind that governs it, if any.
/// Variant filenames (`tsconfig.lib.json`, `jest.config.app.json`) resolve to
/// the same kind as their canonical file.
pub fn kind_for_path(path: &Utf8Path) -> Option<&'static KindSpec> {
    let name = path.file_name()?;
    let kind = match name {
        "project.json" => ConfigKind::Manifest,
        ".eslintrc.json" => ConfigKind::Lint,
        "webpack.config.js" | "vite.config.ts" => ConfigKind::Bundler,
        _ if name.starts_with("tsconfig.") && name.ends_with(".json") => ConfigKind::Compiler,
        _ if name.starts_with("jest.config.") && name.ends_with(".json") => ConfigKind::TestRunner,
        _ => return None,
    };
    Some(spec_for(kind))
}
