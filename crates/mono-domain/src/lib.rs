#![deny(clippy::all, warnings)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate
)]

pub mod compose;
pub mod config;
pub mod paths;
pub mod project;

pub use compose::{compose, ConfigTransform};
pub use config::{
    kind_for_path, path_option_keys, shareable_specs, spec_for, ConfigKind, FieldSpec, KindSpec,
    Relativity, SharingSpec, KIND_SPECS,
};
pub use paths::{ascent_to_root, is_under, normalize, rebase};
pub use project::{
    parse_manifest, render_manifest, ProjectDescriptor, ProjectManifest, ProjectType, TargetConfig,
    PROJECT_MANIFEST,
};
