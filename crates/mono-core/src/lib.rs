#![deny(clippy::all, warnings)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate
)]

pub mod classify;
pub mod convert;
pub mod extract;
pub mod report;
pub mod rewrite;
pub mod tree;
pub mod workspace_meta;

pub use classify::{owned_paths, OwnershipRules, DEFAULT_CONVENTIONAL, DEFAULT_DENYLIST};
pub use convert::{convert, discover_projects, ConvertError, ConvertOptions};
pub use extract::{extract_base, ExtractedConfig};
pub use report::{ConversionReport, MovedProject, Warning};
pub use rewrite::rewrite_fields;
pub use tree::{read_json, render_json, write_json, FsTree, MemoryTree, Tree};
pub use workspace_meta::update_workspace_metadata;
