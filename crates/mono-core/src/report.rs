use std::fmt;

use camino::{Utf8Path, Utf8PathBuf};

/// Recoverable problem hit during a conversion. Warnings never abort the run;
/// they accumulate on the [`ConversionReport`] so the caller can decide what
/// to surface.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Warning {
    pub path: Utf8PathBuf,
    pub field: Option<String>,
    pub message: String,
}

impl Warning {
    pub fn artifact(path: impl AsRef<Utf8Path>, message: impl Into<String>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            field: None,
            message: message.into(),
        }
    }

    pub fn field(
        path: impl AsRef<Utf8Path>,
        field: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            field: Some(field.into()),
            message: message.into(),
        }
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.field {
            Some(field) => write!(f, "{}: `{}`: {}", self.path, field, self.message),
            None => write!(f, "{}: {}", self.path, self.message),
        }
    }
}

/// The project a conversion relocated.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MovedProject {
    pub name: String,
    pub old_root: Utf8PathBuf,
    pub new_root: Utf8PathBuf,
}

/// Outcome of one conversion pass. `moved` is `None` when the workspace had
/// no root project and the run was a no-op.
#[derive(Clone, Debug, Default)]
pub struct ConversionReport {
    pub moved: Option<MovedProject>,
    pub warnings: Vec<Warning>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn warnings_render_with_optional_field() {
        let plain = Warning::artifact("tsconfig.json", "failed to parse");
        assert_eq!(plain.to_string(), "tsconfig.json: failed to parse");

        let scoped = Warning::field("project.json", "targets.build.options.main", "templated value");
        assert_eq!(
            scoped.to_string(),
            "project.json: `targets.build.options.main`: templated value"
        );
    }
}
