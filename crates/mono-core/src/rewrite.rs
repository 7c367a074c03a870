//! Table-driven rewriting of path-bearing config fields. The field tables
//! live in `mono-domain`; this module walks a parsed document with them and
//! remaps whatever the move invalidated.

use std::collections::HashMap;

use camino::Utf8Path;
use mono_domain::config::{FieldSpec, KindSpec, Relativity, KIND_SPECS};
use mono_domain::paths::{is_under, rebase};
use once_cell::sync::Lazy;
use serde_json::Value;

use crate::report::Warning;

#[derive(Clone, Copy, Debug)]
enum Segment {
    Key(&'static str),
    /// `*`: every value of an object.
    AnyValue,
    /// `[]` suffix: every element of an array.
    Each,
}

static SELECTORS: Lazy<HashMap<&'static str, Vec<Segment>>> = Lazy::new(|| {
    KIND_SPECS
        .iter()
        .flat_map(|spec| spec.fields.iter())
        .map(|field| (field.selector, parse_selector(field.selector)))
        .collect()
});

fn parse_selector(selector: &'static str) -> Vec<Segment> {
    let mut segments = Vec::new();
    for part in selector.split('.') {
        if part == "*" {
            segments.push(Segment::AnyValue);
        } else if let Some(key) = part.strip_suffix("[]") {
            segments.push(Segment::Key(key));
            segments.push(Segment::Each);
        } else {
            segments.push(Segment::Key(part));
        }
    }
    segments
}

/// Remaps every registered path field of `doc` from `old_root` to `new_root`.
/// Fields that cannot be interpreted as a path are left untouched and
/// reported; absolute values and values outside the project are left
/// untouched silently.
pub fn rewrite_fields(
    spec: &KindSpec,
    doc: &mut Value,
    old_root: &Utf8Path,
    new_root: &Utf8Path,
    origin: &Utf8Path,
) -> Vec<Warning> {
    let mut warnings = Vec::new();
    for field in spec.fields {
        let segments = &SELECTORS[field.selector];
        visit(doc, segments, &mut |value| {
            remap_terminal(value, field, old_root, new_root, origin, &mut warnings);
        });
    }
    warnings
}

fn visit(value: &mut Value, segments: &[Segment], apply: &mut dyn FnMut(&mut Value)) {
    match segments.split_first() {
        None => apply(value),
        Some((Segment::Key(key), rest)) => {
            if let Some(child) = value.get_mut(*key) {
                visit(child, rest, apply);
            }
        }
        Some((Segment::AnyValue, rest)) => {
            if let Some(map) = value.as_object_mut() {
                for child in map.values_mut() {
                    visit(child, rest, apply);
                }
            }
        }
        Some((Segment::Each, rest)) => {
            if let Some(items) = value.as_array_mut() {
                for child in items.iter_mut() {
                    visit(child, rest, apply);
                }
            }
        }
    }
}

fn remap_terminal(
    value: &mut Value,
    field: &FieldSpec,
    old_root: &Utf8Path,
    new_root: &Utf8Path,
    origin: &Utf8Path,
    warnings: &mut Vec<Warning>,
) {
    match value {
        Value::String(raw) => {
            remap_scalar(raw, field, old_root, new_root, origin, field.selector, warnings);
        }
        // Several formats accept either one path or a list of them.
        Value::Array(items) => {
            for (idx, item) in items.iter_mut().enumerate() {
                let label = format!("{}[{idx}]", field.selector);
                match item {
                    Value::String(raw) => {
                        remap_scalar(raw, field, old_root, new_root, origin, &label, warnings);
                    }
                    other => warnings.push(Warning::field(
                        origin,
                        label,
                        format!("expected a path string, found {}", json_type(other)),
                    )),
                }
            }
        }
        other => warnings.push(Warning::field(
            origin,
            field.selector,
            format!("expected a path string, found {}", json_type(other)),
        )),
    }
}

fn remap_scalar(
    raw: &mut String,
    field: &FieldSpec,
    old_root: &Utf8Path,
    new_root: &Utf8Path,
    origin: &Utf8Path,
    label: &str,
    warnings: &mut Vec<Warning>,
) {
    if raw.is_empty() || looks_templated(raw) {
        warnings.push(Warning::field(origin, label, "value is not a plain path, left untouched"));
        return;
    }
    if field.relativity == Relativity::FileRelative {
        // Moves together with everything it references; nothing to remap.
        return;
    }
    let path = Utf8Path::new(raw.as_str());
    if path.is_absolute() || !is_under(path, old_root) {
        return;
    }
    if let Some(mapped) = rebase(path, old_root, new_root) {
        *raw = mapped.into_string();
    }
}

fn looks_templated(raw: &str) -> bool {
    raw.contains('{') || raw.contains('}') || raw.contains('$')
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
