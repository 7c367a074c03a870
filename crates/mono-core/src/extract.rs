//! Splitting a root-level shared config artifact into a workspace-root base
//! and a project-local override that extends it.

use camino::Utf8Path;
use mono_domain::config::SharingSpec;
use mono_domain::paths::ascent_to_root;
use serde_json::{Map, Value};

/// Result of one extraction: the (possibly merged) base artifact for the
/// workspace root, and the override for the project's new location.
#[derive(Clone, Debug)]
pub struct ExtractedConfig {
    pub base: Value,
    pub overlay: Value,
}

/// Partitions `artifact` into workspace-wide defaults and project-specific
/// settings. Shared fields merge into `existing_base` when one is present;
/// fields already in the base are never overwritten or duplicated. The
/// override keeps everything else and gains the extends relation, computed
/// from the project's new location.
///
/// Returns `None` when either document is not a JSON object; the caller
/// relocates such artifacts unsplit.
pub fn extract_base(
    sharing: &SharingSpec,
    artifact: &Value,
    existing_base: Option<&Value>,
    new_root: &Utf8Path,
) -> Option<ExtractedConfig> {
    let mut overlay = artifact.as_object()?.clone();
    let mut base = match existing_base {
        Some(value) => value.as_object()?.clone(),
        None => Map::new(),
    };

    drop_base_reference(&mut overlay, sharing);

    for field in sharing.shared_fields {
        let Some(value) = overlay.shift_remove(*field) else {
            continue;
        };
        merge_shared_field(&mut base, field, value);
    }

    let relation = ascent_to_root(new_root)
        .join(sharing.base_filename)
        .into_string();
    let relation = if sharing.extends_as_array {
        Value::Array(vec![Value::String(relation)])
    } else {
        Value::String(relation)
    };

    // The extends relation leads the override, the retained fields follow in
    // their original order.
    let mut rebuilt = Map::new();
    rebuilt.insert(sharing.extends_key.to_string(), relation);
    for (key, value) in overlay {
        if key != sharing.extends_key {
            rebuilt.insert(key, value);
        }
    }

    Some(ExtractedConfig {
        base: Value::Object(base),
        overlay: Value::Object(rebuilt),
    })
}

/// A root-level artifact may already extend the base it is being split
/// against (the pre-nested layout). That self-reference must not migrate
/// into the base or the override.
fn drop_base_reference(overlay: &mut Map<String, Value>, sharing: &SharingSpec) {
    let remove = match overlay.get_mut(sharing.extends_key) {
        Some(Value::String(value)) => value.ends_with(sharing.base_filename),
        Some(Value::Array(items)) => {
            items.retain(|item| {
                !item
                    .as_str()
                    .is_some_and(|value| value.ends_with(sharing.base_filename))
            });
            items.is_empty()
        }
        _ => false,
    };
    if remove {
        overlay.shift_remove(sharing.extends_key);
    }
}

fn merge_shared_field(base: &mut Map<String, Value>, field: &str, value: Value) {
    match base.get_mut(field) {
        None => {
            base.insert(field.to_string(), value);
        }
        Some(Value::Object(existing)) => {
            if let Value::Object(incoming) = value {
                for (key, sub) in incoming {
                    existing.entry(key).or_insert(sub);
                }
            }
        }
        Some(Value::Array(existing)) => {
            if let Value::Array(incoming) = value {
                for item in incoming {
                    if !existing.contains(&item) {
                        existing.push(item);
                    }
                }
            }
        }
        // Scalar already present in the base wins; the project keeps nothing.
        Some(_) => {}
    }
}
