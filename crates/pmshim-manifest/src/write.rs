//! Writing the resolved version back into a manifest's `packageManager`
//! field, used by the `use` command and by auto-pin. Rewrites only that one
//! field, leaving every other key (and its relative order) untouched.

use std::path::Path;

use pmshim_types::{PmError, Resolution};
use serde_json::{Map, Value};

/// Render `resolution` the way it is written into a `packageManager` field:
/// `name@exact-version[+algo.hex]`.
pub fn format_package_manager_value(resolution: &Resolution) -> String {
    match &resolution.integrity {
        Some(integrity) => format!(
            "{}@{}+{}",
            resolution.name, resolution.exact_version, integrity
        ),
        None => format!("{}@{}", resolution.name, resolution.exact_version),
    }
}

/// Patch `manifest_path`'s `packageManager` field in place with
/// `resolution`'s resolved `name@exact-version`, preserving every other key.
pub fn write_package_manager_field(manifest_path: &Path, resolution: &Resolution) -> Result<(), PmError> {
    let raw = fs_err::read_to_string(manifest_path)?;
    let mut value: Value = serde_json::from_str(&raw)?;

    let Value::Object(map) = &mut value else {
        return Err(PmError::Other(format!(
            "{} does not contain a JSON object at its root",
            manifest_path.display()
        )));
    };

    map.insert(
        "packageManager".to_string(),
        Value::String(format_package_manager_value(resolution)),
    );

    write_preserving_trailing_newline(manifest_path, &raw, map)
}

fn write_preserving_trailing_newline(
    path: &Path,
    original: &str,
    map: &Map<String, Value>,
) -> Result<(), PmError> {
    let mut serialized = serde_json::to_string_pretty(&Value::Object(map.clone()))?;
    if original.ends_with('\n') {
        serialized.push('\n');
    }
    fs_err::write(path, serialized)?;
    Ok(())
}
