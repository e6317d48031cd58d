//! Maps an invoked command name to the script inside an installed tool's
//! cache entry.

use std::path::{Path, PathBuf};

use pmshim_cache::CacheEntry;
use pmshim_config::ToolConfig;
use pmshim_types::PmError;

/// Resolve the absolute path to the script backing `command_name`, as
/// configured by C1's `binEntries`. Both `yarn` and `yarnpkg` resolve to the
/// same script for a yarn [`pmshim_types::ToolName`]; this is simply a
/// lookup, the alias equivalence lives in `ToolConfig::script_for_command`.
pub fn resolve_script(
    config: &ToolConfig,
    command_name: &str,
    entry: &CacheEntry,
) -> Result<PathBuf, PmError> {
    let relative = config.script_for_command(command_name).ok_or_else(|| {
        PmError::Other(format!(
            "\"{command_name}\" is not a known entrypoint for {}",
            config.name_key
        ))
    })?;
    let absolute = entry.absolute_path.join(relative);
    if !absolute.is_file() {
        return Err(PmError::Other(format!(
            "expected script at {} but it does not exist",
            absolute.display()
        )));
    }
    Ok(absolute)
}

/// A script ships as a module-style wrapper when a `package.json` sibling in
/// its own directory declares `"type": "module"`. This only changes how the
/// JS runtime resolves `require`/`import` inside the script; dispatch itself
/// invokes the same way either way.
pub fn is_module_wrapper(script_path: &Path) -> bool {
    let Some(dir) = script_path.parent() else {
        return false;
    };
    let manifest_path = dir.join("package.json");
    let Ok(contents) = fs_err::read_to_string(manifest_path) else {
        return false;
    };
    let Ok(value) = serde_json::from_str::<serde_json::Value>(&contents) else {
        return false;
    };
    value.get("type").and_then(serde_json::Value::as_str) == Some("module")
}
