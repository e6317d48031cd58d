//! C10 — Dispatcher.
//!
//! The last stage of the pipeline: given a ready [`pmshim_cache::CacheEntry`]
//! and the user's argv, find the script the invoked command name maps to and
//! exec it, propagating its exit status verbatim.

mod exec;
mod script;

pub use exec::{run_script, ROOT_ENV_VAR};
pub use script::{is_module_wrapper, resolve_script};

use pmshim_cache::CacheEntry;
use pmshim_config::ToolConfig;
use pmshim_types::PmError;
use tracing::debug;

/// Resolve and run `command_name`'s script out of `entry`, passing `args`.
/// Returns the process exit code to propagate to the shell.
pub async fn dispatch(
    entry: &CacheEntry,
    config: &ToolConfig,
    command_name: &str,
    args: &[String],
) -> Result<i32, PmError> {
    let script = script::resolve_script(config, command_name, entry)?;
    if script::is_module_wrapper(&script) {
        debug!("{} is a module-style wrapper", script.display());
    }
    exec::run_script(&script, args, &entry.absolute_path).await
}
