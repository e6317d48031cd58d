//! Spawns the resolved script and propagates its exit status.

use std::path::Path;

use pmshim_types::PmError;
use tracing::debug;

/// The env var child processes read to find their own install root.
pub const ROOT_ENV_VAR: &str = "PMSHIM_ROOT";

/// Run `script` under `node`, passing `args` verbatim and exporting
/// [`ROOT_ENV_VAR`] so the script can find its own install root. Returns the
/// child's exit code — `1` if it was killed by a signal rather than exiting
/// normally, per the "never overwrite a non-zero exit after a successful
/// launch" rule: a signal death is itself a non-zero outcome.
pub async fn run_script(script: &Path, args: &[String], root: &Path) -> Result<i32, PmError> {
    debug!("executing {} with {} arg(s)", script.display(), args.len());

    let status = tokio::process::Command::new("node")
        .arg(script)
        .args(args)
        .env(ROOT_ENV_VAR, root)
        .status()
        .await
        .map_err(|err| PmError::Other(format!("failed to launch {}: {err}", script.display())))?;

    Ok(status.code().unwrap_or(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_interpreter_surfaces_as_pm_error() {
        // `node` may or may not exist in the test sandbox; what matters is
        // that a launch failure maps to a PmError rather than panicking.
        let script = Path::new("/nonexistent/script.js");
        let root = Path::new("/nonexistent/root");
        let result = run_script(script, &[], root).await;
        // Either node isn't installed (launch error) or it is and exits
        // non-zero because the script doesn't exist — both are fine here.
        match result {
            Ok(code) => assert_ne!(code, 0),
            Err(PmError::Other(_)) => {}
            Err(other) => panic!("unexpected error variant: {other:?}"),
        }
    }
}
