//! Name-mismatch enforcement: the second half of C6, applied after a winning
//! tool name has been determined regardless of which precedence tier it came
//! from.

use pmshim_types::{PmError, ToolName};

/// Check that the literal invoked command (and, for a transparent
/// subcommand, the subcommand) is compatible with `resolved`.
pub fn check_name_match(
    command_name: &str,
    subcommand: Option<&str>,
    resolved: &ToolName,
    enable_strict: bool,
) -> Result<(), PmError> {
    let Some(config) = pmshim_config::config_for(resolved) else {
        // An unknown/custom tool has no canonical-command table; its
        // invocation is always its own name by construction.
        return Ok(());
    };

    if config.script_for_command(command_name).is_some() {
        return Ok(());
    }

    if let Some(sub) = subcommand {
        if config.is_transparent(sub) {
            return Ok(());
        }
    }

    if !enable_strict {
        return Ok(());
    }

    Err(PmError::NameMismatch {
        expected: config.canonical_command().to_string(),
    })
}
