//! The default invocation path: `<toolName>[@spec] <args...>`. Resolves the
//! governing spec, ensures the tool is installed, dispatches, and records
//! the last-known-good pin on success.

use anyhow::Context as _;
use pmshim_resolver::{resolve, ResolveContext};

use crate::context::AppContext;

/// Run the shim pipeline end to end. Returns the exit code to propagate to
/// the shell verbatim (the dispatched tool's own exit code on success).
pub async fn run(
    ctx: &mut AppContext,
    command_name: &str,
    subcommand: Option<&str>,
    inline_spec: Option<&str>,
    args: &[String],
) -> anyhow::Result<i32> {
    let resolve_ctx = ResolveContext {
        env: &ctx.env,
        cwd: &ctx.cwd,
        last_known_good: &ctx.last_known_good,
    };

    let spec = resolve(command_name, subcommand, inline_spec, &resolve_ctx)
        .with_context(|| format!("resolving a version for `{command_name}`"))?;

    let installer = pmshim_installer::Installer::new(ctx.cache.clone());
    let (resolution, entry) = installer
        .ensure(&spec, &ctx.env)
        .await
        .context("installing the resolved tool version")?;

    let config = pmshim_config::config_for(&resolution.name)
        .context("dispatching a custom/unknown tool has no configured entrypoint")?;

    let exit_code = pmshim_dispatch::dispatch(&entry, config, command_name, args)
        .await
        .context("dispatching to the installed tool")?;

    if exit_code == 0 {
        ctx.record_success(&resolution)?;

        let is_unpinned = matches!(
            spec.locator,
            pmshim_types::SpecLocator::BuiltinDefault | pmshim_types::SpecLocator::GlobalPin
        );
        if ctx.env.enable_auto_pin && is_unpinned {
            if let Some(manifest_path) = pmshim_manifest::locate_nearest_manifest_path(&ctx.cwd) {
                pmshim_manifest::write_package_manager_field(&manifest_path, &resolution)
                    .context("writing the resolved version back to the manifest")?;
            }
        }
    }

    Ok(exit_code)
}
