//! `use <spec>` — resolve a spec against the registry, ensure it is
//! installed, and pin the nearest manifest's `packageManager` field to the
//! exact resolved version.

use anyhow::Context as _;
use pmshim_manifest::check_url_for_known_tool;

use crate::context::AppContext;

pub async fn run(ctx: &mut AppContext, raw_spec: &str) -> anyhow::Result<i32> {
    let request = pmshim_manifest::parse_cli_spec(raw_spec).context("parsing spec")?;
    check_url_for_known_tool(&request.name, &request.version, ctx.env.enable_unsafe_custom_urls)
        .context("validating spec")?;

    let installer = pmshim_installer::Installer::new(ctx.cache.clone());
    let (resolution, _entry) = installer
        .ensure(&request, &ctx.env)
        .await
        .with_context(|| format!("installing {raw_spec}"))?;

    let manifest_path = pmshim_manifest::locate_nearest_manifest_path(&ctx.cwd)
        .context("no package.json was found above the current directory")?;

    pmshim_manifest::write_package_manager_field(&manifest_path, &resolution)
        .context("writing the resolved version back to the manifest")?;

    ctx.record_success(&resolution)?;

    tracing::info!(
        "pinned {}@{} in {}",
        resolution.name,
        resolution.exact_version,
        manifest_path.display()
    );

    Ok(0)
}
