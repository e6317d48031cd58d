//! `install [-g|--global] [<spec>…]` — pre-install tools into the cache
//! without dispatching to them. With no specs, installs the current
//! project's pinned tool; `--global` also advances the last-known-good pin.
//!
//! A single spec that names an existing file is instead treated as a
//! `pack`-produced archive: its tool directories are extracted straight
//! into the cache, bypassing the registry entirely, so that `pack` then
//! `install -g` reproduces identical cache bytes to a direct install.

use std::path::Path;

use anyhow::Context as _;
use pmshim_manifest::check_url_for_known_tool;
use pmshim_resolver::ResolveContext;
use pmshim_types::{SpecRequest, ToolName};

use crate::context::AppContext;

pub async fn run(ctx: &mut AppContext, specs: &[String], global: bool) -> anyhow::Result<i32> {
    if let [only] = specs {
        let path = Path::new(only);
        if path.is_file() {
            return install_from_archive(ctx, path, global);
        }
    }

    let requests = if specs.is_empty() {
        vec![resolve_project_pin(ctx)?]
    } else {
        specs
            .iter()
            .map(|raw| parse_and_check(ctx, raw))
            .collect::<anyhow::Result<Vec<_>>>()?
    };

    let installer = pmshim_installer::Installer::new(ctx.cache.clone());

    for request in requests {
        let (resolution, entry) = installer
            .ensure(&request, &ctx.env)
            .await
            .with_context(|| format!("installing {}", request.name))?;
        tracing::info!(
            "installed {}@{} at {}",
            resolution.name,
            resolution.exact_version,
            entry.absolute_path.display()
        );
        if global {
            ctx.record_success(&resolution)?;
        }
    }

    Ok(0)
}

fn parse_and_check(ctx: &AppContext, raw: &str) -> anyhow::Result<SpecRequest> {
    let request = pmshim_manifest::parse_cli_spec(raw).context("parsing install spec")?;
    check_url_for_known_tool(&request.name, &request.version, ctx.env.enable_unsafe_custom_urls)
        .context("validating install spec")?;
    Ok(request)
}

fn resolve_project_pin(ctx: &AppContext) -> anyhow::Result<SpecRequest> {
    let resolve_ctx = ResolveContext {
        env: &ctx.env,
        cwd: &ctx.cwd,
        last_known_good: &ctx.last_known_good,
    };
    pmshim_resolver::resolve_spec("install", None, None, &resolve_ctx)
        .context("no package manager is pinned in this project")
}

/// Reverse of [`ToolName::cache_key`]: the directory names a `pack` archive
/// uses, turned back into the tool identity that owns them.
fn tool_name_from_cache_key(key: &str) -> ToolName {
    match key {
        "npm" => ToolName::Npm,
        "pnpm" => ToolName::Pnpm,
        "yarn-classic" => ToolName::YarnClassic,
        "yarn-berry" => ToolName::YarnBerry,
        other => ToolName::Unknown(other.to_string()),
    }
}

fn install_from_archive(ctx: &mut AppContext, archive: &Path, global: bool) -> anyhow::Result<i32> {
    let bytes =
        fs_err::read(archive).with_context(|| format!("reading {}", archive.display()))?;
    let decoder = flate2::read::GzDecoder::new(bytes.as_slice());
    let mut tar = tar::Archive::new(decoder);
    let staging = tempfile::tempdir().context("creating a staging directory for the archive")?;
    tar.unpack(staging.path())
        .with_context(|| format!("unpacking {}", archive.display()))?;

    let mut installed = 0;
    for top in fs_err::read_dir(staging.path())? {
        let top = top?;
        let cache_key = top.file_name().to_string_lossy().into_owned();
        if cache_key == "shim" || !top.path().is_dir() {
            continue;
        }
        let name = tool_name_from_cache_key(&cache_key);

        for version_dir in fs_err::read_dir(top.path())? {
            let version_dir = version_dir?;
            let Ok(version) = semver::Version::parse(&version_dir.file_name().to_string_lossy())
            else {
                continue;
            };

            let entry = ctx
                .cache
                .install_atomic(&name, &version, &version_dir.path())
                .with_context(|| format!("installing {name}@{version} from the archive"))?;
            installed += 1;

            if global {
                let resolution = pmshim_types::Resolution {
                    name: name.clone(),
                    exact_version: version,
                    integrity: None,
                    source: url::Url::parse("file:///packed")
                        .expect("static URL is always valid"),
                    locator: pmshim_types::SpecLocator::Env,
                };
                ctx.record_success(&resolution)?;
            }
            tracing::info!("installed {} from {}", entry.absolute_path.display(), archive.display());
        }
    }

    anyhow::ensure!(installed > 0, "{} contained no installable tool directories", archive.display());
    Ok(0)
}
