//! `pack <spec>… [-o <archive>]` — bundles the resolved tool directories plus
//! a copy of this shim binary into a redistributable gzip'd tarball.
//! `install -g` on the resulting archive must yield identical cache bytes
//! to a direct install, so the tarball mirrors the cache's own
//! `<name>/<exact-version>/…` layout verbatim.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use flate2::write::GzEncoder;
use flate2::Compression;

use crate::context::AppContext;

pub async fn run(ctx: &mut AppContext, specs: &[String], output: &Path) -> anyhow::Result<i32> {
    anyhow::ensure!(!specs.is_empty(), "`pack` requires at least one spec");

    let installer = pmshim_installer::Installer::new(ctx.cache.clone());
    let mut entries = Vec::new();
    for raw in specs {
        let request = pmshim_manifest::parse_cli_spec(raw).context("parsing pack spec")?;
        let (resolution, entry) = installer
            .ensure(&request, &ctx.env)
            .await
            .with_context(|| format!("resolving {raw} for packing"))?;
        entries.push((resolution, entry));
    }

    let file = fs_err::File::create(output)
        .with_context(|| format!("creating {}", output.display()))?;
    let encoder = GzEncoder::new(file, Compression::default());
    let mut builder = tar::Builder::new(encoder);

    for (resolution, entry) in &entries {
        let archive_prefix = PathBuf::from(resolution.name.cache_key()).join(resolution.exact_version.to_string());
        builder
            .append_dir_all(&archive_prefix, &entry.absolute_path)
            .with_context(|| format!("adding {} to the archive", entry.absolute_path.display()))?;
    }

    if let Ok(self_exe) = std::env::current_exe() {
        builder
            .append_path_with_name(&self_exe, "shim/pmshim")
            .context("embedding the shim binary in the archive")?;
    }

    builder.finish().context("finalizing the archive")?;

    tracing::info!("wrote {} ({} tool(s))", output.display(), entries.len());
    Ok(0)
}
