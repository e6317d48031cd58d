//! `enable [--install-directory <dir>] [<tool>…]` — writes one shim script
//! per configured `binEntries` command name into the target directory. Each
//! shim simply re-execs this binary under the matching command name; actual
//! version resolution happens at dispatch time, not here.

use std::io::Write as _;
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use pmshim_config::ToolConfig;

fn default_install_directory() -> PathBuf {
    directories::BaseDirs::new()
        .and_then(|dirs| dirs.executable_dir().map(Path::to_path_buf))
        .unwrap_or_else(|| {
            directories::BaseDirs::new()
                .map(|dirs| dirs.home_dir().join(".local").join("bin"))
                .unwrap_or_else(|| PathBuf::from(".local/bin"))
        })
}

fn tools_to_enable(names: &[String]) -> anyhow::Result<Vec<&'static ToolConfig>> {
    if names.is_empty() {
        return Ok(pmshim_config::ALL_TOOLS.to_vec());
    }

    names
        .iter()
        .map(|raw| {
            let name = pmshim_manifest::tool_name_from_str(raw, None);
            pmshim_config::config_for(&name)
                .ok_or_else(|| anyhow::anyhow!("`{raw}` is not a recognized package manager"))
        })
        .collect()
}

#[cfg(unix)]
fn write_shim(path: &Path, self_exe: &Path, command_name: &str) -> anyhow::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let script = format!(
        "#!/bin/sh\nexec \"{}\" \"{}\" \"$@\"\n",
        self_exe.display(),
        command_name
    );
    let mut file = fs_err::File::create(path)?;
    file.write_all(script.as_bytes())?;
    let mut perms = file.metadata()?.permissions();
    perms.set_mode(0o755);
    fs_err::set_permissions(path, perms)?;
    Ok(())
}

#[cfg(not(unix))]
fn write_shim(path: &Path, self_exe: &Path, command_name: &str) -> anyhow::Result<()> {
    let script = format!(
        "@echo off\r\n\"{}\" {} %*\r\n",
        self_exe.display(),
        command_name
    );
    fs_err::write(path, script)?;
    Ok(())
}

pub async fn run(install_directory: Option<&Path>, tools: &[String]) -> anyhow::Result<i32> {
    let install_directory = install_directory
        .map(Path::to_path_buf)
        .unwrap_or_else(default_install_directory);
    fs_err::create_dir_all(&install_directory)
        .with_context(|| format!("creating {}", install_directory.display()))?;

    let self_exe = std::env::current_exe().context("locating the running executable")?;

    let configs = tools_to_enable(tools)?;
    let mut written = 0;
    for config in configs {
        for &(command_name, _script) in config.bin_entries {
            let shim_name = if cfg!(windows) {
                format!("{command_name}.cmd")
            } else {
                command_name.to_string()
            };
            let path = install_directory.join(&shim_name);
            write_shim(&path, &self_exe, command_name)
                .with_context(|| format!("writing shim {}", path.display()))?;
            written += 1;
        }
    }

    tracing::info!(
        "wrote {written} shim(s) to {}",
        install_directory.display()
    );
    Ok(0)
}
