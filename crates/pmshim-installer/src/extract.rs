//! Gzip'd tarball extraction into a staging directory.
//!
//! Tool archives are always a single `.tgz`, unlike the general-purpose
//! multi-format archives a broader package manager has to unpack, so this is
//! deliberately narrower than a general extractor: gzip + tar, nothing else.

use std::io;
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;

/// Extract a gzip'd tarball's bytes into a freshly created staging directory
/// under `parent`, stripping a single wrapping root directory if the archive
/// has one (tool tarballs conventionally wrap their contents in one).
///
/// Returns the staging directory, ready to be handed to
/// [`pmshim_cache::Cache::install_atomic`].
pub fn extract_tarball(bytes: &[u8], parent: &Path) -> io::Result<PathBuf> {
    let staging = tempfile::Builder::new().tempdir_in(parent)?.into_path();

    let decoder = GzDecoder::new(bytes);
    let mut archive = tar::Archive::new(decoder);
    archive.unpack(&staging)?;

    strip_wrapping_root(&staging)
}

/// If `dir` contains exactly one entry and that entry is itself a directory,
/// move its contents up into `dir` and remove the now-empty wrapper. Leaves
/// `dir` untouched otherwise.
fn strip_wrapping_root(dir: &Path) -> io::Result<PathBuf> {
    let mut entries: Vec<PathBuf> = fs_err::read_dir(dir)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<io::Result<_>>()?;

    if entries.len() != 1 || !entries[0].is_dir() {
        return Ok(dir.to_path_buf());
    }

    let wrapper = entries.remove(0);
    for child in fs_err::read_dir(&wrapper)? {
        let child = child?.path();
        let dest = dir.join(child.file_name().expect("read_dir entries always have a name"));
        fs_err::rename(&child, &dest)?;
    }
    fs_err::remove_dir(&wrapper)?;
    Ok(dir.to_path_buf())
}
