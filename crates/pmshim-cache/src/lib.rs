//! C3 — Cache Layout.
//!
//! A content-addressed on-disk layout for installed tools, plus the mutable
//! "last known good" pin file. Installs are atomic (extract to a sibling
//! temp directory, then rename into place); readers must tolerate a
//! read-only cache root and a non-parsable `lastKnownGood.json`.

use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use pmshim_types::ToolName;
use tracing::{debug, warn};

mod last_known_good;

pub use last_known_good::LastKnownGood;

const READY_MARKER: &str = ".ready";

/// A fully-installed tool version in the cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    pub name: ToolName,
    pub exact_version: semver::Version,
    pub absolute_path: PathBuf,
}

/// The content-addressed cache root: `<home>/<tool>/<exact-version>/…`.
#[derive(Debug, Clone)]
pub struct Cache {
    root: PathBuf,
}

impl Cache {
    /// Open (and initialize) a persistent cache rooted at `root`.
    pub fn from_path(root: impl Into<PathBuf>) -> io::Result<Self> {
        let root = root.into();
        Self::init(&root)?;
        Ok(Self { root })
    }

    fn init(root: &Path) -> io::Result<()> {
        fs_err::create_dir_all(root)?;
        // Best-effort CACHEDIR.TAG so backup tools and `du`-alikes know to
        // skip this tree; a read-only root simply won't get one.
        if let Err(err) = cachedir::ensure_tag(root) {
            if err.kind() != io::ErrorKind::PermissionDenied {
                return Err(err);
            }
            warn!("cache root {} is read-only, skipping CACHEDIR.TAG", root.display());
        }
        Ok(())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The directory holding every installed version of `name`.
    pub fn tool_dir(&self, name: &ToolName) -> PathBuf {
        self.root.join(name.cache_key())
    }

    /// The directory a specific tool+version is (or will be) installed into.
    pub fn entry_dir(&self, name: &ToolName, version: &semver::Version) -> PathBuf {
        self.tool_dir(name).join(version.to_string())
    }

    fn ready_marker_path(&self, name: &ToolName, version: &semver::Version) -> PathBuf {
        self.entry_dir(name, version).join(READY_MARKER)
    }

    /// Returns `true` if a `.ready`-marked, fully-installed entry exists.
    pub fn is_ready(&self, name: &ToolName, version: &semver::Version) -> bool {
        self.ready_marker_path(name, version).is_file()
    }

    /// Look up a ready cache entry, if present.
    pub fn lookup(&self, name: &ToolName, version: &semver::Version) -> Option<CacheEntry> {
        if self.is_ready(name, version) {
            Some(CacheEntry {
                name: name.clone(),
                exact_version: version.clone(),
                absolute_path: self.entry_dir(name, version),
            })
        } else {
            None
        }
    }

    /// Commit a staged install into the cache atomically: rename the staged
    /// directory into place, then write the `.ready` marker. If another
    /// process already completed the same install, discard `staged` and
    /// return the existing entry — this is the only legal outcome of losing
    /// the rename race, never a corrupted or partial cache entry.
    pub fn install_atomic(
        &self,
        name: &ToolName,
        version: &semver::Version,
        staged: &Path,
    ) -> io::Result<CacheEntry> {
        let dest = self.entry_dir(name, version);

        if self.is_ready(name, version) {
            debug!("install race lost before rename, discarding staged dir");
            let _ = fs_err::remove_dir_all(staged);
            return Ok(self.lookup(name, version).expect("just checked is_ready"));
        }

        if let Some(parent) = dest.parent() {
            fs_err::create_dir_all(parent)?;
        }

        match fs_err::rename(staged, &dest) {
            Ok(()) => {
                self.write_ready(name, version)?;
                Ok(CacheEntry {
                    name: name.clone(),
                    exact_version: version.clone(),
                    absolute_path: dest,
                })
            }
            Err(err) => {
                // Another installer won the race: the destination exists
                // (possibly non-empty, which a plain rename refuses to
                // replace). Our copy is redundant.
                let _ = fs_err::remove_dir_all(staged);
                if let Some(entry) = self.lookup(name, version) {
                    Ok(entry)
                } else {
                    Err(err)
                }
            }
        }
    }

    fn write_ready(&self, name: &ToolName, version: &semver::Version) -> io::Result<()> {
        let marker = self.ready_marker_path(name, version);
        fs_err::write(marker, SystemTime::now().duration_since(SystemTime::UNIX_EPOCH).map(|d| d.as_secs().to_string()).unwrap_or_default())
    }
}
