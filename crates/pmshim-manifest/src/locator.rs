//! C5 — Project Locator.
//!
//! Ascends the directory tree from the invocation directory looking for a
//! manifest with a relevant field. Never treats a manifest found inside a
//! vendored `node_modules/*` tree as authoritative — the walk simply
//! continues past it, as if that directory held no manifest at all.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::raw::RawManifest;

const MANIFEST_FILE_NAME: &str = "package.json";

/// A manifest found during the ancestor walk, along with the path it was
/// read from (used in [`pmshim_types::SpecLocator`] error messages).
#[derive(Debug, Clone)]
pub struct LocatedManifest {
    pub path: PathBuf,
    pub manifest: RawManifest,
}

fn is_vendored(dir: &Path) -> bool {
    dir.components()
        .any(|component| component.as_os_str() == "node_modules")
}

/// Walk upward from `start`, returning the closest manifest declaring
/// `packageManager` or `devEngines.packageManager`. Directories under
/// `node_modules` are skipped but do not stop the walk.
pub fn locate(start: &Path) -> Option<LocatedManifest> {
    let mut dir = Some(start.to_path_buf());
    while let Some(current) = dir {
        if is_vendored(&current) {
            debug!("skipping vendored directory {}", current.display());
            dir = current.parent().map(Path::to_path_buf);
            continue;
        }

        let candidate = current.join(MANIFEST_FILE_NAME);
        if let Ok(contents) = fs_err::read_to_string(&candidate) {
            if let Ok(manifest) = serde_json::from_str::<RawManifest>(&contents) {
                if !manifest.is_empty() {
                    return Some(LocatedManifest {
                        path: candidate,
                        manifest,
                    });
                }
            }
        }

        dir = current.parent().map(Path::to_path_buf);
    }
    None
}

/// Walk upward from `start`, returning the closest `package.json` file that
/// exists, whether or not it declares a pin. Auto-pin needs to write a pin
/// into a project that has none, which `locate` (transparent to empty
/// manifests) can never return.
pub fn locate_nearest_manifest_path(start: &Path) -> Option<PathBuf> {
    let mut dir = Some(start.to_path_buf());
    while let Some(current) = dir {
        if is_vendored(&current) {
            debug!("skipping vendored directory {}", current.display());
            dir = current.parent().map(Path::to_path_buf);
            continue;
        }

        let candidate = current.join(MANIFEST_FILE_NAME);
        if candidate.is_file() {
            return Some(candidate);
        }

        dir = current.parent().map(Path::to_path_buf);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn finds_manifest_in_invocation_directory() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("package.json"), r#"{"packageManager":"npm@10.5.0"}"#).unwrap();

        let located = locate(dir.path()).unwrap();
        assert_eq!(
            located.manifest.package_manager.as_deref(),
            Some("npm@10.5.0")
        );
    }

    #[test]
    fn closest_manifest_wins_over_ancestor() {
        let root = tempdir().unwrap();
        fs::write(root.path().join("package.json"), r#"{"packageManager":"yarn@1.22.4"}"#).unwrap();

        let nested = root.path().join("foo");
        fs::create_dir(&nested).unwrap();
        fs::write(nested.join("package.json"), r#"{"packageManager":"npm@6.14.2"}"#).unwrap();

        let located = locate(&nested).unwrap();
        assert_eq!(
            located.manifest.package_manager.as_deref(),
            Some("npm@6.14.2")
        );
    }

    #[test]
    fn empty_manifest_is_transparent() {
        let root = tempdir().unwrap();
        fs::write(root.path().join("package.json"), r#"{"name":"root"}"#).unwrap();

        let nested = root.path().join("foo");
        fs::create_dir(&nested).unwrap();
        fs::write(nested.join("package.json"), r#"{"packageManager":"npm@6.14.2"}"#).unwrap();

        let located = locate(&nested).unwrap();
        assert_eq!(located.path, nested.join("package.json"));
    }

    #[test]
    fn vendored_manifest_never_wins() {
        let root = tempdir().unwrap();
        fs::write(root.path().join("package.json"), r#"{"packageManager":"npm@6.14.2"}"#).unwrap();

        let vendored = root.path().join("node_modules").join("some-dep");
        fs::create_dir_all(&vendored).unwrap();
        fs::write(
            vendored.join("package.json"),
            r#"{"packageManager":"yarn@1.22.4"}"#,
        )
        .unwrap();

        let located = locate(&vendored).unwrap();
        assert_eq!(
            located.manifest.package_manager.as_deref(),
            Some("npm@6.14.2")
        );
    }

    #[test]
    fn no_manifest_found_returns_none() {
        let dir = tempdir().unwrap();
        assert!(locate(dir.path()).is_none());
    }

    #[test]
    fn locate_nearest_manifest_path_finds_unpinned_manifest() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("package.json"), r#"{"name":"my-app"}"#).unwrap();

        assert!(locate(dir.path()).is_none());
        assert_eq!(
            locate_nearest_manifest_path(dir.path()),
            Some(dir.path().join("package.json"))
        );
    }

    #[test]
    fn locate_nearest_manifest_path_skips_vendored() {
        let root = tempdir().unwrap();
        fs::write(root.path().join("package.json"), r#"{"name":"root"}"#).unwrap();

        let vendored = root.path().join("node_modules").join("some-dep");
        fs::create_dir_all(&vendored).unwrap();
        fs::write(vendored.join("package.json"), r#"{"name":"some-dep"}"#).unwrap();

        assert_eq!(
            locate_nearest_manifest_path(&vendored),
            Some(root.path().join("package.json"))
        );
    }
}
