//! The `lastKnownGood.json` pin file: the most recent version of each tool
//! that was successfully resolved, used as the lowest-precedence fallback
//! before the built-in default. A missing or unparsable file is never fatal
//! — it is treated as "no pins recorded yet".

use std::io;
use std::path::Path;

use pmshim_types::{Resolution, ToolName};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::warn;

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
struct Document {
    #[serde(flatten)]
    pins: FxHashMap<String, String>,
}

/// The last-known-good pin set, keyed by a tool's cache key (e.g. `"npm"`,
/// `"yarn-berry"`).
#[derive(Debug, Default, Clone)]
pub struct LastKnownGood {
    pins: FxHashMap<String, semver::Version>,
}

impl LastKnownGood {
    /// Load the pin file at `path`. Any I/O error or parse failure yields an
    /// empty pin set rather than propagating — a corrupt pin file must never
    /// block resolution.
    pub fn load(path: &Path) -> Self {
        let raw = match fs_err::read_to_string(path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Self::default(),
            Err(err) => {
                warn!("could not read {}: {err}", path.display());
                return Self::default();
            }
        };

        let document: Document = match serde_json::from_str(&raw) {
            Ok(document) => document,
            Err(err) => {
                warn!("{} is not valid JSON, ignoring: {err}", path.display());
                return Self::default();
            }
        };

        let mut pins = FxHashMap::default();
        for (key, value) in document.pins {
            match semver::Version::parse(&value) {
                Ok(version) => {
                    pins.insert(key, version);
                }
                Err(err) => warn!("ignoring malformed pin {key}={value}: {err}"),
            }
        }
        Self { pins }
    }

    /// Persist the pin set atomically: write to a sibling temp file, then
    /// rename over the destination.
    pub fn save(&self, path: &Path) -> io::Result<()> {
        let document = Document {
            pins: self
                .pins
                .iter()
                .map(|(k, v)| (k.clone(), v.to_string()))
                .collect(),
        };
        let serialized = serde_json::to_string_pretty(&document)?;

        let parent = path.parent().unwrap_or_else(|| Path::new("."));
        fs_err::create_dir_all(parent)?;
        let tmp_path = parent.join(format!(
            ".{}.tmp",
            path.file_name().and_then(|n| n.to_str()).unwrap_or("lastKnownGood.json")
        ));
        fs_err::write(&tmp_path, serialized)?;
        fs_err::rename(&tmp_path, path)?;
        Ok(())
    }

    /// The pinned version for `name`, if one is recorded.
    pub fn get(&self, name: &ToolName) -> Option<&semver::Version> {
        self.pins.get(name.cache_key())
    }

    /// Record `resolution` as the new pin for its tool, enforcing the
    /// same-major-only update rule: a pin only advances to a version sharing
    /// the major of the existing pin (or there being no prior pin at all).
    /// Returns whether the pin changed.
    pub fn update(&mut self, resolution: &Resolution) -> bool {
        let key = resolution.name.cache_key().to_string();
        let candidate = &resolution.exact_version;

        if let Some(existing) = self.pins.get(&key) {
            if existing.major != candidate.major {
                return false;
            }
            if existing == candidate {
                return false;
            }
        }

        self.pins.insert(key, candidate.clone());
        true
    }
}
