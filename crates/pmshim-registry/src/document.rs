//! The registry metadata document shape: `dist-tags`, per-version `dist`
//! blocks carrying the tarball URL, integrity string, and detached
//! signatures.

use pmshim_types::{PmError, VersionExpression};
use rustc_hash::FxHashMap;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct SignatureEntry {
    pub keyid: String,
    pub sig: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DistInfo {
    pub tarball: String,
    pub integrity: Option<String>,
    #[serde(default)]
    pub signatures: Vec<SignatureEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VersionEntry {
    pub dist: DistInfo,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegistryDocument {
    #[serde(rename = "dist-tags")]
    pub dist_tags: FxHashMap<String, String>,
    pub versions: FxHashMap<String, VersionEntry>,
}

/// A version picked out of a [`RegistryDocument`], with its dist metadata.
#[derive(Debug, Clone)]
pub struct SelectedVersion {
    pub version: semver::Version,
    pub dist: DistInfo,
}

/// Resolve a version *expression* (exact, range, or tag) against a fetched
/// registry document. `VersionExpression::Url` never reaches this function —
/// URL-sourced tools bypass the registry entirely.
pub fn select_version(
    doc: &RegistryDocument,
    expr: &VersionExpression,
) -> Result<SelectedVersion, PmError> {
    match expr {
        VersionExpression::Exact { version, .. } => lookup_exact(doc, version),
        VersionExpression::Tag(tag) => {
            let version_str = doc
                .dist_tags
                .get(tag)
                .ok_or_else(|| PmError::Other(format!("dist-tag \"{tag}\" not found")))?;
            let version = semver::Version::parse(version_str).map_err(|_| PmError::SpecSyntax)?;
            lookup_exact(doc, &version)
        }
        VersionExpression::Range(range) => {
            let req = semver::VersionReq::parse(range).map_err(|_| PmError::SpecRange)?;
            let version = doc
                .versions
                .keys()
                .filter_map(|raw| semver::Version::parse(raw).ok())
                .filter(|version| req.matches(version))
                .max()
                .ok_or_else(|| {
                    PmError::Other(format!("no published version satisfies range \"{range}\""))
                })?;
            lookup_exact(doc, &version)
        }
        VersionExpression::Url { .. } => Err(PmError::Other(
            "URL version expressions do not consult the registry".to_string(),
        )),
    }
}

fn lookup_exact(doc: &RegistryDocument, version: &semver::Version) -> Result<SelectedVersion, PmError> {
    let entry = doc
        .versions
        .get(&version.to_string())
        .ok_or_else(|| PmError::Other(format!("version {version} not found in registry")))?;
    Ok(SelectedVersion {
        version: version.clone(),
        dist: entry.dist.clone(),
    })
}
