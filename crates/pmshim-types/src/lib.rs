//! Shared data model for the package-manager shim.
//!
//! Every other crate in the workspace depends on this one for the vocabulary
//! described in the resolver's data model: tool identity, version
//! expressions, locators, and the `Resolution` that the whole pipeline is
//! ultimately trying to produce.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

mod error;

pub use error::PmError;

/// One of the four recognized package managers, or a user-provided archive
/// whose identity we don't know ahead of time.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ToolName {
    Npm,
    Pnpm,
    YarnClassic,
    YarnBerry,
    /// A custom tool, keyed by whatever name the user invoked or declared.
    Unknown(String),
}

impl ToolName {
    /// The key used for cache directories and `lastKnownGood.json` entries.
    pub fn cache_key(&self) -> &str {
        match self {
            Self::Npm => "npm",
            Self::Pnpm => "pnpm",
            Self::YarnClassic => "yarn-classic",
            Self::YarnBerry => "yarn-berry",
            Self::Unknown(name) => name,
        }
    }

    /// Returns `true` for the four built-in tools (as opposed to a
    /// user-supplied unknown archive).
    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Unknown(_))
    }

    /// The major-version family shared by [`ToolName::YarnClassic`] and
    /// [`ToolName::YarnBerry`]: both are invoked as `yarn`/`yarnpkg`, and are
    /// only distinguished once a concrete version is resolved.
    pub fn is_yarn(&self) -> bool {
        matches!(self, Self::YarnClassic | Self::YarnBerry)
    }
}

impl fmt::Display for ToolName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.cache_key())
    }
}

/// The family a literal `argv[0]` invocation belongs to, before a version has
/// been resolved. `Yarn` is ambiguous between [`ToolName::YarnClassic`] and
/// [`ToolName::YarnBerry`] until the resolver knows the exact version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandFamily {
    Npm,
    Pnpm,
    Yarn,
}

/// A tagged value describing *where* a version request originated. Used only
/// for error messages and precedence, never for resolution logic itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecLocator {
    Env,
    ProjectManifest(PathBuf),
    ProjectDevEngines(PathBuf),
    GlobalPin,
    BuiltinDefault,
}

impl fmt::Display for SpecLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Env => write!(f, "the environment"),
            Self::ProjectManifest(path) => write!(f, "{}#packageManager", path.display()),
            Self::ProjectDevEngines(path) => {
                write!(f, "{}#devEngines.packageManager", path.display())
            }
            Self::GlobalPin => write!(f, "the last known good pin"),
            Self::BuiltinDefault => write!(f, "the built-in default"),
        }
    }
}

/// A supported hash algorithm, identified by the prefix of an integrity
/// suffix or a registry `dist.integrity` string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HashAlgo {
    Sha1,
    Sha224,
    Sha256,
    Sha512,
}

impl HashAlgo {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sha1 => "sha1",
            Self::Sha224 => "sha224",
            Self::Sha256 => "sha256",
            Self::Sha512 => "sha512",
        }
    }

    pub fn parse_prefix(prefix: &str) -> Option<Self> {
        match prefix {
            "sha1" => Some(Self::Sha1),
            "sha224" => Some(Self::Sha224),
            "sha256" => Some(Self::Sha256),
            "sha512" => Some(Self::Sha512),
            _ => None,
        }
    }
}

/// A `+<algo>.<hex>` suffix appended to an exact version, or the equivalent
/// field parsed out of a registry's `dist.integrity` string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntegritySuffix {
    pub algo: HashAlgo,
    pub digest: String,
}

impl fmt::Display for IntegritySuffix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.algo.as_str(), self.digest)
    }
}

/// How a `devEngines.packageManager` (or similar) mismatch should be
/// reported. Defaults to `Error`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OnFail {
    #[default]
    Error,
    Warn,
    Ignore,
}

impl OnFail {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "error" => Some(Self::Error),
            "warn" => Some(Self::Warn),
            "ignore" => Some(Self::Ignore),
            _ => None,
        }
    }
}

/// A parsed version request. Each variant has a distinct legality depending
/// on which [`SpecLocator`] it came from (see the resolver's precedence
/// rules).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionExpression {
    /// An exact semver version, optionally pinned to a specific digest.
    Exact {
        version: semver::Version,
        integrity: Option<IntegritySuffix>,
    },
    /// A semver range (e.g. `^7`, `10.x`). Only legal from CLI specs or as a
    /// `devEngines` assertion, never as the sole source of a concrete
    /// version.
    Range(String),
    /// A registry dist-tag (e.g. `latest`). Only legal from CLI specs.
    Tag(String),
    /// A URL to a tarball, optionally pinned to a digest via a `#<algo>.<hex>`
    /// suffix. Legal for unknown tools always, and for known tools only when
    /// the unsafe-custom-URLs escape hatch is enabled.
    Url {
        url: url::Url,
        integrity: Option<IntegritySuffix>,
    },
}

/// `{name, version, locator, onFail}` — one fully parsed declaration of a
/// desired tool version, from any of the recognized sources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecRequest {
    pub name: ToolName,
    pub version: VersionExpression,
    pub locator: SpecLocator,
    pub on_fail: Option<OnFail>,
}

/// The single authoritative decision produced by the resolver: which tool,
/// which exact version, from where, with what integrity expectation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub name: ToolName,
    pub exact_version: semver::Version,
    pub integrity: Option<IntegritySuffix>,
    pub source: url::Url,
    pub locator: SpecLocator,
}

impl Resolution {
    /// The major version, used by the last-known-good update rule (a pin may
    /// only ever move within the same major).
    pub fn major(&self) -> u64 {
        self.exact_version.major
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tool_name_cache_key() {
        assert_eq!(ToolName::Npm.cache_key(), "npm");
        assert_eq!(ToolName::YarnBerry.cache_key(), "yarn-berry");
        assert_eq!(ToolName::Unknown("foo".into()).cache_key(), "foo");
    }

    #[test]
    fn tool_name_is_known() {
        assert!(ToolName::Npm.is_known());
        assert!(!ToolName::Unknown("x".into()).is_known());
    }

    #[test]
    fn integrity_suffix_display() {
        let suffix = IntegritySuffix {
            algo: HashAlgo::Sha1,
            digest: "deadbeef".to_string(),
        };
        assert_eq!(suffix.to_string(), "sha1.deadbeef");
    }

    #[test]
    fn hash_algo_roundtrip() {
        for algo in [
            HashAlgo::Sha1,
            HashAlgo::Sha224,
            HashAlgo::Sha256,
            HashAlgo::Sha512,
        ] {
            assert_eq!(HashAlgo::parse_prefix(algo.as_str()), Some(algo));
        }
        assert_eq!(HashAlgo::parse_prefix("md5"), None);
    }

    #[test]
    fn on_fail_parse() {
        assert_eq!(OnFail::parse("warn"), Some(OnFail::Warn));
        assert_eq!(OnFail::parse("bogus"), None);
        assert_eq!(OnFail::default(), OnFail::Error);
    }

    #[test]
    fn resolution_major() {
        let resolution = Resolution {
            name: ToolName::Npm,
            exact_version: semver::Version::new(6, 14, 2),
            integrity: None,
            source: url::Url::parse("https://registry.npmjs.org/npm/-/npm-6.14.2.tgz").unwrap(),
            locator: SpecLocator::BuiltinDefault,
        };
        assert_eq!(resolution.major(), 6);
    }
}
