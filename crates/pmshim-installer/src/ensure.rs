//! Orchestrates a `SpecRequest` into a ready `CacheEntry`: registry
//! resolution for ranges/tags, download, verification, atomic install, and
//! offline degradation to an already-installed version on network failure.

use pmshim_cache::Cache;
use pmshim_env::EnvFlags;
use pmshim_integrity::{Hasher, RegistrySignature};
use pmshim_types::{HashAlgo, IntegritySuffix, PmError, Resolution, SpecLocator, SpecRequest, ToolName, VersionExpression};
use pmshim_registry::RegistryClient;
use tracing::{debug, warn};

use crate::{download, extract};

/// Ties the cache, registry client, and an HTTP client together into a
/// single "make this spec installed" operation.
pub struct Installer {
    cache: Cache,
    registry: RegistryClient,
    http: reqwest::Client,
}

impl Installer {
    pub fn new(cache: Cache) -> Self {
        Self {
            cache,
            registry: RegistryClient::new(),
            http: reqwest::Client::new(),
        }
    }

    pub fn cache(&self) -> &Cache {
        &self.cache
    }

    /// Ensure the tool version named by `spec` is present in the cache,
    /// installing it if necessary. Returns the final `Resolution` (with a
    /// concrete version and, where available, an integrity suffix) and the
    /// resulting cache entry.
    pub async fn ensure(
        &self,
        spec: &SpecRequest,
        env: &EnvFlags,
    ) -> Result<(Resolution, pmshim_cache::CacheEntry), PmError> {
        match &spec.version {
            VersionExpression::Exact { version, integrity } => {
                self.ensure_exact(
                    spec.name.clone(),
                    version.clone(),
                    integrity.clone(),
                    spec.locator.clone(),
                    env,
                )
                .await
            }
            VersionExpression::Url { url, integrity } => {
                self.ensure_from_url(
                    spec.name.clone(),
                    url.clone(),
                    integrity.clone(),
                    spec.locator.clone(),
                    env,
                )
                .await
            }
            VersionExpression::Tag(_) | VersionExpression::Range(_) => {
                self.ensure_via_registry(spec, env).await
            }
        }
    }

    async fn ensure_exact(
        &self,
        name: ToolName,
        version: semver::Version,
        integrity: Option<IntegritySuffix>,
        locator: SpecLocator,
        env: &EnvFlags,
    ) -> Result<(Resolution, pmshim_cache::CacheEntry), PmError> {
        let source = known_tarball_url(&name, &version)?;

        if let Some(entry) = self.cache.lookup(&name, &version) {
            debug!("cache hit for {name}@{version}, skipping the network entirely");
            return Ok((
                Resolution {
                    name,
                    exact_version: version,
                    integrity,
                    source,
                    locator,
                },
                entry,
            ));
        }

        ensure_network(env)?;
        let data =
            download::download_and_verify(&self.http, &source, integrity.as_ref(), env.enable_download_prompt)
                .await?;
        let entry = self.extract_and_install(&name, &version, &data)?;

        Ok((
            Resolution {
                name,
                exact_version: version,
                integrity,
                source,
                locator,
            },
            entry,
        ))
    }

    async fn ensure_from_url(
        &self,
        name: ToolName,
        url: url::Url,
        integrity: Option<IntegritySuffix>,
        locator: SpecLocator,
        env: &EnvFlags,
    ) -> Result<(Resolution, pmshim_cache::CacheEntry), PmError> {
        let version = synthetic_version_for_url(&url);

        if let Some(entry) = self.cache.lookup(&name, &version) {
            debug!("cache hit for {name} pinned to {url}, skipping the network entirely");
            return Ok((
                Resolution {
                    name,
                    exact_version: version,
                    integrity,
                    source: url,
                    locator,
                },
                entry,
            ));
        }

        ensure_network(env)?;
        let data =
            download::download_and_verify(&self.http, &url, integrity.as_ref(), env.enable_download_prompt).await?;
        let entry = self.extract_and_install(&name, &version, &data)?;

        Ok((
            Resolution {
                name,
                exact_version: version,
                integrity,
                source: url,
                locator,
            },
            entry,
        ))
    }

    async fn ensure_via_registry(
        &self,
        spec: &SpecRequest,
        env: &EnvFlags,
    ) -> Result<(Resolution, pmshim_cache::CacheEntry), PmError> {
        let config = pmshim_config::config_for(&spec.name).ok_or_else(|| {
            PmError::Other(format!(
                "\"{}\" has no registry entry to resolve a range or tag against",
                spec.name
            ))
        })?;

        let selected = match self.registry.fetch_metadata(config, env).await {
            Ok(doc) => pmshim_registry::select_version(&doc, &spec.version)?,
            Err(network_err) => {
                return self
                    .degrade_to_cached(&spec.name, spec.locator.clone(), network_err)
                    .await;
            }
        };

        let version = selected.version;
        let integrity = selected
            .dist
            .integrity
            .as_deref()
            .map(pmshim_integrity::parse_integrity_string)
            .transpose()?;
        let source = url::Url::parse(&pmshim_registry::resolve_tarball_url(
            config,
            &version,
            &selected.dist,
        ))?;

        if let Some(entry) = self.cache.lookup(&spec.name, &version) {
            debug!("cache hit for {}@{version}, skipping download", spec.name);
            return Ok((
                Resolution {
                    name: spec.name.clone(),
                    exact_version: version,
                    integrity,
                    source,
                    locator: spec.locator.clone(),
                },
                entry,
            ));
        }

        if let Some(expected) = &integrity {
            let signatures: Vec<RegistrySignature> = selected
                .dist
                .signatures
                .iter()
                .map(|s| RegistrySignature {
                    keyid: s.keyid.clone(),
                    sig: s.sig.clone(),
                })
                .collect();
            pmshim_integrity::verify_signature(
                spec.name.cache_key(),
                config.registry_package,
                &version.to_string(),
                &expected.to_string(),
                &signatures,
                &env.integrity_keys,
            )?;
        }

        let data =
            download::download_and_verify(&self.http, &source, integrity.as_ref(), env.enable_download_prompt)
                .await?;
        let entry = self.extract_and_install(&spec.name, &version, &data)?;

        Ok((
            Resolution {
                name: spec.name.clone(),
                exact_version: version,
                integrity,
                source,
                locator: spec.locator.clone(),
            },
            entry,
        ))
    }

    /// Fall back to the highest already-installed version of `name` when the
    /// registry could not be reached at all. Propagates the original network
    /// error when no usable cache entry exists.
    async fn degrade_to_cached(
        &self,
        name: &ToolName,
        locator: SpecLocator,
        network_err: PmError,
    ) -> Result<(Resolution, pmshim_cache::CacheEntry), PmError> {
        let Some(entry) = self.best_cached_entry(name) else {
            return Err(network_err);
        };
        warn!(
            "registry unreachable, falling back to cached {name}@{}",
            entry.exact_version
        );
        let source = known_tarball_url(name, &entry.exact_version)?;
        Ok((
            Resolution {
                name: name.clone(),
                exact_version: entry.exact_version.clone(),
                integrity: None,
                source,
                locator,
            },
            entry,
        ))
    }

    fn best_cached_entry(&self, name: &ToolName) -> Option<pmshim_cache::CacheEntry> {
        let dir = self.cache.tool_dir(name);
        let entries = fs_err::read_dir(&dir).ok()?;
        entries
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| entry.file_name().into_string().ok())
            .filter_map(|raw| semver::Version::parse(&raw).ok())
            .filter(|version| self.cache.is_ready(name, version))
            .max()
            .map(|version| {
                self.cache
                    .lookup(name, &version)
                    .expect("is_ready was just checked")
            })
    }

    fn extract_and_install(
        &self,
        name: &ToolName,
        version: &semver::Version,
        data: &[u8],
    ) -> Result<pmshim_cache::CacheEntry, PmError> {
        let staging_parent = self.cache.tool_dir(name);
        fs_err::create_dir_all(&staging_parent)?;
        let staged = extract::extract_tarball(data, &staging_parent)?;
        Ok(self.cache.install_atomic(name, version, &staged)?)
    }
}

/// Fail fast with [`PmError::NetworkDisabled`] before any download attempt
/// when `PMSHIM_ENABLE_NETWORK=0`; a cache hit must never reach this check.
fn ensure_network(env: &EnvFlags) -> Result<(), PmError> {
    if env.enable_network {
        Ok(())
    } else {
        Err(PmError::NetworkDisabled)
    }
}

fn known_tarball_url(name: &ToolName, version: &semver::Version) -> Result<url::Url, PmError> {
    let config = pmshim_config::config_for(name).ok_or_else(|| {
        PmError::Other(format!(
            "no tarball source is known for \"{name}\" without an explicit URL"
        ))
    })?;
    Ok(url::Url::parse(&config.tarball_url(version))?)
}

/// A URL-pinned tool has no registry-assigned version; its cache address is
/// derived from the URL itself via a synthetic `0.0.0+<digest prefix>`
/// version, so the content-addressed cache layout still applies.
fn synthetic_version_for_url(url: &url::Url) -> semver::Version {
    let mut hasher = Hasher::new(HashAlgo::Sha256);
    hasher.update(url.as_str().as_bytes());
    let digest = hasher.finalize_hex();
    let build = semver::BuildMetadata::new(&digest[..16]).expect("hex digest is valid build metadata");
    semver::Version {
        major: 0,
        minor: 0,
        patch: 0,
        pre: semver::Prerelease::EMPTY,
        build,
    }
}
