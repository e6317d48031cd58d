//! C7 — Registry Client.
//!
//! Fetches a tool's metadata document, subject to `PMSHIM_ENABLE_NETWORK`
//! and the configured auth material. Version *selection* lives in
//! [`crate::document`]; this module only knows how to get bytes off the
//! wire.

use pmshim_config::ToolConfig;
use pmshim_env::EnvFlags;
use pmshim_types::PmError;
use tracing::debug;

use crate::document::{DistInfo, RegistryDocument};

const DEFAULT_REGISTRY: &str = "https://registry.npmjs.org";

#[derive(Debug, Clone)]
pub struct RegistryClient {
    http: reqwest::Client,
}

impl Default for RegistryClient {
    fn default() -> Self {
        Self::new()
    }
}

impl RegistryClient {
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::new(),
        }
    }

    /// Fetch `<registry>/<package>`, honoring `PMSHIM_NPM_REGISTRY` and the
    /// auth flags. Fails fast with [`PmError::NetworkDisabled`] when the
    /// network layer is turned off, without attempting a connection.
    pub async fn fetch_metadata(
        &self,
        config: &ToolConfig,
        env: &EnvFlags,
    ) -> Result<RegistryDocument, PmError> {
        if !env.enable_network {
            return Err(PmError::NetworkDisabled);
        }

        let base = env.npm_registry.as_deref().unwrap_or(DEFAULT_REGISTRY);
        let url = format!("{}/{}", base.trim_end_matches('/'), config.registry_package);
        debug!("fetching registry metadata from {url}");

        let mut request = self.http.get(&url).header("User-Agent", user_agent());
        request = apply_auth(request, env);

        let response = request
            .send()
            .await
            .map_err(|err| PmError::Other(format!("registry request failed: {err}")))?;
        let document = response
            .json::<RegistryDocument>()
            .await
            .map_err(|err| PmError::Other(format!("registry response was malformed: {err}")))?;
        Ok(document)
    }
}

fn apply_auth(request: reqwest::RequestBuilder, env: &EnvFlags) -> reqwest::RequestBuilder {
    if let Some(token) = &env.npm_token {
        return request.bearer_auth(token);
    }
    if let (Some(user), Some(password)) = (&env.npm_user, &env.npm_password) {
        return request.basic_auth(user, Some(password));
    }
    request
}

fn user_agent() -> String {
    format!("pmshim/{}", env!("CARGO_PKG_VERSION"))
}

/// Render the final tarball URL for a selected version: the registry's own
/// `dist.tarball` wins when present and non-empty, falling back to the
/// tool's built-in template otherwise.
pub fn resolve_tarball_url(config: &ToolConfig, version: &semver::Version, dist: &DistInfo) -> String {
    if dist.tarball.is_empty() {
        config.tarball_url(version)
    } else {
        dist.tarball.clone()
    }
}
