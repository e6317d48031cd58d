//! The thin serde adapter over the project manifest file. Every field other
//! than `packageManager` and `devEngines` is ignored, and deserialization
//! never fails on unrelated fields or unexpected extra keys.

use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawManifest {
    #[serde(rename = "packageManager")]
    pub package_manager: Option<String>,
    #[serde(rename = "devEngines")]
    pub dev_engines: Option<RawDevEngines>,
    #[serde(flatten)]
    pub _rest: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawDevEngines {
    #[serde(rename = "packageManager")]
    pub package_manager: Option<serde_json::Value>,
}

impl RawManifest {
    /// `true` if neither relevant field is present — such a manifest is
    /// transparent to the project locator's ancestor walk.
    pub fn is_empty(&self) -> bool {
        let dev_engines_empty = match &self.dev_engines {
            Some(engines) => engines.package_manager.is_none(),
            None => true,
        };
        self.package_manager.is_none() && dev_engines_empty
    }
}
