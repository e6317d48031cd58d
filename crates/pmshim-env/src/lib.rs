//! C2 — Environment Layer.
//!
//! Merges the process environment with an optional dotenv file and exposes
//! the resolved set of flags the rest of the pipeline reads. File selection
//! and the merge precedence are kept as pure functions over plain
//! `HashMap<String, String>`s so they're testable without touching the real
//! process environment (tests that did mutate `std::env` directly would have
//! to serialize with `serial_test`, which this design avoids entirely).

use std::collections::HashMap;

use rustc_hash::FxHashMap;
use serde::Deserialize;

mod dotenv;

pub use dotenv::parse as parse_dotenv;

/// What to do about `PMSHIM_ENV_FILE` before any file has been read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DotenvFileSelection {
    /// `PMSHIM_ENV_FILE=0` — load no file at all.
    None,
    /// Load this file name, relative to the project root.
    Named(String),
}

/// Decide which dotenv file (if any) should be loaded, purely from the
/// process environment — step 1–3 of the environment layer's file selection
/// rules. Does not touch the filesystem.
pub fn dotenv_file_selection(process_env: &HashMap<String, String>) -> DotenvFileSelection {
    match process_env.get("PMSHIM_ENV_FILE") {
        Some(value) if value == "0" => DotenvFileSelection::None,
        Some(value) => DotenvFileSelection::Named(value.clone()),
        None => DotenvFileSelection::Named(".pmshim.env".to_string()),
    }
}

/// Merge dotenv-file pairs into the process environment. Values from the
/// file never override an already-set process environment variable.
pub fn merge_dotenv(
    process_env: &HashMap<String, String>,
    dotenv_contents: &str,
) -> HashMap<String, String> {
    let mut merged = process_env.clone();
    for (key, value) in dotenv::parse(dotenv_contents) {
        merged.entry(key).or_insert(value);
    }
    merged
}

/// A single registered key for signature verification, as found in
/// `PMSHIM_INTEGRITY_KEYS`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct IntegrityKeyEntry {
    pub keyid: String,
    pub key: String,
}

/// How `PMSHIM_INTEGRITY_KEYS` should be interpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntegrityKeysSetting {
    /// Unset: use the built-in keys.
    BuiltIn,
    /// Empty string or `0`: skip signature checking entirely.
    Disabled,
    /// A JSON object of `{tool -> [{keyid, key}, ...]}`. An empty object
    /// means "no compatible keys", which rejects any signed artifact rather
    /// than silently accepting it.
    Custom(FxHashMap<String, Vec<IntegrityKeyEntry>>),
}

#[derive(Debug, thiserror::Error)]
pub enum EnvError {
    #[error("PMSHIM_INTEGRITY_KEYS is not valid JSON: {0}")]
    MalformedIntegrityKeys(#[from] serde_json::Error),
}

fn parse_integrity_keys(raw: Option<&str>) -> Result<IntegrityKeysSetting, EnvError> {
    match raw {
        None => Ok(IntegrityKeysSetting::BuiltIn),
        Some("") | Some("0") => Ok(IntegrityKeysSetting::Disabled),
        Some(json) => {
            let keys: FxHashMap<String, Vec<IntegrityKeyEntry>> = serde_json::from_str(json)?;
            Ok(IntegrityKeysSetting::Custom(keys))
        }
    }
}

fn get_bool(map: &HashMap<String, String>, key: &str, default: bool) -> bool {
    match map.get(key).map(String::as_str) {
        Some("1") => true,
        Some("0") => false,
        _ => default,
    }
}

/// The fully resolved set of environment flags consumed by the rest of the
/// pipeline.
#[derive(Debug, Clone)]
pub struct EnvFlags {
    pub home: Option<String>,
    pub default_to_latest: bool,
    pub enable_network: bool,
    pub enable_project_spec: bool,
    pub enable_auto_pin: bool,
    pub enable_strict: bool,
    pub enable_download_prompt: bool,
    pub enable_unsafe_custom_urls: bool,
    pub npm_registry: Option<String>,
    pub npm_token: Option<String>,
    pub npm_user: Option<String>,
    pub npm_password: Option<String>,
    pub integrity_keys: IntegrityKeysSetting,
}

impl EnvFlags {
    /// Compute the resolved flags from the merged environment (process env
    /// layered with an allowed dotenv file) and the *unmerged* process
    /// environment alone — `PMSHIM_ENABLE_DOWNLOAD_PROMPT` is honored only
    /// when set directly in the process, never via the dotenv file, per the
    /// documented "no" answer to that open question.
    pub fn resolve(
        merged: &HashMap<String, String>,
        process_only: &HashMap<String, String>,
    ) -> Result<Self, EnvError> {
        Ok(Self {
            home: merged.get("PMSHIM_HOME").cloned(),
            default_to_latest: get_bool(merged, "PMSHIM_DEFAULT_TO_LATEST", false),
            enable_network: get_bool(merged, "PMSHIM_ENABLE_NETWORK", true),
            enable_project_spec: get_bool(merged, "PMSHIM_ENABLE_PROJECT_SPEC", true),
            enable_auto_pin: get_bool(merged, "PMSHIM_ENABLE_AUTO_PIN", false),
            enable_strict: get_bool(merged, "PMSHIM_ENABLE_STRICT", true),
            enable_download_prompt: get_bool(process_only, "PMSHIM_ENABLE_DOWNLOAD_PROMPT", false),
            enable_unsafe_custom_urls: get_bool(merged, "PMSHIM_ENABLE_UNSAFE_CUSTOM_URLS", false),
            npm_registry: merged.get("PMSHIM_NPM_REGISTRY").cloned(),
            npm_token: merged.get("PMSHIM_NPM_TOKEN").cloned(),
            npm_user: merged.get("PMSHIM_NPM_USER").cloned(),
            npm_password: merged.get("PMSHIM_NPM_PASSWORD").cloned(),
            integrity_keys: parse_integrity_keys(
                merged.get("PMSHIM_INTEGRITY_KEYS").map(String::as_str),
            )?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn dotenv_file_selection_disabled() {
        let env = map(&[("PMSHIM_ENV_FILE", "0")]);
        assert_eq!(dotenv_file_selection(&env), DotenvFileSelection::None);
    }

    #[test]
    fn dotenv_file_selection_named_override() {
        let env = map(&[("PMSHIM_ENV_FILE", "custom.env")]);
        assert_eq!(
            dotenv_file_selection(&env),
            DotenvFileSelection::Named("custom.env".to_string())
        );
    }

    #[test]
    fn dotenv_file_selection_default() {
        let env = HashMap::new();
        assert_eq!(
            dotenv_file_selection(&env),
            DotenvFileSelection::Named(".pmshim.env".to_string())
        );
    }

    #[test]
    fn merge_dotenv_does_not_override_process_env() {
        let process = map(&[("PMSHIM_HOME", "/process/home")]);
        let merged = merge_dotenv(&process, "PMSHIM_HOME=/file/home\nPMSHIM_ENABLE_NETWORK=0\n");
        assert_eq!(merged.get("PMSHIM_HOME").unwrap(), "/process/home");
        assert_eq!(merged.get("PMSHIM_ENABLE_NETWORK").unwrap(), "0");
    }

    #[test]
    fn resolve_defaults() {
        let empty = HashMap::new();
        let flags = EnvFlags::resolve(&empty, &empty).unwrap();
        assert!(flags.enable_network);
        assert!(flags.enable_project_spec);
        assert!(flags.enable_strict);
        assert!(!flags.default_to_latest);
        assert!(!flags.enable_auto_pin);
        assert!(!flags.enable_download_prompt);
        assert!(matches!(flags.integrity_keys, IntegrityKeysSetting::BuiltIn));
    }

    #[test]
    fn resolve_download_prompt_ignores_dotenv_source() {
        let process_only = HashMap::new();
        let merged = map(&[("PMSHIM_ENABLE_DOWNLOAD_PROMPT", "1")]);
        // Simulate the flag coming only from the dotenv file: present in the
        // merged map, absent from process-only.
        let flags = EnvFlags::resolve(&merged, &process_only).unwrap();
        assert!(!flags.enable_download_prompt);
    }

    #[test]
    fn resolve_download_prompt_honors_process_env() {
        let process_only = map(&[("PMSHIM_ENABLE_DOWNLOAD_PROMPT", "1")]);
        let flags = EnvFlags::resolve(&process_only, &process_only).unwrap();
        assert!(flags.enable_download_prompt);
    }

    #[test]
    fn integrity_keys_disabled_by_zero() {
        let env = map(&[("PMSHIM_INTEGRITY_KEYS", "0")]);
        let flags = EnvFlags::resolve(&env, &env).unwrap();
        assert!(matches!(
            flags.integrity_keys,
            IntegrityKeysSetting::Disabled
        ));
    }

    #[test]
    fn integrity_keys_disabled_by_empty_string() {
        let env = map(&[("PMSHIM_INTEGRITY_KEYS", "")]);
        let flags = EnvFlags::resolve(&env, &env).unwrap();
        assert!(matches!(
            flags.integrity_keys,
            IntegrityKeysSetting::Disabled
        ));
    }

    #[test]
    fn integrity_keys_custom_empty_object_means_no_keys() {
        let env = map(&[("PMSHIM_INTEGRITY_KEYS", "{}")]);
        let flags = EnvFlags::resolve(&env, &env).unwrap();
        match flags.integrity_keys {
            IntegrityKeysSetting::Custom(keys) => assert!(keys.is_empty()),
            other => panic!("expected Custom({{}}), got {other:?}"),
        }
    }

    #[test]
    fn integrity_keys_custom_with_entries() {
        let env = map(&[(
            "PMSHIM_INTEGRITY_KEYS",
            r#"{"npm":[{"keyid":"abc","key":"base64data"}]}"#,
        )]);
        let flags = EnvFlags::resolve(&env, &env).unwrap();
        match flags.integrity_keys {
            IntegrityKeysSetting::Custom(keys) => {
                assert_eq!(keys["npm"][0].keyid, "abc");
            }
            other => panic!("expected Custom(..), got {other:?}"),
        }
    }

    #[test]
    fn integrity_keys_malformed_json_errors() {
        let env = map(&[("PMSHIM_INTEGRITY_KEYS", "not json")]);
        assert!(EnvFlags::resolve(&env, &env).is_err());
    }

    #[test]
    fn bool_flags_accept_explicit_zero_and_one() {
        let env = map(&[
            ("PMSHIM_ENABLE_NETWORK", "0"),
            ("PMSHIM_DEFAULT_TO_LATEST", "1"),
        ]);
        let flags = EnvFlags::resolve(&env, &env).unwrap();
        assert!(!flags.enable_network);
        assert!(flags.default_to_latest);
    }
}
