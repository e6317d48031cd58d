//! Wires the environment layer, cache, and last-known-good pin file into the
//! shared state every command needs.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use pmshim_cache::{Cache, LastKnownGood};
use pmshim_env::{dotenv_file_selection, merge_dotenv, DotenvFileSelection, EnvFlags};

const LAST_KNOWN_GOOD_FILE: &str = "lastKnownGood.json";

pub struct AppContext {
    pub env: EnvFlags,
    pub cache: Cache,
    pub last_known_good: LastKnownGood,
    pub cwd: PathBuf,
}

fn process_env_map() -> HashMap<String, String> {
    std::env::vars().collect()
}

fn load_dotenv(cwd: &Path, selection: &DotenvFileSelection) -> String {
    let DotenvFileSelection::Named(name) = selection else {
        return String::new();
    };
    fs_err::read_to_string(cwd.join(name)).unwrap_or_default()
}

fn default_home() -> PathBuf {
    directories::BaseDirs::new()
        .map(|dirs| dirs.cache_dir().join("pmshim"))
        .unwrap_or_else(|| PathBuf::from(".pmshim-cache"))
}

impl AppContext {
    pub fn load(cwd: PathBuf) -> anyhow::Result<Self> {
        let process_only = process_env_map();
        let selection = dotenv_file_selection(&process_only);
        let dotenv_contents = load_dotenv(&cwd, &selection);
        let merged = merge_dotenv(&process_only, &dotenv_contents);

        let env = EnvFlags::resolve(&merged, &process_only)
            .context("PMSHIM_INTEGRITY_KEYS is not valid JSON")?;

        let home = env
            .home
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(default_home);
        let cache = Cache::from_path(&home)
            .with_context(|| format!("could not initialize cache at {}", home.display()))?;
        let last_known_good = LastKnownGood::load(&home.join(LAST_KNOWN_GOOD_FILE));

        Ok(Self {
            env,
            cache,
            last_known_good,
            cwd,
        })
    }

    pub fn last_known_good_path(&self) -> PathBuf {
        self.cache.root().join(LAST_KNOWN_GOOD_FILE)
    }

    /// Persist `last_known_good` if `resolution` advanced a pin, per the
    /// same-major-only update rule.
    pub fn record_success(&mut self, resolution: &pmshim_types::Resolution) -> anyhow::Result<()> {
        if self.last_known_good.update(resolution) {
            self.last_known_good
                .save(&self.last_known_good_path())
                .context("failed to persist lastKnownGood.json")?;
        }
        Ok(())
    }
}
