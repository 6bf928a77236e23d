//! Layered configuration and path helpers.
//!
//! Uses Figment to merge built-in defaults + `config.toml` + `config.<env>.toml`
//! + `APP_*` env vars. Search tuning lives under the `[docs]` table and is
//! exposed as [`EngineConfig`].

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

pub const DEFAULT_LIMIT: usize = 5;
pub const DEFAULT_CATEGORY_LIMIT: usize = 10;
pub const DEFAULT_SNIPPET_LEN: usize = 260;
pub const DEFAULT_SCORE_CUTOFF: f32 = 0.4;
pub const DEFAULT_FUZZY: f64 = 0.2;

/// Tuning knobs of the documentation search engine.
///
/// `Default` reproduces the engine's fixed behavior; overriding is only
/// meant for the command line and tests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub corpus_path: Option<String>,
    pub default_limit: usize,
    pub category_limit: usize,
    pub snippet_len: usize,
    pub score_cutoff: f32,
    pub fuzzy: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            corpus_path: None,
            default_limit: DEFAULT_LIMIT,
            category_limit: DEFAULT_CATEGORY_LIMIT,
            snippet_len: DEFAULT_SNIPPET_LEN,
            score_cutoff: DEFAULT_SCORE_CUTOFF,
            fuzzy: DEFAULT_FUZZY,
        }
    }
}

pub struct Config {
    figment: Figment,
}

impl Config {
    pub fn load() -> Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());

        let mut figment = Self::defaults().merge(Toml::file("config.toml"));
        match env_name.as_str() {
            "dev" | "development" => figment = figment.merge(Toml::file("config.dev.toml")),
            "prod" | "production" => figment = figment.merge(Toml::file("config.prod.toml")),
            "test" | "testing" => figment = figment.merge(Toml::file("config.test.toml")),
            _ => {}
        }
        figment = figment.merge(Env::prefixed("APP_").split("__"));

        let config = Self { figment };
        config.engine()?;
        Ok(config)
    }

    /// Build a config from defaults plus a single TOML file, skipping the
    /// environment layers.
    pub fn from_file(path: &Path) -> Result<Self> {
        let config = Self { figment: Self::defaults().merge(Toml::file(path)) };
        config.engine()?;
        Ok(config)
    }

    fn defaults() -> Figment {
        Figment::from(Serialized::default("docs", EngineConfig::default()))
    }

    pub fn get<T>(&self, key: &str) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        self.figment
            .extract_inner(key)
            .map_err(|e| Error::InvalidConfig(format!("Failed to get '{}': {}", key, e)))
    }

    pub fn engine(&self) -> Result<EngineConfig> {
        let engine: EngineConfig = self.get("docs")?;
        if !(0.0..=1.0).contains(&engine.score_cutoff) {
            return Err(Error::InvalidConfig(format!(
                "docs.score_cutoff must be within [0, 1], got {}",
                engine.score_cutoff
            )));
        }
        if !engine.fuzzy.is_finite() || engine.fuzzy < 0.0 {
            return Err(Error::InvalidConfig(format!(
                "docs.fuzzy must be a non-negative number, got {}",
                engine.fuzzy
            )));
        }
        if engine.snippet_len == 0 {
            return Err(Error::InvalidConfig("docs.snippet_len must be positive".to_string()));
        }
        Ok(engine)
    }
}

/// Expand a user-provided path string:
/// - Expands leading '~' to the user's home directory
/// - Expands ${VAR} and $VAR environment variables
/// - Returns a PathBuf without attempting to canonicalize
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}

/// Resolve a possibly relative path against a given base directory after expansion.
/// If `p` is absolute, it's returned as-is; otherwise `base.join(p)` is returned.
pub fn resolve_with_base<S: AsRef<str>>(base: &Path, p: S) -> PathBuf {
    let p = expand_path(p);
    if p.is_absolute() { p } else { base.join(p) }
}
