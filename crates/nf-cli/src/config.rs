use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use nf_tools::NewsConfig;

/// Environment variable holding the NewsAPI key.
pub const API_KEY_ENV: &str = "NEWS_API_KEY";

/// Prefix for overriding any setting, nested with `__`
/// (e.g. `NF_SEARCH__LANGUAGE=de`).
const ENV_PREFIX: &str = "NF_";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(flatten)]
    pub news: NewsConfig,
}

/// Expand `~` and `$VAR`/`${VAR}` in a user-supplied path.
pub fn expand_path(path: &str) -> PathBuf {
    let mut result = path.to_string();

    if let Some(rest) = result.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            result = home.join(rest).display().to_string();
        }
    } else if result == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    }

    match regex::Regex::new(r"\$\{?([A-Za-z_][A-Za-z0-9_]*)\}?") {
        Ok(re) => {
            let expanded = re.replace_all(&result, |caps: &regex::Captures| {
                std::env::var(&caps[1]).unwrap_or_else(|_| caps[0].to_string())
            });
            PathBuf::from(expanded.as_ref())
        }
        Err(_) => PathBuf::from(result),
    }
}

impl Config {
    /// Defaults, then the TOML file (if present), then `NF_*` variables, then
    /// `NEWS_API_KEY`.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => Self::config_path()?,
        };

        Self::file_figment(&path)
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .merge(Env::raw().only(&[API_KEY_ENV]).map(|_| "search.api_key".into()))
            .extract()
            .with_context(|| format!("Failed to load configuration from {}", path.display()))
    }

    fn file_figment(path: &Path) -> Figment {
        Figment::from(Serialized::defaults(Config::default())).merge(Toml::file(path))
    }

    pub fn config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
        Ok(config_dir.join("nf"))
    }

    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    pub fn has_api_key(&self) -> bool {
        self.news
            .search
            .api_key
            .as_deref()
            .is_some_and(|key| !key.trim().is_empty())
    }

    /// A copy safe to print, with the API key masked.
    pub fn redacted(&self) -> Config {
        let mut config = self.clone();
        if let Some(key) = config.news.search.api_key.as_mut() {
            *key = mask_key(key);
        }
        config
    }
}

/// Keys long enough to stay secret keep their last four characters; shorter
/// ones are hidden entirely.
fn mask_key(key: &str) -> String {
    const VISIBLE: usize = 4;
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= VISIBLE * 2 {
        return "****".to_string();
    }
    let tail: String = chars[chars.len() - VISIBLE..].iter().collect();
    format!("****{}", tail)
}
