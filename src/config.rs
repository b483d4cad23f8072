use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::MishmashError;
use crate::ncbi::EutilsOptions;
use crate::signals::code_links::DEFAULT_EXCLUDED_URLS;

pub const CONFIG_FILE_NAME: &str = "mishmash.json";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailurePolicy {
    #[default]
    FailFast,
    Continue,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub schema_version: Option<u32>,
    #[serde(default)]
    pub failure_policy: Option<FailurePolicy>,
    #[serde(default)]
    pub include_journal_data: Option<bool>,
    #[serde(default)]
    pub exclude_urls: Option<Vec<String>>,
    #[serde(default)]
    pub extra_exclude_urls: Vec<String>,
    #[serde(default)]
    pub max_retries: Option<usize>,
    #[serde(default)]
    pub retry_delay_ms: Option<u64>,
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub tool: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub schema_version: u32,
    pub failure_policy: FailurePolicy,
    pub include_journal_data: bool,
    pub excluded_urls: Vec<String>,
    pub eutils: EutilsOptions,
}

impl Default for Settings {
    fn default() -> Self {
        ConfigLoader::resolve_config(Config::default(), None)
    }
}

pub struct ConfigLoader;

impl ConfigLoader {
    pub fn resolve(path: Option<&Path>) -> Result<Settings, MishmashError> {
        let env_api_key = std::env::var("NCBI_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty());

        let config_path = match path {
            Some(path) => Some(path.to_path_buf()),
            None => Self::discover(),
        };
        let config = match config_path {
            Some(config_path) => Self::read(&config_path)?,
            None => Config::default(),
        };
        Ok(Self::resolve_config(config, env_api_key))
    }

    fn discover() -> Option<PathBuf> {
        let local = PathBuf::from(CONFIG_FILE_NAME);
        if local.exists() {
            return Some(local);
        }
        ProjectDirs::from("org", "mishmash", "mishmash")
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
            .filter(|path| path.exists())
    }

    fn read(path: &Path) -> Result<Config, MishmashError> {
        debug!(path = %path.display(), "loading config");
        let content =
            fs::read_to_string(path).map_err(|_| MishmashError::ConfigRead(path.to_path_buf()))?;
        serde_json::from_str(&content).map_err(|err| MishmashError::ConfigParse(err.to_string()))
    }

    pub fn resolve_config(config: Config, env_api_key: Option<String>) -> Settings {
        let defaults = EutilsOptions::default();

        let mut excluded_urls = config.exclude_urls.unwrap_or_else(|| {
            DEFAULT_EXCLUDED_URLS
                .iter()
                .map(|url| url.to_string())
                .collect()
        });
        excluded_urls.extend(config.extra_exclude_urls);

        let eutils = EutilsOptions {
            api_key: env_api_key.or(config.api_key.filter(|key| !key.trim().is_empty())),
            email: config.email,
            tool: config.tool.unwrap_or(defaults.tool),
            max_retries: config.max_retries.unwrap_or(defaults.max_retries),
            retry_delay: config
                .retry_delay_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.retry_delay),
            timeout: config
                .request_timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
        };

        Settings {
            schema_version: config.schema_version.unwrap_or(1),
            failure_policy: config.failure_policy.unwrap_or_default(),
            include_journal_data: config.include_journal_data.unwrap_or(false),
            excluded_urls,
            eutils,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_use_builtin_exclusions() {
        let settings = ConfigLoader::resolve_config(Config::default(), None);
        assert_eq!(settings.schema_version, 1);
        assert_eq!(settings.failure_policy, FailurePolicy::FailFast);
        assert_eq!(settings.excluded_urls.len(), DEFAULT_EXCLUDED_URLS.len());
        assert_eq!(settings.eutils.max_retries, 3);
    }

    #[test]
    fn environment_key_wins() {
        let config = Config {
            api_key: Some("from-file".to_string()),
            ..Config::default()
        };
        let settings = ConfigLoader::resolve_config(config, Some("from-env".to_string()));
        assert_eq!(settings.eutils.api_key.as_deref(), Some("from-env"));
    }
}
