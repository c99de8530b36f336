use crate::adapters::http::DEFAULT_BASE_URL;
use crate::core::SourceFailurePolicy;
use crate::domain::model::DiscoveryEndpoint;
use crate::utils::error::{RadarError, Result};
use crate::utils::validation::{
    validate_non_empty_string, validate_path, validate_range, validate_resolved, validate_url,
    Validate,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const API_KEY_ENV: &str = "STARTUPRADAR_API_KEY";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub sources: SourcesConfig,
    pub storage: StorageConfig,
    pub filter: FilterConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub timeout_seconds: u64,
    pub concurrent_requests: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            timeout_seconds: 30,
            concurrent_requests: 5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourcesConfig {
    pub discovery_endpoints: Vec<String>,
    pub similar_seed_file: Option<String>,
    pub similar_seeds: Vec<String>,
    pub on_failure: SourceFailurePolicy,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            discovery_endpoints: DiscoveryEndpoint::names()
                .into_iter()
                .map(String::from)
                .collect(),
            similar_seed_file: Some(".in/similar.txt".to_string()),
            similar_seeds: Vec::new(),
            on_failure: SourceFailurePolicy::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub output_directory: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            output_directory: ".out/".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    pub excluded_domains: Vec<String>,
    pub excluded_suffixes: Vec<String>,
}

impl AppConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| {
            RadarError::invalid_config("toml_parsing", "", format!("TOML parsing error: {}", e))
        })
    }

    /// 替換環境變數 (例如 ${STARTUPRADAR_API_KEY})，找不到的保留原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| {
            RadarError::invalid_config("toml_parsing", "", format!("Regex error: {}", e))
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.into_owned())
    }

    /// 設定檔沒有提供 API key 時才使用環境變數
    pub fn with_api_key_fallback(mut self, env_value: Option<String>) -> Self {
        let unresolved = self
            .api
            .api_key
            .as_deref()
            .map_or(true, |key| key.trim().is_empty() || key.contains("${"));
        if unresolved {
            if let Some(key) = env_value.filter(|k| !k.trim().is_empty()) {
                self.api.api_key = Some(key);
            }
        }
        self
    }

    pub fn endpoints(&self) -> Result<Vec<DiscoveryEndpoint>> {
        self.sources
            .discovery_endpoints
            .iter()
            .map(|name| name.parse())
            .collect()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.api.timeout_seconds)
    }

    /// 不存在的 seed 檔不算來源，與 `build_workflow` 的判斷一致
    pub fn has_sources(&self) -> bool {
        !self.sources.discovery_endpoints.is_empty()
            || !self.sources.similar_seeds.is_empty()
            || self
                .sources
                .similar_seed_file
                .as_deref()
                .is_some_and(|file| Path::new(file).exists())
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        validate_url("api.base_url", &self.api.base_url)?;
        validate_range("api.timeout_seconds", self.api.timeout_seconds, 1, 600)?;
        validate_range("api.concurrent_requests", self.api.concurrent_requests, 1, 64)?;
        validate_path("storage.output_directory", &self.storage.output_directory)?;

        if let Some(seed_file) = &self.sources.similar_seed_file {
            validate_path("sources.similar_seed_file", seed_file)?;
        }

        self.endpoints()?;

        if self.has_sources() {
            let api_key = self.api.api_key.as_deref().ok_or_else(|| RadarError::MissingConfig {
                field: format!("api.api_key (or {})", API_KEY_ENV),
            })?;
            validate_non_empty_string("api.api_key", api_key)?;
            validate_resolved("api.api_key", api_key)?;
        }

        Ok(())
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
