use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::domain::SubmitMethod;
use crate::error::SubmitError;

pub const DEFAULT_MAX_ROWS_PER_CHUNK: i64 = 30000;

#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    pub api_base: String,
    #[serde(default)]
    pub submission_base: Option<String>,
    #[serde(default)]
    pub max_rows_per_chunk: Option<i64>,
    #[serde(default)]
    pub method: Option<SubmitMethod>,
}

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub api_base: String,
    pub submission_base: String,
    pub max_rows_per_chunk: i64,
    pub method: SubmitMethod,
}

pub struct ConfigLoader;

impl ConfigLoader {
    pub fn resolve(path: Option<&str>) -> Result<ResolvedConfig, SubmitError> {
        let config_path = match path {
            Some(path) => PathBuf::from(path),
            None => PathBuf::from("commons-submit.json"),
        };

        if path.is_none() && !config_path.exists() {
            return Err(SubmitError::MissingConfig);
        }

        let content = fs::read_to_string(&config_path)
            .map_err(|_| SubmitError::ConfigRead(config_path.clone()))?;
        let config: Config = serde_json::from_str(&content)
            .map_err(|err| SubmitError::ConfigParse(err.to_string()))?;

        Ok(Self::resolve_config(config))
    }

    pub fn resolve_config(config: Config) -> ResolvedConfig {
        let api_base = config.api_base.trim_end_matches('/').to_string();
        let submission_base = config
            .submission_base
            .map(|base| base.trim_end_matches('/').to_string())
            .unwrap_or_else(|| api_base.clone());

        ResolvedConfig {
            api_base,
            submission_base,
            max_rows_per_chunk: config
                .max_rows_per_chunk
                .unwrap_or(DEFAULT_MAX_ROWS_PER_CHUNK),
            method: config.method.unwrap_or(SubmitMethod::Put),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_config_defaults() {
        let config = Config {
            api_base: "https://commons.example/api/v0/submission/".to_string(),
            submission_base: None,
            max_rows_per_chunk: None,
            method: None,
        };

        let resolved = ConfigLoader::resolve_config(config);
        assert_eq!(resolved.api_base, "https://commons.example/api/v0/submission");
        assert_eq!(resolved.submission_base, resolved.api_base);
        assert_eq!(resolved.max_rows_per_chunk, DEFAULT_MAX_ROWS_PER_CHUNK);
        assert_eq!(resolved.method, SubmitMethod::Put);
    }

    #[test]
    fn resolve_config_explicit() {
        let config = Config {
            api_base: "https://commons.example/api".to_string(),
            submission_base: Some("https://commons.example/submit/".to_string()),
            max_rows_per_chunk: Some(500),
            method: Some(SubmitMethod::Post),
        };

        let resolved = ConfigLoader::resolve_config(config);
        assert_eq!(resolved.submission_base, "https://commons.example/submit");
        assert_eq!(resolved.max_rows_per_chunk, 500);
        assert_eq!(resolved.method, SubmitMethod::Post);
    }
}
