//! Dashboard configuration
//!
//! Source URLs carry pre-signed, time-limited tokens, so they are never
//! compiled in. They come from a JSON file and/or environment variables;
//! environment values win.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::records::Hazard;
use crate::schema::SourceKind;

pub const ENV_CONFIG_PATH: &str = "RISK_CONFIG";
pub const ENV_WIND_URL: &str = "RISK_WIND_URL";
pub const ENV_DROUGHT_URL: &str = "RISK_DROUGHT_URL";
pub const ENV_WILDFIRE_URL: &str = "RISK_WILDFIRE_URL";
pub const ENV_CENSUS_URL: &str = "RISK_CENSUS_URL";
pub const ENV_HEALTH_URL: &str = "RISK_HEALTH_URL";
pub const ENV_CENSUS_COPY: &str = "RISK_CENSUS_COPY";
pub const ENV_TOP_N: &str = "RISK_TOP_N";

/// Remote CSV endpoints, one per source
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceUrls {
    pub wind: Option<String>,
    pub drought: Option<String>,
    pub wildfire: Option<String>,
    pub census: Option<String>,
    pub health: Option<String>,
}

impl SourceUrls {
    pub fn url_for(&self, kind: SourceKind) -> Option<&str> {
        let url = match kind {
            SourceKind::Hazard(Hazard::Wind) => &self.wind,
            SourceKind::Hazard(Hazard::Drought) => &self.drought,
            SourceKind::Hazard(Hazard::Wildfire) => &self.wildfire,
            SourceKind::Census => &self.census,
            SourceKind::Health => &self.health,
        };
        url.as_deref().filter(|u| !u.trim().is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub sources: SourceUrls,
    /// Where to keep a raw copy of the census CSV after a successful fetch
    pub census_local_copy: Option<PathBuf>,
    /// Maximum number of memoized source loads
    pub cache_capacity: u64,
    /// Rows kept in ranked tables
    pub top_n: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            sources: SourceUrls::default(),
            census_local_copy: None,
            cache_capacity: 16,
            top_n: 10,
        }
    }
}

impl DashboardConfig {
    /// Load configuration from a JSON file
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// Build configuration from the process environment
    ///
    /// `RISK_CONFIG` (if set) names a JSON file used as the base; the
    /// per-source variables override it.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`DashboardConfig::from_env`] with an injectable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match lookup(ENV_CONFIG_PATH) {
            Some(path) => Self::from_json_file(Path::new(&path))?,
            None => Self::default(),
        };

        let overrides = [
            (ENV_WIND_URL, &mut config.sources.wind),
            (ENV_DROUGHT_URL, &mut config.sources.drought),
            (ENV_WILDFIRE_URL, &mut config.sources.wildfire),
            (ENV_CENSUS_URL, &mut config.sources.census),
            (ENV_HEALTH_URL, &mut config.sources.health),
        ];
        for (key, slot) in overrides {
            if let Some(value) = lookup(key) {
                *slot = Some(value);
            }
        }

        if let Some(path) = lookup(ENV_CENSUS_COPY) {
            config.census_local_copy = Some(PathBuf::from(path));
        }

        if let Some(raw) = lookup(ENV_TOP_N) {
            config.top_n = raw
                .trim()
                .parse()
                .ok()
                .filter(|n: &usize| *n > 0)
                .ok_or(ConfigError::InvalidValue { key: ENV_TOP_N.to_string(), value: raw })?;
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = DashboardConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config, DashboardConfig::default());
        assert_eq!(config.top_n, 10);
        assert!(config.sources.url_for(SourceKind::Census).is_none());
    }

    #[test]
    fn test_env_overrides_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"sources": {{"wind": "https://file/wind.csv", "health": "https://file/health.csv"}}, "top_n": 5}}"#
        ).unwrap();

        let env: HashMap<&str, String> = HashMap::from([
            (ENV_CONFIG_PATH, file.path().display().to_string()),
            (ENV_WIND_URL, "https://env/wind.csv".to_string()),
        ]);
        let config = DashboardConfig::from_lookup(|key| env.get(key).cloned()).unwrap();

        assert_eq!(config.sources.url_for(SourceKind::Hazard(Hazard::Wind)), Some("https://env/wind.csv"));
        assert_eq!(config.sources.url_for(SourceKind::Health), Some("https://file/health.csv"));
        assert_eq!(config.top_n, 5);
        assert_eq!(config.cache_capacity, 16);
    }

    #[test]
    fn test_invalid_top_n() {
        let result = DashboardConfig::from_lookup(|key| (key == ENV_TOP_N).then(|| "0".to_string()));
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn test_blank_url_is_unset() {
        let urls = SourceUrls { census: Some("  ".to_string()), ..Default::default() };
        assert!(urls.url_for(SourceKind::Census).is_none());
    }
}
