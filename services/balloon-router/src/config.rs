//! Router configuration loading and types.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use map_sync::EngineConfig;
use router_client::config::{DEFAULT_BACKEND_URL, DEFAULT_GEOCODER_URL};
use router_client::ClientConfig;
use router_common::Position;
use serde::{Deserialize, Serialize};

/// Router configuration loaded from YAML.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    pub backend: BackendSection,
    pub geocoder: GeocoderSection,
    pub map: MapSection,
}

/// Route backend connection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendSection {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for BackendSection {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BACKEND_URL.to_string(),
            timeout_secs: 30,
        }
    }
}

/// Geocoding service connection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeocoderSection {
    pub base_url: String,
    /// `None` uses the client default (`balloon-router/<version>`).
    pub user_agent: Option<String>,
    pub timeout_secs: u64,
}

impl Default for GeocoderSection {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_GEOCODER_URL.to_string(),
            user_agent: None,
            timeout_secs: 10,
        }
    }
}

/// Initial view and drawing settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapSection {
    pub center_lat: f64,
    pub center_lon: f64,
    pub zoom: u8,
    pub wind_glyph_scale: f64,
    pub tile_url: String,
}

impl Default for MapSection {
    fn default() -> Self {
        let engine = EngineConfig::default();
        Self {
            center_lat: engine.center.latitude,
            center_lon: engine.center.longitude,
            zoom: engine.zoom,
            wind_glyph_scale: engine.wind_glyph_scale,
            tile_url: engine.tile_url,
        }
    }
}

impl RouterConfig {
    /// Load configuration from a YAML file.
    ///
    /// A missing file is not an error: defaults are used and a warning is
    /// logged.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::warn!(
                path = %path.display(),
                "Config file does not exist, using defaults"
            );
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {:?}", path))?;
        let config: RouterConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config: {:?}", path))?;

        tracing::info!(
            path = %path.display(),
            backend = %config.backend.base_url,
            geocoder = %config.geocoder.base_url,
            "Loaded router config"
        );
        Ok(config)
    }

    /// Apply command-line overrides.
    pub fn with_overrides(mut self, backend_url: Option<String>, geocoder_url: Option<String>) -> Self {
        if let Some(url) = backend_url {
            self.backend.base_url = url;
        }
        if let Some(url) = geocoder_url {
            self.geocoder.base_url = url;
        }
        self
    }

    pub fn backend_client(&self) -> ClientConfig {
        ClientConfig::new(&self.backend.base_url)
            .with_timeout(Duration::from_secs(self.backend.timeout_secs))
    }

    pub fn geocoder_client(&self) -> ClientConfig {
        let config = ClientConfig::new(&self.geocoder.base_url)
            .with_timeout(Duration::from_secs(self.geocoder.timeout_secs));
        match &self.geocoder.user_agent {
            Some(agent) => config.with_user_agent(agent),
            None => config,
        }
    }

    /// Engine settings. Fails if the configured center is not a valid position.
    pub fn engine(&self) -> Result<EngineConfig> {
        let center = Position::new(self.map.center_lat, self.map.center_lon)
            .context("Invalid map center in config")?;
        Ok(EngineConfig {
            center,
            zoom: self.map.zoom,
            wind_glyph_scale: self.map.wind_glyph_scale,
            tile_url: self.map.tile_url.clone(),
            ..EngineConfig::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = RouterConfig::load(&dir.path().join("absent.yaml")).unwrap();
        assert_eq!(config, RouterConfig::default());
        assert_eq!(config.backend.base_url, "http://localhost:8000");
        assert_eq!(config.map.zoom, 4);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "backend:\n  base_url: http://backend:9000\nmap:\n  zoom: 6\n"
        )
        .unwrap();

        let config = RouterConfig::load(file.path()).unwrap();
        assert_eq!(config.backend.base_url, "http://backend:9000");
        assert_eq!(config.backend.timeout_secs, 30);
        assert_eq!(config.map.zoom, 6);
        assert_eq!(config.map.center_lat, 37.7749);
        assert_eq!(config.geocoder, GeocoderSection::default());
    }

    #[test]
    fn test_invalid_yaml_is_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "backend: [not, a, map]").unwrap();
        assert!(RouterConfig::load(file.path()).is_err());
    }

    #[test]
    fn test_overrides_win() {
        let config = RouterConfig::default()
            .with_overrides(Some("http://other:1234".into()), None);
        assert_eq!(config.backend.base_url, "http://other:1234");
        assert_eq!(config.geocoder.base_url, DEFAULT_GEOCODER_URL);
    }

    #[test]
    fn test_client_configs() {
        let mut config = RouterConfig::default();
        config.geocoder.user_agent = Some("tester/1.0".into());
        config.geocoder.timeout_secs = 5;

        let geocoder = config.geocoder_client();
        assert_eq!(geocoder.user_agent, "tester/1.0");
        assert_eq!(geocoder.request_timeout, Duration::from_secs(5));
        assert_eq!(config.backend_client().base_url, DEFAULT_BACKEND_URL);
    }

    #[test]
    fn test_engine_rejects_bad_center() {
        let mut config = RouterConfig::default();
        config.map.center_lat = 123.0;
        assert!(config.engine().is_err());

        config.map.center_lat = 0.0;
        let engine = config.engine().unwrap();
        assert_eq!(engine.center.latitude, 0.0);
    }

    #[test]
    fn test_shipped_config_parses() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../config/router.yaml");
        let config = RouterConfig::load(&path).unwrap();
        assert_eq!(config.map.tile_url, map_sync::engine::DEFAULT_TILE_URL);
    }
}
