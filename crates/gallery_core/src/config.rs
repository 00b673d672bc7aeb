//! Environment configuration and persisted preferences.
//!
//! Connection settings (bucket, region, credentials) come from the
//! environment at startup and must fail loudly when absent. Presentation
//! preferences are optional and live in a TOML file under the platform
//! config dir.

use crate::error::{GalleryError, Result};
use crate::filter::{SortBy, SortDirection};
use directories::ProjectDirs;
use gallery_store::S3Config;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

const ENV_BUCKET: &str = "GALLERY_S3_BUCKET";
const ENV_REGION: &str = "GALLERY_AWS_REGION";
const ENV_ACCESS_KEY: &str = "GALLERY_AWS_ACCESS_KEY_ID";
const ENV_SECRET_KEY: &str = "GALLERY_AWS_SECRET_ACCESS_KEY";
const ENV_ENDPOINT: &str = "GALLERY_S3_ENDPOINT";
const ENV_FORCE_PATH_STYLE: &str = "GALLERY_S3_FORCE_PATH_STYLE";

/// Connection settings sourced from the environment.
#[derive(Debug, Clone)]
pub struct GalleryConfig {
    pub bucket: String,
    pub region: String,
    pub access_key_id: String,
    pub secret_access_key: String,
    pub endpoint: Option<String>,
    pub force_path_style: bool,
}

impl GalleryConfig {
    /// Read the connection settings, naming every missing variable in one
    /// diagnostic rather than failing on the first.
    pub fn from_env() -> Result<Self> {
        let mut missing = Vec::new();
        let mut required = |name: &'static str| match std::env::var(name) {
            Ok(value) if !value.trim().is_empty() => Some(value),
            _ => {
                missing.push(name);
                None
            }
        };

        let bucket = required(ENV_BUCKET);
        let region = required(ENV_REGION);
        let access_key_id = required(ENV_ACCESS_KEY);
        let secret_access_key = required(ENV_SECRET_KEY);

        match (bucket, region, access_key_id, secret_access_key) {
            (Some(bucket), Some(region), Some(access_key_id), Some(secret_access_key)) => {
                Ok(Self {
                    bucket,
                    region,
                    access_key_id,
                    secret_access_key,
                    endpoint: std::env::var(ENV_ENDPOINT).ok().filter(|v| !v.is_empty()),
                    force_path_style: std::env::var(ENV_FORCE_PATH_STYLE)
                        .map(|v| matches!(v.as_str(), "1" | "true" | "yes"))
                        .unwrap_or(false),
                })
            }
            _ => {
                let msg = format!("missing environment configuration: {}", missing.join(", "));
                tracing::error!("{msg}");
                Err(GalleryError::Config(msg))
            }
        }
    }

    pub fn to_s3_config(&self) -> S3Config {
        S3Config {
            bucket: self.bucket.clone(),
            region: self.region.clone(),
            access_key_id: self.access_key_id.clone(),
            secret_access_key: self.secret_access_key.clone(),
            endpoint: self.endpoint.clone(),
            force_path_style: self.force_path_style,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViewMode {
    #[serde(rename = "grid")]
    Grid,
    #[serde(rename = "list")]
    List,
    #[serde(rename = "masonry")]
    Masonry,
}

/// Presentation preferences persisted between sessions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    pub sort_by: SortBy,
    pub sort_direction: SortDirection,
    pub view_mode: ViewMode,
    pub signed_url_ttl_secs: u64,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            sort_by: SortBy::Name,
            sort_direction: SortDirection::Ascending,
            view_mode: ViewMode::Grid,
            signed_url_ttl_secs: 60 * 60,
        }
    }
}

impl Preferences {
    /// Load preferences, falling back to defaults when the file is absent.
    pub fn load() -> anyhow::Result<Self> {
        let path = Self::config_path();

        if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            let prefs: Self = toml::from_str(&content)?;
            tracing::info!("Preferences loaded from {:?}", path);
            Ok(prefs)
        } else {
            tracing::info!("Using default preferences");
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let path = Self::config_path();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(&path, content)?;

        tracing::info!("Preferences saved to {:?}", path);
        Ok(())
    }

    /// Preferences file location.
    pub fn config_path() -> PathBuf {
        ProjectDirs::from("com", "BucketGallery", "BucketGallery")
            .map(|dirs| dirs.config_dir().join("preferences.toml"))
            .unwrap_or_else(|| PathBuf::from("./preferences.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // One test owns the GALLERY_* variables; splitting it would race the
    // parallel test runner on the process environment.
    #[test]
    fn env_config_reports_every_missing_variable() {
        for name in [ENV_BUCKET, ENV_REGION, ENV_ACCESS_KEY, ENV_SECRET_KEY] {
            std::env::remove_var(name);
        }

        let err = GalleryConfig::from_env().unwrap_err();
        let msg = err.to_string();
        for name in [ENV_BUCKET, ENV_REGION, ENV_ACCESS_KEY, ENV_SECRET_KEY] {
            assert!(msg.contains(name), "{msg}");
        }
        assert!(!err.is_recoverable());

        std::env::set_var(ENV_BUCKET, "gallery");
        std::env::set_var(ENV_REGION, "eu-west-1");
        std::env::set_var(ENV_ACCESS_KEY, "AKIATEST");
        std::env::set_var(ENV_SECRET_KEY, "secret");
        std::env::set_var(ENV_ENDPOINT, "minio:9000");
        std::env::set_var(ENV_FORCE_PATH_STYLE, "true");

        let config = GalleryConfig::from_env().unwrap();
        assert_eq!(config.bucket, "gallery");
        assert_eq!(config.endpoint.as_deref(), Some("minio:9000"));
        assert!(config.force_path_style);

        let s3 = config.to_s3_config();
        assert_eq!(s3.bucket, "gallery");
        assert_eq!(s3.region, "eu-west-1");
    }

    #[test]
    fn preferences_round_trip_through_toml() {
        let prefs = Preferences {
            sort_by: SortBy::Date,
            sort_direction: SortDirection::Descending,
            view_mode: ViewMode::Masonry,
            signed_url_ttl_secs: 600,
        };

        let text = toml::to_string_pretty(&prefs).unwrap();
        let parsed: Preferences = toml::from_str(&text).unwrap();
        assert_eq!(parsed.sort_by, SortBy::Date);
        assert_eq!(parsed.view_mode, ViewMode::Masonry);
        assert_eq!(parsed.signed_url_ttl_secs, 600);
    }

    #[test]
    fn partial_preferences_fill_with_defaults() {
        let parsed: Preferences = toml::from_str("sort_by = \"size\"").unwrap();
        assert_eq!(parsed.sort_by, SortBy::Size);
        assert_eq!(parsed.sort_direction, SortDirection::Ascending);
        assert_eq!(parsed.signed_url_ttl_secs, 3600);
    }
}
