//! Configuration module
//!
//! Configuration is read once from the environment (a `.env` file is honoured) and is
//! immutable afterwards. It covers the HTTP surface, the upload rules and the
//! retention policy of the storage root.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::constants::DEFAULT_ALLOWED_CONTENT_TYPES;

// Common constants
const SERVER_PORT: u16 = 3000;
const MAX_FILE_SIZE_MB: u64 = 10;
const UPLOAD_DIR: &str = "uploads";
const UPLOAD_PUBLIC_PATH: &str = "/uploads";
const RETENTION_MAX_AGE_MS: u64 = 24 * 60 * 60 * 1000;
const RETENTION_SWEEP_INTERVAL_MS: u64 = 24 * 60 * 60 * 1000;

/// HTTP-level settings
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub environment: String,
}

/// Rules applied to every ingested file
#[derive(Clone, Debug)]
pub struct UploadConfig {
    /// Flat directory holding every accepted file
    pub storage_root: PathBuf,
    /// URL path prefix under which stored files are served
    pub public_path: String,
    pub max_file_size_bytes: u64,
    /// Lower-cased MIME types without parameters
    pub allowed_content_types: Vec<String>,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            storage_root: PathBuf::from(UPLOAD_DIR),
            public_path: UPLOAD_PUBLIC_PATH.to_string(),
            max_file_size_bytes: MAX_FILE_SIZE_MB * 1024 * 1024,
            allowed_content_types: DEFAULT_ALLOWED_CONTENT_TYPES
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// How long stored files live and how often the storage root is swept
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetentionPolicy {
    pub enabled: bool,
    pub max_age: Duration,
    pub sweep_interval: Duration,
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        Self {
            enabled: true,
            max_age: Duration::from_millis(RETENTION_MAX_AGE_MS),
            sweep_interval: Duration::from_millis(RETENTION_SWEEP_INTERVAL_MS),
        }
    }
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config {
    pub base: BaseConfig,
    pub upload: UploadConfig,
    pub retention: RetentionPolicy,
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let base = BaseConfig {
            server_port: env::var("PORT")
                .unwrap_or_else(|_| SERVER_PORT.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            cors_origins: parse_list(
                &env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string()),
                false,
            ),
            environment,
        };

        // MAX_FILE_SIZE_BYTES wins over MAX_FILE_SIZE_MB when both are set
        let max_file_size_bytes = match env::var("MAX_FILE_SIZE_BYTES") {
            Ok(bytes) => bytes
                .parse::<u64>()
                .map_err(|_| anyhow::anyhow!("MAX_FILE_SIZE_BYTES must be a valid number"))?,
            Err(_) => match env::var("MAX_FILE_SIZE_MB") {
                Ok(mb) => megabytes_to_bytes(&mb)?,
                Err(_) => MAX_FILE_SIZE_MB * 1024 * 1024,
            },
        };

        let allowed_content_types = match env::var("ALLOWED_CONTENT_TYPES") {
            Ok(list) => parse_list(&list, true),
            Err(_) => UploadConfig::default().allowed_content_types,
        };

        let upload = UploadConfig {
            storage_root: PathBuf::from(
                env::var("UPLOAD_DIR").unwrap_or_else(|_| UPLOAD_DIR.to_string()),
            ),
            public_path: env::var("UPLOAD_PUBLIC_PATH")
                .unwrap_or_else(|_| UPLOAD_PUBLIC_PATH.to_string()),
            max_file_size_bytes,
            allowed_content_types,
        };

        let retention = RetentionPolicy {
            enabled: env::var("RETENTION_ENABLED")
                .unwrap_or_else(|_| "true".to_string())
                .to_lowercase()
                .parse()
                .unwrap_or(true),
            max_age: Duration::from_millis(
                env::var("RETENTION_MAX_AGE_MS")
                    .unwrap_or_else(|_| RETENTION_MAX_AGE_MS.to_string())
                    .parse()
                    .unwrap_or(RETENTION_MAX_AGE_MS),
            ),
            sweep_interval: Duration::from_millis(
                env::var("RETENTION_SWEEP_INTERVAL_MS")
                    .unwrap_or_else(|_| RETENTION_SWEEP_INTERVAL_MS.to_string())
                    .parse()
                    .unwrap_or(RETENTION_SWEEP_INTERVAL_MS),
            ),
        };

        let config = Config {
            base,
            upload,
            retention,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.is_production() && self.base.cors_origins.iter().any(|o| o == "*") {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        if self.upload.max_file_size_bytes == 0 {
            return Err(anyhow::anyhow!("Maximum upload size must be greater than 0"));
        }

        if self.upload.allowed_content_types.is_empty() {
            return Err(anyhow::anyhow!(
                "ALLOWED_CONTENT_TYPES must list at least one MIME type"
            ));
        }

        if let Some(bad) = self
            .upload
            .allowed_content_types
            .iter()
            .find(|ct| ct.split_once('/').map_or(true, |(t, s)| t.is_empty() || s.is_empty()))
        {
            return Err(anyhow::anyhow!(
                "ALLOWED_CONTENT_TYPES contains an invalid MIME type: '{}'",
                bad
            ));
        }

        if !self.upload.public_path.starts_with('/') {
            return Err(anyhow::anyhow!("UPLOAD_PUBLIC_PATH must start with '/'"));
        }

        if self.retention.enabled && self.retention.sweep_interval.is_zero() {
            return Err(anyhow::anyhow!(
                "RETENTION_SWEEP_INTERVAL_MS must be greater than 0 when retention is enabled"
            ));
        }

        Ok(())
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.base.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    pub fn server_port(&self) -> u16 {
        self.base.server_port
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.base.cors_origins
    }

    pub fn environment(&self) -> &str {
        &self.base.environment
    }

    pub fn storage_root(&self) -> &std::path::Path {
        &self.upload.storage_root
    }

    pub fn max_file_size_bytes(&self) -> u64 {
        self.upload.max_file_size_bytes
    }

    pub fn allowed_content_types(&self) -> &[String] {
        &self.upload.allowed_content_types
    }
}

/// Split a comma separated list, trimming entries and dropping empty ones.
fn megabytes_to_bytes(raw: &str) -> Result<u64, anyhow::Error> {
    raw.trim()
        .parse::<u64>()
        .ok()
        .and_then(|mb| mb.checked_mul(1024 * 1024))
        .ok_or_else(|| anyhow::anyhow!("MAX_FILE_SIZE_MB must be a valid number of megabytes"))
}

fn parse_list(raw: &str, lowercase: bool) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            if lowercase {
                s.to_lowercase()
            } else {
                s.to_string()
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> Config {
        Config {
            base: BaseConfig {
                server_port: 3000,
                cors_origins: vec!["*".to_string()],
                environment: "development".to_string(),
            },
            upload: UploadConfig::default(),
            retention: RetentionPolicy::default(),
        }
    }

    #[test]
    fn defaults_match_service_contract() {
        let upload = UploadConfig::default();
        assert_eq!(upload.max_file_size_bytes, 10 * 1024 * 1024);
        assert_eq!(upload.allowed_content_types.len(), 7);
        assert!(upload
            .allowed_content_types
            .contains(&"video/quicktime".to_string()));

        let retention = RetentionPolicy::default();
        assert_eq!(retention.max_age, Duration::from_secs(24 * 3600));
        assert_eq!(retention.sweep_interval, Duration::from_secs(24 * 3600));
    }

    #[test]
    fn wildcard_cors_rejected_in_production() {
        let mut config = test_config();
        assert!(config.validate().is_ok());

        config.base.environment = "Production".to_string();
        assert!(config.validate().is_err());

        config.base.cors_origins = vec!["https://example.com".to_string()];
        assert!(config.validate().is_ok());
    }

    #[test]
    fn invalid_mime_types_rejected() {
        let mut config = test_config();
        config.upload.allowed_content_types = vec!["image/png".to_string(), "png".to_string()];
        assert!(config.validate().is_err());

        config.upload.allowed_content_types = vec![];
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_sweep_interval_rejected_only_when_enabled() {
        let mut config = test_config();
        config.retention.sweep_interval = Duration::ZERO;
        assert!(config.validate().is_err());

        config.retention.enabled = false;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn max_file_size_mb_is_checked() {
        assert_eq!(megabytes_to_bytes("10").unwrap(), 10 * 1024 * 1024);
        assert_eq!(megabytes_to_bytes(" 1 ").unwrap(), 1024 * 1024);
        assert!(megabytes_to_bytes("ten").is_err());
        assert!(megabytes_to_bytes(&u64::MAX.to_string()).is_err());
    }

    #[test]
    fn parse_list_trims_and_drops_empty() {
        assert_eq!(
            parse_list(" Image/PNG , ,video/mp4", true),
            vec!["image/png".to_string(), "video/mp4".to_string()]
        );
        assert_eq!(
            parse_list("https://a.example,https://B.example", false),
            vec!["https://a.example".to_string(), "https://B.example".to_string()]
        );
    }
}
