//! Application configuration management.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// JWT configuration.
    pub jwt: JwtSettings,
    /// Blob storage configuration.
    #[serde(default)]
    pub storage: StorageSettings,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

/// Session token settings as they appear in configuration sources.
#[derive(Debug, Clone, Deserialize)]
pub struct JwtSettings {
    /// Secret key for signing tokens.
    #[serde(default)]
    pub secret: String,
    /// Token lifetime in hours. Zero means "unset".
    #[serde(default = "default_expiry_hours")]
    pub expiry_hours: u64,
}

fn default_expiry_hours() -> u64 {
    24
}

/// Blob storage settings.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageSettings {
    /// Root directory for uploaded files.
    #[serde(default = "default_upload_dir")]
    pub upload_dir: String,
    /// Maximum size of a whole upload request body (all files together).
    #[serde(default = "default_max_request_bytes")]
    pub max_request_bytes: usize,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            upload_dir: default_upload_dir(),
            max_request_bytes: default_max_request_bytes(),
        }
    }
}

fn default_upload_dir() -> String {
    "uploads".to_string()
}

fn default_max_request_bytes() -> usize {
    64 * 1024 * 1024
}

impl JwtSettings {
    /// Effective token lifetime in hours, falling back to 24 when unset.
    #[must_use]
    pub const fn effective_expiry_hours(&self) -> u64 {
        if self.expiry_hours == 0 {
            24
        } else {
            self.expiry_hours
        }
    }
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(
                config::Environment::with_prefix("SITETRACK")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_applies_defaults() {
        temp_env::with_vars(
            [
                ("SITETRACK__DATABASE__URL", Some("postgres://localhost/sitetrack")),
                ("SITETRACK__JWT__SECRET", Some("s3cret")),
                ("SITETRACK__JWT__EXPIRY_HOURS", None),
                ("SITETRACK__SERVER__PORT", None),
            ],
            || {
                let config = AppConfig::load().expect("config should load");
                assert_eq!(config.database.url, "postgres://localhost/sitetrack");
                assert_eq!(config.database.max_connections, 10);
                assert_eq!(config.jwt.secret, "s3cret");
                assert_eq!(config.jwt.expiry_hours, 24);
                assert_eq!(config.server.port, 8080);
                assert_eq!(config.storage.upload_dir, "uploads");
            },
        );
    }

    #[test]
    fn test_load_reads_overrides() {
        temp_env::with_vars(
            [
                ("SITETRACK__DATABASE__URL", Some("postgres://db/other")),
                ("SITETRACK__JWT__SECRET", Some("another")),
                ("SITETRACK__JWT__EXPIRY_HOURS", Some("6")),
                ("SITETRACK__SERVER__PORT", Some("9000")),
            ],
            || {
                let config = AppConfig::load().expect("config should load");
                assert_eq!(config.jwt.expiry_hours, 6);
                assert_eq!(config.server.port, 9000);
            },
        );
    }

    #[test]
    fn test_zero_expiry_falls_back_to_a_day() {
        let settings = JwtSettings {
            secret: "x".into(),
            expiry_hours: 0,
        };
        assert_eq!(settings.effective_expiry_hours(), 24);

        let settings = JwtSettings {
            secret: "x".into(),
            expiry_hours: 2,
        };
        assert_eq!(settings.effective_expiry_hours(), 2);
    }
}
