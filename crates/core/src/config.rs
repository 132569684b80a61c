//! Configuration types shared across crates.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Server configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Maximum accepted upload size in bytes.
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: u64,
    /// Optional bearer token required on API requests. When unset, all
    /// requests are admitted.
    #[serde(default)]
    pub auth_token: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            max_upload_bytes: default_max_upload_bytes(),
            auth_token: None,
        }
    }
}

/// Physical storage configuration: the two tier roots.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Fast tier directory where uploads land.
    pub cache_root: PathBuf,
    /// Bulk tier directory where migrated files end up.
    pub storage_root: PathBuf,
}

impl StorageConfig {
    /// Validate the configuration.
    pub fn validate(&self) -> crate::Result<()> {
        if self.cache_root.as_os_str().is_empty() {
            return Err(crate::Error::Config("cache_root must be set".to_string()));
        }
        if self.storage_root.as_os_str().is_empty() {
            return Err(crate::Error::Config("storage_root must be set".to_string()));
        }
        if self.cache_root == self.storage_root {
            return Err(crate::Error::Config(
                "cache_root and storage_root must be distinct directories".to_string(),
            ));
        }
        Ok(())
    }
}

/// Metadata store configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MetadataConfig {
    /// Path to the SQLite database file.
    pub db_path: PathBuf,
}

/// Cache-to-storage migration configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MigrationConfig {
    /// Maximum cumulative bytes admitted to the migration queue. Enqueue
    /// beyond this budget is rejected and the file stays in the cache tier.
    #[serde(default = "default_migration_budget_bytes")]
    pub max_queued_bytes: u64,
}

impl Default for MigrationConfig {
    fn default() -> Self {
        Self {
            max_queued_bytes: default_migration_budget_bytes(),
        }
    }
}

/// Top-level application configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub metadata: MetadataConfig,
    #[serde(default)]
    pub migration: MigrationConfig,
}

impl AppConfig {
    /// Validate the configuration.
    pub fn validate(&self) -> crate::Result<()> {
        self.storage.validate()?;
        if self.server.max_upload_bytes == 0 {
            return Err(crate::Error::Config(
                "max_upload_bytes must be non-zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Create a test configuration rooted under the given directory.
    ///
    /// **For testing only.**
    pub fn for_testing(root: &std::path::Path) -> Self {
        Self {
            server: ServerConfig::default(),
            storage: StorageConfig {
                cache_root: root.join("cache"),
                storage_root: root.join("storage"),
            },
            metadata: MetadataConfig {
                db_path: root.join("metadata.db"),
            },
            migration: MigrationConfig::default(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:8080".to_string()
}

fn default_max_upload_bytes() -> u64 {
    crate::DEFAULT_MAX_UPLOAD_BYTES
}

fn default_migration_budget_bytes() -> u64 {
    crate::DEFAULT_MIGRATION_BUDGET_BYTES
}
