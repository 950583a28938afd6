use serde::{Deserialize, Serialize};

/// S3-compatible backend configuration (loaded from plop.toml).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// S3 endpoint URL
    pub endpoint: String,
    /// S3 region
    pub region: String,
    /// Bucket holding the objects
    pub bucket: String,
    pub access_key_id: String,
    pub secret_access_key: String,
    /// Enforce HTTPS for S3 connections (error on HTTP endpoints)
    pub enforce_tls: bool,
}
