//! OpenDAL-backed S3 adapter.

use anyhow::{Context, Result};
use async_trait::async_trait;
use bytes::Bytes;
use opendal::Operator;

use plop_core::config::StorageConfig;

use crate::backend::{Backend, BackendError, ObjectReader, PutOptions};

/// Build an OpenDAL Operator for any S3-compatible endpoint.
///
/// Uses path-style addressing (the opendal default), which SeaweedFS and
/// MinIO require. Do NOT call enable_virtual_host_style() for these.
///
/// If the endpoint uses plaintext HTTP and `enforce_tls` is set, this
/// returns an error; otherwise a warning is logged for non-HTTPS
/// endpoints. There is no retry layer here: the store never retries, and
/// retry policy belongs to the caller.
pub fn build_operator(cfg: &StorageConfig) -> Result<Operator> {
    if cfg.endpoint.starts_with("http://") {
        if cfg.enforce_tls {
            anyhow::bail!(
                "S3 endpoint uses plaintext HTTP ({}), but enforce_tls is enabled. \
                 Use an HTTPS endpoint or set enforce_tls = false for local development.",
                cfg.endpoint
            );
        }
        tracing::warn!(
            endpoint = %cfg.endpoint,
            "S3 endpoint uses plaintext HTTP — credentials are transmitted unencrypted. \
             Set enforce_tls = true and use HTTPS in production."
        );
    }

    let builder = opendal::services::S3::default()
        .endpoint(&cfg.endpoint)
        .region(&cfg.region)
        .bucket(&cfg.bucket)
        .access_key_id(&cfg.access_key_id)
        .secret_access_key(&cfg.secret_access_key);

    let op = Operator::new(builder)
        .context("creating OpenDAL S3 operator")?
        .layer(opendal::layers::LoggingLayer::default())
        .finish();

    Ok(op)
}

/// S3-compatible [`Backend`] over an OpenDAL operator.
pub struct S3Backend {
    op: Operator,
}

impl S3Backend {
    pub fn new(op: Operator) -> Self {
        Self { op }
    }

    pub fn from_config(cfg: &StorageConfig) -> Result<Self> {
        Ok(Self::new(build_operator(cfg)?))
    }
}

fn map_err(key: &str, err: opendal::Error) -> BackendError {
    if err.kind() == opendal::ErrorKind::NotFound {
        BackendError::NotFound {
            key: key.to_string(),
        }
    } else {
        BackendError::Transport(err.to_string())
    }
}

#[async_trait]
impl Backend for S3Backend {
    async fn put(&self, key: &str, data: Bytes, opts: &PutOptions) -> Result<(), BackendError> {
        // content-encoding stays unset: "identity" is the HTTP default and
        // opendal's write options do not carry it
        self.op
            .write_with(key, data)
            .content_type(&opts.content_type)
            .cache_control(&opts.cache_control)
            .await
            .map_err(|e| map_err(key, e))?;
        Ok(())
    }

    async fn open(&self, key: &str) -> Result<ObjectReader, BackendError> {
        // metadata comes from a HEAD request; the body is only fetched if
        // the caller accepts what it declares
        let meta = self.op.stat(key).await.map_err(|e| map_err(key, e))?;
        let content_type = meta.content_type().unwrap_or_default().to_string();
        let size = meta.content_length();

        let op = self.op.clone();
        let key = key.to_string();
        Ok(ObjectReader::new(content_type, size, async move {
            let buf = op.read(&key).await.map_err(|e| map_err(&key, e))?;
            Ok(buf.to_bytes())
        }))
    }

    async fn list(&self) -> Result<Vec<String>, BackendError> {
        let entries = self.op.list("").await.map_err(|e| map_err("", e))?;
        Ok(entries
            .into_iter()
            .map(|entry| entry.name().to_string())
            .collect())
    }
}
