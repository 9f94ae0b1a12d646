use std::str::FromStr;

use anyhow::{bail, Result};
use courier_blob::{BlobAdapter, BlobConfig, MemoryBlobStore, S3CompatibleStore, S3Config};
use courier_core::CourierConfigSnapshot;

const DEFAULT_MAX_BLOB_MB: u64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    S3,
    /// Process-local; objects are lost on restart.
    Memory,
}

impl FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "s3" => Ok(StorageBackend::S3),
            "memory" => Ok(StorageBackend::Memory),
            other => bail!("unknown storage backend: {other}"),
        }
    }
}

pub fn blob_config(config: &CourierConfigSnapshot) -> BlobConfig {
    let max_mb = config
        .get_u64("storage.max_blob_mb")
        .unwrap_or(DEFAULT_MAX_BLOB_MB);
    BlobConfig::new().with_max_blob_bytes(max_mb.saturating_mul(1024 * 1024))
}

pub fn s3_config(config: &CourierConfigSnapshot) -> Result<S3Config> {
    let mut s3 = S3Config::new(config.require("s3.region")?, config.require("s3.bucket")?);

    if let (Some(id), Some(secret)) = (
        config.get_string("s3.access_key_id"),
        config.get_string("s3.secret_access_key"),
    ) {
        s3 = s3.with_credentials(id, secret);
    }
    if let Some(endpoint) = config.get_string("s3.endpoint_url") {
        s3 = s3.with_endpoint_url(endpoint);
    }

    Ok(s3)
}

/// Create the blob adapter for the configured backend.
pub async fn blob_adapter(config: &CourierConfigSnapshot) -> Result<BlobAdapter> {
    let backend: StorageBackend = config.get("storage.backend").unwrap_or("s3").parse()?;
    let blob_config = blob_config(config);

    let adapter = match backend {
        StorageBackend::S3 => {
            let s3 = s3_config(config)?;
            tracing::info!(
                bucket = %s3.bucket,
                region = %s3.region,
                endpoint = s3.endpoint_url.as_deref().unwrap_or("aws"),
                "using S3 storage"
            );
            BlobAdapter::new(S3CompatibleStore::new(s3).await?, blob_config)
        }
        StorageBackend::Memory => {
            tracing::warn!("using in-memory storage; objects are not persisted");
            BlobAdapter::new(MemoryBlobStore::new(), blob_config)
        }
    };

    Ok(adapter)
}

#[cfg(test)]
mod tests {
    use courier_core::CourierConfig;

    use super::*;

    fn snapshot(pairs: &[(&str, &str)]) -> CourierConfigSnapshot {
        let mut config = CourierConfig::new();
        for (k, v) in pairs {
            config.set(*k, *v);
        }
        config.snapshot()
    }

    #[test]
    fn backend_names() {
        assert_eq!("s3".parse::<StorageBackend>().unwrap(), StorageBackend::S3);
        assert_eq!(" Memory ".parse::<StorageBackend>().unwrap(), StorageBackend::Memory);
        assert!("gcs".parse::<StorageBackend>().is_err());
    }

    #[test]
    fn blob_limit_is_in_megabytes() {
        let config = blob_config(&snapshot(&[("storage.max_blob_mb", "2")]));
        assert_eq!(config.max_blob_bytes, 2 * 1024 * 1024);
    }

    #[test]
    fn huge_blob_limit_saturates() {
        let max = u64::MAX.to_string();
        let config = blob_config(&snapshot(&[("storage.max_blob_mb", max.as_str())]));
        assert_eq!(config.max_blob_bytes, u64::MAX);
    }

    #[test]
    fn s3_config_requires_bucket() {
        let err = s3_config(&snapshot(&[("s3.region", "eu-west-1")])).unwrap_err();
        assert!(err.to_string().contains("s3.bucket"));
    }

    #[test]
    fn s3_config_takes_optional_settings() {
        let s3 = s3_config(&snapshot(&[
            ("s3.region", "eu-west-1"),
            ("s3.bucket", "inbox"),
            ("s3.access_key_id", "AKIA"),
            ("s3.secret_access_key", "secret"),
            ("s3.endpoint_url", "http://localhost:9000"),
        ]))
        .unwrap();

        assert_eq!(s3.bucket, "inbox");
        assert_eq!(s3.access_key_id.as_deref(), Some("AKIA"));
        assert_eq!(s3.endpoint_url.as_deref(), Some("http://localhost:9000"));
    }

    #[tokio::test]
    async fn memory_backend_needs_no_credentials() {
        let adapter = blob_adapter(&snapshot(&[("storage.backend", "memory")]))
            .await
            .unwrap();
        assert_eq!(adapter.config().max_blob_bytes, 100 * 1024 * 1024);
    }
}
