use std::sync::Arc;

use bytes::Bytes;

use crate::{BlobConfig, BlobError, BlobPut, BlobReceipt, BlobResult, BlobStore};

/// The blob adapter - this is what services embed
#[derive(Clone)]
pub struct BlobAdapter {
    store: Arc<dyn BlobStore>,
    config: BlobConfig,
}

impl BlobAdapter {
    /// Create a new blob adapter
    pub fn new<S: BlobStore + 'static>(store: S, config: BlobConfig) -> Self {
        Self::from_arc(Arc::new(store), config)
    }

    /// Create from an already shared store
    pub fn from_arc(store: Arc<dyn BlobStore>, config: BlobConfig) -> Self {
        Self { store, config }
    }

    /// Store a blob (single-shot upload)
    pub async fn put(&self, put: BlobPut, body: Bytes) -> BlobResult<BlobReceipt> {
        let size = body.len() as u64;
        if size > self.config.max_blob_bytes {
            return Err(BlobError::invalid(format!(
                "Blob size {} exceeds maximum {}",
                size, self.config.max_blob_bytes
            )));
        }
        if put.key.is_empty() {
            return Err(BlobError::invalid("Blob key must not be empty"));
        }

        let result = self
            .store
            .put(&put.key, put.content_type.as_deref(), body)
            .await?;

        tracing::debug!(
            backend = self.store.backend_name(),
            key = %put.key,
            bytes = result.size_bytes,
            "blob stored"
        );

        let mut receipt = BlobReceipt::new(put.key, result.size_bytes);
        if let Some(ct) = put.content_type {
            receipt = receipt.with_content_type(ct);
        }
        if let Some(etag) = result.etag {
            receipt = receipt.with_etag(etag);
        }

        Ok(receipt)
    }

    /// Get configuration
    pub fn config(&self) -> &BlobConfig {
        &self.config
    }
}
