use std::sync::Arc;

use bytes::Bytes;
use courier_blob::{BlobAdapter, BlobPut, BlobReceipt};
use courier_core::{
    Attachment, CourierResult, ErrorKind, InboundEvent, ResultExt, Sender, StorageKey,
};
use courier_docs::normalize_pdf;
use tracing::info;

use super::media::MediaFetcher;

pub const TEXT_CONTENT_TYPE: &str = "text/plain";
pub const TEXT_REPLY: &str = "Got your text and saved it!";

/// Result of one successfully handled event.
#[derive(Debug, Clone)]
pub struct Ingested {
    pub receipt: BlobReceipt,
    /// Message sent back to the sender.
    pub reply: String,
}

/// Stores one inbound event: either its first attachment or its text body.
///
/// Fetch and storage failures abort the event. Document problems never do;
/// a PDF that cannot be repaired is stored as a wrapped stand-in.
#[derive(Clone)]
pub struct IngestService {
    fetcher: Arc<dyn MediaFetcher>,
    blobs: BlobAdapter,
}

impl IngestService {
    pub fn new(fetcher: Arc<dyn MediaFetcher>, blobs: BlobAdapter) -> Self {
        Self { fetcher, blobs }
    }

    pub async fn ingest(&self, event: &InboundEvent) -> CourierResult<Ingested> {
        match &event.attachment {
            Some(attachment) => self.ingest_media(&event.sender, attachment).await,
            None => self.ingest_text(&event.sender, &event.body).await,
        }
    }

    pub async fn ingest_media(
        &self,
        sender: &Sender,
        attachment: &Attachment,
    ) -> CourierResult<Ingested> {
        let media_type = &attachment.media_type;

        let fetched = self
            .fetcher
            .fetch(&attachment.url)
            .await
            .kind(ErrorKind::Fetch, "failed to fetch media")?;
        info!(
            sender = %sender,
            content_type = %media_type,
            bytes = fetched.len(),
            "media downloaded"
        );

        let key = StorageKey::media(StorageKey::now_millis(), sender, media_type.extension());

        let payload = if media_type.is_pdf() {
            let normalized = tokio::task::spawn_blocking(move || normalize_pdf(&fetched))
                .await
                .kind(ErrorKind::Processing, "document normalization did not complete")?;
            info!(
                key = %key,
                outcome = normalized.outcome.label(),
                bytes = normalized.bytes.len(),
                "document normalized"
            );
            Bytes::from(normalized.bytes)
        } else {
            fetched
        };

        // The declared type is kept even when the payload was synthesized.
        let receipt = self.store(key, media_type.as_str(), payload).await?;
        let reply = format!("Got your file! Uploaded as {}", receipt.key);

        Ok(Ingested { receipt, reply })
    }

    pub async fn ingest_text(&self, sender: &Sender, body: &str) -> CourierResult<Ingested> {
        let key = StorageKey::text(StorageKey::now_millis(), sender);
        let receipt = self
            .store(key, TEXT_CONTENT_TYPE, Bytes::copy_from_slice(body.as_bytes()))
            .await?;

        Ok(Ingested {
            receipt,
            reply: TEXT_REPLY.to_string(),
        })
    }

    async fn store(
        &self,
        key: StorageKey,
        content_type: &str,
        body: Bytes,
    ) -> CourierResult<BlobReceipt> {
        let receipt = self
            .blobs
            .put(BlobPut::new(key.into_string()).with_content_type(content_type), body)
            .await
            .kind(ErrorKind::Storage, "failed to store object")?;

        info!(
            key = %receipt.key,
            content_type,
            bytes = receipt.size_bytes,
            "object stored"
        );
        Ok(receipt)
    }
}
