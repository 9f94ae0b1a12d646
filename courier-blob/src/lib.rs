//! # courier-blob: object storage for Courier
//!
//! Services write finished payloads through a [`BlobAdapter`], which applies
//! the configured guards and turns a store result into a [`BlobReceipt`].
//! The adapter sits on top of any [`BlobStore`]:
//!
//! ```text
//! ┌─────────────────┐
//! │ IngestService   │  ← decides key, payload, content type
//! ├─────────────────┤
//! │   BlobAdapter   │  ← size guard, receipts, logging
//! ├─────────────────┤
//! │   BlobStore     │  ← S3CompatibleStore / MemoryBlobStore
//! └─────────────────┘
//! ```
//!
//! ```rust
//! use courier_blob::prelude::*;
//!
//! # #[tokio::main]
//! # async fn main() -> BlobResult<()> {
//! let store = MemoryBlobStore::new();
//! let adapter = BlobAdapter::new(store.clone(), BlobConfig::default());
//!
//! let put = BlobPut::new("whatsapp-text/1-+1555.txt").with_content_type("text/plain");
//! let receipt = adapter.put(put, bytes::Bytes::from_static(b"hello")).await?;
//!
//! assert_eq!(receipt.size_bytes, 5);
//! assert_eq!(store.get("whatsapp-text/1-+1555.txt").unwrap().body.as_ref(), b"hello");
//! # Ok(())
//! # }
//! ```

pub mod adapter;
mod config;
mod error;
mod memory_store;
mod receipt;
mod s3_store;
pub mod store;
mod types;

pub use adapter::BlobAdapter;
pub use config::BlobConfig;
pub use error::{BlobError, BlobResult};
pub use memory_store::{MemoryBlobStore, StoredObject};
pub use receipt::BlobReceipt;
pub use s3_store::{S3CompatibleStore, S3Config};
pub use store::{BlobStore, PutResult};
pub use types::BlobPut;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        BlobAdapter, BlobConfig, BlobError, BlobPut, BlobReceipt, BlobResult, BlobStore,
        MemoryBlobStore,
    };
}
