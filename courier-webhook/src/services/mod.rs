pub mod ingest;
pub mod media;

pub use ingest::{Ingested, IngestService, TEXT_CONTENT_TYPE, TEXT_REPLY};
pub use media::{HttpMediaFetcher, MediaFetcher};
