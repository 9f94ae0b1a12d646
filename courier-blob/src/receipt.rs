/// Receipt returned after successfully storing a blob
#[derive(Debug, Clone)]
pub struct BlobReceipt {
    pub key: String,
    pub size_bytes: u64,
    pub content_type: Option<String>,
    pub etag: Option<String>,
    pub created_at: i64,
}

impl BlobReceipt {
    pub fn new(key: String, size_bytes: u64) -> Self {
        Self {
            key,
            size_bytes,
            content_type: None,
            etag: None,
            created_at: chrono::Utc::now().timestamp_millis(),
        }
    }

    pub fn with_content_type(mut self, content_type: String) -> Self {
        self.content_type = Some(content_type);
        self
    }

    pub fn with_etag(mut self, etag: String) -> Self {
        self.etag = Some(etag);
        self
    }
}
