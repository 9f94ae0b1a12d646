/// Request to store a blob under a caller-chosen key.
#[derive(Debug, Clone)]
pub struct BlobPut {
    pub key: String,
    pub content_type: Option<String>,
}

impl BlobPut {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            content_type: None,
        }
    }

    /// Set the Content-Type the object is stored with.
    pub fn with_content_type<S: Into<String>>(mut self, content_type: S) -> Self {
        self.content_type = Some(content_type.into());
        self
    }
}
