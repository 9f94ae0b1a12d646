use thiserror::Error;

/// Failures inside the document pipeline. The public normalization entry
/// points absorb these; only the `try_*` functions return them.
#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("failed to parse document: {0}")]
    Parse(String),

    #[error("failed to copy pages: {0}")]
    Copy(String),

    #[error("failed to encode page content: {0}")]
    Encode(String),

    #[error("failed to serialize document: {0}")]
    Serialize(String),
}
