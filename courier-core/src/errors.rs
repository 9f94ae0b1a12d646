//! # Errors
//!
//! Courier services return `anyhow::Error`. When a failure needs a
//! category (for logs and for the HTTP boundary) it is raised as a
//! [`CourierError`], which rides inside `anyhow::Error` and can be
//! recovered with [`CourierError::normalize`] or [`CourierError::from_anyhow`].
//!
//! Content-level problems (a malformed PDF, an undecodable image) are not
//! errors at this level; `courier-docs` absorbs them.

use std::fmt;

use anyhow::Error as AnyError;

/// A convenience result type for Courier service APIs.
pub type CourierResult<T> = std::result::Result<T, AnyError>;

/// Failure categories of a webhook request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The inbound form is missing fields or carries unusable values.
    InvalidEvent,
    /// Fetching the attachment from the media host failed.
    Fetch,
    /// Writing to object storage failed.
    Storage,
    /// Local processing failed (e.g. a worker thread panicked).
    Processing,
    General,
}

impl ErrorKind {
    pub fn name(&self) -> &'static str {
        match self {
            ErrorKind::InvalidEvent => "InvalidEvent",
            ErrorKind::Fetch => "Fetch",
            ErrorKind::Storage => "Storage",
            ErrorKind::Processing => "Processing",
            ErrorKind::General => "GeneralError",
        }
    }

    /// Kebab-cased name, used as a structured log field.
    pub fn class_name(&self) -> &'static str {
        match self {
            ErrorKind::InvalidEvent => "invalid-event",
            ErrorKind::Fetch => "fetch",
            ErrorKind::Storage => "storage",
            ErrorKind::Processing => "processing",
            ErrorKind::General => "general-error",
        }
    }
}

/// A structured Courier error that can live inside `anyhow::Error`.
#[derive(Debug)]
pub struct CourierError {
    pub kind: ErrorKind,
    pub message: String,
    pub source: Option<AnyError>,
}

impl CourierError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(mut self, source: impl Into<AnyError>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    pub fn class_name(&self) -> &'static str {
        self.kind.class_name()
    }

    /// Convert into `anyhow::Error`.
    pub fn into_anyhow(self) -> AnyError {
        AnyError::new(self)
    }

    /// Find a `CourierError` anywhere in an `anyhow` chain.
    pub fn from_anyhow(err: &AnyError) -> Option<&CourierError> {
        err.chain().find_map(|e| e.downcast_ref::<CourierError>())
    }

    /// Turn any error into a CourierError:
    /// - if it is already one, keep it
    /// - otherwise wrap as `General`
    pub fn normalize(err: AnyError) -> CourierError {
        match err.downcast::<CourierError>() {
            Ok(courier) => courier,
            Err(other) => CourierError::new(ErrorKind::General, other.to_string()).with_source(other),
        }
    }

    // ---- Constructors ----

    pub fn invalid_event(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidEvent, msg)
    }
}

impl fmt::Display for CourierError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name(), self.message)
    }
}

impl std::error::Error for CourierError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Attach a [`ErrorKind`] to a fallible call.
///
/// ```rust
/// use courier_core::{ErrorKind, ResultExt};
/// let res: Result<(), std::io::Error> = Err(std::io::Error::other("reset"));
/// let err = res.kind(ErrorKind::Fetch, "media fetch failed").unwrap_err();
/// assert!(err.to_string().starts_with("Fetch"));
/// ```
pub trait ResultExt<T> {
    fn kind(self, kind: ErrorKind, message: impl Into<String>) -> CourierResult<T>;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<AnyError>,
{
    fn kind(self, kind: ErrorKind, message: impl Into<String>) -> CourierResult<T> {
        self.map_err(|e| CourierError::new(kind, message).with_source(e).into_anyhow())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn normalize_keeps_courier_errors() {
        let err = CourierError::new(ErrorKind::Storage, "bucket unreachable").into_anyhow();
        let normalized = CourierError::normalize(err);
        assert_eq!(normalized.kind, ErrorKind::Storage);
        assert_eq!(normalized.message, "bucket unreachable");
    }

    #[test]
    fn normalize_wraps_foreign_errors_as_general() {
        let normalized = CourierError::normalize(anyhow::anyhow!("boom"));
        assert_eq!(normalized.kind, ErrorKind::General);
        assert_eq!(normalized.message, "boom");
        assert!(normalized.source.is_some());
    }

    #[test]
    fn from_anyhow_sees_through_context() {
        let err = Err::<(), _>(CourierError::new(ErrorKind::Fetch, "404 from media host").into_anyhow())
            .context("ingesting media")
            .unwrap_err();

        let found = CourierError::from_anyhow(&err).map(|e| e.kind);
        assert_eq!(found, Some(ErrorKind::Fetch));
    }

    #[test]
    fn result_ext_tags_kind() {
        let res: Result<(), std::io::Error> = Err(std::io::Error::other("reset"));
        let err = res.kind(ErrorKind::Fetch, "media fetch failed").unwrap_err();
        let courier = CourierError::from_anyhow(&err).unwrap();
        assert_eq!(courier.kind, ErrorKind::Fetch);
        assert_eq!(courier.class_name(), "fetch");
    }
}
