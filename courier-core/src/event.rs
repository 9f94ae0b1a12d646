//! Inbound webhook events.
//!
//! [`WebhookForm`] is the raw url-encoded payload as the messaging platform
//! posts it. [`InboundEvent`] is the validated view the ingestion service
//! works with.

use std::fmt;

use serde::Deserialize;

use crate::errors::CourierError;

/// Prefix the platform puts in front of WhatsApp sender numbers.
pub const SENDER_PREFIX: &str = "whatsapp:";

/// Raw form fields of a webhook call. Unknown fields are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WebhookForm {
    #[serde(rename = "Body", default)]
    pub body: Option<String>,
    #[serde(rename = "From", default)]
    pub from: Option<String>,
    #[serde(rename = "NumMedia", default)]
    pub num_media: Option<String>,
    #[serde(rename = "MediaUrl0", default)]
    pub media_url: Option<String>,
    #[serde(rename = "MediaContentType0", default)]
    pub media_content_type: Option<String>,
}

/// Sender identifier with any `whatsapp:` prefix removed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Sender(String);

impl Sender {
    pub fn parse(from: &str) -> Self {
        let from = from.trim();
        Self(from.strip_prefix(SENDER_PREFIX).unwrap_or(from).to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Sender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A declared MIME type, e.g. `application/pdf`.
///
/// The declared string is kept verbatim so it can be stored as the object's
/// Content-Type; the subtype is normalized (lower-cased, parameters dropped)
/// for branching and for the key extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaType {
    declared: String,
    subtype: String,
}

impl MediaType {
    pub fn parse(declared: &str) -> Result<Self, CourierError> {
        let declared = declared.trim();
        let (top, rest) = declared.split_once('/').ok_or_else(|| {
            CourierError::invalid_event(format!("content type has no subtype: {declared:?}"))
        })?;

        let subtype = rest
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            // Case-insensitive, parameters dropped: `application/PDF` and
            // `application/pdf; name=x` both take the PDF path.
            .to_ascii_lowercase();

        if top.trim().is_empty() || subtype.is_empty() {
            return Err(CourierError::invalid_event(format!(
                "malformed content type: {declared:?}"
            )));
        }

        Ok(Self {
            declared: declared.to_string(),
            subtype,
        })
    }

    /// The content type exactly as the sender declared it.
    pub fn as_str(&self) -> &str {
        &self.declared
    }

    /// File extension used in the storage key.
    pub fn extension(&self) -> &str {
        &self.subtype
    }

    pub fn is_pdf(&self) -> bool {
        self.subtype == "pdf"
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.declared)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub url: String,
    pub media_type: MediaType,
}

/// One inbound message, valid for the duration of a single request.
#[derive(Debug, Clone)]
pub struct InboundEvent {
    pub sender: Sender,
    pub body: String,
    pub media_count: u32,
    /// The first attachment; present iff `media_count > 0`.
    pub attachment: Option<Attachment>,
}

/// `NumMedia` is a decimal string; anything unparsable or negative counts
/// as no media.
fn parse_media_count(raw: Option<&str>) -> u32 {
    raw.and_then(|v| v.trim().parse::<i64>().ok())
        .and_then(|n| u32::try_from(n).ok())
        .unwrap_or(0)
}

impl TryFrom<WebhookForm> for InboundEvent {
    type Error = CourierError;

    fn try_from(form: WebhookForm) -> Result<Self, Self::Error> {
        let from = form
            .from
            .as_deref()
            .filter(|f| !f.trim().is_empty())
            .ok_or_else(|| CourierError::invalid_event("missing From"))?;
        let sender = Sender::parse(from);

        let media_count = parse_media_count(form.num_media.as_deref());

        let attachment = if media_count > 0 {
            let url = form
                .media_url
                .filter(|u| !u.trim().is_empty())
                .ok_or_else(|| CourierError::invalid_event("NumMedia > 0 but MediaUrl0 is missing"))?;
            let declared = form.media_content_type.ok_or_else(|| {
                CourierError::invalid_event("NumMedia > 0 but MediaContentType0 is missing")
            })?;

            Some(Attachment {
                url,
                media_type: MediaType::parse(&declared)?,
            })
        } else {
            None
        };

        Ok(Self {
            sender,
            body: form.body.unwrap_or_default(),
            media_count,
            attachment,
        })
    }
}
