//! Storage keys.
//!
//! `{category}/{timestamp_ms}-{sender}.{ext}`
//!
//! Two objects from the same sender in the same millisecond map to the same
//! key; the later write wins.

use std::fmt;

use crate::event::Sender;

const TEXT_EXTENSION: &str = "txt";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCategory {
    Media,
    Text,
}

impl KeyCategory {
    pub fn prefix(&self) -> &'static str {
        match self {
            KeyCategory::Media => "whatsapp-media",
            KeyCategory::Text => "whatsapp-text",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StorageKey(String);

impl StorageKey {
    pub fn media(timestamp_ms: i64, sender: &Sender, extension: &str) -> Self {
        Self::build(KeyCategory::Media, timestamp_ms, sender, extension)
    }

    pub fn text(timestamp_ms: i64, sender: &Sender) -> Self {
        Self::build(KeyCategory::Text, timestamp_ms, sender, TEXT_EXTENSION)
    }

    fn build(category: KeyCategory, timestamp_ms: i64, sender: &Sender, extension: &str) -> Self {
        Self(format!(
            "{}/{}-{}.{}",
            category.prefix(),
            timestamp_ms,
            sender,
            extension
        ))
    }

    /// Current wall-clock time in milliseconds since the epoch.
    pub fn now_millis() -> i64 {
        chrono::Utc::now().timestamp_millis()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl AsRef<str> for StorageKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn media_key_format() {
        let sender = Sender::parse("whatsapp:+15551234567");
        let key = StorageKey::media(1_700_000_000_123, &sender, "jpeg");
        assert_eq!(key.as_str(), "whatsapp-media/1700000000123-+15551234567.jpeg");
    }

    #[test]
    fn text_key_format() {
        let sender = Sender::parse("whatsapp:+15551234567");
        let key = StorageKey::text(42, &sender);
        assert_eq!(key.to_string(), "whatsapp-text/42-+15551234567.txt");
    }

    #[test]
    fn now_millis_is_after_2020() {
        assert!(StorageKey::now_millis() > 1_577_836_800_000);
    }
}
